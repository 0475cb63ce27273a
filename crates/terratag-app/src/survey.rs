//! Survey: classifies a synthetic planet through the worker pool and
//! accumulates tag coverage.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use terratag_biome::{
    BiomeClassifier, BiomeTag, ClassificationPool, ClassifiedRegion, RegionId, RegionTask,
    TagRegistry,
};
use terratag_config::Config;

use crate::error::AppError;
use crate::planet::{SurveyGrid, SyntheticPlanet};
use crate::report::{CoverageReport, TagCoverage};

/// How long to wait for a region before checking the pool is still busy.
const RESULT_POLL: Duration = Duration::from_millis(250);

/// Per-tag and unclassified totals while results arrive.
#[derive(Default)]
struct Tally {
    points: u64,
    area: f64,
    unclassified_points: u64,
    unclassified_area: f64,
    tags: BTreeMap<BiomeTag, (u64, f64)>,
    regions: u64,
    classification_time_us: u64,
}

impl Tally {
    fn add(&mut self, grid: &SurveyGrid, rows_per_region: u32, region: &ClassifiedRegion) {
        let first_row = region.region.0 as u32 * rows_per_region;
        let columns = grid.columns as usize;
        for (i, tags) in region.tags.iter().enumerate() {
            let weight = grid.area_weight(first_row + (i / columns) as u32);
            self.points += 1;
            self.area += weight;
            if tags.is_empty() {
                self.unclassified_points += 1;
                self.unclassified_area += weight;
            }
            for &tag in tags {
                let entry = self.tags.entry(tag).or_default();
                entry.0 += 1;
                entry.1 += weight;
            }
        }
        self.regions += 1;
        self.classification_time_us += region.classification_time_us;
    }
}

/// Samples the planet described by `config.survey`, classifies every grid
/// point on a [`ClassificationPool`] and summarizes tag coverage.
pub fn run_survey(
    classifier: BiomeClassifier,
    tags: &TagRegistry,
    config: &Config,
) -> Result<CoverageReport, AppError> {
    let started = Instant::now();
    let survey = &config.survey;
    let planet = SyntheticPlanet::new(survey);
    let grid = SurveyGrid::new(survey.resolution);
    let rows_per_region = survey.rows_per_region.max(1);
    let region_count = grid.rows.div_ceil(rows_per_region);

    let threads = match config.workers.threads {
        0 => ClassificationPool::default_thread_count(),
        n => n,
    };
    let pool = ClassificationPool::new(
        classifier,
        threads,
        config.workers.max_concurrent,
        config.workers.result_capacity,
    )
    .map_err(AppError::Pool)?;

    tracing::info!(
        seed = survey.seed,
        columns = grid.columns,
        rows = grid.rows,
        regions = region_count,
        threads = pool.thread_count(),
        "starting survey"
    );

    let mut tally = Tally::default();
    for index in 0..region_count {
        let start = index * rows_per_region;
        let end = (start + rows_per_region).min(grid.rows);
        let mut task = RegionTask {
            region: RegionId(u64::from(index)),
            points: grid.sample_rows(&planet, start..end),
        };
        // A full queue hands the task back; make room by collecting results.
        loop {
            match pool.submit(task) {
                Ok(()) => break,
                Err(rejected) => {
                    task = rejected;
                    if let Some(region) = pool.recv_timeout(RESULT_POLL) {
                        tally.add(&grid, rows_per_region, &region);
                    }
                }
            }
        }
        for region in pool.drain_results() {
            tally.add(&grid, rows_per_region, &region);
        }
    }

    while tally.regions < u64::from(region_count) {
        match pool.recv_timeout(RESULT_POLL) {
            Some(region) => tally.add(&grid, rows_per_region, &region),
            None if pool.in_flight_count() == 0 => {
                // Results may have landed between the timeout and the check.
                let late = pool.drain_results();
                if late.is_empty() {
                    pool.shutdown();
                    return Err(AppError::Stalled {
                        missing: u64::from(region_count) - tally.regions,
                    });
                }
                for region in &late {
                    tally.add(&grid, rows_per_region, region);
                }
            }
            None => tracing::trace!(in_flight = pool.in_flight_count(), "waiting for regions"),
        }
    }

    let threads = pool.thread_count();
    let stats = pool.shutdown();
    let elapsed = started.elapsed();
    tracing::info!(
        points = stats.points,
        unclassified = stats.unclassified,
        elapsed_ms = elapsed.as_millis() as u64,
        "survey finished"
    );

    let area = tally.area.max(f64::MIN_POSITIVE);
    let points = tally.points.max(1) as f64;
    let coverage = tally
        .tags
        .iter()
        .map(|(&tag, &(count, weight))| TagCoverage {
            id: tag.0,
            name: tags.name(tag).unwrap_or("?").to_string(),
            points: count,
            point_fraction: count as f64 / points,
            area_fraction: weight / area,
        })
        .collect();

    Ok(CoverageReport {
        seed: survey.seed,
        columns: grid.columns,
        rows: grid.rows,
        regions: tally.regions,
        threads,
        points: tally.points,
        unclassified_points: tally.unclassified_points,
        unclassified_area_fraction: tally.unclassified_area / area,
        clamped_values: stats.clamped_values,
        saturated_points: stats.saturated,
        classification_time_us: tally.classification_time_us,
        elapsed_ms: elapsed.as_millis() as u64,
        tags: coverage,
    })
}

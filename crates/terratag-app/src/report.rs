//! Coverage report printed by the `terratag` binary.

use std::fmt;

use serde::Serialize;

/// Share of the surveyed planet carrying one tag.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagCoverage {
    pub id: u16,
    pub name: String,
    /// Grid points carrying the tag.
    pub points: u64,
    /// `points` over all grid points.
    pub point_fraction: f64,
    /// Surface-area share, weighting each point by the cosine of its latitude.
    pub area_fraction: f64,
}

/// Result of one survey run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoverageReport {
    pub seed: u64,
    pub columns: u32,
    pub rows: u32,
    pub regions: u64,
    pub threads: usize,
    pub points: u64,
    pub unclassified_points: u64,
    pub unclassified_area_fraction: f64,
    /// Raw input values the classifier had to clamp into the domain.
    pub clamped_values: u64,
    /// Points whose tag set reached the capacity limit.
    pub saturated_points: u64,
    /// Summed worker time, in microseconds.
    pub classification_time_us: u64,
    /// Wall-clock time including sampling, in milliseconds.
    pub elapsed_ms: u64,
    /// Tags in id order.
    pub tags: Vec<TagCoverage>,
}

impl CoverageReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "seed {} | {}x{} grid | {} points in {} regions | {} threads | {} ms",
            self.seed,
            self.columns,
            self.rows,
            self.points,
            self.regions,
            self.threads,
            self.elapsed_ms
        )?;
        writeln!(f, "{:<16} {:>6} {:>10} {:>8} {:>8}", "tag", "id", "points", "points%", "area%")?;
        for tag in &self.tags {
            writeln!(
                f,
                "{:<16} {:>6} {:>10} {:>7.2}% {:>7.2}%",
                tag.name,
                tag.id,
                tag.points,
                tag.point_fraction * 100.0,
                tag.area_fraction * 100.0
            )?;
        }
        writeln!(
            f,
            "{:<16} {:>6} {:>10} {:>7.2}% {:>7.2}%",
            "(none)",
            "-",
            self.unclassified_points,
            self.unclassified_points as f64 * 100.0 / self.points.max(1) as f64,
            self.unclassified_area_fraction * 100.0
        )?;
        write!(
            f,
            "clamped values: {} | saturated points: {}",
            self.clamped_values, self.saturated_points
        )
    }
}

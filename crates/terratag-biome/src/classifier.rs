//! Biome classifier: ordered rule evaluation into a bounded tag set.

use std::sync::Arc;

use glam::DVec3;

use crate::field::SamplePoint;
use crate::rule::RuleTable;
use crate::state::ClassifierState;
use crate::tag::{BiomeTag, TagSet};

/// Classifies `point` against `table`, writing the result into `out`.
///
/// The result depends only on `point` and `table`: raw values are clamped
/// into the table's domain, rules are walked in priority order, tags of
/// matching rules are appended without duplicates, and evaluation stops as
/// soon as `out` holds [`MAX_TAGS`](crate::MAX_TAGS) tags. No match leaves
/// `out` empty.
///
/// `state` is scratch space; it is fully rewritten before it is read.
/// Never allocates and never fails.
pub fn classify(
    table: &RuleTable,
    state: &mut ClassifierState,
    point: &SamplePoint,
    out: &mut TagSet,
) {
    out.clear();
    state.load(point, table.domain(), table.needs_latitude());
    let fields = state.fields();

    'rules: for (predicates, tags) in table.rules() {
        if !predicates.iter().all(|p| p.matches(fields)) {
            continue;
        }
        for &tag in tags {
            out.push(tag);
            if out.is_full() {
                break 'rules;
            }
        }
    }

    state.record(out);
}

/// Flat call surface: classifies one point given as separate values and
/// writes `tags_out[..*count_out]`. `tags_out` must hold at least
/// `MAX_TAGS` tags.
#[allow(clippy::too_many_arguments)]
pub(crate) fn classify_flat(
    table: &RuleTable,
    state: &mut ClassifierState,
    tags_out: &mut [BiomeTag],
    count_out: &mut usize,
    position_normal: DVec3,
    noise_location: DVec3,
    altitude: f64,
    steepness: f64,
    river_distance: f64,
    temperature_summer: f64,
    temperature_winter: f64,
    rainfall_summer: f64,
    rainfall_winter: f64,
) {
    let point = SamplePoint {
        position_normal,
        noise_location,
        altitude,
        steepness,
        river_distance,
        temperature_summer,
        temperature_winter,
        rainfall_summer,
        rainfall_winter,
    };
    let mut tags = TagSet::new();
    classify(table, state, &point, &mut tags);
    tags.write_to(tags_out, count_out);
}

/// Cheap, cloneable handle pairing the shared rule table with the
/// classification entry points.
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    table: Arc<RuleTable>,
}

impl BiomeClassifier {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<RuleTable> {
        &self.table
    }

    /// Creates scratch state for one worker.
    pub fn new_state(&self) -> ClassifierState {
        ClassifierState::new()
    }

    /// See [`classify`].
    #[inline]
    pub fn classify(&self, state: &mut ClassifierState, point: &SamplePoint, out: &mut TagSet) {
        classify(&self.table, state, point, out);
    }

    /// Classifies `points[i]` into `out[i]` for the common prefix of both
    /// slices, returning how many points were classified.
    pub fn classify_batch(
        &self,
        state: &mut ClassifierState,
        points: &[SamplePoint],
        out: &mut [TagSet],
    ) -> usize {
        let mut n = 0;
        for (point, tags) in points.iter().zip(out.iter_mut()) {
            classify(&self.table, state, point, tags);
            n += 1;
        }
        n
    }

    /// Flat form of [`classify`](Self::classify) for pipelines that keep
    /// fields in separate arrays. Writes `tags_out[..*count_out]` only.
    ///
    /// # Panics
    ///
    /// Panics if `tags_out` is shorter than [`MAX_TAGS`](crate::MAX_TAGS).
    #[allow(clippy::too_many_arguments)]
    pub fn tags_for_point(
        &self,
        state: &mut ClassifierState,
        tags_out: &mut [BiomeTag],
        count_out: &mut usize,
        position_normal: DVec3,
        noise_location: DVec3,
        altitude: f64,
        steepness: f64,
        river_distance: f64,
        temperature_summer: f64,
        temperature_winter: f64,
        rainfall_summer: f64,
        rainfall_winter: f64,
    ) {
        classify_flat(
            &self.table,
            state,
            tags_out,
            count_out,
            position_normal,
            noise_location,
            altitude,
            steepness,
            river_distance,
            temperature_summer,
            temperature_winter,
            rainfall_summer,
            rainfall_winter,
        );
    }
}

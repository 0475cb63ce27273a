//! Process-wide rule table.
//!
//! The table is installed once, before any generation worker starts, and is
//! read-only from then on. Workers that keep their own `Arc<RuleTable>` (see
//! [`BiomeClassifier`]) do not need this slot.

use std::sync::{Arc, OnceLock};

use glam::DVec3;

use crate::classifier::{BiomeClassifier, classify_flat};
use crate::rule::RuleTable;
use crate::state::ClassifierState;
use crate::tag::BiomeTag;

static RULE_TABLE: OnceLock<Arc<RuleTable>> = OnceLock::new();

/// Installs the process-wide rule table.
///
/// Returns `Err(table)` if a table is already installed.
pub fn install(table: Arc<RuleTable>) -> Result<(), Arc<RuleTable>> {
    let rules = table.len();
    RULE_TABLE.set(table)?;
    tracing::info!(rules, "installed process-wide rule table");
    Ok(())
}

/// The installed rule table, if any.
pub fn installed() -> Option<&'static Arc<RuleTable>> {
    RULE_TABLE.get()
}

/// A classifier handle over the installed table, if any.
pub fn classifier() -> Option<BiomeClassifier> {
    installed().map(|table| BiomeClassifier::new(Arc::clone(table)))
}

/// Classifies one point against the installed table and writes
/// `tags_out[..*count_out]`. `tags_out` must hold at least
/// [`MAX_TAGS`](crate::MAX_TAGS) tags.
///
/// With no table installed every point is unclassified (`*count_out == 0`).
#[allow(clippy::too_many_arguments)]
pub fn get_tags_for_point(
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
    let Some(table) = installed() else {
        *count_out = 0;
        return;
    };
    classify_flat(
        table,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::rule::{BiomeRule, RangePredicate, RuleTableBuilder};
    use crate::tag::MAX_TAGS;

    fn table() -> Arc<RuleTable> {
        let mut builder = RuleTableBuilder::new();
        builder
            .add_rule(
                BiomeRule::new("ocean", [BiomeTag(1)])
                    .when(RangePredicate::new(Field::Altitude).below(0.0)),
            )
            .unwrap();
        Arc::new(builder.build().unwrap())
    }

    // The slot is process-wide, so install and both outcomes are checked in
    // a single test.
    #[test]
    fn test_install_once_then_classify() {
        let first = table();
        assert!(install(Arc::clone(&first)).is_ok());
        let rejected = install(table());
        assert!(rejected.is_err());

        assert!(Arc::ptr_eq(installed().unwrap(), &first));
        assert!(classifier().is_some());

        let mut state = ClassifierState::new();
        let mut buf = [BiomeTag(0); MAX_TAGS];
        let mut count = 0;
        get_tags_for_point(
            &mut state, &mut buf, &mut count, DVec3::Y, DVec3::ZERO, -5.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0,
        );
        assert_eq!(count, 1);
        assert_eq!(buf[0], BiomeTag(1));
    }
}

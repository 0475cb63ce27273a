//! Biome tag classification: turns per-point environmental samples into a
//! bounded, ordered set of biome tags.
//!
//! A [`RuleTable`] is built once (directly through [`RuleTableBuilder`] or
//! from a RON [`RuleManifest`]) and then shared read-only by every worker.
//! Each worker owns a [`ClassifierState`] and calls [`classify`] per point.

mod classifier;
mod field;
mod manifest;
mod pool;
mod rule;
mod state;
mod tag;

pub mod global;

pub use classifier::{BiomeClassifier, classify};
pub use field::{Field, FieldDomain, SampleDomain, SamplePoint};
pub use global::get_tags_for_point;
pub use manifest::{LoadedRules, ManifestError, RuleEntry, RuleManifest, load_rules};
pub use pool::{ClassificationPool, ClassifiedRegion, RegionId, RegionTask};
pub use rule::{
    BiomeRule, Bound, PredicateError, RangePredicate, RuleTable, RuleTableBuilder, RuleTableError,
};
pub use state::{ClassifierState, ClassifierStats};
pub use tag::{BiomeTag, MAX_TAGS, TagRegistry, TagRegistryError, TagSet};

//! Rule manifest: loads tags, rules and the sample domain from a RON file.
//!
//! ```ron
//! (
//!     tags: ["ocean", "desert"],
//!     rules: [
//!         (name: "ocean", when: [(field: Altitude, high: Exclusive(0.0))], tags: ["ocean"]),
//!         (
//!             name: "desert",
//!             when: [
//!                 (field: Altitude, low: Inclusive(0.0)),
//!                 (field: RainfallSummer, high: Exclusive(10.0)),
//!             ],
//!             tags: ["desert"],
//!         ),
//!     ],
//! )
//! ```
//!
//! Tags are registered in listed order starting at id 1; rules keep their
//! listed order as priority.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::SampleDomain;
use crate::rule::{BiomeRule, RangePredicate, RuleTable, RuleTableBuilder, RuleTableError};
use crate::tag::{TagRegistry, TagRegistryError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned while loading a rule manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read rule manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RON deserialization error.
    #[error("rule manifest parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// A rule names a tag missing from the `tags` list.
    #[error("rule `{rule}` references unknown tag `{tag}`")]
    UnknownTag { rule: String, tag: String },

    /// Tag registration failed.
    #[error("tag error: {0}")]
    Tags(#[from] TagRegistryError),

    /// Rule validation failed.
    #[error("rule table error: {0}")]
    Table(#[from] RuleTableError),
}

// ---------------------------------------------------------------------------
// RON manifest types
// ---------------------------------------------------------------------------

/// Top-level RON manifest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleManifest {
    /// Clamping intervals; missing entries use [`SampleDomain::default`].
    pub domain: SampleDomain,
    /// Tag names, registered in order.
    pub tags: Vec<String>,
    /// Rules in priority order.
    pub rules: Vec<RuleEntry>,
}

/// One rule in the manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub name: String,
    /// Predicates; an empty list matches every point.
    #[serde(default)]
    pub when: Vec<RangePredicate>,
    /// Tag names contributed on match.
    pub tags: Vec<String>,
}

/// A frozen rule table together with the names of its tags.
#[derive(Debug)]
pub struct LoadedRules {
    pub table: RuleTable,
    pub tags: TagRegistry,
}

impl RuleManifest {
    /// Parses a manifest from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self, ManifestError> {
        Ok(ron::from_str(source)?)
    }

    /// Reads and parses a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Serializes the manifest as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty)
    }

    /// Registers tags, validates rules and freezes the table.
    pub fn build(&self) -> Result<LoadedRules, ManifestError> {
        let mut tags = TagRegistry::new();
        for name in &self.tags {
            tags.register(name.as_str())?;
        }

        let mut builder = RuleTableBuilder::new().with_domain(self.domain);
        for entry in &self.rules {
            let mut rule_tags = Vec::with_capacity(entry.tags.len());
            for name in &entry.tags {
                let tag = tags.lookup(name).ok_or_else(|| ManifestError::UnknownTag {
                    rule: entry.name.clone(),
                    tag: name.clone(),
                })?;
                rule_tags.push(tag);
            }
            builder.add_rule(BiomeRule {
                name: entry.name.clone(),
                predicates: entry.when.clone(),
                tags: rule_tags,
            })?;
        }

        let table = builder.build()?;
        Ok(LoadedRules { table, tags })
    }
}

/// Loads, validates and freezes the manifest at `path`.
pub fn load_rules(path: &Path) -> Result<LoadedRules, ManifestError> {
    let loaded = RuleManifest::load(path)?.build()?;
    tracing::info!(
        path = %path.display(),
        rules = loaded.table.len(),
        tags = loaded.tags.len(),
        "loaded rule manifest"
    );
    Ok(loaded)
}

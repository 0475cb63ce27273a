//! Rule table: build once, freeze, then share read-only across workers.

use std::ops::Range;

use hashbrown::HashSet;

use super::predicate::{CompiledPredicate, PredicateError, RangePredicate};
use crate::field::{Field, SampleDomain};
use crate::tag::BiomeTag;

/// A biome rule: every predicate must hold for the rule's tags to be
/// contributed. Fields without a predicate match unconditionally.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeRule {
    /// Name used in diagnostics (e.g. "ocean", "river_bank").
    pub name: String,
    pub predicates: Vec<RangePredicate>,
    /// Tags contributed on match, in output order.
    pub tags: Vec<BiomeTag>,
}

impl BiomeRule {
    /// Creates a rule with no predicates (matches every point).
    pub fn new(name: impl Into<String>, tags: impl IntoIterator<Item = BiomeTag>) -> Self {
        Self {
            name: name.into(),
            predicates: Vec::new(),
            tags: tags.into_iter().collect(),
        }
    }

    /// Adds a predicate.
    pub fn when(mut self, predicate: RangePredicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

/// Errors raised while building a [`RuleTable`].
#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    /// The rule contributes no tags.
    #[error("rule `{0}` contributes no tags")]
    NoTags(String),

    /// The rule contributes the reserved tag 0.
    #[error("rule `{0}` uses the reserved tag 0")]
    ReservedTag(String),

    /// A rule with this name was already added.
    #[error("duplicate rule name: {0}")]
    DuplicateName(String),

    /// A predicate range is ill-formed.
    #[error("rule `{rule}`: invalid {field} predicate: {source}")]
    Predicate {
        rule: String,
        field: Field,
        #[source]
        source: PredicateError,
    },

    /// A clamping interval is non-finite or inverted.
    #[error("invalid sample domain for {field}: [{min}, {max}]")]
    InvalidDomain { field: Field, min: f64, max: f64 },
}

#[derive(Clone, Debug)]
struct CompiledRule {
    predicates: Range<usize>,
    tags: Range<usize>,
}

/// Builds a [`RuleTable`]. Single-threaded; consumed by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    domain: SampleDomain,
    rules: Vec<BiomeRule>,
    names: HashSet<String>,
}

impl RuleTableBuilder {
    /// Creates a builder with the default [`SampleDomain`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the clamping domain.
    pub fn with_domain(mut self, domain: SampleDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Validates and appends a rule, returning its priority (0 is highest).
    ///
    /// # Errors
    ///
    /// Returns a [`RuleTableError`] if the rule has no tags, uses the
    /// reserved tag, reuses a name, or has an ill-formed predicate.
    pub fn add_rule(&mut self, rule: BiomeRule) -> Result<usize, RuleTableError> {
        if rule.tags.is_empty() {
            return Err(RuleTableError::NoTags(rule.name));
        }
        if rule.tags.iter().any(|t| t.is_reserved()) {
            return Err(RuleTableError::ReservedTag(rule.name));
        }
        if self.names.contains(&rule.name) {
            return Err(RuleTableError::DuplicateName(rule.name));
        }
        for predicate in &rule.predicates {
            if let Err(source) = predicate.check() {
                return Err(RuleTableError::Predicate {
                    rule: rule.name,
                    field: predicate.field,
                    source,
                });
            }
        }

        self.names.insert(rule.name.clone());
        self.rules.push(rule);
        Ok(self.rules.len() - 1)
    }

    /// Number of rules added so far.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freezes the rules into an immutable [`RuleTable`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleTableError::InvalidDomain`] if a clamping interval is
    /// non-finite or inverted.
    pub fn build(self) -> Result<RuleTable, RuleTableError> {
        if let Some((field, domain)) = self.domain.first_invalid() {
            return Err(RuleTableError::InvalidDomain {
                field,
                min: domain.min,
                max: domain.max,
            });
        }

        let predicate_count = self.rules.iter().map(|r| r.predicates.len()).sum();
        let tag_count = self.rules.iter().map(|r| r.tags.len()).sum();
        let mut predicates = Vec::with_capacity(predicate_count);
        let mut tags = Vec::with_capacity(tag_count);
        let mut rules = Vec::with_capacity(self.rules.len());
        let mut names = Vec::with_capacity(self.rules.len());

        for rule in self.rules {
            for predicate in &rule.predicates {
                if !predicate.is_satisfiable_within(self.domain.bounds(predicate.field)) {
                    tracing::warn!(
                        rule = %rule.name,
                        field = %predicate.field,
                        "predicate can never match inside the sample domain"
                    );
                }
            }

            let p_start = predicates.len();
            predicates.extend(rule.predicates.iter().map(RangePredicate::compile));
            let t_start = tags.len();
            tags.extend_from_slice(&rule.tags);
            rules.push(CompiledRule {
                predicates: p_start..predicates.len(),
                tags: t_start..tags.len(),
            });
            names.push(rule.name);
        }

        let needs_latitude = predicates
            .iter()
            .any(|p: &CompiledPredicate| p.field() == Field::Latitude.index());

        tracing::debug!(
            rules = rules.len(),
            predicates = predicates.len(),
            needs_latitude,
            "rule table frozen"
        );

        Ok(RuleTable {
            domain: self.domain,
            rules: rules.into_boxed_slice(),
            predicates: predicates.into_boxed_slice(),
            tags: tags.into_boxed_slice(),
            names: names.into_boxed_slice(),
            needs_latitude,
        })
    }
}

/// Ordered, immutable collection of biome rules.
///
/// Table position is priority: index 0 is evaluated first. There is no
/// mutation API, so a table can be read from any number of threads without
/// synchronization (share it with `Arc`).
#[derive(Debug)]
pub struct RuleTable {
    domain: SampleDomain,
    rules: Box<[CompiledRule]>,
    predicates: Box<[CompiledPredicate]>,
    tags: Box<[BiomeTag]>,
    names: Box<[String]>,
    needs_latitude: bool,
}

static_assertions::assert_impl_all!(RuleTable: Send, Sync);

impl RuleTable {
    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Clamping intervals applied to every sample point.
    pub fn domain(&self) -> &SampleDomain {
        &self.domain
    }

    /// Name of the rule at `priority`.
    pub fn rule_name(&self, priority: usize) -> Option<&str> {
        self.names.get(priority).map(String::as_str)
    }

    /// Tags contributed by the rule at `priority`.
    pub fn rule_tags(&self, priority: usize) -> Option<&[BiomeTag]> {
        let rule = self.rules.get(priority)?;
        Some(&self.tags[rule.tags.clone()])
    }

    /// Whether any predicate tests [`Field::Latitude`].
    pub(crate) fn needs_latitude(&self) -> bool {
        self.needs_latitude
    }

    /// Rules in priority order, as `(predicates, tags)` pairs.
    #[inline]
    pub(crate) fn rules(
        &self,
    ) -> impl Iterator<Item = (&[CompiledPredicate], &[BiomeTag])> + '_ {
        self.rules.iter().map(|rule| {
            (
                &self.predicates[rule.predicates.clone()],
                &self.tags[rule.tags.clone()],
            )
        })
    }
}

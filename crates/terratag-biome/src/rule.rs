//! Biome rules: range predicates, the rule table, and its builder.

mod predicate;
mod table;

pub use predicate::{Bound, PredicateError, RangePredicate};
pub use table::{BiomeRule, RuleTable, RuleTableBuilder, RuleTableError};

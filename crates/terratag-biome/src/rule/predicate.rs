//! Numeric range predicates over a single [`Field`].

use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldDomain};

/// One end of a predicate range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    /// No constraint on this end.
    #[default]
    Unbounded,
    /// The bound value itself matches.
    Inclusive(f64),
    /// The bound value itself does not match.
    Exclusive(f64),
}

impl Bound {
    /// The bound value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Bound::Unbounded => None,
            Bound::Inclusive(v) | Bound::Exclusive(v) => Some(v),
        }
    }

    fn is_inclusive(self) -> bool {
        !matches!(self, Bound::Exclusive(_))
    }
}

/// Why a predicate range is ill-formed.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum PredicateError {
    #[error("bound is not finite")]
    NonFinite,
    #[error("low bound {low} exceeds high bound {high}")]
    Inverted { low: f64, high: f64 },
    #[error("range collapses to {0} but excludes it")]
    Empty(f64),
}

/// `low <= field <= high`, with each end inclusive, exclusive or open.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangePredicate {
    pub field: Field,
    #[serde(default)]
    pub low: Bound,
    #[serde(default)]
    pub high: Bound,
}

impl RangePredicate {
    /// A predicate on `field` that matches every value.
    pub fn new(field: Field) -> Self {
        Self {
            field,
            low: Bound::Unbounded,
            high: Bound::Unbounded,
        }
    }

    /// `field >= value`
    pub fn at_least(mut self, value: f64) -> Self {
        self.low = Bound::Inclusive(value);
        self
    }

    /// `field > value`
    pub fn above(mut self, value: f64) -> Self {
        self.low = Bound::Exclusive(value);
        self
    }

    /// `field <= value`
    pub fn at_most(mut self, value: f64) -> Self {
        self.high = Bound::Inclusive(value);
        self
    }

    /// `field < value`
    pub fn below(mut self, value: f64) -> Self {
        self.high = Bound::Exclusive(value);
        self
    }

    /// Checks that the range is well formed and non-empty.
    pub fn check(&self) -> Result<(), PredicateError> {
        let low = self.low.value();
        let high = self.high.value();
        if low.is_some_and(|v| !v.is_finite()) || high.is_some_and(|v| !v.is_finite()) {
            return Err(PredicateError::NonFinite);
        }
        if let (Some(low), Some(high)) = (low, high) {
            if low > high {
                return Err(PredicateError::Inverted { low, high });
            }
            if low == high && !(self.low.is_inclusive() && self.high.is_inclusive()) {
                return Err(PredicateError::Empty(low));
            }
        }
        Ok(())
    }

    /// Returns `true` if `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        let above_low = match self.low {
            Bound::Unbounded => true,
            Bound::Inclusive(low) => value >= low,
            Bound::Exclusive(low) => value > low,
        };
        let below_high = match self.high {
            Bound::Unbounded => true,
            Bound::Inclusive(high) => value <= high,
            Bound::Exclusive(high) => value < high,
        };
        above_low && below_high
    }

    /// Returns `true` if some value inside `domain` satisfies the predicate.
    pub fn is_satisfiable_within(&self, domain: FieldDomain) -> bool {
        let lo = self.low.value().map_or(domain.min, |v| v.max(domain.min));
        let hi = self.high.value().map_or(domain.max, |v| v.min(domain.max));
        if lo < hi {
            return true;
        }
        lo == hi && self.contains(lo)
    }

    pub(crate) fn compile(&self) -> CompiledPredicate {
        CompiledPredicate {
            field: self.field.index(),
            low: self.low.value().unwrap_or(f64::NEG_INFINITY),
            high: self.high.value().unwrap_or(f64::INFINITY),
            low_inclusive: self.low.is_inclusive(),
            high_inclusive: self.high.is_inclusive(),
        }
    }
}

/// Flattened predicate as stored in a frozen rule table.
///
/// Open ends become infinite inclusive bounds, which every clamped (finite)
/// value satisfies.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CompiledPredicate {
    field: usize,
    low: f64,
    high: f64,
    low_inclusive: bool,
    high_inclusive: bool,
}

impl CompiledPredicate {
    #[inline]
    pub(crate) fn field(&self) -> usize {
        self.field
    }

    #[inline]
    pub(crate) fn matches(&self, fields: &[f64; Field::COUNT]) -> bool {
        let v = fields[self.field];
        let above_low = if self.low_inclusive {
            v >= self.low
        } else {
            v > self.low
        };
        let below_high = if self.high_inclusive {
            v <= self.high
        } else {
            v < self.high
        };
        above_low && below_high
    }
}

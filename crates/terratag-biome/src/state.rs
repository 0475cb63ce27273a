//! Per-worker classification state.
//!
//! Each generation worker owns one [`ClassifierState`] for its whole lifetime
//! and passes it by `&mut` into every classification. The state is scratch
//! space: the clamped field vector and derived climate quantities are
//! rewritten at the start of every call, so nothing from a previous point
//! can leak into the next result.

use std::ops::AddAssign;

use crate::field::{Field, SampleDomain, SamplePoint};
use crate::tag::TagSet;

/// Performance counters accumulated by one worker.
///
/// Counters never influence classification results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassifierStats {
    /// Points classified.
    pub points: u64,
    /// Raw values that were out of domain or non-finite and got clamped.
    pub clamped_values: u64,
    /// Points that matched no rule.
    pub unclassified: u64,
    /// Points whose output filled up to `MAX_TAGS`.
    pub saturated: u64,
}

impl AddAssign for ClassifierStats {
    fn add_assign(&mut self, rhs: Self) {
        self.points += rhs.points;
        self.clamped_values += rhs.clamped_values;
        self.unclassified += rhs.unclassified;
        self.saturated += rhs.saturated;
    }
}

/// Scratch memory for one worker.
///
/// Every classification takes the state by `&mut`, so one state is never
/// used by two threads at once.
#[derive(Clone, Debug)]
pub struct ClassifierState {
    fields: [f64; Field::COUNT],
    stats: ClassifierStats,
}

impl Default for ClassifierState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierState {
    /// Creates zeroed scratch storage. Call once per worker.
    pub fn new() -> Self {
        Self {
            fields: [0.0; Field::COUNT],
            stats: ClassifierStats::default(),
        }
    }

    /// Counters accumulated since creation or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> ClassifierStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ClassifierStats::default();
    }

    /// Clamps `point` into `domain` and computes derived fields.
    ///
    /// Every slot of the field vector is written; the latitude is only
    /// computed when `with_latitude` is set and is zero otherwise.
    pub(crate) fn load(&mut self, point: &SamplePoint, domain: &SampleDomain, with_latitude: bool) {
        let n = point.position_normal;
        let q = point.noise_location;
        let raw: [f64; Field::RAW_COUNT] = [
            point.altitude,
            point.steepness,
            point.river_distance,
            point.temperature_summer,
            point.temperature_winter,
            point.rainfall_summer,
            point.rainfall_winter,
            n.x,
            n.y,
            n.z,
            q.x,
            q.y,
            q.z,
        ];

        let mut clamped = 0;
        for (i, value) in raw.into_iter().enumerate() {
            let (v, changed) = domain.bounds(Field::ALL[i]).clamp(value);
            self.fields[i] = v;
            clamped += u64::from(changed);
        }

        let f = &mut self.fields;
        let t_summer = f[Field::TemperatureSummer.index()];
        let t_winter = f[Field::TemperatureWinter.index()];
        f[Field::TemperatureMean.index()] = (t_summer + t_winter) * 0.5;
        f[Field::TemperatureRange.index()] = (t_summer - t_winter).abs();
        f[Field::RainfallAnnual.index()] =
            f[Field::RainfallSummer.index()] + f[Field::RainfallWinter.index()];
        f[Field::Latitude.index()] = if with_latitude {
            latitude_degrees(
                f[Field::NormalX.index()],
                f[Field::NormalY.index()],
                f[Field::NormalZ.index()],
            )
        } else {
            0.0
        };

        self.stats.points += 1;
        self.stats.clamped_values += clamped;
    }

    /// The field vector written by the last [`load`](Self::load).
    #[inline]
    pub(crate) fn fields(&self) -> &[f64; Field::COUNT] {
        &self.fields
    }

    pub(crate) fn record(&mut self, tags: &TagSet) {
        if tags.is_empty() {
            self.stats.unclassified += 1;
        } else if tags.is_full() {
            self.stats.saturated += 1;
        }
    }
}

/// Absolute latitude in degrees of a (not necessarily unit) normal, with +Y
/// as the polar axis. Uses `libm` so results are bit-identical across
/// platforms.
fn latitude_degrees(x: f64, y: f64, z: f64) -> f64 {
    let len = libm::sqrt(x * x + y * y + z * z);
    if len == 0.0 {
        return 0.0;
    }
    let s = (y.abs() / len).min(1.0);
    libm::asin(s).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn value(state: &ClassifierState, field: Field) -> f64 {
        state.fields()[field.index()]
    }

    #[test]
    fn test_new_state_is_zeroed() {
        let state = ClassifierState::new();
        assert!(state.fields().iter().all(|&v| v == 0.0));
        assert_eq!(state.stats(), ClassifierStats::default());
    }

    #[test]
    fn test_load_clamps_and_counts() {
        let mut state = ClassifierState::new();
        let point = SamplePoint {
            altitude: -1.0e9,
            steepness: f64::NAN,
            rainfall_summer: f64::INFINITY,
            ..Default::default()
        };
        state.load(&point, &SampleDomain::default(), false);

        assert_eq!(value(&state, Field::Altitude), -11_000.0);
        assert_eq!(value(&state, Field::Steepness), 0.0);
        assert_eq!(value(&state, Field::RainfallSummer), 10_000.0);
        assert_eq!(state.stats().clamped_values, 3);
        assert_eq!(state.stats().points, 1);
    }

    #[test]
    fn test_derived_climate_fields() {
        let mut state = ClassifierState::new();
        let point = SamplePoint {
            temperature_summer: 5.0,
            temperature_winter: 25.0,
            rainfall_summer: 300.0,
            rainfall_winter: 120.0,
            ..Default::default()
        };
        state.load(&point, &SampleDomain::default(), false);

        assert_eq!(value(&state, Field::TemperatureMean), 15.0);
        assert_eq!(value(&state, Field::TemperatureRange), 20.0);
        assert_eq!(value(&state, Field::RainfallAnnual), 420.0);
    }

    #[test]
    fn test_derived_fields_use_clamped_inputs() {
        let mut state = ClassifierState::new();
        let point = SamplePoint {
            temperature_summer: 500.0,
            temperature_winter: 0.0,
            ..Default::default()
        };
        state.load(&point, &SampleDomain::default(), false);
        assert_eq!(value(&state, Field::TemperatureMean), 50.0);
    }

    #[test]
    fn test_latitude_at_pole_and_equator() {
        let mut state = ClassifierState::new();
        let domain = SampleDomain::default();

        let pole = SamplePoint {
            position_normal: DVec3::NEG_Y,
            ..Default::default()
        };
        state.load(&pole, &domain, true);
        assert!((value(&state, Field::Latitude) - 90.0).abs() < 1e-9);

        let equator = SamplePoint {
            position_normal: DVec3::X,
            ..Default::default()
        };
        state.load(&equator, &domain, true);
        assert!(value(&state, Field::Latitude).abs() < 1e-9);

        let mid = SamplePoint {
            position_normal: DVec3::new(1.0, 1.0, 0.0),
            ..Default::default()
        };
        state.load(&mid, &domain, true);
        assert!((value(&state, Field::Latitude) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_normal_has_zero_latitude() {
        let mut state = ClassifierState::new();
        state.load(&SamplePoint::default(), &SampleDomain::default(), true);
        assert_eq!(value(&state, Field::Latitude), 0.0);
    }

    #[test]
    fn test_load_overwrites_previous_point() {
        let domain = SampleDomain::default();
        let a = SamplePoint {
            altitude: 1234.0,
            position_normal: DVec3::Y,
            temperature_summer: 30.0,
            ..Default::default()
        };
        let b = SamplePoint {
            river_distance: 10.0,
            ..Default::default()
        };

        let mut reused = ClassifierState::new();
        reused.load(&a, &domain, true);
        reused.load(&b, &domain, true);

        let mut fresh = ClassifierState::new();
        fresh.load(&b, &domain, true);

        assert_eq!(reused.fields(), fresh.fields());
    }

    #[test]
    fn test_stats_accumulate() {
        let mut total = ClassifierStats::default();
        total += ClassifierStats {
            points: 3,
            clamped_values: 1,
            unclassified: 2,
            saturated: 0,
        };
        total += ClassifierStats {
            points: 4,
            clamped_values: 0,
            unclassified: 1,
            saturated: 1,
        };
        assert_eq!(total.points, 7);
        assert_eq!(total.unclassified, 3);
        assert_eq!(total.saturated, 1);
    }
}

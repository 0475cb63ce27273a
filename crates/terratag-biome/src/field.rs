//! Sample points, the fields predicates can test, and the clamping domain.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One environmental sample of a world location, produced by the field
/// sampler of the generation pipeline.
///
/// Values may be out of domain or non-finite; the classifier clamps them
/// before any rule is evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SamplePoint {
    /// Surface normal of the point on the planet (usually unit length).
    pub position_normal: DVec3,
    /// Location in noise space.
    pub noise_location: DVec3,
    /// Altitude relative to sea level, in meters.
    pub altitude: f64,
    /// Normalized slope: 0 is flat, 1 is vertical.
    pub steepness: f64,
    /// Distance to the nearest river, in meters.
    pub river_distance: f64,
    /// Mean summer temperature, in °C.
    pub temperature_summer: f64,
    /// Mean winter temperature, in °C.
    pub temperature_winter: f64,
    /// Summer rainfall, in mm.
    pub rainfall_summer: f64,
    /// Winter rainfall, in mm.
    pub rainfall_winter: f64,
}

/// A scalar a rule predicate can test.
///
/// The first [`Field::RAW_COUNT`] variants are read (and clamped) straight
/// from a [`SamplePoint`]; the rest are derived from the clamped values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Altitude,
    Steepness,
    RiverDistance,
    TemperatureSummer,
    TemperatureWinter,
    RainfallSummer,
    RainfallWinter,
    NormalX,
    NormalY,
    NormalZ,
    NoiseX,
    NoiseY,
    NoiseZ,
    /// Mean of summer and winter temperature.
    TemperatureMean,
    /// Absolute difference between summer and winter temperature.
    TemperatureRange,
    /// Sum of summer and winter rainfall.
    RainfallAnnual,
    /// Absolute latitude in degrees, with +Y as the polar axis.
    Latitude,
}

impl Field {
    /// Total number of fields, raw and derived.
    pub const COUNT: usize = 17;

    /// Number of fields read directly from a [`SamplePoint`].
    pub const RAW_COUNT: usize = 13;

    /// Every field in index order.
    pub const ALL: [Field; Self::COUNT] = [
        Field::Altitude,
        Field::Steepness,
        Field::RiverDistance,
        Field::TemperatureSummer,
        Field::TemperatureWinter,
        Field::RainfallSummer,
        Field::RainfallWinter,
        Field::NormalX,
        Field::NormalY,
        Field::NormalZ,
        Field::NoiseX,
        Field::NoiseY,
        Field::NoiseZ,
        Field::TemperatureMean,
        Field::TemperatureRange,
        Field::RainfallAnnual,
        Field::Latitude,
    ];

    /// Dense index of this field, usable into a `[f64; Field::COUNT]`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for fields computed from other fields.
    #[inline]
    pub fn is_derived(self) -> bool {
        self.index() >= Self::RAW_COUNT
    }

    /// Stable snake_case name, used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Field::Altitude => "altitude",
            Field::Steepness => "steepness",
            Field::RiverDistance => "river_distance",
            Field::TemperatureSummer => "temperature_summer",
            Field::TemperatureWinter => "temperature_winter",
            Field::RainfallSummer => "rainfall_summer",
            Field::RainfallWinter => "rainfall_winter",
            Field::NormalX => "normal_x",
            Field::NormalY => "normal_y",
            Field::NormalZ => "normal_z",
            Field::NoiseX => "noise_x",
            Field::NoiseY => "noise_y",
            Field::NoiseZ => "noise_z",
            Field::TemperatureMean => "temperature_mean",
            Field::TemperatureRange => "temperature_range",
            Field::RainfallAnnual => "rainfall_annual",
            Field::Latitude => "latitude",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A closed interval `[min, max]` that a field is clamped into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDomain {
    pub min: f64,
    pub max: f64,
}

impl FieldDomain {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps `value` into the domain.
    ///
    /// NaN has no nearest bound and maps to `min`. Returns the clamped value
    /// and whether it differs from the input.
    #[inline]
    pub fn clamp(self, value: f64) -> (f64, bool) {
        if value.is_nan() {
            (self.min, true)
        } else if value < self.min {
            (self.min, true)
        } else if value > self.max {
            (self.max, true)
        } else {
            (value, false)
        }
    }

    /// Returns `true` if both bounds are finite and `min <= max`.
    pub fn is_well_formed(self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Clamping intervals for every raw field.
///
/// Seasonal temperatures share one interval, as do seasonal rainfalls and
/// the components of each vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleDomain {
    /// Altitude in meters.
    pub altitude: FieldDomain,
    /// Normalized slope.
    pub steepness: FieldDomain,
    /// River distance in meters.
    pub river_distance: FieldDomain,
    /// Summer and winter temperature in °C.
    pub temperature: FieldDomain,
    /// Summer and winter rainfall in mm.
    pub rainfall: FieldDomain,
    /// Each component of the position normal.
    pub normal_component: FieldDomain,
    /// Each component of the noise location.
    pub noise_component: FieldDomain,
}

impl Default for SampleDomain {
    fn default() -> Self {
        Self {
            altitude: FieldDomain::new(-11_000.0, 9_000.0),
            steepness: FieldDomain::new(0.0, 1.0),
            river_distance: FieldDomain::new(0.0, 1_000_000.0),
            temperature: FieldDomain::new(-100.0, 100.0),
            rainfall: FieldDomain::new(0.0, 10_000.0),
            normal_component: FieldDomain::new(-1.0, 1.0),
            noise_component: FieldDomain::new(-10_000_000.0, 10_000_000.0),
        }
    }
}

impl SampleDomain {
    /// Range of values `field` can take after clamping.
    ///
    /// For derived fields this is the range implied by the raw domains.
    pub fn bounds(&self, field: Field) -> FieldDomain {
        match field {
            Field::Altitude => self.altitude,
            Field::Steepness => self.steepness,
            Field::RiverDistance => self.river_distance,
            Field::TemperatureSummer | Field::TemperatureWinter | Field::TemperatureMean => {
                self.temperature
            }
            Field::RainfallSummer | Field::RainfallWinter => self.rainfall,
            Field::NormalX | Field::NormalY | Field::NormalZ => self.normal_component,
            Field::NoiseX | Field::NoiseY | Field::NoiseZ => self.noise_component,
            Field::TemperatureRange => {
                FieldDomain::new(0.0, self.temperature.max - self.temperature.min)
            }
            Field::RainfallAnnual => {
                FieldDomain::new(2.0 * self.rainfall.min, 2.0 * self.rainfall.max)
            }
            Field::Latitude => FieldDomain::new(0.0, 90.0),
        }
    }

    /// Returns the first raw field whose interval is not well formed.
    pub fn first_invalid(&self) -> Option<(Field, FieldDomain)> {
        Field::ALL[..Field::RAW_COUNT]
            .iter()
            .map(|&field| (field, self.bounds(field)))
            .find(|(_, domain)| !domain.is_well_formed())
    }
}

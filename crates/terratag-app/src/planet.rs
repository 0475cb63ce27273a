//! Synthetic planet: deterministic simplex-noise fields for every input of
//! the biome classifier.
//!
//! This is survey tooling, not a terrain generator. The fields only need to
//! be plausible enough to exercise every rule in a manifest: oceans and
//! continents, a latitude temperature gradient with altitude lapse rate,
//! seasonal swing growing towards the poles, and noisy rainfall and rivers.

use glam::DVec3;
use noise::{NoiseFn, Simplex};
use terratag_biome::SamplePoint;
use terratag_config::SurveyConfig;

/// Frequency of the continent noise on the unit sphere.
const CONTINENT_FREQUENCY: f64 = 1.6;
const CONTINENT_OCTAVES: u32 = 6;
/// Distance along the surface used for the slope estimate, in unit-sphere
/// units (about 6 km on an Earth-sized planet).
const SLOPE_STEP: f64 = 1.0e-3;
/// Planet radius used to turn the slope estimate into meters.
const RADIUS_M: f64 = 6_371_000.0;
const RIVER_FREQUENCY: f64 = 9.0;
/// Noise value at which a point counts as on a river.
const RIVER_WIDTH: f64 = 0.02;
/// Temperature drop per meter of altitude.
const LAPSE_RATE: f64 = 0.0065;

/// A deterministic planet defined by a seed and a [`SurveyConfig`].
pub struct SyntheticPlanet {
    continent_noise: Simplex,
    climate_noise: Simplex,
    moisture_noise: Simplex,
    river_noise: Simplex,
    max_altitude_m: f64,
    max_depth_m: f64,
    /// Subtracted from the normalized height so roughly `ocean_fraction`
    /// of the surface falls below zero.
    sea_level_bias: f64,
}

impl SyntheticPlanet {
    /// Builds the noise fields. Each field uses its own seed derived from
    /// `config.seed` so they are decorrelated.
    pub fn new(config: &SurveyConfig) -> Self {
        let seed = config.seed;
        Self {
            continent_noise: Simplex::new(seed as u32),
            climate_noise: Simplex::new(seed.wrapping_add(0x9E37_79B9) as u32),
            moisture_noise: Simplex::new(seed.wrapping_add(0xDEAD_BEEF) as u32),
            river_noise: Simplex::new(seed.wrapping_add(0xCAFE_BABE) as u32),
            max_altitude_m: config.max_altitude_m,
            max_depth_m: config.max_depth_m,
            sea_level_bias: (config.ocean_fraction - 0.5) * 0.8,
        }
    }

    /// Surface normal at a latitude/longitude in degrees, +Y towards the
    /// north pole.
    pub fn normal_at(latitude_deg: f64, longitude_deg: f64) -> DVec3 {
        let (sin_lat, cos_lat) = latitude_deg.to_radians().sin_cos();
        let (sin_lon, cos_lon) = longitude_deg.to_radians().sin_cos();
        DVec3::new(cos_lat * cos_lon, sin_lat, cos_lat * sin_lon)
    }

    /// Samples every classifier input at a latitude/longitude in degrees.
    pub fn sample(&self, latitude_deg: f64, longitude_deg: f64) -> SamplePoint {
        let normal = Self::normal_at(latitude_deg, longitude_deg);
        let noise_location = normal * CONTINENT_FREQUENCY;

        let height = self.normalized_height(normal);
        let altitude = self.altitude_from_height(height);
        let steepness = self.steepness(normal, height);

        let river_value = self.river_noise.get(scaled(normal, RIVER_FREQUENCY)).abs();
        let river_distance = (river_value - RIVER_WIDTH).max(0.0) * 200_000.0;

        let (temperature_summer, temperature_winter) =
            self.temperatures(normal, latitude_deg, altitude);
        let (rainfall_summer, rainfall_winter) = self.rainfall(normal, latitude_deg);

        SamplePoint {
            position_normal: normal,
            noise_location,
            altitude,
            steepness,
            river_distance,
            temperature_summer,
            temperature_winter,
            rainfall_summer,
            rainfall_winter,
        }
    }

    /// fBm continent height, shifted by the sea-level bias. Roughly `[-1, 1]`.
    fn normalized_height(&self, normal: DVec3) -> f64 {
        let mut total = 0.0;
        let mut frequency = CONTINENT_FREQUENCY;
        let mut amplitude = 0.5;
        for _ in 0..CONTINENT_OCTAVES {
            total += self.continent_noise.get(scaled(normal, frequency)) * amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        total * 1.6 - self.sea_level_bias
    }

    fn altitude_from_height(&self, height: f64) -> f64 {
        if height < 0.0 {
            height * self.max_depth_m
        } else {
            height * self.max_altitude_m
        }
    }

    /// Slope from a finite difference along two tangent directions, mapped
    /// to `[0, 1)` where 1 would be vertical.
    fn steepness(&self, normal: DVec3, height: f64) -> f64 {
        let tangent = normal.any_orthonormal_vector();
        let bitangent = normal.cross(tangent);
        let h_t = self.normalized_height((normal + tangent * SLOPE_STEP).normalize());
        let h_b = self.normalized_height((normal + bitangent * SLOPE_STEP).normalize());

        let run = SLOPE_STEP * RADIUS_M;
        let rise_t = self.altitude_from_height(h_t) - self.altitude_from_height(height);
        let rise_b = self.altitude_from_height(h_b) - self.altitude_from_height(height);
        let gradient = rise_t.hypot(rise_b) / run;
        (gradient.atan() / std::f64::consts::FRAC_PI_2).min(1.0)
    }

    /// Summer and winter temperature in °C. Land above sea level cools with
    /// the lapse rate; the seasonal swing grows with latitude.
    fn temperatures(&self, normal: DVec3, latitude_deg: f64, altitude: f64) -> (f64, f64) {
        let sin_lat = latitude_deg.to_radians().sin().abs();
        let base = 28.0 - 48.0 * sin_lat * sin_lat;
        let lapse = altitude.max(0.0) * LAPSE_RATE;
        let wobble = self.climate_noise.get(scaled(normal, 2.5)) * 4.0;
        let mean = base - lapse + wobble;
        let half_swing = 1.5 + 16.0 * sin_lat;
        (mean + half_swing, mean - half_swing)
    }

    /// Summer and winter rainfall in mm: wet tropics, dry subtropics, damp
    /// mid-latitudes, modulated by noise.
    fn rainfall(&self, normal: DVec3, latitude_deg: f64) -> (f64, f64) {
        let lat = latitude_deg.abs().to_radians();
        let belt = 0.55 + 0.45 * (lat * 3.0).cos();
        let moisture = (self.moisture_noise.get(scaled(normal, 3.0)) + 1.0) * 0.5;
        let annual = (belt * moisture * 3_200.0).max(0.0);
        let summer_share = 0.5 + 0.3 * self.moisture_noise.get(scaled(normal, 7.0));
        (annual * summer_share, annual * (1.0 - summer_share))
    }
}

fn scaled(v: DVec3, frequency: f64) -> [f64; 3] {
    [v.x * frequency, v.y * frequency, v.z * frequency]
}

/// A latitude/longitude survey grid.
///
/// Rows run from north to south through cell centres, so no sample sits
/// exactly on a pole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurveyGrid {
    pub columns: u32,
    pub rows: u32,
}

impl SurveyGrid {
    /// `resolution` longitude columns and `resolution / 2` latitude rows.
    pub fn new(resolution: u32) -> Self {
        Self {
            columns: resolution.max(2),
            rows: (resolution / 2).max(1),
        }
    }

    pub fn point_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Latitude in degrees of the centre of `row`.
    pub fn latitude(&self, row: u32) -> f64 {
        90.0 - (f64::from(row) + 0.5) * 180.0 / f64::from(self.rows)
    }

    /// Longitude in degrees of the centre of `column`.
    pub fn longitude(&self, column: u32) -> f64 {
        -180.0 + (f64::from(column) + 0.5) * 360.0 / f64::from(self.columns)
    }

    /// Relative surface area of a cell in `row` (cosine of its latitude).
    pub fn area_weight(&self, row: u32) -> f64 {
        self.latitude(row).to_radians().cos()
    }

    /// Samples `rows` of the grid in row-major order.
    pub fn sample_rows(
        &self,
        planet: &SyntheticPlanet,
        rows: std::ops::Range<u32>,
    ) -> Vec<SamplePoint> {
        let mut points = Vec::with_capacity(rows.len() * self.columns as usize);
        for row in rows {
            let latitude = self.latitude(row);
            for column in 0..self.columns {
                points.push(planet.sample(latitude, self.longitude(column)));
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet() -> SyntheticPlanet {
        SyntheticPlanet::new(&SurveyConfig::default())
    }

    #[test]
    fn test_normal_is_unit_with_polar_y() {
        let n = SyntheticPlanet::normal_at(90.0, 123.0);
        assert!((n - DVec3::Y).length() < 1e-12);

        let n = SyntheticPlanet::normal_at(30.0, -45.0);
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!((n.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let a = planet().sample(12.5, 77.0);
        let b = planet().sample(12.5, 77.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_terrain() {
        let other = SyntheticPlanet::new(&SurveyConfig {
            seed: 7,
            ..Default::default()
        });
        let grid = SurveyGrid::new(32);
        let a = grid.sample_rows(&planet(), 0..grid.rows);
        let b = grid.sample_rows(&other, 0..grid.rows);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fields_are_plausible() {
        let planet = planet();
        let grid = SurveyGrid::new(64);
        let points = grid.sample_rows(&planet, 0..grid.rows);

        assert!(points.iter().any(|p| p.altitude < 0.0), "no ocean");
        assert!(points.iter().any(|p| p.altitude > 0.0), "no land");
        for p in &points {
            assert!(p.altitude.is_finite());
            assert!((0.0..=1.0).contains(&p.steepness));
            assert!(p.river_distance >= 0.0);
            assert!(p.temperature_summer >= p.temperature_winter);
            assert!(p.rainfall_summer >= 0.0 && p.rainfall_winter >= 0.0);
        }
    }

    #[test]
    fn test_poles_colder_than_equator() {
        let planet = planet();
        let mean = |lat: f64| {
            (0..36)
                .map(|i| {
                    let p = planet.sample(lat, f64::from(i) * 10.0);
                    (p.temperature_summer + p.temperature_winter) * 0.5
                })
                .sum::<f64>()
                / 36.0
        };
        assert!(mean(85.0) < mean(0.0) - 20.0);
    }

    #[test]
    fn test_grid_geometry() {
        let grid = SurveyGrid::new(8);
        assert_eq!(grid.rows, 4);
        assert_eq!(grid.point_count(), 32);
        assert_eq!(grid.latitude(0), 67.5);
        assert_eq!(grid.latitude(3), -67.5);
        assert_eq!(grid.longitude(0), -157.5);
        assert!(grid.area_weight(0) < grid.area_weight(1));
    }

    #[test]
    fn test_sample_rows_is_row_major() {
        let planet = planet();
        let grid = SurveyGrid::new(8);
        let points = grid.sample_rows(&planet, 1..3);
        assert_eq!(points.len(), 16);
        assert_eq!(points[8], planet.sample(grid.latitude(2), grid.longitude(0)));
    }
}

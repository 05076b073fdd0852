use crate::vehicles::SpawnPoint;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Seeded generation of spawn positions, headings and delivery waypoints.
///
/// This stands in for the procedural world layer: the control core only ever
/// sees the resulting positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomStartConfig {
    /// Seed for reproducible placement; entropy when absent
    pub seed: Option<u64>,
    /// Half extent of the square spawn area around the origin [m]
    pub half_extent_m: f64,
    /// Minimum planar distance between generated waypoints and the origin [m]
    pub min_waypoint_distance_m: f64,
}

impl Default for RandomStartConfig {
    fn default() -> Self {
        Self {
            seed: Some(42),
            half_extent_m: 200.0,
            min_waypoint_distance_m: 20.0,
        }
    }
}

impl RandomStartConfig {
    fn rng(&self, stream: u64) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => {
                info!(seed, "seeding start generator");
                ChaCha8Rng::seed_from_u64(seed.wrapping_add(stream))
            }
            None => {
                warn!("no seed provided, using entropy");
                ChaCha8Rng::from_entropy()
            }
        }
    }

    /// Ground-level spawn points with random headings
    pub fn generate_spawns(&self, count: usize) -> Vec<SpawnPoint> {
        let mut rng = self.rng(0);
        (0..count)
            .map(|_| SpawnPoint {
                position: Vector3::new(
                    rng.gen_range(-self.half_extent_m..=self.half_extent_m),
                    rng.gen_range(-self.half_extent_m..=self.half_extent_m),
                    0.0,
                ),
                heading_deg: rng.gen_range(0.0..360.0),
            })
            .collect()
    }

    /// Ground-level delivery destinations, kept clear of the origin
    pub fn generate_waypoints(&self, count: usize) -> Vec<Vector3<f64>> {
        let mut rng = self.rng(1);
        let mut points = Vec::with_capacity(count);
        while points.len() < count {
            let candidate = Vector3::new(
                rng.gen_range(-self.half_extent_m..=self.half_extent_m),
                rng.gen_range(-self.half_extent_m..=self.half_extent_m),
                0.0,
            );
            if candidate.xy().norm() >= self.min_waypoint_distance_m {
                points.push(candidate);
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let config = RandomStartConfig::default();
        let first = config.generate_spawns(4);
        let second = config.generate_spawns(4);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.heading_deg, b.heading_deg);
        }
    }

    #[test]
    fn test_spawns_stay_inside_area() {
        let config = RandomStartConfig::default();
        for spawn in config.generate_spawns(32) {
            assert!(spawn.position.x.abs() <= 200.0);
            assert!(spawn.position.y.abs() <= 200.0);
            assert_eq!(spawn.position.z, 0.0);
            assert!((0.0..360.0).contains(&spawn.heading_deg));
        }
    }

    #[test]
    fn test_waypoints_respect_origin_clearance() {
        let config = RandomStartConfig::default();
        for point in config.generate_waypoints(16) {
            assert!(point.xy().norm() >= 20.0);
        }
    }
}

use crate::utils::math::planar_distance;
use nalgebra::Vector3;

/// Ordered set of delivery destinations for one vehicle.
///
/// Waypoints are claimed greedily by nearest planar distance and stay in the
/// queue until an external collaborator removes them; delivery alone never
/// drops one.
#[derive(Debug, Clone, Default)]
pub struct WaypointQueue {
    points: Vec<Vector3<f64>>,
    claimed: Vec<bool>,
}

impl WaypointQueue {
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        let claimed = vec![false; points.len()];
        Self { points, claimed }
    }

    /// Replace the whole queue, dropping all claims
    pub fn replace(&mut self, points: Vec<Vector3<f64>>) {
        self.claimed = vec![false; points.len()];
        self.points = points;
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// Claim the unclaimed waypoint nearest to `from` by planar distance.
    ///
    /// Strict less-than comparison: on a tie the earliest entry wins.
    pub fn claim_nearest(&mut self, from: &Vector3<f64>) -> Option<Vector3<f64>> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, point) in self.points.iter().enumerate() {
            if self.claimed[idx] {
                continue;
            }
            let dist = planar_distance(from, point);
            match best {
                Some((_, best_dist)) if dist < best_dist => best = Some((idx, dist)),
                None => best = Some((idx, dist)),
                _ => {}
            }
        }
        best.map(|(idx, _)| {
            self.claimed[idx] = true;
            self.points[idx]
        })
    }

    /// Remove a delivered waypoint. Called by the external collaborator, not
    /// by the navigation loop.
    pub fn complete(&mut self, point: &Vector3<f64>) -> bool {
        match self
            .points
            .iter()
            .position(|p| planar_distance(p, point) < 1e-9 && (p.z - point.z).abs() < 1e-9)
        {
            Some(idx) => {
                self.points.remove(idx);
                self.claimed.remove(idx);
                true
            }
            None => false,
        }
    }
}

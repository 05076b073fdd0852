use nalgebra::Vector3;
use std::f64::consts::PI;

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Wrap a heading into [0, 360)
pub fn wrap_heading(mut heading_deg: f64) -> f64 {
    while heading_deg >= 360.0 {
        heading_deg -= 360.0;
    }
    while heading_deg < 0.0 {
        heading_deg += 360.0;
    }
    heading_deg
}

/// Signed angular error from `actual` to `target`, wrapped into (-180, 180].
///
/// Continuous across the 0/360 seam: an actual heading of 359 with a target
/// of 0 yields +1, not -359.
pub fn angular_error(target_deg: f64, actual_deg: f64) -> f64 {
    let mut err = wrap_heading(target_deg) - wrap_heading(actual_deg);
    if err > 180.0 {
        err -= 360.0;
    } else if err <= -180.0 {
        err += 360.0;
    }
    err
}

/// Heading in degrees of the horizontal component of a velocity vector
pub fn heading_from_velocity(velocity: &Vector3<f64>) -> f64 {
    wrap_heading(rad_to_deg(velocity.y.atan2(velocity.x)))
}

/// Bearing in degrees from one point to another, in the horizontal plane
pub fn bearing_to(from: &Vector3<f64>, to: &Vector3<f64>) -> f64 {
    wrap_heading(rad_to_deg((to.y - from.y).atan2(to.x - from.x)))
}

/// Distance between two points ignoring the vertical axis
pub fn planar_distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Magnitude of the horizontal component of a velocity vector
pub fn planar_speed(velocity: &Vector3<f64>) -> f64 {
    (velocity.x * velocity.x + velocity.y * velocity.y).sqrt()
}

//! Vacuum ballistics for the launched projectile.
//!
//! Pure functions over meters, seconds and degrees.

/// Gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Horizontal distance to ground impact for a launch at `velocity` m/s,
/// `launch_height` m above ground and `launch_angle` degrees above horizontal.
pub fn impact_distance(velocity: f64, launch_height: f64, launch_angle: f64) -> f64 {
    let angle = launch_angle.to_radians();
    let vx = velocity * angle.cos();
    let vy = velocity * angle.sin();
    let disc = (vy * vy + 2.0 * G_ACCEL_MPS2 * launch_height).max(0.0);
    (vx / G_ACCEL_MPS2) * (vy + disc.sqrt())
}

/// Height above ground `time` seconds after launch.
pub fn impact_height(launch_height: f64, launch_angle: f64, velocity: f64, time: f64) -> f64 {
    let vy = velocity * launch_angle.to_radians().sin();
    launch_height + vy * time - 0.5 * G_ACCEL_MPS2 * time * time
}

/// Time to cover `distance` horizontally. 0 when `velocity <= 0`.
pub fn flight_time(distance: f64, launch_angle: f64, velocity: f64) -> f64 {
    if velocity <= 0.0 {
        return 0.0;
    }
    let vx = velocity * launch_angle.to_radians().cos();
    if vx <= 0.0 {
        return 0.0;
    }
    distance / vx
}

/// Ground distance to where the line of sight meets the ground, for a device
/// `height` above ground pitched `pitch` degrees (negative = down).
///
/// Returns 0 when the sight line never meets the ground.
pub fn target_distance(height: f64, pitch: f64) -> f64 {
    if pitch >= 0.0 || height <= 0.0 {
        return 0.0;
    }
    height / (-pitch).to_radians().tan()
}

/// Height of the point `distance` along the line of sight from a device at
/// `height` pitched `pitch` degrees.
pub fn target_height(height: f64, distance: f64, pitch: f64) -> f64 {
    height + distance * pitch.to_radians().sin()
}

/// Sample `samples + 1` evenly spaced `(distance, height)` points over
/// `time_of_flight` seconds.
pub fn trajectory_points(
    velocity: f64,
    launch_height: f64,
    launch_angle: f64,
    time_of_flight: f64,
    samples: usize,
) -> Vec<(f64, f64)> {
    let samples = samples.max(1);
    let vx = velocity * launch_angle.to_radians().cos();
    (0..=samples)
        .map(|i| {
            let t = time_of_flight * i as f64 / samples as f64;
            (vx * t, impact_height(launch_height, launch_angle, velocity, t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closed_form_distance() {
        let (v, h, a) = (20.0f64, 1.0f64, 10.0f64);
        let r = a.to_radians();
        let expected = (v * r.cos() / 9.80665)
            * (v * r.sin() + ((v * r.sin()).powi(2) + 2.0 * 9.80665 * h).sqrt());
        assert_relative_eq!(impact_distance(v, h, a), expected, max_relative = 1e-6);
    }

    #[test]
    fn lands_at_ground() {
        let (v, h, a) = (20.0, 1.0, 10.0);
        let d = impact_distance(v, h, a);
        let t = flight_time(d, a, v);
        assert_relative_eq!(t, d / (v * 10f64.to_radians().cos()), max_relative = 1e-6);
        assert!(impact_height(h, a, v, t).abs() < 1e-9);
        // Apex halfway through a flat launch
        let flat = impact_distance(v, 0.0, 30.0);
        let t = flight_time(flat, 30.0, v);
        assert_relative_eq!(t, 2.0 * v * 0.5 / 9.80665, max_relative = 1e-9);
    }

    #[test]
    fn flat_range_formula() {
        // h = 0 reduces to v² sin(2α) / g
        let d = impact_distance(15.0, 0.0, 45.0);
        assert_relative_eq!(d, 225.0 / 9.80665, max_relative = 1e-9);
    }

    #[test]
    fn zero_velocity_guard() {
        assert_eq!(flight_time(10.0, 10.0, 0.0), 0.0);
        assert_eq!(flight_time(10.0, 10.0, -3.0), 0.0);
        assert_eq!(impact_distance(0.0, 1.0, 10.0), 0.0);
    }

    #[test]
    fn sight_line_helpers() {
        assert_relative_eq!(target_distance(1.0, -45.0), 1.0, epsilon = 1e-12);
        assert_eq!(target_distance(1.0, 5.0), 0.0);
        assert_relative_eq!(target_height(1.0, 2.0, 30.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(target_height(1.0, 2.0, -30.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn trajectory_endpoints() {
        let pts = trajectory_points(10.0, 0.5, 20.0, 1.0, 4);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], (0.0, 0.5));
        assert_relative_eq!(pts[4].0, 10.0 * 20f64.to_radians().cos());
    }
}

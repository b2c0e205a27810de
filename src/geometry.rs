//! Triangle solving helpers.
//!
//! All angles are in degrees. Inputs to `asin`/`acos` are clamped to
//! `[-1, 1]` so rounding on degenerate triangles yields 0° or 180° instead
//! of NaN.

/// Side opposite `angle_b` given side `a` opposite `angle_a` (law of sines).
pub fn side_from_angles(a: f64, angle_a: f64, angle_b: f64) -> f64 {
    let sin_a = angle_a.to_radians().sin();
    if sin_a == 0.0 {
        return 0.0;
    }
    a * angle_b.to_radians().sin() / sin_a
}

/// Angle opposite side `b` given side `a` opposite `angle_a` (law of sines).
///
/// Returns the acute solution.
pub fn angle_from_sides(a: f64, angle_a: f64, b: f64) -> f64 {
    if a == 0.0 {
        return 0.0;
    }
    clamped_asin(b * angle_a.to_radians().sin() / a)
}

/// Side opposite `angle` between sides `a` and `b` (law of cosines).
pub fn side_from_sas(a: f64, b: f64, angle: f64) -> f64 {
    (a * a + b * b - 2.0 * a * b * angle.to_radians().cos())
        .max(0.0)
        .sqrt()
}

/// Angle opposite side `c` in a triangle with sides `a`, `b`, `c` (law of cosines).
pub fn angle_from_sss(a: f64, b: f64, c: f64) -> f64 {
    let denom = 2.0 * a * b;
    if denom == 0.0 {
        return 0.0;
    }
    clamped_acos((a * a + b * b - c * c) / denom)
}

/// Hypotenuse of a right triangle given the adjacent side and its angle.
pub fn hypotenuse_from_adjacent(adjacent: f64, angle: f64) -> f64 {
    side_from_angles(adjacent, 90.0 - angle, 90.0)
}

/// Opposite side of a right triangle given the adjacent side and its angle.
pub fn opposite_from_adjacent(adjacent: f64, angle: f64) -> f64 {
    adjacent * angle.to_radians().tan()
}

fn clamped_asin(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin().to_degrees()
}

fn clamped_acos(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

use core::f64::consts::PI;

/// Wraps an angle into (-π, π].
///
/// Every difference of headings or bearings goes through here before it
/// enters a covariance, cross-covariance or innovation.
pub fn normalize_angle(angle: f64) -> f64 {
    let shifted = (angle + PI).rem_euclid(2.0 * PI);
    // -π and π are the same direction; keep the closed end
    if shifted == 0.0 {
        PI
    } else {
        shifted - PI
    }
}

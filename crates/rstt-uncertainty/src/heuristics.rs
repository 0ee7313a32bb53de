//! Built-in azimuth and slowness uncertainties, used when no table entry applies.

/// Azimuth uncertainty in degrees for a receiver at `distance_deg`.
pub fn azimuth_uncertainty_deg(is_array: bool, distance_deg: f64) -> f64 {
    match (is_array, distance_deg) {
        (true, d) if d < 30.0 => 5.0,
        (true, d) if d < 100.0 => 2.0,
        (true, _) => 1.0,
        (false, d) if d < 30.0 => 20.0,
        (false, d) if d < 100.0 => 10.0,
        (false, _) => 5.0,
    }
}

/// Slowness uncertainty in seconds/degree.
pub fn slowness_uncertainty_s_per_deg(is_array: bool) -> f64 {
    if is_array {
        1.5
    } else {
        2.5
    }
}

/// Default decibel reference: levels are absolute, never relative to a peak.
pub const DEFAULT_DB_REFERENCE: f64 = 1.0;

/// Magnitude to decibels against a fixed reference. Zero maps to `-inf`.
pub fn amplitude_to_db(amplitude: f64, reference: f64) -> f64 {
    20.0 * (amplitude / reference).log10()
}

/// A-weighting offset in dB for `freq` in Hz (IEC 61672 curve, 0 dB at 1 kHz).
///
/// Non-positive or non-finite frequencies return `-inf`.
pub fn a_weighting_db(freq: f64) -> f64 {
    if !freq.is_finite() || freq <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let f2 = freq * freq;
    let ra = (12200.0f64.powi(2) * f2 * f2)
        / ((f2 + 20.6f64.powi(2))
            * ((f2 + 107.7f64.powi(2)) * (f2 + 737.9f64.powi(2))).sqrt()
            * (f2 + 12200.0f64.powi(2)));
    2.00 + 20.0 * ra.log10()
}

/// Weighted level of one spectral bin, floored at 0.
///
/// A silent bin (`-inf` dB) clips to 0 and still counts. Returns `None`
/// only when the level comes out NaN or `+inf`.
pub fn weighted_level(amplitude: f64, weight_db: f64, reference: f64) -> Option<f64> {
    if amplitude <= 0.0 {
        return Some(0.0);
    }
    let level = amplitude_to_db(amplitude, reference) + weight_db;
    if level.is_nan() || level == f64::INFINITY {
        return None;
    }
    Some(level.max(0.0))
}

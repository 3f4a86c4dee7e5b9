// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent values, making it more responsive than the
// SMA.
//
// Formula:
//   k      = 2 / (period + 1)
//   EMA_0  = v_0
//   EMA_i  = (v_i - EMA_{i-1}) * k + EMA_{i-1}
//
// Seeded with the first value rather than an SMA, so there is no warm-up:
// every output entry is present.
// =============================================================================

/// Compute the EMA series for `values` and look-back `period`.
///
/// The output has exactly `values.len()` entries, all present.
///
/// # Edge cases
/// - Empty input => empty vec
/// - `period == 0` gives `k = 2`; the recurrence is still applied literally
/// - Non-finite inputs propagate through every later entry
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let Some(&seed) = values.first() else {
        return Vec::new();
    };

    let multiplier = 2.0 / (period as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    result.push(Some(seed));

    let mut prev_ema = seed;
    for &value in &values[1..] {
        let ema = (value - prev_ema) * multiplier + prev_ema;
        result.push(Some(ema));
        prev_ema = ema;
    }

    result
}

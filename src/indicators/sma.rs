// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the trailing `period` values, window inclusive of the
// current index:
//
//   SMA_i = (v_{i-period+1} + ... + v_i) / period      for i >= period - 1
//
// The first `period - 1` outputs are missing (warm-up).
// =============================================================================

/// Compute the SMA series for `values` with look-back `period`.
///
/// The output has exactly `values.len()` entries.
///
/// # Edge cases
/// - `period == 0` => every entry missing
/// - `values.len() < period` => every entry missing
/// - Each window is summed independently, so a NaN or infinite input only
///   affects the windows that contain it.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let divisor = period as f64;
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / divisor)
            }
        })
        .collect()
}

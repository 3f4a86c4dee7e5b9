// =============================================================================
// Relative Strength Index (RSI): Wilder's Smoothing
// =============================================================================
//
// Step 1: Deltas from consecutive values, with delta_0 = 0.
// Step 2: Split into gains (positive deltas) and losses (|negative deltas|).
// Step 3: Seed avg_gain / avg_loss with the mean of gains / losses at
//          indices 0..period (delta_0 included).
// Step 4: Index == period uses the seeded averages as they are.  Every later
//          index first applies Wilder's smoothing:
//            avg_gain = (avg_gain * (period - 1) + gain_i) / period
//            avg_loss = (avg_loss * (period - 1) + loss_i) / period
// Step 5: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Step 4 differs from the textbook RSI, which smooths from the first computed
// value onward; the delta at index `period` never enters the averages.
// avg_loss == 0 gives RS = Infinity and RSI = 100; both averages zero gives
// NaN.  Neither case is clamped.
// =============================================================================

/// Compute the RSI series for `values` and look-back `period`.
///
/// The output has exactly `values.len()` entries; indices below `period` are
/// missing.
///
/// # Edge cases
/// - `period == 0` => every entry missing
/// - `values.len() <= period` => every entry missing
pub fn calculate_rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if period == 0 || n <= period {
        return vec![None; n];
    }

    // --- Deltas, gains and losses --------------------------------------------
    let deltas: Vec<f64> = std::iter::once(0.0)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .collect();
    let gains: Vec<f64> = deltas.iter().map(|&d| if d > 0.0 { d } else { 0.0 }).collect();
    let losses: Vec<f64> = deltas.iter().map(|&d| if d < 0.0 { d.abs() } else { 0.0 }).collect();

    // --- Seed averages -------------------------------------------------------
    let period_f = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period_f;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period_f;

    let mut result = vec![None; period];
    result.reserve(n - period);

    for i in period..n {
        if i > period {
            avg_gain = (avg_gain * (period_f - 1.0) + gains[i]) / period_f;
            avg_loss = (avg_loss * (period_f - 1.0) + losses[i]) / period_f;
        }
        result.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    result
}

/// Convert average gain / average loss into an RSI value.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

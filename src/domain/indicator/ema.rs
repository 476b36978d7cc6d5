//! Exponential Moving Average over raw values.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) positions hold 0.0.

/// EMA over raw values, using 0.0 for warmup positions.
pub(crate) fn ema_of(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![0.0; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period - 1 {
            sum += value;
            out.push(0.0);
        } else if i == period - 1 {
            sum += value;
            ema = sum / period as f64;
            out.push(ema);
        } else {
            ema = value * k + ema * (1.0 - k);
            out.push(ema);
        }
    }

    out
}

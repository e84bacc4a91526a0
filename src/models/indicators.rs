//! Rolling statistics over price series
//!
//! All functions return a vector aligned with the input: element `t` is the
//! statistic at observation `t`. Positions without enough history are `None`
//! rather than `0.0` so that downstream models never see a fake flat price.

use super::PartialWindowPolicy;

/// Lag-k difference: `values[t] - values[t-k]`, `None` for `t < k`
///
/// A lag of 0 yields all zeros.
pub fn calculate_diff(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(t, v)| if t >= lag { Some(v - values[t - lag]) } else { None })
        .collect()
}

/// First difference of an optional series; `None` where either side is missing
pub fn calculate_diff_opt(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for t in 1..values.len() {
        if let (Some(curr), Some(prev)) = (values[t], values[t - 1]) {
            out[t] = Some(curr - prev);
        }
    }
    out
}

/// Simple moving average over `period` values
///
/// # Arguments
/// * `values` - Prices in chronological order
/// * `period` - Window size; a period of 0 yields all `None`
/// * `policy` - What to emit for `t < period - 1`
pub fn calculate_sma(values: &[f64], period: usize, policy: PartialWindowPolicy) -> Vec<Option<f64>> {
    let mut ma_values = vec![None; values.len()];

    if period == 0 {
        return ma_values;
    }

    for i in 0..values.len() {
        let start_idx = (i + 1).saturating_sub(period);
        let count = i + 1 - start_idx;
        if count < period && policy == PartialWindowPolicy::Withhold {
            continue;
        }
        let sum: f64 = values[start_idx..=i].iter().sum();
        ma_values[i] = Some(sum / count as f64);
    }

    ma_values
}

/// Exponential window weights for a window of `period` positions, oldest first
///
/// `w[k] = exp(-|k - center| / tau)` with `center = (period - 1) / 2`, the
/// symmetric exponential window.
pub fn exponential_weights(period: usize, tau: f64) -> Vec<f64> {
    let center = (period as f64 - 1.0) / 2.0;
    (0..period)
        .map(|k| (-(k as f64 - center).abs() / tau).exp())
        .collect()
}

/// Exponentially weighted rolling mean with a minimum of one observation
///
/// Partial windows at the start of the series use the trailing weights, so the
/// current value is always paired with the last weight of the window.
pub fn calculate_weighted_ma(values: &[f64], period: usize, tau: f64) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let weights = exponential_weights(period, tau);
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let start_idx = (i + 1).saturating_sub(period);
        let window = &values[start_idx..=i];
        let window_weights = &weights[period - window.len()..];

        let weighted: f64 = window.iter().zip(window_weights).map(|(v, w)| v * w).sum();
        let total: f64 = window_weights.iter().sum();
        out.push(Some(weighted / total));
    }

    out
}

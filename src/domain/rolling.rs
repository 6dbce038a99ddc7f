//! Trailing-window reductions over a single ticker partition.
//!
//! Inputs are one partition's values in date order. Outputs have the same
//! length; a position whose window is short, or contains any `None`, is `None`.
//!
//! PCT_CHANGE[i]      = X[i] / X[i-1] - 1, None for i = 0
//! MEAN(n)[i]         = sum(X[i-n+1..=i]) / n
//! STD(n)[i]          = sqrt(sum((X[j] - MEAN(n)[i])^2) / (n - 1))

pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let change = if i == 0 {
            None
        } else {
            let prev = values[i - 1];
            if prev == 0.0 {
                None
            } else {
                Some(values[i] / prev - 1.0)
            }
        };
        out.push(change);
    }
    out
}

/// The `window` values ending at `i`, or `None` if the window is short or
/// holds an undefined value.
fn trailing(values: &[Option<f64>], i: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || i + 1 < window {
        return None;
    }
    values[i + 1 - window..=i].iter().copied().collect()
}

pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let w = trailing(values, i, window)?;
            Some(w.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Sample standard deviation; needs a window of at least two.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window < 2 {
                return None;
            }
            let w = trailing(values, i, window)?;
            let mean = w.iter().sum::<f64>() / window as f64;
            let variance = w
                .iter()
                .map(|x| {
                    let diff = x - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (window - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}

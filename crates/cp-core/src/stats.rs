//! Small statistics helpers over raw value lists.

use crate::error::{Error, Result};

/// Parse whitespace-separated floats; a trailing or leading `,` on a token
/// is ignored so `1.0, 2.0, 3.0` and `1.0 2.0 3.0` read the same.
pub fn parse_values(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|tok| tok.trim_matches(','))
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|e| Error::Validation(format!("bad value '{tok}': {e}")))
        })
        .collect()
}

/// Quantile of already-sorted values with linear interpolation between
/// order statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(Error::Validation("quantile of an empty sample".into()));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(Error::Validation(format!("quantile {q} outside [0, 1]")));
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = pos - lo as f64;
    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Edges splitting `values` into `n_bins` equally populated bins:
/// the quantiles at `0, 1/n, ..., 1` (so `n_bins + 1` edges).
pub fn quantile_edges(values: &[f64], n_bins: usize) -> Result<Vec<f64>> {
    if n_bins == 0 {
        return Err(Error::Validation("need at least one quantile bin".into()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::Validation("values must be finite".into()));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    (0..=n_bins)
        .map(|k| quantile_sorted(&sorted, k as f64 / n_bins as f64))
        .collect()
}

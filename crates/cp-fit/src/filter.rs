//! Resolution curves and bad-point filtering.

use serde::{Deserialize, Serialize};

use crate::gaussian::{FitStatus, GaussianFit};

/// Parallel sequences of slice-fit results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionCurve {
    /// Group centers.
    pub x: Vec<f64>,
    /// Fitted means.
    pub mean: Vec<f64>,
    /// Fitted widths.
    pub width: Vec<f64>,
    /// Uncertainties of the means.
    pub mean_err: Vec<f64>,
    /// Uncertainties of the widths.
    pub width_err: Vec<f64>,
    /// Fit status per point.
    pub status: Vec<FitStatus>,
}

impl ResolutionCurve {
    /// Append the point `x` with the parameters of `fit`.
    pub fn push(&mut self, x: f64, fit: &GaussianFit) {
        self.x.push(x);
        self.mean.push(fit.mean);
        self.width.push(fit.sigma);
        self.mean_err.push(fit.mean_err);
        self.width_err.push(fit.sigma_err);
        self.status.push(fit.status);
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn retain(&self, keep: impl Fn(usize) -> bool) -> Self {
        let mut out = Self::default();
        for i in (0..self.len()).filter(|&i| keep(i)) {
            out.x.push(self.x[i]);
            out.mean.push(self.mean[i]);
            out.width.push(self.width[i]);
            out.mean_err.push(self.mean_err[i]);
            out.width_err.push(self.width_err[i]);
            out.status.push(self.status[i]);
        }
        out
    }
}

/// Keep points whose mean is non-zero and whose width is below
/// `max_width`, in their original order.
pub fn remove_bad_points(curve: &ResolutionCurve, max_width: f64) -> ResolutionCurve {
    curve.retain(|i| {
        let keep = curve.mean[i] != 0.0 && curve.width[i] < max_width;
        if !keep {
            log::warn!(
                "dropping point at x={:.4}: mean={}, width={} (limit {max_width})",
                curve.x[i],
                curve.mean[i],
                curve.width[i]
            );
        }
        keep
    })
}

/// Keep only points whose fit converged.
pub fn drop_unconverged(curve: &ResolutionCurve) -> ResolutionCurve {
    curve.retain(|i| {
        let keep = curve.status[i] == FitStatus::Converged;
        if !keep {
            log::warn!("dropping point at x={:.4}: fit {}", curve.x[i], curve.status[i]);
        }
        keep
    })
}

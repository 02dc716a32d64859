//! Single-Gaussian chi-square fit of a 1-D histogram.
//!
//! Model: `A·exp(-½((x - μ)/σ)²)`. The chi-square runs over non-empty bins
//! (bin centers) with their stored errors, like ROOT's default `gaus` fit.
//! Minimization happens in rescaled parameters
//! `(A/A₀, (μ - μ₀)/σ₀, σ/σ₀)` so that all three are of order one.

use std::fmt;

use cp_core::{Histogram1D, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::optimizer::{BoundedLbfgs, ObjectiveFunction, OptimizerConfig};

/// Outcome classification of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    /// The minimizer reported convergence.
    Converged,
    /// The minimizer stopped without converging, or finished with a
    /// parameter pinned at one of its limits; parameters are the best point
    /// found.
    NotConverged,
    /// Too little content to fit; all parameters are zero.
    Degenerate,
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FitStatus::Converged => "converged",
            FitStatus::NotConverged => "not converged",
            FitStatus::Degenerate => "degenerate",
        })
    }
}

/// Bins taken into the fit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "k", rename_all = "snake_case")]
pub enum FitWindow {
    /// Every in-range bin.
    #[default]
    Full,
    /// Bins whose center lies within `mean ± k·std_dev` of the histogram.
    StdDevs(f64),
}

/// Fitted Gaussian parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianFit {
    /// Peak height `A`.
    pub amplitude: f64,
    /// Mean `μ`.
    pub mean: f64,
    /// Width `σ`.
    pub sigma: f64,
    /// Uncertainty of `A`.
    pub amplitude_err: f64,
    /// Uncertainty of `μ`.
    pub mean_err: f64,
    /// Uncertainty of `σ`.
    pub sigma_err: f64,
    /// Chi-square at the minimum.
    pub chi2: f64,
    /// Fitted bins minus three.
    pub ndf: usize,
    /// Fit classification.
    pub status: FitStatus,
    /// Fit range actually used, `(lo, hi)`.
    pub range: (f64, f64),
}

impl GaussianFit {
    fn degenerate(range: (f64, f64)) -> Self {
        Self {
            amplitude: 0.0,
            mean: 0.0,
            sigma: 0.0,
            amplitude_err: 0.0,
            mean_err: 0.0,
            sigma_err: 0.0,
            chi2: 0.0,
            ndf: 0,
            status: FitStatus::Degenerate,
            range,
        }
    }

    /// Model value at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        gauss(self.amplitude, self.mean, self.sigma, x)
    }

    /// Whether the minimizer converged.
    pub fn is_converged(&self) -> bool {
        self.status == FitStatus::Converged
    }
}

const PARAMETER_NAMES: [&str; 3] = ["amplitude", "mean", "sigma"];

/// Index of the first parameter sitting on one of its bounds.
fn pinned_parameter(params: &[f64], bounds: &[(f64, f64)]) -> Option<usize> {
    params.iter().zip(bounds).position(|(&v, &(lo, hi))| {
        let tol = |b: f64| 1e-6 * b.abs().max(1.0);
        (v - lo).abs() <= tol(lo) || (hi - v).abs() <= tol(hi)
    })
}

fn gauss(amplitude: f64, mean: f64, sigma: f64, x: f64) -> f64 {
    if sigma == 0.0 {
        return 0.0;
    }
    let z = (x - mean) / sigma;
    amplitude * (-0.5 * z * z).exp()
}

/// Chi-square of a Gaussian against binned points, in natural parameters.
struct GaussianChi2 {
    x: Vec<f64>,
    y: Vec<f64>,
    /// `1 / error²` per point.
    weight: Vec<f64>,
}

impl GaussianChi2 {
    fn value(&self, p: [f64; 3]) -> f64 {
        let [a, mu, sigma] = p;
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.weight)
            .map(|((&x, &y), &w)| {
                let r = y - gauss(a, mu, sigma, x);
                w * r * r
            })
            .sum()
    }

    fn gradient(&self, p: [f64; 3]) -> [f64; 3] {
        let [a, mu, sigma] = p;
        let mut g = [0.0; 3];
        for ((&x, &y), &w) in self.x.iter().zip(&self.y).zip(&self.weight) {
            let z = (x - mu) / sigma;
            let e = (-0.5 * z * z).exp();
            let c = -2.0 * w * (y - a * e);
            g[0] += c * e;
            g[1] += c * a * e * z / sigma;
            g[2] += c * a * e * z * z / sigma;
        }
        g
    }
}

/// [`GaussianChi2`] over rescaled parameters, divided by its starting value.
struct ScaledChi2<'a> {
    chi2: &'a GaussianChi2,
    origin: [f64; 3],
    norm: f64,
}

impl ScaledChi2<'_> {
    fn natural(&self, q: &[f64]) -> [f64; 3] {
        let [a0, mu0, s0] = self.origin;
        [q[0] * a0, mu0 + q[1] * s0, q[2] * s0]
    }

    /// `d(natural)/d(scaled)` for each parameter.
    fn jacobian(&self) -> [f64; 3] {
        [self.origin[0], self.origin[2], self.origin[2]]
    }

    fn raw_gradient(&self, q: &[f64]) -> [f64; 3] {
        let g = self.chi2.gradient(self.natural(q));
        let d = self.jacobian();
        [g[0] * d[0], g[1] * d[1], g[2] * d[2]]
    }
}

impl ObjectiveFunction for ScaledChi2<'_> {
    fn eval(&self, q: &[f64]) -> Result<f64> {
        Ok(self.chi2.value(self.natural(q)) / self.norm)
    }

    fn gradient(&self, q: &[f64]) -> Result<Vec<f64>> {
        Ok(self.raw_gradient(q).iter().map(|g| g / self.norm).collect())
    }
}

/// Fits single Gaussians to 1-D histograms.
#[derive(Debug, Clone)]
pub struct GaussianFitter {
    optimizer: BoundedLbfgs,
    min_entries: f64,
}

impl Default for GaussianFitter {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl GaussianFitter {
    /// Fitter using the given optimizer settings.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { optimizer: BoundedLbfgs::new(config), min_entries: 1e-9 }
    }

    /// Total content below which a histogram is treated as empty.
    pub fn with_min_entries(mut self, min_entries: f64) -> Self {
        self.min_entries = min_entries;
        self
    }

    /// Fit `h` over `window`.
    pub fn fit(&self, h: &Histogram1D, window: FitWindow) -> Result<GaussianFit> {
        let range = match window {
            FitWindow::Full => (h.axis.x_min(), h.axis.x_max()),
            FitWindow::StdDevs(k) => {
                let (mean, std) = (h.mean(), h.std_dev());
                (mean - k * std, mean + k * std)
            }
        };

        let mut chi2 = GaussianChi2 { x: Vec::new(), y: Vec::new(), weight: Vec::new() };
        for bin in 1..=h.n_bins() {
            let (x, y, err) = (h.axis.bin_center(bin), h.bin_content(bin), h.bin_error(bin));
            if y == 0.0 || err <= 0.0 || x < range.0 || x > range.1 {
                continue;
            }
            chi2.x.push(x);
            chi2.y.push(y);
            chi2.weight.push(1.0 / (err * err));
        }

        let total: f64 = chi2.y.iter().sum();
        let peak = chi2.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if chi2.x.len() < 3 || total < self.min_entries || peak <= 0.0 {
            log::debug!("{}: degenerate ({} bins, content {total})", h.name, chi2.x.len());
            return Ok(GaussianFit::degenerate(range));
        }

        // Starting point from the moments of the fitted bins.
        let mu0 = chi2.x.iter().zip(&chi2.y).map(|(x, y)| x * y).sum::<f64>() / total;
        let var0 = chi2.x.iter().zip(&chi2.y).map(|(x, y)| y * (x - mu0).powi(2)).sum::<f64>() / total;
        let bin_width = h.axis.bin_width(1);
        let sigma0 = if var0 > 0.0 { var0.sqrt() } else { bin_width };

        let (x_min, x_max) = (h.axis.x_min(), h.axis.x_max());
        let origin = [peak, mu0.clamp(x_min, x_max), sigma0];
        let sigma_bounds = (bin_width / 100.0, x_max - x_min);
        let natural_bounds = [(0.0, 10.0 * peak), (x_min, x_max), sigma_bounds];
        let bounds = [
            (natural_bounds[0].0 / origin[0], natural_bounds[0].1 / origin[0]),
            ((x_min - origin[1]) / sigma0, (x_max - origin[1]) / sigma0),
            (sigma_bounds.0 / sigma0, sigma_bounds.1 / sigma0),
        ];
        let init = [1.0, 0.0, 1.0f64.clamp(bounds[2].0, bounds[2].1)];

        let norm = chi2.value([origin[0], origin[1], init[2] * sigma0]).max(1.0);
        let objective = ScaledChi2 { chi2: &chi2, origin, norm };

        let (best, status) = match self.optimizer.minimize(&objective, &init, &bounds) {
            Ok(res) if !res.converged => {
                log::debug!("{}: {}", h.name, res.message);
                (res.parameters, FitStatus::NotConverged)
            }
            Ok(res) => match pinned_parameter(&res.parameters, &bounds) {
                Some(i) => {
                    let value = objective.natural(&res.parameters)[i];
                    log::warn!("{}: {} = {value} is at its limit", h.name, PARAMETER_NAMES[i]);
                    (res.parameters, FitStatus::NotConverged)
                }
                None => (res.parameters, FitStatus::Converged),
            },
            Err(e) => {
                log::warn!("{}: minimization failed: {e}", h.name);
                (init.to_vec(), FitStatus::NotConverged)
            }
        };

        let p = objective.natural(&best);
        let errors = parameter_errors(&objective, &best);
        Ok(GaussianFit {
            amplitude: p[0],
            mean: p[1],
            sigma: p[2],
            amplitude_err: errors[0],
            mean_err: errors[1],
            sigma_err: errors[2],
            chi2: chi2.value(p),
            ndf: chi2.x.len() - 3,
            status,
            range,
        })
    }
}

/// Fit `h` with the default fitter.
pub fn fit_gaussian(h: &Histogram1D, window: FitWindow) -> Result<GaussianFit> {
    GaussianFitter::default().fit(h, window)
}

/// Natural-parameter uncertainties from `2·H⁻¹` of the chi-square.
fn parameter_errors(objective: &ScaledChi2, best: &[f64]) -> [f64; 3] {
    let hessian = scaled_hessian(objective, best);
    let d = objective.jacobian();
    match invert_hessian(&hessian) {
        Some(cov) => [0, 1, 2].map(|i| (2.0 * cov[(i, i)]).sqrt() * d[i]),
        None => [0, 1, 2].map(|i| (2.0 / hessian[(i, i)].abs().max(1e-12)).sqrt() * d[i]),
    }
}

/// Forward differences of the analytic gradient, symmetrized.
fn scaled_hessian(objective: &ScaledChi2, best: &[f64]) -> DMatrix<f64> {
    let n = best.len();
    let center = objective.raw_gradient(best);
    let mut hessian = DMatrix::zeros(n, n);
    for j in 0..n {
        let eps = 1e-5 * best[j].abs().max(1.0);
        let mut shifted = best.to_vec();
        shifted[j] += eps;
        let plus = objective.raw_gradient(&shifted);
        for i in 0..n {
            hessian[(i, j)] = (plus[i] - center[i]) / eps;
        }
    }
    let transposed = hessian.transpose();
    (&hessian + &transposed) * 0.5
}

/// Damped Cholesky inverse, falling back to LU; `None` if any variance is
/// not positive.
fn invert_hessian(hessian: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let n = hessian.nrows();
    let identity = DMatrix::identity(n, n);
    let diag_scale = (0..n).map(|i| hessian[(i, i)].abs()).fold(0.0_f64, f64::max).max(1.0);

    let mut damped = hessian.clone();
    let mut damping = 0.0_f64;
    for _ in 0..10 {
        if let Some(chol) = nalgebra::linalg::Cholesky::new(damped.clone()) {
            return Some(chol.solve(&identity));
        }
        let next = if damping == 0.0 { diag_scale * 1e-9 } else { damping * 10.0 };
        for i in 0..n {
            damped[(i, i)] += next - damping;
        }
        damping = next;
    }

    let cov = damped.lu().try_inverse()?;
    (0..n).all(|i| cov[(i, i)].is_finite() && cov[(i, i)] > 0.0).then_some(cov)
}

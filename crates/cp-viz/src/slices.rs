//! Slice pages: every projection of one slice fit with its Gaussian.

use cp_fit::{FitStatus, SliceFits};
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;

/// Fitted Gaussian drawn over a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitCurve {
    /// Peak height.
    pub amplitude: f64,
    /// Mean.
    pub mean: f64,
    /// Width.
    pub sigma: f64,
    /// Chi-square over degrees of freedom (0 when `ndf` is 0).
    pub chi2_ndf: f64,
    /// Fit range.
    pub range: [f64; 2],
    /// Fit classification.
    pub status: FitStatus,
}

impl FitCurve {
    /// Model value at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        if self.sigma <= 0.0 {
            return 0.0;
        }
        let z = (x - self.mean) / self.sigma;
        self.amplitude * (-0.5 * z * z).exp()
    }
}

/// One projection panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlicePanel {
    /// Panel title (`x ∈ [lo, hi]`).
    pub title: String,
    /// Low x edge of the slice.
    pub x_low: f64,
    /// High x edge of the slice.
    pub x_high: f64,
    /// Projection bin edges.
    pub edges: Vec<f64>,
    /// Projection contents.
    pub contents: Vec<f64>,
    /// Projection errors.
    pub errors: Vec<f64>,
    /// The fit.
    pub fit: FitCurve,
}

/// Plot-friendly artifact of one slice fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlicesArtifact {
    /// Artifact schema version.
    pub schema_version: String,
    /// Page title.
    pub title: String,
    /// Output stem.
    pub name: String,
    /// Panels in slice order.
    pub panels: Vec<SlicePanel>,
}

impl SlicesArtifact {
    /// Collect the projections and fits of `fits`.
    pub fn from_fits(title: impl Into<String>, name: impl Into<String>, fits: &SliceFits) -> Self {
        let panels = fits
            .slices
            .iter()
            .map(|s| {
                let chi2_ndf = if s.fit.ndf > 0 { s.fit.chi2 / s.fit.ndf as f64 } else { 0.0 };
                SlicePanel {
                    title: format!("[{:.3}, {:.3}]", s.x_low, s.x_high),
                    x_low: s.x_low,
                    x_high: s.x_high,
                    edges: s.projection.axis.edges(),
                    contents: s.projection.contents.clone(),
                    errors: s.projection.errors(),
                    fit: FitCurve {
                        amplitude: s.fit.amplitude,
                        mean: s.fit.mean,
                        sigma: s.fit.sigma,
                        chi2_ndf,
                        range: [s.fit.range.0, s.fit.range.1],
                        status: s.fit.status,
                    },
                }
            })
            .collect();
        Self { schema_version: SCHEMA_VERSION.to_string(), title: title.into(), name: name.into(), panels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cp_core::{Axis, Histogram2D};
    use cp_fit::{SliceFitConfig, fit_slices};

    #[test]
    fn panels_mirror_slices() {
        let mut h = Histogram2D::new(
            "h",
            "",
            Axis::uniform(4, 0.0, 4.0).unwrap(),
            Axis::uniform(40, -2.0, 2.0).unwrap(),
        );
        let centers = h.y_axis.centers();
        for ix in 1..=4 {
            for (iy, &y) in centers.iter().enumerate() {
                h.set_bin_content(ix, iy + 1, (200.0 * (-0.5 * (y / 0.4).powi(2)).exp()).round()).unwrap();
            }
        }
        let fits = fit_slices(&h, &SliceFitConfig::new((0.0, 4.0), 2)).unwrap();
        let art = SlicesArtifact::from_fits("h slices", "h_slices", &fits);

        assert_eq!(art.panels.len(), 2);
        assert_eq!(art.panels[0].title, "[0.000, 2.000]");
        assert_eq!(art.panels[1].x_low, 2.0);
        assert_eq!(art.panels[0].edges.len(), 41);
        assert_eq!(art.panels[0].contents.len(), 40);
        let fit = &art.panels[0].fit;
        assert_relative_eq!(fit.eval(fit.mean), fit.amplitude);
        assert_relative_eq!(fit.sigma, 0.4, epsilon = 0.02);
    }

    #[test]
    fn degenerate_curve_evaluates_to_zero() {
        let fit = FitCurve {
            amplitude: 0.0,
            mean: 0.0,
            sigma: 0.0,
            chi2_ndf: 0.0,
            range: [0.0, 1.0],
            status: FitStatus::Degenerate,
        };
        assert_eq!(fit.eval(0.3), 0.0);
    }
}

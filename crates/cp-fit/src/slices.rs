//! Slice fits: Gaussian fits of y-projections over groups of x bins.

use cp_core::{Axis, Error, Histogram1D, Histogram2D, Result};
use serde::{Deserialize, Serialize};

use crate::filter::ResolutionCurve;
use crate::gaussian::{FitWindow, GaussianFit, GaussianFitter};

/// Parameters of a slice fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceFitConfig {
    /// Independent-variable range `(lo, hi)`.
    pub x_range: (f64, f64),
    /// Number of x bins per group.
    pub step: usize,
    /// Bins of each projection that enter its fit.
    #[serde(default)]
    pub window: FitWindow,
}

impl SliceFitConfig {
    /// Config with the full fit window.
    pub fn new(x_range: (f64, f64), step: usize) -> Self {
        Self { x_range, step, window: FitWindow::Full }
    }

    /// Set the fit window.
    pub fn with_window(mut self, window: FitWindow) -> Self {
        self.window = window;
        self
    }
}

/// One group of x bins, its projection and its fit.
#[derive(Debug, Clone)]
pub struct Slice {
    /// Group index, from 0.
    pub index: usize,
    /// First x bin of the group.
    pub first_bin: usize,
    /// Last x bin of the group (inclusive).
    pub last_bin: usize,
    /// Low edge of `first_bin`.
    pub x_low: f64,
    /// High edge of `last_bin`.
    pub x_high: f64,
    /// y-projection over the group.
    pub projection: Histogram1D,
    /// Gaussian fit of the projection.
    pub fit: GaussianFit,
}

impl Slice {
    /// Midpoint of the group.
    pub fn center(&self) -> f64 {
        0.5 * (self.x_low + self.x_high)
    }
}

/// All slices of one 2-D histogram, in increasing x.
#[derive(Debug, Clone, Default)]
pub struct SliceFits {
    /// Slices in group order.
    pub slices: Vec<Slice>,
}

impl SliceFits {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether no group was formed.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Group centers.
    pub fn centers(&self) -> Vec<f64> {
        self.slices.iter().map(Slice::center).collect()
    }

    /// Fitted means.
    pub fn means(&self) -> Vec<f64> {
        self.slices.iter().map(|s| s.fit.mean).collect()
    }

    /// Fitted widths.
    pub fn widths(&self) -> Vec<f64> {
        self.slices.iter().map(|s| s.fit.sigma).collect()
    }

    /// The three sequences plus uncertainties and statuses.
    pub fn curve(&self) -> ResolutionCurve {
        let mut curve = ResolutionCurve::default();
        for s in &self.slices {
            curve.push(s.center(), &s.fit);
        }
        curve
    }
}

/// In-range x bins covering `[lo, hi]`, or `None` if none do.
///
/// Both ends select the bin containing them, so a value of `hi` exactly on
/// a bin's low edge includes that bin.
pub fn bin_range(axis: &Axis, lo: f64, hi: f64) -> Option<(usize, usize)> {
    let first = axis.find_bin(lo).max(1);
    let last = axis.find_bin(hi).min(axis.n_bins());
    (first <= last).then_some((first, last))
}

impl GaussianFitter {
    /// Fit y-projections of `h` over groups of `config.step` x bins.
    pub fn fit_slices(&self, h: &Histogram2D, config: &SliceFitConfig) -> Result<SliceFits> {
        let (lo, hi) = config.x_range;
        if config.step == 0 {
            return Err(Error::Validation("slice step must be at least 1".into()));
        }
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::Validation(format!("invalid slice range [{lo}, {hi}]")));
        }

        let axis = &h.x_axis;
        let Some((first, last)) = bin_range(axis, lo, hi) else {
            log::warn!("{}: range [{lo}, {hi}] outside x axis [{}, {}]", h.name, axis.x_min(), axis.x_max());
            return Ok(SliceFits::default());
        };

        let mut slices = Vec::new();
        for (index, start) in (first..=last).step_by(config.step).enumerate() {
            let end = (start + config.step - 1).min(axis.n_bins());
            let projection = h.projection_y(format!("{}_proj{index}", h.name), start, end);
            let fit = self.fit(&projection, config.window)?;
            log::debug!(
                "{} bins {start}..={end}: mean={:.4} sigma={:.4} ({})",
                h.name,
                fit.mean,
                fit.sigma,
                fit.status
            );
            slices.push(Slice {
                index,
                first_bin: start,
                last_bin: end,
                x_low: axis.bin_low_edge(start),
                x_high: axis.bin_up_edge(end),
                projection,
                fit,
            });
        }
        Ok(SliceFits { slices })
    }
}

/// Slice-fit `h` with the default fitter.
pub fn fit_slices(h: &Histogram2D, config: &SliceFitConfig) -> Result<SliceFits> {
    GaussianFitter::default().fit_slices(h, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaussian::FitStatus;
    use approx::assert_relative_eq;

    /// 2-D histogram whose column `ix` holds a Gaussian in y with mean
    /// `0.01·ix` and width `0.1`.
    fn resolution_histogram(nx: usize) -> Histogram2D {
        let mut h = Histogram2D::new(
            "histos_theta_electron_delta_p_electron_1",
            "",
            Axis::uniform(nx, 0.0, nx as f64).unwrap(),
            Axis::uniform(100, -1.0, 1.0).unwrap(),
        );
        let centers = h.y_axis.centers();
        for ix in 1..=nx {
            let mu = 0.01 * ix as f64;
            for (iy, &y) in centers.iter().enumerate() {
                let v = (1000.0 * (-0.5 * ((y - mu) / 0.1).powi(2)).exp()).round();
                h.set_bin_content(ix, iy + 1, v).unwrap();
            }
        }
        h
    }

    #[test]
    fn bin_range_edges() {
        let axis = Axis::uniform(10, 0.0, 10.0).unwrap();
        assert_eq!(bin_range(&axis, 2.5, 7.5), Some((3, 8)));
        // Upper value on a low edge includes that bin.
        assert_eq!(bin_range(&axis, 2.0, 7.0), Some((3, 8)));
        assert_eq!(bin_range(&axis, 2.0, 10.0), Some((3, 10)));
        assert_eq!(bin_range(&axis, -5.0, 20.0), Some((1, 10)));
        assert_eq!(bin_range(&axis, 10.0, 12.0), None);
        assert_eq!(bin_range(&axis, -3.0, -1.0), None);
    }

    #[test]
    fn k_groups_give_k_points() {
        let h = resolution_histogram(30);
        let fits = fit_slices(&h, &SliceFitConfig::new((0.0, 30.0), 5)).unwrap();
        assert_eq!(fits.len(), 6);
        assert_eq!(fits.centers().len(), 6);
        assert_eq!(fits.means().len(), 6);
        assert_eq!(fits.widths().len(), 6);

        // Last group is truncated at the axis end.
        let fits = fit_slices(&h, &SliceFitConfig::new((0.0, 30.0), 7)).unwrap();
        assert_eq!(fits.len(), 5);
        assert_eq!(fits.slices[4].first_bin, 29);
        assert_eq!(fits.slices[4].last_bin, 30);
    }

    #[test]
    fn centers_are_group_midpoints() {
        let h = resolution_histogram(30);
        let fits = fit_slices(&h, &SliceFitConfig::new((6.0, 12.0), 2)).unwrap();
        // The bin starting at 12 opens a fourth group.
        assert_eq!(fits.centers(), vec![7.0, 9.0, 11.0, 13.0]);
        assert_eq!((fits.slices[3].first_bin, fits.slices[3].last_bin), (13, 14));
        assert!(fits.centers().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(fits.slices[0].projection.name, "histos_theta_electron_delta_p_electron_1_proj0");
    }

    #[test]
    fn recovers_slice_means_and_widths() {
        let h = resolution_histogram(20);
        let fits = fit_slices(&h, &SliceFitConfig::new((0.0, 20.0), 4)).unwrap();
        for s in &fits.slices {
            // Mean of the column means in the group.
            let expected = 0.01 * (s.first_bin + s.last_bin) as f64 / 2.0;
            assert_eq!(s.fit.status, FitStatus::Converged);
            assert_relative_eq!(s.fit.mean, expected, epsilon = 2e-3);
            assert_relative_eq!(s.fit.sigma, 0.1, epsilon = 5e-3);
        }
    }

    #[test]
    fn empty_groups_are_degenerate() {
        let h = Histogram2D::empty_default("missing");
        let fits = fit_slices(&h, &SliceFitConfig::new((0.205, 0.495), 10)).unwrap();
        assert_eq!(fits.len(), 3);
        assert!(fits.slices.iter().all(|s| s.fit.status == FitStatus::Degenerate));
        assert_eq!(fits.means(), vec![0.0; 3]);
    }

    #[test]
    fn range_outside_axis_gives_no_groups() {
        let h = Histogram2D::empty_default("missing");
        let fits = fit_slices(&h, &SliceFitConfig::new((6.0, 12.0), 5)).unwrap();
        assert!(fits.is_empty());
        assert!(fits.curve().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let h = Histogram2D::empty_default("h");
        assert!(fit_slices(&h, &SliceFitConfig::new((0.0, 1.0), 0)).is_err());
        assert!(fit_slices(&h, &SliceFitConfig::new((1.0, 0.0), 1)).is_err());
    }

    #[test]
    fn window_config_round_trips_through_json() {
        let config = SliceFitConfig::new((40.0, 55.0), 6).with_window(FitWindow::StdDevs(3.0));
        let json = serde_json::to_string(&config).unwrap();
        let back: SliceFitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

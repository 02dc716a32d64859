//! End-to-end slice fit: sampled residuals, stored in a ROOT file, fitted
//! per x group and filtered.

use approx::assert_relative_eq;
use cp_core::{Axis, Histogram2D};
use cp_fit::{FitStatus, FitWindow, SliceFitConfig, drop_unconverged, fit_slices, remove_bad_points};
use cp_root::{Precision, RootFile, RootFileBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Residuals with mean `0.02·(θ - 9)` and width `0.05`, θ uniform in [6, 12].
fn sampled_residuals(n: usize) -> Histogram2D {
    let mut h = Histogram2D::new(
        "histos_theta_electron_delta_p_electron_1",
        "#theta_{e} vs #Delta P_{e}",
        Axis::uniform(30, 6.0, 12.0).unwrap(),
        Axis::uniform(80, -0.8, 0.8).unwrap(),
    );
    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::new(0.0, 0.05).unwrap();
    for _ in 0..n {
        let theta = rng.random_range(6.0..12.0);
        let dp = 0.02 * (theta - 9.0) + noise.sample(&mut rng);
        h.fill(theta, dp);
    }
    h
}

#[test]
fn resolution_curve_tracks_sampled_trend() {
    let original = sampled_residuals(200_000);
    let mut builder = RootFileBuilder::new();
    builder.add_h2(&original, Precision::Float);
    let file = RootFile::from_bytes(builder.to_bytes().unwrap(), "data.root").unwrap();
    let histos = file.histograms().unwrap();
    let h = histos.get_h2("histos_theta_electron_delta_p_electron_1").unwrap();

    let fits = fit_slices(h, &SliceFitConfig::new((6.0, 12.0), 5)).unwrap();
    assert_eq!(fits.len(), 6);

    let curve = fits.curve();
    for i in 0..curve.len() {
        assert_eq!(curve.status[i], FitStatus::Converged);
        assert_relative_eq!(curve.mean[i], 0.02 * (curve.x[i] - 9.0), epsilon = 5e-3);
        assert_relative_eq!(curve.width[i], 0.05, epsilon = 5e-3);
    }

    let kept = remove_bad_points(&curve, 0.4);
    assert_eq!(kept, curve);
    assert_eq!(drop_unconverged(&kept).len(), 6);
}

#[test]
fn fit_window_gives_comparable_curve() {
    let h = sampled_residuals(100_000);
    let full = fit_slices(&h, &SliceFitConfig::new((6.0, 12.0), 6)).unwrap().curve();
    let windowed = fit_slices(&h, &SliceFitConfig::new((6.0, 12.0), 6).with_window(FitWindow::StdDevs(3.0)))
        .unwrap()
        .curve();
    assert_eq!(full.len(), windowed.len());
    for i in 0..full.len() {
        assert_relative_eq!(full.mean[i], windowed.mean[i], epsilon = 5e-3);
    }
}

#[test]
fn too_narrow_threshold_removes_every_point() {
    let h = sampled_residuals(50_000);
    let curve = fit_slices(&h, &SliceFitConfig::new((6.0, 12.0), 5)).unwrap().curve();
    assert!(remove_bad_points(&curve, 0.01).is_empty());
}

//! Resolution artifacts: slice-fit means and widths per sector for
//! several inputs (typically data and simulation).

use cp_core::{Error, Histogram2D, HistogramMap, Result, format_key, sectors};
use cp_fit::{FitWindow, GaussianFitter, ResolutionCurve, SliceFitConfig, drop_unconverged, remove_bad_points};
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::slices::SlicesArtifact;

/// One resolution plot: which histograms to fit and how to draw them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSpec {
    /// Output stem, e.g. `theta_electron_delta_p_electron`.
    pub name: String,
    /// Histogram key template with a `{}` placeholder for the sector.
    pub template: String,
    /// Fitted x range.
    pub x_range: (f64, f64),
    /// x bins per slice.
    pub step: usize,
    /// Fixed y range of every panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<(f64, f64)>,
    /// Points whose width is not below this are dropped.
    pub max_width: f64,
    /// Panel title.
    #[serde(default)]
    pub title: String,
    /// x-axis label.
    #[serde(default)]
    pub x_label: String,
    /// y-axis label.
    #[serde(default)]
    pub y_label: String,
}

impl ResolutionSpec {
    /// Slice-fit settings for this plot.
    pub fn slice_config(&self, window: FitWindow) -> SliceFitConfig {
        SliceFitConfig::new(self.x_range, self.step).with_window(window)
    }
}

/// A named histogram mapping to fit, e.g. `("Data", &data)`.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionInput<'a> {
    /// Label used in legends and file names.
    pub label: &'a str,
    /// Histograms of this input.
    pub histograms: &'a HistogramMap,
}

/// Options shared by every resolution plot of one run.
#[derive(Debug, Clone, Default)]
pub struct ResolutionOptions {
    /// Bins of each projection that enter its fit.
    pub window: FitWindow,
    /// Also drop points whose fit did not converge.
    pub drop_unconverged: bool,
    /// Keep per-slice artifacts for slice pages.
    pub keep_slices: bool,
}

/// Filtered curve of one input in one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSeries {
    /// Legend label, e.g. `Sector 1 (Data)`.
    pub label: String,
    /// Slice centers.
    pub x: Vec<f64>,
    /// Fitted means.
    pub mean: Vec<f64>,
    /// Fitted widths (drawn as error bars).
    pub width: Vec<f64>,
    /// Uncertainties of the means.
    pub mean_err: Vec<f64>,
    /// Uncertainties of the widths.
    pub width_err: Vec<f64>,
    /// Points removed by the filters.
    pub n_dropped: usize,
}

impl ResolutionSeries {
    fn from_curve(label: String, curve: ResolutionCurve, n_dropped: usize) -> Self {
        let ResolutionCurve { x, mean, width, mean_err, width_err, .. } = curve;
        Self { label, x, mean, width, mean_err, width_err, n_dropped }
    }
}

/// One sector panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionPanel {
    /// Sector number.
    pub sector: usize,
    /// One series per input, in input order.
    pub series: Vec<ResolutionSeries>,
}

/// Plot-friendly resolution artifact: six sector panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionArtifact {
    /// Artifact schema version.
    pub schema_version: String,
    /// Output stem.
    pub name: String,
    /// Panel title.
    pub title: String,
    /// x-axis label.
    pub x_label: String,
    /// y-axis label.
    pub y_label: String,
    /// Fixed y range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<[f64; 2]>,
    /// Panels for sectors 1..=6.
    pub panels: Vec<ResolutionPanel>,
}

impl ResolutionArtifact {
    /// Total number of points kept over all panels.
    pub fn n_points(&self) -> usize {
        self.panels.iter().flat_map(|p| &p.series).map(|s| s.x.len()).sum()
    }

    /// Total number of points dropped over all panels.
    pub fn n_dropped(&self) -> usize {
        self.panels.iter().flat_map(|p| &p.series).map(|s| s.n_dropped).sum()
    }
}

/// Output of [`build_resolution`].
#[derive(Debug, Clone)]
pub struct ResolutionStudy {
    /// The sector-panel artifact.
    pub artifact: ResolutionArtifact,
    /// Slice pages per `(input, sector)`, when requested.
    pub slices: Vec<SlicesArtifact>,
}

/// Look up `key`, falling back to an empty 100×100 histogram on `[0, 1]²`
/// when it is missing.
pub fn h2_or_default(histograms: &HistogramMap, key: &str) -> Result<Histogram2D> {
    match histograms.get_h2(key) {
        Ok(h) => Ok(h.clone()),
        Err(Error::KeyNotFound(_)) => {
            log::warn!("histogram {key} not found; using an empty default");
            Ok(Histogram2D::empty_default(key))
        }
        Err(e) => Err(e),
    }
}

/// Slice-fit every sector of every input and collect the filtered curves.
pub fn build_resolution(
    spec: &ResolutionSpec,
    inputs: &[ResolutionInput<'_>],
    options: &ResolutionOptions,
    fitter: &GaussianFitter,
) -> Result<ResolutionStudy> {
    let config = spec.slice_config(options.window);
    let mut panels = Vec::new();
    let mut slices = Vec::new();

    for sector in sectors() {
        let key = format_key(&spec.template, sector);
        let mut series = Vec::with_capacity(inputs.len());
        for input in inputs {
            let h = h2_or_default(input.histograms, &key)?;
            let fits = fitter.fit_slices(&h, &config)?;

            let raw = fits.curve();
            let mut kept = remove_bad_points(&raw, spec.max_width);
            if options.drop_unconverged {
                kept = drop_unconverged(&kept);
            }
            let n_dropped = raw.len() - kept.len();
            log::info!("{key} ({}): {} of {} points kept", input.label, kept.len(), raw.len());

            if options.keep_slices {
                slices.push(SlicesArtifact::from_fits(
                    format!("{} ({}, sector {sector})", spec.title, input.label),
                    format!("{}_{}_{sector}", spec.name, input.label.to_lowercase()),
                    &fits,
                ));
            }
            series.push(ResolutionSeries::from_curve(
                format!("Sector {sector} ({})", input.label),
                kept,
                n_dropped,
            ));
        }
        panels.push(ResolutionPanel { sector, series });
    }

    let artifact = ResolutionArtifact {
        schema_version: SCHEMA_VERSION.to_string(),
        name: spec.name.clone(),
        title: spec.title.clone(),
        x_label: spec.x_label.clone(),
        y_label: spec.y_label.clone(),
        y_range: spec.y_range.map(|(lo, hi)| [lo, hi]),
        panels,
    };
    Ok(ResolutionStudy { artifact, slices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_core::{Axis, Histogram1D};

    fn spec() -> ResolutionSpec {
        ResolutionSpec {
            name: "theta_electron_delta_p_electron".into(),
            template: "histos_theta_electron_delta_p_electron_{}".into(),
            x_range: (6.0, 12.0),
            step: 5,
            y_range: Some((-0.8, 0.8)),
            max_width: 0.4,
            title: "Electron Momentum Resolution".into(),
            x_label: "$\\theta_e$".into(),
            y_label: "$\\Delta P_{e}$".into(),
        }
    }

    /// Columns hold Gaussians of width 0.05 around `shift`.
    fn residuals(name: &str, shift: f64) -> Histogram2D {
        let mut h = Histogram2D::new(
            name,
            "",
            Axis::uniform(30, 6.0, 12.0).unwrap(),
            Axis::uniform(80, -0.8, 0.8).unwrap(),
        );
        let centers = h.y_axis.centers();
        for ix in 1..=30 {
            for (iy, &y) in centers.iter().enumerate() {
                let v = (500.0 * (-0.5 * ((y - shift) / 0.05).powi(2)).exp()).round();
                h.set_bin_content(ix, iy + 1, v).unwrap();
            }
        }
        h
    }

    #[test]
    fn missing_sectors_give_empty_series() {
        let mut data = HistogramMap::new();
        data.insert(residuals("histos_theta_electron_delta_p_electron_1", 0.02));
        let sim = HistogramMap::new();
        let inputs =
            [ResolutionInput { label: "Data", histograms: &data }, ResolutionInput { label: "Sim", histograms: &sim }];

        let study = build_resolution(&spec(), &inputs, &ResolutionOptions::default(), &GaussianFitter::default())
            .unwrap();
        let art = &study.artifact;
        assert_eq!(art.panels.len(), 6);
        assert_eq!(art.y_range, Some([-0.8, 0.8]));

        let first = &art.panels[0];
        assert_eq!(first.series[0].label, "Sector 1 (Data)");
        assert_eq!(first.series[0].x.len(), 6);
        assert!(first.series[0].mean.iter().all(|m| (m - 0.02).abs() < 5e-3));
        // The empty default axis [0, 1] does not reach the fitted range.
        assert!(first.series[1].x.is_empty());
        assert!(art.panels[1..].iter().all(|p| p.series.iter().all(|s| s.x.is_empty())));
        assert!(study.slices.is_empty());
    }

    #[test]
    fn narrow_threshold_counts_dropped_points() {
        let mut data = HistogramMap::new();
        data.insert(residuals("histos_theta_electron_delta_p_electron_2", -0.01));
        let mut s = spec();
        s.max_width = 0.01;
        let inputs = [ResolutionInput { label: "Data", histograms: &data }];
        let options = ResolutionOptions { keep_slices: true, ..Default::default() };
        let study = build_resolution(&s, &inputs, &options, &GaussianFitter::default()).unwrap();

        let panel = &study.artifact.panels[1];
        assert!(panel.series[0].x.is_empty());
        assert_eq!(panel.series[0].n_dropped, 6);
        assert_eq!(study.artifact.n_dropped(), 6);
        assert_eq!(study.artifact.n_points(), 0);
        assert_eq!(study.slices.len(), 6);
        assert_eq!(study.slices[1].panels.len(), 6);
        assert_eq!(study.slices[1].name, "theta_electron_delta_p_electron_data_2");
    }

    #[test]
    fn wrong_dimension_is_an_error() {
        let mut data = HistogramMap::new();
        data.insert(Histogram1D::new(
            "histos_theta_electron_delta_p_electron_1",
            "",
            Axis::uniform(10, 0.0, 1.0).unwrap(),
        ));
        let inputs = [ResolutionInput { label: "Data", histograms: &data }];
        let err = build_resolution(&spec(), &inputs, &ResolutionOptions::default(), &GaussianFitter::default());
        assert!(matches!(err, Err(Error::WrongDimension { .. })));
    }

    #[test]
    fn spec_reads_from_yaml() {
        let yaml = r#"
name: theta_ele_de_beam
template: "histos_theta_ele_de_beam_{}"
x_range: [6.5, 11.5]
step: 6
y_range: [-0.5, 0.5]
max_width: 3
"#;
        let s: ResolutionSpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(s.x_range, (6.5, 11.5));
        assert_eq!(s.step, 6);
        assert_eq!(s.max_width, 3.0);
        assert!(s.title.is_empty());
    }
}

//! Quantile binning: a value histogram with equal-population bin edges.

use cp_core::stats::quantile_edges;
use cp_core::{Axis, Histogram1D, Result};
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::series::BinnedSeries;

/// Values histogram plus the quantile edges drawn over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileBinsArtifact {
    /// Artifact schema version.
    pub schema_version: String,
    /// x-axis label.
    pub x_label: String,
    /// Number of values.
    pub n_values: usize,
    /// `n_bins + 1` quantile edges.
    pub edges: Vec<f64>,
    /// Histogram of the values.
    pub histogram: BinnedSeries,
}

impl QuantileBinsArtifact {
    /// Split `values` into `n_bins` equally populated bins and histogram
    /// them with `display_bins` bins on `display_range`.
    pub fn build(
        values: &[f64],
        n_bins: usize,
        display_bins: usize,
        display_range: (f64, f64),
        x_label: impl Into<String>,
    ) -> Result<Self> {
        let edges = quantile_edges(values, n_bins)?;
        let mut h = Histogram1D::new("values", "", Axis::uniform(display_bins, display_range.0, display_range.1)?);
        for &v in values {
            h.fill(v);
        }
        Ok(Self {
            schema_version: SCHEMA_VERSION.to_string(),
            x_label: x_label.into(),
            n_values: values.len(),
            edges,
            histogram: BinnedSeries::from_h1(&h).with_fill("#ffa500").with_color("#000000"),
        })
    }
}

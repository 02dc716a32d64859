//! Drawable histogram pieces shared by every artifact.

use cp_core::{Histogram1D, Histogram2D};
use serde::{Deserialize, Serialize};

/// How a binned series is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    /// Filled bars.
    #[default]
    Bars,
    /// Outline only (`where='post'` steps).
    Step,
    /// Markers with vertical error bars at bin centers.
    Points,
}

/// A 1-D histogram as edges plus contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedSeries {
    /// Legend label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Bin edges (`contents.len() + 1` values).
    pub edges: Vec<f64>,
    /// Bin contents.
    pub contents: Vec<f64>,
    /// Bin errors.
    pub errors: Vec<f64>,
    /// Line color: `#rrggbb` or a ROOT color index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Fill color for `Bars`; the theme's fill color when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Drawing style.
    #[serde(default)]
    pub style: SeriesStyle,
}

impl BinnedSeries {
    /// In-range bins of `h`, drawn as bars.
    pub fn from_h1(h: &Histogram1D) -> Self {
        Self {
            label: None,
            edges: h.axis.edges(),
            contents: h.contents.clone(),
            errors: h.errors(),
            color: None,
            fill: None,
            style: SeriesStyle::Bars,
        }
    }

    /// Set the legend label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the line color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Set the drawing style.
    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = style;
        self
    }

    /// Bin centers.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// `(min, max)` of the contents, or `None` when empty.
    pub fn content_range(&self) -> Option<(f64, f64)> {
        let finite = self.contents.iter().copied().filter(|v| v.is_finite());
        finite.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// A 2-D histogram as a grid of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMap {
    /// x bin edges.
    pub x_edges: Vec<f64>,
    /// y bin edges.
    pub y_edges: Vec<f64>,
    /// Values by row: `z[iy][ix]`, row 0 at the lowest y.
    pub z: Vec<Vec<f64>>,
}

impl HeatMap {
    /// In-range bins of `h`.
    pub fn from_h2(h: &Histogram2D) -> Self {
        let nx = h.x_axis.n_bins();
        let z = if nx == 0 { Vec::new() } else { h.contents.chunks(nx).map(<[f64]>::to_vec).collect() };
        Self { x_edges: h.x_axis.edges(), y_edges: h.y_axis.edges(), z }
    }

    /// Largest value.
    pub fn max(&self) -> f64 {
        self.z.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest strictly positive value.
    pub fn min_positive(&self) -> Option<f64> {
        self.z.iter().flatten().copied().filter(|&v| v > 0.0).reduce(f64::min)
    }
}

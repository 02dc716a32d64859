//! # cp-viz
//!
//! Plot artifacts for clasplot.
//!
//! Every artifact is a plain serde structure (arrays instead of nested
//! objects) built from histograms and fit results; `cp-viz-render` turns
//! them into SVG or PDF, and the CLI can dump them as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Quantile binning of raw values.
pub mod bins;

/// Pages of histogram panels.
pub mod page;

/// Slice-fit resolution curves per sector.
pub mod resolution;

/// Edges-plus-contents series and heat maps.
pub mod series;

/// Projection pages of one slice fit.
pub mod slices;

pub use bins::QuantileBinsArtifact;
pub use page::{
    Annotation, PageArtifact, PageLayout, PageOptions, PageSpec, PanelArtifact, PanelContent, SeriesSpec,
    compare_page,
};
pub use resolution::{
    ResolutionArtifact, ResolutionInput, ResolutionOptions, ResolutionPanel, ResolutionSeries, ResolutionSpec,
    ResolutionStudy, build_resolution,
};
pub use series::{BinnedSeries, HeatMap, SeriesStyle};
pub use slices::{FitCurve, SlicePanel, SlicesArtifact};

/// Schema version stamped on every artifact.
pub const SCHEMA_VERSION: &str = "clasplot_viz_v1";

//! # cp-fit
//!
//! Gaussian fits for clasplot resolution studies.
//!
//! A 2-D residual histogram (e.g. `Δp` vs `θ`) is cut into groups of x
//! bins; each group's y-projection is fitted with a single Gaussian by
//! chi-square minimization. The fitted means and widths versus the group
//! centers form a resolution curve.
//!
//! ```
//! use cp_core::{Axis, Histogram2D};
//! use cp_fit::{SliceFitConfig, fit_slices, remove_bad_points};
//!
//! let h = Histogram2D::new("h", "", Axis::uniform(30, 6.0, 12.0).unwrap(), Axis::uniform(50, -0.8, 0.8).unwrap());
//! let fits = fit_slices(&h, &SliceFitConfig::new((6.0, 12.0), 5)).unwrap();
//! assert_eq!(fits.len(), 6);
//! // Empty slices fit to zero and are filtered out.
//! assert!(remove_bad_points(&fits.curve(), 0.4).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filter;
pub mod gaussian;
pub mod optimizer;
pub mod slices;

pub use filter::{ResolutionCurve, drop_unconverged, remove_bad_points};
pub use gaussian::{FitStatus, FitWindow, GaussianFit, GaussianFitter, fit_gaussian};
pub use optimizer::{BoundedLbfgs, ObjectiveFunction, OptimizationResult, OptimizerConfig};
pub use slices::{Slice, SliceFitConfig, SliceFits, bin_range, fit_slices};

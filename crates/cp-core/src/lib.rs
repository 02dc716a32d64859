//! # cp-core
//!
//! Shared data model for clasplot: binned histograms with ROOT bin
//! numbering, the name-keyed histogram mapping built from an input file,
//! and the error type used across the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod histogram;
pub mod map;
pub mod stats;

pub use error::{Error, Result};
pub use histogram::{Axis, Histogram, Histogram1D, Histogram2D};
pub use map::{HistogramMap, format_key};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of azimuthal detector sectors.
pub const N_SECTORS: usize = 6;

/// Sector numbers, `1..=6`.
pub fn sectors() -> std::ops::RangeInclusive<usize> {
    1..=N_SECTORS
}

//! # cp-root
//!
//! Native ROOT file reader for clasplot.
//!
//! Reads TH1 and TH2 histograms (double, float and integer storage) from
//! `.root` files without external ROOT libraries. Supports zlib, LZ4, ZSTD
//! and XZ compression. A small writer produces histogram files for smoke
//! runs and tests.
//!
//! ## Example
//!
//! ```no_run
//! use cp_root::RootFile;
//!
//! let f = RootFile::open("data.root").unwrap();
//! for key in f.list_keys().unwrap() {
//!     println!("{} ({})", key.name, key.class_name);
//! }
//! let map = f.histograms().unwrap();
//! println!("{} histograms", map.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
pub mod key;
pub mod objects;
pub mod rbuffer;
pub mod writer;

pub use error::{Result, RootError};
pub use file::{RootFile, load_histograms};
pub use key::KeyInfo;
pub use writer::{Compression, Precision, RootFileBuilder};

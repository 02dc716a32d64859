//! Memory-mapped or owned bytes backing a `RootFile`.

use std::ops::Deref;

/// Backing storage for a ROOT file.
pub enum DataSource {
    /// Bytes owned in memory (`RootFile::from_bytes`).
    Owned(Vec<u8>),
    /// Memory-mapped file (`RootFile::open`).
    Mmap(memmap2::Mmap),
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mmap(m) => m,
        }
    }
}

//! TH2D/TH2F/TH2I deserialization.
//!
//! ```text
//! TH2x
//!   ├─ TH2
//!   │    ├─ TH1 (base, both x and y axes used)
//!   │    └─ fScalefactor, fTsumwy, fTsumwy2, fTsumwxy (f64)
//!   └─ TArray of (nx + 2) * (ny + 2) cells, global bin = ix + (nx + 2) * iy
//! ```

use cp_core::Histogram2D;

use super::th1::{ArrayKind, read_th1_base};
use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;

/// Read a 2-D histogram whose contents are stored as `kind`.
pub(crate) fn read_th2(data: &[u8], class: &str, kind: ArrayKind) -> Result<Histogram2D> {
    let mut r = RBuffer::new(data);
    let (_version, end) = r.read_version()?;

    let (_th2_version, th2_end) = r.read_version()?;
    let base = read_th1_base(&mut r)?;
    let _scale_factor = r.read_f64()?;
    let _tsumwy = r.read_f64()?;
    let _tsumwy2 = r.read_f64()?;
    let _tsumwxy = r.read_f64()?;
    r.seek_end(th2_end, "TH2")?;

    let raw = kind.read(&mut r)?;
    r.seek_end(end, class)?;

    let x_axis = base.x_axis.to_axis()?;
    let y_axis = base.y_axis.to_axis()?;
    let (nx, ny) = (x_axis.n_bins(), y_axis.n_bins());
    let n_cells = (nx + 2) * (ny + 2);
    if raw.len() != n_cells || base.n_cells != n_cells {
        return Err(RootError::Deserialization(format!(
            "{class}: {} values / fNcells {} for a {nx}x{ny} histogram",
            raw.len(),
            base.n_cells
        )));
    }

    let in_range = |cells: &[f64]| -> Vec<f64> {
        let mut out = Vec::with_capacity(nx * ny);
        for iy in 1..=ny {
            let row = iy * (nx + 2);
            out.extend_from_slice(&cells[row + 1..=row + nx]);
        }
        out
    };

    let mut h = Histogram2D::from_contents(base.name, base.title, x_axis, y_axis, in_range(&raw))?;
    h.entries = base.entries;
    if base.sumw2.len() == n_cells {
        h = h.with_sumw2(in_range(&base.sumw2))?;
    }
    Ok(h)
}

//! TH1 base class and TH1D/TH1F/TH1I deserialization.
//!
//! Streamer layout (TH1 class version 8):
//! ```text
//! TH1x
//!   ├─ TH1 (base)
//!   │    ├─ TNamed, TAttLine, TAttFill, TAttMarker
//!   │    ├─ fNcells (i32)
//!   │    ├─ fXaxis, fYaxis, fZaxis (TAxis)
//!   │    ├─ fBarOffset, fBarWidth (i16)
//!   │    ├─ fEntries, fTsumw, fTsumw2, fTsumwx, fTsumwx2 (f64)
//!   │    ├─ fMaximum, fMinimum (v >= 2), fNormFactor (v >= 3)
//!   │    ├─ fContour, fSumw2 (TArrayD)
//!   │    ├─ fOption (TString), fFunctions (TList*)
//!   │    └─ fBufferSize, fBuffer, fBinStatErrOpt, fStatOverflows
//!   └─ TArrayD / TArrayF / TArrayI (bin contents including flows)
//! ```

use cp_core::{Axis, Histogram1D};

use crate::error::{Result, RootError};
use crate::rbuffer::{BYTE_COUNT_MASK, RBuffer};

/// Element type of the trailing content array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArrayKind {
    F32,
    F64,
    I32,
}

impl ArrayKind {
    /// Read a TArray: an i32 length followed by the values.
    pub(crate) fn read(self, r: &mut RBuffer) -> Result<Vec<f64>> {
        let n = read_len(r)?;
        match self {
            ArrayKind::F32 => r.read_array_f32(n),
            ArrayKind::F64 => r.read_array_f64(n),
            ArrayKind::I32 => r.read_array_i32(n),
        }
    }
}

/// Axis fields read from a TAxis.
#[derive(Debug, Clone)]
pub(crate) struct AxisInfo {
    pub n_bins: i32,
    pub x_min: f64,
    pub x_max: f64,
    /// Variable-width bin edges (empty for uniform binning).
    pub edges: Vec<f64>,
}

impl AxisInfo {
    pub fn n_bins(&self) -> Result<usize> {
        usize::try_from(self.n_bins)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| RootError::Deserialization(format!("invalid axis bin count {}", self.n_bins)))
    }

    pub fn to_axis(&self) -> Result<Axis> {
        let n = self.n_bins()?;
        if self.edges.len() == n + 1 {
            Ok(Axis::variable(self.edges.clone())?)
        } else {
            Ok(Axis::uniform(n, self.x_min, self.x_max)?)
        }
    }
}

/// Fields of the TH1 base class needed to rebuild a histogram.
#[derive(Debug, Clone)]
pub(crate) struct Th1Base {
    pub name: String,
    pub title: String,
    pub n_cells: usize,
    pub x_axis: AxisInfo,
    pub y_axis: AxisInfo,
    pub entries: f64,
    /// Full sumw2 array (flows included), empty if not stored.
    pub sumw2: Vec<f64>,
}

/// Read a 1-D histogram whose contents are stored as `kind`.
pub(crate) fn read_th1(data: &[u8], class: &str, kind: ArrayKind) -> Result<Histogram1D> {
    let mut r = RBuffer::new(data);
    let (_version, end) = r.read_version()?;
    let base = read_th1_base(&mut r)?;
    let raw = kind.read(&mut r)?;
    r.seek_end(end, class)?;

    if raw.len() != base.n_cells {
        return Err(RootError::Deserialization(format!(
            "{class} array size {} != fNcells {}",
            raw.len(),
            base.n_cells
        )));
    }
    let axis = base.x_axis.to_axis()?;
    let n = axis.n_bins();
    if base.n_cells != n + 2 {
        return Err(RootError::Deserialization(format!(
            "{class} has {} cells for {n} bins",
            base.n_cells
        )));
    }

    let mut h = Histogram1D::from_contents(base.name, base.title, axis, raw[1..=n].to_vec())?;
    h.underflow = raw[0];
    h.overflow = raw[n + 1];
    h.entries = base.entries;
    if base.sumw2.len() == base.n_cells {
        h = h.with_sumw2(base.sumw2[1..=n].to_vec())?;
    }
    Ok(h)
}

/// Read the TH1 base class, leaving the cursor at the content array.
pub(crate) fn read_th1_base(r: &mut RBuffer) -> Result<Th1Base> {
    let (version, end) = r.read_version()?;

    let (name, title) = r.read_tnamed()?;
    skip_streamer_object(r)?; // TAttLine
    skip_streamer_object(r)?; // TAttFill
    skip_streamer_object(r)?; // TAttMarker

    let n_cells = read_len(r)?;

    let x_axis = read_taxis(r)?;
    let y_axis = read_taxis(r)?;
    let _z_axis = read_taxis(r)?;

    let _bar_offset = r.read_i16()?;
    let _bar_width = r.read_i16()?;
    let entries = r.read_f64()?;
    let _tsumw = r.read_f64()?;
    let _tsumw2 = r.read_f64()?;
    let _tsumwx = r.read_f64()?;
    let _tsumwx2 = r.read_f64()?;
    if version >= 2 {
        let _maximum = r.read_f64()?;
        let _minimum = r.read_f64()?;
    }
    if version >= 3 {
        let _norm_factor = r.read_f64()?;
    }

    let contour_n = read_len(r)?;
    r.skip(contour_n * 8)?;

    let sumw2 = ArrayKind::F64.read(r)?;

    let _option = r.read_string()?;
    skip_object_pointer(r)?; // fFunctions

    // Trailing members (buffer, error options) are skipped via the byte count.
    if end.is_none() {
        if version >= 4 {
            let buffer_size = read_len(r)?;
            if r.read_u8()? != 0 {
                r.skip(buffer_size * 8)?;
            }
        }
        if version >= 7 {
            let _bin_stat_err_opt = r.read_i32()?;
        }
        if version >= 8 {
            let _stat_overflows = r.read_i32()?;
        }
    }
    r.seek_end(end, "TH1")?;

    Ok(Th1Base { name, title, n_cells, x_axis, y_axis, entries, sumw2 })
}

/// Read a TAxis: TNamed, TAttAxis, then binning; the rest is skipped.
fn read_taxis(r: &mut RBuffer) -> Result<AxisInfo> {
    let (_version, end) = r.read_version()?;
    if end.is_none() {
        return Err(RootError::Deserialization("TAxis written without byte count".into()));
    }

    let _ = r.read_tnamed()?;
    skip_streamer_object(r)?; // TAttAxis

    let n_bins = r.read_i32()?;
    let x_min = r.read_f64()?;
    let x_max = r.read_f64()?;
    let edges = ArrayKind::F64.read(r)?;

    r.seek_end(end, "TAxis")?;
    Ok(AxisInfo { n_bins, x_min, x_max, edges })
}

/// Skip an embedded object written with a byte count.
///
/// Objects without one (pre-ROOT-3 files) are only a version number; they
/// are left positioned after it.
pub(crate) fn skip_streamer_object(r: &mut RBuffer) -> Result<()> {
    let (_version, end) = r.read_version()?;
    match end {
        Some(end) => r.set_pos(end),
        None => Ok(()),
    }
}

/// Skip an object written through a pointer: `0` for null, otherwise a
/// byte count followed by the class tag and the object.
fn skip_object_pointer(r: &mut RBuffer) -> Result<()> {
    let start = r.pos();
    let tag = r.read_u32()?;
    if tag == 0 {
        return Ok(());
    }
    if tag & BYTE_COUNT_MASK == 0 {
        return Err(RootError::Deserialization(format!(
            "object reference without byte count at offset {start}"
        )));
    }
    r.set_pos(start + 4 + (tag & !BYTE_COUNT_MASK) as usize)
}

fn read_len(r: &mut RBuffer) -> Result<usize> {
    let n = r.read_i32()?;
    usize::try_from(n).map_err(|_| RootError::Deserialization(format!("negative array length {n}")))
}

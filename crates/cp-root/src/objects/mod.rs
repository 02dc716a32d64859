//! ROOT object deserialization dispatch.

mod th1;
mod th2;

use cp_core::Histogram;

use crate::error::{Result, RootError};
use th1::ArrayKind;

/// Classes [`read_histogram`] understands.
pub const HISTOGRAM_CLASSES: &[&str] = &["TH1D", "TH1F", "TH1I", "TH2D", "TH2F", "TH2I"];

/// Whether `class_name` is a histogram class with a reader.
pub fn is_histogram_class(class_name: &str) -> bool {
    HISTOGRAM_CLASSES.contains(&class_name)
}

/// Read a histogram from a decompressed object payload, given its class name.
pub fn read_histogram(payload: &[u8], class_name: &str) -> Result<Histogram> {
    let h: Histogram = match class_name {
        "TH1D" => th1::read_th1(payload, class_name, ArrayKind::F64)?.into(),
        "TH1F" => th1::read_th1(payload, class_name, ArrayKind::F32)?.into(),
        "TH1I" => th1::read_th1(payload, class_name, ArrayKind::I32)?.into(),
        "TH2D" => th2::read_th2(payload, class_name, ArrayKind::F64)?.into(),
        "TH2F" => th2::read_th2(payload, class_name, ArrayKind::F32)?.into(),
        "TH2I" => th2::read_th2(payload, class_name, ArrayKind::I32)?.into(),
        _ => return Err(RootError::UnsupportedClass(class_name.to_string())),
    };
    Ok(h)
}

//! ROOT file writer for histograms.
//!
//! Produces small-format files (32-bit seek pointers) holding TH1/TH2
//! objects at the top level or inside one level of sub-directories.
//! Payloads are stored raw or as zlib blocks, whichever is smaller.
//! No streamer-info record is written.

use std::io::Write;
use std::path::Path;

use cp_core::{Axis, Histogram, Histogram1D, Histogram2D};
use flate2::write::ZlibEncoder;

use crate::decompress::block_header;
use crate::error::Result;
use crate::file::ROOT_MAGIC;
use crate::rbuffer::BYTE_COUNT_MASK;

/// ROOT 6.24 file format version.
const FILE_VERSION: u32 = 62_406;
/// Offset of the first record.
const BEGIN: usize = 100;
const KEY_VERSION: u16 = 4;
const DIRECTORY_VERSION: u16 = 5;
/// `kNotDeleted | kIsOnHeap` as found in ROOT-written objects.
const TOBJECT_BITS: u32 = 0x0300_0000;
/// 2024-01-01 00:00:00 in TDatime packing.
const DATIME: u32 = (29 << 26) | (1 << 22) | (1 << 17);
/// `kNewClassTag`.
const NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
/// Largest block a 3-byte size field can describe.
const MAX_BLOCK: usize = 0xFF_FFFF;
/// Fixed length of a small TDirectory record.
const DIRECTORY_LEN: usize = 2 + 4 * 7 + 18;

/// Storage type of bin contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// `TH1F` / `TH2F`.
    Float,
    /// `TH1D` / `TH2D`.
    #[default]
    Double,
}

/// Payload compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Raw payloads.
    #[default]
    None,
    /// zlib blocks (`ZL`).
    Zlib,
}

struct Object {
    class: &'static str,
    name: String,
    title: String,
    payload: Vec<u8>,
}

enum Entry {
    Object(Object),
    Directory { name: String, objects: Vec<Object> },
}

/// Collects histograms and serializes them as a ROOT file.
///
/// ```
/// use cp_core::{Axis, Histogram1D};
/// use cp_root::{Precision, RootFile, RootFileBuilder};
///
/// let h = Histogram1D::from_contents("h", "", Axis::uniform(2, 0.0, 1.0).unwrap(), vec![1.0, 2.0]).unwrap();
/// let mut builder = RootFileBuilder::new();
/// builder.add_h1(&h, Precision::Double);
/// let f = RootFile::from_bytes(builder.to_bytes().unwrap(), "h.root").unwrap();
/// assert_eq!(f.list_keys().unwrap()[0].name, "h");
/// ```
#[derive(Default)]
pub struct RootFileBuilder {
    compression: Compression,
    entries: Vec<Entry>,
}

impl RootFileBuilder {
    /// Empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set payload compression.
    pub fn compression(&mut self, compression: Compression) -> &mut Self {
        self.compression = compression;
        self
    }

    /// Add a histogram of either dimension at the top level.
    pub fn add(&mut self, h: &Histogram, precision: Precision) -> &mut Self {
        self.entries.push(Entry::Object(histogram_object(h, precision)));
        self
    }

    /// Add a 1-D histogram at the top level.
    pub fn add_h1(&mut self, h: &Histogram1D, precision: Precision) -> &mut Self {
        self.entries.push(Entry::Object(th1_object(h, precision)));
        self
    }

    /// Add a 2-D histogram at the top level.
    pub fn add_h2(&mut self, h: &Histogram2D, precision: Precision) -> &mut Self {
        self.entries.push(Entry::Object(th2_object(h, precision)));
        self
    }

    /// Add a histogram inside sub-directory `dir`, creating it on first use.
    pub fn add_in_dir(&mut self, dir: &str, h: &Histogram, precision: Precision) -> &mut Self {
        let object = histogram_object(h, precision);
        let existing = self.entries.iter_mut().find_map(|e| match e {
            Entry::Directory { name, objects } if name == dir => Some(objects),
            _ => None,
        });
        match existing {
            Some(objects) => objects.push(object),
            None => self.entries.push(Entry::Directory { name: dir.to_string(), objects: vec![object] }),
        }
        self
    }

    /// Serialize the file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = WBuffer::default();
        w.data.resize(BEGIN, 0);

        // Top record: TFile key, file name/title, then the TDirectory.
        let (file_name, file_title) = ("clasplot.root", "");
        let file_key_len = key_len("TFile", file_name, file_title);
        let nbytes_name = file_key_len + str_len(file_name) + str_len(file_title);
        let obj_len = nbytes_name - file_key_len + DIRECTORY_LEN;
        KeyRecord {
            class: "TFile".into(),
            name: file_name.into(),
            title: file_title.into(),
            obj_len,
            n_bytes: file_key_len + obj_len,
            key_len: file_key_len,
            seek_key: BEGIN,
            seek_pdir: 0,
        }
        .write(&mut w);
        w.string(file_name);
        w.string(file_title);
        let top_dir = w.pos();
        write_directory(&mut w, 0, nbytes_name, BEGIN, 0, 0);

        let mut top_keys = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match entry {
                Entry::Object(object) => {
                    top_keys.push(write_object(&mut w, object, BEGIN, self.compression)?);
                }
                Entry::Directory { name, objects } => {
                    let mut keys = Vec::with_capacity(objects.len());
                    for object in objects {
                        keys.push(write_object(&mut w, object, BEGIN, self.compression)?);
                    }
                    let (seek_keys, nbytes_keys) = write_key_list(&mut w, &keys, "TDirectory", name);
                    let mut payload = WBuffer::default();
                    write_directory(&mut payload, nbytes_keys, 0, 0, BEGIN, seek_keys);
                    let dir_object = Object {
                        class: "TDirectoryFile",
                        name: name.clone(),
                        title: name.clone(),
                        payload: payload.data,
                    };
                    top_keys.push(write_object(&mut w, &dir_object, BEGIN, Compression::None)?);
                }
            }
        }

        let (seek_keys, nbytes_keys) = write_key_list(&mut w, &top_keys, "TFile", file_name);
        w.patch_u32(top_dir + 10, nbytes_keys as u32);
        w.patch_u32(top_dir + 26, seek_keys as u32);

        let end = w.pos();
        let mut header = WBuffer::default();
        header.data.extend_from_slice(ROOT_MAGIC);
        header.u32(FILE_VERSION);
        header.u32(BEGIN as u32);
        header.u32(end as u32); // fEND
        header.u32(0); // fSeekFree
        header.u32(0); // fNbytesFree
        header.u32(0); // nfree
        header.u32(nbytes_name as u32);
        header.u8(4); // fUnits
        header.u32(if self.compression == Compression::Zlib { 101 } else { 0 });
        header.u32(0); // fSeekInfo
        header.u32(0); // fNbytesInfo
        header.u16(1); // fUUID version
        header.data.extend_from_slice(&[0u8; 16]);
        w.data[..header.data.len()].copy_from_slice(&header.data);

        Ok(w.data)
    }

    /// Serialize the file to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

/// Big-endian output buffer.
#[derive(Default)]
struct WBuffer {
    data: Vec<u8>,
}

impl WBuffer {
    fn pos(&self) -> usize {
        self.data.len()
    }

    fn u8(&mut self, v: u8) {
        self.data.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    fn i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    fn f64(&mut self, v: f64) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    fn string(&mut self, s: &str) {
        if s.len() < 255 {
            self.u8(s.len() as u8);
        } else {
            self.u8(255);
            self.u32(s.len() as u32);
        }
        self.data.extend_from_slice(s.as_bytes());
    }

    fn patch_u32(&mut self, at: usize, v: u32) {
        self.data[at..at + 4].copy_from_slice(&v.to_be_bytes());
    }

    /// Open a versioned object; close it with [`end_object`](Self::end_object).
    fn begin_object(&mut self, version: u16) -> usize {
        let start = self.pos();
        self.u32(0);
        self.u16(version);
        start
    }

    fn end_object(&mut self, start: usize) {
        let byte_count = (self.pos() - start - 4) as u32;
        self.patch_u32(start, byte_count | BYTE_COUNT_MASK);
    }

    fn tobject(&mut self) {
        self.u16(1);
        self.u32(0);
        self.u32(TOBJECT_BITS);
    }

    fn tnamed(&mut self, name: &str, title: &str) {
        let start = self.begin_object(1);
        self.tobject();
        self.string(name);
        self.string(title);
        self.end_object(start);
    }

    fn array(&mut self, values: &[f64], precision: Precision) {
        self.i32(values.len() as i32);
        for &v in values {
            match precision {
                Precision::Float => self.f32(v as f32),
                Precision::Double => self.f64(v),
            }
        }
    }
}

fn str_len(s: &str) -> usize {
    if s.len() < 255 { 1 + s.len() } else { 5 + s.len() }
}

fn key_len(class: &str, name: &str, title: &str) -> usize {
    26 + str_len(class) + str_len(name) + str_len(title)
}

struct KeyRecord {
    class: String,
    name: String,
    title: String,
    obj_len: usize,
    n_bytes: usize,
    key_len: usize,
    seek_key: usize,
    seek_pdir: usize,
}

impl KeyRecord {
    fn write(&self, w: &mut WBuffer) {
        w.u32(self.n_bytes as u32);
        w.u16(KEY_VERSION);
        w.u32(self.obj_len as u32);
        w.u32(DATIME);
        w.u16(self.key_len as u16);
        w.u16(1); // cycle
        w.u32(self.seek_key as u32);
        w.u32(self.seek_pdir as u32);
        w.string(&self.class);
        w.string(&self.name);
        w.string(&self.title);
    }
}

fn write_object(w: &mut WBuffer, object: &Object, seek_pdir: usize, compression: Compression) -> Result<KeyRecord> {
    let stored = match compression {
        Compression::None => None,
        Compression::Zlib => Some(zlib_blocks(&object.payload)?),
    }
    .filter(|c| c.len() < object.payload.len());
    let stored = stored.as_deref().unwrap_or(&object.payload);

    let key_len = key_len(object.class, &object.name, &object.title);
    let record = KeyRecord {
        class: object.class.into(),
        name: object.name.clone(),
        title: object.title.clone(),
        obj_len: object.payload.len(),
        n_bytes: key_len + stored.len(),
        key_len,
        seek_key: w.pos(),
        seek_pdir,
    };
    record.write(w);
    w.data.extend_from_slice(stored);
    Ok(record)
}

fn zlib_blocks(payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for chunk in payload.chunks(MAX_BLOCK) {
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(chunk)?;
        let compressed = encoder.finish()?;
        out.extend_from_slice(&block_header(b"ZL", 8, compressed.len(), chunk.len()));
        out.extend_from_slice(&compressed);
    }
    Ok(out)
}

/// Write a key list; returns `(seek_keys, nbytes_keys)`.
fn write_key_list(w: &mut WBuffer, keys: &[KeyRecord], class: &str, name: &str) -> (usize, usize) {
    let list_key_len = key_len(class, name, "");
    let body_len = 4 + keys.iter().map(|k| k.key_len).sum::<usize>();
    let seek_keys = w.pos();
    KeyRecord {
        class: class.into(),
        name: name.into(),
        title: String::new(),
        obj_len: body_len,
        n_bytes: list_key_len + body_len,
        key_len: list_key_len,
        seek_key: seek_keys,
        seek_pdir: BEGIN,
    }
    .write(w);
    w.u32(keys.len() as u32);
    for key in keys {
        key.write(w);
    }
    (seek_keys, list_key_len + body_len)
}

fn write_directory(
    w: &mut WBuffer,
    nbytes_keys: usize,
    nbytes_name: usize,
    seek_dir: usize,
    seek_parent: usize,
    seek_keys: usize,
) {
    w.u16(DIRECTORY_VERSION);
    w.u32(DATIME);
    w.u32(DATIME);
    w.u32(nbytes_keys as u32);
    w.u32(nbytes_name as u32);
    w.u32(seek_dir as u32);
    w.u32(seek_parent as u32);
    w.u32(seek_keys as u32);
    w.u16(1); // UUID version
    w.data.extend_from_slice(&[0u8; 16]);
}

fn histogram_object(h: &Histogram, precision: Precision) -> Object {
    match h {
        Histogram::H1(h) => th1_object(h, precision),
        Histogram::H2(h) => th2_object(h, precision),
    }
}

/// Running sums written into the TH1 statistics fields.
#[derive(Default)]
struct Moments {
    sumw: f64,
    sumw2: f64,
    sumwx: f64,
    sumwx2: f64,
}

impl Moments {
    fn add(&mut self, w: f64, w2: f64, x: f64) {
        self.sumw += w;
        self.sumw2 += w2;
        self.sumwx += w * x;
        self.sumwx2 += w * x * x;
    }
}

fn write_taxis(w: &mut WBuffer, name: &str, axis: &Axis) {
    let start = w.begin_object(10);
    w.tnamed(name, "");

    let att = w.begin_object(4); // TAttAxis
    w.i32(510);
    w.i16(1);
    w.i16(1);
    w.i16(42);
    w.f32(0.005);
    w.f32(0.035);
    w.f32(0.03);
    w.f32(1.0);
    w.f32(0.035);
    w.i16(1);
    w.i16(42);
    w.end_object(att);

    w.i32(axis.n_bins() as i32);
    w.f64(axis.x_min());
    w.f64(axis.x_max());
    if axis.is_uniform() {
        w.i32(0);
    } else {
        w.array(&axis.edges(), Precision::Double);
    }
    w.i32(0); // fFirst
    w.i32(0); // fLast
    w.u16(0); // fBits2
    w.u8(0); // fTimeDisplay
    w.string(""); // fTimeFormat
    w.u32(0); // fLabels
    w.u32(0); // fModLabs
    w.end_object(start);
}

fn write_empty_list(w: &mut WBuffer) {
    let start = w.pos();
    w.u32(0);
    w.u32(NEW_CLASS_TAG);
    w.data.extend_from_slice(b"TList\0");
    let body = w.begin_object(5);
    w.tobject();
    w.string("");
    w.i32(0);
    w.end_object(body);
    w.end_object(start);
}

struct Th1Fields<'a> {
    name: &'a str,
    title: &'a str,
    n_cells: usize,
    axes: [&'a Axis; 3],
    entries: f64,
    moments: Moments,
    sumw2: Option<Vec<f64>>,
}

fn write_th1_base(w: &mut WBuffer, f: &Th1Fields) {
    let start = w.begin_object(8);
    w.tnamed(f.name, f.title);

    let att = w.begin_object(2); // TAttLine
    w.i16(602);
    w.i16(1);
    w.i16(1);
    w.end_object(att);
    let att = w.begin_object(2); // TAttFill
    w.i16(0);
    w.i16(1001);
    w.end_object(att);
    let att = w.begin_object(2); // TAttMarker
    w.i16(1);
    w.i16(1);
    w.f32(1.0);
    w.end_object(att);

    w.i32(f.n_cells as i32);
    for (axis, name) in f.axes.iter().zip(["xaxis", "yaxis", "zaxis"]) {
        write_taxis(w, name, axis);
    }

    w.i16(0); // fBarOffset
    w.i16(1000); // fBarWidth
    w.f64(f.entries);
    w.f64(f.moments.sumw);
    w.f64(f.moments.sumw2);
    w.f64(f.moments.sumwx);
    w.f64(f.moments.sumwx2);
    w.f64(-1111.0); // fMaximum
    w.f64(-1111.0); // fMinimum
    w.f64(0.0); // fNormFactor
    w.i32(0); // fContour
    match &f.sumw2 {
        Some(sumw2) => w.array(sumw2, Precision::Double),
        None => w.i32(0),
    }
    w.string(""); // fOption
    write_empty_list(w); // fFunctions
    w.i32(0); // fBufferSize
    w.u8(0); // fBuffer
    w.i32(0); // fBinStatErrOpt
    w.i32(2); // fStatOverflows
    w.end_object(start);
}

fn unit_axis() -> Axis {
    Axis::uniform(1, 0.0, 1.0).unwrap_or_else(|_| unreachable!("unit axis is valid"))
}

fn class_name(dimension: usize, precision: Precision) -> &'static str {
    match (dimension, precision) {
        (1, Precision::Float) => "TH1F",
        (1, Precision::Double) => "TH1D",
        (_, Precision::Float) => "TH2F",
        (_, Precision::Double) => "TH2D",
    }
}

fn th1_object(h: &Histogram1D, precision: Precision) -> Object {
    let n = h.n_bins();
    let mut cells = Vec::with_capacity(n + 2);
    cells.push(h.underflow);
    cells.extend_from_slice(&h.contents);
    cells.push(h.overflow);

    let mut moments = Moments::default();
    for bin in 1..=n {
        let c = h.contents[bin - 1];
        let w2 = h.sumw2.as_ref().map_or(c, |s| s[bin - 1]);
        moments.add(c, w2, h.axis.bin_center(bin));
    }
    let sumw2 = h.sumw2.as_ref().map(|s| {
        let mut full = Vec::with_capacity(n + 2);
        full.push(0.0);
        full.extend_from_slice(s);
        full.push(0.0);
        full
    });

    let unit = unit_axis();
    let mut w = WBuffer::default();
    let start = w.begin_object(3);
    write_th1_base(
        &mut w,
        &Th1Fields {
            name: &h.name,
            title: &h.title,
            n_cells: n + 2,
            axes: [&h.axis, &unit, &unit],
            entries: h.entries,
            moments,
            sumw2,
        },
    );
    w.array(&cells, precision);
    w.end_object(start);

    Object { class: class_name(1, precision), name: h.name.clone(), title: h.title.clone(), payload: w.data }
}

fn th2_object(h: &Histogram2D, precision: Precision) -> Object {
    let (nx, ny) = (h.x_axis.n_bins(), h.y_axis.n_bins());
    let n_cells = (nx + 2) * (ny + 2);
    let mut cells = vec![0.0; n_cells];
    let mut sumw2 = h.sumw2.as_ref().map(|_| vec![0.0; n_cells]);
    let mut moments = Moments::default();
    let (mut sumwy, mut sumwy2, mut sumwxy) = (0.0, 0.0, 0.0);

    for iy in 1..=ny {
        for ix in 1..=nx {
            let global = ix + (nx + 2) * iy;
            let local = (iy - 1) * nx + (ix - 1);
            let c = h.contents[local];
            cells[global] = c;
            let w2 = match (sumw2.as_mut(), h.sumw2.as_ref()) {
                (Some(dst), Some(src)) => {
                    dst[global] = src[local];
                    src[local]
                }
                _ => c,
            };
            let (x, y) = (h.x_axis.bin_center(ix), h.y_axis.bin_center(iy));
            moments.add(c, w2, x);
            sumwy += c * y;
            sumwy2 += c * y * y;
            sumwxy += c * x * y;
        }
    }

    let unit = unit_axis();
    let mut w = WBuffer::default();
    let start = w.begin_object(4);
    let th2 = w.begin_object(5);
    write_th1_base(
        &mut w,
        &Th1Fields {
            name: &h.name,
            title: &h.title,
            n_cells,
            axes: [&h.x_axis, &h.y_axis, &unit],
            entries: h.entries,
            moments,
            sumw2,
        },
    );
    w.f64(1.0); // fScalefactor
    w.f64(sumwy);
    w.f64(sumwy2);
    w.f64(sumwxy);
    w.end_object(th2);
    w.array(&cells, precision);
    w.end_object(start);

    Object { class: class_name(2, precision), name: h.name.clone(), title: h.title.clone(), payload: w.data }
}

//! TFile header parsing and the top-level reader interface.

use std::fs;
use std::path::{Path, PathBuf};

use cp_core::{Histogram, HistogramMap};

use crate::datasource::DataSource;
use crate::decompress::decompress;
use crate::directory::{Directory, DirectoryHeader};
use crate::error::{Result, RootError};
use crate::key::{Key, KeyInfo};
use crate::objects;
use crate::rbuffer::RBuffer;

/// The file magic.
pub(crate) const ROOT_MAGIC: &[u8; 4] = b"root";

/// Smallest file that can hold a complete header.
const MIN_FILE_LEN: usize = 64;

/// File format versions at or above this use 64-bit seek pointers.
pub(crate) const LARGE_FILE_VERSION: u32 = 1_000_000;

/// Parsed file header.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    /// Whether the file uses 64-bit seek pointers.
    is_large: bool,
    /// Offset of the top-level key list.
    seek_keys: u64,
}

/// A ROOT file opened for reading histograms.
pub struct RootFile {
    data: DataSource,
    header: FileHeader,
    path: PathBuf,
}

impl RootFile {
    /// Open and parse a ROOT file from disk using memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        // SAFETY: the mapping is read-only; files are not modified while a
        // plotting run reads them.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::from_datasource(DataSource::Mmap(mmap), path)
    }

    /// Parse a ROOT file held in memory; `path` is only used in messages.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_datasource(DataSource::Owned(data), path.into())
    }

    fn from_datasource(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < MIN_FILE_LEN || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let header = Self::parse_header(&data)?;
        log::debug!("opened {} ({} bytes, large={})", path.display(), data.len(), header.is_large);
        Ok(Self { data, header, path })
    }

    /// Parse the file header and the top-level TDirectory.
    ///
    /// Small-file layout (version < 1000000):
    /// ```text
    /// offset  size  field
    ///    0      4   magic "root"
    ///    4      4   fVersion
    ///    8      4   fBEGIN
    ///   12      4   fEND
    ///   16      4   fSeekFree
    ///   20      4   fNbytesFree
    ///   24      4   nfree
    ///   28      4   fNbytesName
    ///   32      1   fUnits
    ///   33      4   fCompress
    ///   37      4   fSeekInfo
    ///   41      4   fNbytesInfo
    ///   45     18   fUUID
    /// ```
    /// Large files widen fEND, fSeekFree and fSeekInfo to 8 bytes. The
    /// TDirectory streamer sits at `fBEGIN + fNbytesName`.
    fn parse_header(data: &[u8]) -> Result<FileHeader> {
        let mut r = RBuffer::new(data);
        r.skip(4)?;

        let version = r.read_u32()?;
        let is_large = version >= LARGE_FILE_VERSION;
        let begin = r.read_u32()? as usize;
        if is_large {
            let _end = r.read_u64()?;
            let _seek_free = r.read_u64()?;
        } else {
            let _end = r.read_u32()?;
            let _seek_free = r.read_u32()?;
        }
        let _nbytes_free = r.read_u32()?;
        let _nfree = r.read_u32()?;
        let nbytes_name = r.read_u32()? as usize;

        let dir_offset = begin + nbytes_name;
        if dir_offset >= data.len() {
            return Err(RootError::Deserialization("TDirectory offset past end of file".into()));
        }
        r.set_pos(dir_offset)?;
        let dir = DirectoryHeader::read(&mut r)?;

        Ok(FileHeader { is_large, seek_keys: dir.seek_keys })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys of the top-level directory, one per name (highest cycle).
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let dir = self.read_top_directory()?;
        Ok(dir.latest_keys().into_iter().map(KeyInfo::from).collect())
    }

    /// Read the histogram at `path` (e.g. `"histos_w_1"` or `"subdir/name"`).
    pub fn get_histogram(&self, path: &str) -> Result<Histogram> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((name, dirs)) = parts.split_last() else {
            return Err(RootError::KeyNotFound(path.to_string()));
        };

        let mut dir = self.read_top_directory()?;
        for &part in dirs {
            let key = dir
                .find_key(part)
                .ok_or_else(|| RootError::KeyNotFound(format!("{part} (in path {path})")))?;
            if !key.is_directory() {
                return Err(RootError::Deserialization(format!(
                    "'{part}' is not a directory (class: {})",
                    key.class_name
                )));
            }
            dir = self.read_subdirectory(key)?;
        }

        let key = dir.find_key(name).ok_or_else(|| RootError::KeyNotFound(path.to_string()))?;
        self.read_histogram_key(key)
    }

    /// Load every top-level histogram into a name-keyed mapping.
    ///
    /// Keys of other classes (trees, directories, canvases) are skipped.
    pub fn histograms(&self) -> Result<HistogramMap> {
        let dir = self.read_top_directory()?;
        let mut map = HistogramMap::new();
        for key in dir.latest_keys() {
            if !objects::is_histogram_class(&key.class_name) {
                log::debug!("skipping {} ({})", key.name, key.class_name);
                continue;
            }
            let h = self.read_histogram_key(key)?;
            map.insert_as(key.name.clone(), h);
        }
        log::info!("loaded {} histograms from {}", map.len(), self.path.display());
        Ok(map)
    }

    fn read_top_directory(&self) -> Result<Directory> {
        Directory::read_key_list(&self.data, self.header.seek_keys as usize, self.header.is_large)
    }

    fn read_subdirectory(&self, key: &Key) -> Result<Directory> {
        let payload = read_key_payload_from(&self.data, key)?;
        Directory::read_from_payload(&payload, self.header.is_large, &self.data)
    }

    fn read_histogram_key(&self, key: &Key) -> Result<Histogram> {
        let payload = read_key_payload_from(&self.data, key)?;
        objects::read_histogram(&payload, &key.class_name).map_err(|e| match e {
            RootError::Deserialization(msg) => {
                RootError::Deserialization(format!("{} ({}): {msg}", key.name, key.class_name))
            }
            other => other,
        })
    }
}

/// Open `path` and load its top-level histograms.
pub fn load_histograms(path: impl AsRef<Path>) -> Result<HistogramMap> {
    RootFile::open(path)?.histograms()
}

/// Read and, if needed, decompress the object stored under `key`.
pub(crate) fn read_key_payload_from(data: &[u8], key: &Key) -> Result<Vec<u8>> {
    let seek = key.seek_key as usize;
    let n_bytes = key.n_bytes as usize;
    let key_len = key.key_len as usize;
    if seek + n_bytes > data.len() || key_len > n_bytes {
        return Err(RootError::BufferUnderflow {
            offset: seek,
            need: n_bytes,
            have: data.len().saturating_sub(seek),
        });
    }

    let stored = &data[seek + key_len..seek + n_bytes];
    if key.is_compressed() {
        decompress(stored, key.obj_len as usize)
    } else {
        Ok(stored.to_vec())
    }
}

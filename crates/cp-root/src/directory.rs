//! TDirectory parsing and key-list navigation.

use crate::error::Result;
use crate::key::{Key, LARGE_KEY_VERSION};
use crate::rbuffer::RBuffer;

/// Location of a directory's key list, from its TDirectory streamer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DirectoryHeader {
    pub seek_keys: u64,
}

impl DirectoryHeader {
    /// Read the TDirectory streamer at the cursor.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let version = r.read_u16()?;
        let _datime_c = r.read_u32()?;
        let _datime_m = r.read_u32()?;
        let _nbytes_keys = r.read_u32()?;
        let _nbytes_name = r.read_u32()?;
        let seek_keys = if version > LARGE_KEY_VERSION {
            let _seek_dir = r.read_u64()?;
            let _seek_parent = r.read_u64()?;
            r.read_u64()?
        } else {
            let _seek_dir = r.read_u32()?;
            let _seek_parent = r.read_u32()?;
            u64::from(r.read_u32()?)
        };
        Ok(Self { seek_keys })
    }
}

/// A directory: its keys in file order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list stored at `seek_keys`.
    ///
    /// The list starts with a TKey header for the list itself, then a u32
    /// key count, then that many TKey records.
    pub fn read_key_list(file_data: &[u8], seek_keys: usize, is_large: bool) -> Result<Self> {
        let mut r = RBuffer::new(file_data);
        r.set_pos(seek_keys)?;

        let _list_key = Key::read(&mut r, is_large)?;
        let nkeys = r.read_u32()? as usize;

        let mut keys = Vec::with_capacity(nkeys.min(r.remaining()));
        for _ in 0..nkeys {
            keys.push(Key::read(&mut r, is_large)?);
        }
        Ok(Directory { keys })
    }

    /// Read a sub-directory from the decompressed payload of its key.
    pub fn read_from_payload(payload: &[u8], is_large: bool, file_data: &[u8]) -> Result<Self> {
        let header = DirectoryHeader::read(&mut RBuffer::new(payload))?;
        if header.seek_keys == 0 {
            return Ok(Directory::default());
        }
        Self::read_key_list(file_data, header.seek_keys as usize, is_large)
    }

    /// All keys, every cycle included.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Keys with one entry per name, keeping the highest cycle.
    pub fn latest_keys(&self) -> Vec<&Key> {
        let mut out: Vec<&Key> = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match out.iter_mut().find(|k| k.name == key.name) {
                Some(slot) if slot.cycle < key.cycle => *slot = key,
                Some(_) => {}
                None => out.push(key),
            }
        }
        out
    }

    /// Find a key by name (highest cycle).
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}

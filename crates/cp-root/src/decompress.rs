//! ROOT compression blocks (ZL = zlib, L4 = LZ4, ZS = ZSTD, XZ = LZMA).
//!
//! A compressed object is one or more blocks, each with a 9-byte header:
//! ```text
//! bytes 0-1:  algorithm tag ("ZL", "XZ", "L4", "ZS")
//! byte  2:    method (ignored)
//! bytes 3-5:  compressed size   (3-byte little-endian)
//! bytes 6-8:  uncompressed size (3-byte little-endian)
//! ```

use crate::error::{Result, RootError};

/// Size of a block header.
pub const BLOCK_HEADER_LEN: usize = 9;

/// Decompress ROOT-compressed data into exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut offset = 0;

    while out.len() < expected_len && offset + BLOCK_HEADER_LEN <= src.len() {
        let tag = &src[offset..offset + 2];
        let c_size = read_le24(&src[offset + 3..offset + 6]);
        let u_size = read_le24(&src[offset + 6..offset + 9]);
        offset += BLOCK_HEADER_LEN;

        let end = offset + c_size;
        if end > src.len() {
            return Err(RootError::Decompression(format!(
                "compressed block claims {} bytes but only {} remain",
                c_size,
                src.len() - offset
            )));
        }
        let compressed = &src[offset..end];

        let block = match tag {
            b"ZL" => decompress_zlib(compressed, u_size)?,
            b"L4" => decompress_lz4(compressed, u_size)?,
            b"ZS" => decompress_zstd(compressed, u_size)?,
            b"XZ" => decompress_xz(compressed, u_size)?,
            _ => {
                return Err(RootError::Decompression(format!(
                    "unsupported compression algorithm {:?}",
                    String::from_utf8_lossy(tag)
                )));
            }
        };
        if block.len() != u_size {
            return Err(RootError::Decompression(format!(
                "block expected {} uncompressed bytes, got {}",
                u_size,
                block.len()
            )));
        }

        out.extend_from_slice(&block);
        offset = end;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "total decompressed length {} != expected {}",
            out.len(),
            expected_len
        )));
    }
    Ok(out)
}

fn decompress_zlib(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut out = Vec::with_capacity(expected);
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| RootError::Decompression(format!("zlib: {e}")))?;
    Ok(out)
}

fn decompress_lz4(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    // An 8-byte xxhash64 checksum precedes the LZ4 payload; it is not verified.
    if data.len() < 8 {
        return Err(RootError::Decompression("LZ4 block too small for checksum header".into()));
    }
    lz4_flex::decompress(&data[8..], expected).map_err(|e| RootError::Decompression(format!("lz4: {e}")))
}

fn decompress_zstd(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; expected];
    let written = ruzstd::decoding::FrameDecoder::new()
        .decode_all(data, &mut out)
        .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
    out.truncate(written);
    Ok(out)
}

fn decompress_xz(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut input = std::io::BufReader::new(data);
    let mut out = Vec::with_capacity(expected);
    lzma_rs::xz_decompress(&mut input, &mut out).map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
    Ok(out)
}

/// Read a 3-byte little-endian unsigned integer.
fn read_le24(b: &[u8]) -> usize {
    b[0] as usize | ((b[1] as usize) << 8) | ((b[2] as usize) << 16)
}

/// Write the 9-byte header of a block.
pub(crate) fn block_header(tag: &[u8; 2], method: u8, c_len: usize, u_len: usize) -> [u8; BLOCK_HEADER_LEN] {
    let c = (c_len as u32).to_le_bytes();
    let u = (u_len as u32).to_le_bytes();
    [tag[0], tag[1], method, c[0], c[1], c[2], u[0], u[1], u[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_root_block(tag: &[u8; 2], method: u8, compressed: &[u8], u_len: usize) -> Vec<u8> {
        let mut block = block_header(tag, method, compressed.len(), u_len).to_vec();
        block.extend_from_slice(compressed);
        block
    }

    fn zlib(data: &[u8]) -> Vec<u8> {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn le24_values() {
        assert_eq!(read_le24(&[0x10, 0x00, 0x00]), 16);
        assert_eq!(read_le24(&[0xff, 0xff, 0xff]), 0xFF_FFFF);
        assert_eq!(read_le24(&[0x00, 0x01, 0x00]), 256);
        assert_eq!(read_le24(&block_header(b"ZL", 8, 70_000, 1)[3..6]), 70_000);
    }

    #[test]
    fn zlib_block() {
        let original = b"sector 1 sector 2 sector 3 sector 4 sector 5 sector 6";
        let block = make_root_block(b"ZL", 8, &zlib(original), original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn multiple_blocks_concatenate() {
        let (a, b) = (b"first half of the payload ".as_slice(), b"second half".as_slice());
        let mut src = make_root_block(b"ZL", 8, &zlib(a), a.len());
        src.extend(make_root_block(b"ZL", 8, &zlib(b), b.len()));
        let out = decompress(&src, a.len() + b.len()).unwrap();
        assert_eq!(out, [a, b].concat());
    }

    #[test]
    fn lz4_block_skips_checksum() {
        let original = b"W vs Q2 W vs Q2 W vs Q2 W vs Q2 W vs Q2";
        let mut payload = vec![0u8; 8];
        payload.extend(lz4_flex::compress(original));
        let block = make_root_block(b"L4", 1, &payload, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn zstd_block() {
        let original = b"delta p electron delta p electron delta p electron";
        let compressed = ruzstd::encoding::compress_to_vec(
            &original[..],
            ruzstd::encoding::CompressionLevel::Fastest,
        );
        let block = make_root_block(b"ZS", 4, &compressed, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn xz_block() {
        let original = b"theta proton theta proton theta proton theta proton";
        let mut compressed = Vec::new();
        lzma_rs::xz_compress(&mut std::io::BufReader::new(&original[..]), &mut compressed).unwrap();
        let block = make_root_block(b"XZ", 5, &compressed, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn unknown_tag_and_short_input_fail() {
        let block = make_root_block(b"QQ", 0, &[1, 2, 3], 3);
        assert!(matches!(decompress(&block, 3), Err(RootError::Decompression(_))));

        let original = b"abcdef";
        let mut block = make_root_block(b"ZL", 8, &zlib(original), original.len());
        block.truncate(block.len() - 2);
        assert!(decompress(&block, original.len()).is_err());
    }
}

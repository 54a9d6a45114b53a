//! Flate compression for PDF streams

use crate::error::{LabelSheetError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Compress data using Flate/Zlib compression
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(LabelSheetError::Io)?;
    encoder.finish().map_err(LabelSheetError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn decompress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_white_raster_compresses_well() {
        let white = vec![255u8; 3 * 1181 * 100];
        let compressed = compress(&white).unwrap();
        assert!(compressed.len() < white.len() / 100);
        assert_eq!(decompress(&compressed), white);
    }

    #[test]
    fn test_compress_empty() {
        let compressed = compress(b"").unwrap();
        assert!(!compressed.is_empty());
        assert!(decompress(&compressed).is_empty());
    }
}

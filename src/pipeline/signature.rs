//! Byte-signature and PNG chunk-structure validation.
//!
//! A file's declared media type is whatever the picker or extension claims;
//! the leading bytes are what the file actually is. Validation trusts only
//! the bytes: [`identify_format`] compares the minimal prefix (3 bytes for
//! JPEG, 8 for PNG) so the check is O(1) in file size, and
//! [`check_png_structure`] adds a shallow chunk sanity pass that catches
//! truncated or corrupted PNGs without pulling in a full parser.

use serde::{Deserialize, Serialize};

/// JPEG files begin with the SOI marker followed by a third `FF` of the
/// first segment marker.
pub const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// The fixed 8-byte PNG signature.
pub const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// How many leading bytes a caller must supply to classify any supported
/// format (the longer of the two signatures).
pub const SNIFF_LEN: usize = PNG_MAGIC.len();

/// Format verdict from the leading byte signature alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SniffedFormat {
    Jpeg,
    Png,
    /// Neither signature matched.
    Unknown,
}

/// Classify a file by its leading bytes.
///
/// `prefix` is whatever the caller already read from the start of the file —
/// [`SNIFF_LEN`] bytes suffice, shorter slices are fine (a 2-byte file can
/// match neither signature and comes back `Unknown`). Never fails: an I/O
/// problem reading the prefix is the reader's error, not a format verdict.
pub fn identify_format(prefix: &[u8]) -> SniffedFormat {
    if prefix.starts_with(&JPEG_MAGIC) {
        SniffedFormat::Jpeg
    } else if prefix.starts_with(&PNG_MAGIC) {
        SniffedFormat::Png
    } else {
        SniffedFormat::Unknown
    }
}

/// Shallow PNG well-formedness check over the full byte content.
///
/// Verifies three things, in order:
/// 1. the 8-byte signature (a caller may pass bytes it has not sniffed yet);
/// 2. the first chunk after the signature is `IHDR` — its 4-byte type field
///    sits at bytes 12..16, after the chunk's 4-byte length field;
/// 3. an `IEND` chunk type appears within the final 12 bytes — the closing
///    chunk is length + type + CRC, and a few writers append trailing junk,
///    so the marker is searched backward through that whole region.
///
/// Chunk CRCs are not verified. The goal is to reject truncated or
/// mis-assembled files cheaply, not to validate the image payload.
pub fn check_png_structure(bytes: &[u8]) -> bool {
    if !bytes.starts_with(&PNG_MAGIC) {
        return false;
    }

    // IHDR must immediately follow the signature.
    let ihdr_type = PNG_MAGIC.len() + 4;
    match bytes.get(ihdr_type..ihdr_type + 4) {
        Some(t) if t == b"IHDR".as_slice() => {}
        _ => return false,
    }

    // IEND within the trailing region. The IHDR check above guarantees
    // enough length for these subtractions.
    let last = bytes.len() - 4;
    let first = bytes.len().saturating_sub(12);
    (first..=last).rev().any(|i| bytes[i..i + 4] == *b"IEND")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal structurally valid PNG: signature, IHDR, IEND.
    fn tiny_png() -> Vec<u8> {
        let mut v = PNG_MAGIC.to_vec();
        // IHDR: length 13, type, 13 payload bytes, CRC (not verified here)
        v.extend_from_slice(&13u32.to_be_bytes());
        v.extend_from_slice(b"IHDR");
        v.extend_from_slice(&[0; 13]);
        v.extend_from_slice(&[0; 4]);
        // IEND: length 0, type, CRC
        v.extend_from_slice(&0u32.to_be_bytes());
        v.extend_from_slice(b"IEND");
        v.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
        v
    }

    #[test]
    fn jpeg_prefix_identified_regardless_of_rest() {
        assert_eq!(
            identify_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            SniffedFormat::Jpeg
        );
        // Exactly the minimal prefix
        assert_eq!(identify_format(&JPEG_MAGIC), SniffedFormat::Jpeg);
    }

    #[test]
    fn png_signature_identified() {
        assert_eq!(identify_format(&PNG_MAGIC), SniffedFormat::Png);
        assert_eq!(identify_format(&tiny_png()), SniffedFormat::Png);
    }

    #[test]
    fn garbage_and_short_prefixes_are_unknown() {
        assert_eq!(identify_format(&[0x00, 0x00, 0x00]), SniffedFormat::Unknown);
        assert_eq!(identify_format(&[0xFF, 0xD8]), SniffedFormat::Unknown);
        assert_eq!(identify_format(&[]), SniffedFormat::Unknown);
        // PNG signature truncated by one byte
        assert_eq!(
            identify_format(&PNG_MAGIC[..7]),
            SniffedFormat::Unknown
        );
    }

    #[test]
    fn valid_tiny_png_passes_structure_check() {
        assert!(check_png_structure(&tiny_png()));
    }

    #[test]
    fn wrong_first_chunk_fails() {
        let mut bad = tiny_png();
        // Overwrite the IHDR type field (bytes 12..16)
        bad[12..16].copy_from_slice(b"TEXT");
        assert!(!check_png_structure(&bad));
    }

    #[test]
    fn missing_iend_fails() {
        let png = tiny_png();
        // Drop the final 12 bytes (the whole IEND chunk)
        assert!(!check_png_structure(&png[..png.len() - 12]));
    }

    #[test]
    fn iend_found_despite_trailing_junk() {
        let mut png = tiny_png();
        png.extend_from_slice(&[0x00, 0x00]);
        assert!(check_png_structure(&png));
    }

    #[test]
    fn signature_only_fails_structure_check() {
        assert!(!check_png_structure(&PNG_MAGIC));
    }

    #[test]
    fn non_png_bytes_fail_structure_check() {
        assert!(!check_png_structure(b"not a png at all"));
        assert!(!check_png_structure(&[]));
    }
}

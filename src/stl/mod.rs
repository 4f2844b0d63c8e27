//! The STL codec.
//!
//! Binary layout, all little-endian:
//! `[80 byte header][u32 triangle count][count x (3 f32 normal, 9 f32 vertices, u16 attribute)]`.
//!
//! ASCII layout is the usual `solid` / `facet normal` / `outer loop` /
//! `vertex` / `endloop` / `endfacet` / `endsolid` keyword grammar.

pub mod reader;
pub mod writer;

pub use reader::{read_stl, read_stl_file, read_stl_with, ReadOptions};
pub use writer::{write_stl, write_stl_file, WriteOptions};

pub const BINARY_HEADER_LEN: usize = 80;
/// Header plus the u32 triangle count.
pub const BINARY_PREAMBLE_LEN: usize = BINARY_HEADER_LEN + 4;
/// 12 f32 values plus the u16 attribute byte count.
pub const BINARY_TRIANGLE_LEN: usize = 12 * 4 + 2;
/// How many leading bytes format detection looks at.
pub const DETECTION_WINDOW: usize = 1024;

/// The two STL encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StlFormat {
    Ascii,
    #[default]
    Binary,
}

/// Guess the encoding from the first bytes of a file.
///
/// ASCII requires the literal `solid` at offset zero, followed after the first
/// line break by a `facet` (or, for an empty solid, an `endsolid`) keyword.
/// Everything else is binary.
///
/// A binary file is free to start its header with `solid`. Such files are
/// still detected as binary unless the header itself contains a line break
/// followed by one of those keywords. If that happens, pass the format
/// explicitly through [`ReadOptions`].
pub fn detect_format(prefix: &[u8]) -> StlFormat {
    if !prefix.starts_with(b"solid") {
        return StlFormat::Binary;
    }
    let body = match prefix.iter().position(|&b| b == b'\n') {
        Some(newline) => &prefix[newline + 1..],
        None => return StlFormat::Binary,
    };
    if contains_ignore_case(body, b"facet") || contains_ignore_case(body, b"endsolid") {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    }
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn ascii_prefix() {
        assert_eq!(
            detect_format(b"solid x\nfacet normal 0 0 1\n"),
            StlFormat::Ascii
        );
        assert_eq!(
            detect_format(b"solid x\r\n  FACET NORMAL 0 0 1\r\n"),
            StlFormat::Ascii
        );
    }

    #[test]
    fn empty_ascii_solid() {
        assert_eq!(detect_format(b"solid x\nendsolid x\n"), StlFormat::Ascii);
    }

    #[test]
    fn binary_prefix() {
        assert_eq!(detect_format(&[0u8; 84]), StlFormat::Binary);
        assert_eq!(detect_format(b""), StlFormat::Binary);
    }

    #[test]
    fn solid_is_case_sensitive() {
        assert_eq!(
            detect_format(b"SOLID x\nfacet normal 0 0 1\n"),
            StlFormat::Binary
        );
    }

    #[test]
    fn binary_header_starting_with_solid() {
        let mut prefix = [0u8; 134];
        prefix[..13].copy_from_slice(b"solid exports");
        prefix[80] = 1;
        assert_eq!(detect_format(&prefix), StlFormat::Binary);

        // A line break alone is not enough.
        prefix[20] = b'\n';
        assert_eq!(detect_format(&prefix), StlFormat::Binary);
    }

    #[test]
    fn record_length() {
        assert_eq!(BINARY_TRIANGLE_LEN, 50);
        assert_eq!(BINARY_PREAMBLE_LEN, 84);
    }
}

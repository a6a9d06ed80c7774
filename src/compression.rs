//! Thin wrapper around the zstd codec used for every on-disk artifact
//!
//! Every artifact this format writes is compressed with a single codec, so
//! there is no multi-codec selector enum here — just a compression level
//! newtype and a pair of stream helpers.

use std::io::{self, Read, Write};

/// Compression level passed through to `zstd`, clamped to the range zstd
/// itself supports at construction time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompressionLevel(i32);

impl CompressionLevel {
	/// Construct a level, clamping to zstd's supported range
	pub fn new(level: i32) -> Self {
		let range = zstd::compression_level_range();
		Self(level.clamp(*range.start(), *range.end()))
	}

	pub(crate) fn as_i32(self) -> i32 {
		self.0
	}
}

impl Default for CompressionLevel {
	fn default() -> Self {
		Self::new(zstd::DEFAULT_COMPRESSION_LEVEL)
	}
}

/// Compress `data` as a single zstd frame and write it to `writer`
pub fn compress_to_writer<W: Write>(mut writer: W, data: &[u8], level: CompressionLevel) -> io::Result<()> {
	let compressed = zstd::stream::encode_all(data, level.as_i32())?;
	writer.write_all(&compressed)
}

/// Read a full zstd frame from `reader` and decompress it
pub fn decompress_from_reader<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
	let mut compressed = Vec::new();
	reader.read_to_end(&mut compressed)?;
	zstd::stream::decode_all(&compressed[..])
}

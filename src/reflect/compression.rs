use std::io::Read;

use crate::reflect::header::SNAPSHOT_MAGIC;
use crate::reflect::{Result, WalkError};

/// Upper bound on the size of an inflated snapshot.
const INFLATE_LIMIT: usize = 512 * 1024 * 1024;
const ZSTD_LEVEL: i32 = 3;
/// zstd frame magic used by compressed snapshots.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression mode of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Raw uncompressed stream.
	None,
	/// zstd-compressed stream.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}

	/// Classify a stream by its leading bytes.
	pub fn detect(raw: &[u8]) -> Result<Self> {
		if raw.starts_with(SNAPSHOT_MAGIC) {
			Ok(Self::None)
		} else if raw.starts_with(&ZSTD_MAGIC) {
			Ok(Self::Zstd)
		} else {
			let mut magic = [0_u8; 4];
			for (dst, src) in magic.iter_mut().zip(raw) {
				*dst = *src;
			}
			Err(WalkError::UnknownMagic { magic })
		}
	}
}

/// Detect and undo compression, returning `(mode, snapshot_bytes)`.
pub fn decode_bytes(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	let mode = Compression::detect(&raw)?;
	let bytes = match mode {
		Compression::None => raw,
		Compression::Zstd => inflate(&raw, INFLATE_LIMIT)?,
	};
	Ok((mode, bytes))
}

/// Apply `mode` to an encoded snapshot.
pub fn encode_bytes(raw: Vec<u8>, mode: Compression) -> Result<Vec<u8>> {
	match mode {
		Compression::None => Ok(raw),
		Compression::Zstd => Ok(zstd::stream::encode_all(raw.as_slice(), ZSTD_LEVEL)?),
	}
}

fn inflate(raw: &[u8], limit: usize) -> Result<Vec<u8>> {
	let decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	decoder.take(limit as u64 + 1).read_to_end(&mut out)?;

	if out.len() > limit {
		return Err(WalkError::DecompressedTooLarge { limit });
	}
	if !out.starts_with(SNAPSHOT_MAGIC) {
		return Err(WalkError::NotSnapshotAfterDecompress);
	}
	Ok(out)
}

use crate::reflect::{Result, WalkError};

/// Leading magic of every snapshot.
pub const SNAPSHOT_MAGIC: &[u8] = b"LAYWALK";

/// Parsed snapshot header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
	/// Total file header size in bytes.
	pub header_size: usize,
	/// Container format version.
	pub format_version: u16,
	/// Version of the tool that wrote the snapshot.
	pub writer_version: u16,
}

impl SnapshotHeader {
	/// Minimum number of bytes required for the header prefix.
	pub const MIN_SIZE: usize = 17;
	/// Container format version written by this crate.
	pub const FORMAT_VERSION: u16 = 1;
	/// Writer version stamped into new snapshots.
	pub const WRITER_VERSION: u16 = 1;

	/// Parse a snapshot header from the beginning of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let header = bytes.get(0..Self::MIN_SIZE).ok_or(WalkError::InvalidHeader)?;
		if &header[0..7] != SNAPSHOT_MAGIC {
			return Err(WalkError::InvalidHeader);
		}

		let header_size = parse_digits(&header[7..9]).ok_or(WalkError::InvalidHeader)? as usize;
		if header_size < Self::MIN_SIZE {
			return Err(WalkError::InvalidHeader);
		}

		if bytes.len() < header_size {
			return Err(WalkError::UnexpectedEof {
				at: bytes.len(),
				need: header_size - bytes.len(),
				rem: 0,
			});
		}

		if header[9] != b'-' {
			return Err(WalkError::InvalidHeader);
		}

		let format_version = parse_digits(&header[10..12]).ok_or(WalkError::InvalidHeader)?;
		if format_version != Self::FORMAT_VERSION {
			return Err(WalkError::UnsupportedFormatVersion { version: format_version });
		}

		if header[12] != b'v' {
			return Err(WalkError::BigEndianUnsupported);
		}

		let writer_version = parse_digits(&header[13..17]).ok_or(WalkError::InvalidHeader)?;

		Ok(Self {
			header_size,
			format_version,
			writer_version,
		})
	}

	/// Encode the current header.
	pub fn encode() -> Vec<u8> {
		format!(
			"LAYWALK{:02}-{:02}v{:04}",
			Self::MIN_SIZE,
			Self::FORMAT_VERSION,
			Self::WRITER_VERSION
		)
		.into_bytes()
	}
}

fn parse_digits(bytes: &[u8]) -> Option<u16> {
	if bytes.is_empty() {
		return None;
	}

	let mut value = 0_u16;
	for byte in bytes {
		if !byte.is_ascii_digit() {
			return None;
		}
		value = value * 10 + u16::from(*byte - b'0');
	}
	Some(value)
}

#[cfg(test)]
mod tests {
	use super::SnapshotHeader;
	use crate::reflect::WalkError;

	#[test]
	fn encoded_header_parses() {
		let bytes = SnapshotHeader::encode();
		let header = SnapshotHeader::parse(&bytes).expect("header parses");
		assert_eq!(header.header_size, 17);
		assert_eq!(header.format_version, 1);
		assert_eq!(header.writer_version, 1);
	}

	#[test]
	fn big_endian_marker_is_rejected() {
		let err = SnapshotHeader::parse(b"LAYWALK17-01V0001").expect_err("big endian rejected");
		assert!(matches!(err, WalkError::BigEndianUnsupported));
	}

	#[test]
	fn future_format_version_is_rejected() {
		let err = SnapshotHeader::parse(b"LAYWALK17-02v0001").expect_err("version rejected");
		assert!(matches!(err, WalkError::UnsupportedFormatVersion { version: 2 }));
	}

	#[test]
	fn truncated_header_is_invalid() {
		let err = SnapshotHeader::parse(b"LAYWALK17").expect_err("short header rejected");
		assert!(matches!(err, WalkError::InvalidHeader));
	}
}

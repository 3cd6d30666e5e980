use crate::reflect::bytes::Cursor;
use crate::reflect::{Result, WalkError};

/// Block flag marking an allocation that was freed before capture.
pub const BLOCK_FLAG_FREED: u32 = 1;

/// Parsed block header record.
#[derive(Debug, Clone, Copy)]
pub struct BHead {
	/// Four-byte block code.
	pub code: [u8; 4],
	/// Block flag bits.
	pub flags: u32,
	/// Address the payload lived at, 0 when not addressable.
	pub addr: u64,
	/// Payload length in bytes.
	pub len: u64,
}

impl BHead {
	/// Encoded header size in bytes.
	pub const SIZE: usize = 24;

	/// Parse one block header.
	pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
		let code = cursor.read_code4()?;
		let flags = cursor.read_u32_le()?;
		let addr = cursor.read_u64_le()?;

		let len = cursor.read_i64_le()?;
		if len < 0 {
			return Err(WalkError::NegativeBlockLength { len });
		}

		Ok(Self {
			code,
			flags,
			addr,
			len: len as u64,
		})
	}

	/// Append the encoded header to `out`.
	pub fn encode_into(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&self.code);
		out.extend_from_slice(&self.flags.to_le_bytes());
		out.extend_from_slice(&self.addr.to_le_bytes());
		out.extend_from_slice(&self.len.to_le_bytes());
	}

	/// Return whether this is the terminating block.
	pub fn is_endb(&self) -> bool {
		self.code == *b"ENDB"
	}

	/// Return whether the block describes freed storage.
	pub fn is_freed(&self) -> bool {
		self.flags & BLOCK_FLAG_FREED != 0
	}
}

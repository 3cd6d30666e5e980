use crate::reflect::bytes::Cursor;
use crate::reflect::{BHead, Result, WalkError};

/// One snapshot block: header plus borrowed payload.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
	/// Parsed header.
	pub head: BHead,
	/// Payload bytes.
	pub payload: &'a [u8],
	/// File offset of the block header.
	pub file_offset: usize,
}

/// Walks the block stream of a decoded snapshot.
///
/// Yields nothing further once `ENDB` has been returned or a block fails to parse.
pub struct BlockIter<'a> {
	bytes: &'a [u8],
	offset: usize,
	finished: bool,
}

impl<'a> BlockIter<'a> {
	/// Start iterating at `offset` within `bytes`.
	pub fn new(bytes: &'a [u8], offset: usize) -> Self {
		Self {
			bytes,
			offset,
			finished: offset >= bytes.len(),
		}
	}

	fn read_block(&mut self) -> Result<Block<'a>> {
		let file_offset = self.offset;
		let mut cursor = Cursor::new(&self.bytes[file_offset..]);
		let head = BHead::parse(&mut cursor)?;

		let rem = cursor.remaining();
		let len = usize::try_from(head.len)
			.ok()
			.filter(|len| *len <= rem)
			.ok_or(WalkError::BlockLenOutOfRange {
				at: file_offset,
				len: head.len,
				rem,
			})?;
		let payload = cursor.read_exact(len)?;

		self.offset += cursor.pos();
		Ok(Block { head, payload, file_offset })
	}
}

impl<'a> Iterator for BlockIter<'a> {
	type Item = Result<Block<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		let block = self.read_block();
		self.finished = match &block {
			Ok(block) => block.head.is_endb() || self.offset >= self.bytes.len(),
			Err(_) => true,
		};
		Some(block)
	}
}

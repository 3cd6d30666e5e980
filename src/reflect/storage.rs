use crate::reflect::bytes::Cursor;
use crate::reflect::{HandleFault, Result, WalkError};

/// Size in bytes of a string, text, or sequence slot.
pub const SLOT_SIZE: usize = 16;

/// Location of one value: allocation base address plus byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueHandle {
	/// Start address of the containing allocation.
	pub base: u64,
	/// Byte offset from `base`.
	pub offset: usize,
}

impl ValueHandle {
	/// Create a handle from base and offset.
	pub fn new(base: u64, offset: usize) -> Self {
		Self { base, offset }
	}

	/// Absolute address addressed by the handle.
	pub fn addr(self) -> u64 {
		self.base.wrapping_add(self.offset as u64)
	}

	/// Handle `delta` bytes further into the same allocation.
	pub fn at(self, delta: usize) -> Self {
		Self {
			base: self.base,
			offset: self.offset.saturating_add(delta),
		}
	}
}

/// Memory the visitor reads values from.
///
/// Implementations resolve stored addresses to handles and hand out bounded byte views. Any read that
/// cannot be served must fail with [`WalkError::InvalidHandle`].
pub trait Storage {
	/// Borrow `len` bytes starting at `handle`.
	fn read(&self, handle: ValueHandle, len: usize) -> Result<&[u8]>;

	/// Map an absolute address to a handle inside its allocation.
	fn resolve(&self, addr: u64) -> Result<ValueHandle>;

	/// Look up an interned name by index.
	fn name(&self, index: u32) -> Option<&str>;
}

/// Pointer/length pair backing strings, texts, and sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slot {
	/// Address of the first data byte or element, 0 when empty.
	pub data: u64,
	/// Byte length (strings) or element count (sequences).
	pub len: u64,
}

impl Slot {
	/// Read a slot stored at `handle`.
	pub fn read<S: Storage + ?Sized>(storage: &S, handle: ValueHandle) -> Result<Self> {
		let mut cursor = Cursor::new(storage.read(handle, SLOT_SIZE)?);
		let data = cursor.read_u64_le()?;
		let len = cursor.read_u64_le()?;
		Ok(Self { data, len })
	}

	/// Encode the slot in storage byte order.
	pub fn encode(self) -> [u8; SLOT_SIZE] {
		let mut out = [0_u8; SLOT_SIZE];
		out[..8].copy_from_slice(&self.data.to_le_bytes());
		out[8..].copy_from_slice(&self.len.to_le_bytes());
		out
	}
}

/// Element handles of one sequence value.
#[derive(Debug, Clone, Copy)]
pub struct SequenceView {
	first: Option<ValueHandle>,
	count: usize,
	stride: usize,
}

impl SequenceView {
	/// Read the sequence slot at `handle` and validate its element run.
	pub fn open<S: Storage + ?Sized>(storage: &S, handle: ValueHandle, stride: usize, max: usize) -> Result<Self> {
		let slot = Slot::read(storage, handle)?;
		let count = usize::try_from(slot.len).map_err(|_| WalkError::SequenceTooLarge { count: slot.len, max })?;
		if count > max {
			return Err(WalkError::SequenceTooLarge { count: slot.len, max });
		}
		if count == 0 {
			return Ok(Self { first: None, count, stride });
		}

		// Zero-sized elements occupy no storage, so there is nothing to resolve.
		if stride == 0 {
			return Ok(Self {
				first: Some(ValueHandle::new(slot.data, 0)),
				count,
				stride,
			});
		}

		let first = storage.resolve(slot.data)?;
		let total = stride.checked_mul(count).ok_or(WalkError::SequenceTooLarge { count: slot.len, max })?;
		storage.read(first, total)?;

		Ok(Self {
			first: Some(first),
			count,
			stride,
		})
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.count
	}

	/// Return whether the sequence is empty.
	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	/// Handle of element `index`, if in range.
	pub fn element(&self, index: usize) -> Option<ValueHandle> {
		if index >= self.count {
			return None;
		}
		self.first.map(|first| first.at(index * self.stride))
	}

	/// Iterate element handles in index order.
	pub fn handles(&self) -> impl Iterator<Item = ValueHandle> + '_ {
		(0..self.count).filter_map(|index| self.element(index))
	}
}

/// Read a string or text slot and decode its UTF-8 payload lossily.
pub fn read_slot_string<S: Storage + ?Sized>(storage: &S, handle: ValueHandle) -> Result<Box<str>> {
	let slot = Slot::read(storage, handle)?;
	if slot.len == 0 {
		return Ok(Box::from(""));
	}

	let len = usize::try_from(slot.len).map_err(|_| WalkError::InvalidHandle {
		addr: slot.data,
		fault: HandleFault::OutOfBounds { need: usize::MAX, have: 0 },
	})?;
	let data = storage.resolve(slot.data)?;
	let bytes = storage.read(data, len)?;
	Ok(String::from_utf8_lossy(bytes).into_owned().into_boxed_str())
}

/// Read a name table index and look the name up.
pub fn read_name<S: Storage + ?Sized>(storage: &S, handle: ValueHandle) -> Result<Box<str>> {
	let index = Cursor::new(storage.read(handle, 4)?).read_u32_le()?;
	storage.name(index).map(Box::from).ok_or(WalkError::InvalidHandle {
		addr: handle.addr(),
		fault: HandleFault::UnknownName { index },
	})
}

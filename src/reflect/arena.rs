use crate::reflect::storage::Slot;
use crate::reflect::{HandleFault, Result, Storage, ValueHandle, WalkError};

const BASE_ADDR: u64 = 0x1000;
const ALLOC_ALIGN: u64 = 16;

/// One contiguous allocation owned by an [`Arena`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
	/// Start address.
	pub addr: u64,
	/// Allocation contents.
	pub bytes: Vec<u8>,
	/// False once the allocation has been freed.
	pub live: bool,
}

impl Allocation {
	/// Exclusive end address.
	pub fn end(&self) -> u64 {
		self.addr.saturating_add(self.bytes.len() as u64)
	}
}

/// In-memory address space with an interned name table.
///
/// Freed allocations keep their address range so stale handles report [`HandleFault::Freed`].
#[derive(Debug, Clone)]
pub struct Arena {
	starts: Vec<u64>,
	allocs: Vec<Allocation>,
	names: Vec<Box<str>>,
	next_addr: u64,
}

impl Default for Arena {
	fn default() -> Self {
		Self::new()
	}
}

impl Arena {
	/// Create an empty arena.
	pub fn new() -> Self {
		Self {
			starts: Vec::new(),
			allocs: Vec::new(),
			names: Vec::new(),
			next_addr: BASE_ADDR,
		}
	}

	/// Rebuild an arena from existing allocations and names.
	pub fn from_parts(mut allocs: Vec<Allocation>, names: Vec<Box<str>>) -> Result<Self> {
		allocs.sort_by_key(|alloc| alloc.addr);

		let mut prev_end = 0_u64;
		for alloc in &allocs {
			if alloc.addr == 0 {
				return Err(WalkError::InvalidHandle {
					addr: 0,
					fault: HandleFault::Null,
				});
			}
			if alloc.addr < prev_end {
				return Err(WalkError::OverlappingAllocation { addr: alloc.addr });
			}
			prev_end = alloc
				.addr
				.checked_add(alloc.bytes.len() as u64)
				.filter(|end| next_free(*end).is_some())
				.ok_or(WalkError::AllocationOutOfRange {
					addr: alloc.addr,
					len: alloc.bytes.len(),
				})?;
		}

		let starts = allocs.iter().map(|alloc| alloc.addr).collect();
		let next_addr = next_free(prev_end).map_or(BASE_ADDR, |addr| addr.max(BASE_ADDR));
		Ok(Self {
			starts,
			allocs,
			names,
			next_addr,
		})
	}

	/// Copy `bytes` into a fresh allocation and return its address.
	///
	/// Empty payloads are not allocated and yield the null address.
	pub fn alloc(&mut self, bytes: Vec<u8>) -> u64 {
		if bytes.is_empty() {
			return 0;
		}

		let addr = self.next_addr;
		self.next_addr = addr
			.checked_add(bytes.len() as u64)
			.and_then(next_free)
			.unwrap_or(u64::MAX);
		self.starts.push(addr);
		self.allocs.push(Allocation { addr, bytes, live: true });
		addr
	}

	/// Allocate `len` zero bytes.
	pub fn alloc_zeroed(&mut self, len: usize) -> u64 {
		self.alloc(vec![0; len])
	}

	/// Allocate UTF-8 text and return the slot describing it.
	pub fn alloc_str(&mut self, text: &str) -> Slot {
		Slot {
			data: self.alloc(text.as_bytes().to_vec()),
			len: text.len() as u64,
		}
	}

	/// Allocate packed sequence elements and return the slot describing them.
	pub fn alloc_seq(&mut self, elements: Vec<u8>, count: u64) -> Slot {
		Slot {
			data: self.alloc(elements),
			len: count,
		}
	}

	/// Overwrite bytes at `addr` inside a live allocation.
	pub fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<()> {
		let handle = self.resolve(addr)?;
		let idx = self.index_of(handle.base).ok_or(WalkError::InvalidHandle {
			addr,
			fault: HandleFault::Unmapped,
		})?;

		let alloc = &mut self.allocs[idx];
		let have = alloc.bytes.len() - handle.offset;
		if bytes.len() > have {
			return Err(WalkError::InvalidHandle {
				addr,
				fault: HandleFault::OutOfBounds { need: bytes.len(), have },
			});
		}
		alloc.bytes[handle.offset..handle.offset + bytes.len()].copy_from_slice(bytes);
		Ok(())
	}

	/// Free the allocation starting at `addr`; returns false if none is live there.
	pub fn free(&mut self, addr: u64) -> bool {
		match self.index_of(addr) {
			Some(idx) if self.allocs[idx].live => {
				self.allocs[idx].live = false;
				true
			}
			_ => false,
		}
	}

	/// Intern a name and return its table index.
	pub fn intern(&mut self, name: &str) -> u32 {
		if let Some(idx) = self.names.iter().position(|item| item.as_ref() == name) {
			return idx as u32;
		}
		self.names.push(Box::from(name));
		(self.names.len() - 1) as u32
	}

	/// Return all allocations sorted by address.
	pub fn allocations(&self) -> &[Allocation] {
		&self.allocs
	}

	/// Return the interned name table.
	pub fn names(&self) -> &[Box<str>] {
		&self.names
	}

	fn index_of(&self, base: u64) -> Option<usize> {
		self.starts.binary_search(&base).ok()
	}
}

impl Storage for Arena {
	fn read(&self, handle: ValueHandle, len: usize) -> Result<&[u8]> {
		let addr = handle.addr();
		let Some(idx) = self.index_of(handle.base) else {
			return Err(WalkError::InvalidHandle {
				addr,
				fault: HandleFault::Unmapped,
			});
		};

		let alloc = &self.allocs[idx];
		if !alloc.live {
			return Err(WalkError::InvalidHandle {
				addr,
				fault: HandleFault::Freed,
			});
		}

		let have = alloc.bytes.len().saturating_sub(handle.offset);
		if len > have {
			return Err(WalkError::InvalidHandle {
				addr,
				fault: HandleFault::OutOfBounds { need: len, have },
			});
		}
		Ok(&alloc.bytes[handle.offset..handle.offset + len])
	}

	fn resolve(&self, addr: u64) -> Result<ValueHandle> {
		if addr == 0 {
			return Err(WalkError::InvalidHandle {
				addr,
				fault: HandleFault::Null,
			});
		}

		let idx = self.starts.partition_point(|start| *start <= addr);
		let unmapped = WalkError::InvalidHandle {
			addr,
			fault: HandleFault::Unmapped,
		};
		if idx == 0 {
			return Err(unmapped);
		}

		let alloc = &self.allocs[idx - 1];
		if addr >= alloc.end() {
			return Err(unmapped);
		}
		if !alloc.live {
			return Err(WalkError::InvalidHandle {
				addr,
				fault: HandleFault::Freed,
			});
		}

		Ok(ValueHandle::new(alloc.addr, (addr - alloc.addr) as usize))
	}

	fn name(&self, index: u32) -> Option<&str> {
		self.names.get(index as usize).map(AsRef::as_ref)
	}
}

/// First aligned address after `end` that leaves a gap, if the address space has one.
fn next_free(end: u64) -> Option<u64> {
	end.checked_add(ALLOC_ALIGN)?.checked_next_multiple_of(ALLOC_ALIGN)
}

#[cfg(test)]
mod tests;

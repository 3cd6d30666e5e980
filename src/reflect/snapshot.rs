use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::reflect::bytes::Cursor;
use crate::reflect::compression::decode_bytes;
use crate::reflect::{
	AnyRecord, Allocation, Arena, Block, BlockIter, Catalog, CatalogSpec, Compression, Result, SnapshotHeader, WalkError,
};

/// Catalog block code.
pub const CODE_CATALOG: [u8; 4] = *b"CATL";
/// Name table block code.
pub const CODE_NAMES: [u8; 4] = *b"NAME";
/// Allocation block code.
pub const CODE_DATA: [u8; 4] = *b"DATA";
/// Root record block code.
pub const CODE_ROOT: [u8; 4] = *b"ROOT";
/// Terminating block code.
pub const CODE_END: [u8; 4] = *b"ENDB";

/// Captured catalog, address space, and named root instances.
pub struct Snapshot {
	/// Parsed file header.
	pub header: SnapshotHeader,
	/// Compression the file was stored with.
	pub compression: Compression,
	bytes: Vec<u8>,
	blocks_offset: usize,
}

/// Named root instance recorded in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRecord {
	/// User-facing label.
	pub label: Box<str>,
	/// Layout name of the instance.
	pub layout: Box<str>,
	/// Instance address.
	pub addr: u64,
}

impl RootRecord {
	/// Bind the root to a layout of `catalog`.
	pub fn bind(&self, catalog: &Catalog) -> Result<AnyRecord> {
		let (layout, _) = catalog.layout_by_name(&self.layout).ok_or_else(|| WalkError::LayoutNotFound {
			name: self.layout.to_string(),
		})?;
		Ok(AnyRecord { layout, addr: self.addr })
	}
}

/// Block-level counters for one snapshot.
pub struct BlockStats {
	/// Total number of blocks including `ENDB`.
	pub block_count: u32,
	/// Whether a `CATL` block is present.
	pub has_catalog: bool,
	/// Whether the stream ends with `ENDB`.
	pub has_endb: bool,
	/// Sum of `DATA` payload lengths.
	pub data_bytes: u64,
	/// Number of `DATA` blocks flagged as freed.
	pub freed_blocks: u32,
	/// Code of the last block read.
	pub last_code: [u8; 4],
	/// Per-code block counts.
	pub codes: HashMap<[u8; 4], u32>,
}

impl Snapshot {
	/// Read and decode a snapshot file.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::from_bytes(fs::read(path)?)
	}

	/// Decode a snapshot from raw, possibly compressed, bytes.
	pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
		let (compression, bytes) = decode_bytes(raw)?;
		let header = SnapshotHeader::parse(&bytes)?;

		Ok(Self {
			header,
			compression,
			blocks_offset: header.header_size,
			bytes,
		})
	}

	/// Return decoded snapshot bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Iterate blocks in file order.
	pub fn blocks(&self) -> BlockIter<'_> {
		BlockIter::new(&self.bytes, self.blocks_offset)
	}

	/// Count blocks by code.
	pub fn scan_block_stats(&self) -> Result<BlockStats> {
		let mut stats = BlockStats {
			block_count: 0,
			has_catalog: false,
			has_endb: false,
			data_bytes: 0,
			freed_blocks: 0,
			last_code: [0_u8; 4],
			codes: HashMap::new(),
		};

		for block in self.blocks() {
			let block = block?;
			stats.block_count += 1;
			stats.last_code = block.head.code;
			*stats.codes.entry(block.head.code).or_insert(0) += 1;
			match block.head.code {
				CODE_CATALOG => stats.has_catalog = true,
				CODE_DATA => {
					stats.data_bytes += block.head.len;
					if block.head.is_freed() {
						stats.freed_blocks += 1;
					}
				}
				_ => {}
			}
			if block.head.is_endb() {
				stats.has_endb = true;
			}
		}

		Ok(stats)
	}

	/// Return the first block carrying `code`.
	pub fn find_first_block_by_code(&self, code: [u8; 4]) -> Result<Option<Block<'_>>> {
		for block in self.blocks() {
			let block = block?;
			if block.head.code == code {
				return Ok(Some(block));
			}
		}
		Ok(None)
	}

	/// Parse the embedded catalog description.
	pub fn catalog_spec(&self) -> Result<CatalogSpec> {
		let block = self.find_first_block_by_code(CODE_CATALOG)?.ok_or(WalkError::CatalogNotFound)?;
		Ok(serde_json::from_slice(block.payload)?)
	}

	/// Build the embedded catalog.
	pub fn catalog(&self) -> Result<Catalog> {
		Catalog::build(&self.catalog_spec()?)
	}

	/// Rebuild the captured address space.
	pub fn arena(&self) -> Result<Arena> {
		let mut allocs = Vec::new();
		let mut names = Vec::new();

		for block in self.blocks() {
			let block = block?;
			match block.head.code {
				CODE_DATA if block.head.addr != 0 && !block.payload.is_empty() => allocs.push(Allocation {
					addr: block.head.addr,
					bytes: block.payload.to_vec(),
					live: !block.head.is_freed(),
				}),
				CODE_NAMES => names = parse_names(block.payload)?,
				_ => {}
			}
		}

		log::debug!("snapshot arena: {} allocations, {} names", allocs.len(), names.len());
		Arena::from_parts(allocs, names)
	}

	/// Return all root records in file order.
	pub fn roots(&self) -> Result<Vec<RootRecord>> {
		let mut out = Vec::new();
		for block in self.blocks() {
			let block = block?;
			if block.head.code != CODE_ROOT {
				continue;
			}

			let mut cursor = Cursor::new(block.payload);
			let malformed = |_: WalkError| WalkError::MalformedRoot { at: block.file_offset };
			let label = cursor.read_cstring_bytes().map_err(malformed)?;
			let layout = cursor.read_cstring_bytes().map_err(malformed)?;
			out.push(RootRecord {
				label: String::from_utf8_lossy(label).into_owned().into_boxed_str(),
				layout: String::from_utf8_lossy(layout).into_owned().into_boxed_str(),
				addr: block.head.addr,
			});
		}
		Ok(out)
	}

	/// Find a root record by label.
	pub fn root_by_label(&self, label: &str) -> Result<RootRecord> {
		self.roots()?
			.into_iter()
			.find(|root| root.label.as_ref() == label)
			.ok_or_else(|| WalkError::RootNotFound { label: label.to_owned() })
	}
}

fn parse_names(payload: &[u8]) -> Result<Vec<Box<str>>> {
	let mut cursor = Cursor::new(payload);
	let count = cursor.read_u32_le()? as usize;
	let mut names = Vec::with_capacity(count.min(payload.len()));
	for _ in 0..count {
		let raw = cursor.read_cstring_bytes()?;
		names.push(String::from_utf8_lossy(raw).into_owned().into_boxed_str());
	}
	Ok(names)
}

#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;

use crate::reflect::bhead::BLOCK_FLAG_FREED;
use crate::reflect::compression::encode_bytes;
use crate::reflect::snapshot::{CODE_CATALOG, CODE_DATA, CODE_END, CODE_NAMES, CODE_ROOT};
use crate::reflect::{Arena, BHead, CatalogSpec, Compression, Result, RootRecord, SnapshotHeader};

/// Serializes a catalog, an arena, and root records into a snapshot.
pub struct SnapshotWriter<'a> {
	catalog: &'a CatalogSpec,
	arena: &'a Arena,
	roots: Vec<RootRecord>,
}

impl<'a> SnapshotWriter<'a> {
	/// Start a snapshot of `arena` described by `catalog`.
	pub fn new(catalog: &'a CatalogSpec, arena: &'a Arena) -> Self {
		Self {
			catalog,
			arena,
			roots: Vec::new(),
		}
	}

	/// Record a named root instance.
	pub fn root(mut self, label: &str, layout: &str, addr: u64) -> Self {
		self.roots.push(RootRecord {
			label: label.into(),
			layout: layout.into(),
			addr,
		});
		self
	}

	/// Encode the snapshot.
	pub fn to_bytes(&self, compression: Compression) -> Result<Vec<u8>> {
		let mut out = SnapshotHeader::encode();

		push_block(&mut out, CODE_CATALOG, 0, 0, self.catalog.to_json()?.as_bytes());

		let mut names = Vec::new();
		names.extend_from_slice(&(self.arena.names().len() as u32).to_le_bytes());
		for name in self.arena.names() {
			names.extend_from_slice(name.as_bytes());
			names.push(0);
		}
		push_block(&mut out, CODE_NAMES, 0, 0, &names);

		for alloc in self.arena.allocations() {
			let flags = if alloc.live { 0 } else { BLOCK_FLAG_FREED };
			push_block(&mut out, CODE_DATA, flags, alloc.addr, &alloc.bytes);
		}

		for root in &self.roots {
			let mut payload = Vec::with_capacity(root.label.len() + root.layout.len() + 2);
			payload.extend_from_slice(root.label.as_bytes());
			payload.push(0);
			payload.extend_from_slice(root.layout.as_bytes());
			payload.push(0);
			push_block(&mut out, CODE_ROOT, 0, root.addr, &payload);
		}

		push_block(&mut out, CODE_END, 0, 0, &[]);
		encode_bytes(out, compression)
	}

	/// Encode the snapshot and write it to `path`.
	pub fn write(&self, path: impl AsRef<Path>, compression: Compression) -> Result<()> {
		fs::write(path, self.to_bytes(compression)?)?;
		Ok(())
	}
}

fn push_block(out: &mut Vec<u8>, code: [u8; 4], flags: u32, addr: u64, payload: &[u8]) {
	BHead {
		code,
		flags,
		addr,
		len: payload.len() as u64,
	}
	.encode_into(out);
	out.extend_from_slice(payload);
}

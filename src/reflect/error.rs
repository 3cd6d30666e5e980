use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, WalkError>;

/// Errors produced while building catalogs, resolving storage, visiting values, and reading snapshots.
#[derive(Debug, Error)]
pub enum WalkError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Catalog JSON could not be parsed or serialized.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// A handle no longer addresses valid storage.
	#[error("invalid handle 0x{addr:016x}: {fault}")]
	InvalidHandle {
		/// Address the handle pointed at.
		addr: u64,
		/// Why the storage could not be read.
		fault: HandleFault,
	},
	/// Record or sequence nesting exceeded the configured limit.
	#[error("visit depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Sequence element count exceeded the configured limit.
	#[error("sequence too large: count={count}, max={max}")]
	SequenceTooLarge {
		/// Element count stored in the sequence slot.
		count: u64,
		/// Maximum permitted element count.
		max: usize,
	},
	/// Layout id is not present in the catalog handed to the visitor.
	#[error("layout id {id} not found in catalog")]
	UnknownLayout {
		/// Offending layout index.
		id: u32,
	},
	/// Requested layout name was not found.
	#[error("layout not found: {name}")]
	LayoutNotFound {
		/// Requested layout name.
		name: String,
	},
	/// Two catalog entries share one name.
	#[error("duplicate layout {name}")]
	DuplicateLayout {
		/// Layout name declared twice.
		name: String,
	},
	/// A layout contains itself inline and therefore has no finite size.
	#[error("cyclic layout {name}: contains itself inline")]
	CyclicLayout {
		/// Layout participating in the cycle.
		name: String,
	},
	/// Explicit layout size is smaller than its fields.
	#[error("layout {layout} overflows: field {field} ends at {end}, size is {size}")]
	LayoutOverflow {
		/// Layout name.
		layout: String,
		/// Field that overruns the layout.
		field: String,
		/// End offset of the field storage.
		end: usize,
		/// Declared layout size.
		size: usize,
	},
	/// Field type expression could not be parsed.
	#[error("invalid type expression {expr:?} on {layout}.{field}")]
	InvalidTypeExpr {
		/// Layout name.
		layout: String,
		/// Field name.
		field: String,
		/// Original type expression.
		expr: String,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Unknown leading file magic.
	#[error("unsupported compression or not a snapshot (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompressed stream did not start with the snapshot magic.
	#[error("decompressed data does not start with LAYWALK magic")]
	NotSnapshotAfterDecompress,
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Invalid or malformed file header.
	#[error("invalid header")]
	InvalidHeader,
	/// Endianness marker is not little-endian.
	#[error("unsupported endianness (expected little-endian 'v')")]
	BigEndianUnsupported,
	/// Unsupported container format version.
	#[error("unsupported snapshot format version {version} (expected 1)")]
	UnsupportedFormatVersion {
		/// Parsed format version.
		version: u16,
	},
	/// Block payload length was negative.
	#[error("negative block length {len}")]
	NegativeBlockLength {
		/// Parsed signed length.
		len: i64,
	},
	/// Block payload would exceed remaining file data.
	#[error("block length {len} at offset {at} exceeds remaining {rem}")]
	BlockLenOutOfRange {
		/// Block header file offset.
		at: usize,
		/// Declared payload length.
		len: u64,
		/// Remaining bytes in cursor.
		rem: usize,
	},
	/// No CATL block was found.
	#[error("CATL block not found")]
	CatalogNotFound,
	/// Two allocations claim overlapping address ranges.
	#[error("allocation at 0x{addr:016x} overlaps previous allocation")]
	OverlappingAllocation {
		/// Start address of the overlapping allocation.
		addr: u64,
	},
	/// Allocation range runs into the top of the address space.
	#[error("allocation at 0x{addr:016x} with {len} bytes exceeds the address space")]
	AllocationOutOfRange {
		/// Start address of the allocation.
		addr: u64,
		/// Allocation length in bytes.
		len: usize,
	},
	/// Requested root label was not found.
	#[error("root not found: {label}")]
	RootNotFound {
		/// Requested root label.
		label: String,
	},
	/// Snapshot has no root records to default to.
	#[error("snapshot has no ROOT blocks")]
	NoRoots,
	/// ROOT block payload was malformed.
	#[error("malformed ROOT block at offset {at}")]
	MalformedRoot {
		/// File offset of the block header.
		at: usize,
	},
	/// CLI address argument was invalid.
	#[error("invalid address literal: {value}")]
	InvalidAddressLiteral {
		/// User-provided literal.
		value: String,
	},
	/// CLI root selection was ambiguous or incomplete.
	#[error("invalid root selector: {reason}")]
	InvalidRootSelector {
		/// Human-readable reason.
		reason: &'static str,
	},
}

/// Reason a handle could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleFault {
	/// Address was zero where data was required.
	#[error("null address")]
	Null,
	/// Address is not inside any allocation.
	#[error("unmapped address")]
	Unmapped,
	/// Address belongs to an allocation that was freed.
	#[error("storage was freed")]
	Freed,
	/// Read would run past the end of the allocation.
	#[error("out of bounds: need {need} bytes, have {have}")]
	OutOfBounds {
		/// Requested bytes.
		need: usize,
		/// Bytes left in the allocation from the handle.
		have: usize,
	},
	/// Stored name index is outside the name table.
	#[error("unknown name index {index}")]
	UnknownName {
		/// Stored name index.
		index: u32,
	},
}

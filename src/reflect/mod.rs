mod arena;
mod bhead;
mod block;
mod bytes;
mod catalog;
mod compression;
mod error;
mod header;
mod kind;
mod snapshot;
mod storage;
mod value;
mod visit;
mod writer;

/// In-memory address space and its allocations.
pub use arena::{Allocation, Arena};
/// Parsed block header record and flag bits.
pub use bhead::{BHead, BLOCK_FLAG_FREED};
/// Block container and iterator types.
pub use block::{Block, BlockIter};
/// Layout catalog, its description, and descriptors.
pub use catalog::{Catalog, CatalogSpec, FieldDescriptor, FieldSpec, LayoutId, LayoutSpec, RecordLayout};
/// Compression detection result.
pub use compression::Compression;
/// Error and result aliases.
pub use error::{HandleFault, Result, WalkError};
/// Snapshot header representation.
pub use header::SnapshotHeader;
/// Field kind tags.
pub use kind::Kind;
/// Snapshot reader and block statistics.
pub use snapshot::{BlockStats, RootRecord, Snapshot};
/// Storage access seam, handles, and slot helpers.
pub use storage::{SLOT_SIZE, SequenceView, Slot, Storage, ValueHandle};
/// Materialized value types.
pub use value::{FieldValue, RecordValue, Value};
/// Value visitor entry points and options.
pub use visit::{AnyRecord, UnsupportedPolicy, VisitOptions, visit_any, visit_field, visit_record, visit_value};
/// Snapshot serializer.
pub use writer::SnapshotWriter;

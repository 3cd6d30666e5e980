//! Public library API for walking self-describing record values through an explicit layout catalog.

/// Layout catalog, storage resolution, value visitor, and snapshot container.
pub mod reflect;

use crate::reflect::{
	Arena, BHead, CatalogSpec, Compression, HandleFault, LayoutSpec, Snapshot, SnapshotHeader, SnapshotWriter, Storage,
	VisitOptions, WalkError, visit_any,
};

use super::{CODE_CATALOG, CODE_DATA, CODE_END, CODE_NAMES, CODE_ROOT};

fn scene() -> (CatalogSpec, Arena, u64, u64) {
	let spec = CatalogSpec::new()
		.layout(LayoutSpec::new("Point").field("x", "f32").field("y", "f32"))
		.layout(LayoutSpec::new("Tagged").field("id", "name").field("at", "Point"));

	let mut arena = Arena::new();
	let id = arena.intern("spawn");
	let mut bytes = id.to_le_bytes().to_vec();
	bytes.extend_from_slice(&1.5_f32.to_le_bytes());
	bytes.extend_from_slice(&(-2.0_f32).to_le_bytes());
	let live = arena.alloc(bytes);
	let freed = arena.alloc_zeroed(12);
	arena.free(freed);
	(spec, arena, live, freed)
}

fn encode(compression: Compression) -> Vec<u8> {
	let (spec, arena, live, freed) = scene();
	SnapshotWriter::new(&spec, &arena)
		.root("spawn", "Tagged", live)
		.root("stale", "Tagged", freed)
		.to_bytes(compression)
		.expect("snapshot encodes")
}

#[test]
fn plain_snapshot_round_trips() {
	let snapshot = Snapshot::from_bytes(encode(Compression::None)).expect("snapshot decodes");
	assert_eq!(snapshot.compression, Compression::None);
	assert_eq!(snapshot.header.format_version, SnapshotHeader::FORMAT_VERSION);

	let (spec, arena, live, freed) = scene();
	assert_eq!(snapshot.catalog_spec().expect("catalog spec"), spec);

	let restored = snapshot.arena().expect("arena rebuilds");
	assert_eq!(restored.allocations(), arena.allocations());
	assert_eq!(restored.name(0), Some("spawn"));
	assert!(matches!(
		restored.resolve(freed),
		Err(WalkError::InvalidHandle {
			fault: HandleFault::Freed,
			..
		})
	));

	let roots = snapshot.roots().expect("roots parse");
	assert_eq!(roots.len(), 2);
	assert_eq!(roots[0].label.as_ref(), "spawn");
	assert_eq!(roots[0].layout.as_ref(), "Tagged");
	assert_eq!(roots[0].addr, live);
}

#[test]
fn zstd_snapshot_decodes_to_same_values() {
	let plain = Snapshot::from_bytes(encode(Compression::None)).expect("plain decodes");
	let packed = Snapshot::from_bytes(encode(Compression::Zstd)).expect("zstd decodes");
	assert_eq!(packed.compression, Compression::Zstd);
	assert_eq!(packed.bytes(), plain.bytes());
}

#[test]
fn bound_root_visits_through_rebuilt_arena() {
	let snapshot = Snapshot::from_bytes(encode(Compression::Zstd)).expect("snapshot decodes");
	let catalog = snapshot.catalog().expect("catalog builds");
	let arena = snapshot.arena().expect("arena rebuilds");

	let root = snapshot.root_by_label("spawn").expect("root exists");
	let any = root.bind(&catalog).expect("root binds");
	let value = visit_any(&catalog, &arena, any, &VisitOptions::default()).expect("root visits");
	let json = serde_json::to_value(&value).expect("serializes");
	assert_eq!(json["id"]["name"], "spawn");
	assert_eq!(json["at"]["x"], 1.5);
	assert_eq!(json["at"]["y"], -2.0);

	let stale = snapshot.root_by_label("stale").expect("root exists");
	let err = visit_any(&catalog, &arena, stale.bind(&catalog).expect("root binds"), &VisitOptions::default())
		.expect_err("freed root fails");
	assert!(matches!(
		err,
		WalkError::InvalidHandle {
			fault: HandleFault::Freed,
			..
		}
	));
}

#[test]
fn block_stats_count_codes() {
	let snapshot = Snapshot::from_bytes(encode(Compression::None)).expect("snapshot decodes");
	let stats = snapshot.scan_block_stats().expect("stats scan");

	assert_eq!(stats.block_count, 7);
	assert!(stats.has_catalog);
	assert!(stats.has_endb);
	assert_eq!(stats.last_code, CODE_END);
	assert_eq!(stats.data_bytes, 24);
	assert_eq!(stats.freed_blocks, 1);
	assert_eq!(stats.codes.get(&CODE_DATA), Some(&2));
	assert_eq!(stats.codes.get(&CODE_ROOT), Some(&2));
	assert_eq!(stats.codes.get(&CODE_NAMES), Some(&1));
}

#[test]
fn unknown_root_label_and_layout_are_reported() {
	let snapshot = Snapshot::from_bytes(encode(Compression::None)).expect("snapshot decodes");
	let catalog = snapshot.catalog().expect("catalog builds");

	let err = snapshot.root_by_label("missing").expect_err("no such root");
	assert!(matches!(err, WalkError::RootNotFound { ref label } if label == "missing"));

	let mut root = snapshot.root_by_label("spawn").expect("root exists");
	root.layout = "Ghost".into();
	let err = root.bind(&catalog).expect_err("no such layout");
	assert!(matches!(err, WalkError::LayoutNotFound { ref name } if name == "Ghost"));
}

#[test]
fn unknown_magic_is_rejected() {
	let err = Snapshot::from_bytes(b"NOTASNAPSHOT".to_vec()).err().expect("magic rejected");
	assert!(matches!(err, WalkError::UnknownMagic { magic } if &magic == b"NOTA"));
}

#[test]
fn missing_catalog_is_reported() {
	let mut bytes = SnapshotHeader::encode();
	BHead {
		code: CODE_END,
		flags: 0,
		addr: 0,
		len: 0,
	}
	.encode_into(&mut bytes);

	let snapshot = Snapshot::from_bytes(bytes).expect("snapshot decodes");
	assert!(matches!(snapshot.catalog(), Err(WalkError::CatalogNotFound)));
	assert!(snapshot.roots().expect("roots parse").is_empty());
}

#[test]
fn truncated_block_is_reported() {
	let mut bytes = SnapshotHeader::encode();
	BHead {
		code: CODE_CATALOG,
		flags: 0,
		addr: 0,
		len: 64,
	}
	.encode_into(&mut bytes);
	bytes.extend_from_slice(b"{}");

	let snapshot = Snapshot::from_bytes(bytes).expect("header decodes");
	let err = snapshot.scan_block_stats().err().expect("truncation detected");
	assert!(matches!(err, WalkError::BlockLenOutOfRange { len: 64, rem: 2, .. }));
}

#[test]
fn allocation_at_top_of_address_space_is_rejected() {
	let mut bytes = SnapshotHeader::encode();
	let mut push = |code: [u8; 4], addr: u64, payload: &[u8]| {
		BHead {
			code,
			flags: 0,
			addr,
			len: payload.len() as u64,
		}
		.encode_into(&mut bytes);
		bytes.extend_from_slice(payload);
	};
	push(CODE_CATALOG, 0, b"{}");
	push(CODE_DATA, u64::MAX - 8, &[1, 2, 3, 4]);
	push(CODE_END, 0, &[]);

	let snapshot = Snapshot::from_bytes(bytes).expect("snapshot decodes");
	let err = snapshot.arena().expect_err("wrapping allocation rejected");
	assert!(matches!(err, WalkError::AllocationOutOfRange { addr, len: 4 } if addr == u64::MAX - 8));
}

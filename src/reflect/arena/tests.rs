use crate::reflect::{Allocation, Arena, HandleFault, Storage, ValueHandle, WalkError};

fn fault_of(err: WalkError) -> HandleFault {
	match err {
		WalkError::InvalidHandle { fault, .. } => fault,
		other => panic!("expected invalid handle, got {other}"),
	}
}

#[test]
fn interior_address_resolves_to_base_and_offset() {
	let mut arena = Arena::new();
	let addr = arena.alloc(vec![1, 2, 3, 4, 5, 6, 7, 8]);

	let handle = arena.resolve(addr + 5).expect("interior address resolves");
	assert_eq!(handle, ValueHandle::new(addr, 5));
	assert_eq!(arena.read(handle, 3).expect("tail readable"), &[6, 7, 8]);
}

#[test]
fn allocations_do_not_touch() {
	let mut arena = Arena::new();
	let first = arena.alloc_zeroed(24);
	let second = arena.alloc_zeroed(8);

	assert!(second >= first + 24 + 16);
	assert_eq!(second % 16, 0);
	assert_eq!(fault_of(arena.resolve(first + 24).expect_err("gap is unmapped")), HandleFault::Unmapped);
}

#[test]
fn null_and_unmapped_addresses_fail() {
	let mut arena = Arena::new();
	arena.alloc_zeroed(4);

	assert_eq!(fault_of(arena.resolve(0).expect_err("null fails")), HandleFault::Null);
	assert_eq!(fault_of(arena.resolve(0x10).expect_err("low address fails")), HandleFault::Unmapped);
	assert_eq!(
		fault_of(arena.read(ValueHandle::new(0xdead_0000, 0), 1).expect_err("unknown base fails")),
		HandleFault::Unmapped
	);
}

#[test]
fn freed_allocation_reports_freed() {
	let mut arena = Arena::new();
	let addr = arena.alloc(vec![9; 8]);
	let handle = arena.resolve(addr).expect("live address resolves");

	assert!(arena.free(addr));
	assert!(!arena.free(addr), "double free is rejected");
	assert_eq!(fault_of(arena.read(handle, 1).expect_err("stale handle fails")), HandleFault::Freed);
	assert_eq!(fault_of(arena.resolve(addr + 2).expect_err("freed range fails")), HandleFault::Freed);
}

#[test]
fn read_past_end_is_out_of_bounds() {
	let mut arena = Arena::new();
	let addr = arena.alloc_zeroed(8);

	let err = arena.read(ValueHandle::new(addr, 6), 4).expect_err("overrun fails");
	assert_eq!(fault_of(err), HandleFault::OutOfBounds { need: 4, have: 2 });
}

#[test]
fn write_updates_live_allocation_only() {
	let mut arena = Arena::new();
	let addr = arena.alloc_zeroed(8);
	arena.write(addr + 4, &7_u32.to_le_bytes()).expect("write succeeds");
	assert_eq!(arena.read(ValueHandle::new(addr, 4), 4).expect("readable"), &7_u32.to_le_bytes());

	let err = arena.write(addr + 6, &[0; 4]).expect_err("overrun write fails");
	assert_eq!(fault_of(err), HandleFault::OutOfBounds { need: 4, have: 2 });
}

#[test]
fn empty_string_is_not_allocated() {
	let mut arena = Arena::new();
	let slot = arena.alloc_str("");
	assert_eq!(slot.data, 0);
	assert_eq!(slot.len, 0);
	assert!(arena.allocations().is_empty());
}

#[test]
fn names_are_interned_once() {
	let mut arena = Arena::new();
	let a = arena.intern("Player");
	let b = arena.intern("Enemy");
	let c = arena.intern("Player");

	assert_eq!(a, c);
	assert_ne!(a, b);
	assert_eq!(arena.name(b), Some("Enemy"));
	assert_eq!(arena.name(7), None);
}

#[test]
fn from_parts_sorts_and_rejects_overlap() {
	let allocs = vec![
		Allocation {
			addr: 0x3000,
			bytes: vec![1; 4],
			live: true,
		},
		Allocation {
			addr: 0x2000,
			bytes: vec![2; 4],
			live: false,
		},
	];
	let mut arena = Arena::from_parts(allocs, Vec::new()).expect("arena rebuilds");
	assert_eq!(arena.allocations()[0].addr, 0x2000);
	assert_eq!(fault_of(arena.resolve(0x2001).expect_err("freed part")), HandleFault::Freed);
	assert!(arena.alloc_zeroed(4) > 0x3004, "fresh allocations land after imported ones");

	let overlapping = vec![
		Allocation {
			addr: 0x2000,
			bytes: vec![0; 32],
			live: true,
		},
		Allocation {
			addr: 0x2010,
			bytes: vec![0; 4],
			live: true,
		},
	];
	let err = Arena::from_parts(overlapping, Vec::new()).expect_err("overlap rejected");
	assert!(matches!(err, WalkError::OverlappingAllocation { addr: 0x2010 }));
}

#[test]
fn from_parts_rejects_ranges_past_address_space() {
	let wrapping = vec![Allocation {
		addr: u64::MAX - 2,
		bytes: vec![0; 8],
		live: true,
	}];
	let err = Arena::from_parts(wrapping, Vec::new()).expect_err("wrapping range rejected");
	assert!(matches!(err, WalkError::AllocationOutOfRange { len: 8, .. }));

	let no_room = vec![Allocation {
		addr: u64::MAX - 8,
		bytes: vec![0; 4],
		live: true,
	}];
	let err = Arena::from_parts(no_room, Vec::new()).expect_err("no room after allocation");
	assert!(matches!(err, WalkError::AllocationOutOfRange { addr, len: 4 } if addr == u64::MAX - 8));
}

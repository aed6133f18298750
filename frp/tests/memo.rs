use std::{cell::Cell, rc::Rc};

use frp::Memo;

#[test]
fn reusing_the_same_key_skips_the_builder() {
	let memo: Memo<i32> = Memo::new();
	let builds = Rc::new(Cell::new(0));

	let build = || {
		builds.set(builds.get() + 1);
		42
	};
	assert_eq!(memo.get(7, build), 42);
	memo.reset();
	assert_eq!(memo.get(7, build), 42);
	assert_eq!(builds.get(), 1, "second call with the same key must not rebuild");
}

#[test]
fn a_different_key_rebuilds_and_discards_the_tail() {
	let memo: Memo<i32> = Memo::new();
	memo.get(1, || 10);
	memo.get(2, || 20);
	memo.get(3, || 30);
	assert_eq!(memo.len(), 3);

	memo.reset();
	memo.get(1, || 10); // same key at position 0: reused
	let value = memo.get(99, || 200); // different key at position 1: rebuilds
	assert_eq!(value, 200);
	assert_eq!(memo.len(), 2, "positions 1 and 2 from the old run are gone");
}

#[test]
fn a_fresh_incarnation_does_not_silently_resurface_the_old_tail() {
	let memo: Memo<i32> = Memo::new();
	memo.get(1, || 10);
	memo.get(2, || 20);

	memo.reset();
	memo.get(1, || 10);
	memo.reset();
	let value = memo.get(5, || 50);
	assert_eq!(value, 50);
	assert_eq!(memo.len(), 1);
}

use std::{cell::RefCell, rc::Rc};

use frp::{
	bind, blift, changes, constant, eq_by_partial_eq, hold, lift, lift2, make_cell, make_event, merge, never, notify_e, read, read_result, send,
	Channel, Failure, Outcome, Runtime,
};

mod _validator;
use _validator::Validator;

#[test]
fn lift_identity_is_a_no_op() {
	let rt = Runtime::new();
	let b = constant(&rt, 5);
	let lifted = lift(&b, |v: &i32| *v, None);
	assert_eq!(read(&lifted), read(&b));
}

#[test]
fn bind_over_a_constant_behaves_like_a_direct_call() {
	let rt = Runtime::new();
	let b = constant(&rt, 3);
	let bound = bind(&b, move |v: &i32| constant(&rt, v * 10), None);
	assert_eq!(read(&bound), 30);
}

#[test]
fn bind_return_is_a_no_op() {
	let rt = Runtime::new();
	let (cell, writer) = make_cell(&rt, 1, None);
	let bound = bind(&cell, move |v: &i32| constant(&rt, *v), None);
	assert_eq!(read(&bound), read(&cell));
	writer.set(2);
	assert_eq!(read(&bound), read(&cell));
	writer.set(3);
	assert_eq!(read(&bound), read(&cell));
}

#[test]
fn hold_of_changes_tracks_its_source() {
	let rt = Runtime::new();
	let (cell, writer) = make_cell(&rt, 0, eq_by_partial_eq());
	let echoed = hold(&rt, read(&cell), &changes(&cell));
	writer.set(1);
	assert_eq!(read(&echoed), read(&cell));
	writer.set(2);
	assert_eq!(read(&echoed), read(&cell));
}

#[test]
fn merging_with_never_is_a_no_op() {
	let rt = Runtime::new();
	let (e, sender) = make_event::<i32>(&rt);
	let dead: Channel<i32> = never(&rt);
	let merged = merge(&[dead, e]);
	let v = Rc::new(Validator::new());
	let v2 = Rc::clone(&v);
	notify_e(&merged, move |value: &i32| v2.push(*value));
	send(&sender, 1);
	send(&sender, 2);
	v.expect([1, 2]);
}

#[test]
fn merge_preserves_each_senders_delivery_order_across_the_combined_stream() {
	let rt = Runtime::new();
	let (e1, sender1) = make_event::<&'static str>(&rt);
	let (e2, sender2) = make_event::<&'static str>(&rt);
	let merged = merge(&[e1, e2]);
	let v = Rc::new(Validator::new());
	let v2 = Rc::clone(&v);
	notify_e(&merged, move |value: &&'static str| v2.push(*value));

	send(&sender1, "a");
	send(&sender2, "b");
	send(&sender1, "c");

	v.expect(["a", "b", "c"]);
}

/// A diamond dependency (`base -> left, right -> sum`) must observe
/// `left`/`right` at a single, consistent instant: no intermediate state
/// where one has updated and the other hasn't.
#[test]
fn diamond_dependency_is_glitch_free() {
	let rt = Runtime::new();
	let (base, writer) = make_cell(&rt, 1, None);
	let left = lift(&base, |v: &i32| v * 10, None);
	let right = lift(&base, |v: &i32| v * 100, None);
	let observed = Rc::new(RefCell::new(Vec::new()));
	let observed2 = Rc::clone(&observed);
	let sum = lift2(
		&left,
		&right,
		move |l: &i32, r: &i32| {
			observed2.borrow_mut().push((*l, *r));
			l + r
		},
		None,
	);
	assert_eq!(read(&sum), 110);
	writer.set(2);
	assert_eq!(read(&sum), 220);
	for (l, r) in observed.borrow().iter() {
		assert_eq!(*r, l * 10, "right must always be observed as ten times left, never a stale mix");
	}
}

#[test]
fn failures_propagate_through_lift_instead_of_panicking() {
	let rt = Runtime::new();
	let (cell, writer) = make_cell(&rt, Ok::<i32, Failure>(1), None);
	let flattened = blift(&cell, |r: &Outcome<i32>| r.clone(), None);
	let plus_one = lift(&flattened, |v: &i32| v + 1, None);
	assert_eq!(read(&plus_one), 2);
	writer.set(Err(frp::message_failure("source failed")));
	assert!(read_result(&plus_one).is_err());
}

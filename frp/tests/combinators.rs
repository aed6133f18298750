use std::rc::Rc;

use frp::{
	catch, constant, count, eq_by_partial_eq, hold, make_cell, make_event, message_failure, notify_b, notify_e, read, send, send_exn, switch_bb,
	switch_be, until, when_true, Behavior, Runtime,
};

mod _validator;
use _validator::Validator;

#[test]
fn hold_ignores_failures_and_keeps_the_last_value() {
	let rt = Runtime::new();
	let (e, sender) = make_event::<i32>(&rt);
	let held = hold(&rt, 0, &e);
	send(&sender, 1);
	assert_eq!(read(&held), 1);
	send_exn(&sender, message_failure("ignored"));
	assert_eq!(read(&held), 1);
}

#[test]
fn catch_switches_to_the_recovery_behavior_on_failure() {
	let rt = Runtime::new();
	let (cell, writer) = make_cell(&rt, 1, None);
	let recovered = catch(&cell, move |_err| constant(&rt, -1), None);
	assert_eq!(read(&recovered), 1);
	writer.set_result(Err(message_failure("boom")));
	assert_eq!(read(&recovered), -1);
}

#[test]
fn when_true_fires_only_on_the_rising_edge() {
	let rt = Runtime::new();
	let (flag, writer) = make_cell(&rt, false, eq_by_partial_eq());
	let edges = when_true(&flag);
	let v = Rc::new(Validator::new());
	let v2 = Rc::clone(&v);
	notify_e(&edges, move |()| v2.push(()));

	writer.set(true);
	writer.set(true); // elided by equality: no second edge
	writer.set(false);
	writer.set(true);

	v.expect([(), ()]);
}

#[test]
fn count_tracks_the_number_of_occurrences() {
	let rt = Runtime::new();
	let (e, sender) = make_event::<()>(&rt);
	let occurrences = count(&e);
	assert_eq!(read(&occurrences), 0);
	send(&sender, ());
	send(&sender, ());
	assert_eq!(read(&occurrences), 2);
}

#[test]
fn switch_be_tracks_the_newest_replacement() {
	let rt = Runtime::new();
	let (be, sender) = make_event::<Behavior<i32>>(&rt);
	let initial = constant(&rt, 1);
	let switched = switch_be(&initial, &be, None);
	assert_eq!(read(&switched), 1);
	send(&sender, constant(&rt, 2));
	assert_eq!(read(&switched), 2);
	send(&sender, constant(&rt, 3));
	assert_eq!(read(&switched), 3);
}

#[test]
fn switch_bb_drops_the_subscription_to_the_previous_inner_behavior() {
	let rt = Runtime::new();
	let (b1, b1_writer) = make_cell(&rt, 1, None);
	let (b2, _b2_writer) = make_cell(&rt, 100, None);
	let (bb, bb_writer) = make_cell(&rt, b1.clone(), None);
	let out = switch_bb(&bb, None);

	let v = Rc::new(Validator::new());
	let v2 = Rc::clone(&v);
	notify_b(&out, move |value: &i32| v2.push(*value));
	v.expect([1]);

	bb_writer.set(b2.clone());
	v.expect([100]);

	// b1's reader span was spliced out when `bb` switched away from it, so
	// this write must not reach `out`'s notifier at all.
	b1_writer.set(2);
	v.expect([]);
	assert_eq!(read(&out), 100);
}

#[test]
fn until_locks_after_its_first_replacement() {
	let rt = Runtime::new();
	let (be, sender) = make_event::<Behavior<i32>>(&rt);
	let initial = constant(&rt, 1);
	let switched = until(&initial, &be, None);
	send(&sender, constant(&rt, 2));
	assert_eq!(read(&switched), 2);
	send(&sender, constant(&rt, 3));
	assert_eq!(read(&switched), 2, "until must ignore every replacement after the first");
}

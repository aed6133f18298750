use std::{cell::Cell, rc::Rc};

use frp::{make_event, notify_e_cancel};

#[test]
fn cancelling_twice_is_a_no_op() {
	let rt = frp::Runtime::new();
	let (e, sender) = make_event::<i32>(&rt);
	let fired = Rc::new(Cell::new(0));
	let fired2 = Rc::clone(&fired);
	let cancel = notify_e_cancel(&e, move |_: &i32| fired2.set(fired2.get() + 1));

	frp::send(&sender, 1);
	assert!(!cancel.is_cancelled());
	cancel.cancel();
	cancel.cancel();
	frp::send(&sender, 2);

	assert_eq!(fired.get(), 1);
	assert!(cancel.is_cancelled());
}

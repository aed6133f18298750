use frp::{bind2, constant, fail, lift2, lift3, make_cell, message_failure, read, read_result, Runtime};

#[test]
fn lift3_recomputes_from_all_three_inputs() {
	let rt = Runtime::new();
	let (x, x_writer) = make_cell(&rt, 1, None);
	let (y, y_writer) = make_cell(&rt, 2, None);
	let (z, z_writer) = make_cell(&rt, 3, None);
	let sum = lift3(&x, &y, &z, |a: &i32, b: &i32, c: &i32| a + b + c, None);
	assert_eq!(read(&sum), 6);
	x_writer.set(10);
	assert_eq!(read(&sum), 15);
	y_writer.set(20);
	z_writer.set(30);
	assert_eq!(read(&sum), 60);
}

#[test]
fn lift2_short_circuits_to_the_first_failing_input() {
	let rt = Runtime::new();
	let (ok, _ok_writer) = make_cell(&rt, 1, None);
	let failing = fail::<i32>(&rt, message_failure("boom"));
	let combined = lift2(&failing, &ok, |a: &i32, b: &i32| a + b, None);
	assert!(read_result(&combined).is_err());
}

#[test]
fn bind2_picks_the_inner_behavior_from_two_inputs() {
	let rt = Runtime::new();
	let (pick_left, pick_writer) = make_cell(&rt, true, None);
	let (left, left_writer) = make_cell(&rt, 1, None);
	let right = constant(&rt, 100);
	let picked = bind2(
		&pick_left,
		&left,
		move |pick: &bool, l: &i32| if *pick { constant(&rt, *l) } else { right.clone() },
		None,
	);
	assert_eq!(read(&picked), 1);
	left_writer.set(5);
	assert_eq!(read(&picked), 5);
	pick_writer.set(false);
	assert_eq!(read(&picked), 100);
}

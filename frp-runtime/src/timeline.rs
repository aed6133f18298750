//! Component A: an ordered, splice-capable sequence of logical timestamps.
//!
//! Timestamps delimit reader spans and own the cleanups registered during
//! those spans. The chain is singly-linked and terminated by a sentinel
//! whose `next` points to itself; this keeps `tick`/`add_cleanup` O(1) at
//! the cost of an O(n) `compare`/`splice_out`. A real order-maintenance
//! structure (Dietz–Sleator) would make those O(1) amortized too without
//! changing any contract here.
//!
//! `splice_out` and `init` never invoke cleanups themselves: they drain and
//! hand them back to the caller in firing order, which lets
//! [`crate::Runtime`] release its `RefCell` borrow before running anything
//! that might call back into the runtime (a cleanup deregistering a reader
//! from a behavior, for instance).

use std::cmp::Ordering;

use crate::error::RuntimeError;

/// A node in the [`Timeline`].
///
/// Opaque and `Copy`: comparing two timestamps for order requires walking
/// the chain via [`Timeline::compare`], since raw creation order does not
/// track chain position once timestamps are rewound and re-ticked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp(u64);

type Cleanup = Box<dyn FnOnce()>;

struct Node {
	next: u64,
	spliced_out: bool,
	cleanups: Vec<Cleanup>,
}

/// The totally-ordered, splice-capable timestamp chain described in
/// `spec.md` §4.A.
pub(crate) struct Timeline {
	nodes: Vec<Node>,
	sentinel: u64,
	now: u64,
}

impl Timeline {
	pub(crate) fn new() -> Self {
		let mut timeline = Self {
			nodes: Vec::new(),
			sentinel: 0,
			now: 0,
		};
		let mut discarded = Vec::new();
		timeline.init(&mut discarded);
		timeline
	}

	/// Discards the current timeline, draining every remaining cleanup from
	/// every node (in firing order) into `cleanups_out`, then installs a
	/// fresh sentinel. Idempotent.
	pub(crate) fn init(&mut self, cleanups_out: &mut Vec<Cleanup>) {
		for node in &mut self.nodes {
			cleanups_out.extend(node.cleanups.drain(..).rev());
		}
		self.nodes.clear();
		self.nodes.push(Node {
			next: 0,
			spliced_out: false,
			cleanups: Vec::new(),
		});
		self.sentinel = 0;
		self.now = 0;
	}

	fn validate(&self, t: Timestamp) -> Result<usize, RuntimeError> {
		let index = t.0 as usize;
		match self.nodes.get(index) {
			Some(node) if !node.spliced_out => Ok(index),
			_ => Err(RuntimeError::InvalidTimestamp),
		}
	}

	pub(crate) fn is_spliced_out(&self, t: Timestamp) -> bool {
		self.nodes
			.get(t.0 as usize)
			.map_or(true, |node| node.spliced_out)
	}

	pub(crate) fn get_now(&self) -> Timestamp {
		Timestamp(self.now)
	}

	pub(crate) fn set_now(&mut self, t: Timestamp) -> Result<(), RuntimeError> {
		self.validate(t)?;
		self.now = t.0;
		Ok(())
	}

	/// Inserts a fresh node immediately after `now` and advances `now` to it.
	pub(crate) fn tick(&mut self) -> Result<Timestamp, RuntimeError> {
		let now_index = self.validate(self.get_now())?;
		let successor = self.nodes[now_index].next;
		let new_id = self.nodes.len() as u64;
		self.nodes.push(Node {
			next: successor,
			spliced_out: false,
			cleanups: Vec::new(),
		});
		self.nodes[now_index].next = new_id;
		self.now = new_id;
		Ok(Timestamp(new_id))
	}

	/// Registers `f` to run when `t`'s span is released, i.e. the next time
	/// `t` falls strictly between the endpoints of a [`Timeline::splice_out`]
	/// call. Cleanups on the same timestamp fire LIFO.
	pub(crate) fn add_cleanup(
		&mut self,
		t: Timestamp,
		f: impl FnOnce() + 'static,
	) -> Result<(), RuntimeError> {
		let index = self.validate(t)?;
		self.nodes[index].cleanups.push(Box::new(f));
		Ok(())
	}

	/// Removes every node strictly between `t1` and `t2`, draining their
	/// cleanups into `cleanups_out` (each timestamp LIFO, timestamps
	/// themselves in forward/chain order) and marking them spliced-out.
	/// `t1` and `t2` are left alone. Fails with
	/// [`RuntimeError::InvalidTimestamp`] if the walk from `t1` reaches the
	/// sentinel before reaching `t2` — note that by the time that is
	/// detected, the nodes already walked have already been drained into
	/// `cleanups_out`; this mirrors the source's destructive failure
	/// behavior rather than rolling back (see `SPEC_FULL.md` §9). Callers
	/// must still run `cleanups_out` even when this returns `Err`.
	pub(crate) fn splice_out(
		&mut self,
		t1: Timestamp,
		t2: Timestamp,
		cleanups_out: &mut Vec<Cleanup>,
	) -> Result<(), RuntimeError> {
		let index1 = self.validate(t1)?;
		self.validate(t2)?;

		let mut current = self.nodes[index1].next;
		while current != t2.0 {
			if current == self.sentinel {
				return Err(RuntimeError::InvalidTimestamp);
			}
			let index = current as usize;
			cleanups_out.extend(self.nodes[index].cleanups.drain(..).rev());
			self.nodes[index].spliced_out = true;
			current = self.nodes[index].next;
		}
		self.nodes[index1].next = t2.0;
		Ok(())
	}

	/// 0 if identical, [`Ordering::Less`] if `t1` precedes `t2` on a forward
	/// walk from `t1`, [`Ordering::Greater`] otherwise.
	pub(crate) fn compare(&self, t1: Timestamp, t2: Timestamp) -> Result<Ordering, RuntimeError> {
		self.validate(t1)?;
		self.validate(t2)?;
		if t1.0 == t2.0 {
			return Ok(Ordering::Equal);
		}
		let mut current = t1.0;
		loop {
			if current == t2.0 {
				return Ok(Ordering::Less);
			}
			if current == self.sentinel {
				return Ok(Ordering::Greater);
			}
			current = self.nodes[current as usize].next;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tick_advances_now_and_orders_after_previous_now() {
		let mut tl = Timeline::new();
		let t0 = tl.get_now();
		let t1 = tl.tick().unwrap();
		assert_eq!(tl.compare(t0, t1).unwrap(), Ordering::Less);
		assert_eq!(tl.get_now(), t1);
	}

	#[test]
	fn splice_out_marks_intermediate_timestamps_spliced() {
		let mut tl = Timeline::new();
		let t1 = tl.tick().unwrap();
		let t2 = tl.tick().unwrap();
		let t3 = tl.tick().unwrap();
		assert!(!tl.is_spliced_out(t2));
		let mut cleanups = Vec::new();
		tl.splice_out(t1, t3, &mut cleanups).unwrap();
		assert!(tl.is_spliced_out(t2));
		assert!(!tl.is_spliced_out(t1));
		assert!(!tl.is_spliced_out(t3));
	}

	#[test]
	fn splice_out_fires_cleanups_in_lifo_order_per_timestamp() {
		use std::{cell::RefCell, rc::Rc};

		let mut tl = Timeline::new();
		let t1 = tl.tick().unwrap();
		let mid = tl.tick().unwrap();
		let t3 = tl.tick().unwrap();

		let order = Rc::new(RefCell::new(Vec::new()));
		{
			let order = Rc::clone(&order);
			tl.add_cleanup(mid, move || order.borrow_mut().push("first-added")).unwrap();
		}
		{
			let order = Rc::clone(&order);
			tl.add_cleanup(mid, move || order.borrow_mut().push("second-added")).unwrap();
		}
		let mut cleanups = Vec::new();
		tl.splice_out(t1, t3, &mut cleanups).unwrap();
		for cleanup in cleanups {
			cleanup();
		}
		assert_eq!(*order.borrow(), vec!["second-added", "first-added"]);
	}

	#[test]
	fn splice_out_rejects_t2_not_after_t1() {
		let mut tl = Timeline::new();
		let t1 = tl.tick().unwrap();
		let t2 = tl.tick().unwrap();
		// t2 is after t1, so splicing (t2, t1) must fail: the walk from
		// t2 reaches the sentinel without ever finding t1.
		let mut cleanups = Vec::new();
		assert!(tl.splice_out(t2, t1, &mut cleanups).is_err());
	}

	#[test]
	fn invalid_timestamp_after_splice() {
		let mut tl = Timeline::new();
		let t1 = tl.tick().unwrap();
		let t2 = tl.tick().unwrap();
		let t3 = tl.tick().unwrap();
		let mut cleanups = Vec::new();
		tl.splice_out(t1, t3, &mut cleanups).unwrap();
		assert!(tl.set_now(t2).is_err());
		assert!(tl.add_cleanup(t2, || {}).is_err());
	}

	#[test]
	fn compare_is_consistent_after_rewind_and_retick() {
		let mut tl = Timeline::new();
		let t1 = tl.tick().unwrap();
		let t2 = tl.tick().unwrap();
		let t3 = tl.tick().unwrap();
		// Rewind and tick again: a numerically larger id can land earlier
		// in chain order, which is exactly why `compare` must walk rather
		// than compare raw ids.
		tl.set_now(t1).unwrap();
		let t4 = tl.tick().unwrap();
		assert_eq!(tl.compare(t4, t2).unwrap(), Ordering::Less);
		assert_eq!(tl.compare(t4, t3).unwrap(), Ordering::Less);
		assert_eq!(tl.compare(t1, t4).unwrap(), Ordering::Less);
	}
}

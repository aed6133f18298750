//! Component D: the propagator, and the [`Runtime`] handle that ties
//! together the timeline, the two queues and the reader arena.
//!
//! `Runtime` is a cheap-to-clone, `Rc`-backed handle (like the
//! `SignalRuntimeRef` handles in the wider signals-runtime family this
//! crate is grounded on) rather than a global singleton: every behavior,
//! event channel and reader created through `frp` holds a clone of the
//! `Runtime` it belongs to, so nothing here is actually process-wide state
//! in the way `spec.md` describes it — §9's "Design Notes" calls this
//! substitution out explicitly as an accepted departure from the letter
//! of the source while keeping its contract.

use std::{
	cell::RefCell,
	cmp::Ordering,
	panic::{catch_unwind, AssertUnwindSafe},
	rc::Rc,
};

use crate::{
	error::RuntimeError,
	event_queue::EventQueue,
	priority_queue::PriorityQueue,
	reader::{ReaderId, ReaderSlot},
	sink::{self, panic_message, DebugSink, ExceptionSink},
	timeline::Timeline,
	Timestamp,
};

struct Inner {
	timeline: Timeline,
	events: EventQueue,
	pending: PriorityQueue,
	readers: Vec<ReaderSlot>,
	current_reader: Option<ReaderId>,
	is_propagating: bool,
	debug_sink: DebugSink,
	exception_sink: ExceptionSink,
}

/// A single-threaded FRP runtime: the timeline, the event and reader
/// queues, and the propagation loop described in `spec.md` §4.D.
///
/// Cloning a `Runtime` clones the handle, not the state — every clone
/// refers to the same timeline, queues and sinks. There is no global
/// default; construct one with [`Runtime::new`] and thread a clone of it
/// through whatever behaviors and events are built on top.
#[derive(Clone)]
pub struct Runtime(Rc<RefCell<Inner>>);

impl Runtime {
	/// Creates a fresh runtime: an empty timeline at its sentinel, empty
	/// queues, a dropping debug sink and a `log`-backed uncaught-exception
	/// sink (`spec.md` §6).
	#[must_use]
	pub fn new() -> Self {
		Self(Rc::new(RefCell::new(Inner {
			timeline: Timeline::new(),
			events: EventQueue::new(),
			pending: PriorityQueue::new(),
			readers: Vec::new(),
			current_reader: None,
			is_propagating: false,
			debug_sink: sink::default_debug_sink(),
			exception_sink: sink::default_exception_sink(),
		})))
	}

	/// The timestamp most recently allocated on this runtime's timeline.
	#[must_use]
	pub fn now(&self) -> Timestamp {
		self.0.borrow().timeline.get_now()
	}

	/// Allocates a fresh timestamp immediately after [`Runtime::now`] and
	/// advances `now` to it (`spec.md` §4.A `tick`).
	pub fn tick(&self) -> Result<Timestamp, RuntimeError> {
		self.0.borrow_mut().timeline.tick()
	}

	/// Registers `f` to run when `t`'s span is released by a later
	/// [`Runtime::splice_out`]. Cleanups on the same timestamp fire LIFO.
	pub fn add_cleanup(&self, t: Timestamp, f: impl FnOnce() + 'static) -> Result<(), RuntimeError> {
		self.0.borrow_mut().timeline.add_cleanup(t, f)
	}

	/// `true` once `t` has been removed by a [`Runtime::splice_out`] call,
	/// or if `t` was never issued by this runtime.
	#[must_use]
	pub fn is_spliced_out(&self, t: Timestamp) -> bool {
		self.0.borrow().timeline.is_spliced_out(t)
	}

	/// Total order on live timestamps (`spec.md` §4.A `compare`).
	pub fn compare(&self, t1: Timestamp, t2: Timestamp) -> Result<Ordering, RuntimeError> {
		self.0.borrow().timeline.compare(t1, t2)
	}

	/// Removes every timestamp strictly between `t1` and `t2`, firing their
	/// cleanups (each timestamp LIFO, timestamps in chain order) before
	/// returning. See `spec.md` §4.A and §9 for the destructive-failure
	/// behavior when `t2` does not lie after `t1`.
	pub fn splice_out(&self, t1: Timestamp, t2: Timestamp) -> Result<(), RuntimeError> {
		let mut cleanups = Vec::new();
		let result = self.0.borrow_mut().timeline.splice_out(t1, t2, &mut cleanups);
		tracing::trace!(target: "frp_runtime::timeline", released = cleanups.len(), ok = result.is_ok(), "splice_out");
		self.run_cleanups(cleanups);
		result
	}

	/// The reader currently executing on this runtime, if any. Used by
	/// `notify_b`/`notify_e` to scope a listener registration to the
	/// enclosing reader's span (`spec.md` §4.E).
	#[must_use]
	pub fn current_reader(&self) -> Option<ReaderId> {
		self.0.borrow().current_reader
	}

	/// Installs `f` as the debug-string sink (`spec.md` §6). Default: the
	/// string is dropped after a `tracing::trace!`.
	pub fn set_debug_sink(&self, f: impl FnMut(&str) + 'static) {
		self.0.borrow_mut().debug_sink = Rc::new(RefCell::new(f));
	}

	/// Installs `f` as the uncaught-exception sink (`spec.md` §6, §7).
	/// Default: `log::error!`.
	pub fn set_uncaught_exception_sink(&self, f: impl FnMut(&str) + 'static) {
		self.0.borrow_mut().exception_sink = Rc::new(RefCell::new(f));
	}

	/// Forwards `message` to the debug-string sink.
	pub fn debug(&self, message: &str) {
		let sink = Rc::clone(&self.0.borrow().debug_sink);
		(sink.borrow_mut())(message);
	}

	fn report_exception(&self, message: &str) {
		tracing::debug!(target: "frp_runtime::propagator", "{message}");
		let sink = Rc::clone(&self.0.borrow().exception_sink);
		(sink.borrow_mut())(message);
	}

	fn run_cleanups(&self, cleanups: Vec<Box<dyn FnOnce()>>) {
		for cleanup in cleanups {
			if let Err(payload) = catch_unwind(AssertUnwindSafe(cleanup)) {
				self.report_exception(&format!("cleanup panicked: {}", panic_message(&payload)));
			}
		}
	}

	/// Creates a reader, ticks a header timestamp for it, runs it once
	/// immediately, and returns its id.
	///
	/// The reader's disposal — dropping `run` and everything it
	/// captured — is itself registered as a cleanup on the header
	/// timestamp, so a reader is released exactly when an ancestor's
	/// [`Runtime::splice_out`] walks past its header (`spec.md` §3
	/// "Ownership").
	///
	/// Implementation note (resolving an ambiguity `spec.md` §4.D leaves
	/// open): the reader's body — where it actually subscribes to
	/// behaviors/events — begins at a *second*, inner timestamp ticked
	/// right after the header, not at the header itself. This makes "the
	/// half-open interval `(R.start_ts, R.end_ts)`" from §4.D coincide
	/// exactly with the exclusive-both-ends `splice_out` contract from
	/// §4.A: subscriptions recorded during the body never sit on the
	/// header node, so they are always included when that span is later
	/// spliced away. See `DESIGN.md` for the write-up.
	pub fn spawn_reader(&self, run: impl FnMut() + 'static) -> Result<ReaderId, RuntimeError> {
		let header = self.tick()?;
		let id = {
			let mut inner = self.0.borrow_mut();
			let id = ReaderId(inner.readers.len() as u64);
			inner.readers.push(ReaderSlot::new(header, Box::new(run)));
			id
		};
		let me = self.clone();
		self.add_cleanup(header, move || me.dispose_reader(id))?;
		self.execute_reader(id);
		Ok(id)
	}

	/// Marks `id` disposed: its `run` closure (and everything it
	/// captured — subscriptions, nested readers, user cleanups already
	/// pending) is dropped. Harmless to call more than once.
	fn dispose_reader(&self, id: ReaderId) {
		if let Some(slot) = self.0.borrow_mut().readers.get_mut(id.0 as usize) {
			slot.run = None;
		}
	}

	/// Re-executes `id`: splices out its previous body span, advances
	/// `now` to its header, ticks a fresh body timestamp, runs it with
	/// `id` installed as [`Runtime::current_reader`], and records the new
	/// end timestamp. Used both for the reader's very first run (from
	/// [`Runtime::spawn_reader`]) and for every later re-run drained from
	/// the priority queue.
	#[tracing::instrument(level = "trace", target = "frp_runtime::propagator", skip(self))]
	fn execute_reader(&self, id: ReaderId) {
		let (header, previous_end) = {
			let inner = self.0.borrow();
			let slot = &inner.readers[id.0 as usize];
			(slot.start_ts, slot.end_ts)
		};
		if header != previous_end {
			let _ = self.splice_out(header, previous_end);
		}
		if self.0.borrow_mut().timeline.set_now(header).is_err() {
			return;
		}
		if self.tick().is_err() {
			return;
		}

		let previous_reader = {
			let mut inner = self.0.borrow_mut();
			inner.readers[id.0 as usize].enqueued = false;
			inner.current_reader.replace(id)
		};

		let run = self.0.borrow_mut().readers.get_mut(id.0 as usize).and_then(|slot| slot.run.take());
		if let Some(mut run) = run {
			let result = catch_unwind(AssertUnwindSafe(|| run()));
			if let Some(slot) = self.0.borrow_mut().readers.get_mut(id.0 as usize) {
				// Only restore the closure if disposal didn't already
				// fire while it was running (e.g. a reentrant ancestor
				// re-run spliced this reader's own header away).
				if slot.run.is_none() {
					slot.run = Some(run);
				}
			}
			if let Err(payload) = result {
				self.report_exception(&format!("reader panicked: {}", panic_message(&payload)));
			}
		}

		let mut inner = self.0.borrow_mut();
		inner.current_reader = previous_reader;
		if let Some(slot) = inner.readers.get_mut(id.0 as usize) {
			slot.end_ts = inner.timeline.get_now();
		}
	}

	/// Enqueues `id` for re-execution unless it is already pending
	/// (`spec.md` §4.B/§8 invariant 2: at-most-once-per-cycle).
	pub fn enqueue_reader(&self, id: ReaderId) {
		let mut inner = self.0.borrow_mut();
		let Some(slot) = inner.readers.get_mut(id.0 as usize) else { return };
		if slot.enqueued || slot.run.is_none() {
			return;
		}
		slot.enqueued = true;
		inner.pending.push(id);
	}

	/// Enqueues a type-erased event delivery and starts a propagation
	/// cycle if none is already running (`spec.md` §4.C, §4.D step 1).
	pub fn enqueue_event(&self, delivery: Box<dyn FnOnce()>) {
		self.0.borrow_mut().events.push(delivery);
		self.propagate();
	}

	/// Drains the event queue and the reader priority queue to quiescence,
	/// per the loop in `spec.md` §4.D. A no-op if a propagation cycle is
	/// already running higher up the call stack (reentrant `send`/write
	/// just enqueues for that outer cycle, matching §5 "Reentrancy").
	#[tracing::instrument(level = "trace", target = "frp_runtime::propagator", skip(self))]
	fn propagate(&self) {
		{
			let mut inner = self.0.borrow_mut();
			if inner.is_propagating {
				return;
			}
			inner.is_propagating = true;
		}

		loop {
			loop {
				let next = self.0.borrow_mut().events.pop();
				let Some(delivery) = next else { break };
				if let Err(payload) = catch_unwind(AssertUnwindSafe(delivery)) {
					self.report_exception(&format!("listener panicked: {}", panic_message(&payload)));
				}
			}

			loop {
				let next = {
					let mut inner = self.0.borrow_mut();
					let Inner { timeline, readers, pending, .. } = &mut *inner;
					pending.pop_min(
						|id| readers[id.0 as usize].run.is_some() && !timeline.is_spliced_out(readers[id.0 as usize].start_ts),
						|a, b| {
							timeline
								.compare(readers[a.0 as usize].start_ts, readers[b.0 as usize].start_ts)
								.is_ok_and(|o| o == Ordering::Less)
						},
					)
				};
				let Some(id) = next else { break };
				self.execute_reader(id);
			}

			let done = {
				let inner = self.0.borrow();
				inner.events.is_empty() && inner.pending.is_empty()
			};
			if done {
				break;
			}
		}

		self.0.borrow_mut().is_propagating = false;
	}

	/// Forces an immediate drain of both queues, for callers (mainly
	/// tests) that want to observe quiescence synchronously rather than
	/// relying on [`Runtime::enqueue_event`]'s implicit trigger. Returns
	/// [`RuntimeError::Reentrant`] if called from inside a reader or
	/// listener that is itself mid-propagation, since nesting a second
	/// drain loop would violate the single-outer-loop guarantee in
	/// `spec.md` §5.
	pub fn run_pending(&self) -> Result<(), RuntimeError> {
		if self.0.borrow().is_propagating {
			return Err(RuntimeError::Reentrant);
		}
		self.propagate();
		Ok(())
	}

	/// `true` once both queues are empty and no cycle is in flight, i.e.
	/// the invariant `spec.md` §8.1 demands hold at the end of every
	/// propagation cycle.
	#[must_use]
	pub fn is_quiescent(&self) -> bool {
		let inner = self.0.borrow();
		inner.events.is_empty() && inner.pending.is_empty() && !inner.is_propagating
	}
}

impl Default for Runtime {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Runtime {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Runtime").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::{cell::RefCell, rc::Rc};

	use super::*;

	#[test]
	fn spawn_reader_runs_immediately_once() {
		let rt = Runtime::new();
		let calls = Rc::new(RefCell::new(0));
		{
			let calls = Rc::clone(&calls);
			rt.spawn_reader(move || *calls.borrow_mut() += 1).unwrap();
		}
		assert_eq!(*calls.borrow(), 1);
	}

	#[test]
	fn rerun_fires_cleanups_exactly_once_before_next_run() {
		let rt = Runtime::new();
		let cleanup_fires = Rc::new(RefCell::new(0));
		let run_count = Rc::new(RefCell::new(0));
		let id = {
			let cleanup_fires = Rc::clone(&cleanup_fires);
			let run_count = Rc::clone(&run_count);
			let rt_for_cleanup = rt.clone();
			rt.spawn_reader(move || {
				*run_count.borrow_mut() += 1;
				let cleanup_fires = Rc::clone(&cleanup_fires);
				rt_for_cleanup.add_cleanup(rt_for_cleanup.now(), move || *cleanup_fires.borrow_mut() += 1).unwrap();
			})
			.unwrap()
		};
		assert_eq!(*run_count.borrow(), 1);
		assert_eq!(*cleanup_fires.borrow(), 0);

		rt.enqueue_reader(id);
		rt.run_pending().unwrap();
		assert_eq!(*run_count.borrow(), 2);
		assert_eq!(*cleanup_fires.borrow(), 1);
	}

	#[test]
	fn enqueueing_twice_before_drain_runs_once() {
		let rt = Runtime::new();
		let run_count = Rc::new(RefCell::new(0));
		let id = {
			let run_count = Rc::clone(&run_count);
			rt.spawn_reader(move || *run_count.borrow_mut() += 1).unwrap()
		};
		rt.enqueue_reader(id);
		rt.enqueue_reader(id);
		rt.run_pending().unwrap();
		assert_eq!(*run_count.borrow(), 2);
	}

	#[test]
	fn reentrant_run_pending_is_rejected() {
		let rt = Runtime::new();
		let inner_rt = rt.clone();
		let result = Rc::new(RefCell::new(None));
		{
			let result = Rc::clone(&result);
			rt.spawn_reader(move || {
				*result.borrow_mut() = Some(inner_rt.run_pending().is_err());
			})
			.unwrap();
		}
		assert_eq!(*result.borrow(), Some(true));
	}

	#[test]
	fn enqueueing_an_event_leaves_the_runtime_quiescent() {
		let rt = Runtime::new();
		rt.enqueue_event(Box::new(|| {}));
		assert!(rt.is_quiescent());
	}
}

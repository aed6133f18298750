//! Component G: behavior/event combinators built purely on top of
//! [`Runtime::spawn_reader`] and the primitives in [`crate::behavior`] and
//! [`crate::event`].
//!
//! Every combinator that derives one behavior from another (`bind`, `lift`,
//! `blift`, `catch`, `try_bind`) follows the same shape: allocate the
//! output behavior, spawn a reader that subscribes to its inputs and
//! writes the derived result, and let the reader's own re-run machinery
//! handle re-subscription. Because a reader's previous body span is
//! spliced out before it re-runs, a `bind` that switches to a different
//! inner behavior on each run automatically drops its old subscription —
//! there is no separate "rebind" bookkeeping anywhere in this file.

use frp_runtime::Runtime;

use crate::{
	behavior::{notify_result_b, read_result, subscribe_current, write, Behavior, Eq},
	error::{Failure, Outcome},
	event::{self, notify_result_e, Channel},
};

/// Derives a behavior by feeding `a`'s value through `f` each time either
/// changes, where `f` itself picks which behavior to track next. The
/// textbook self-adjusting-computation `bind`: re-running drops the
/// previous inner subscription and installs whatever `f` returns this
/// time, so a `bind` chain can rewire its own dependency graph at
/// runtime.
pub fn bind<A: Clone + 'static, B: Clone + 'static>(
	a: &Behavior<A>,
	mut f: impl FnMut(&A) -> Behavior<B> + 'static,
	eq: Eq<B>,
) -> Behavior<B> {
	let out = Behavior::pending(a.runtime().clone(), eq);
	let a = a.clone();
	let out2 = out.clone();
	let _ = a.runtime().clone().spawn_reader(move || {
		subscribe_current(&a);
		match read_result(&a) {
			Ok(v) => {
				let inner = f(&v);
				subscribe_current(&inner);
				write(&out2, read_result(&inner));
			}
			Err(error) => write(&out2, Err(error)),
		}
	});
	out
}

/// Derives a behavior by applying a total function `f` to `a`'s value.
/// Failures in `a` propagate unchanged; `f` only runs on `Ok`.
pub fn lift<A: Clone + 'static, B: Clone + 'static>(a: &Behavior<A>, mut f: impl FnMut(&A) -> B + 'static, eq: Eq<B>) -> Behavior<B> {
	let out = Behavior::pending(a.runtime().clone(), eq);
	let a = a.clone();
	let out2 = out.clone();
	let _ = a.runtime().clone().spawn_reader(move || {
		subscribe_current(&a);
		write(&out2, read_result(&a).map(|v| f(&v)));
	});
	out
}

/// Like [`lift`], but `f` itself can fail. Symmetric with [`bind`] vs.
/// [`try_bind`]: `lift` turns `f`'s output into an always-succeeding
/// `Ok`, `blift` lets it produce either half of the result directly.
pub fn blift<A: Clone + 'static, B: Clone + 'static>(a: &Behavior<A>, mut f: impl FnMut(&A) -> Outcome<B> + 'static, eq: Eq<B>) -> Behavior<B> {
	let out = Behavior::pending(a.runtime().clone(), eq);
	let a = a.clone();
	let out2 = out.clone();
	let _ = a.runtime().clone().spawn_reader(move || {
		subscribe_current(&a);
		let result = match read_result(&a) {
			Ok(v) => f(&v),
			Err(error) => Err(error),
		};
		write(&out2, result);
	});
	out
}

/// Like [`bind`], but `f` may fail before it ever produces an inner
/// behavior to switch to.
pub fn try_bind<A: Clone + 'static, B: Clone + 'static>(
	a: &Behavior<A>,
	mut f: impl FnMut(&A) -> Outcome<Behavior<B>> + 'static,
	eq: Eq<B>,
) -> Behavior<B> {
	let out = Behavior::pending(a.runtime().clone(), eq);
	let a = a.clone();
	let out2 = out.clone();
	let _ = a.runtime().clone().spawn_reader(move || {
		subscribe_current(&a);
		let result = match read_result(&a) {
			Ok(v) => match f(&v) {
				Ok(inner) => {
					subscribe_current(&inner);
					read_result(&inner)
				}
				Err(error) => Err(error),
			},
			Err(error) => Err(error),
		};
		write(&out2, result);
	});
	out
}

/// Forwards `b`'s value unchanged while it succeeds; the moment it fails,
/// switches to tracking `handler(&error)` instead. `handler` runs again
/// on every subsequent failure of `b`, each time replacing the previous
/// recovery behavior.
pub fn catch<T: Clone + 'static>(b: &Behavior<T>, mut handler: impl FnMut(&Failure) -> Behavior<T> + 'static, eq: Eq<T>) -> Behavior<T> {
	let out = Behavior::pending(b.runtime().clone(), eq);
	let b = b.clone();
	let out2 = out.clone();
	let _ = b.runtime().clone().spawn_reader(move || {
		subscribe_current(&b);
		match read_result(&b) {
			Ok(v) => write(&out2, Ok(v)),
			Err(error) => {
				let recovery = handler(&error);
				subscribe_current(&recovery);
				write(&out2, read_result(&recovery));
			}
		}
	});
	out
}

/// A behavior that starts at `initial` and takes on `e`'s value each time
/// it fires `Ok`; a failure delivered by `e` leaves the held value
/// unchanged (use [`hold_result`] to observe it instead).
#[must_use]
pub fn hold<T: Clone + 'static>(runtime: &Runtime, initial: T, e: &Channel<T>) -> Behavior<T> {
	let out = Behavior::pending(runtime.clone(), None);
	out.inner.borrow_mut().result = Some(Ok(initial));
	let out2 = out.clone();
	notify_result_e(e, move |result| {
		if let Ok(value) = result {
			write(&out2, Ok(value.clone()));
		}
	});
	out
}

/// Like [`hold`], but a failure fired by `e` is written through to the
/// held behavior rather than discarded.
#[must_use]
pub fn hold_result<T: Clone + 'static>(runtime: &Runtime, initial: Outcome<T>, e: &Channel<T>) -> Behavior<T> {
	let out = Behavior::pending(runtime.clone(), None);
	out.inner.borrow_mut().result = Some(initial);
	let out2 = out.clone();
	notify_result_e(e, move |result| write(&out2, result.clone()));
	out
}

/// Flattens a behavior of behaviors: tracks whichever inner behavior `b`
/// currently holds, switching whenever `b` itself changes. A thin
/// specialization of [`bind`] with the identity projection.
#[must_use]
pub fn switch_bb<T: Clone + 'static>(b: &Behavior<Behavior<T>>, eq: Eq<T>) -> Behavior<T> {
	bind(b, |inner: &Behavior<T>| inner.clone(), eq)
}

/// Tracks `initial` until `be` fires a replacement behavior, then tracks
/// that one instead, and so on for every subsequent firing.
#[must_use]
pub fn switch_be<T: Clone + 'static>(initial: &Behavior<T>, be: &Channel<Behavior<T>>, eq: Eq<T>) -> Behavior<T> {
	let current = hold(initial.runtime(), initial.clone(), be);
	switch_bb(&current, eq)
}

/// Like [`switch_be`], but only ever switches once — on `be`'s first
/// firing — and then stays locked to that replacement regardless of
/// anything `be` fires afterward.
#[must_use]
pub fn until<T: Clone + 'static>(b: &Behavior<T>, be: &Channel<Behavior<T>>, eq: Eq<T>) -> Behavior<T> {
	switch_be(b, &event::next(be), eq)
}

/// An event that fires `b`'s new result every time a write to `b` isn't
/// elided by its equality (`behavior::write`'s no-op case never reaches
/// here).
#[must_use]
pub fn changes<T: Clone + 'static>(b: &Behavior<T>) -> Channel<T> {
	let out = Channel::new(b.runtime().clone());
	let out2 = out.clone();
	notify_result_b(b, move |result| out2.deliver(result));
	out
}

/// An event that fires once whenever `b` is written `Ok(true)`.
#[must_use]
pub fn when_true(b: &Behavior<bool>) -> Channel<()> {
	let transitions = changes(b);
	let positive = event::filter(&transitions, |v: &bool| *v);
	event::map(&positive, |_| ())
}

/// A behavior counting how many times `e` has fired `Ok`, starting at 0.
#[must_use]
pub fn count<T: Clone + 'static>(e: &Channel<T>) -> Behavior<u64> {
	let running = event::collect(e, 0u64, |acc: &u64, _: &T| acc + 1);
	hold(e.runtime(), 0u64, &running)
}

/// A handle that can write into the [`Behavior`] returned alongside it by
/// [`make_cell`]. Split the same way [`crate::event::Sender`] is split
/// from [`Channel`]: the behavior is freely readable and subscribable,
/// but only a `CellWriter` can push a new value into it.
pub struct CellWriter<T: 'static> {
	cell: Behavior<T>,
}

impl<T> Clone for CellWriter<T> {
	fn clone(&self) -> Self {
		Self { cell: self.cell.clone() }
	}
}

impl<T: Clone + 'static> CellWriter<T> {
	/// Writes `value` into the paired behavior and drains whatever readers
	/// that write enqueues, starting a propagation cycle if none is
	/// already running — the same contract [`crate::event::send`] gives
	/// external callers on the event side.
	pub fn set(&self, value: T) {
		self.set_result(Ok(value));
	}

	/// Writes `result` into the paired behavior and drains its readers.
	pub fn set_result(&self, result: Outcome<T>) {
		write(&self.cell, result);
		// A nested call (the cell is being written from inside a reader
		// that is itself mid-propagation) gets rejected with `Reentrant`;
		// the readers this write just enqueued are still picked up by
		// that outer cycle's own loop, so there is nothing left to do.
		let _ = self.cell.runtime().run_pending();
	}
}

/// Allocates a behavior seeded with `initial` and the [`CellWriter`] that
/// can subsequently update it — the externally-mutable leaf of a
/// dependency graph otherwise built entirely from derived, read-only
/// behaviors.
#[must_use]
pub fn make_cell<T: Clone + 'static>(runtime: &Runtime, initial: T, eq: Eq<T>) -> (Behavior<T>, CellWriter<T>) {
	let cell = Behavior::pending(runtime.clone(), eq);
	cell.inner.borrow_mut().result = Some(Ok(initial));
	let writer = CellWriter { cell: cell.clone() };
	(cell, writer)
}


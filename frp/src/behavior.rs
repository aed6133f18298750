//! Component E: the behavior cell (`spec.md` §3, §4.E).
//!
//! A [`Behavior`] is a cheap-to-clone handle onto a shared cell holding the
//! current [`Outcome`], the timestamp it was last written at, the readers
//! registered against it, and its notifiers. Equality lives on the
//! binder that produced the behavior (the `eq` passed to `bind`/`lift`/…),
//! not on the type — two `Behavior<T>` of the same `T` can use different
//! equalities, which is why `eq` is a value threaded through the
//! constructors rather than a trait bound.

use std::rc::Rc;

use frp_runtime::{ReaderId, Runtime};

use crate::error::Outcome;

/// An equality predicate used to elide no-op writes. `None` means "always
/// different", the default `spec.md` §9 calls for.
pub type Eq<T> = Option<Rc<dyn Fn(&T, &T) -> bool>>;

/// Builds an [`Eq`] from `==`.
#[must_use]
pub fn eq_by_partial_eq<T: PartialEq + 'static>() -> Eq<T> {
	Some(Rc::new(|a: &T, b: &T| a == b))
}

type Notifier<T> = Rc<std::cell::RefCell<dyn FnMut(&Outcome<T>)>>;

pub(crate) struct BehaviorInner<T> {
	pub(crate) result: Option<Outcome<T>>,
	pub(crate) changed_at: frp_runtime::Timestamp,
	pub(crate) eq: Eq<T>,
	pub(crate) readers: Vec<ReaderId>,
	notifiers: Vec<(u64, Notifier<T>)>,
	next_notifier_id: u64,
}

/// A time-varying cell holding a current [`Outcome`] (`spec.md` §3 "E
/// Behavior").
pub struct Behavior<T: 'static> {
	pub(crate) runtime: Runtime,
	pub(crate) inner: Rc<std::cell::RefCell<BehaviorInner<T>>>,
}

impl<T> Clone for Behavior<T> {
	fn clone(&self) -> Self {
		Self { runtime: self.runtime.clone(), inner: Rc::clone(&self.inner) }
	}
}

impl<T: 'static> Behavior<T> {
	pub(crate) fn pending(runtime: Runtime, eq: Eq<T>) -> Self {
		let changed_at = runtime.now();
		Self {
			inner: Rc::new(std::cell::RefCell::new(BehaviorInner {
				result: None,
				changed_at,
				eq,
				readers: Vec::new(),
				notifiers: Vec::new(),
				next_notifier_id: 0,
			})),
			runtime,
		}
	}

	/// A stable identity hash for this behavior, suitable for
	/// [`crate::memo::Memo`] keys (`spec.md` §4.G `hash_behavior`). Default
	/// structural hashing is unsuitable here since the cell is mutable;
	/// this hashes the `Rc`'s address instead.
	#[must_use]
	pub fn hash_behavior(&self) -> u64 {
		Rc::as_ptr(&self.inner) as *const () as u64
	}

	/// The runtime this behavior belongs to.
	#[must_use]
	pub fn runtime(&self) -> &Runtime {
		&self.runtime
	}
}

/// A behavior whose result is set once at construction and never rewritten
/// (`spec.md` §4.E `constant`).
#[must_use]
pub fn constant<T: 'static>(runtime: &Runtime, value: T) -> Behavior<T> {
	let b = Behavior::pending(runtime.clone(), None);
	b.inner.borrow_mut().result = Some(Ok(value));
	b
}

/// A behavior whose result is a failure set once at construction
/// (`spec.md` §4.E `constant`/`fail`).
#[must_use]
pub fn fail<T: 'static>(runtime: &Runtime, error: crate::error::Failure) -> Behavior<T> {
	let b = Behavior::pending(runtime.clone(), None);
	b.inner.borrow_mut().result = Some(Err(error));
	b
}

/// Registers `f` to run against `runtime`'s current timestamp, i.e. when
/// whichever reader span is presently open is later released (`spec.md`
/// §6 `cleanup`). A thin wrapper over [`Runtime::add_cleanup`]/
/// [`Runtime::now`] so callers don't have to fetch and thread a
/// [`frp_runtime::Timestamp`] through themselves to get the same effect
/// [`subscribe_current`] already relies on internally.
pub fn cleanup(runtime: &Runtime, f: impl FnOnce() + 'static) {
	let _ = runtime.add_cleanup(runtime.now(), f);
}

/// Registers [`Runtime::current_reader`] (if any) as a dependent of `b`,
/// and schedules its deregistration for when the reader's current span is
/// released. A no-op outside a reader context. Used by every combinator
/// that reads a behavior as part of its dependency set (`spec.md` §4.D
/// "every `bind`/`notify` registers itself on the accessed
/// behavior/event, and records a cleanup on the current timestamp").
pub(crate) fn subscribe_current<T: 'static>(b: &Behavior<T>) {
	let Some(reader_id) = b.runtime.current_reader() else { return };
	b.inner.borrow_mut().readers.push(reader_id);
	let inner = Rc::clone(&b.inner);
	let _ = b.runtime.add_cleanup(b.runtime.now(), move || {
		inner.borrow_mut().readers.retain(|&r| r != reader_id);
	});
}

/// Writes `result` into `b` (`spec.md` §4.E `write`).
///
/// If `b.eq` holds between the old and new value (both `Ok`), this is a
/// no-op: no reader is enqueued, no notifier runs (`spec.md` §8 invariant
/// 6). Otherwise `changed_at` advances to [`Runtime::now`], every
/// registered reader is enqueued onto the priority queue, and every
/// notifier is invoked synchronously with the new result. [`notify_b`]
/// drops `Err` before it reaches the caller's closure (`spec.md` §9's
/// preserved open question); [`notify_result_b`] sees it.
pub(crate) fn write<T: Clone + 'static>(b: &Behavior<T>, result: Outcome<T>) {
	let (readers, notifiers) = {
		let mut inner = b.inner.borrow_mut();
		let unchanged = match (&inner.result, &result) {
			(Some(Ok(old)), Ok(new)) => inner.eq.as_ref().is_some_and(|eq| eq(old, new)),
			_ => false,
		};
		if unchanged {
			return;
		}
		inner.result = Some(result.clone());
		inner.changed_at = b.runtime.now();
		(inner.readers.clone(), inner.notifiers.clone())
	};
	for reader_id in readers {
		b.runtime.enqueue_reader(reader_id);
	}
	for (_, notifier) in notifiers {
		(notifier.borrow_mut())(&result);
	}
}

/// Returns `b`'s current result, or panics if it is a failure
/// (`spec.md` §4.E `read`). Does not register a dependency; may return a
/// stale value if called outside the propagator.
#[must_use]
pub fn read<T: Clone + 'static>(b: &Behavior<T>) -> T {
	match read_result(b) {
		Ok(value) => value,
		Err(error) => panic!("behavior read while in a failed state: {error}"),
	}
}

/// Returns `b`'s current result without panicking on failure
/// (`spec.md` §4.E `read_result`). Does not register a dependency.
#[must_use]
pub fn read_result<T: Clone + 'static>(b: &Behavior<T>) -> Outcome<T> {
	b.inner
		.borrow()
		.result
		.clone()
		.unwrap_or_else(|| Err(crate::error::message_failure("behavior read before its first write")))
}

fn notify_result_b_impl<T: 'static>(
	b: &Behavior<T>,
	f: impl FnMut(&Outcome<T>) + 'static,
	scoped: bool,
) -> Option<crate::cancel::Cancel> {
	let id = {
		let mut inner = b.inner.borrow_mut();
		let id = inner.next_notifier_id;
		inner.next_notifier_id += 1;
		inner.notifiers.push((id, Rc::new(std::cell::RefCell::new(f))));
		id
	};
	let remove = {
		let inner = Rc::clone(&b.inner);
		move || inner.borrow_mut().notifiers.retain(|(nid, _)| *nid != id)
	};
	if scoped {
		if b.runtime.current_reader().is_some() {
			let _ = b.runtime.add_cleanup(b.runtime.now(), remove);
		}
		None
	} else {
		Some(crate::cancel::Cancel::new(remove))
	}
}

/// Registers `f` to run with `b`'s value on every change. If called
/// inside a reader, the registration is removed when that reader's span
/// is released; outside a reader it persists until the behavior is
/// dropped. Failures are unwrapped silently: `f` is never called for a
/// write that left `b` in a failed state (`spec.md` §4.E `notify_b`, §9
/// preserved open question).
pub fn notify_b<T: 'static>(b: &Behavior<T>, mut f: impl FnMut(&T) + 'static) {
	notify_result_b_impl(
		b,
		move |result: &Outcome<T>| {
			if let Ok(value) = result {
				f(value);
			}
		},
		true,
	);
}

/// Like [`notify_b`], but returns an explicit [`crate::cancel::Cancel`]
/// instead of scoping the registration to the enclosing reader
/// (`spec.md` §4.E `notify_b_cancel`).
#[must_use]
pub fn notify_b_cancel<T: 'static>(b: &Behavior<T>, mut f: impl FnMut(&T) + 'static) -> crate::cancel::Cancel {
	notify_result_b_impl(
		b,
		move |result: &Outcome<T>| {
			if let Ok(value) = result {
				f(value);
			}
		},
		false,
	)
	.expect("notify_result_b_impl(.., scoped = false) always returns Some")
}

/// Like [`notify_b`], but `f` receives the full [`Outcome`] rather than
/// having failures unwrapped-and-dropped (`spec.md` §4.E
/// `notify_result_b`).
pub fn notify_result_b<T: 'static>(b: &Behavior<T>, f: impl FnMut(&Outcome<T>) + 'static) {
	notify_result_b_impl(b, f, true);
}

/// Cancellable variant of [`notify_result_b`].
#[must_use]
pub fn notify_result_b_cancel<T: 'static>(b: &Behavior<T>, f: impl FnMut(&Outcome<T>) + 'static) -> crate::cancel::Cancel {
	notify_result_b_impl(b, f, false).expect("notify_result_b_impl(.., scoped = false) always returns Some")
}

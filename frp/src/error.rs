//! The failure half of a behavior's or event's result (`spec.md` §3, §7
//! `PropagatedFailure`).
//!
//! Failures are ordinary values carried inside [`crate::Outcome`], never
//! thrown from a combinator: `bind`/`lift`/`hold`/… propagate them, `catch`
//! diverts them, and only [`Failure`] itself (not an exception type) ever
//! crosses a behavior boundary. A boxed, reference-counted trait object is
//! the natural shape for that, since the same failure is frequently cloned
//! into several downstream readers within one propagation cycle.

use std::{error::Error as StdError, rc::Rc};

/// A propagated failure: cheap to clone, since the same value is handed to
/// every downstream reader and notifier in one write.
pub type Failure = Rc<dyn StdError>;

/// The result carried by a behavior or delivered by an event: `Ok` is the
/// spec's `Value(v)`, `Err` is its `Fail(e)`.
pub type Outcome<T> = Result<T, Failure>;

/// Wraps any user error in a [`Failure`].
pub fn failure(error: impl StdError + 'static) -> Failure {
	Rc::new(error)
}

/// A minimal [`StdError`] for call sites that just want to carry a message
/// (e.g. `read`'s panic, or a user `catch` handler that doesn't have a
/// concrete error type at hand).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Message(pub String);

/// Wraps a plain string in a [`Failure`] via [`Message`].
pub fn message_failure(message: impl Into<String>) -> Failure {
	Rc::new(Message(message.into()))
}

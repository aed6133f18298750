#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! Behaviors, events and their combinators (components E through H), built
//! on the timeline/propagator in `frp_runtime`.
//!
//! A [`Behavior<T>`] is a time-varying cell; a [`Channel<T>`] is a
//! discrete stream of occurrences. Both carry an [`Outcome<T>`] rather
//! than a bare `T`, so a failure partway through a dependency chain
//! propagates like any other value instead of unwinding the call stack.
//! Every derived behavior and event is built from a [`Runtime`] plus the
//! combinators in this crate — there is no ambient global graph, so a
//! program can run more than one independent runtime if it needs to.
//!
//! # Threading notes
//!
//! Like [`frp_runtime::Runtime`], everything here is `Rc`-based and
//! single-threaded; neither [`Behavior`] nor [`Channel`] is [`Send`] or
//! [`Sync`].

mod arity;
mod behavior;
mod cancel;
mod combinators;
mod error;
mod event;
mod memo;

pub use frp_runtime::{Runtime, RuntimeError};

pub use arity::{bind2, bind3, bind4, bind5, bind6, bind7, lift2, lift3, lift4, lift5, lift6, lift7};
pub use behavior::{
	cleanup, constant, eq_by_partial_eq, fail, notify_b, notify_b_cancel, notify_result_b, notify_result_b_cancel, read, read_result, Behavior, Eq,
};
pub use cancel::Cancel;
pub use combinators::{
	bind, blift, catch, changes, count, hold, hold_result, lift, make_cell, switch_bb, switch_be, try_bind, until, when_true, CellWriter,
};
pub use error::{failure, message_failure, Failure, Message, Outcome};
pub use event::{
	collect, filter, make_event, map, merge, never, next, notify_e, notify_e_cancel, notify_result_e, notify_result_e_cancel, send, send_exn,
	send_result, Channel, Sender,
};
pub use memo::Memo;


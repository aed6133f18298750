#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! Timeline, priority queue, event queue and propagator backing the `frp`
//! crate: components A through D of a self-adjusting-computation FRP
//! runtime, plus the typed error taxonomy and the two configuration sinks
//! (debug-string, uncaught-exception).
//!
//! Nothing in this crate knows what a behavior or an event is — it only
//! orders timestamps, runs closures at the right point in that order, and
//! releases whatever a closure attached to a timestamp range when that
//! range is superseded. The `frp` crate builds behaviors and events on top
//! of exactly this contract.
//!
//! # Threading notes
//!
//! This runtime is single-threaded and cooperative by design: none of its
//! operations synchronize across OS threads, and [`Runtime`] is neither
//! [`Send`] nor [`Sync`].

mod error;
mod event_queue;
mod priority_queue;
mod reader;
mod runtime;
mod sink;
mod timeline;

pub use error::RuntimeError;
pub use reader::ReaderId;
pub use runtime::Runtime;
pub use timeline::Timestamp;

//! Errors that the runtime itself can report.
//!
//! `PropagatedFailure` and `MemoMismatch` (see `SPEC_FULL.md` §3/§7) are not
//! here: the former is carried as an ordinary value inside a behavior's
//! result and never thrown, and the latter is not an error at all. Both
//! live in the `frp` crate, next to the types they apply to.

/// Failure modes intrinsic to the timeline/propagator themselves.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
	/// The timestamp has been spliced out of the timeline, was never
	/// issued by this runtime, or `splice_out` could not find the second
	/// endpoint after the first while walking the chain.
	#[error("timestamp is invalid: spliced out, foreign, or out of order")]
	InvalidTimestamp,

	/// A listener or cleanup closure panicked while running. The
	/// propagation cycle that triggered it continues; this is reported to
	/// the runtime's uncaught-exception sink and surfaced here only for
	/// callers that want to inspect it directly (e.g. in tests).
	#[error("a listener or cleanup panicked: {0}")]
	ListenerException(String),

	/// `update_blocking`-style synchronous reentry was attempted from
	/// inside an already-running propagation cycle.
	#[error("cannot reenter the propagator while it is already running")]
	Reentrant,
}

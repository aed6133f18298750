//! The two process-wide-in-spirit, per-[`Runtime`](crate::Runtime) sinks:
//! a debug-string sink for implementation tracing, and an uncaught-exception
//! sink that listener/cleanup panics are routed to instead of unwinding
//! across the propagator.
//!
//! Both default to doing nothing interesting of their own accord beyond
//! what `tracing`/`log` already give us for free; callers that want the
//! debug sink to actually go anywhere install one with
//! [`Runtime::set_debug_sink`](crate::Runtime::set_debug_sink).

use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type DebugSink = Rc<RefCell<dyn FnMut(&str)>>;
pub(crate) type ExceptionSink = Rc<RefCell<dyn FnMut(&str)>>;

pub(crate) fn default_debug_sink() -> DebugSink {
	Rc::new(RefCell::new(|message: &str| {
		tracing::trace!(target: "frp_runtime::debug", "{message}");
	}))
}

pub(crate) fn default_exception_sink() -> ExceptionSink {
	Rc::new(RefCell::new(|message: &str| {
		log::error!(target: "frp_runtime", "uncaught exception from listener or cleanup: {message}");
	}))
}

/// Extracts a human-readable message from a `catch_unwind` payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_owned()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"non-string panic payload".to_owned()
	}
}

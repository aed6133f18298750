//! The reader/binder record (`spec.md` §3 "Reader/Binder record").
//!
//! A reader is owned by whichever span of the timeline created it: when
//! that span is spliced away the reader's `run` closure is dropped,
//! releasing every `Rc` it captured (source behaviors/events, nested
//! sub-readers, memo tables). Disposal never removes the arena slot
//! itself, mirroring [`crate::timeline::Timeline`]'s own choice not to
//! reclaim spliced-out nodes: only the live resources need to go.

use crate::timeline::Timestamp;

/// Opaque handle to a reader registered with a [`crate::Runtime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderId(pub(crate) u64);

pub(crate) struct ReaderSlot {
	pub(crate) start_ts: Timestamp,
	pub(crate) end_ts: Timestamp,
	pub(crate) run: Option<Box<dyn FnMut()>>,
	pub(crate) enqueued: bool,
}

impl ReaderSlot {
	pub(crate) fn new(start_ts: Timestamp, run: Box<dyn FnMut()>) -> Self {
		Self {
			start_ts,
			end_ts: start_ts,
			run: Some(run),
			enqueued: false,
		}
	}
}

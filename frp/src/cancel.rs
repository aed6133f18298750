//! The cancel handle returned by the `_cancel` notifier variants
//! (`spec.md` §4.E/§4.F, §5 "Cancellation"). Cancelling exactly once
//! removes the listener; cancelling again is a no-op.

use std::{cell::RefCell, rc::Rc};

struct Inner {
	remove: Option<Box<dyn FnOnce()>>,
}

/// A handle that removes a single listener/notifier registration.
///
/// Cloning a `Cancel` clones the handle: calling `cancel` on any clone
/// removes the registration, and every other clone's subsequent `cancel`
/// call is then a no-op.
#[derive(Clone)]
pub struct Cancel(Rc<RefCell<Inner>>);

impl Cancel {
	pub(crate) fn new(remove: impl FnOnce() + 'static) -> Self {
		Self(Rc::new(RefCell::new(Inner { remove: Some(Box::new(remove)) })))
	}

	/// Removes the registration this handle guards. A no-op if already
	/// cancelled.
	pub fn cancel(&self) {
		if let Some(remove) = self.0.borrow_mut().remove.take() {
			remove();
		}
	}

	/// `true` if this handle's registration has already been removed,
	/// whether by [`Cancel::cancel`] or because its scope was spliced.
	#[must_use]
	pub fn is_cancelled(&self) -> bool {
		self.0.borrow().remove.is_none()
	}
}

//! Component F: the event channel (`spec.md` §3, §4.F).
//!
//! A [`Channel`] is a read-only handle onto a shared listener list; a
//! [`Sender`] is the paired capability that can actually publish to it
//! (`spec.md` §6 "Sender/channel split"). Every derived combinator
//! (`map`, `filter`, `merge`, `collect`, `next`) is built by attaching a
//! permanent listener that forwards into a freshly allocated channel —
//! none of them go back through [`Runtime::enqueue_event`], since they run
//! synchronously inside the same event-phase delivery as their source
//! (`spec.md` §4.C/§4.D).

use std::{cell::RefCell, rc::Rc};

use frp_runtime::Runtime;

use crate::{
	cancel::Cancel,
	error::Outcome,
};

type Listener<T> = Rc<RefCell<dyn FnMut(&Outcome<T>)>>;

struct ChannelInner<T> {
	listeners: Vec<(u64, Listener<T>)>,
	next_listener_id: u64,
}

/// A discrete stream of results (`spec.md` §3 "F Event channel").
pub struct Channel<T: 'static> {
	pub(crate) runtime: Runtime,
	inner: Rc<RefCell<ChannelInner<T>>>,
}

impl<T> Clone for Channel<T> {
	fn clone(&self) -> Self {
		Self { runtime: self.runtime.clone(), inner: Rc::clone(&self.inner) }
	}
}

impl<T: 'static> Channel<T> {
	pub(crate) fn new(runtime: Runtime) -> Self {
		Self { runtime, inner: Rc::new(RefCell::new(ChannelInner { listeners: Vec::new(), next_listener_id: 0 })) }
	}

	/// A stable identity hash for this channel, suitable for
	/// [`crate::memo::Memo`] keys (`spec.md` §4.G `hash_event`).
	#[must_use]
	pub fn hash_event(&self) -> u64 {
		Rc::as_ptr(&self.inner) as *const () as u64
	}

	/// The runtime this channel belongs to.
	#[must_use]
	pub fn runtime(&self) -> &Runtime {
		&self.runtime
	}

	/// Attaches a permanent listener, returning a handle that removes it.
	/// Used internally by every derived combinator; `Cancel` is exposed
	/// publicly through [`notify_e_cancel`]/[`notify_result_e_cancel`].
	pub(crate) fn attach(&self, f: impl FnMut(&Outcome<T>) + 'static) -> Cancel {
		let id = {
			let mut inner = self.inner.borrow_mut();
			let id = inner.next_listener_id;
			inner.next_listener_id += 1;
			inner.listeners.push((id, Rc::new(RefCell::new(f))));
			id
		};
		let inner = Rc::clone(&self.inner);
		Cancel::new(move || inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id))
	}

	/// Delivers `result` to every currently-registered listener, in
	/// registration order (`spec.md` §4.C, §5 "Ordering"). Listener
	/// panics are swallowed by the caller (the propagator's event phase
	/// wraps the whole delivery in `catch_unwind`), not here.
	pub(crate) fn deliver(&self, result: &Outcome<T>) {
		let listeners = self.inner.borrow().listeners.clone();
		for (_, listener) in listeners {
			(listener.borrow_mut())(result);
		}
	}
}

/// A capability token for publishing to a [`Channel`]; the channel itself
/// cannot publish (`spec.md` §6 "Sender/channel split").
pub struct Sender<T: 'static> {
	channel: Channel<T>,
}

impl<T> Clone for Sender<T> {
	fn clone(&self) -> Self {
		Self { channel: self.channel.clone() }
	}
}

/// Allocates a channel and its paired sender (`spec.md` §4.F `make_event`).
#[must_use]
pub fn make_event<T: 'static>(runtime: &Runtime) -> (Channel<T>, Sender<T>) {
	let channel = Channel::new(runtime.clone());
	let sender = Sender { channel: channel.clone() };
	(channel, sender)
}

/// A channel that never fires: a freshly allocated channel whose sender is
/// dropped immediately (`spec.md` §4.F `never`).
#[must_use]
pub fn never<T: 'static>(runtime: &Runtime) -> Channel<T> {
	let (channel, _sender) = make_event(runtime);
	channel
}

/// Enqueues `Ok(value)` for delivery, starting a propagation cycle if none
/// is already running (`spec.md` §4.F `send`).
pub fn send<T: Clone + 'static>(sender: &Sender<T>, value: T) {
	send_result(sender, Ok(value));
}

/// Enqueues `Err(error)` for delivery (`spec.md` §4.F `send_exn`).
pub fn send_exn<T: Clone + 'static>(sender: &Sender<T>, error: crate::error::Failure) {
	send_result(sender, Err(error));
}

/// Enqueues `result` for delivery (`spec.md` §4.F `send_result`).
pub fn send_result<T: Clone + 'static>(sender: &Sender<T>, result: Outcome<T>) {
	let channel = sender.channel.clone();
	sender.channel.runtime.clone().enqueue_event(Box::new(move || channel.deliver(&result)));
}

fn notify_result_e_impl<T: 'static>(e: &Channel<T>, f: impl FnMut(&Outcome<T>) + 'static, scoped: bool) -> Option<Cancel> {
	let cancel = e.attach(f);
	if scoped {
		if e.runtime.current_reader().is_some() {
			let cancel_for_cleanup = cancel.clone();
			let _ = e.runtime.add_cleanup(e.runtime.now(), move || cancel_for_cleanup.cancel());
		}
		None
	} else {
		Some(cancel)
	}
}

/// Registers `f` to run with every value `e` fires. If called inside a
/// reader, the registration is removed when that reader's span is
/// released (`spec.md` §4.F `notify_e`). Failures are unwrapped silently,
/// symmetric with [`crate::behavior::notify_b`].
pub fn notify_e<T: 'static>(e: &Channel<T>, mut f: impl FnMut(&T) + 'static) {
	notify_result_e_impl(
		e,
		move |result: &Outcome<T>| {
			if let Ok(value) = result {
				f(value);
			}
		},
		true,
	);
}

/// Cancellable variant of [`notify_e`] (`spec.md` §4.F `notify_e_cancel`).
#[must_use]
pub fn notify_e_cancel<T: 'static>(e: &Channel<T>, mut f: impl FnMut(&T) + 'static) -> Cancel {
	notify_result_e_impl(
		e,
		move |result: &Outcome<T>| {
			if let Ok(value) = result {
				f(value);
			}
		},
		false,
	)
	.expect("notify_result_e_impl(.., scoped = false) always returns Some")
}

/// Like [`notify_e`], but `f` receives the full [`Outcome`]
/// (`spec.md` §4.F `notify_result_e`).
pub fn notify_result_e<T: 'static>(e: &Channel<T>, f: impl FnMut(&Outcome<T>) + 'static) {
	notify_result_e_impl(e, f, true);
}

/// Cancellable variant of [`notify_result_e`].
#[must_use]
pub fn notify_result_e_cancel<T: 'static>(e: &Channel<T>, f: impl FnMut(&Outcome<T>) + 'static) -> Cancel {
	notify_result_e_impl(e, f, false).expect("notify_result_e_impl(.., scoped = false) always returns Some")
}

/// A new channel forwarding `f(v)` for every `Ok(v)` `e` fires; failures
/// pass through unchanged (`spec.md` §4.F `map`).
#[must_use]
pub fn map<A: 'static, B: 'static>(e: &Channel<A>, mut f: impl FnMut(&A) -> B + 'static) -> Channel<B> {
	let out = Channel::new(e.runtime.clone());
	let out2 = out.clone();
	let _ = e.attach(move |result: &Outcome<A>| {
		let mapped = match result {
			Ok(v) => Ok(f(v)),
			Err(err) => Err(Rc::clone(err)),
		};
		out2.deliver(&mapped);
	});
	out
}

/// A new channel forwarding only the `Ok(v)` for which `p(v)` holds;
/// failures pass through unchanged (`spec.md` §4.F `filter`).
#[must_use]
pub fn filter<T: Clone + 'static>(e: &Channel<T>, mut p: impl FnMut(&T) -> bool + 'static) -> Channel<T> {
	let out = Channel::new(e.runtime.clone());
	let out2 = out.clone();
	let _ = e.attach(move |result: &Outcome<T>| match result {
		Ok(v) if p(v) => out2.deliver(&Ok(v.clone())),
		Ok(_) => {}
		Err(err) => out2.deliver(&Err(Rc::clone(err))),
	});
	out
}

/// A new channel firing everything any of `inputs` fires, preserving each
/// input's own delivery order across the merged stream (`spec.md` §4.F
/// `merge`).
#[must_use]
pub fn merge<T: 'static>(inputs: &[Channel<T>]) -> Channel<T> {
	assert!(!inputs.is_empty(), "merge requires at least one input channel");
	let out = Channel::new(inputs[0].runtime.clone());
	for input in inputs {
		let out2 = out.clone();
		let _ = input.attach(move |result: &Outcome<T>| out2.deliver(result));
	}
	out
}

/// A new channel of running accumulator values: `acc` starts at `init` and
/// becomes `f(&acc, v)` each time `e` fires `Ok(v)`; failures pass through
/// unchanged and do not update the accumulator (`spec.md` §4.F `collect`).
#[must_use]
pub fn collect<A: 'static, Acc: Clone + 'static>(e: &Channel<A>, init: Acc, mut f: impl FnMut(&Acc, &A) -> Acc + 'static) -> Channel<Acc> {
	let out = Channel::new(e.runtime.clone());
	let out2 = out.clone();
	let acc = Rc::new(RefCell::new(init));
	let _ = e.attach(move |result: &Outcome<A>| match result {
		Ok(v) => {
			let next = f(&acc.borrow(), v);
			*acc.borrow_mut() = next.clone();
			out2.deliver(&Ok(next));
		}
		Err(err) => out2.deliver(&Err(Rc::clone(err))),
	});
	out
}

/// A new channel that fires exactly once — on `e`'s next delivery — and
/// then cancels its own subscription to `e` (`spec.md` §4.F `next`).
#[must_use]
pub fn next<T: 'static>(e: &Channel<T>) -> Channel<T> {
	let out = Channel::new(e.runtime.clone());
	let out2 = out.clone();
	let cancel_slot: Rc<RefCell<Option<Cancel>>> = Rc::new(RefCell::new(None));
	let cancel_slot2 = Rc::clone(&cancel_slot);
	let cancel = e.attach(move |result: &Outcome<T>| {
		out2.deliver(result);
		if let Some(c) = cancel_slot2.borrow_mut().take() {
			c.cancel();
		}
	});
	*cancel_slot.borrow_mut() = Some(cancel);
	out
}

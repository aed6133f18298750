//! Component H: the memo table used to reuse work across incarnations of
//! a recurring computation (typically one `bind`/`lift` closure's body,
//! called again on every re-run of its enclosing reader).
//!
//! A [`Memo`] records `(key hash, value)` pairs in call order. Each
//! incarnation is expected to call [`Memo::get`] the same number of
//! times, in the same order, as the previous one — the i-th call of one
//! run lines up against the i-th call of the next. If the key at that
//! position matches, the previous value is reused and nothing is
//! rebuilt; if it doesn't (or the previous run never reached that
//! position), the memo discards everything from there on and rebuilds.
//! [`Behavior::hash_behavior`](crate::behavior::Behavior::hash_behavior)
//! and
//! [`Channel::hash_event`](crate::event::Channel::hash_event) exist to
//! supply that key hash when the value being memoized is itself a
//! behavior or event built from one.

use std::cell::{Cell, RefCell};

/// A positional cache of `(key hash, value)` pairs, reset once per
/// incarnation with [`Memo::reset`].
pub struct Memo<V> {
	entries: RefCell<Vec<(u64, V)>>,
	position: Cell<usize>,
}

impl<V> Default for Memo<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> Memo<V> {
	/// An empty memo, cursor at position 0.
	#[must_use]
	pub fn new() -> Self {
		Self { entries: RefCell::new(Vec::new()), position: Cell::new(0) }
	}

	/// Rewinds the call-position cursor to the start, without discarding
	/// any recorded entries. Call this once at the start of each
	/// incarnation, before the first [`Memo::get`] of that run.
	pub fn reset(&self) {
		self.position.set(0);
	}

	/// How many entries are currently recorded (not the cursor position).
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// `true` if no entry has ever been recorded.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl<V: Clone> Memo<V> {
	/// Looks up the entry at the current call position. If it exists and
	/// its recorded key hash equals `key_hash`, returns a clone of the
	/// recorded value without calling `build`. Otherwise discards that
	/// entry and every one after it, calls `build` to produce a fresh
	/// value, records it at this position, and returns it. Either way,
	/// advances the cursor by one for the next call.
	pub fn get(&self, key_hash: u64, build: impl FnOnce() -> V) -> V {
		let pos = self.position.get();
		self.position.set(pos + 1);

		{
			let entries = self.entries.borrow();
			if let Some((hash, value)) = entries.get(pos) {
				if *hash == key_hash {
					return value.clone();
				}
			}
		}

		self.entries.borrow_mut().truncate(pos);
		let value = build();
		self.entries.borrow_mut().push((key_hash, value.clone()));
		value
	}
}


//! Change events and listener bookkeeping.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::CapabilityKind;

/// Direction of a capability change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityChange {
	Attached,
	Detached,
}

/// Announces that one capability of a mode was attached or detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeChangeEvent {
	/// [`CapabilityKind::NAME`] of the affected capability.
	pub capability: &'static str,
	pub change: CapabilityChange,
}

impl ModeChangeEvent {
	pub fn attached<K: CapabilityKind>() -> Self {
		Self {
			capability: K::NAME,
			change: CapabilityChange::Attached,
		}
	}

	pub fn detached<K: CapabilityKind>() -> Self {
		Self {
			capability: K::NAME,
			change: CapabilityChange::Detached,
		}
	}

	/// Returns true if this event concerns capability kind `K`.
	pub fn affects<K: CapabilityKind>(&self) -> bool {
		self.capability == K::NAME
	}
}

/// Callback invoked for every change event.
pub type ChangeListener = Arc<dyn Fn(&ModeChangeEvent) + Send + Sync>;

#[derive(Default)]
struct ListenerList {
	next_id: u64,
	entries: Vec<(u64, ChangeListener)>,
	/// Set while some `emit` call is draining `queue`.
	emitting: bool,
	queue: VecDeque<ModeChangeEvent>,
}

/// Synchronous, ordered event channel.
///
/// Listeners run in registration order, after the internal lock has been
/// released, so a listener may subscribe, emit or touch the owning mode.
///
/// An event emitted while another is being delivered is queued and
/// delivered by the outer `emit` once every listener has seen the current
/// event. Every listener therefore observes events in emission order.
#[derive(Default)]
pub(crate) struct ChangeEmitter {
	listeners: Arc<Mutex<ListenerList>>,
}

impl ChangeEmitter {
	pub fn subscribe(&self, listener: ChangeListener) -> Subscription {
		let mut list = self.listeners.lock();
		let id = list.next_id;
		list.next_id += 1;
		list.entries.push((id, listener));
		Subscription {
			id,
			listeners: Some(Arc::downgrade(&self.listeners)),
		}
	}

	pub fn emit(&self, event: &ModeChangeEvent) {
		{
			let mut list = self.listeners.lock();
			list.queue.push_back(*event);
			if list.emitting {
				return;
			}
			list.emitting = true;
		}

		let _drain = DrainGuard(&self.listeners);
		loop {
			let (event, listeners) = {
				let mut list = self.listeners.lock();
				let Some(event) = list.queue.pop_front() else {
					return;
				};
				let listeners: Vec<ChangeListener> = list.entries.iter().map(|(_, l)| Arc::clone(l)).collect();
				(event, listeners)
			};
			for listener in listeners {
				listener(&event);
			}
		}
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.lock().entries.len()
	}
}

/// Ends a drain, including one unwound by a panicking listener.
struct DrainGuard<'a>(&'a Mutex<ListenerList>);

impl Drop for DrainGuard<'_> {
	fn drop(&mut self) {
		let mut list = self.0.lock();
		list.emitting = false;
		list.queue.clear();
	}
}

/// Registration of a change listener.
///
/// Dropping the subscription removes the listener. Use [`Self::detach`] to
/// keep it registered for the lifetime of the emitter instead.
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
	id: u64,
	listeners: Option<Weak<Mutex<ListenerList>>>,
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).field("attached", &self.listeners.is_some()).finish()
	}
}

impl Subscription {
	/// Removes the listener now.
	pub fn dispose(self) {}

	/// Keeps the listener registered until the emitter is dropped.
	pub fn detach(mut self) {
		self.listeners = None;
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		let Some(listeners) = self.listeners.take().and_then(|weak| weak.upgrade()) else {
			return;
		};
		listeners.lock().entries.retain(|(id, _)| *id != self.id);
	}
}

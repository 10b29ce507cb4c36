// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback storage and dispatch.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::event::DeviceEvent;

/// Unique identifier for a registered callback.
///
/// Returned by registration and used to unsubscribe. IDs are never reused
/// within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type EventCallback = Arc<dyn Fn(&DeviceEvent) + Send + Sync>;

/// Ordered set of event callbacks.
///
/// Callbacks run in registration order. A callback that panics is logged
/// and skipped; the remaining callbacks still run and the panic never
/// reaches the caller of [`dispatch`](Self::dispatch).
///
/// Dispatch works on a copy of the callback list, so a callback may
/// register or unsubscribe callbacks without deadlocking. Such changes take
/// effect from the next event.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(SubscriptionId, EventCallback)>>,
    panics: AtomicU64,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(Vec::new()),
            panics: AtomicU64::new(0),
        }
    }

    /// Registers a callback, after every callback registered so far.
    pub fn register<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.write().push((id, Arc::new(callback)));
        id
    }

    /// Removes a callback.
    ///
    /// Returns `true` if the callback was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Returns how many callback invocations panicked so far.
    #[must_use]
    pub fn panic_count(&self) -> u64 {
        self.panics.load(Ordering::Relaxed)
    }

    /// Invokes every callback with `event`, in registration order.
    pub fn dispatch(&self, event: &DeviceEvent) {
        let callbacks: Vec<_> = self.callbacks.read().clone();

        for (id, callback) in callbacks {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(event))) {
                self.panics.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    subscription = %id,
                    device_id = %event.device_id(),
                    panic = panic_message(panic.as_ref()),
                    "Event callback panicked"
                );
            }
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &self.len())
            .field("panics", &self.panic_count())
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic>"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use parking_lot::Mutex;

    use super::*;
    use crate::types::DeviceId;

    fn event() -> DeviceEvent {
        DeviceEvent::Connected {
            device_id: DeviceId::new("SN1"),
        }
    }

    #[test]
    fn ids_are_unique() {
        let registry = CallbackRegistry::new();
        let a = registry.register(|_| {});
        let b = registry.register(|_| {});
        assert_ne!(a, b);
        assert!(b.value() > a.value());
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(CallbackRegistry::new().is_empty());
    }

    #[test]
    fn dispatch_in_registration_order() {
        let registry = CallbackRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..5 {
            let order = Arc::clone(&order);
            registry.register(move |_| order.lock().push(n));
        }

        registry.dispatch(&event());
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn panicking_callback_is_isolated() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let before = Arc::clone(&calls);
        registry.register(move |_| {
            before.fetch_add(1, Ordering::SeqCst);
        });
        registry.register(|_| panic!("boom"));
        let after = Arc::clone(&calls);
        registry.register(move |_| {
            after.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&event());
        registry.dispatch(&event());

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(registry.panic_count(), 2);
    }

    #[test]
    fn unsubscribe_removes_only_that_callback() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        let id = registry.register(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = Arc::clone(&calls);
        registry.register(move |_| {
            c.fetch_add(10, Ordering::SeqCst);
        });

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));

        registry.dispatch(&event());
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let slot = Arc::new(Mutex::new(None));

        let reg = Arc::clone(&registry);
        let own_id = Arc::clone(&slot);
        let id = registry.register(move |_| {
            if let Some(id) = *own_id.lock() {
                reg.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        registry.dispatch(&event());
        assert!(registry.is_empty());
    }

    #[test]
    fn panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "<non-string panic>");
    }
}

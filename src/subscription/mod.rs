// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback subscriptions.
//!
//! Callbacks receive every [`DeviceEvent`](crate::event::DeviceEvent)
//! synchronously, on the task that merged the update, in the order they
//! were registered. Keep them short; hand heavy work to a channel or use
//! [`Dispatcher::subscribe`](crate::Dispatcher::subscribe) instead.
//!
//! ```
//! use landroid_lib::subscription::CallbackRegistry;
//!
//! let registry = CallbackRegistry::new();
//! let id = registry.register(|event| println!("{:?}", event.device_id()));
//! assert!(registry.unsubscribe(id));
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};

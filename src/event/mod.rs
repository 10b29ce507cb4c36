// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events about tracked mowers.
//!
//! Every event is delivered to the dispatcher's registered callbacks and
//! published on its [`EventBus`] for async consumers.
//!
//! # Examples
//!
//! ```
//! use landroid_lib::event::{Anomaly, DeviceEvent, EventBus};
//! use landroid_lib::types::DeviceId;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::Anomaly {
//!     device_id: DeviceId::new("SN1"),
//!     anomaly: Anomaly::UnknownStatus(99),
//! });
//! ```

mod device_event;
mod event_bus;

pub use device_event::{Anomaly, DeviceEvent};
pub use event_bus::{DEFAULT_EVENT_CAPACITY, DeviceEvents, EventBus};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Landroid Lib - state synchronization for cloud-connected robotic mowers.
//!
//! This library keeps a consistent view of Worx, Kress and Landxcape mowers
//! from the partial JSON documents they push through the vendor cloud, and
//! validates commands against that view before they are sent.
//!
//! # Supported Features
//!
//! - **Status decoding**: Numeric status and error codes resolve to closed
//!   enums, with an `Unknown(code)` fallback instead of an error
//! - **Partial merges**: Each push carries a subset of fields; absent fields
//!   keep their previous value
//! - **Lifecycle tracking**: Status changes are classified as expected,
//!   anomalous or protocol drift
//! - **Command gating**: Commands that make no sense in the current state are
//!   rejected locally
//! - **Events**: Ordered callbacks and a broadcast stream per dispatcher
//!
//! The cloud connection itself is supplied by the application through the
//! [`protocol::Transport`] and [`protocol::CredentialStore`] traits.
//!
//! # Quick Start
//!
//! ```no_run
//! use landroid_lib::protocol::{StaticToken, Transport};
//! use landroid_lib::{DeviceEvent, DeviceInfo, Dispatcher};
//!
//! # async fn example(transport: impl Transport) -> landroid_lib::Result<()> {
//! let dispatcher = Dispatcher::builder(transport)
//!     .credentials(StaticToken::new("access-token"))
//!     .device(DeviceInfo::new("201923011234567").with_name("Front lawn"))
//!     .build();
//!
//! let mut events = dispatcher.subscribe();
//! let mower = dispatcher.connect(&"201923011234567".into()).await?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let DeviceEvent::StateTransition { transition, .. } = event {
//!         println!("now {}", transition.to);
//!         if mower.snapshot().has_fault() {
//!             dispatcher.home(mower.id()).await?;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Decoding Without a Dispatcher
//!
//! ```
//! use landroid_lib::state::{DeviceSnapshot, merge};
//! use landroid_lib::types::LifecycleState;
//! use landroid_lib::PartialUpdate;
//!
//! let update = PartialUpdate::from_payload(r#"{"dat":{"ls":7,"le":0}}"#).unwrap();
//! let outcome = merge(&DeviceSnapshot::new("SN1".into()), &update);
//!
//! assert_eq!(outcome.snapshot.lifecycle_state(), Some(LifecycleState::Cutting));
//! assert!(outcome.transition.is_some());
//! ```

mod capabilities;
pub mod command;
mod dispatcher;
pub mod error;
pub mod event;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod telemetry;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder};
pub use command::{Command, CommandKind, MowerCommand};
pub use dispatcher::{CommandOutcome, DeviceHandle, DeviceInfo, Dispatcher, DispatcherBuilder};
pub use error::{Error, ParseError, Result, TransportError, ValueError};
pub use event::{Anomaly, DeviceEvent, DeviceEvents, EventBus};
pub use state::{DeviceSnapshot, FieldChange, FieldGroup, MergeOutcome, PartialUpdate, StateTransition, TransitionKind};
pub use subscription::SubscriptionId;
pub use types::{BatteryPercent, ChargingState, DeviceId, ErrorCondition, GpsPosition, LifecycleState, Orientation};

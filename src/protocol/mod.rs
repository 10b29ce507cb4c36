// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams to the outside world.
//!
//! The library does not talk to the vendor cloud itself. A [`Transport`]
//! delivers commands and push messages, and a [`CredentialStore`] hands out
//! the bearer token commands are signed with. Both are supplied by the
//! application.
//!
//! # Implementing a transport
//!
//! ```
//! use landroid_lib::protocol::{CommandRequest, Transport};
//! use landroid_lib::state::PartialUpdate;
//! use landroid_lib::types::DeviceId;
//! use landroid_lib::TransportError;
//! use tokio::sync::mpsc;
//!
//! struct Offline;
//!
//! impl Transport for Offline {
//!     async fn send(&self, _: &DeviceId, _: &CommandRequest) -> Result<(), TransportError> {
//!         Err(TransportError::Offline)
//!     }
//!
//!     async fn subscribe(&self, _: &DeviceId) -> Result<mpsc::Receiver<PartialUpdate>, TransportError> {
//!         let (_tx, rx) = mpsc::channel(1);
//!         Ok(rx)
//!     }
//!
//!     async fn unsubscribe(&self, _: &DeviceId) {}
//! }
//! ```

mod credentials;

pub use credentials::{AuthToken, CredentialStore, StaticToken};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::command::CommandKind;
use crate::error::TransportError;
use crate::state::PartialUpdate;
use crate::types::DeviceId;

/// A command ready to be put on the wire.
///
/// The transport wraps `payload` in whatever envelope the cloud expects
/// (message id, serial number, timestamp) and authenticates with `token`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest {
    /// Kind of command, for logging.
    pub kind: CommandKind,
    /// JSON body of the command.
    pub payload: serde_json::Value,
    /// Bearer token to authenticate with.
    #[serde(skip)]
    pub token: AuthToken,
}

/// Delivers commands to mowers and push messages from them.
///
/// Transports should surface failures verbatim; the dispatcher never retries.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Sends a command to a device.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the command could not be delivered.
    async fn send(&self, device_id: &DeviceId, request: &CommandRequest) -> Result<(), TransportError>;

    /// Starts receiving push messages for a device.
    ///
    /// Updates must be delivered in the order the device sent them. Dropping
    /// the sender ends the subscription.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the subscription could not be set up.
    async fn subscribe(&self, device_id: &DeviceId) -> Result<mpsc::Receiver<PartialUpdate>, TransportError>;

    /// Stops receiving push messages for a device.
    async fn unsubscribe(&self, device_id: &DeviceId);
}

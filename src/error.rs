// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Landroid library.
//!
//! Local validation failures (unknown device, rejected state transition,
//! missing capability, out-of-range values) are returned synchronously from
//! the call that caused them. Transport failures are passed through verbatim.
//! Unrecognized status or error codes are never errors: they decode to an
//! `Unknown(code)` variant.

use thiserror::Error;

use crate::command::CommandKind;
use crate::types::{DeviceId, LifecycleState};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The device id was never enumerated on this dispatcher.
    #[error("unknown device: {0}")]
    UnknownDevice(DeviceId),

    /// The device is enumerated but not connected.
    #[error("device {0} is not connected")]
    NotConnected(DeviceId),

    /// The command is not valid in the device's current lifecycle state.
    ///
    /// The command was rejected locally and never reached the transport.
    #[error("cannot {command} while {}", state_label(.state.as_ref()))]
    InvalidStateTransition {
        /// The rejected command.
        command: CommandKind,
        /// The lifecycle state at the time of the check (`None` if never reported).
        state: Option<LifecycleState>,
    },

    /// The device does not support the requested feature.
    #[error("device does not support {0}")]
    CapabilityNotSupported(&'static str),

    /// Error reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while decoding a push payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

fn state_label(state: Option<&LifecycleState>) -> String {
    state.map_or_else(|| "state is unknown".to_string(), |s| format!("{s}"))
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// The requested zone has no starting point configured on the device.
    #[error("zone {0} is not defined on the device")]
    UndefinedZone(u8),

    /// The device has not reported its zone configuration yet.
    #[error("zone configuration has not been reported yet")]
    ZonesUnknown,

    /// A raw command was not a JSON object.
    #[error("raw command must be a JSON object")]
    RawCommandNotObject,
}

/// Errors reported by a [`Transport`](crate::protocol::Transport) or
/// [`CredentialStore`](crate::protocol::CredentialStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The remote endpoint could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The credentials were rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The device is offline and cannot receive commands.
    #[error("device is offline")]
    Offline,

    /// The remote endpoint rejected the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to decoding vendor push payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected payload format.
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn invalid_transition_display() {
        let err = Error::InvalidStateTransition {
            command: CommandKind::ZoneTraining,
            state: Some(LifecycleState::Cutting),
        };
        assert_eq!(err.to_string(), "cannot zone training while cutting");

        let err = Error::InvalidStateTransition {
            command: CommandKind::Pause,
            state: None,
        };
        assert_eq!(err.to_string(), "cannot pause while state is unknown");
    }

    #[test]
    fn error_from_transport_error() {
        let err: Error = TransportError::Offline.into();
        assert!(matches!(err, Error::Transport(TransportError::Offline)));
    }

    #[test]
    fn unknown_device_display() {
        let err = Error::UnknownDevice(DeviceId::new("20213019340000001234"));
        assert_eq!(err.to_string(), "unknown device: 20213019340000001234");
    }
}

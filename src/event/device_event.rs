// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use serde::Serialize;

use crate::state::{DeviceSnapshot, FieldChange, StateTransition};
use crate::types::DeviceId;

/// Something the library noticed about a push message that deserves
/// attention but is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Anomaly {
    /// The device reported a status code missing from the code table.
    UnknownStatus(i32),
    /// The device reported an error code missing from the code table.
    UnknownError(i32),
    /// A payload field was present but could not be decoded.
    RejectedField(String),
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStatus(code) => write!(f, "unknown status code {code}"),
            Self::UnknownError(code) => write!(f, "unknown error code {code}"),
            Self::RejectedField(field) => write!(f, "rejected field {field}"),
        }
    }
}

/// Events emitted by the dispatcher.
///
/// For one push message the dispatcher emits, in order: a `FieldUpdate` if
/// any field changed, a `StateTransition` if the lifecycle state changed,
/// then one `Anomaly` per oddity found.
///
/// # Examples
///
/// ```
/// use landroid_lib::event::DeviceEvent;
/// use landroid_lib::types::DeviceId;
///
/// let event = DeviceEvent::Connected { device_id: DeviceId::new("SN1") };
/// assert_eq!(event.device_id().as_str(), "SN1");
/// assert!(!event.is_transition());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DeviceEvent {
    /// One or more snapshot fields changed.
    FieldUpdate {
        /// The device.
        device_id: DeviceId,
        /// Fields whose value changed.
        changes: Vec<FieldChange>,
        /// The snapshot after the merge.
        snapshot: Box<DeviceSnapshot>,
    },

    /// The lifecycle state changed.
    StateTransition {
        /// The device.
        device_id: DeviceId,
        /// The transition.
        transition: StateTransition,
    },

    /// A push message contained something unexpected.
    Anomaly {
        /// The device.
        device_id: DeviceId,
        /// What was unexpected.
        anomaly: Anomaly,
    },

    /// The device was connected.
    Connected {
        /// The device.
        device_id: DeviceId,
    },

    /// The device was disconnected.
    Disconnected {
        /// The device.
        device_id: DeviceId,
    },
}

impl DeviceEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::FieldUpdate { device_id, .. }
            | Self::StateTransition { device_id, .. }
            | Self::Anomaly { device_id, .. }
            | Self::Connected { device_id }
            | Self::Disconnected { device_id } => device_id,
        }
    }

    /// Returns `true` if this is a lifecycle transition.
    #[must_use]
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::StateTransition { .. })
    }

    /// Returns the transition carried by this event, if any.
    #[must_use]
    pub fn transition(&self) -> Option<&StateTransition> {
        match self {
            Self::StateTransition { transition, .. } => Some(transition),
            _ => None,
        }
    }

    /// Returns the field changes carried by this event, if any.
    #[must_use]
    pub fn changes(&self) -> Option<&[FieldChange]> {
        match self {
            Self::FieldUpdate { changes, .. } => Some(changes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TransitionKind;
    use crate::types::LifecycleState;

    #[test]
    fn accessors() {
        let id = DeviceId::new("SN1");
        let event = DeviceEvent::StateTransition {
            device_id: id.clone(),
            transition: StateTransition {
                from: Some(LifecycleState::Idle),
                to: LifecycleState::Cutting,
                kind: TransitionKind::Expected,
            },
        };
        assert_eq!(event.device_id(), &id);
        assert!(event.is_transition());
        assert_eq!(
            event.transition().map(|t| t.to),
            Some(LifecycleState::Cutting)
        );
        assert!(event.changes().is_none());
    }

    #[test]
    fn anomaly_display() {
        assert_eq!(Anomaly::UnknownStatus(99).to_string(), "unknown status code 99");
        assert_eq!(
            Anomaly::RejectedField("dat.ls".into()).to_string(),
            "rejected field dat.ls"
        );
    }

    #[test]
    fn serializes_for_logging() {
        let event = DeviceEvent::Anomaly {
            device_id: DeviceId::new("SN1"),
            anomaly: Anomaly::UnknownError(42),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["Anomaly"]["anomaly"]["UnknownError"], 42);
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Individual field changes produced by a merge.
//!
//! A merge reports one [`FieldChange`] per snapshot field whose value
//! actually changed. Fields that were present in the update but already held
//! the same value produce no change.

use serde::{Deserialize, Serialize};

use crate::Capabilities;
use crate::types::{
    BatteryPercent, ChargingState, ErrorCondition, GpsPosition, LifecycleState, Orientation,
};

use super::FieldGroup;

/// A change to one snapshot field, carrying the new value.
///
/// # Examples
///
/// ```
/// use landroid_lib::state::{FieldChange, FieldGroup};
/// use landroid_lib::types::LifecycleState;
///
/// let change = FieldChange::Status(LifecycleState::Cutting);
/// assert_eq!(change.group(), FieldGroup::Status);
/// assert!(change.is_status());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldChange {
    /// Lifecycle state changed.
    Status(LifecycleState),
    /// Error condition changed.
    Error(ErrorCondition),
    /// Lock flag changed.
    Locked(bool),
    /// Schedule flag changed.
    ScheduleEnabled(bool),
    /// Party mode flag changed.
    PartyModeEnabled(bool),
    /// Current zone index changed.
    ZoneIndex(u8),
    /// Zone sequence changed.
    ZoneSequence(Vec<u8>),
    /// Zone starting points changed.
    ZoneStarts(Vec<u16>),
    /// Battery level changed.
    BatteryPercent(BatteryPercent),
    /// Charging state changed.
    BatteryCharging(ChargingState),
    /// Battery temperature changed, in °C.
    BatteryTemperature(f64),
    /// Battery voltage changed.
    BatteryVoltage(f64),
    /// Charge cycle counter changed.
    BatteryChargeCycles(u32),
    /// Wi-Fi signal strength changed.
    Rssi(i32),
    /// Rain delay changed.
    RainDelay(u32),
    /// Rain sensor flag changed.
    RainSensor(bool),
    /// Remaining rain delay changed.
    RainDelayRemaining(u32),
    /// New capabilities were detected. Carries the accumulated set.
    Capabilities(Capabilities),
    /// GPS fix changed.
    Position(GpsPosition),
    /// Orientation changed.
    Orientation(Orientation),
    /// Torque adjustment changed.
    Torque(i32),
    /// Schedule time extension changed.
    TimeExtension(i32),
}

impl FieldChange {
    /// Returns the freshness group of the changed field.
    #[must_use]
    pub const fn group(&self) -> FieldGroup {
        match self {
            Self::Status(_) => FieldGroup::Status,
            Self::Error(_) => FieldGroup::Error,
            Self::Locked(_) => FieldGroup::Lock,
            Self::ScheduleEnabled(_) | Self::PartyModeEnabled(_) | Self::TimeExtension(_) => {
                FieldGroup::Schedule
            },
            Self::ZoneIndex(_) | Self::ZoneSequence(_) | Self::ZoneStarts(_) => FieldGroup::Zone,
            Self::BatteryPercent(_)
            | Self::BatteryCharging(_)
            | Self::BatteryTemperature(_)
            | Self::BatteryVoltage(_)
            | Self::BatteryChargeCycles(_) => FieldGroup::Battery,
            Self::Rssi(_) => FieldGroup::Link,
            Self::RainDelay(_) | Self::RainSensor(_) | Self::RainDelayRemaining(_) => {
                FieldGroup::Rain
            },
            Self::Capabilities(_) => FieldGroup::Capabilities,
            Self::Position(_) => FieldGroup::Position,
            Self::Orientation(_) => FieldGroup::Orientation,
            Self::Torque(_) => FieldGroup::Torque,
        }
    }

    /// Returns `true` if this is a lifecycle status change.
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status(_))
    }

    /// Returns `true` if this is an error condition change.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns `true` if this is a battery change.
    #[must_use]
    pub const fn is_battery(&self) -> bool {
        matches!(
            self,
            Self::BatteryPercent(_)
                | Self::BatteryCharging(_)
                | Self::BatteryTemperature(_)
                | Self::BatteryVoltage(_)
                | Self::BatteryChargeCycles(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups() {
        assert_eq!(FieldChange::Locked(true).group(), FieldGroup::Lock);
        assert_eq!(
            FieldChange::PartyModeEnabled(true).group(),
            FieldGroup::Schedule
        );
        assert_eq!(FieldChange::ZoneStarts(vec![0; 4]).group(), FieldGroup::Zone);
        assert_eq!(FieldChange::RainSensor(false).group(), FieldGroup::Rain);
        assert_eq!(FieldChange::TimeExtension(-10).group(), FieldGroup::Schedule);
        assert_eq!(FieldChange::BatteryVoltage(19.8).group(), FieldGroup::Battery);
        assert_eq!(
            FieldChange::Orientation(Orientation::new(0.0, 0.0, 45.0)).group(),
            FieldGroup::Orientation
        );
        assert_eq!(FieldChange::Torque(10).group(), FieldGroup::Torque);
    }

    #[test]
    fn predicates() {
        assert!(FieldChange::Error(ErrorCondition::Lifted).is_error());
        assert!(!FieldChange::Error(ErrorCondition::Lifted).is_status());
        assert!(FieldChange::BatteryCharging(ChargingState::Charging).is_battery());
        assert!(FieldChange::BatteryChargeCycles(412).is_battery());
        assert!(!FieldChange::Torque(0).is_battery());
    }
}

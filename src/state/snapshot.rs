// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merged view of one device.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Capabilities;
use crate::types::{
    BatteryPercent, ChargingState, DeviceId, ErrorCondition, GpsPosition, LifecycleState, Orientation,
};

use super::FieldGroup;
use super::machine::StateCategory;

/// Tracked state of a mower.
///
/// Every field is `None` until a push message reports it. The snapshot is
/// owned by the dispatcher; callers only ever see clones, so nothing a
/// caller does with a returned snapshot can reach the live state.
///
/// # Examples
///
/// ```
/// use landroid_lib::state::{DeviceSnapshot, PartialUpdate, merge};
/// use landroid_lib::types::{DeviceId, LifecycleState};
///
/// let snapshot = DeviceSnapshot::new(DeviceId::new("SN1"));
/// assert_eq!(snapshot.lifecycle_state(), None);
///
/// let outcome = merge(&snapshot, &PartialUpdate::builder().status(1).build());
/// assert_eq!(outcome.snapshot.lifecycle_state(), Some(LifecycleState::Home));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub(crate) device_id: DeviceId,
    pub(crate) lifecycle_state: Option<LifecycleState>,
    pub(crate) error_condition: Option<ErrorCondition>,
    pub(crate) is_locked: Option<bool>,
    pub(crate) schedule_enabled: Option<bool>,
    pub(crate) party_mode_enabled: Option<bool>,
    pub(crate) current_zone_index: Option<u8>,
    pub(crate) zone_sequence: Option<Vec<u8>>,
    pub(crate) zone_starts: Option<Vec<u16>>,
    pub(crate) battery_percent: Option<BatteryPercent>,
    pub(crate) battery_charging: Option<ChargingState>,
    pub(crate) battery_temperature: Option<f64>,
    pub(crate) battery_voltage: Option<f64>,
    pub(crate) battery_charge_cycles: Option<u32>,
    pub(crate) rssi: Option<i32>,
    pub(crate) rain_delay_minutes: Option<u32>,
    pub(crate) rain_sensor_triggered: Option<bool>,
    pub(crate) rain_delay_remaining: Option<u32>,
    pub(crate) capabilities: Capabilities,
    pub(crate) position: Option<GpsPosition>,
    pub(crate) orientation: Option<Orientation>,
    pub(crate) torque: Option<i32>,
    pub(crate) time_extension: Option<i32>,
    pub(crate) last_updated: BTreeMap<FieldGroup, DateTime<Utc>>,
    pub(crate) raw_last_payload: Option<serde_json::Value>,
}

impl DeviceSnapshot {
    /// Creates an empty snapshot for a device.
    #[must_use]
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            lifecycle_state: None,
            error_condition: None,
            is_locked: None,
            schedule_enabled: None,
            party_mode_enabled: None,
            current_zone_index: None,
            zone_sequence: None,
            zone_starts: None,
            battery_percent: None,
            battery_charging: None,
            battery_temperature: None,
            battery_voltage: None,
            battery_charge_cycles: None,
            rssi: None,
            rain_delay_minutes: None,
            rain_sensor_triggered: None,
            rain_delay_remaining: None,
            capabilities: Capabilities::default(),
            position: None,
            orientation: None,
            torque: None,
            time_extension: None,
            last_updated: BTreeMap::new(),
            raw_last_payload: None,
        }
    }

    /// The device this snapshot belongs to.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle_state(&self) -> Option<LifecycleState> {
        self.lifecycle_state
    }

    /// Category of the current lifecycle state.
    #[must_use]
    pub fn category(&self) -> StateCategory {
        StateCategory::of(self.lifecycle_state)
    }

    /// Current error condition.
    #[must_use]
    pub fn error_condition(&self) -> Option<ErrorCondition> {
        self.error_condition
    }

    /// Returns `true` if the device reports a fault.
    #[must_use]
    pub fn has_fault(&self) -> bool {
        self.error_condition.is_some_and(|e| e.is_fault())
    }

    /// Whether the device is locked.
    #[must_use]
    pub fn is_locked(&self) -> Option<bool> {
        self.is_locked
    }

    /// Whether the mowing schedule is enabled.
    #[must_use]
    pub fn schedule_enabled(&self) -> Option<bool> {
        self.schedule_enabled
    }

    /// Whether party mode is enabled.
    #[must_use]
    pub fn party_mode_enabled(&self) -> Option<bool> {
        self.party_mode_enabled
    }

    /// Index into the zone sequence currently in use.
    #[must_use]
    pub fn current_zone_index(&self) -> Option<u8> {
        self.current_zone_index
    }

    /// Zone currently being mowed, resolved through the zone sequence.
    #[must_use]
    pub fn current_zone(&self) -> Option<u8> {
        let index = usize::from(self.current_zone_index?);
        self.zone_sequence.as_ref()?.get(index).copied()
    }

    /// Zone sequence (`mzv`).
    #[must_use]
    pub fn zone_sequence(&self) -> Option<&[u8]> {
        self.zone_sequence.as_deref()
    }

    /// Zone starting points (`mz`).
    #[must_use]
    pub fn zone_starts(&self) -> Option<&[u16]> {
        self.zone_starts.as_deref()
    }

    /// Battery level.
    #[must_use]
    pub fn battery_percent(&self) -> Option<BatteryPercent> {
        self.battery_percent
    }

    /// Charging state.
    #[must_use]
    pub fn battery_charging(&self) -> Option<ChargingState> {
        self.battery_charging
    }

    /// Battery temperature in °C.
    #[must_use]
    pub fn battery_temperature(&self) -> Option<f64> {
        self.battery_temperature
    }

    /// Battery voltage.
    #[must_use]
    pub fn battery_voltage(&self) -> Option<f64> {
        self.battery_voltage
    }

    /// Total charge cycles.
    #[must_use]
    pub fn battery_charge_cycles(&self) -> Option<u32> {
        self.battery_charge_cycles
    }

    /// Wi-Fi signal strength in dBm.
    #[must_use]
    pub fn rssi(&self) -> Option<i32> {
        self.rssi
    }

    /// Configured rain delay in minutes.
    #[must_use]
    pub fn rain_delay_minutes(&self) -> Option<u32> {
        self.rain_delay_minutes
    }

    /// Whether the rain sensor is triggered.
    #[must_use]
    pub fn rain_sensor_triggered(&self) -> Option<bool> {
        self.rain_sensor_triggered
    }

    /// Minutes left before mowing resumes after rain.
    #[must_use]
    pub fn rain_delay_remaining(&self) -> Option<u32> {
        self.rain_delay_remaining
    }

    /// Capabilities detected so far.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Last GPS fix.
    #[must_use]
    pub fn position(&self) -> Option<GpsPosition> {
        self.position
    }

    /// Pitch, roll and yaw.
    #[must_use]
    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    /// Wheel torque adjustment in percent.
    #[must_use]
    pub fn torque(&self) -> Option<i32> {
        self.torque
    }

    /// Schedule time extension in percent.
    #[must_use]
    pub fn time_extension(&self) -> Option<i32> {
        self.time_extension
    }

    /// When a field group was last reported, if ever.
    #[must_use]
    pub fn last_updated(&self, group: FieldGroup) -> Option<DateTime<Utc>> {
        self.last_updated.get(&group).copied()
    }

    /// Most recent update time across all field groups.
    #[must_use]
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_updated.values().max().copied()
    }

    /// The last raw payload merged into this snapshot.
    #[must_use]
    pub fn raw_last_payload(&self) -> Option<&serde_json::Value> {
        self.raw_last_payload.as_ref()
    }

    /// Returns `true` if no field was ever reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_updated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_is_unknown_everywhere() {
        let snapshot = DeviceSnapshot::new(DeviceId::new("SN1"));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.lifecycle_state(), None);
        assert_eq!(snapshot.error_condition(), None);
        assert_eq!(snapshot.battery_percent(), None);
        assert_eq!(snapshot.position(), None);
        assert_eq!(snapshot.torque(), None);
        assert_eq!(snapshot.category(), StateCategory::Indeterminate);
        assert!(!snapshot.has_fault());
        assert!(snapshot.last_seen().is_none());
    }

    #[test]
    fn current_zone_resolves_through_sequence() {
        let mut snapshot = DeviceSnapshot::new(DeviceId::new("SN1"));
        snapshot.zone_sequence = Some(vec![0, 0, 1, 1, 2, 2, 3, 3, 0, 0]);
        snapshot.current_zone_index = Some(4);
        assert_eq!(snapshot.current_zone(), Some(2));

        snapshot.current_zone_index = Some(12);
        assert_eq!(snapshot.current_zone(), None);
    }

    #[test]
    fn clone_is_detached() {
        let original = DeviceSnapshot::new(DeviceId::new("SN1"));
        let mut copy = original.clone();
        copy.lifecycle_state = Some(LifecycleState::Cutting);
        assert_eq!(original.lifecycle_state(), None);
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sparse updates carried by push messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Capabilities;
use crate::types::{BatteryPercent, ChargingState, DeviceId, GpsPosition, Orientation};

/// Group of related snapshot fields sharing one freshness timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldGroup {
    /// Lifecycle status.
    Status,
    /// Error condition.
    Error,
    /// Lock flag.
    Lock,
    /// Schedule, party mode and time extension.
    Schedule,
    /// Zone index and zone configuration.
    Zone,
    /// Battery level, charging state and battery health.
    Battery,
    /// Wi-Fi link quality.
    Link,
    /// Rain sensor and rain delay.
    Rain,
    /// Detected capabilities.
    Capabilities,
    /// GPS fix.
    Position,
    /// Pitch, roll and yaw.
    Orientation,
    /// Wheel torque setting.
    Torque,
}

/// One push message, reduced to the fields it actually carried.
///
/// Only fields that are present are authoritative for the message; absent
/// fields say nothing about the device. Updates are immutable once built.
/// The receive timestamp is fixed at construction, so applying the same
/// update twice produces the same snapshot.
///
/// # Examples
///
/// ```
/// use landroid_lib::state::PartialUpdate;
///
/// let update = PartialUpdate::builder().status(7).battery_percent(81).build();
/// assert_eq!(update.status(), Some(7));
/// assert_eq!(update.error(), None);
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialUpdate {
    pub(crate) status: Option<i32>,
    pub(crate) error: Option<i32>,
    pub(crate) locked: Option<bool>,
    pub(crate) schedule_enabled: Option<bool>,
    pub(crate) party_mode_enabled: Option<bool>,
    pub(crate) zone_index: Option<u8>,
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
    pub(crate) capabilities: Option<Capabilities>,
    pub(crate) position: Option<GpsPosition>,
    pub(crate) orientation: Option<Orientation>,
    pub(crate) torque: Option<i32>,
    pub(crate) time_extension: Option<i32>,
    pub(crate) serial_number: Option<DeviceId>,
    pub(crate) raw: Option<serde_json::Value>,
    pub(crate) received_at: DateTime<Utc>,
    pub(crate) rejected_fields: Vec<String>,
}

impl PartialUpdate {
    /// Creates a builder stamped with the current time.
    #[must_use]
    pub fn builder() -> PartialUpdateBuilder {
        PartialUpdateBuilder::new()
    }

    /// Raw vendor status code.
    #[must_use]
    pub fn status(&self) -> Option<i32> {
        self.status
    }

    /// Raw vendor error code.
    #[must_use]
    pub fn error(&self) -> Option<i32> {
        self.error
    }

    /// Lock flag.
    #[must_use]
    pub fn locked(&self) -> Option<bool> {
        self.locked
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

    /// Index into the zone sequence the mower is currently using.
    #[must_use]
    pub fn zone_index(&self) -> Option<u8> {
        self.zone_index
    }

    /// Zone sequence (`mzv`).
    #[must_use]
    pub fn zone_sequence(&self) -> Option<&[u8]> {
        self.zone_sequence.as_deref()
    }

    /// Zone starting points in meters along the wire (`mz`).
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

    /// Whether the rain sensor is currently triggered.
    #[must_use]
    pub fn rain_sensor_triggered(&self) -> Option<bool> {
        self.rain_sensor_triggered
    }

    /// Minutes left before mowing resumes after rain.
    #[must_use]
    pub fn rain_delay_remaining(&self) -> Option<u32> {
        self.rain_delay_remaining
    }

    /// Capabilities detected from this message.
    #[must_use]
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.capabilities
    }

    /// GPS fix, for mowers with a cellular module.
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

    /// Serial number the message was addressed from, if it carried one.
    #[must_use]
    pub fn serial_number(&self) -> Option<&DeviceId> {
        self.serial_number.as_ref()
    }

    /// The payload this update was decoded from.
    #[must_use]
    pub fn raw(&self) -> Option<&serde_json::Value> {
        self.raw.as_ref()
    }

    /// When the message was received.
    #[must_use]
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Fields that were present in the payload but could not be decoded.
    #[must_use]
    pub fn rejected_fields(&self) -> &[String] {
        &self.rejected_fields
    }

    /// Returns `true` if the update carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.error.is_none()
            && self.locked.is_none()
            && self.schedule_enabled.is_none()
            && self.party_mode_enabled.is_none()
            && self.zone_index.is_none()
            && self.zone_sequence.is_none()
            && self.zone_starts.is_none()
            && self.battery_percent.is_none()
            && self.battery_charging.is_none()
            && self.battery_temperature.is_none()
            && self.battery_voltage.is_none()
            && self.battery_charge_cycles.is_none()
            && self.rssi.is_none()
            && self.rain_delay_minutes.is_none()
            && self.rain_sensor_triggered.is_none()
            && self.rain_delay_remaining.is_none()
            && self.capabilities.is_none()
            && self.position.is_none()
            && self.orientation.is_none()
            && self.torque.is_none()
            && self.time_extension.is_none()
    }
}

/// Builder for [`PartialUpdate`].
#[derive(Debug, Clone)]
pub struct PartialUpdateBuilder {
    inner: PartialUpdate,
}

impl Default for PartialUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialUpdateBuilder {
    /// Creates an empty builder stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PartialUpdate {
                status: None,
                error: None,
                locked: None,
                schedule_enabled: None,
                party_mode_enabled: None,
                zone_index: None,
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
                capabilities: None,
                position: None,
                orientation: None,
                torque: None,
                time_extension: None,
                serial_number: None,
                raw: None,
                received_at: Utc::now(),
                rejected_fields: Vec::new(),
            },
        }
    }

    /// Sets the raw status code.
    #[must_use]
    pub fn status(mut self, code: i32) -> Self {
        self.inner.status = Some(code);
        self
    }

    /// Sets the raw error code.
    #[must_use]
    pub fn error(mut self, code: i32) -> Self {
        self.inner.error = Some(code);
        self
    }

    /// Sets the lock flag.
    #[must_use]
    pub fn locked(mut self, locked: bool) -> Self {
        self.inner.locked = Some(locked);
        self
    }

    /// Sets the schedule flag.
    #[must_use]
    pub fn schedule_enabled(mut self, enabled: bool) -> Self {
        self.inner.schedule_enabled = Some(enabled);
        self
    }

    /// Sets the party mode flag.
    #[must_use]
    pub fn party_mode_enabled(mut self, enabled: bool) -> Self {
        self.inner.party_mode_enabled = Some(enabled);
        self
    }

    /// Sets the current zone index.
    #[must_use]
    pub fn zone_index(mut self, index: u8) -> Self {
        self.inner.zone_index = Some(index);
        self
    }

    /// Sets the zone sequence.
    #[must_use]
    pub fn zone_sequence(mut self, sequence: Vec<u8>) -> Self {
        self.inner.zone_sequence = Some(sequence);
        self
    }

    /// Sets the zone starting points.
    #[must_use]
    pub fn zone_starts(mut self, starts: Vec<u16>) -> Self {
        self.inner.zone_starts = Some(starts);
        self
    }

    /// Sets the battery level, clamped to 100%.
    #[must_use]
    pub fn battery_percent(mut self, percent: u8) -> Self {
        self.inner.battery_percent = Some(BatteryPercent::clamped(percent));
        self
    }

    /// Sets the charging state.
    #[must_use]
    pub fn battery_charging(mut self, state: ChargingState) -> Self {
        self.inner.battery_charging = Some(state);
        self
    }

    /// Sets the battery temperature.
    #[must_use]
    pub fn battery_temperature(mut self, celsius: f64) -> Self {
        self.inner.battery_temperature = Some(celsius);
        self
    }

    /// Sets the battery voltage.
    #[must_use]
    pub fn battery_voltage(mut self, volts: f64) -> Self {
        self.inner.battery_voltage = Some(volts);
        self
    }

    /// Sets the total charge cycles.
    #[must_use]
    pub fn battery_charge_cycles(mut self, cycles: u32) -> Self {
        self.inner.battery_charge_cycles = Some(cycles);
        self
    }

    /// Sets the Wi-Fi signal strength.
    #[must_use]
    pub fn rssi(mut self, rssi: i32) -> Self {
        self.inner.rssi = Some(rssi);
        self
    }

    /// Sets the rain delay.
    #[must_use]
    pub fn rain_delay_minutes(mut self, minutes: u32) -> Self {
        self.inner.rain_delay_minutes = Some(minutes);
        self
    }

    /// Sets the rain sensor flag.
    #[must_use]
    pub fn rain_sensor_triggered(mut self, triggered: bool) -> Self {
        self.inner.rain_sensor_triggered = Some(triggered);
        self
    }

    /// Sets the remaining rain delay.
    #[must_use]
    pub fn rain_delay_remaining(mut self, minutes: u32) -> Self {
        self.inner.rain_delay_remaining = Some(minutes);
        self
    }

    /// Sets the detected capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.inner.capabilities = Some(capabilities);
        self
    }

    /// Sets the GPS fix.
    #[must_use]
    pub fn position(mut self, position: GpsPosition) -> Self {
        self.inner.position = Some(position);
        self
    }

    /// Sets the orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.inner.orientation = Some(orientation);
        self
    }

    /// Sets the torque adjustment.
    #[must_use]
    pub fn torque(mut self, percent: i32) -> Self {
        self.inner.torque = Some(percent);
        self
    }

    /// Sets the schedule time extension.
    #[must_use]
    pub fn time_extension(mut self, percent: i32) -> Self {
        self.inner.time_extension = Some(percent);
        self
    }

    /// Sets the serial number the message came from.
    #[must_use]
    pub fn serial_number(mut self, serial_number: impl Into<DeviceId>) -> Self {
        self.inner.serial_number = Some(serial_number.into());
        self
    }

    /// Attaches the raw payload for diagnostics.
    #[must_use]
    pub fn raw(mut self, raw: serde_json::Value) -> Self {
        self.inner.raw = Some(raw);
        self
    }

    /// Overrides the receive timestamp.
    #[must_use]
    pub fn received_at(mut self, at: DateTime<Utc>) -> Self {
        self.inner.received_at = at;
        self
    }

    /// Records a field that was present but malformed.
    #[must_use]
    pub fn rejected(mut self, field: impl Into<String>) -> Self {
        self.inner.rejected_fields.push(field.into());
        self
    }

    /// Builds the update.
    #[must_use]
    pub fn build(self) -> PartialUpdate {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_is_empty() {
        let update = PartialUpdate::builder().build();
        assert!(update.is_empty());
        assert!(update.rejected_fields().is_empty());
    }

    #[test]
    fn raw_and_serial_do_not_count_as_fields() {
        let update = PartialUpdate::builder()
            .serial_number("SN1")
            .raw(serde_json::json!({"cfg": {}}))
            .build();
        assert!(update.is_empty());
        assert_eq!(update.serial_number(), Some(&DeviceId::new("SN1")));
    }

    #[test]
    fn battery_is_clamped() {
        let update = PartialUpdate::builder().battery_percent(250).build();
        assert_eq!(update.battery_percent(), Some(BatteryPercent::FULL));
    }

    #[test]
    fn sensor_fields_count_as_fields() {
        let update = PartialUpdate::builder().orientation(Orientation::new(0.0, 1.0, 90.0)).build();
        assert!(!update.is_empty());
        assert_eq!(update.orientation().map(|o| o.yaw), Some(90.0));
        assert!(!PartialUpdate::builder().time_extension(-20).build().is_empty());
    }

    #[test]
    fn clones_compare_equal() {
        let update = PartialUpdate::builder().status(1).error(0).build();
        assert_eq!(update.clone(), update);
    }
}

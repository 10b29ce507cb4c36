// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merging partial updates into snapshots.
//!
//! Merging is a pure function: it never touches the snapshot it is given and
//! returns a new one together with the list of fields that changed. The
//! dispatcher swaps the new snapshot in as a whole, so observers never see a
//! half-applied update.
//!
//! Rules:
//!
//! - a field absent from the update keeps its previous value
//! - a field present in the update overwrites the previous value and
//!   refreshes its group's timestamp, even when the value is unchanged
//! - capabilities are only ever added
//! - a lifecycle transition is reported whenever the decoded state differs
//!   from the previous one, including the very first status report

use serde::{Deserialize, Serialize};

use crate::types::{LifecycleState, resolve_error, resolve_status};

use super::machine::{TransitionKind, classify_transition};
use super::{DeviceSnapshot, FieldChange, FieldGroup, PartialUpdate};

/// A change of lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Previous state, `None` on the first status report.
    pub from: Option<LifecycleState>,
    /// New state.
    pub to: LifecycleState,
    /// How plausible the transition is.
    pub kind: TransitionKind,
}

/// Result of merging one update.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The merged snapshot.
    pub snapshot: DeviceSnapshot,
    /// Fields whose value changed, in a fixed field order.
    pub changes: Vec<FieldChange>,
    /// Lifecycle transition, if the state changed.
    pub transition: Option<StateTransition>,
}

impl MergeOutcome {
    /// Returns `true` if the merge changed at least one field value.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Merges `update` into `current`.
///
/// Merging the same update twice yields the same snapshot, and the second
/// merge reports no changes.
///
/// # Examples
///
/// ```
/// use landroid_lib::state::{DeviceSnapshot, PartialUpdate, merge};
/// use landroid_lib::types::{DeviceId, LifecycleState};
///
/// let idle = merge(
///     &DeviceSnapshot::new(DeviceId::new("SN1")),
///     &PartialUpdate::builder().status(0).battery_percent(90).build(),
/// )
/// .snapshot;
///
/// let outcome = merge(&idle, &PartialUpdate::builder().status(7).build());
/// let transition = outcome.transition.unwrap();
/// assert_eq!(transition.from, Some(LifecycleState::Idle));
/// assert_eq!(transition.to, LifecycleState::Cutting);
///
/// // Battery was absent from the second update and survives the merge.
/// assert_eq!(outcome.snapshot.battery_percent().map(|b| b.value()), Some(90));
/// ```
#[must_use]
pub fn merge(current: &DeviceSnapshot, update: &PartialUpdate) -> MergeOutcome {
    let mut next = current.clone();
    let mut changes = Vec::new();
    let at = update.received_at;

    macro_rules! update_if_some {
        ($field:ident, $value:expr, $group:expr, $change:path) => {
            if let Some(v) = $value {
                next.last_updated.insert($group, at);
                if next.$field.as_ref() != Some(&v) {
                    next.$field = Some(v.clone());
                    changes.push($change(v));
                }
            }
        };
    }

    let previous_state = current.lifecycle_state;
    update_if_some!(
        lifecycle_state,
        update.status.map(resolve_status),
        FieldGroup::Status,
        FieldChange::Status
    );
    update_if_some!(
        error_condition,
        update.error.map(resolve_error),
        FieldGroup::Error,
        FieldChange::Error
    );
    update_if_some!(is_locked, update.locked, FieldGroup::Lock, FieldChange::Locked);
    update_if_some!(
        schedule_enabled,
        update.schedule_enabled,
        FieldGroup::Schedule,
        FieldChange::ScheduleEnabled
    );
    update_if_some!(
        party_mode_enabled,
        update.party_mode_enabled,
        FieldGroup::Schedule,
        FieldChange::PartyModeEnabled
    );
    update_if_some!(
        current_zone_index,
        update.zone_index,
        FieldGroup::Zone,
        FieldChange::ZoneIndex
    );
    update_if_some!(
        zone_sequence,
        update.zone_sequence.clone(),
        FieldGroup::Zone,
        FieldChange::ZoneSequence
    );
    update_if_some!(
        zone_starts,
        update.zone_starts.clone(),
        FieldGroup::Zone,
        FieldChange::ZoneStarts
    );
    update_if_some!(
        battery_percent,
        update.battery_percent,
        FieldGroup::Battery,
        FieldChange::BatteryPercent
    );
    update_if_some!(
        battery_charging,
        update.battery_charging,
        FieldGroup::Battery,
        FieldChange::BatteryCharging
    );
    update_if_some!(
        battery_temperature,
        update.battery_temperature,
        FieldGroup::Battery,
        FieldChange::BatteryTemperature
    );
    update_if_some!(
        battery_voltage,
        update.battery_voltage,
        FieldGroup::Battery,
        FieldChange::BatteryVoltage
    );
    update_if_some!(
        battery_charge_cycles,
        update.battery_charge_cycles,
        FieldGroup::Battery,
        FieldChange::BatteryChargeCycles
    );
    update_if_some!(rssi, update.rssi, FieldGroup::Link, FieldChange::Rssi);
    update_if_some!(
        rain_delay_minutes,
        update.rain_delay_minutes,
        FieldGroup::Rain,
        FieldChange::RainDelay
    );
    update_if_some!(
        rain_sensor_triggered,
        update.rain_sensor_triggered,
        FieldGroup::Rain,
        FieldChange::RainSensor
    );
    update_if_some!(
        rain_delay_remaining,
        update.rain_delay_remaining,
        FieldGroup::Rain,
        FieldChange::RainDelayRemaining
    );

    update_if_some!(
        time_extension,
        update.time_extension,
        FieldGroup::Schedule,
        FieldChange::TimeExtension
    );
    update_if_some!(position, update.position, FieldGroup::Position, FieldChange::Position);
    update_if_some!(
        orientation,
        update.orientation,
        FieldGroup::Orientation,
        FieldChange::Orientation
    );
    update_if_some!(torque, update.torque, FieldGroup::Torque, FieldChange::Torque);

    if let Some(detected) = update.capabilities {
        next.last_updated.insert(FieldGroup::Capabilities, at);
        let merged = next.capabilities.union(detected);
        if merged != next.capabilities {
            next.capabilities = merged;
            changes.push(FieldChange::Capabilities(merged));
        }
    }

    if let Some(raw) = &update.raw {
        next.raw_last_payload = Some(raw.clone());
    }

    let transition = next
        .lifecycle_state
        .filter(|to| previous_state != Some(*to))
        .map(|to| StateTransition {
            from: previous_state,
            to,
            kind: classify_transition(previous_state, to),
        });

    MergeOutcome {
        snapshot: next,
        changes,
        transition,
    }
}

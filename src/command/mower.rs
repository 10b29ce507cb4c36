// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mower commands and their JSON bodies.

use serde_json::{Map, Value, json};

use crate::command::{Command, CommandKind};
use crate::error::ValueError;

/// Vendor numbers for the `cmd` field.
mod code {
    pub const REFRESH: u8 = 0;
    pub const START: u8 = 1;
    pub const PAUSE: u8 = 2;
    pub const HOME: u8 = 3;
    pub const ZONE_TRAINING: u8 = 4;
    pub const LOCK: u8 = 5;
    pub const UNLOCK: u8 = 6;
    pub const RESTART: u8 = 7;
    pub const PAUSE_OVER_WIRE: u8 = 8;
    pub const SAFE_HOME: u8 = 9;
}

/// Schedule modes for the `sc.m` field.
const SCHEDULE_OFF: u8 = 0;
const SCHEDULE_ON: u8 = 1;
const SCHEDULE_PARTY: u8 = 2;

/// A command for a mower.
///
/// # Examples
///
/// ```
/// use landroid_lib::command::{Command, MowerCommand};
///
/// let ots = MowerCommand::one_time_schedule(true, 60);
/// assert_eq!(
///     ots.payload(),
///     serde_json::json!({"sc": {"ots": {"bc": 1, "wtm": 60}}})
/// );
///
/// let party = MowerCommand::SetPartyMode(true);
/// assert_eq!(party.payload(), serde_json::json!({"sc": {"m": 2, "distm": 0}}));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum MowerCommand {
    /// Request a fresh status push.
    Refresh,
    /// Start mowing.
    Start,
    /// Pause the current task.
    Pause,
    /// Pause on the border wire.
    PauseOverWire,
    /// Stop and go home. Blades keep running if they were on.
    Home,
    /// Stop and go home with the blades off.
    SafeHome,
    /// Start zone training.
    ZoneTraining,
    /// Lock the device.
    Lock,
    /// Unlock the device.
    Unlock,
    /// Reboot the baseboard.
    Restart,
    /// Run a one-time schedule.
    OneTimeSchedule {
        /// Cut the border first.
        boundary: bool,
        /// Minutes to mow before returning to the dock.
        runtime_minutes: u16,
    },
    /// Select the zone for the next task.
    ///
    /// Build with [`rotate_zone_sequence`](super::rotate_zone_sequence) so the
    /// requested zone sits at the mower's current zone index.
    SetZone {
        /// The requested zone (0-3).
        zone: u8,
        /// The rotated zone sequence to send.
        sequence: Vec<u8>,
    },
    /// Change the rain delay in minutes.
    SetRainDelay(u16),
    /// Enable or disable the mowing schedule.
    SetSchedule(bool),
    /// Enable or disable party mode.
    SetPartyMode(bool),
    /// Raw JSON object sent as-is.
    Raw(Map<String, Value>),
}

impl MowerCommand {
    /// Creates a one-time schedule command.
    #[must_use]
    pub const fn one_time_schedule(boundary: bool, runtime_minutes: u16) -> Self {
        Self::OneTimeSchedule {
            boundary,
            runtime_minutes,
        }
    }

    /// Creates a lock or unlock command.
    #[must_use]
    pub const fn lock(locked: bool) -> Self {
        if locked { Self::Lock } else { Self::Unlock }
    }

    /// Creates a raw command from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::RawCommandNotObject` if `value` is not an object.
    pub fn raw(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Object(map) => Ok(Self::Raw(map)),
            _ => Err(ValueError::RawCommandNotObject),
        }
    }

    /// Returns the `cmd` number for simple action commands.
    #[must_use]
    pub const fn action_code(&self) -> Option<u8> {
        match self {
            Self::Refresh => Some(code::REFRESH),
            Self::Start => Some(code::START),
            Self::Pause => Some(code::PAUSE),
            Self::Home => Some(code::HOME),
            Self::ZoneTraining => Some(code::ZONE_TRAINING),
            Self::Lock => Some(code::LOCK),
            Self::Unlock => Some(code::UNLOCK),
            Self::Restart => Some(code::RESTART),
            Self::PauseOverWire => Some(code::PAUSE_OVER_WIRE),
            Self::SafeHome => Some(code::SAFE_HOME),
            _ => None,
        }
    }
}

impl Command for MowerCommand {
    fn kind(&self) -> CommandKind {
        match self {
            Self::Refresh => CommandKind::Refresh,
            Self::Start => CommandKind::Start,
            Self::Pause => CommandKind::Pause,
            Self::PauseOverWire => CommandKind::PauseOverWire,
            Self::Home => CommandKind::Home,
            Self::SafeHome => CommandKind::SafeHome,
            Self::ZoneTraining => CommandKind::ZoneTraining,
            Self::Lock => CommandKind::Lock,
            Self::Unlock => CommandKind::Unlock,
            Self::Restart => CommandKind::Restart,
            Self::OneTimeSchedule { .. } => CommandKind::OneTimeSchedule,
            Self::SetZone { .. } => CommandKind::SetZone,
            Self::SetRainDelay(_) => CommandKind::SetRainDelay,
            Self::SetSchedule(_) => CommandKind::SetSchedule,
            Self::SetPartyMode(_) => CommandKind::SetPartyMode,
            Self::Raw(_) => CommandKind::Raw,
        }
    }

    fn payload(&self) -> Value {
        if let Some(cmd) = self.action_code() {
            return json!({ "cmd": cmd });
        }

        match self {
            Self::OneTimeSchedule {
                boundary,
                runtime_minutes,
            } => json!({
                "sc": { "ots": { "bc": u8::from(*boundary), "wtm": runtime_minutes } }
            }),
            Self::SetZone { sequence, .. } => json!({ "mzv": sequence }),
            Self::SetRainDelay(minutes) => json!({ "rd": minutes }),
            Self::SetSchedule(enabled) => {
                let mode = if *enabled { SCHEDULE_ON } else { SCHEDULE_OFF };
                json!({ "sc": { "m": mode } })
            }
            Self::SetPartyMode(enabled) => {
                let mode = if *enabled { SCHEDULE_PARTY } else { SCHEDULE_ON };
                json!({ "sc": { "m": mode, "distm": 0 } })
            }
            Self::Raw(map) => Value::Object(map.clone()),
            // Action commands returned above
            _ => Value::Null,
        }
    }
}

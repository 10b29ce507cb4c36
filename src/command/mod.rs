// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mower command definitions.
//!
//! Commands are turned into the JSON body the cloud expects. The envelope
//! around it (message id, serial number, timestamp) is added by the
//! transport.
//!
//! # Available Commands
//!
//! | Command | Body | Lifecycle precondition |
//! |---------|------|------------------------|
//! | [`MowerCommand::Refresh`] | `{"cmd":0}` | none |
//! | [`MowerCommand::Start`] | `{"cmd":1}` | idle, home or paused |
//! | [`MowerCommand::Pause`] | `{"cmd":2}` | moving or mowing |
//! | [`MowerCommand::Home`] | `{"cmd":3}` | anything but home |
//! | [`MowerCommand::ZoneTraining`] | `{"cmd":4}` | idle or home |
//! | [`MowerCommand::Lock`] / [`MowerCommand::Unlock`] | `{"cmd":5}` / `{"cmd":6}` | none |
//! | [`MowerCommand::Restart`] | `{"cmd":7}` | none |
//! | [`MowerCommand::PauseOverWire`] | `{"cmd":8}` | moving or mowing |
//! | [`MowerCommand::SafeHome`] | `{"cmd":9}` | anything but home |
//! | [`MowerCommand::OneTimeSchedule`] | `{"sc":{"ots":{..}}}` | idle or home |
//! | [`MowerCommand::SetZone`] | `{"mzv":[..]}` | schedule off, or idle-like |
//! | [`MowerCommand::SetRainDelay`] | `{"rd":n}` | none |
//! | [`MowerCommand::SetSchedule`] | `{"sc":{"m":n}}` | none |
//! | [`MowerCommand::SetPartyMode`] | `{"sc":{"m":n,"distm":0}}` | none |
//!
//! # Examples
//!
//! ```
//! use landroid_lib::command::{Command, CommandKind, MowerCommand};
//!
//! let cmd = MowerCommand::Start;
//! assert_eq!(cmd.kind(), CommandKind::Start);
//! assert_eq!(cmd.payload(), serde_json::json!({"cmd": 1}));
//! ```

mod mower;
mod zone;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use mower::MowerCommand;
pub use zone::rotate_zone_sequence;

/// A command that can be sent to a mower.
pub trait Command {
    /// Returns the kind of command, used for precondition checks and logging.
    fn kind(&self) -> CommandKind;

    /// Returns the JSON body for this command.
    fn payload(&self) -> serde_json::Value;
}

/// Discriminant of a command, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Request a fresh status push.
    Refresh,
    /// Start mowing.
    Start,
    /// Pause the current task.
    Pause,
    /// Pause on the border wire.
    PauseOverWire,
    /// Stop and go home.
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
    /// Start a one-time schedule.
    OneTimeSchedule,
    /// Select the zone for the next task.
    SetZone,
    /// Change the rain delay.
    SetRainDelay,
    /// Enable or disable the schedule.
    SetSchedule,
    /// Enable or disable party mode.
    SetPartyMode,
    /// Raw JSON body.
    Raw,
}

impl CommandKind {
    /// Returns the lowercase label used in logs and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Start => "start",
            Self::Pause => "pause",
            Self::PauseOverWire => "pause over wire",
            Self::Home => "go home",
            Self::SafeHome => "go home safely",
            Self::ZoneTraining => "zone training",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Restart => "restart",
            Self::OneTimeSchedule => "start one-time schedule",
            Self::SetZone => "set zone",
            Self::SetRainDelay => "set rain delay",
            Self::SetSchedule => "toggle schedule",
            Self::SetPartyMode => "toggle party mode",
            Self::Raw => "send raw command",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fault conditions decoded from vendor error codes.
//!
//! The error field is independent from the status field: a mower can report
//! [`Cutting`](super::LifecycleState::Cutting) while a stale non-zero error
//! is still set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error codes with a published meaning.
///
/// Code 18 is a vendor placeholder and intentionally absent.
pub const KNOWN_ERROR_CODES: [i32; 20] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 19, 20,
];

/// Normalized fault classification.
///
/// # Examples
///
/// ```
/// use landroid_lib::types::{ErrorCondition, resolve_error};
///
/// assert_eq!(resolve_error(2), ErrorCondition::Lifted);
/// assert_eq!(resolve_error(18), ErrorCondition::Unknown(18));
/// assert!(!ErrorCondition::NoError.is_fault());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCondition {
    /// No error.
    NoError,
    /// Trapped.
    Trapped,
    /// Lifted.
    Lifted,
    /// Boundary wire signal missing.
    WireMissing,
    /// Outside the boundary wire.
    OutsideBoundary,
    /// Rain delay active.
    Raining,
    /// Door must be closed to start mowing.
    DoorOpenCutting,
    /// Door must be closed to go home.
    DoorOpenHoming,
    /// Blade motor blocked.
    BladeMotorFault,
    /// Wheel motor blocked.
    WheelMotorFault,
    /// Trapped for too long.
    TrappedTimeout,
    /// Upside down.
    UpsideDown,
    /// Battery low.
    BatteryLow,
    /// Boundary wire connected in reverse.
    WireReversed,
    /// Battery charge error.
    BatteryChargeError,
    /// Timed out searching for the charging station.
    HomeSearchTimeout,
    /// Locked by the Wi-Fi lock.
    WifiLocked,
    /// Battery temperature out of range.
    BatteryTempOutOfRange,
    /// Battery trunk left open too long.
    TrunkOpenTimeout,
    /// Boundary wire signal out of sync.
    WireSignalOutOfSync,
    /// An error code with no published meaning.
    Unknown(i32),
}

impl ErrorCondition {
    /// Returns the vendor error code for this condition.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::Trapped => 1,
            Self::Lifted => 2,
            Self::WireMissing => 3,
            Self::OutsideBoundary => 4,
            Self::Raining => 5,
            Self::DoorOpenCutting => 6,
            Self::DoorOpenHoming => 7,
            Self::BladeMotorFault => 8,
            Self::WheelMotorFault => 9,
            Self::TrappedTimeout => 10,
            Self::UpsideDown => 11,
            Self::BatteryLow => 12,
            Self::WireReversed => 13,
            Self::BatteryChargeError => 14,
            Self::HomeSearchTimeout => 15,
            Self::WifiLocked => 16,
            Self::BatteryTempOutOfRange => 17,
            Self::TrunkOpenTimeout => 19,
            Self::WireSignalOutOfSync => 20,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns a human readable description of the condition.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NoError => "No error",
            Self::Trapped => "Trapped",
            Self::Lifted => "Lifted",
            Self::WireMissing => "Wire missing",
            Self::OutsideBoundary => "Outside boundary",
            Self::Raining => "Rain delay",
            Self::DoorOpenCutting => "Close door to start mowing",
            Self::DoorOpenHoming => "Close door to go home",
            Self::BladeMotorFault => "Blade motor error",
            Self::WheelMotorFault => "Wheel motor error",
            Self::TrappedTimeout => "Trapped timeout",
            Self::UpsideDown => "Upside down",
            Self::BatteryLow => "Battery low",
            Self::WireReversed => "Boundary wire reversed",
            Self::BatteryChargeError => "Battery charge error",
            Self::HomeSearchTimeout => "Timeout going home",
            Self::WifiLocked => "Wifi locked",
            Self::BatteryTempOutOfRange => "Battery temperature out of range",
            Self::TrunkOpenTimeout => "Door open timeout",
            Self::WireSignalOutOfSync => "Boundary wire signal out of sync",
            Self::Unknown(_) => "Unknown error",
        }
    }

    /// Returns `true` for every condition except [`NoError`](Self::NoError).
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        !matches!(self, Self::NoError)
    }

    /// Returns `true` if the code had no published meaning.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

/// Resolves a vendor error code to an [`ErrorCondition`].
///
/// Never fails: unmapped codes resolve to [`ErrorCondition::Unknown`].
#[must_use]
pub const fn resolve_error(code: i32) -> ErrorCondition {
    match code {
        0 => ErrorCondition::NoError,
        1 => ErrorCondition::Trapped,
        2 => ErrorCondition::Lifted,
        3 => ErrorCondition::WireMissing,
        4 => ErrorCondition::OutsideBoundary,
        5 => ErrorCondition::Raining,
        6 => ErrorCondition::DoorOpenCutting,
        7 => ErrorCondition::DoorOpenHoming,
        8 => ErrorCondition::BladeMotorFault,
        9 => ErrorCondition::WheelMotorFault,
        10 => ErrorCondition::TrappedTimeout,
        11 => ErrorCondition::UpsideDown,
        12 => ErrorCondition::BatteryLow,
        13 => ErrorCondition::WireReversed,
        14 => ErrorCondition::BatteryChargeError,
        15 => ErrorCondition::HomeSearchTimeout,
        16 => ErrorCondition::WifiLocked,
        17 => ErrorCondition::BatteryTempOutOfRange,
        19 => ErrorCondition::TrunkOpenTimeout,
        20 => ErrorCondition::WireSignalOutOfSync,
        other => ErrorCondition::Unknown(other),
    }
}

impl From<i32> for ErrorCondition {
    fn from(code: i32) -> Self {
        resolve_error(code)
    }
}

impl fmt::Display for ErrorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown error ({code})"),
            other => f.write_str(other.description()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip_through_code() {
        for code in KNOWN_ERROR_CODES {
            let condition = resolve_error(code);
            assert!(!condition.is_unknown(), "code {code} should be known");
            assert_eq!(condition.code(), code);
        }
    }

    #[test]
    fn code_18_is_not_guessed() {
        assert_eq!(resolve_error(18), ErrorCondition::Unknown(18));
    }

    #[test]
    fn unmapped_codes_resolve_to_unknown() {
        for code in [-1, 21, 100, 116, i32::MAX] {
            assert_eq!(resolve_error(code), ErrorCondition::Unknown(code));
        }
    }

    #[test]
    fn fault_flag() {
        assert!(!ErrorCondition::NoError.is_fault());
        assert!(ErrorCondition::Lifted.is_fault());
        assert!(ErrorCondition::Unknown(42).is_fault());
    }

    #[test]
    fn display() {
        assert_eq!(ErrorCondition::Raining.to_string(), "Rain delay");
        assert_eq!(ErrorCondition::Unknown(42).to_string(), "unknown error (42)");
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Battery charge level as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use landroid_lib::types::BatteryPercent;
///
/// let level = BatteryPercent::new(80).unwrap();
/// assert_eq!(level.value(), 80);
///
/// assert!(BatteryPercent::new(101).is_err());
/// assert_eq!(BatteryPercent::clamped(120).value(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatteryPercent(u8);

impl BatteryPercent {
    /// Empty battery.
    pub const EMPTY: Self = Self(0);

    /// Fully charged battery.
    pub const FULL: Self = Self(100);

    /// Creates a battery level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a battery level, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for BatteryPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for BatteryPercent {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Charging state reported in the battery block (`bt.c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargingState {
    /// Not charging.
    NotCharging,
    /// Charging.
    Charging,
    /// The charger reported an error.
    ChargeError,
    /// Value with no published meaning.
    Unknown(i32),
}

impl From<i32> for ChargingState {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::NotCharging,
            1 => Self::Charging,
            2 => Self::ChargeError,
            other => Self::Unknown(other),
        }
    }
}

impl ChargingState {
    /// Returns `true` while the battery is charging.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self, Self::Charging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_range() {
        assert!(BatteryPercent::new(0).is_ok());
        assert!(BatteryPercent::new(100).is_ok());
        assert_eq!(
            BatteryPercent::new(150),
            Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: 150
            })
        );
    }

    #[test]
    fn battery_display() {
        assert_eq!(BatteryPercent::clamped(42).to_string(), "42%");
    }

    #[test]
    fn charging_state_from_code() {
        assert_eq!(ChargingState::from(1), ChargingState::Charging);
        assert_eq!(ChargingState::from(2), ChargingState::ChargeError);
        assert_eq!(ChargingState::from(-1), ChargingState::Unknown(-1));
        assert!(ChargingState::Charging.is_charging());
        assert!(!ChargingState::NotCharging.is_charging());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Location and attitude reported by the mower.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// GPS fix reported by mowers with a cellular module.
///
/// # Examples
///
/// ```
/// use landroid_lib::types::GpsPosition;
///
/// let fix = GpsPosition::new(51.5072, -0.1276).unwrap();
/// assert_eq!(fix.latitude(), 51.5072);
/// assert!(GpsPosition::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPosition {
    latitude: f64,
    longitude: f64,
}

impl GpsPosition {
    /// Creates a position from decimal degrees.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the latitude is outside ±90 or the
    /// longitude outside ±180. Non-finite values are out of range too.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValueError> {
        check_degrees(latitude, 90)?;
        check_degrees(longitude, 180)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GpsPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

fn check_degrees(value: f64, limit: i32) -> Result<(), ValueError> {
    if value.is_finite() && value.abs() <= f64::from(limit) {
        return Ok(());
    }
    // Saturating cast, only used for the message
    #[allow(clippy::cast_possible_truncation)]
    let actual = value as i64;
    Err(ValueError::OutOfRange {
        min: -i64::from(limit),
        max: i64::from(limit),
        actual,
    })
}

/// Attitude from the mower's motion sensor (`dmp`), in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Nose up or down.
    pub pitch: f64,
    /// Tilt to the side.
    pub roll: f64,
    /// Heading.
    pub yaw: f64,
}

impl Orientation {
    /// Creates an orientation.
    #[must_use]
    pub const fn new(pitch: f64, roll: f64, yaw: f64) -> Self {
        Self { pitch, roll, yaw }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pitch {:.1}°, roll {:.1}°, yaw {:.1}°",
            self.pitch, self.roll, self.yaw
        )
    }
}

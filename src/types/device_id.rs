// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a mower, the serial number assigned by the vendor cloud.
///
/// # Examples
///
/// ```
/// use landroid_lib::types::DeviceId;
///
/// let id = DeviceId::new("20213019340000001234");
/// assert_eq!(id.as_str(), "20213019340000001234");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier from a serial number.
    #[must_use]
    pub fn new(serial_number: impl Into<String>) -> Self {
        Self(serial_number.into())
    }

    /// Returns the serial number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(serial_number: &str) -> Self {
        Self::new(serial_number)
    }
}

impl From<String> for DeviceId {
    fn from(serial_number: String) -> Self {
        Self(serial_number)
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

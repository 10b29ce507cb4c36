// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enumerated devices.

use crate::error::ParseError;
use crate::state::PartialUpdate;
use crate::types::DeviceId;

/// A mower the application knows about.
///
/// Device enumeration (listing the mowers on an account) happens outside
/// this library; the application hands the result over as `DeviceInfo`.
///
/// # Examples
///
/// ```
/// use landroid_lib::DeviceInfo;
///
/// let info = DeviceInfo::new("201923011234567")
///     .with_name("Front lawn")
///     .with_last_known_payload(r#"{"dat":{"ls":1,"le":0}}"#)
///     .unwrap();
///
/// assert_eq!(info.display_name(), "Front lawn");
/// assert_eq!(info.last_known().and_then(|u| u.status()), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    id: DeviceId,
    name: Option<String>,
    last_known: Option<PartialUpdate>,
}

impl DeviceInfo {
    /// Creates device info for a serial number.
    #[must_use]
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            last_known: None,
        }
    }

    /// Sets the friendly name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the last known state, used to seed the snapshot on connect.
    #[must_use]
    pub fn with_last_known(mut self, update: PartialUpdate) -> Self {
        self.last_known = Some(update);
        self
    }

    /// Sets the last known state from a raw push document, as returned by
    /// the cloud's device listing.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not a JSON object.
    pub fn with_last_known_payload(self, payload: &str) -> Result<Self, ParseError> {
        Ok(self.with_last_known(PartialUpdate::from_payload(payload)?))
    }

    /// The device serial number.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// The friendly name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The friendly name, falling back to the serial number.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// The last known state, if any.
    #[must_use]
    pub fn last_known(&self) -> Option<&PartialUpdate> {
        self.last_known.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_serial() {
        let info = DeviceInfo::new("SN1");
        assert_eq!(info.display_name(), "SN1");
        assert_eq!(info.name(), None);
        assert!(info.last_known().is_none());
    }

    #[test]
    fn bad_last_known_payload() {
        assert!(DeviceInfo::new("SN1").with_last_known_payload("nope").is_err());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mower capability flags.
//!
//! Capabilities are not advertised by the cloud. They are inferred from the
//! configuration block of push payloads: a mower that reports a one-time
//! schedule block supports one-time schedules, and so on. Detected
//! capabilities only accumulate; a payload that omits a block never removes a
//! capability seen earlier.

use serde::{Deserialize, Serialize};

/// Optional features of a mower.
///
/// # Examples
///
/// ```
/// use landroid_lib::Capabilities;
///
/// let basic = Capabilities::default();
/// assert!(!basic.party_mode);
///
/// let caps = Capabilities::builder()
///     .with_one_time_schedule()
///     .with_party_mode()
///     .build();
/// assert!(caps.one_time_schedule);
/// assert!(caps.union(basic).party_mode);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
// Each boolean is an independent feature flag reported by a different block.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Supports cutting along the border on demand.
    pub edge_cut: bool,

    /// Supports one-time schedules (`ots`).
    pub one_time_schedule: bool,

    /// Supports party mode (schedule suspended).
    pub party_mode: bool,

    /// Supports wheel torque adjustment.
    pub torque: bool,
}

impl Capabilities {
    /// Creates a builder with no capabilities.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Returns the union of both capability sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            edge_cut: self.edge_cut || other.edge_cut,
            one_time_schedule: self.one_time_schedule || other.one_time_schedule,
            party_mode: self.party_mode || other.party_mode,
            torque: self.torque || other.torque,
        }
    }

    /// Returns `true` if no capability is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.edge_cut || self.one_time_schedule || self.party_mode || self.torque)
    }

    /// Returns `true` if every capability in `other` is also set here.
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        (!other.edge_cut || self.edge_cut)
            && (!other.one_time_schedule || self.one_time_schedule)
            && (!other.party_mode || self.party_mode)
            && (!other.torque || self.torque)
    }
}

/// Builder for creating custom capabilities.
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl CapabilitiesBuilder {
    /// Creates a new builder with no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables edge cut support.
    #[must_use]
    pub fn with_edge_cut(mut self) -> Self {
        self.inner.edge_cut = true;
        self
    }

    /// Enables one-time schedule support.
    #[must_use]
    pub fn with_one_time_schedule(mut self) -> Self {
        self.inner.one_time_schedule = true;
        self
    }

    /// Enables party mode support.
    #[must_use]
    pub fn with_party_mode(mut self) -> Self {
        self.inner.party_mode = true;
        self
    }

    /// Enables torque support.
    #[must_use]
    pub fn with_torque(mut self) -> Self {
        self.inner.torque = true;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}

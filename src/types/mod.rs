// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types and the published code tables.
//!
//! # Types
//!
//! - [`DeviceId`] - Serial number identifying a mower
//! - [`LifecycleState`] - Normalized activity phase decoded from a status code
//! - [`ErrorCondition`] - Normalized fault decoded from an error code
//! - [`BatteryPercent`] - Battery level (0-100%)
//! - [`ChargingState`] - Charger state
//! - [`GpsPosition`] - GPS fix from the cellular module
//! - [`Orientation`] - Pitch, roll and yaw from the motion sensor
//!
//! The code tables are part of the stable public contract: a code keeps its
//! meaning once published, and unknown codes always decode to `Unknown(code)`.

mod battery;
mod device_id;
mod error_code;
mod position;
mod status;

pub use battery::{BatteryPercent, ChargingState};
pub use device_id::DeviceId;
pub use error_code::{ErrorCondition, KNOWN_ERROR_CODES, resolve_error};
pub use position::{GpsPosition, Orientation};
pub use status::{KNOWN_STATUS_CODES, LifecycleState, resolve_status};

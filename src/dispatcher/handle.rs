// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handles to connected devices.

use tokio::sync::watch;

use crate::state::DeviceSnapshot;
use crate::types::DeviceId;

/// Read-only view of a connected device.
///
/// The handle stays valid after the device is disconnected but stops
/// receiving updates; [`changed`](Self::changed) then returns `false`.
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    device_id: DeviceId,
    snapshot: watch::Receiver<DeviceSnapshot>,
}

impl DeviceHandle {
    pub(crate) fn new(device_id: DeviceId, snapshot: watch::Receiver<DeviceSnapshot>) -> Self {
        Self { device_id, snapshot }
    }

    /// The device this handle refers to.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns a copy of the latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Waits until the snapshot is replaced.
    ///
    /// Returns `false` once the device has been disconnected.
    pub async fn changed(&mut self) -> bool {
        self.snapshot.changed().await.is_ok()
    }

    /// Returns a watch receiver for the snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DeviceSnapshot> {
        self.snapshot.clone()
    }
}

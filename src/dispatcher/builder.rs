// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder for [`Dispatcher`].

use crate::event::DEFAULT_EVENT_CAPACITY;
use crate::protocol::{CredentialStore, StaticToken, Transport};

use super::{DeviceInfo, Dispatcher};

/// Builder for a [`Dispatcher`].
///
/// # Examples
///
/// ```
/// use landroid_lib::protocol::{CommandRequest, StaticToken, Transport};
/// use landroid_lib::state::PartialUpdate;
/// use landroid_lib::types::DeviceId;
/// use landroid_lib::{DeviceInfo, Dispatcher, TransportError};
/// use tokio::sync::mpsc;
///
/// struct Cloud;
///
/// impl Transport for Cloud {
///     async fn send(&self, _: &DeviceId, _: &CommandRequest) -> Result<(), TransportError> {
///         Ok(())
///     }
///     async fn subscribe(&self, _: &DeviceId) -> Result<mpsc::Receiver<PartialUpdate>, TransportError> {
///         Ok(mpsc::channel(8).1)
///     }
///     async fn unsubscribe(&self, _: &DeviceId) {}
/// }
///
/// let dispatcher = Dispatcher::builder(Cloud)
///     .credentials(StaticToken::new("token"))
///     .event_capacity(64)
///     .device(DeviceInfo::new("SN1").with_name("Front lawn"))
///     .build();
///
/// assert_eq!(dispatcher.device_ids().len(), 1);
/// ```
#[derive(Debug)]
pub struct DispatcherBuilder<T, C = StaticToken> {
    transport: T,
    credentials: C,
    event_capacity: usize,
    devices: Vec<DeviceInfo>,
}

impl<T: Transport> DispatcherBuilder<T, StaticToken> {
    pub(crate) fn new(transport: T) -> Self {
        Self {
            transport,
            credentials: StaticToken::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            devices: Vec::new(),
        }
    }
}

impl<T: Transport, C: CredentialStore> DispatcherBuilder<T, C> {
    /// Sets the credential store commands are signed with.
    #[must_use]
    pub fn credentials<S: CredentialStore>(self, credentials: S) -> DispatcherBuilder<T, S> {
        DispatcherBuilder {
            transport: self.transport,
            credentials,
            event_capacity: self.event_capacity,
            devices: self.devices,
        }
    }

    /// Sets the capacity of the event broadcast channel.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Enumerates a device.
    #[must_use]
    pub fn device(mut self, info: DeviceInfo) -> Self {
        self.devices.push(info);
        self
    }

    /// Enumerates several devices.
    #[must_use]
    pub fn devices(mut self, infos: impl IntoIterator<Item = DeviceInfo>) -> Self {
        self.devices.extend(infos);
        self
    }

    /// Builds the dispatcher.
    #[must_use]
    pub fn build(self) -> Dispatcher<T, C> {
        let dispatcher = Dispatcher::from_parts(self.transport, self.credentials, self.event_capacity);
        for info in self.devices {
            dispatcher.add_device(info);
        }
        dispatcher
    }
}

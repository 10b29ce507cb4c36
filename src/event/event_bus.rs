// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for device events.

use tokio::sync::broadcast::{self, error::RecvError};

use super::DeviceEvent;
use crate::types::DeviceId;

/// Default channel capacity for the event bus.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fans device events out to any number of async subscribers.
///
/// The bus has a fixed capacity. A subscriber that falls behind by more
/// than that many events loses the oldest ones. Publishing never waits for
/// subscribers, so a slow consumer cannot stall a device's merge task.
///
/// # Examples
///
/// ```
/// use landroid_lib::event::{DeviceEvent, EventBus};
/// use landroid_lib::types::DeviceId;
///
/// let bus = EventBus::new();
/// let mut all = bus.subscribe();
///
/// let delivered = bus.publish(DeviceEvent::Connected { device_id: DeviceId::new("SN1") });
/// assert_eq!(delivered, 1);
/// assert!(all.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Creates a bus with [`DEFAULT_EVENT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receives every event published from now on, for all devices.
    ///
    /// Lagging is reported to the caller as `RecvError::Lagged`.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Receives the events of one device published from now on.
    #[must_use]
    pub fn subscribe_device(&self, device_id: DeviceId) -> DeviceEvents {
        DeviceEvents {
            device_id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event and returns how many receivers it reached.
    pub fn publish(&self, event: DeviceEvent) -> usize {
        // Err only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event stream filtered to a single device.
///
/// Unlike a raw broadcast receiver, lagging is not an error: the number of
/// lost events is logged and reception continues with the oldest event
/// still buffered.
#[derive(Debug)]
pub struct DeviceEvents {
    device_id: DeviceId,
    receiver: broadcast::Receiver<DeviceEvent>,
}

impl DeviceEvents {
    /// The device this stream is filtered to.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Waits for the next event of this device.
    ///
    /// Returns `None` once the bus has been dropped.
    pub async fn recv(&mut self) -> Option<DeviceEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.device_id() == &self.device_id => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(device_id = %self.device_id, missed, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(id: &str) -> DeviceEvent {
        DeviceEvent::Connected {
            device_id: DeviceId::new(id),
        }
    }

    #[test]
    fn publish_reports_reach() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(connected("SN1")), 0);

        let _all = bus.subscribe();
        let _one = bus.subscribe_device(DeviceId::new("SN1"));
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.publish(connected("SN1")), 2);
    }

    #[test]
    fn clones_share_the_channel() {
        let bus = EventBus::with_capacity(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.clone().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn device_stream_skips_other_devices() {
        let bus = EventBus::new();
        let mut events = bus.subscribe_device(DeviceId::new("SN2"));

        bus.publish(connected("SN1"));
        bus.publish(connected("SN2"));

        let event = events.recv().await.unwrap();
        assert_eq!(event.device_id().as_str(), "SN2");
    }

    #[tokio::test]
    async fn raw_receiver_sees_lag() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        for id in ["A", "B", "C"] {
            bus.publish(connected(id));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        assert_eq!(rx.recv().await.unwrap().device_id().as_str(), "B");
    }

    #[tokio::test]
    async fn device_stream_recovers_from_lag() {
        let bus = EventBus::with_capacity(2);
        let mut events = bus.subscribe_device(DeviceId::new("SN1"));

        for _ in 0..3 {
            bus.publish(connected("SN1"));
        }
        bus.publish(DeviceEvent::Disconnected {
            device_id: DeviceId::new("SN1"),
        });

        // Two slots: the last Connected and the Disconnected survive
        assert!(matches!(
            events.recv().await,
            Some(DeviceEvent::Connected { .. })
        ));
        assert!(matches!(
            events.recv().await,
            Some(DeviceEvent::Disconnected { .. })
        ));
    }

    #[tokio::test]
    async fn device_stream_ends_with_the_bus() {
        let bus = EventBus::new();
        let mut events = bus.subscribe_device(DeviceId::new("SN1"));
        drop(bus);
        assert!(events.recv().await.is_none());
    }
}

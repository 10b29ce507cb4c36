// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device dispatcher.
//!
//! The [`Dispatcher`] owns the snapshots of every connected mower. It
//! receives push updates from the [`Transport`], merges them one device at a
//! time, notifies callbacks and event subscribers, and validates commands
//! against the current lifecycle state before handing them to the transport.
//!
//! # Examples
//!
//! ```no_run
//! use landroid_lib::protocol::{StaticToken, Transport};
//! use landroid_lib::{DeviceEvent, DeviceInfo, Dispatcher};
//!
//! # async fn example(transport: impl Transport) -> landroid_lib::Result<()> {
//! let dispatcher = Dispatcher::builder(transport)
//!     .credentials(StaticToken::new("access-token"))
//!     .device(DeviceInfo::new("201923011234567"))
//!     .build();
//!
//! dispatcher.register_callback(|event| {
//!     if let DeviceEvent::StateTransition { device_id, transition } = event {
//!         println!("{device_id}: {:?} -> {}", transition.from, transition.to);
//!     }
//! });
//!
//! let mower = dispatcher.connect(&"201923011234567".into()).await?;
//! dispatcher.start(mower.id()).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod device_info;
mod handle;
mod slot;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{Mutex as AsyncMutex, broadcast, watch};

pub use builder::DispatcherBuilder;
pub use device_info::DeviceInfo;
pub use handle::DeviceHandle;

use crate::command::{Command, CommandKind, MowerCommand, rotate_zone_sequence};
use crate::error::{Error, Result, TransportError, ValueError};
use crate::event::{DeviceEvent, DeviceEvents};
use crate::protocol::{CommandRequest, CredentialStore, StaticToken, Transport};
use crate::state::{DeviceSnapshot, MergeOutcome, PartialUpdate, Precondition, check_command, merge};
use crate::subscription::SubscriptionId;
use crate::types::DeviceId;

use slot::{DeviceSlot, Notifier};

/// What happened to a command that passed local validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was handed to the transport.
    Sent,
    /// The device was already in the requested state; nothing was sent.
    AlreadySatisfied,
}

/// Tracks mower state and forwards commands.
///
/// Dispatchers share nothing with each other. All methods take `&self`, so a
/// dispatcher can be wrapped in an `Arc` and used from several tasks.
pub struct Dispatcher<T, C = StaticToken> {
    transport: T,
    credentials: C,
    devices: RwLock<HashMap<DeviceId, DeviceInfo>>,
    slots: RwLock<HashMap<DeviceId, Arc<DeviceSlot>>>,
    notifier: Arc<Notifier>,
    /// Serializes connect and disconnect, which await the transport.
    connection_lock: AsyncMutex<()>,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher with default settings and an empty token.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::builder(transport).build()
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder(transport: T) -> DispatcherBuilder<T> {
        DispatcherBuilder::new(transport)
    }
}

impl<T: Transport, C: CredentialStore> Dispatcher<T, C> {
    pub(crate) fn from_parts(transport: T, credentials: C, event_capacity: usize) -> Self {
        Self {
            transport,
            credentials,
            devices: RwLock::new(HashMap::new()),
            slots: RwLock::new(HashMap::new()),
            notifier: Arc::new(Notifier::new(event_capacity)),
            connection_lock: AsyncMutex::new(()),
        }
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Enumerates a device.
    ///
    /// Returns `false` if a device with the same id was already known; its
    /// info is replaced, which takes effect on the next connect.
    pub fn add_device(&self, info: DeviceInfo) -> bool {
        let id = info.id().clone();
        let added = self.devices.write().insert(id.clone(), info).is_none();
        tracing::debug!(device_id = %id, added, "Enumerated device");
        added
    }

    /// Forgets a device, disconnecting it first if needed.
    ///
    /// Returns `false` if the device was not known.
    pub async fn remove_device(&self, device_id: &DeviceId) -> bool {
        if self.is_connected(device_id) {
            // Only fails if another task disconnected it in between
            let _ = self.disconnect(device_id).await;
        }
        self.devices.write().remove(device_id).is_some()
    }

    /// Returns the ids of all enumerated devices.
    #[must_use]
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().keys().cloned().collect()
    }

    /// Returns the info of an enumerated device.
    #[must_use]
    pub fn device_info(&self, device_id: &DeviceId) -> Option<DeviceInfo> {
        self.devices.read().get(device_id).cloned()
    }

    /// Returns `true` if the device is connected.
    #[must_use]
    pub fn is_connected(&self, device_id: &DeviceId) -> bool {
        self.slots.read().contains_key(device_id)
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Connects a device: subscribes to its push updates and starts tracking
    /// its state.
    ///
    /// The snapshot starts empty, or from the device's last known state if
    /// one was enumerated. Connecting an already connected device returns a
    /// handle to the existing connection.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` if the device was never enumerated, or
    /// `Error::Transport` if the subscription fails.
    pub async fn connect(&self, device_id: &DeviceId) -> Result<DeviceHandle> {
        let _guard = self.connection_lock.lock().await;

        let info = self
            .device_info(device_id)
            .ok_or_else(|| Error::UnknownDevice(device_id.clone()))?;

        if let Some(slot) = self.slots.read().get(device_id) {
            return Ok(DeviceHandle::new(device_id.clone(), slot.watch()));
        }

        let push = self.transport.subscribe(device_id).await?;

        let mut initial = DeviceSnapshot::new(device_id.clone());
        if let Some(last_known) = info.last_known() {
            initial = merge(&initial, last_known).snapshot;
        }

        let slot = DeviceSlot::spawn(initial, push, Arc::clone(&self.notifier));
        let handle = DeviceHandle::new(device_id.clone(), slot.watch());
        self.slots.write().insert(device_id.clone(), slot);

        tracing::debug!(%device_id, name = info.display_name(), "Connected device");
        self.notifier.notify(DeviceEvent::Connected {
            device_id: device_id.clone(),
        });
        Ok(handle)
    }

    /// Disconnects a device and discards its snapshot.
    ///
    /// A merge that is already running finishes against the discarded
    /// snapshot; it is never visible to a later connect.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` or `Error::NotConnected`.
    pub async fn disconnect(&self, device_id: &DeviceId) -> Result<()> {
        let _guard = self.connection_lock.lock().await;

        if !self.devices.read().contains_key(device_id) {
            return Err(Error::UnknownDevice(device_id.clone()));
        }
        let slot = self
            .slots
            .write()
            .remove(device_id)
            .ok_or_else(|| Error::NotConnected(device_id.clone()))?;

        slot.close();
        self.transport.unsubscribe(device_id).await;

        tracing::debug!(%device_id, "Disconnected device");
        self.notifier.notify(DeviceEvent::Disconnected {
            device_id: device_id.clone(),
        });
        Ok(())
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Registers a callback for every device event.
    ///
    /// Callbacks run in registration order on the device's merge task. A
    /// panicking callback is logged and does not affect the others.
    pub fn register_callback<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static,
    {
        self.notifier.callbacks.register(callback)
    }

    /// Removes a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.callbacks.unsubscribe(id)
    }

    /// Returns how many callback invocations have panicked.
    #[must_use]
    pub fn callback_panic_count(&self) -> u64 {
        self.notifier.callbacks.panic_count()
    }

    /// Subscribes to the event stream.
    ///
    /// Receives the same events as callbacks, published after them.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.notifier.events.subscribe()
    }

    /// Subscribes to the events of one device.
    ///
    /// The device does not need to be enumerated yet.
    #[must_use]
    pub fn subscribe_device(&self, device_id: &DeviceId) -> DeviceEvents {
        self.notifier.events.subscribe_device(device_id.clone())
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Returns a copy of a device's current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` or `Error::NotConnected`.
    pub fn current_snapshot(&self, device_id: &DeviceId) -> Result<DeviceSnapshot> {
        Ok(self.slot(device_id)?.snapshot())
    }

    /// Returns a receiver that observes every snapshot replacement.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` or `Error::NotConnected`.
    pub fn watch(&self, device_id: &DeviceId) -> Result<watch::Receiver<DeviceSnapshot>> {
        Ok(self.slot(device_id)?.watch())
    }

    /// Merges an update as if it had been pushed by the device, and waits for
    /// the merge to complete.
    ///
    /// The update is queued behind pending push updates for the same device.
    /// An update carrying another device's serial number is dropped, and the
    /// returned outcome holds the current snapshot with no changes.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` or `Error::NotConnected`, including
    /// when the device is disconnected before the update is merged.
    pub async fn apply_update(&self, device_id: &DeviceId, update: PartialUpdate) -> Result<MergeOutcome> {
        let slot = self.slot(device_id)?;
        slot.inject(update)
            .await
            .ok_or_else(|| Error::NotConnected(device_id.clone()))
    }

    fn slot(&self, device_id: &DeviceId) -> Result<Arc<DeviceSlot>> {
        if let Some(slot) = self.slots.read().get(device_id) {
            return Ok(Arc::clone(slot));
        }
        if self.devices.read().contains_key(device_id) {
            Err(Error::NotConnected(device_id.clone()))
        } else {
            Err(Error::UnknownDevice(device_id.clone()))
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Validates a command against the device's state and sends it.
    ///
    /// Nothing reaches the transport unless every local check passes. The
    /// command is sent once; transport errors are returned unchanged. When
    /// the transport reports `AuthenticationFailed` the credential store is
    /// invalidated so the next command fetches a fresh token.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownDevice` / `Error::NotConnected`
    /// - `Error::InvalidStateTransition` if the lifecycle state forbids it
    /// - `Error::CapabilityNotSupported` if the mower lacks the feature
    /// - `Error::Transport` if the token or the send fails
    pub async fn command(&self, device_id: &DeviceId, command: MowerCommand) -> Result<CommandOutcome> {
        let snapshot = self.slot(device_id)?.snapshot();
        let kind = command.kind();

        if check_command(kind, &snapshot)? == Precondition::AlreadySatisfied {
            tracing::debug!(%device_id, command = %kind, "Command already satisfied, not sending");
            return Ok(CommandOutcome::AlreadySatisfied);
        }
        check_capability(&command, &snapshot)?;

        let request = CommandRequest {
            kind,
            payload: command.payload(),
            token: self.credentials.token().await?,
        };

        tracing::debug!(%device_id, command = %kind, payload = %request.payload, "Sending command");
        match self.transport.send(device_id, &request).await {
            Ok(()) => Ok(CommandOutcome::Sent),
            Err(TransportError::AuthenticationFailed) => {
                tracing::warn!(%device_id, command = %kind, "Token rejected, invalidating");
                self.credentials.invalidate().await;
                Err(TransportError::AuthenticationFailed.into())
            }
            Err(e) => {
                tracing::debug!(%device_id, command = %kind, error = %e, "Command failed");
                Err(e.into())
            }
        }
    }

    /// Starts mowing.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn start(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::Start).await
    }

    /// Pauses the current task.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn pause(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::Pause).await
    }

    /// Pauses on the border wire.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn pause_over_wire(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::PauseOverWire).await
    }

    /// Sends the mower home.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn home(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::Home).await
    }

    /// Sends the mower home with the blades off.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn safe_home(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::SafeHome).await
    }

    /// Starts zone training.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn zone_training(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::ZoneTraining).await
    }

    /// Starts a one-time schedule.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command). Fails with
    /// `Error::CapabilityNotSupported` if the mower never reported one-time
    /// schedule support.
    pub async fn one_time_schedule(
        &self,
        device_id: &DeviceId,
        boundary: bool,
        runtime_minutes: u16,
    ) -> Result<CommandOutcome> {
        self.command(
            device_id,
            MowerCommand::one_time_schedule(boundary, runtime_minutes),
        )
        .await
    }

    /// Selects the zone (0-3) to mow on the next task.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command). Fails with `Error::Value` if the zone
    /// is out of range, undefined, or the zone configuration is unknown. The
    /// state check runs first, so a running schedule is reported as an
    /// invalid transition even when the zones are unknown.
    pub async fn set_zone(&self, device_id: &DeviceId, zone: u8) -> Result<CommandOutcome> {
        let snapshot = self.slot(device_id)?.snapshot();
        check_command(CommandKind::SetZone, &snapshot)?;
        let (Some(sequence), Some(starts), Some(index)) = (
            snapshot.zone_sequence(),
            snapshot.zone_starts(),
            snapshot.current_zone_index(),
        ) else {
            return Err(ValueError::ZonesUnknown.into());
        };

        let sequence = rotate_zone_sequence(sequence, starts, index, zone)?;
        self.command(device_id, MowerCommand::SetZone { zone, sequence })
            .await
    }

    /// Locks or unlocks the mower.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn set_lock(&self, device_id: &DeviceId, locked: bool) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::lock(locked)).await
    }

    /// Reboots the mower's baseboard.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn restart(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::Restart).await
    }

    /// Asks the mower to push its current state.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn refresh(&self, device_id: &DeviceId) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::Refresh).await
    }

    /// Sets the rain delay in minutes.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn set_rain_delay(&self, device_id: &DeviceId, minutes: u16) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::SetRainDelay(minutes))
            .await
    }

    /// Enables or disables the mowing schedule.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn set_schedule_enabled(&self, device_id: &DeviceId, enabled: bool) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::SetSchedule(enabled))
            .await
    }

    /// Enables or disables party mode.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command). Fails with
    /// `Error::CapabilityNotSupported` if the mower never reported party
    /// mode support.
    pub async fn set_party_mode(&self, device_id: &DeviceId, enabled: bool) -> Result<CommandOutcome> {
        self.command(device_id, MowerCommand::SetPartyMode(enabled))
            .await
    }

    /// Sends a raw JSON object.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command). Fails with `Error::Parse` if `json`
    /// is not valid JSON, or `Error::Value` if it is not an object.
    pub async fn send_raw(&self, device_id: &DeviceId, json: &str) -> Result<CommandOutcome> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(crate::error::ParseError::from)?;
        self.command(device_id, MowerCommand::raw(value)?).await
    }
}

impl<T, C> Drop for Dispatcher<T, C> {
    fn drop(&mut self) {
        for slot in self.slots.get_mut().values() {
            slot.close();
        }
    }
}

impl<T, C> std::fmt::Debug for Dispatcher<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("devices", &self.devices.read().len())
            .field("connected", &self.slots.read().len())
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

fn check_capability(command: &MowerCommand, snapshot: &DeviceSnapshot) -> Result<()> {
    let capabilities = snapshot.capabilities();
    match command {
        MowerCommand::OneTimeSchedule { .. } if !capabilities.one_time_schedule => {
            Err(Error::CapabilityNotSupported("one-time schedules"))
        }
        MowerCommand::SetPartyMode(_) if !capabilities.party_mode => {
            Err(Error::CapabilityNotSupported("party mode"))
        }
        _ => Ok(()),
    }
}

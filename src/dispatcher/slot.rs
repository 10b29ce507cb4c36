// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device merge task.
//!
//! Each connected device owns one slot and one tokio task. The task is the
//! only writer of the slot's snapshot: it consumes push updates and injected
//! updates one at a time, so merges for a device never interleave. Readers
//! get clones through the slot's `watch` channel, which swaps the whole
//! snapshot at once.
//!
//! Disconnecting closes the slot. A reconnect builds a new slot, so a merge
//! still running on the old task can only ever write to the old slot. A
//! merge that finishes after the slot was closed publishes nothing.
//!
//! Updates carrying another device's serial number are dropped, whether they
//! arrive from the push stream or are injected.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::event::{Anomaly, DeviceEvent, EventBus};
use crate::state::{
    DeviceSnapshot, FieldChange, MergeOutcome, PartialUpdate, TransitionKind, merge,
};
use crate::subscription::CallbackRegistry;
use crate::types::DeviceId;

/// Queue depth for updates injected through the dispatcher.
const INJECT_CAPACITY: usize = 32;

type Injected = (PartialUpdate, oneshot::Sender<MergeOutcome>);

/// Event fan-out shared by all device tasks of a dispatcher.
#[derive(Debug)]
pub(crate) struct Notifier {
    pub(crate) callbacks: CallbackRegistry,
    pub(crate) events: EventBus,
}

impl Notifier {
    pub(crate) fn new(event_capacity: usize) -> Self {
        Self {
            callbacks: CallbackRegistry::new(),
            events: EventBus::with_capacity(event_capacity),
        }
    }

    /// Runs callbacks, then publishes on the bus.
    pub(crate) fn notify(&self, event: DeviceEvent) {
        self.callbacks.dispatch(&event);
        self.events.publish(event);
    }
}

/// Live state of one connected device.
#[derive(Debug)]
pub(crate) struct DeviceSlot {
    device_id: DeviceId,
    snapshot: watch::Sender<DeviceSnapshot>,
    injector: mpsc::Sender<Injected>,
    closed: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceSlot {
    /// Creates a slot seeded with `initial` and starts its merge task.
    pub(crate) fn spawn(
        initial: DeviceSnapshot,
        push: mpsc::Receiver<PartialUpdate>,
        notifier: Arc<Notifier>,
    ) -> Arc<Self> {
        let device_id = initial.device_id().clone();
        let (snapshot, _) = watch::channel(initial);
        let (injector, injected) = mpsc::channel(INJECT_CAPACITY);

        let slot = Arc::new(Self {
            device_id,
            snapshot,
            injector,
            closed: AtomicBool::new(false),
            task: Mutex::new(None),
        });

        let handle = tokio::spawn(run(Arc::clone(&slot), push, injected, notifier));
        *slot.task.lock() = Some(handle);
        slot
    }

    pub(crate) fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<DeviceSnapshot> {
        self.snapshot.subscribe()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Queues an update behind any pending push updates and waits for it to
    /// be merged. Returns `None` if the slot was closed first.
    pub(crate) async fn inject(&self, update: PartialUpdate) -> Option<MergeOutcome> {
        let (ack, done) = oneshot::channel();
        self.injector.send((update, ack)).await.ok()?;
        done.await.ok()
    }

    /// Stops the merge task. Safe to call more than once.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    /// Returns `false` for updates addressed to another device.
    fn accepts(&self, update: &PartialUpdate) -> bool {
        match update.serial_number() {
            Some(serial) if serial != &self.device_id => {
                tracing::warn!(
                    device_id = %self.device_id,
                    %serial,
                    "Dropping update addressed to another device"
                );
                false
            }
            _ => true,
        }
    }

    /// Outcome reported for an update that was dropped.
    fn unchanged(&self) -> MergeOutcome {
        MergeOutcome {
            snapshot: self.snapshot(),
            changes: Vec::new(),
            transition: None,
        }
    }

    fn apply(&self, update: &PartialUpdate, notifier: &Notifier) -> Option<MergeOutcome> {
        if self.is_closed() {
            return None;
        }

        let current = self.snapshot.borrow().clone();
        let outcome = merge(&current, update);
        self.snapshot.send_replace(outcome.snapshot.clone());

        tracing::debug!(
            device_id = %self.device_id,
            changes = outcome.changes.len(),
            transition = outcome.transition.is_some(),
            "Merged update"
        );

        self.publish(update, &outcome, notifier).then_some(outcome)
    }

    /// Emits the events for a merge unless the slot was closed meanwhile.
    fn publish(&self, update: &PartialUpdate, outcome: &MergeOutcome, notifier: &Notifier) -> bool {
        if self.is_closed() {
            tracing::debug!(device_id = %self.device_id, "Slot closed during merge, dropping events");
            return false;
        }
        for event in events_for(&self.device_id, update, outcome) {
            notifier.notify(event);
        }
        true
    }
}

async fn run(
    slot: Arc<DeviceSlot>,
    mut push: mpsc::Receiver<PartialUpdate>,
    mut injected: mpsc::Receiver<Injected>,
    notifier: Arc<Notifier>,
) {
    let device_id = slot.device_id.clone();
    tracing::debug!(%device_id, "Starting merge task");

    let mut push_open = true;
    loop {
        tokio::select! {
            update = push.recv(), if push_open => match update {
                Some(update) => {
                    if slot.accepts(&update) {
                        slot.apply(&update, &notifier);
                    }
                }
                None => {
                    tracing::debug!(%device_id, "Push stream ended");
                    push_open = false;
                }
            },
            Some((update, ack)) = injected.recv() => {
                let outcome = if slot.accepts(&update) {
                    slot.apply(&update, &notifier)
                } else {
                    Some(slot.unchanged())
                };
                if let Some(outcome) = outcome {
                    // The caller may have stopped waiting
                    let _ = ack.send(outcome);
                }
            }
            else => break,
        }
    }

    tracing::debug!(%device_id, "Merge task stopped");
}

/// Derives the events for one merge, in delivery order.
fn events_for(device_id: &DeviceId, update: &PartialUpdate, outcome: &MergeOutcome) -> Vec<DeviceEvent> {
    let mut events = Vec::new();

    if outcome.has_changes() {
        events.push(DeviceEvent::FieldUpdate {
            device_id: device_id.clone(),
            changes: outcome.changes.clone(),
            snapshot: Box::new(outcome.snapshot.clone()),
        });
    }

    if let Some(transition) = outcome.transition {
        match transition.kind {
            TransitionKind::Expected => {}
            TransitionKind::Anomalous => tracing::warn!(
                %device_id,
                from = ?transition.from,
                to = %transition.to,
                "Implausible lifecycle transition"
            ),
            TransitionKind::ProtocolDrift => tracing::warn!(
                %device_id,
                code = transition.to.code(),
                "Device reported an unknown status code"
            ),
        }
        events.push(DeviceEvent::StateTransition {
            device_id: device_id.clone(),
            transition,
        });
    }

    for change in &outcome.changes {
        let anomaly = match change {
            FieldChange::Status(state) if state.is_unknown() => Anomaly::UnknownStatus(state.code()),
            FieldChange::Error(error) if error.is_unknown() => {
                tracing::warn!(%device_id, code = error.code(), "Device reported an unknown error code");
                Anomaly::UnknownError(error.code())
            }
            _ => continue,
        };
        events.push(DeviceEvent::Anomaly {
            device_id: device_id.clone(),
            anomaly,
        });
    }

    for field in update.rejected_fields() {
        events.push(DeviceEvent::Anomaly {
            device_id: device_id.clone(),
            anomaly: Anomaly::RejectedField(field.clone()),
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LifecycleState;

    fn id() -> DeviceId {
        DeviceId::new("SN1")
    }

    fn outcome_for(start: &DeviceSnapshot, update: &PartialUpdate) -> Vec<DeviceEvent> {
        events_for(&id(), update, &merge(start, update))
    }

    #[test]
    fn status_change_yields_update_then_transition() {
        let update = PartialUpdate::builder().status(7).build();
        let events = outcome_for(&DeviceSnapshot::new(id()), &update);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DeviceEvent::FieldUpdate { .. }));
        assert_eq!(
            events[1].transition().map(|t| t.to),
            Some(LifecycleState::Cutting)
        );
    }

    #[test]
    fn unchanged_update_yields_nothing() {
        let update = PartialUpdate::builder().status(1).build();
        let start = merge(&DeviceSnapshot::new(id()), &update).snapshot;
        assert!(outcome_for(&start, &update).is_empty());
    }

    #[test]
    fn unknown_codes_and_rejected_fields_are_anomalies() {
        let update = PartialUpdate::builder()
            .status(99)
            .error(77)
            .rejected("dat.rsi")
            .build();
        let events = outcome_for(&DeviceSnapshot::new(id()), &update);

        let anomalies: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::Anomaly { anomaly, .. } => Some(anomaly.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            anomalies,
            vec![
                Anomaly::UnknownStatus(99),
                Anomaly::UnknownError(77),
                Anomaly::RejectedField("dat.rsi".into()),
            ]
        );
    }

    #[tokio::test]
    async fn injected_update_is_merged() {
        let notifier = Arc::new(Notifier::new(16));
        let (_tx, rx) = mpsc::channel(4);
        let slot = DeviceSlot::spawn(DeviceSnapshot::new(id()), rx, notifier);

        let outcome = slot
            .inject(PartialUpdate::builder().status(1).build())
            .await
            .unwrap();
        assert_eq!(outcome.snapshot.lifecycle_state(), Some(LifecycleState::Home));
        assert_eq!(slot.snapshot().lifecycle_state(), Some(LifecycleState::Home));
        slot.close();
    }

    #[tokio::test]
    async fn closed_slot_ignores_updates() {
        let notifier = Arc::new(Notifier::new(16));
        let (_tx, rx) = mpsc::channel(4);
        let slot = DeviceSlot::spawn(DeviceSnapshot::new(id()), rx, notifier);

        slot.close();
        slot.close();
        assert!(slot.is_closed());
        assert!(
            slot.inject(PartialUpdate::builder().status(1).build())
                .await
                .is_none()
        );
        assert_eq!(slot.snapshot().lifecycle_state(), None);
    }

    #[tokio::test]
    async fn foreign_serial_is_dropped() {
        let notifier = Arc::new(Notifier::new(16));
        let mut events = notifier.events.subscribe();
        let (tx, rx) = mpsc::channel(4);
        let slot = DeviceSlot::spawn(DeviceSnapshot::new(id()), rx, Arc::clone(&notifier));

        tx.send(PartialUpdate::builder().status(7).serial_number("OTHER").build())
            .await
            .unwrap();
        tx.send(PartialUpdate::builder().status(1).serial_number("SN1").build())
            .await
            .unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(
            first.changes(),
            Some(&[FieldChange::Status(LifecycleState::Home)][..])
        );
        slot.close();
    }

    #[tokio::test]
    async fn injected_foreign_serial_is_dropped() {
        let notifier = Arc::new(Notifier::new(16));
        let mut events = notifier.events.subscribe();
        let (_tx, rx) = mpsc::channel(4);
        let slot = DeviceSlot::spawn(DeviceSnapshot::new(id()), rx, Arc::clone(&notifier));

        let outcome = slot
            .inject(PartialUpdate::builder().status(7).serial_number("OTHER").build())
            .await
            .unwrap();
        assert!(!outcome.has_changes());
        assert!(outcome.transition.is_none());
        assert_eq!(outcome.snapshot.lifecycle_state(), None);
        assert_eq!(slot.snapshot().lifecycle_state(), None);
        assert!(events.try_recv().is_err());
        slot.close();
    }

    #[tokio::test]
    async fn closed_during_merge_publishes_nothing() {
        let notifier = Notifier::new(16);
        let mut events = notifier.events.subscribe();
        let (_tx, rx) = mpsc::channel(4);
        let slot = DeviceSlot::spawn(DeviceSnapshot::new(id()), rx, Arc::new(Notifier::new(16)));

        let update = PartialUpdate::builder().status(7).build();
        let outcome = merge(&slot.snapshot(), &update);
        assert!(slot.publish(&update, &outcome, &notifier));
        assert_eq!(events.len(), 2);
        while events.try_recv().is_ok() {}

        slot.close();
        assert!(!slot.publish(&update, &outcome, &notifier));
        assert!(events.try_recv().is_err());
    }
}

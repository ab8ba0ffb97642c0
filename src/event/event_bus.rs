// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting store events.

use tokio::sync::broadcast;

use super::StoreEvent;

/// Default channel capacity for the event bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Event bus for broadcasting store events to multiple subscribers.
///
/// The `EventBus` uses tokio's broadcast channel so that every subscriber
/// gets its own copy of each event, in publication order.
///
/// # Capacity
///
/// The event bus has a fixed capacity (default 256). A subscriber that
/// falls further behind loses the oldest events and receives
/// `RecvError::Lagged`; the latest snapshot is always available from
/// [`DeviceStateStore::watch`](crate::DeviceStateStore::watch).
///
/// # Examples
///
/// ```
/// use perisync_lib::event::{EventBus, StoreEvent};
/// use perisync_lib::state::Alert;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(StoreEvent::AlertRaised { alert: Alert::PairingIssue, revision: 1 });
/// assert!(rx.try_recv().unwrap().is_alert());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to store events.
    ///
    /// Returns a receiver that will receive all events published after
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to all subscribers.
    ///
    /// If there are no subscribers, the event is silently discarded.
    pub fn publish(&self, event: StoreEvent) {
        // No receivers is not an error for a broadcast bus.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Alert, ConnectionStatus, DeviceSnapshot};

    fn changed(revision: u64) -> StoreEvent {
        StoreEvent::StateChanged {
            previous: ConnectionStatus::NoDevice,
            snapshot: DeviceSnapshot::new(ConnectionStatus::Connecting, None, revision),
        }
    }

    #[test]
    fn new_bus_has_no_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn drop_subscriber_decrements_count() {
        let bus = EventBus::new();

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_multiple_subscribers_in_order() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(changed(1));
        bus.publish(StoreEvent::AlertRaised {
            alert: Alert::PairingIssue,
            revision: 1,
        });

        for rx in [&mut rx1, &mut rx2] {
            assert!(rx.recv().await.unwrap().is_state_change());
            assert!(rx.recv().await.unwrap().is_alert());
        }
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::with_capacity(4);
        bus.publish(changed(1));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn clone_shares_same_channel() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let _rx = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);
    }
}

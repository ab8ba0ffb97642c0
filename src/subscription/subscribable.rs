// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that publish device state.

use crate::state::{Alert, ConnectionStatus, DeviceSnapshot, PeripheralInfo};
use crate::subscription::SubscriptionId;

/// Trait for types that support state subscriptions.
///
/// Callbacks are invoked synchronously from the store's delivery context,
/// one update at a time and in publication order. They should return
/// quickly; long work belongs in a task fed by
/// [`DeviceStateStore::subscribe_events`](crate::DeviceStateStore::subscribe_events).
///
/// # Examples
///
/// ```
/// use perisync_lib::subscription::Subscribable;
/// use perisync_lib::DeviceStateStore;
/// # use perisync_lib::channel::CommandChannel;
/// # use perisync_lib::error::TransportError;
/// # use perisync_lib::state::PeripheralInfo;
/// # use tokio_util::sync::CancellationToken;
/// # struct Offline;
/// # impl CommandChannel for Offline {
/// #     async fn query_info(&self, _: CancellationToken) -> Result<PeripheralInfo, TransportError> {
/// #         Err(TransportError::LinkDown("offline".into()))
/// #     }
/// #     async fn play_alert(&self, _: CancellationToken) -> Result<(), TransportError> { Ok(()) }
/// #     async fn release_session(&self) -> Result<(), TransportError> { Ok(()) }
/// # }
///
/// let store = DeviceStateStore::new(Offline);
///
/// let sub_id = store.on_state_changed(|snapshot| {
///     println!("status is now {}", snapshot.status());
/// });
/// store.on_alert(|alert| println!("alert: {alert:?}"));
///
/// assert!(store.unsubscribe(sub_id));
/// ```
pub trait Subscribable {
    /// Subscribes to every published snapshot.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static;

    /// Subscribes to one-shot alerts.
    ///
    /// Each alert is delivered once per issue episode, right after the
    /// snapshot that entered the issue status.
    fn on_alert<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Alert) + Send + Sync + 'static;

    /// Subscribes to connection events.
    ///
    /// The callback receives the peripheral info that came with the
    /// connection.
    fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PeripheralInfo) + Send + Sync + 'static;

    /// Subscribes to disconnection events.
    ///
    /// The callback receives the status that replaced `Connected`.
    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device state subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::{Alert, ConnectionStatus, DeviceSnapshot, PeripheralInfo};

/// Unique identifier for a subscription.
///
/// This ID is returned when creating a subscription and can be used to
/// unsubscribe later. IDs are unique within a store's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for snapshot callbacks.
type StateCallback = Arc<dyn Fn(&DeviceSnapshot) + Send + Sync>;

/// Type alias for alert callbacks.
type AlertCallback = Arc<dyn Fn(Alert) + Send + Sync>;

/// Type alias for connected callbacks (receives the fresh info).
type ConnectedCallback = Arc<dyn Fn(&PeripheralInfo) + Send + Sync>;

/// Type alias for disconnected callbacks (receives the status left behind for).
type DisconnectedCallback = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

/// Registry for managing store subscription callbacks.
///
/// Callbacks are kept behind `parking_lot::RwLock`s and cloned out before
/// they are invoked, so a callback may subscribe or unsubscribe without
/// deadlocking the registry.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Snapshot callbacks (every published update).
    state_callbacks: RwLock<HashMap<SubscriptionId, StateCallback>>,
    /// One-shot alert callbacks.
    alert_callbacks: RwLock<HashMap<SubscriptionId, AlertCallback>>,
    /// Called when the status enters `Connected`.
    connected_callbacks: RwLock<HashMap<SubscriptionId, ConnectedCallback>>,
    /// Called when the status leaves `Connected`.
    disconnected_callbacks: RwLock<HashMap<SubscriptionId, DisconnectedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            state_callbacks: RwLock::new(HashMap::new()),
            alert_callbacks: RwLock::new(HashMap::new()),
            connected_callbacks: RwLock::new(HashMap::new()),
            disconnected_callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for every published snapshot.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for one-shot alerts.
    pub fn on_alert<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Alert) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.alert_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the peripheral becomes connected.
    pub fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PeripheralInfo) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.connected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the peripheral stops being connected.
    ///
    /// The callback receives the status that replaced `Connected`.
    pub fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.disconnected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state_callbacks.write().remove(&id).is_some()
            || self.alert_callbacks.write().remove(&id).is_some()
            || self.connected_callbacks.write().remove(&id).is_some()
            || self.disconnected_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.state_callbacks.write().clear();
        self.alert_callbacks.write().clear();
        self.connected_callbacks.write().clear();
        self.disconnected_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches a published snapshot.
    ///
    /// Snapshot callbacks run first, then connected/disconnected callbacks
    /// if the update crossed the `Connected` boundary, then alert callbacks.
    /// Order among callbacks of one kind is unspecified.
    pub fn dispatch(
        &self,
        previous: ConnectionStatus,
        snapshot: &DeviceSnapshot,
        alert: Option<Alert>,
    ) {
        for callback in snapshot_of(&self.state_callbacks) {
            callback(snapshot);
        }

        match (previous.is_connected(), snapshot.info()) {
            (false, Some(info)) => {
                for callback in snapshot_of(&self.connected_callbacks) {
                    callback(info);
                }
            }
            (true, _) if !snapshot.is_connected() => {
                for callback in snapshot_of(&self.disconnected_callbacks) {
                    callback(snapshot.status());
                }
            }
            _ => {}
        }

        if let Some(alert) = alert {
            for callback in snapshot_of(&self.alert_callbacks) {
                callback(alert);
            }
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.state_callbacks.read().len()
            + self.alert_callbacks.read().len()
            + self.connected_callbacks.read().len()
            + self.disconnected_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

fn snapshot_of<T: ?Sized>(callbacks: &RwLock<HashMap<SubscriptionId, Arc<T>>>) -> Vec<Arc<T>> {
    callbacks.read().values().cloned().collect()
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

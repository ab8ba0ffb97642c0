// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state store: the single writer of the peripheral's state.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::channel::CommandChannel;
use crate::error::{CommandError, SyncError, TransitionError, TransportError};
use crate::event::{EventBus, StoreEvent};
use crate::state::{
    Alert, ConnectionStatus, ConnectionStatusMachine, DeviceSnapshot, PeripheralInfo, StatusEvent,
    Transition,
};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};

use super::command_handle::CommandHandle;
use super::store_config::StoreConfig;

/// Slot through which coalesced synchronize callers receive the result.
type SyncResultSlot = watch::Sender<Option<Result<(), SyncError>>>;

/// Owner of the peripheral's connection status and info.
///
/// The store is the only writer of [`ConnectionStatus`] and
/// [`PeripheralInfo`]. It drives a [`CommandChannel`], applies the outcome
/// to its [`ConnectionStatusMachine`] and publishes every resulting
/// [`DeviceSnapshot`] through three equivalent surfaces: callbacks
/// ([`Subscribable`]), a [`watch`] channel and a broadcast [`EventBus`].
///
/// # Publication order
///
/// Mutations are queued under the store's lock and delivered by whichever
/// caller finds no delivery in progress, one update at a time. Every
/// observer therefore sees snapshots in revision order and never two
/// updates concurrently. A callback that mutates the store has its own
/// update delivered after the current one.
///
/// # Concurrent synchronize calls
///
/// Calls are coalesced: while a synchronize is in flight, further calls
/// issue no channel traffic and resolve with the in-flight call's result.
///
/// # Examples
///
/// ```no_run
/// use perisync_lib::{DeviceStateStore, StoreConfig};
/// use perisync_lib::subscription::Subscribable;
/// # use perisync_lib::channel::CommandChannel;
/// # use perisync_lib::error::TransportError;
/// # use perisync_lib::state::PeripheralInfo;
/// # use tokio_util::sync::CancellationToken;
/// # struct Rpc;
/// # impl CommandChannel for Rpc {
/// #     async fn query_info(&self, _: CancellationToken) -> Result<PeripheralInfo, TransportError> {
/// #         Ok(PeripheralInfo::new("a1b2c3d 0.43.1 dev 12-10-2021", "0.13"))
/// #     }
/// #     async fn play_alert(&self, _: CancellationToken) -> Result<(), TransportError> { Ok(()) }
/// #     async fn release_session(&self) -> Result<(), TransportError> { Ok(()) }
/// # }
///
/// #[tokio::main]
/// async fn main() -> perisync_lib::Result<()> {
///     let store = DeviceStateStore::with_config(Rpc, StoreConfig::default());
///
///     store.on_alert(|alert| println!("show alert: {alert:?}"));
///
///     store.synchronize().await?;
///     if let Some(info) = store.peripheral_info() {
///         println!("firmware {}", info.software().version());
///     }
///
///     store.play_alert().await?;
///     store.forget_device().await?;
///     Ok(())
/// }
/// ```
pub struct DeviceStateStore<C> {
    inner: Arc<StoreInner<C>>,
}

struct StoreInner<C> {
    channel: C,
    config: StoreConfig,
    /// Guards the in-flight marker and the snapshot swap.
    state: Mutex<StoreState>,
    snapshot_tx: watch::Sender<DeviceSnapshot>,
    callbacks: CallbackRegistry,
    event_bus: EventBus,
}

struct StoreState {
    machine: ConnectionStatusMachine,
    snapshot: DeviceSnapshot,
    in_flight: Option<InFlightSync>,
    /// Parent of every call token; replaced when the device is forgotten.
    session: CancellationToken,
    next_sync_id: u64,
    outbox: VecDeque<Publication>,
    delivering: bool,
}

struct InFlightSync {
    id: u64,
    cancel: CancellationToken,
    result: SyncResultSlot,
}

impl InFlightSync {
    fn resolve(self, result: Result<(), SyncError>) {
        self.result.send_replace(Some(result));
    }
}

#[derive(Debug)]
struct Publication {
    previous: ConnectionStatus,
    snapshot: DeviceSnapshot,
    alert: Option<Alert>,
}

enum SyncRole {
    Leader { id: u64, cancel: CancellationToken },
    Follower(watch::Receiver<Option<Result<(), SyncError>>>),
}

impl StoreState {
    fn new() -> Self {
        Self {
            machine: ConnectionStatusMachine::new(),
            snapshot: DeviceSnapshot::default(),
            in_flight: None,
            session: CancellationToken::new(),
            next_sync_id: 1,
            outbox: VecDeque::new(),
            delivering: false,
        }
    }

    /// Applies an event and queues a publication if anything visible changed.
    fn apply(
        &mut self,
        event: StatusEvent,
        info: Option<Arc<PeripheralInfo>>,
    ) -> Result<Transition, TransitionError> {
        let transition = self.machine.apply(event)?;

        if transition.alert.is_some() || !self.snapshot.has_content(transition.to, info.as_ref()) {
            let snapshot = DeviceSnapshot::new(transition.to, info, self.snapshot.revision() + 1);
            self.snapshot = snapshot.clone();
            self.outbox.push_back(Publication {
                previous: transition.from,
                snapshot,
                alert: transition.alert,
            });
        }

        Ok(transition)
    }

    fn apply_logged(&mut self, event: StatusEvent, info: Option<Arc<PeripheralInfo>>) {
        match self.apply(event, info) {
            Ok(transition) => {
                tracing::debug!(
                    ?event,
                    from = %transition.from,
                    to = %transition.to,
                    alert = ?transition.alert,
                    "Status transition"
                );
            }
            Err(err) => tracing::warn!(error = %err, "Ignoring invalid status transition"),
        }
    }
}

impl<C: CommandChannel> DeviceStateStore<C> {
    /// Creates a store with default configuration.
    ///
    /// The store starts in [`ConnectionStatus::NoDevice`].
    #[must_use]
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, StoreConfig::default())
    }

    /// Creates a store with the given configuration.
    #[must_use]
    pub fn with_config(channel: C, config: StoreConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(DeviceSnapshot::default());
        let event_bus = EventBus::with_capacity(config.event_capacity.max(1));

        Self {
            inner: Arc::new(StoreInner {
                channel,
                config,
                state: Mutex::new(StoreState::new()),
                snapshot_tx,
                callbacks: CallbackRegistry::new(),
                event_bus,
            }),
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Resynchronizes with the peripheral.
    ///
    /// Moves the status to `Connecting`, queries the peripheral and settles
    /// on `Connected` (with fresh info), `PairingIssue`, `UnsupportedDevice`
    /// or `Disconnected`. A call made while another is in flight joins it
    /// and returns the same result without any channel traffic.
    ///
    /// # Errors
    ///
    /// - `SyncError::PairingFailure` if pairing was rejected
    /// - `SyncError::UnsupportedFirmware` if the firmware is below the floor
    /// - `SyncError::Transport` if the link failed or timed out
    /// - `SyncError::Cancelled` if the device was forgotten meanwhile or the
    ///   leading call was abandoned
    pub async fn synchronize(&self) -> Result<(), SyncError> {
        let role = self.inner.begin_sync();
        self.inner.drain();

        match role {
            SyncRole::Follower(waiter) => {
                tracing::debug!("Joining in-flight synchronize");
                wait_for_result(waiter).await
            }
            SyncRole::Leader { id, cancel } => {
                let mut guard = AbandonGuard {
                    inner: &self.inner,
                    id,
                    armed: true,
                };

                tracing::debug!(sync_id = id, "Querying peripheral info");
                let outcome = self
                    .inner
                    .call(&cancel, self.inner.channel.query_info(cancel.clone()))
                    .await;
                guard.armed = false;

                let result = self.inner.finish_sync(id, outcome);
                self.inner.drain();
                result
            }
        }
    }

    /// Forgets the peripheral.
    ///
    /// Cancels any in-flight synchronize and pending alert, publishes
    /// `NoDevice` without info, then asks the channel to release the paired
    /// session. The status change happens before the release call and
    /// stands regardless of its outcome.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Transport` if the session release fails.
    pub async fn forget_device(&self) -> Result<(), CommandError> {
        self.inner.forget();
        self.inner.drain();

        tracing::info!("Peripheral forgotten, releasing session");
        let cancel = CancellationToken::new();
        self.inner
            .call(&cancel, self.inner.channel.release_session())
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Failed to release peripheral session");
                CommandError::Transport(err)
            })
    }

    /// Makes the peripheral play its alert once.
    ///
    /// Status and info are left untouched.
    ///
    /// # Errors
    ///
    /// - `CommandError::NotConnected` if the status is not `Connected`; the
    ///   channel is not called
    /// - `CommandError::Transport` if the command failed
    /// - `CommandError::Cancelled` if the device was forgotten meanwhile
    pub async fn play_alert(&self) -> Result<(), CommandError> {
        let cancel = {
            let state = self.inner.state.lock();
            if !state.snapshot.is_connected() {
                tracing::debug!(status = %state.snapshot.status(), "Refusing alert while not connected");
                return Err(CommandError::NotConnected);
            }
            state.session.child_token()
        };

        self.inner
            .call(&cancel, self.inner.channel.play_alert(cancel.clone()))
            .await
            .map_err(|err| match err {
                TransportError::Cancelled => CommandError::Cancelled,
                other => {
                    tracing::warn!(error = %other, "Play alert failed");
                    CommandError::Transport(other)
                }
            })
    }

    /// Runs [`synchronize`](Self::synchronize) on its own task.
    #[must_use]
    pub fn spawn_synchronize(&self) -> CommandHandle<SyncError> {
        let store = self.clone();
        CommandHandle::new(
            tokio::spawn(async move { store.synchronize().await }),
            || SyncError::Cancelled,
        )
    }

    /// Runs [`play_alert`](Self::play_alert) on its own task.
    #[must_use]
    pub fn spawn_play_alert(&self) -> CommandHandle<CommandError> {
        let store = self.clone();
        CommandHandle::new(
            tokio::spawn(async move { store.play_alert().await }),
            || CommandError::Cancelled,
        )
    }
}

impl<C> DeviceStateStore<C> {
    // =========================================================================
    // Transport reports
    // =========================================================================

    /// Reports that the link of a connected peripheral dropped.
    ///
    /// Moves `Connected` to `Disconnected` and clears the info. Returns
    /// `false` (and changes nothing) in any other status.
    pub fn report_link_lost(&self) -> bool {
        let changed = {
            let mut state = self.inner.state.lock();
            match state.apply(StatusEvent::LinkLost, None) {
                Ok(_) => {
                    tracing::info!("Peripheral link lost");
                    true
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Ignoring link loss");
                    false
                }
            }
        };
        self.inner.drain();
        changed
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Returns the current snapshot.
    #[must_use]
    pub fn current_state(&self) -> DeviceSnapshot {
        self.inner.state.lock().snapshot.clone()
    }

    /// Returns the current connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.lock().snapshot.status()
    }

    /// Returns the peripheral info while connected.
    #[must_use]
    pub fn peripheral_info(&self) -> Option<Arc<PeripheralInfo>> {
        self.inner.state.lock().snapshot.shared_info()
    }

    /// Returns `true` while a synchronize is in flight.
    #[must_use]
    pub fn is_synchronizing(&self) -> bool {
        self.inner.state.lock().in_flight.is_some()
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Registers an observer for every published snapshot.
    ///
    /// Same as [`Subscribable::on_state_changed`].
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_state_changed(observer)
    }

    /// Creates a watch receiver holding the latest published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DeviceSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Subscribes to the store's event bus.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.event_bus.subscribe()
    }
}

impl<C> StoreInner<C> {
    fn begin_sync(&self) -> SyncRole {
        let mut state = self.state.lock();

        if let Some(in_flight) = &state.in_flight {
            return SyncRole::Follower(in_flight.result.subscribe());
        }

        let id = state.next_sync_id;
        state.next_sync_id += 1;
        let cancel = state.session.child_token();
        let (result, _) = watch::channel(None);

        // Connecting only exists while a sync is in flight, so this cannot fail.
        state.apply_logged(StatusEvent::SyncStarted, None);
        state.in_flight = Some(InFlightSync {
            id,
            cancel: cancel.clone(),
            result,
        });

        SyncRole::Leader { id, cancel }
    }

    fn finish_sync(
        &self,
        id: u64,
        outcome: Result<PeripheralInfo, TransportError>,
    ) -> Result<(), SyncError> {
        let mut state = self.state.lock();

        let Some(in_flight) = state.in_flight.take_if(|in_flight| in_flight.id == id) else {
            tracing::debug!(sync_id = id, "Discarding result of cancelled synchronize");
            return Err(SyncError::Cancelled);
        };

        let (event, info, result) = match outcome {
            Ok(info) => match self.config.check_firmware(&info) {
                Ok(()) => (StatusEvent::HandshakeCompleted, Some(Arc::new(info)), Ok(())),
                Err(reason) => (
                    StatusEvent::FirmwareRejected,
                    None,
                    Err(SyncError::UnsupportedFirmware(reason)),
                ),
            },
            Err(TransportError::PairingRejected(reason)) => (
                StatusEvent::PairingRejected,
                None,
                Err(SyncError::PairingFailure(reason)),
            ),
            Err(TransportError::UnsupportedFirmware(reason)) => (
                StatusEvent::FirmwareRejected,
                None,
                Err(SyncError::UnsupportedFirmware(reason)),
            ),
            Err(err) => (
                StatusEvent::TransportFailed,
                None,
                Err(SyncError::Transport(err)),
            ),
        };

        match &result {
            Ok(()) => tracing::info!(sync_id = id, "Peripheral synchronized"),
            Err(err) => tracing::warn!(sync_id = id, error = %err, "Synchronize failed"),
        }

        state.apply_logged(event, info);
        in_flight.resolve(result.clone());
        result
    }

    fn abandon_sync(&self, id: u64) {
        {
            let mut state = self.state.lock();
            let Some(in_flight) = state.in_flight.take_if(|in_flight| in_flight.id == id) else {
                return;
            };

            tracing::debug!(sync_id = id, "Synchronize abandoned by its caller");
            in_flight.cancel.cancel();
            state.apply_logged(StatusEvent::TransportFailed, None);
            in_flight.resolve(Err(SyncError::Cancelled));
        }
        self.drain();
    }

    fn forget(&self) {
        let mut state = self.state.lock();

        if let Some(in_flight) = state.in_flight.take() {
            tracing::debug!(sync_id = in_flight.id, "Cancelling in-flight synchronize");
            in_flight.cancel.cancel();
            in_flight.resolve(Err(SyncError::Cancelled));
        }

        state.session.cancel();
        state.session = CancellationToken::new();
        state.apply_logged(StatusEvent::Forgotten, None);
    }

    /// Runs one channel call under the configured timeout and `cancel`.
    async fn call<T>(
        &self,
        cancel: &CancellationToken,
        call: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, TransportError> {
        let outcome = tokio::select! {
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = tokio::time::timeout(self.config.command_timeout, call) => {
                result.unwrap_or_else(|_| Err(TransportError::Timeout(self.config.command_timeout_ms())))
            }
        };

        if matches!(outcome, Err(TransportError::Timeout(_))) {
            cancel.cancel();
        }
        outcome
    }

    /// Delivers queued publications until the queue is empty.
    ///
    /// Returns immediately if another caller is already delivering; that
    /// caller picks up whatever was queued meanwhile.
    fn drain(&self) {
        loop {
            let publication = {
                let mut state = self.state.lock();
                if state.delivering {
                    return;
                }
                let Some(publication) = state.outbox.pop_front() else {
                    return;
                };
                state.delivering = true;
                publication
            };

            let _delivering = DeliveringFlag(&self.state);
            self.deliver(&publication);
        }
    }

    fn deliver(&self, publication: &Publication) {
        let Publication {
            previous,
            snapshot,
            alert,
        } = publication;

        tracing::debug!(
            revision = snapshot.revision(),
            from = %previous,
            to = %snapshot.status(),
            "Publishing device state"
        );

        self.snapshot_tx.send_replace(snapshot.clone());
        self.callbacks.dispatch(*previous, snapshot, *alert);
        self.event_bus.publish(StoreEvent::StateChanged {
            previous: *previous,
            snapshot: snapshot.clone(),
        });

        if let Some(alert) = alert {
            tracing::info!(?alert, "Raising alert");
            self.event_bus.publish(StoreEvent::AlertRaised {
                alert: *alert,
                revision: snapshot.revision(),
            });
        }
    }
}

/// Clears the delivering flag, even if a callback panics.
struct DeliveringFlag<'a>(&'a Mutex<StoreState>);

impl Drop for DeliveringFlag<'_> {
    fn drop(&mut self) {
        self.0.lock().delivering = false;
    }
}

/// Resolves a leading synchronize whose caller stopped polling it.
struct AbandonGuard<'a, C> {
    inner: &'a StoreInner<C>,
    id: u64,
    armed: bool,
}

impl<C> Drop for AbandonGuard<'_, C> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.abandon_sync(self.id);
        }
    }
}

async fn wait_for_result(
    mut waiter: watch::Receiver<Option<Result<(), SyncError>>>,
) -> Result<(), SyncError> {
    match waiter.wait_for(Option::is_some).await {
        Ok(result) => (*result).clone().unwrap_or(Err(SyncError::Cancelled)),
        Err(_) => Err(SyncError::Cancelled),
    }
}

impl<C> Subscribable for DeviceStateStore<C> {
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_state_changed(callback)
    }

    fn on_alert<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Alert) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_alert(callback)
    }

    fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PeripheralInfo) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_connected(callback)
    }

    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_disconnected(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }
}

impl<C> Clone for DeviceStateStore<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> std::fmt::Debug for DeviceStateStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("DeviceStateStore")
            .field("status", &state.snapshot.status())
            .field("revision", &state.snapshot.revision())
            .field("synchronizing", &state.in_flight.is_some())
            .field("callbacks", &self.inner.callbacks)
            .finish_non_exhaustive()
    }
}

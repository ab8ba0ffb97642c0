// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `PeriSync` Lib - Connection state for a single paired peripheral.
//!
//! This library keeps the application's view of one paired peripheral
//! (revisions, storage, connection status) consistent with what the
//! peripheral reports over an asynchronous command channel.
//!
//! # Overview
//!
//! - **[`DeviceStateStore`]**: single writer of the connection status and
//!   peripheral info. Runs `synchronize`, `play_alert` and `forget_device`
//!   against a [`CommandChannel`](channel::CommandChannel).
//! - **Publication**: every change is delivered in order to callbacks
//!   ([`Subscribable`]), a `watch` receiver and a broadcast
//!   [`EventBus`](event::EventBus).
//! - **Alerts**: entering `PairingIssue` or `UnsupportedDevice` raises a
//!   one-shot [`Alert`](state::Alert), once per episode.
//! - **[`DeviceView`](view::DeviceView)**: bundled consumer deriving
//!   display labels from snapshots.
//!
//! # Status lifecycle
//!
//! ```text
//! NoDevice ──synchronize──▶ Connecting ──▶ Connected
//!                               │      ──▶ PairingIssue      (alert)
//!                               │      ──▶ UnsupportedDevice (alert)
//!                               └──────▶ Disconnected
//! Connected ──link lost──▶ Disconnected
//! any ──forget_device──▶ NoDevice
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use perisync_lib::{DeviceStateStore, SyncError};
//! use perisync_lib::channel::CommandChannel;
//! use perisync_lib::error::TransportError;
//! use perisync_lib::state::PeripheralInfo;
//! use perisync_lib::subscription::Subscribable;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Rpc;
//!
//! impl CommandChannel for Rpc {
//!     async fn query_info(&self, _cancel: CancellationToken) -> Result<PeripheralInfo, TransportError> {
//!         Ok(PeripheralInfo::new("a1b2c3d 0.43.1 dev 12-10-2021", "0.13"))
//!     }
//!
//!     async fn play_alert(&self, _cancel: CancellationToken) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//!
//!     async fn release_session(&self) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> perisync_lib::Result<()> {
//!     let store = DeviceStateStore::new(Rpc);
//!
//!     store.on_state_changed(|snapshot| {
//!         println!("#{} {}", snapshot.revision(), snapshot.status());
//!     });
//!
//!     match store.synchronize().await {
//!         Ok(()) => store.play_alert().await?,
//!         Err(SyncError::PairingFailure(reason)) => println!("re-pair: {reason}"),
//!         Err(err) => return Err(err.into()),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod event;
pub mod state;
mod store;
pub mod subscription;
pub mod types;
pub mod view;

pub use channel::CommandChannel;
pub use error::{
    CommandError, Error, Result, SyncError, TransitionError, TransportError, ValueError,
};
pub use event::{EventBus, StoreEvent};
pub use state::{Alert, ConnectionStatus, DeviceSnapshot, PeripheralInfo};
pub use store::{CommandHandle, DEFAULT_COMMAND_TIMEOUT, DeviceStateStore, StoreConfig};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{ByteCount, ProtobufRevision, StorageSnapshot, StorageSpace};
pub use view::DeviceView;

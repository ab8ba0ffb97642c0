// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command surface of the peripheral link.
//!
//! The store never talks to a transport directly. It drives a
//! [`CommandChannel`], which owns framing, serialization and pairing
//! internals and reports every failure exactly once, undecorated.
//!
//! # Cancellation
//!
//! Each call receives a [`CancellationToken`]. The store cancels it when it
//! abandons the call (device forgotten, caller aborted, timeout). Channels
//! should stop work promptly and must leave the paired session consistent;
//! the store races every call against the token anyway, so a channel that
//! ignores it only delays its own cleanup.
//!
//! # Implementing
//!
//! ```
//! use perisync_lib::channel::CommandChannel;
//! use perisync_lib::error::TransportError;
//! use perisync_lib::state::PeripheralInfo;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Loopback;
//!
//! impl CommandChannel for Loopback {
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
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::state::PeripheralInfo;

/// Async command surface to the peripheral.
///
/// Implementations hold no device state; retries are the caller's business.
pub trait CommandChannel: Send + Sync + 'static {
    /// Queries the peripheral's revisions and storage capacities.
    ///
    /// Pairing and handshake failures are reported as
    /// [`TransportError::PairingRejected`]; a firmware the channel knows to
    /// be too old as [`TransportError::UnsupportedFirmware`].
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the query fails.
    fn query_info(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<PeripheralInfo, TransportError>> + Send;

    /// Makes the peripheral play its audible/visual alert once.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the command fails.
    fn play_alert(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Releases any resources held for the paired session.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the release fails.
    fn release_session(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl<C: CommandChannel> CommandChannel for Arc<C> {
    fn query_info(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<PeripheralInfo, TransportError>> + Send {
        (**self).query_info(cancel)
    }

    fn play_alert(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).play_alert(cancel)
    }

    fn release_session(&self) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).release_session()
    }
}

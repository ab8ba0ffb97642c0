// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `PeriSync` library.
//!
//! The hierarchy follows the path a failure takes through the library:
//! the [`CommandChannel`](crate::channel::CommandChannel) reports a
//! [`TransportError`], the store classifies it into a [`SyncError`] or a
//! [`CommandError`] for the caller, and value constructors report
//! [`ValueError`]s.

use thiserror::Error;

use crate::state::{ConnectionStatus, StatusEvent};

/// The main error type for this library.
///
/// Every other error type converts into it, so callers that do not care
/// about the exact failure can use [`Result`] throughout.
#[derive(Debug, Error)]
pub enum Error {
    /// A value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The peripheral link failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A synchronize call failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// A command call failed.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// A status transition was rejected.
    #[error("transition error: {0}")]
    Transition(#[from] TransitionError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A storage report claims more free bytes than it has in total.
    #[error("free space {free} exceeds total space {total}")]
    FreeExceedsTotal {
        /// Reported free bytes.
        free: u64,
        /// Reported total bytes.
        total: u64,
    },

    /// A revision string could not be parsed.
    #[error("invalid revision: {0:?}")]
    InvalidRevision(String),
}

/// Failures reported by a [`CommandChannel`](crate::channel::CommandChannel).
///
/// Each failure is reported exactly once by the channel, without retries.
/// The store decides what the failure means for the connection status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The link to the peripheral is down or was lost mid-call.
    #[error("link down: {0}")]
    LinkDown(String),

    /// The call did not complete in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The peripheral rejected the pairing credentials or handshake.
    #[error("pairing rejected: {0}")]
    PairingRejected(String),

    /// The handshake succeeded but the firmware is too old.
    #[error("unsupported firmware: {0}")]
    UnsupportedFirmware(String),

    /// The peripheral answered with something that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The call was cancelled before it completed.
    #[error("call cancelled")]
    Cancelled,
}

/// Errors returned by [`DeviceStateStore::synchronize`](crate::DeviceStateStore::synchronize).
///
/// `Clone` because a single in-flight synchronize resolves every
/// coalesced caller with the same result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The link failed; the status reverted to `Disconnected`.
    #[error("transport failure: {0}")]
    Transport(TransportError),

    /// Pairing was rejected; the status is `PairingIssue`.
    #[error("pairing failed: {0}")]
    PairingFailure(String),

    /// The firmware is below the supported floor; the status is `UnsupportedDevice`.
    #[error("unsupported firmware: {0}")]
    UnsupportedFirmware(String),

    /// The synchronize was cancelled by `forget_device` or abandoned by its caller.
    #[error("synchronize cancelled")]
    Cancelled,
}

/// Errors returned by peripheral commands (`play_alert`, `forget_device`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command requires a connected peripheral.
    #[error("device is not connected")]
    NotConnected,

    /// The link failed while running the command.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The command was cancelled before it completed.
    #[error("command cancelled")]
    Cancelled,
}

/// A status event that is not valid in the current status.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("event {event:?} is not valid in status {from:?}")]
pub struct TransitionError {
    /// The status the machine was in.
    pub from: ConnectionStatus,
    /// The rejected event.
    pub event: StatusEvent,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the device state store.

use std::time::Duration;

use crate::event::DEFAULT_CHANNEL_CAPACITY;
use crate::state::PeripheralInfo;
use crate::types::ProtobufRevision;

/// Default time a single channel call may take.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`DeviceStateStore`](super::DeviceStateStore).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use perisync_lib::StoreConfig;
/// use perisync_lib::types::ProtobufRevision;
///
/// // Defaults: 10 s per call, no firmware floor
/// let config = StoreConfig::default();
/// assert!(config.min_protobuf_revision.is_none());
///
/// let config = StoreConfig::new()
///     .with_command_timeout(Duration::from_secs(3))
///     .with_min_protobuf_revision(ProtobufRevision::new(0, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound for each channel call.
    pub command_timeout: Duration,
    /// Oldest protobuf revision the store accepts as `Connected`.
    pub min_protobuf_revision: Option<ProtobufRevision>,
    /// Capacity of the store's event bus; zero is treated as one.
    pub event_capacity: usize,
}

impl StoreConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the supported protobuf revision floor.
    #[must_use]
    pub fn with_min_protobuf_revision(mut self, revision: ProtobufRevision) -> Self {
        self.min_protobuf_revision = Some(revision);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Returns the timeout in whole milliseconds, for error reports.
    #[must_use]
    pub fn command_timeout_ms(&self) -> u64 {
        u64::try_from(self.command_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Checks a reported info against the firmware floor.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch if a floor is configured and
    /// the reported protobuf revision is below it or unparseable.
    pub fn check_firmware(&self, info: &PeripheralInfo) -> Result<(), String> {
        let Some(floor) = self.min_protobuf_revision else {
            return Ok(());
        };

        match info.protobuf() {
            Ok(reported) if reported >= floor => Ok(()),
            Ok(reported) => Err(format!(
                "protobuf revision {reported} is below supported {floor}"
            )),
            Err(err) => Err(err.to_string()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            min_protobuf_revision: None,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

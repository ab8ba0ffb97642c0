// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The published unit of device state.

use std::sync::Arc;

use super::{ConnectionStatus, PeripheralInfo};

/// Immutable `(info, status)` pair published by the store.
///
/// Info is present if and only if the status is
/// [`Connected`](ConnectionStatus::Connected); the constructor drops it for
/// every other status. The revision increases by one with every published
/// snapshot, so consumers can tell which of two snapshots is newer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSnapshot {
    info: Option<Arc<PeripheralInfo>>,
    status: ConnectionStatus,
    revision: u64,
}

impl DeviceSnapshot {
    pub(crate) fn new(
        status: ConnectionStatus,
        info: Option<Arc<PeripheralInfo>>,
        revision: u64,
    ) -> Self {
        let info = if status.is_connected() { info } else { None };
        Self {
            info,
            status,
            revision,
        }
    }

    /// Returns the connection status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Returns the peripheral info (only while connected).
    #[must_use]
    pub fn info(&self) -> Option<&PeripheralInfo> {
        self.info.as_deref()
    }

    /// Returns the shared peripheral info handle (only while connected).
    #[must_use]
    pub fn shared_info(&self) -> Option<Arc<PeripheralInfo>> {
        self.info.clone()
    }

    /// Returns the publication revision.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if the peripheral is connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    /// Splits the snapshot into its info and status.
    #[must_use]
    pub fn into_parts(self) -> (Option<Arc<PeripheralInfo>>, ConnectionStatus) {
        (self.info, self.status)
    }

    /// Returns `true` if `status` and `info` match this snapshot's content.
    pub(crate) fn has_content(
        &self,
        status: ConnectionStatus,
        info: Option<&Arc<PeripheralInfo>>,
    ) -> bool {
        let info = if status.is_connected() { info } else { None };
        self.status == status && self.info.as_ref() == info
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Store event types.

use crate::state::{Alert, ConnectionStatus, DeviceSnapshot};

/// Events emitted by the device state store.
///
/// Every published snapshot produces one [`StateChanged`](Self::StateChanged);
/// an update that opens an issue episode is followed by one
/// [`AlertRaised`](Self::AlertRaised).
///
/// # Examples
///
/// ```
/// use perisync_lib::event::StoreEvent;
/// use perisync_lib::state::{Alert, ConnectionStatus};
///
/// let event = StoreEvent::AlertRaised { alert: Alert::PairingIssue, revision: 4 };
/// assert!(event.is_alert());
/// assert_eq!(event.revision(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A new snapshot was published.
    StateChanged {
        /// Status before this update.
        previous: ConnectionStatus,
        /// The published snapshot.
        snapshot: DeviceSnapshot,
    },

    /// A one-shot alert was raised.
    AlertRaised {
        /// The alert to present.
        alert: Alert,
        /// Revision of the snapshot that raised it.
        revision: u64,
    },
}

impl StoreEvent {
    /// Returns the snapshot revision this event belongs to.
    #[must_use]
    pub fn revision(&self) -> u64 {
        match self {
            Self::StateChanged { snapshot, .. } => snapshot.revision(),
            Self::AlertRaised { revision, .. } => *revision,
        }
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Returns `true` if this is an alert event.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::AlertRaised { .. })
    }

    /// Returns the snapshot of a state change event.
    #[must_use]
    pub fn snapshot(&self) -> Option<&DeviceSnapshot> {
        match self {
            Self::StateChanged { snapshot, .. } => Some(snapshot),
            Self::AlertRaised { .. } => None,
        }
    }
}

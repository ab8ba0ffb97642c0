// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection status state machine.
//!
//! The machine is pure state: it performs no I/O and knows nothing about
//! observers. The store feeds it [`StatusEvent`]s and publishes whatever
//! [`Transition`] comes back.
//!
//! # Transitions
//!
//! ```text
//! NoDevice / Disconnected / Connected / PairingIssue / UnsupportedDevice
//!     --SyncStarted--> Connecting
//! Connecting --HandshakeCompleted--> Connected
//! Connecting --PairingRejected-->    PairingIssue
//! Connecting --FirmwareRejected-->   UnsupportedDevice
//! Connecting --TransportFailed-->    Disconnected
//! Connected  --LinkLost-->           Disconnected
//! any        --Forgotten-->          NoDevice
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// Connection lifecycle of the peripheral.
///
/// Exactly one status holds at a time, and it alone decides whether the
/// peripheral info is meaningful: only [`Connected`](Self::Connected)
/// carries info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No peripheral is paired.
    #[default]
    NoDevice,
    /// A peripheral is paired but the link is down.
    Disconnected,
    /// Pairing and handshake are in progress.
    Connecting,
    /// The peripheral is connected and its info is current.
    Connected,
    /// Pairing credentials or handshake were rejected.
    PairingIssue,
    /// The peripheral firmware is below the supported revision.
    UnsupportedDevice,
}

impl ConnectionStatus {
    /// Returns `true` if the peripheral is connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` for the statuses that raise a one-shot alert.
    #[must_use]
    pub const fn is_issue(&self) -> bool {
        matches!(self, Self::PairingIssue | Self::UnsupportedDevice)
    }

    /// Returns the alert raised when entering this status, if any.
    #[must_use]
    pub const fn alert(&self) -> Option<Alert> {
        match self {
            Self::PairingIssue => Some(Alert::PairingIssue),
            Self::UnsupportedDevice => Some(Alert::UnsupportedDevice),
            _ => None,
        }
    }

    /// Returns a short human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NoDevice => "No device",
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::PairingIssue => "Pairing issue",
            Self::UnsupportedDevice => "Unsupported device",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs driving the status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEvent {
    /// A synchronize began; pairing is being attempted.
    SyncStarted,
    /// Pairing and handshake succeeded with a supported firmware.
    HandshakeCompleted,
    /// Pairing credentials or handshake were rejected.
    PairingRejected,
    /// The firmware is below the supported revision.
    FirmwareRejected,
    /// The link failed while connecting.
    TransportFailed,
    /// The link of a connected peripheral dropped.
    LinkLost,
    /// The user forgot the peripheral.
    Forgotten,
}

/// One-shot alerts raised when entering an issue status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alert {
    /// Pairing failed; the user should re-pair the peripheral.
    PairingIssue,
    /// The firmware must be updated before the peripheral can be used.
    UnsupportedDevice,
}

/// Result of applying an event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status before the event.
    pub from: ConnectionStatus,
    /// Status after the event.
    pub to: ConnectionStatus,
    /// Alert to raise, if this transition opened a new issue episode.
    pub alert: Option<Alert>,
}

impl Transition {
    /// Returns `true` if the status changed.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

/// Finite-state representation of the connection lifecycle.
///
/// Besides the status, the machine latches the last alert it raised so an
/// issue is reported once per episode. `Connecting` does not end an
/// episode: retrying a failed pairing and failing again stays silent.
/// Settling in any other status re-arms the latch.
///
/// # Examples
///
/// ```
/// use perisync_lib::state::{Alert, ConnectionStatus, ConnectionStatusMachine, StatusEvent};
///
/// let mut machine = ConnectionStatusMachine::new();
/// machine.apply(StatusEvent::SyncStarted).unwrap();
///
/// let transition = machine.apply(StatusEvent::PairingRejected).unwrap();
/// assert_eq!(transition.to, ConnectionStatus::PairingIssue);
/// assert_eq!(transition.alert, Some(Alert::PairingIssue));
///
/// // Connected cannot be reached without connecting first.
/// assert!(machine.apply(StatusEvent::HandshakeCompleted).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStatusMachine {
    status: ConnectionStatus,
    latched: Option<Alert>,
}

impl ConnectionStatusMachine {
    /// Creates a machine in [`ConnectionStatus::NoDevice`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Applies an event.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the event is not valid in the current
    /// status; the machine is left unchanged.
    pub fn apply(&mut self, event: StatusEvent) -> Result<Transition, TransitionError> {
        let from = self.status;
        let to = Self::target(from, event).ok_or(TransitionError { from, event })?;

        self.status = to;
        let alert = self.latch(to);

        Ok(Transition { from, to, alert })
    }

    fn target(from: ConnectionStatus, event: StatusEvent) -> Option<ConnectionStatus> {
        use ConnectionStatus as S;
        use StatusEvent as E;

        match (from, event) {
            (_, E::Forgotten) => Some(S::NoDevice),
            (S::Connecting, E::SyncStarted) => None,
            (_, E::SyncStarted) => Some(S::Connecting),
            (S::Connecting, E::HandshakeCompleted) => Some(S::Connected),
            (S::Connecting, E::PairingRejected) => Some(S::PairingIssue),
            (S::Connecting, E::FirmwareRejected) => Some(S::UnsupportedDevice),
            (S::Connecting, E::TransportFailed) | (S::Connected, E::LinkLost) => {
                Some(S::Disconnected)
            }
            _ => None,
        }
    }

    fn latch(&mut self, to: ConnectionStatus) -> Option<Alert> {
        if to == ConnectionStatus::Connecting {
            return None;
        }

        match to.alert() {
            Some(alert) if self.latched == Some(alert) => None,
            Some(alert) => {
                self.latched = Some(alert);
                Some(alert)
            }
            None => {
                self.latched = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_in(events: &[StatusEvent]) -> ConnectionStatusMachine {
        let mut machine = ConnectionStatusMachine::new();
        for event in events {
            machine.apply(*event).unwrap();
        }
        machine
    }

    #[test]
    fn initial_status_is_no_device() {
        assert_eq!(
            ConnectionStatusMachine::new().status(),
            ConnectionStatus::NoDevice
        );
    }

    #[test]
    fn connect_passes_through_connecting() {
        let mut machine = ConnectionStatusMachine::new();

        assert!(machine.apply(StatusEvent::HandshakeCompleted).is_err());

        let t = machine.apply(StatusEvent::SyncStarted).unwrap();
        assert_eq!(t.to, ConnectionStatus::Connecting);

        let t = machine.apply(StatusEvent::HandshakeCompleted).unwrap();
        assert_eq!(t.from, ConnectionStatus::Connecting);
        assert_eq!(t.to, ConnectionStatus::Connected);
        assert!(t.alert.is_none());
    }

    #[test]
    fn disconnected_cannot_jump_to_connected() {
        let mut machine = machine_in(&[
            StatusEvent::SyncStarted,
            StatusEvent::HandshakeCompleted,
            StatusEvent::LinkLost,
        ]);
        assert_eq!(machine.status(), ConnectionStatus::Disconnected);

        let err = machine.apply(StatusEvent::HandshakeCompleted).unwrap_err();
        assert_eq!(err.from, ConnectionStatus::Disconnected);
        assert_eq!(machine.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn sync_started_rejected_while_connecting() {
        let mut machine = machine_in(&[StatusEvent::SyncStarted]);
        assert!(machine.apply(StatusEvent::SyncStarted).is_err());
    }

    #[test]
    fn link_lost_only_from_connected() {
        let mut machine = ConnectionStatusMachine::new();
        assert!(machine.apply(StatusEvent::LinkLost).is_err());

        let mut machine = machine_in(&[StatusEvent::SyncStarted]);
        assert!(machine.apply(StatusEvent::LinkLost).is_err());
    }

    #[test]
    fn transport_failure_while_connecting_disconnects() {
        let mut machine = machine_in(&[StatusEvent::SyncStarted]);
        let t = machine.apply(StatusEvent::TransportFailed).unwrap();
        assert_eq!(t.to, ConnectionStatus::Disconnected);
    }

    #[test]
    fn forget_from_every_status() {
        let paths: [&[StatusEvent]; 6] = [
            &[],
            &[StatusEvent::SyncStarted],
            &[StatusEvent::SyncStarted, StatusEvent::HandshakeCompleted],
            &[StatusEvent::SyncStarted, StatusEvent::TransportFailed],
            &[StatusEvent::SyncStarted, StatusEvent::PairingRejected],
            &[StatusEvent::SyncStarted, StatusEvent::FirmwareRejected],
        ];

        for path in paths {
            let mut machine = machine_in(path);
            let t = machine.apply(StatusEvent::Forgotten).unwrap();
            assert_eq!(t.to, ConnectionStatus::NoDevice);
        }
    }

    #[test]
    fn pairing_alert_once_per_episode() {
        let mut machine = machine_in(&[StatusEvent::SyncStarted]);

        let first = machine.apply(StatusEvent::PairingRejected).unwrap();
        assert_eq!(first.alert, Some(Alert::PairingIssue));

        // Retrying passes through Connecting but stays in the same episode.
        machine.apply(StatusEvent::SyncStarted).unwrap();
        let second = machine.apply(StatusEvent::PairingRejected).unwrap();
        assert_eq!(second.alert, None);
    }

    #[test]
    fn pairing_alert_rearms_after_leaving_issue() {
        let mut machine = machine_in(&[StatusEvent::SyncStarted, StatusEvent::PairingRejected]);

        machine.apply(StatusEvent::SyncStarted).unwrap();
        machine.apply(StatusEvent::TransportFailed).unwrap();

        machine.apply(StatusEvent::SyncStarted).unwrap();
        let again = machine.apply(StatusEvent::PairingRejected).unwrap();
        assert_eq!(again.alert, Some(Alert::PairingIssue));
    }

    #[test]
    fn switching_issue_kind_raises_new_alert() {
        let mut machine = machine_in(&[StatusEvent::SyncStarted, StatusEvent::PairingRejected]);

        machine.apply(StatusEvent::SyncStarted).unwrap();
        let t = machine.apply(StatusEvent::FirmwareRejected).unwrap();
        assert_eq!(t.alert, Some(Alert::UnsupportedDevice));
    }

    #[test]
    fn forget_rearms_latch() {
        let mut machine = machine_in(&[
            StatusEvent::SyncStarted,
            StatusEvent::FirmwareRejected,
            StatusEvent::Forgotten,
            StatusEvent::SyncStarted,
        ]);
        let t = machine.apply(StatusEvent::FirmwareRejected).unwrap();
        assert_eq!(t.alert, Some(Alert::UnsupportedDevice));
    }

    #[test]
    fn transition_is_change() {
        let mut machine = ConnectionStatusMachine::new();
        let t = machine.apply(StatusEvent::Forgotten).unwrap();
        assert!(!t.is_change());

        let t = machine.apply(StatusEvent::SyncStarted).unwrap();
        assert!(t.is_change());
    }

    #[test]
    fn status_labels() {
        assert_eq!(ConnectionStatus::NoDevice.to_string(), "No device");
        assert_eq!(ConnectionStatus::PairingIssue.to_string(), "Pairing issue");
        assert!(ConnectionStatus::UnsupportedDevice.is_issue());
        assert!(!ConnectionStatus::Connecting.is_issue());
    }
}

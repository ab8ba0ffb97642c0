// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presentation state derived from store snapshots.

use crate::event::StoreEvent;
use crate::state::{Alert, ConnectionStatus, DeviceSnapshot, PeripheralInfo};
use crate::types::StorageSpace;

/// Label shown when a field has no meaningful value for the current status.
pub const PLACEHOLDER: &str = "—";

/// Display model of the peripheral, fed by store publications.
///
/// The view keeps the latest snapshot and one pending flag per alert kind.
/// Labels are computed on demand from the snapshot's status and info.
///
/// # Examples
///
/// ```
/// use perisync_lib::view::DeviceView;
///
/// let view = DeviceView::new();
/// assert_eq!(view.status_label(), "No device");
/// assert_eq!(view.firmware_version(), "—");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceView {
    snapshot: DeviceSnapshot,
    pairing_issue_alert: bool,
    unsupported_version_alert: bool,
}

impl DeviceView {
    /// Creates a view showing no device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the shown snapshot.
    ///
    /// Returns `false` and keeps the current snapshot if `snapshot` is older.
    pub fn apply_snapshot(&mut self, snapshot: &DeviceSnapshot) -> bool {
        if snapshot.revision() < self.snapshot.revision() {
            return false;
        }
        self.snapshot = snapshot.clone();
        true
    }

    /// Marks an alert as pending.
    pub fn raise_alert(&mut self, alert: Alert) {
        match alert {
            Alert::PairingIssue => self.pairing_issue_alert = true,
            Alert::UnsupportedDevice => self.unsupported_version_alert = true,
        }
    }

    /// Applies an event received from the store's event bus.
    pub fn handle_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::StateChanged { snapshot, .. } => {
                self.apply_snapshot(snapshot);
            }
            StoreEvent::AlertRaised { alert, .. } => self.raise_alert(*alert),
        }
    }

    /// Returns the snapshot currently shown.
    #[must_use]
    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    /// Returns the shown status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.snapshot.status()
    }

    /// Returns the status label, such as `"Pairing issue"`.
    #[must_use]
    pub fn status_label(&self) -> String {
        self.status().to_string()
    }

    /// Returns the protobuf revision label.
    #[must_use]
    pub fn protobuf_version(&self) -> String {
        if self.hides_info(true) {
            return PLACEHOLDER.to_owned();
        }
        self.info()
            .map(|info| info.protobuf_revision.clone())
            .unwrap_or_default()
    }

    /// Returns the firmware version label.
    #[must_use]
    pub fn firmware_version(&self) -> String {
        if self.hides_info(false) {
            return PLACEHOLDER.to_owned();
        }
        self.info()
            .map(|info| info.software().version().to_owned())
            .unwrap_or_default()
    }

    /// Returns the firmware build label.
    #[must_use]
    pub fn firmware_build(&self) -> String {
        if self.hides_info(false) {
            return PLACEHOLDER.to_owned();
        }
        self.info()
            .map(|info| info.software().build().to_owned())
            .unwrap_or_default()
    }

    /// Returns the internal storage label, such as `"100 bytes / 200 bytes"`.
    #[must_use]
    pub fn internal_space(&self) -> String {
        self.space_label(|info| info.storage.and_then(|storage| storage.internal))
    }

    /// Returns the external storage label.
    #[must_use]
    pub fn external_space(&self) -> String {
        self.space_label(|info| info.storage.and_then(|storage| storage.external))
    }

    /// Consumes the pending pairing issue alert.
    ///
    /// Returns `true` at most once per raised alert.
    pub fn take_pairing_issue_alert(&mut self) -> bool {
        std::mem::take(&mut self.pairing_issue_alert)
    }

    /// Consumes the pending unsupported version alert.
    pub fn take_unsupported_version_alert(&mut self) -> bool {
        std::mem::take(&mut self.unsupported_version_alert)
    }

    fn info(&self) -> Option<&PeripheralInfo> {
        self.snapshot.info()
    }

    fn hides_info(&self, hide_when_unsupported: bool) -> bool {
        match self.status() {
            ConnectionStatus::NoDevice | ConnectionStatus::Disconnected => true,
            ConnectionStatus::UnsupportedDevice => hide_when_unsupported,
            ConnectionStatus::Connecting
            | ConnectionStatus::Connected
            | ConnectionStatus::PairingIssue => false,
        }
    }

    fn space_label(&self, space: impl FnOnce(&PeripheralInfo) -> Option<StorageSpace>) -> String {
        if self.hides_info(true) {
            return PLACEHOLDER.to_owned();
        }
        self.info()
            .and_then(space)
            .map(|space| space.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::StorageSnapshot;

    fn connected(revision: u64) -> DeviceSnapshot {
        let info = PeripheralInfo::new("a1b2c3d 0.43.1 dev 12-10-2021", "0.13").with_storage(
            StorageSnapshot::new(
                Some(StorageSpace::new(100, 200).unwrap()),
                Some(StorageSpace::new(1_500_000, 4_000_000).unwrap()),
            ),
        );
        DeviceSnapshot::new(ConnectionStatus::Connected, Some(Arc::new(info)), revision)
    }

    fn bare(status: ConnectionStatus, revision: u64) -> DeviceSnapshot {
        DeviceSnapshot::new(status, None, revision)
    }

    #[test]
    fn connected_labels() {
        let mut view = DeviceView::new();
        assert!(view.apply_snapshot(&connected(2)));

        assert_eq!(view.status_label(), "Connected");
        assert_eq!(view.protobuf_version(), "0.13");
        assert_eq!(view.firmware_version(), "0.43.1");
        assert_eq!(view.firmware_build(), "12-10-2021");
        assert_eq!(view.internal_space(), "100 bytes / 200 bytes");
        assert_eq!(view.external_space(), "1.5 MB / 4 MB");
    }

    #[test]
    fn placeholders_without_device() {
        for status in [ConnectionStatus::NoDevice, ConnectionStatus::Disconnected] {
            let mut view = DeviceView::new();
            view.apply_snapshot(&bare(status, 1));

            assert_eq!(view.protobuf_version(), PLACEHOLDER);
            assert_eq!(view.firmware_version(), PLACEHOLDER);
            assert_eq!(view.firmware_build(), PLACEHOLDER);
            assert_eq!(view.internal_space(), PLACEHOLDER);
            assert_eq!(view.external_space(), PLACEHOLDER);
        }
    }

    #[test]
    fn unsupported_device_hides_protobuf_and_storage_only() {
        let mut view = DeviceView::new();
        view.apply_snapshot(&bare(ConnectionStatus::UnsupportedDevice, 1));

        assert_eq!(view.protobuf_version(), PLACEHOLDER);
        assert_eq!(view.internal_space(), PLACEHOLDER);
        assert_eq!(view.firmware_version(), "");
        assert_eq!(view.firmware_build(), "");
    }

    #[test]
    fn connecting_shows_empty_labels() {
        let mut view = DeviceView::new();
        view.apply_snapshot(&bare(ConnectionStatus::Connecting, 1));

        assert_eq!(view.status_label(), "Connecting");
        assert_eq!(view.protobuf_version(), "");
        assert_eq!(view.external_space(), "");
    }

    #[test]
    fn stale_snapshot_is_ignored() {
        let mut view = DeviceView::new();
        view.apply_snapshot(&connected(5));

        assert!(!view.apply_snapshot(&bare(ConnectionStatus::Connecting, 4)));
        assert_eq!(view.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn alert_flags_are_taken_once() {
        let mut view = DeviceView::new();
        view.handle_event(&StoreEvent::AlertRaised {
            alert: Alert::PairingIssue,
            revision: 2,
        });

        assert!(view.take_pairing_issue_alert());
        assert!(!view.take_pairing_issue_alert());
        assert!(!view.take_unsupported_version_alert());
    }

    #[test]
    fn handle_state_change_event() {
        let mut view = DeviceView::new();
        view.handle_event(&StoreEvent::StateChanged {
            previous: ConnectionStatus::Connecting,
            snapshot: connected(2),
        });
        assert_eq!(view.snapshot().revision(), 2);
        assert_eq!(view.firmware_version(), "0.43.1");
    }
}

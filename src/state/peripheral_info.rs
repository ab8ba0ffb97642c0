// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity and capacity report of a connected peripheral.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::types::{ProtobufRevision, SoftwareRevision, StorageSnapshot};

/// Snapshot of a connected peripheral's firmware and storage.
///
/// Produced by a successful synchronize and replaced wholesale by the next
/// one; the store shares it behind an `Arc` and never mutates it.
///
/// # Examples
///
/// ```
/// use perisync_lib::state::PeripheralInfo;
/// use perisync_lib::types::{StorageSnapshot, StorageSpace};
///
/// let info = PeripheralInfo::new("a1b2c3d 0.43.1 dev 12-10-2021", "0.13")
///     .with_storage(StorageSnapshot::internal_only(StorageSpace::new(100, 200).unwrap()));
///
/// assert_eq!(info.software().version(), "0.43.1");
/// assert_eq!(info.protobuf().unwrap().minor(), 13);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeripheralInfo {
    /// Raw software revision line reported by the firmware.
    pub software_revision: String,
    /// Raw RPC protocol revision reported by the firmware.
    pub protobuf_revision: String,
    /// Storage capacities, if the peripheral reported them.
    pub storage: Option<StorageSnapshot>,
}

impl PeripheralInfo {
    /// Creates an info report without storage data.
    #[must_use]
    pub fn new(software_revision: impl Into<String>, protobuf_revision: impl Into<String>) -> Self {
        Self {
            software_revision: software_revision.into(),
            protobuf_revision: protobuf_revision.into(),
            storage: None,
        }
    }

    /// Sets the storage report.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageSnapshot) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Returns accessors over the software revision line.
    #[must_use]
    pub fn software(&self) -> SoftwareRevision<'_> {
        SoftwareRevision::new(&self.software_revision)
    }

    /// Parses the protobuf revision.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidRevision` if the reported string is not
    /// of the form `major[.minor]`.
    pub fn protobuf(&self) -> Result<ProtobufRevision, ValueError> {
        self.protobuf_revision.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageSpace;

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "software_revision": "1.2 abc123",
            "protobuf_revision": "0.13",
            "storage": { "internal": { "free": 100, "total": 200 }, "external": null }
        }"#;

        let info: PeripheralInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.software_revision, "1.2 abc123");
        assert_eq!(
            info.storage.unwrap().internal,
            Some(StorageSpace::new(100, 200).unwrap())
        );
    }

    #[test]
    fn protobuf_parse_failure() {
        let info = PeripheralInfo::new("x", "unknown");
        assert!(info.protobuf().is_err());
    }

    #[test]
    fn new_has_no_storage() {
        let info = PeripheralInfo::new("a b", "1.0");
        assert!(info.storage.is_none());
    }
}

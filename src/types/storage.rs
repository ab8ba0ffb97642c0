// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storage capacity types reported by the peripheral.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

use super::ByteCount;

/// Free and total capacity of one storage medium, in bytes.
///
/// The free amount can never exceed the total; both the constructor and
/// deserialization enforce it.
///
/// # Examples
///
/// ```
/// use perisync_lib::types::StorageSpace;
///
/// let space = StorageSpace::new(100, 200).unwrap();
/// assert_eq!(space.used(), 100);
/// assert_eq!(space.to_string(), "100 bytes / 200 bytes");
///
/// assert!(StorageSpace::new(300, 200).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStorageSpace")]
pub struct StorageSpace {
    free: u64,
    total: u64,
}

#[derive(Deserialize)]
struct RawStorageSpace {
    free: u64,
    total: u64,
}

impl TryFrom<RawStorageSpace> for StorageSpace {
    type Error = ValueError;

    fn try_from(raw: RawStorageSpace) -> Result<Self, Self::Error> {
        Self::new(raw.free, raw.total)
    }
}

impl StorageSpace {
    /// Creates a storage space report.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::FreeExceedsTotal` if `free > total`.
    pub fn new(free: u64, total: u64) -> Result<Self, ValueError> {
        if free > total {
            return Err(ValueError::FreeExceedsTotal { free, total });
        }
        Ok(Self { free, total })
    }

    /// Returns the free bytes.
    #[must_use]
    pub const fn free(&self) -> u64 {
        self.free
    }

    /// Returns the total bytes.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns the used bytes.
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.total - self.free
    }
}

impl fmt::Display for StorageSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", ByteCount(self.free), ByteCount(self.total))
    }
}

/// Capacities of the peripheral's internal flash and external card.
///
/// Either medium may be missing, e.g. when no card is inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// Internal flash storage.
    pub internal: Option<StorageSpace>,
    /// External (removable) storage.
    pub external: Option<StorageSpace>,
}

impl StorageSnapshot {
    /// Creates a snapshot from both media.
    #[must_use]
    pub const fn new(internal: Option<StorageSpace>, external: Option<StorageSpace>) -> Self {
        Self { internal, external }
    }

    /// Creates a snapshot with only internal storage.
    #[must_use]
    pub const fn internal_only(internal: StorageSpace) -> Self {
        Self {
            internal: Some(internal),
            external: None,
        }
    }
}

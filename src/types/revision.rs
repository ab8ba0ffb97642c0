// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware and protocol revision types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Revision of the RPC protocol spoken by the peripheral firmware.
///
/// Reported as `"major.minor"`; a bare `"major"` means minor 0. Revisions
/// are totally ordered, which is what the supported-floor check relies on.
///
/// # Examples
///
/// ```
/// use perisync_lib::types::ProtobufRevision;
///
/// let reported: ProtobufRevision = "0.13".parse().unwrap();
/// assert!(reported >= ProtobufRevision::new(0, 1));
/// assert!(reported < ProtobufRevision::new(1, 0));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ProtobufRevision {
    major: u32,
    minor: u32,
}

impl ProtobufRevision {
    /// Creates a revision from its parts.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns the major revision.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor revision.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }
}

impl FromStr for ProtobufRevision {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidRevision(s.to_string());
        let trimmed = s.trim();
        let (major, minor) = match trimmed.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (trimmed, "0"),
        };
        let major = major.parse().map_err(|_| invalid())?;
        let minor = minor.parse().map_err(|_| invalid())?;
        Ok(Self { major, minor })
    }
}

impl fmt::Display for ProtobufRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The peripheral's software revision string.
///
/// The firmware reports a whitespace separated line such as
/// `"a1b2c3d 0.43.1 dev 12-10-2021"`: commit, version, branch and build
/// date. Only the version and the trailing build token are exposed.
///
/// # Examples
///
/// ```
/// use perisync_lib::types::SoftwareRevision;
///
/// let revision = SoftwareRevision::new("a1b2c3d 0.43.1 dev 12-10-2021");
/// assert_eq!(revision.version(), "0.43.1");
/// assert_eq!(revision.build(), "12-10-2021");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftwareRevision<'a> {
    raw: &'a str,
}

impl<'a> SoftwareRevision<'a> {
    /// Wraps a raw revision string.
    #[must_use]
    pub const fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Returns the raw string.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Returns the version token (the second one), or `""` if absent.
    #[must_use]
    pub fn version(&self) -> &'a str {
        self.raw.split_whitespace().nth(1).unwrap_or("")
    }

    /// Returns the build token (the last one), or `""` for an empty string.
    #[must_use]
    pub fn build(&self) -> &'a str {
        self.raw.split_whitespace().next_back().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protobuf_revision_parses_major_minor() {
        let rev: ProtobufRevision = "2.7".parse().unwrap();
        assert_eq!(rev, ProtobufRevision::new(2, 7));
        assert_eq!(rev.to_string(), "2.7");
    }

    #[test]
    fn protobuf_revision_without_minor() {
        let rev: ProtobufRevision = " 3 ".parse().unwrap();
        assert_eq!(rev, ProtobufRevision::new(3, 0));
    }

    #[test]
    fn protobuf_revision_rejects_garbage() {
        assert_eq!(
            "v0.x".parse::<ProtobufRevision>(),
            Err(ValueError::InvalidRevision("v0.x".to_string()))
        );
        assert!("".parse::<ProtobufRevision>().is_err());
    }

    #[test]
    fn protobuf_revision_ordering() {
        assert!(ProtobufRevision::new(0, 9) < ProtobufRevision::new(0, 10));
        assert!(ProtobufRevision::new(1, 0) > ProtobufRevision::new(0, 99));
    }

    #[test]
    fn software_revision_two_tokens() {
        let revision = SoftwareRevision::new("1.2 abc123");
        assert_eq!(revision.version(), "abc123");
        assert_eq!(revision.build(), "abc123");
    }

    #[test]
    fn software_revision_single_token() {
        let revision = SoftwareRevision::new("abc123");
        assert_eq!(revision.version(), "");
        assert_eq!(revision.build(), "abc123");
    }

    #[test]
    fn software_revision_empty() {
        let revision = SoftwareRevision::new("");
        assert_eq!(revision.version(), "");
        assert_eq!(revision.build(), "");
    }
}

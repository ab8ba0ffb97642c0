// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types describing a peripheral.
//!
//! Constrained types validate at construction time, so a value that exists
//! is always a valid one.
//!
//! # Types
//!
//! - [`StorageSpace`] - Free/total bytes of one medium (`free <= total`)
//! - [`StorageSnapshot`] - Internal and external storage reports
//! - [`ProtobufRevision`] - Ordered RPC protocol revision
//! - [`SoftwareRevision`] - Accessors over the firmware revision line
//! - [`ByteCount`] - Human-readable byte counts

mod bytes;
mod revision;
mod storage;

pub use bytes::ByteCount;
pub use revision::{ProtobufRevision, SoftwareRevision};
pub use storage::{StorageSnapshot, StorageSpace};

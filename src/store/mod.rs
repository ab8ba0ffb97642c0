// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device state store and its configuration.
//!
//! [`DeviceStateStore`] owns the connection status and peripheral info,
//! drives a [`CommandChannel`](crate::channel::CommandChannel) and
//! publishes every change. Long-running commands can be moved onto their
//! own task and aborted through a [`CommandHandle`].

mod command_handle;
mod device_store;
mod store_config;

pub use command_handle::CommandHandle;
pub use device_store::DeviceStateStore;
pub use store_config::{DEFAULT_COMMAND_TIMEOUT, StoreConfig};

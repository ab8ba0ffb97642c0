// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state types.
//!
//! This module provides the pure-state half of the library: the
//! [`ConnectionStatusMachine`] that owns the connection lifecycle, the
//! [`PeripheralInfo`] reported by a connected peripheral, and the
//! [`DeviceSnapshot`] that the store publishes to observers.
//!
//! # Examples
//!
//! ```
//! use perisync_lib::state::{ConnectionStatus, ConnectionStatusMachine, StatusEvent};
//!
//! let mut machine = ConnectionStatusMachine::new();
//!
//! machine.apply(StatusEvent::SyncStarted).unwrap();
//! let transition = machine.apply(StatusEvent::HandshakeCompleted).unwrap();
//!
//! assert_eq!(transition.from, ConnectionStatus::Connecting);
//! assert_eq!(machine.status(), ConnectionStatus::Connected);
//! ```

mod peripheral_info;
mod snapshot;
mod status;

pub use peripheral_info::PeripheralInfo;
pub use snapshot::DeviceSnapshot;
pub use status::{Alert, ConnectionStatus, ConnectionStatusMachine, StatusEvent, Transition};

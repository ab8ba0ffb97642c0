// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for device state changes.
//!
//! The [`EventBus`] uses tokio's broadcast channel so that async consumers
//! can follow the store from their own tasks, in the same order the
//! callback subscribers see.
//!
//! # Examples
//!
//! ```
//! use perisync_lib::event::{EventBus, StoreEvent};
//! use perisync_lib::state::Alert;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(StoreEvent::AlertRaised { alert: Alert::UnsupportedDevice, revision: 3 });
//! assert_eq!(rx.try_recv().unwrap().revision(), 3);
//! ```

mod event_bus;
mod store_event;

pub use event_bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
pub use store_event::StoreEvent;

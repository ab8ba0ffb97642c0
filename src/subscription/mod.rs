// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device state changes.
//!
//! This module provides a callback-based subscription system for receiving
//! notifications when the store publishes a new snapshot or raises an alert.
//!
//! # Overview
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that stores callbacks and dispatches updates
//! - [`Subscribable`] - Trait for types that support subscriptions
//!
//! Async consumers that prefer channels can use
//! [`DeviceStateStore::watch`](crate::DeviceStateStore::watch) or
//! [`DeviceStateStore::subscribe_events`](crate::DeviceStateStore::subscribe_events)
//! instead.

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handles for commands running on their own task.

use std::fmt;

use tokio::task::JoinHandle;

/// A store command running on a spawned tokio task.
///
/// Returned by [`DeviceStateStore::spawn_synchronize`](super::DeviceStateStore::spawn_synchronize)
/// and [`DeviceStateStore::spawn_play_alert`](super::DeviceStateStore::spawn_play_alert).
/// Dropping the handle detaches the task; [`cancel`](Self::cancel) aborts it.
pub struct CommandHandle<E> {
    task: JoinHandle<Result<(), E>>,
    on_abort: fn() -> E,
}

impl<E> CommandHandle<E> {
    pub(crate) fn new(task: JoinHandle<Result<(), E>>, on_abort: fn() -> E) -> Self {
        Self { task, on_abort }
    }

    /// Aborts the command.
    ///
    /// An aborted synchronize that was leading an in-flight call resolves
    /// every coalesced caller with a cancellation error and reverts the
    /// status to `Disconnected`.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Returns `true` once the task has completed or been aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the command's result.
    ///
    /// # Errors
    ///
    /// Returns the command's own error, or the cancellation error if the
    /// task was aborted.
    ///
    /// # Panics
    ///
    /// Resumes the panic if the command's task panicked.
    pub async fn wait(self) -> Result<(), E> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err((self.on_abort)()),
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }
}

impl<E> fmt::Debug for CommandHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

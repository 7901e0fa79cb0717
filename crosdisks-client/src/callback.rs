// SPDX-License-Identifier: GPL-3.0-only

//! Single execution context for caller callbacks
//!
//! Every success/error callback and every event handler of one session runs on
//! the task owned by its [`CallbackQueue`], one at a time, in submission order.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct CallbackQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl std::fmt::Debug for CallbackQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackQueue")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl CallbackQueue {
    /// Spawn the task that runs queued callbacks. Must be called from within a
    /// Tokio runtime.
    pub fn start() -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let task = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::error!("Callback panicked; continuing with the next one");
                }
            }
            tracing::trace!("Callback queue drained and closed");
        });

        (Self { sender }, task)
    }

    /// Queue `job`. Returns false if the queue has shut down, in which case the
    /// job is dropped without running.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        if self.sender.send(Box::new(job)).is_err() {
            tracing::debug!("Callback queue closed; dropping callback");
            return false;
        }
        true
    }
}

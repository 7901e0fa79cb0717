// SPDX-License-Identifier: GPL-3.0-only

//! Routing of unsolicited service signals to the registered handlers

use std::sync::{Arc, PoisonError, RwLock};

use crosdisks_types::{MountError, MountEventType, MountType};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::task::JoinHandle;

use crate::callback::CallbackQueue;
use crate::transport::Notification;

/// Called with the event type and device path of each lifecycle signal
pub type LifecycleHandler = Arc<dyn Fn(MountEventType, String) + Send + Sync>;

/// Called with (error, source path, mount type, mount path) of each
/// mount-completed signal
pub type MountCompletedHandler = Arc<dyn Fn(MountError, String, MountType, String) + Send + Sync>;

/// A notification whose member name and integer tags have been interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedEvent {
    Lifecycle {
        event: MountEventType,
        device_path: String,
    },
    MountCompleted {
        error: MountError,
        source_path: String,
        mount_type: MountType,
        mount_path: String,
    },
}

impl RoutedEvent {
    /// Interpret a raw notification. Unknown signal names and unknown integer
    /// tags yield `None`.
    pub fn decode(notification: Notification) -> Option<Self> {
        match notification {
            Notification::Lifecycle {
                member,
                device_path,
            } => match MountEventType::from_signal_name(&member) {
                Some(event) => Some(Self::Lifecycle { event, device_path }),
                None => {
                    tracing::debug!(member = %member, "Ignoring unknown signal");
                    None
                }
            },
            Notification::MountCompleted {
                error_code,
                source_path,
                mount_type,
                mount_path,
            } => {
                let error = MountError::try_from(error_code)
                    .map_err(|e| tracing::warn!(source = %source_path, "Dropping MountCompleted: {}", e))
                    .ok()?;
                let mount_type = MountType::try_from(mount_type)
                    .map_err(|e| tracing::warn!(source = %source_path, "Dropping MountCompleted: {}", e))
                    .ok()?;
                Some(Self::MountCompleted {
                    error,
                    source_path,
                    mount_type,
                    mount_path,
                })
            }
        }
    }
}

#[derive(Default)]
struct Handlers {
    lifecycle: Option<LifecycleHandler>,
    mount_completed: Option<MountCompletedHandler>,
}

/// Delivers each notification, in arrival order, to the handler of its family.
///
/// Nothing is queued while no handler is registered, and nothing is
/// deduplicated: two identical signals produce two handler calls.
#[derive(Clone)]
pub struct EventRouter {
    handlers: Arc<RwLock<Handlers>>,
    callbacks: CallbackQueue,
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter").finish_non_exhaustive()
    }
}

impl EventRouter {
    pub fn new(callbacks: CallbackQueue) -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Handlers::default())),
            callbacks,
        }
    }

    /// Register both handlers, replacing any previous registration.
    pub fn set_up_connections<L, M>(&self, lifecycle: L, mount_completed: M)
    where
        L: Fn(MountEventType, String) + Send + Sync + 'static,
        M: Fn(MountError, String, MountType, String) + Send + Sync + 'static,
    {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        handlers.lifecycle = Some(Arc::new(lifecycle));
        handlers.mount_completed = Some(Arc::new(mount_completed));
    }

    /// Route one notification. Returns whether a handler was scheduled.
    pub fn route(&self, notification: Notification) -> bool {
        let Some(event) = RoutedEvent::decode(notification) else {
            return false;
        };

        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match event {
            RoutedEvent::Lifecycle { event, device_path } => {
                let Some(handler) = handlers.lifecycle.clone() else {
                    tracing::trace!(%event, "No lifecycle handler; dropping");
                    return false;
                };
                self.callbacks.post(move || handler(event, device_path))
            }
            RoutedEvent::MountCompleted {
                error,
                source_path,
                mount_type,
                mount_path,
            } => {
                let Some(handler) = handlers.mount_completed.clone() else {
                    tracing::trace!("No mount-completed handler; dropping");
                    return false;
                };
                self.callbacks
                    .post(move || handler(error, source_path, mount_type, mount_path))
            }
        }
    }

    /// Pump `notifications` through [`route`](Self::route) until the stream ends.
    pub fn attach(&self, mut notifications: BoxStream<'static, Notification>) -> JoinHandle<()> {
        let router = self.clone();
        tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                router.route(notification);
            }
            tracing::info!("Disk service notification stream ended");
        })
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Client for the cros-disks removable storage service
//!
//! Requests (mount, unmount, enumerate, format, device properties) go out over
//! a single D-Bus connection and complete asynchronously. Unsolicited signals
//! from the service arrive on the same connection and are routed to the
//! handlers registered with [`EventRouter::set_up_connections`].
//!
//! Two request surfaces are provided:
//!
//! - [`DisksClient`]: `async fn`s returning `Result<_, ClientError>`
//! - [`RequestDispatcher`]: success/error callbacks, exactly one of which runs
//!   per call, on the session's [`CallbackQueue`]
//!
//! A [`Session`] wires both to one [`Transport`] and runs the notification pump.

pub mod callback;
pub mod client;
pub mod config;
pub mod decode;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod id;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use callback::CallbackQueue;
pub use client::DisksClient;
pub use config::{BusKind, ClientConfig};
pub use decode::{DecodeError, PropertyBag, decode_disk_info};
pub use dispatcher::RequestDispatcher;
pub use error::ClientError;
pub use events::{EventRouter, LifecycleHandler, MountCompletedHandler, RoutedEvent};
pub use id::OperationId;
pub use session::Session;
pub use transport::{DbusTransport, Method, Notification, Reply, Request, Transport};

pub use crosdisks_types::{DeviceType, DiskInfo, MountError, MountEventType, MountType};

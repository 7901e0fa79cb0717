// SPDX-License-Identifier: GPL-3.0-only

//! The single logical connection to the disk service
//!
//! A [`Transport`] turns a [`Request`] into exactly one outcome: a [`Reply`]
//! shaped for that method, or a [`ClientError`]. Unsolicited signals are
//! exposed as one ordered stream of [`Notification`]s.

mod dbus;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::decode::PropertyBag;
use crate::error::ClientError;

pub use dbus::{CrosDisksProxy, DbusTransport};

/// Signal member carrying mount completion results
pub const MOUNT_COMPLETED_SIGNAL: &str = "MountCompleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Mount,
    Unmount,
    EnumerateAutoMountableDevices,
    FormatDevice,
    GetDeviceProperties,
}

impl Method {
    /// D-Bus member name
    pub fn name(self) -> &'static str {
        match self {
            Self::Mount => "Mount",
            Self::Unmount => "Unmount",
            Self::EnumerateAutoMountableDevices => "EnumerateAutoMountableDevices",
            Self::FormatDevice => "FormatDevice",
            Self::GetDeviceProperties => "GetDeviceProperties",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Mount {
        source_path: String,
        /// Empty lets the service detect the filesystem
        filesystem_type: String,
        options: Vec<String>,
    },
    Unmount {
        device_path: String,
        options: Vec<String>,
    },
    EnumerateAutoMountableDevices,
    FormatDevice {
        device_path: String,
        filesystem: String,
    },
    GetDeviceProperties {
        device_path: String,
    },
}

impl Request {
    pub fn method(&self) -> Method {
        match self {
            Self::Mount { .. } => Method::Mount,
            Self::Unmount { .. } => Method::Unmount,
            Self::EnumerateAutoMountableDevices => Method::EnumerateAutoMountableDevices,
            Self::FormatDevice { .. } => Method::FormatDevice,
            Self::GetDeviceProperties { .. } => Method::GetDeviceProperties,
        }
    }
}

/// Method reply body, decoded according to the method's reply signature.
#[derive(Debug)]
pub enum Reply {
    Empty,
    DevicePaths(Vec<String>),
    Formatted(bool),
    Properties(PropertyBag),
}

impl Reply {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::DevicePaths(_) => "device paths",
            Self::Formatted(_) => "format result",
            Self::Properties(_) => "property bag",
        }
    }
}

/// A signal as received, before its integer tags are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A single-path signal, keyed by its member name
    Lifecycle { member: String, device_path: String },
    MountCompleted {
        error_code: u32,
        source_path: String,
        mount_type: u32,
        mount_path: String,
    },
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one method call. Resolves once, with the reply or the failure.
    async fn call(&self, request: Request) -> Result<Reply, ClientError>;

    /// All signals from the service, in arrival order.
    async fn notifications(&self) -> Result<BoxStream<'static, Notification>, ClientError>;
}

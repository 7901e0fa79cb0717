// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;

use async_trait::async_trait;
use crosdisks_types::MountEventType;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use zbus::Connection;
use zbus::message::Message;
use zbus::proxy;
use zbus::zvariant::OwnedValue;

use super::{MOUNT_COMPLETED_SIGNAL, Notification, Reply, Request, Transport};
use crate::config::{BusKind, ClientConfig};
use crate::error::ClientError;

/// D-Bus proxy for the cros-disks service
#[proxy(
    interface = "org.chromium.CrosDisks",
    default_service = "org.chromium.CrosDisks",
    default_path = "/org/chromium/CrosDisks"
)]
pub trait CrosDisks {
    /// Mount a device or archive; completion is reported by `MountCompleted`
    async fn mount(
        &self,
        source_path: &str,
        filesystem_type: &str,
        options: &[String],
    ) -> zbus::Result<()>;

    async fn unmount(&self, device_path: &str, options: &[String]) -> zbus::Result<()>;

    async fn enumerate_auto_mountable_devices(&self) -> zbus::Result<Vec<String>>;

    async fn format_device(&self, device_path: &str, filesystem: &str) -> zbus::Result<bool>;

    async fn get_device_properties(
        &self,
        device_path: &str,
    ) -> zbus::Result<HashMap<String, OwnedValue>>;
}

/// [`Transport`] over one D-Bus connection
pub struct DbusTransport {
    proxy: CrosDisksProxy<'static>,
}

impl std::fmt::Debug for DbusTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbusTransport")
            .field("destination", &self.proxy.inner().destination().as_str())
            .field("path", &self.proxy.inner().path().as_str())
            .finish_non_exhaustive()
    }
}

impl DbusTransport {
    /// Open the connection and bind a proxy to the configured service object.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let connection = match config.bus {
            BusKind::System => Connection::system().await,
            BusKind::Session => Connection::session().await,
        }
        .map_err(|e| {
            ClientError::Connection(format!("Failed to connect to {:?} bus: {}", config.bus, e))
        })?;

        Self::with_connection(&connection, config).await
    }

    pub async fn with_connection(
        connection: &Connection,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let proxy = CrosDisksProxy::builder(connection)
            .destination(config.service.clone())
            .and_then(|b| b.path(config.object_path.clone()))
            .and_then(|b| b.interface(config.interface.clone()))
            .map_err(|e| ClientError::InvalidArgument(format!("Invalid service address: {}", e)))?
            .build()
            .await
            .map_err(|e| ClientError::Connection(format!("Failed to create proxy: {}", e)))?;

        tracing::info!(
            service = %config.service,
            path = %config.object_path,
            "Connected to disk service"
        );

        Ok(Self { proxy })
    }

    pub fn proxy(&self) -> &CrosDisksProxy<'static> {
        &self.proxy
    }
}

#[async_trait]
impl Transport for DbusTransport {
    async fn call(&self, request: Request) -> Result<Reply, ClientError> {
        let method = request.method().name();

        let reply = match request {
            Request::Mount {
                source_path,
                filesystem_type,
                options,
            } => self
                .proxy
                .mount(&source_path, &filesystem_type, &options)
                .await
                .map(|()| Reply::Empty),
            Request::Unmount {
                device_path,
                options,
            } => self
                .proxy
                .unmount(&device_path, &options)
                .await
                .map(|()| Reply::Empty),
            Request::EnumerateAutoMountableDevices => self
                .proxy
                .enumerate_auto_mountable_devices()
                .await
                .map(Reply::DevicePaths),
            Request::FormatDevice {
                device_path,
                filesystem,
            } => self
                .proxy
                .format_device(&device_path, &filesystem)
                .await
                .map(Reply::Formatted),
            Request::GetDeviceProperties { device_path } => self
                .proxy
                .get_device_properties(&device_path)
                .await
                .map(Reply::Properties),
        };

        reply.map_err(|e| ClientError::from_call(method, e))
    }

    async fn notifications(&self) -> Result<BoxStream<'static, Notification>, ClientError> {
        let signals = self
            .proxy
            .inner()
            .receive_all_signals()
            .await
            .map_err(|e| ClientError::Connection(format!("Failed to subscribe to signals: {}", e)))?;

        Ok(signals
            .filter_map(|message| async move { notification_from_message(&message) })
            .boxed())
    }
}

/// Decode a signal body by its member name. Bodies that do not match the
/// expected signature are dropped.
fn notification_from_message(message: &Message) -> Option<Notification> {
    let header = message.header();
    let member = header.member()?.to_string();

    if member == MOUNT_COMPLETED_SIGNAL {
        match message
            .body()
            .deserialize::<(u32, String, u32, String)>()
        {
            Ok((error_code, source_path, mount_type, mount_path)) => {
                Some(Notification::MountCompleted {
                    error_code,
                    source_path,
                    mount_type,
                    mount_path,
                })
            }
            Err(e) => {
                tracing::warn!("Failed to parse {} signal: {}", member, e);
                None
            }
        }
    } else if MountEventType::from_signal_name(&member).is_some() {
        match message.body().deserialize::<String>() {
            Ok(device_path) => Some(Notification::Lifecycle {
                member,
                device_path,
            }),
            Err(e) => {
                tracing::warn!("Failed to parse {} signal: {}", member, e);
                None
            }
        }
    } else {
        tracing::debug!("Ignoring unknown signal {}", member);
        None
    }
}

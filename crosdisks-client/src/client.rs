// SPDX-License-Identifier: GPL-3.0-only

//! Async request surface

use std::sync::Arc;

use crosdisks_types::{DiskInfo, MountType};

use crate::config::ClientConfig;
use crate::decode::decode_disk_info;
use crate::error::ClientError;
use crate::id::OperationId;
use crate::transport::{DbusTransport, Reply, Request, Transport};

/// Client for the disk service's methods.
///
/// Each call is independent: nothing is serialized or retried here, and calls
/// may run concurrently.
#[derive(Clone)]
pub struct DisksClient {
    transport: Arc<dyn Transport>,
    mount_options: Vec<String>,
    unmount_options: Vec<String>,
}

impl std::fmt::Debug for DisksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisksClient")
            .field("mount_options", &self.mount_options)
            .field("unmount_options", &self.unmount_options)
            .finish_non_exhaustive()
    }
}

impl DisksClient {
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            mount_options: config.mount_options.clone(),
            unmount_options: config.unmount_options.clone(),
        }
    }

    /// Connect to the configured bus and service
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = DbusTransport::connect(config).await?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Ask the service to mount `source_path`.
    ///
    /// Success only means the request was accepted; the outcome arrives later
    /// as a mount-completed notification.
    pub async fn mount(&self, source_path: &str, mount_type: MountType) -> Result<(), ClientError> {
        if mount_type == MountType::Invalid {
            return Err(ClientError::InvalidArgument(format!(
                "Refusing to mount {} with the invalid mount type",
                source_path
            )));
        }

        tracing::debug!(source = source_path, %mount_type, "Requesting mount");

        match self
            .request(Request::Mount {
                source_path: source_path.to_string(),
                filesystem_type: String::new(),
                options: self.mount_options.clone(),
            })
            .await?
        {
            Reply::Empty => Ok(()),
            other => Err(unexpected("Mount", &other)),
        }
    }

    /// Unmount `device_path`. Resolves to the device path that was unmounted.
    pub async fn unmount(&self, device_path: &str) -> Result<String, ClientError> {
        match self
            .request(Request::Unmount {
                device_path: device_path.to_string(),
                options: self.unmount_options.clone(),
            })
            .await?
        {
            Reply::Empty => Ok(device_path.to_string()),
            other => Err(unexpected("Unmount", &other)),
        }
    }

    pub async fn enumerate_auto_mountable_devices(&self) -> Result<Vec<String>, ClientError> {
        match self.request(Request::EnumerateAutoMountableDevices).await? {
            Reply::DevicePaths(paths) => Ok(paths),
            other => Err(unexpected("EnumerateAutoMountableDevices", &other)),
        }
    }

    /// Format `device_path` with `filesystem`.
    ///
    /// A well-formed reply reporting failure is `Ok((path, false))`, not an error.
    pub async fn format_device(
        &self,
        device_path: &str,
        filesystem: &str,
    ) -> Result<(String, bool), ClientError> {
        match self
            .request(Request::FormatDevice {
                device_path: device_path.to_string(),
                filesystem: filesystem.to_string(),
            })
            .await?
        {
            Reply::Formatted(succeeded) => Ok((device_path.to_string(), succeeded)),
            other => Err(unexpected("FormatDevice", &other)),
        }
    }

    /// Fetch and decode one device's properties. A payload that does not
    /// decode is an error; no partial record is returned.
    pub async fn get_device_properties(&self, device_path: &str) -> Result<DiskInfo, ClientError> {
        match self
            .request(Request::GetDeviceProperties {
                device_path: device_path.to_string(),
            })
            .await?
        {
            Reply::Properties(bag) => Ok(decode_disk_info(&bag)?),
            other => Err(unexpected("GetDeviceProperties", &other)),
        }
    }

    async fn request(&self, request: Request) -> Result<Reply, ClientError> {
        let id = OperationId::new();
        let method = request.method().name();
        tracing::debug!(%id, method, "Issuing request");

        let result = self.transport.call(request).await;
        match &result {
            Ok(reply) => tracing::debug!(%id, method, reply = reply.kind(), "Request completed"),
            Err(e) => tracing::debug!(%id, method, error = %e, "Request failed"),
        }
        result
    }
}

fn unexpected(method: &'static str, reply: &Reply) -> ClientError {
    ClientError::UnexpectedReply {
        method,
        detail: format!("got {}", reply.kind()),
    }
}

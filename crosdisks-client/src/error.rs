// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

use crate::decode::DecodeError;

/// Errors that can occur when calling the disk service
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("D-Bus connection error: {0}")]
    Connection(String),

    #[error("D-Bus method call error: {0}")]
    MethodCall(String),

    #[error("Service not available (is cros-disks running?)")]
    ServiceNotAvailable,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unexpected reply to {method}: {detail}")]
    UnexpectedReply { method: &'static str, detail: String },

    #[error("Failed to decode device properties: {0}")]
    Decode(#[from] DecodeError),

    #[error("Client config error: {0}")]
    Config(String),
}

impl From<zbus::Error> for ClientError {
    fn from(err: zbus::Error) -> Self {
        match &err {
            zbus::Error::FDO(fdo_err) => {
                let error_str = fdo_err.to_string();

                if error_str.contains("AccessDenied") || error_str.contains("Access denied") {
                    ClientError::PermissionDenied(error_str)
                } else if error_str.contains("ServiceUnknown")
                    || error_str.contains("Service not known")
                {
                    ClientError::ServiceNotAvailable
                } else if error_str.contains("InvalidArgs")
                    || error_str.contains("Invalid arguments")
                {
                    ClientError::InvalidArgument(error_str)
                } else {
                    ClientError::MethodCall(error_str)
                }
            }
            zbus::Error::MethodError(name, detail, _) => {
                let detail = detail.clone().unwrap_or_default();
                match name.as_str() {
                    "org.freedesktop.DBus.Error.ServiceUnknown" => ClientError::ServiceNotAvailable,
                    "org.freedesktop.DBus.Error.AccessDenied" => {
                        ClientError::PermissionDenied(detail)
                    }
                    "org.freedesktop.DBus.Error.InvalidArgs" => {
                        ClientError::InvalidArgument(detail)
                    }
                    other => ClientError::MethodCall(format!("{other}: {detail}")),
                }
            }
            _ => ClientError::Connection(err.to_string()),
        }
    }
}

impl ClientError {
    /// Classify a failed call, attributing body decoding failures to `method`.
    pub(crate) fn from_call(method: &'static str, err: zbus::Error) -> Self {
        match err {
            zbus::Error::Variant(e) => ClientError::UnexpectedReply {
                method,
                detail: e.to_string(),
            },
            other => ClientError::from(other),
        }
    }
}

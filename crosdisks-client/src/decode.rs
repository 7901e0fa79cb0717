// SPDX-License-Identifier: GPL-3.0-only

//! Property bag → [`DiskInfo`]
//!
//! Optional keys may be missing (booleans default to false, sizes to 0,
//! strings to empty). A key that is present with the wrong D-Bus type makes
//! the payload malformed. The device path is required.

use std::collections::HashMap;

use crosdisks_types::{DeviceType, DiskInfo};
use thiserror::Error;
use zbus::zvariant::{OwnedValue, Value};

/// `a{sv}` reply of `GetDeviceProperties`
pub type PropertyBag = HashMap<String, OwnedValue>;

pub mod keys {
    pub const NATIVE_PATH: &str = "NativePath";
    pub const DEVICE_FILE: &str = "DeviceFile";
    pub const MOUNT_PATHS: &str = "DeviceMountPaths";
    pub const LABEL: &str = "IdLabel";
    pub const DRIVE_MODEL: &str = "DriveModel";
    pub const MEDIA_TYPE: &str = "DeviceMediaType";
    pub const SIZE: &str = "DeviceSize";
    pub const IS_DRIVE: &str = "DeviceIsDrive";
    pub const MEDIA_AVAILABLE: &str = "DeviceIsMediaAvailable";
    pub const ON_BOOT_DEVICE: &str = "DeviceIsOnBootDevice";
    pub const READ_ONLY: &str = "DeviceIsReadOnly";
    pub const PRESENTATION_HIDE: &str = "DevicePresentationHide";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing or empty device path ({})", keys::NATIVE_PATH)]
    MissingDevicePath,

    #[error("property {key} has the wrong type (expected {expected})")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

/// Strip `v` wrappers around a value.
fn peel<'v, 'a>(value: &'v Value<'a>) -> &'v Value<'a> {
    match value {
        Value::Value(inner) => peel(inner),
        other => other,
    }
}

fn lookup<'b>(bag: &'b PropertyBag, key: &str) -> Option<&'b Value<'static>> {
    bag.get(key).map(|value| peel(value))
}

fn string(bag: &PropertyBag, key: &'static str) -> Result<String, DecodeError> {
    match lookup(bag, key) {
        None => Ok(String::new()),
        Some(Value::Str(s)) => Ok(s.as_str().to_string()),
        Some(Value::ObjectPath(p)) => Ok(p.as_str().to_string()),
        Some(_) => Err(DecodeError::WrongType {
            key,
            expected: "string",
        }),
    }
}

fn boolean(bag: &PropertyBag, key: &'static str) -> Result<bool, DecodeError> {
    match lookup(bag, key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(DecodeError::WrongType {
            key,
            expected: "boolean",
        }),
    }
}

fn unsigned(bag: &PropertyBag, key: &'static str) -> Result<u64, DecodeError> {
    match lookup(bag, key) {
        None => Ok(0),
        Some(Value::U64(n)) => Ok(*n),
        Some(Value::U32(n)) => Ok(u64::from(*n)),
        Some(Value::U16(n)) => Ok(u64::from(*n)),
        Some(Value::U8(n)) => Ok(u64::from(*n)),
        Some(_) => Err(DecodeError::WrongType {
            key,
            expected: "unsigned integer",
        }),
    }
}

fn string_list(bag: &PropertyBag, key: &'static str) -> Result<Vec<String>, DecodeError> {
    let wrong_type = DecodeError::WrongType {
        key,
        expected: "string array",
    };

    match lookup(bag, key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match peel(item) {
                Value::Str(s) => Ok(s.as_str().to_string()),
                _ => Err(wrong_type.clone()),
            })
            .collect(),
        Some(_) => Err(wrong_type),
    }
}

/// Unrecognized or oddly typed media tags classify as `Unknown`.
fn device_type(bag: &PropertyBag) -> DeviceType {
    match lookup(bag, keys::MEDIA_TYPE) {
        Some(Value::U32(tag)) => DeviceType::from_media_tag(*tag),
        Some(Value::U8(tag)) => DeviceType::from_media_tag(u32::from(*tag)),
        Some(Value::I32(tag)) => u32::try_from(*tag)
            .map(DeviceType::from_media_tag)
            .unwrap_or_default(),
        Some(Value::Str(name)) => DeviceType::from_media_name(name.as_str()),
        _ => DeviceType::Unknown,
    }
}

/// Decode one device's properties.
pub fn decode_disk_info(bag: &PropertyBag) -> Result<DiskInfo, DecodeError> {
    let device_path = match string(bag, keys::NATIVE_PATH) {
        Ok(path) if !path.is_empty() => path,
        Ok(_) => return Err(DecodeError::MissingDevicePath),
        Err(e) => return Err(e),
    };

    // cros-disks reports several mount paths; the first is the primary one.
    let mount_path = string_list(bag, keys::MOUNT_PATHS)?
        .into_iter()
        .next()
        .unwrap_or_default();

    Ok(DiskInfo {
        system_path: device_path.clone(),
        device_path,
        mount_path,
        is_drive: boolean(bag, keys::IS_DRIVE)?,
        has_media: boolean(bag, keys::MEDIA_AVAILABLE)?,
        on_boot_device: boolean(bag, keys::ON_BOOT_DEVICE)?,
        file_path: string(bag, keys::DEVICE_FILE)?,
        label: string(bag, keys::LABEL)?,
        drive_model: string(bag, keys::DRIVE_MODEL)?,
        device_type: device_type(bag),
        total_size_in_bytes: unsigned(bag, keys::SIZE)?,
        is_read_only: boolean(bag, keys::READ_ONLY)?,
        is_hidden: boolean(bag, keys::PRESENTATION_HIDE)?,
    })
}

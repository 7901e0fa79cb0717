// SPDX-License-Identifier: GPL-3.0-only

//! Device descriptor returned by `GetDeviceProperties`

use std::fmt;

use serde::{Deserialize, Serialize};

/// Best-effort device classification. `Unknown` is a normal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    Unknown,
    Usb,
    Sd,
    OpticalDisc,
    Mobile,
}

impl DeviceType {
    /// Map the service's numeric media tag. Unrecognized tags are `Unknown`.
    pub fn from_media_tag(tag: u32) -> Self {
        match tag {
            1 => Self::Usb,
            2 => Self::Sd,
            // 5 is DVD, reported as a distinct media type by newer services
            3 | 5 => Self::OpticalDisc,
            4 => Self::Mobile,
            _ => Self::Unknown,
        }
    }

    /// Map a textual media tag. Unrecognized tags are `Unknown`.
    pub fn from_media_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "usb" => Self::Usb,
            "sd" => Self::Sd,
            "optical_disc" | "optical-disc" | "optical" | "dvd" => Self::OpticalDisc,
            "mobile" => Self::Mobile,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Usb => "usb",
            Self::Sd => "sd",
            Self::OpticalDisc => "optical-disc",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about one disk or partition, decoded from a single property reply.
///
/// Only the client's decoder builds these; a value that exists always has a
/// non-empty `device_path`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiskInfo {
    /// Stable udev identifier (e.g. `/sys/devices/.../block/sdb/sdb1`)
    pub device_path: String,

    /// Where the device is mounted, empty when it is not
    pub mount_path: String,

    /// System path given by udev
    pub system_path: String,

    /// Whole device (`/dev/sdb`) rather than a partition (`/dev/sdb1`)
    pub is_drive: bool,

    pub has_media: bool,

    /// Lives on the device the machine booted from
    pub on_boot_device: bool,

    /// Device node (e.g. `/dev/sdb1`)
    pub file_path: String,

    pub label: String,

    /// Drive model (e.g. "TransMemory")
    pub drive_model: String,

    pub device_type: DeviceType,

    /// Total size in bytes, 0 when unknown
    pub total_size_in_bytes: u64,

    pub is_read_only: bool,

    /// Should be hidden from file browsers
    pub is_hidden: bool,
}

impl DiskInfo {
    pub fn is_mounted(&self) -> bool {
        !self.mount_path.is_empty()
    }

    /// Human-readable name: label, drive model, device node name, then device path.
    pub fn display_name(&self) -> String {
        if !self.label.is_empty() {
            self.label.clone()
        } else if !self.drive_model.is_empty() {
            self.drive_model.clone()
        } else if let Some(node) = self
            .file_path
            .rsplit('/')
            .next()
            .filter(|node| !node.is_empty())
        {
            node.to_string()
        } else {
            self.device_path.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DiskInfo {
        DiskInfo {
            device_path: "/sys/devices/pci0000:00/usb1/1-1/block/sdb/sdb1".to_string(),
            mount_path: String::new(),
            system_path: "/sys/devices/pci0000:00/usb1/1-1/block/sdb/sdb1".to_string(),
            is_drive: false,
            has_media: true,
            on_boot_device: false,
            file_path: "/dev/sdb1".to_string(),
            label: String::new(),
            drive_model: String::new(),
            device_type: DeviceType::Usb,
            total_size_in_bytes: 8_000_000_000,
            is_read_only: false,
            is_hidden: false,
        }
    }

    #[test]
    fn display_name_prefers_label_then_model_then_node() {
        let mut disk = sample();
        assert_eq!(disk.display_name(), "sdb1");

        disk.drive_model = "TransMemory".to_string();
        assert_eq!(disk.display_name(), "TransMemory");

        disk.label = "BACKUP".to_string();
        assert_eq!(disk.display_name(), "BACKUP");

        let mut bare = sample();
        bare.file_path.clear();
        assert_eq!(bare.display_name(), bare.device_path);
    }

    #[test]
    fn media_tags_fall_back_to_unknown() {
        assert_eq!(DeviceType::from_media_tag(1), DeviceType::Usb);
        assert_eq!(DeviceType::from_media_tag(5), DeviceType::OpticalDisc);
        assert_eq!(DeviceType::from_media_tag(42), DeviceType::Unknown);
        assert_eq!(DeviceType::from_media_name("SD"), DeviceType::Sd);
        assert_eq!(DeviceType::from_media_name("floppy"), DeviceType::Unknown);
    }

    #[test]
    fn disk_info_serializes_device_type_in_snake_case() {
        let json = serde_json::to_value(sample()).expect("serialize disk info");
        assert_eq!(json["device_type"], "usb");
        assert_eq!(json["total_size_in_bytes"], 8_000_000_000u64);
        assert!(!sample().is_mounted());
    }
}

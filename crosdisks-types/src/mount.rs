// SPDX-License-Identifier: GPL-3.0-only

//! Mount request and notification enumerations

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wire tag that does not name any known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {kind} tag: {value}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: u32,
}

/// Kind of source being mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountType {
    /// Sentinel; a correct caller never sends it.
    #[default]
    Invalid,
    Device,
    Archive,
    RemoteDocument,
    NetworkStorage,
}

impl MountType {
    pub const ALL: [MountType; 5] = [
        Self::Invalid,
        Self::Device,
        Self::Archive,
        Self::RemoteDocument,
        Self::NetworkStorage,
    ];

    /// Wire tag
    pub fn code(self) -> u32 {
        match self {
            Self::Invalid => 0,
            Self::Device => 1,
            Self::Archive => 2,
            Self::RemoteDocument => 3,
            Self::NetworkStorage => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Device => "device",
            Self::Archive => "archive",
            Self::RemoteDocument => "remote-document",
            Self::NetworkStorage => "network-storage",
        }
    }
}

impl TryFrom<u32> for MountType {
    type Error = UnknownTag;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.code() == value)
            .ok_or(UnknownTag {
                kind: "mount type",
                value,
            })
    }
}

impl fmt::Display for MountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystem a [`MountError`] belongs to, derived from its numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountErrorBand {
    General,
    Filesystem,
    Archive,
    Library,
    AuthNetwork,
    Lifecycle,
}

/// Outcome code reported by the disk service for a mount request.
///
/// Values are grouped by hundreds: 10x filesystem, 20x archive, 50x library,
/// 60x authentication and network, 90x lifecycle. New codes go in the band of
/// their subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountError {
    #[default]
    None,
    Unknown,
    Internal,
    UnknownFilesystem,
    UnsupportedFilesystem,
    InvalidArchive,
    LibraryNotLoaded,
    NotAuthenticated,
    NetworkError,
    PathUnmounted,
}

impl MountError {
    pub const ALL: [MountError; 10] = [
        Self::None,
        Self::Unknown,
        Self::Internal,
        Self::UnknownFilesystem,
        Self::UnsupportedFilesystem,
        Self::InvalidArchive,
        Self::LibraryNotLoaded,
        Self::NotAuthenticated,
        Self::NetworkError,
        Self::PathUnmounted,
    ];

    /// Wire tag
    pub fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Unknown => 1,
            Self::Internal => 2,
            Self::UnknownFilesystem => 101,
            Self::UnsupportedFilesystem => 102,
            Self::InvalidArchive => 201,
            Self::LibraryNotLoaded => 501,
            Self::NotAuthenticated => 601,
            Self::NetworkError => 602,
            Self::PathUnmounted => 901,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::None
    }

    pub fn band(self) -> MountErrorBand {
        match self.code() / 100 {
            1 => MountErrorBand::Filesystem,
            2 => MountErrorBand::Archive,
            5 => MountErrorBand::Library,
            6 => MountErrorBand::AuthNetwork,
            9 => MountErrorBand::Lifecycle,
            _ => MountErrorBand::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Unknown => "unknown",
            Self::Internal => "internal",
            Self::UnknownFilesystem => "unknown-filesystem",
            Self::UnsupportedFilesystem => "unsupported-filesystem",
            Self::InvalidArchive => "invalid-archive",
            Self::LibraryNotLoaded => "library-not-loaded",
            Self::NotAuthenticated => "not-authenticated",
            Self::NetworkError => "network-error",
            Self::PathUnmounted => "path-unmounted",
        }
    }
}

impl TryFrom<u32> for MountError {
    type Error = UnknownTag;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|err| err.code() == value)
            .ok_or(UnknownTag {
                kind: "mount error",
                value,
            })
    }
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle notification kinds, one per service signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountEventType {
    DiskAdded,
    DiskRemoved,
    DiskChanged,
    DeviceAdded,
    DeviceRemoved,
    DeviceScanned,
    FormattingFinished,
}

impl MountEventType {
    pub const ALL: [MountEventType; 7] = [
        Self::DiskAdded,
        Self::DiskRemoved,
        Self::DiskChanged,
        Self::DeviceAdded,
        Self::DeviceRemoved,
        Self::DeviceScanned,
        Self::FormattingFinished,
    ];

    /// D-Bus signal member carrying this event
    pub fn signal_name(self) -> &'static str {
        match self {
            Self::DiskAdded => "DiskAdded",
            Self::DiskRemoved => "DiskRemoved",
            Self::DiskChanged => "DiskChanged",
            Self::DeviceAdded => "DeviceAdded",
            Self::DeviceRemoved => "DeviceRemoved",
            Self::DeviceScanned => "DeviceScanned",
            Self::FormattingFinished => "FormattingFinished",
        }
    }

    pub fn from_signal_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ev| ev.signal_name() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DiskAdded => "disk-added",
            Self::DiskRemoved => "disk-removed",
            Self::DiskChanged => "disk-changed",
            Self::DeviceAdded => "device-added",
            Self::DeviceRemoved => "device-removed",
            Self::DeviceScanned => "device-scanned",
            Self::FormattingFinished => "formatting-finished",
        }
    }
}

impl fmt::Display for MountEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_error_codes_are_stable() {
        assert_eq!(MountError::None.code(), 0);
        assert_eq!(MountError::Unknown.code(), 1);
        assert_eq!(MountError::Internal.code(), 2);
        assert_eq!(MountError::UnknownFilesystem.code(), 101);
        assert_eq!(MountError::UnsupportedFilesystem.code(), 102);
        assert_eq!(MountError::InvalidArchive.code(), 201);
        assert_eq!(MountError::LibraryNotLoaded.code(), 501);
        assert_eq!(MountError::NotAuthenticated.code(), 601);
        assert_eq!(MountError::NetworkError.code(), 602);
        assert_eq!(MountError::PathUnmounted.code(), 901);
    }

    #[test]
    fn mount_error_bands_follow_numeric_ranges() {
        assert_eq!(MountError::Internal.band(), MountErrorBand::General);
        assert_eq!(
            MountError::UnsupportedFilesystem.band(),
            MountErrorBand::Filesystem
        );
        assert_eq!(MountError::InvalidArchive.band(), MountErrorBand::Archive);
        assert_eq!(MountError::LibraryNotLoaded.band(), MountErrorBand::Library);
        assert_eq!(MountError::NetworkError.band(), MountErrorBand::AuthNetwork);
        assert_eq!(MountError::PathUnmounted.band(), MountErrorBand::Lifecycle);
    }

    #[test]
    fn unknown_mount_error_code_is_rejected() {
        let err = MountError::try_from(103).unwrap_err();
        assert_eq!(err.value, 103);
        assert_eq!(err.to_string(), "unknown mount error tag: 103");
        assert_eq!(MountError::try_from(601), Ok(MountError::NotAuthenticated));
    }

    #[test]
    fn mount_type_tags_match_wire_order() {
        for (tag, ty) in MountType::ALL.iter().enumerate() {
            assert_eq!(MountType::try_from(tag as u32), Ok(*ty));
        }
        assert!(MountType::try_from(5).is_err());
    }

    #[test]
    fn event_types_map_to_signal_names() {
        assert_eq!(
            MountEventType::from_signal_name("DeviceScanned"),
            Some(MountEventType::DeviceScanned)
        );
        assert_eq!(MountEventType::from_signal_name("MountCompleted"), None);
        assert_eq!(MountEventType::FormattingFinished.to_string(), "formatting-finished");
    }
}

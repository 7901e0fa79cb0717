// SPDX-License-Identifier: GPL-3.0-only

//! Domain model shared by the cros-disks client and its tools
//!
//! - `MountType`, `MountError`, `MountEventType` describe mount requests and the
//!   notifications the disk service emits about them.
//! - `DeviceType` and `DiskInfo` describe a single device as reported by
//!   `GetDeviceProperties`.
//!
//! Numeric tags on the enumerations are part of the wire contract and must not
//! be renumbered.

pub mod disk;
pub mod mount;

pub use disk::{DeviceType, DiskInfo};
pub use mount::{MountError, MountErrorBand, MountEventType, MountType, UnknownTag};

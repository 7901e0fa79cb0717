// SPDX-License-Identifier: GPL-3.0-only

use anyhow::Result;
use crosdisks_types::{DiskInfo, MountError, MountEventType, MountType};
use num_format::{Locale, ToFormattedString};
use serde_json::json;

pub fn device_list(json: bool, devices: &[String]) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(devices)?);
    } else {
        for device in devices {
            println!("{}", device);
        }
    }
    Ok(())
}

pub fn disk_info(json: bool, disk: &DiskInfo) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(disk)?);
        return Ok(());
    }

    let mount_path = if disk.is_mounted() {
        disk.mount_path.as_str()
    } else {
        "(not mounted)"
    };

    println!("{}", disk.display_name());
    println!("  device path:    {}", disk.device_path);
    println!("  system path:    {}", disk.system_path);
    println!("  device file:    {}", disk.file_path);
    println!("  mount path:     {}", mount_path);
    println!("  label:          {}", disk.label);
    println!("  drive model:    {}", disk.drive_model);
    println!("  device type:    {}", disk.device_type);
    println!("  size:           {}", format_size(disk.total_size_in_bytes));
    println!("  drive:          {}", disk.is_drive);
    println!("  has media:      {}", disk.has_media);
    println!("  boot device:    {}", disk.on_boot_device);
    println!("  read-only:      {}", disk.is_read_only);
    println!("  hidden:         {}", disk.is_hidden);
    Ok(())
}

pub fn lifecycle_event(json: bool, event: MountEventType, device_path: &str) {
    if json {
        println!("{}", json!({ "event": event, "device_path": device_path }));
    } else {
        println!("{:<20} {}", event, device_path);
    }
}

pub fn mount_completed(
    json: bool,
    error: MountError,
    source_path: &str,
    mount_type: MountType,
    mount_path: &str,
) -> Result<()> {
    if json {
        let value = json!({
            "event": "mount_completed",
            "error": error,
            "error_code": error.code(),
            "source_path": source_path,
            "mount_type": mount_type,
            "mount_path": mount_path,
        });
        println!("{}", serde_json::to_string(&value)?);
    } else if error.is_success() {
        println!(
            "{:<20} {} ({}) -> {}",
            "mount-completed", source_path, mount_type, mount_path
        );
    } else {
        println!(
            "{:<20} {} ({}) failed: {} [{}]",
            "mount-completed",
            source_path,
            mount_type,
            error,
            error.code()
        );
    }
    Ok(())
}

/// `"7.45 GiB (8,000,000,000 bytes)"`, or `"unknown"` for 0
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "unknown".to_string();
    }

    const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!(
        "{:.2} {} ({} bytes)",
        value,
        UNITS[unit],
        bytes.to_formatted_string(&Locale::en)
    )
}

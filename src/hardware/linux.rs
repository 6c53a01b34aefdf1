use std::fs;
use std::path::{Path, PathBuf};

use crate::fingerprint::GpuInfo;

/// Root of the DRM device tree.
pub const DRM_ROOT: &str = "/sys/class/drm";

/// Sorted entries under `root` whose names satisfy `keep`.
fn drm_entries(root: &Path, keep: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(dir) => dir
            .flatten()
            .filter(|e| keep(&e.file_name().to_string_lossy()))
            .map(|e| e.path())
            .collect(),
        Err(_) => return Vec::new(),
    };
    entries.sort();
    entries
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Map a PCI vendor id (e.g. `0x8086`) to a vendor name.
pub fn vendor_name(vendor_id: &str) -> String {
    match vendor_id.to_ascii_lowercase().as_str() {
        "0x8086" => "Intel".to_string(),
        "0x10de" => "NVIDIA".to_string(),
        "0x1002" => "AMD".to_string(),
        "0x1af4" => "Red Hat (virtio)".to_string(),
        "0x15ad" => "VMware".to_string(),
        other => other.to_string(),
    }
}

/// Extract the `DRIVER=` value from a sysfs uevent file.
pub fn parse_uevent_driver(uevent: &str) -> Option<String> {
    uevent
        .lines()
        .find_map(|line| line.strip_prefix("DRIVER="))
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Parse a DRM mode line such as `1920x1080` (optionally suffixed, e.g. `1920x1080i`).
pub fn parse_mode_line(line: &str) -> Option<(u32, u32)> {
    let (w, h) = line.trim().split_once('x')?;
    let h: String = h.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Renderer and vendor of the first DRM card under `root`.
pub fn read_gpu_info(root: &Path) -> Option<GpuInfo> {
    // cardN, not connector entries such as card0-HDMI-A-1
    let cards = drm_entries(root, |name| name.starts_with("card") && !name.contains('-'));

    cards.iter().find_map(|card| {
        let device = card.join("device");
        let vendor_id = read_trimmed(&device.join("vendor"))?;
        let device_id = read_trimmed(&device.join("device"))?;
        let driver = read_trimmed(&device.join("uevent"))
            .and_then(|u| parse_uevent_driver(&u))
            .unwrap_or_else(|| "unknown".to_string());

        Some(GpuInfo {
            renderer: format!("{driver} {device_id}"),
            vendor: vendor_name(&vendor_id),
        })
    })
}

/// Preferred mode of the first connected display under `root`.
pub fn read_screen_size(root: &Path) -> Option<(u32, u32)> {
    let connectors = drm_entries(root, |name| name.starts_with("card") && name.contains('-'));

    connectors.iter().find_map(|conn| {
        if read_trimmed(&conn.join("status")).as_deref() != Some("connected") {
            return None;
        }
        let modes = read_trimmed(&conn.join("modes"))?;
        modes.lines().next().and_then(parse_mode_line)
    })
}

//! Unity `.meta` companion file parsing.

use std::fs;
use std::path::Path;

/// Read the GUID from an asset's `.meta` companion. Unity writes the
/// companion as `<name>.<ext>.meta`; some tooling drops the original
/// extension, so both layouts are probed.
pub fn read_guid(path: &Path) -> Option<String> {
    let mut with_full_ext = path.as_os_str().to_owned();
    with_full_ext.push(".meta");
    let full = Path::new(&with_full_ext);

    let meta_path = if full.exists() {
        full.to_path_buf()
    } else {
        let swapped = path.with_extension("meta");
        if swapped.exists() {
            swapped
        } else {
            return None;
        }
    };

    let content = fs::read_to_string(meta_path).ok()?;
    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("guid:") {
            return Some(rest.trim().to_string());
        }
    }

    None
}

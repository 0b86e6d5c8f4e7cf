//! Web app manifest icon list
//!
//! Mirrors the `icons` member of the W3C Web App Manifest so the generated
//! PNGs can be pasted straight into a progressive web app's `manifest.json`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the manifest fragment written next to the icons.
pub const MANIFEST_FILE_NAME: &str = "manifest-icons.json";

/// Icons at least this large are also offered as maskable.
const MASKABLE_MIN_SIZE: u32 = 192;

/// Root object holding the icon list.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ManifestIcons {
    pub icons: Vec<IconEntry>,
}

/// A single image resource of the manifest.
#[derive(Serialize, Debug, Clone)]
pub struct IconEntry {
    /// URL of the icon, relative to the manifest's scope
    pub src: String,

    /// Space-separated `WxH` sizes contained in the file
    pub sizes: String,

    /// MIME type of the image
    #[serde(rename = "type")]
    pub mime_type: String,

    /// How the platform may use the icon (e.g. "any maskable")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl IconEntry {
    /// Creates a PNG entry for a square icon of `size` pixels served under `prefix`.
    pub fn png(prefix: &str, file_name: &str, size: u32) -> Self {
        let purpose = (size >= MASKABLE_MIN_SIZE).then(|| "any maskable".to_string());

        Self {
            src: join_url(prefix, file_name),
            sizes: format!("{size}x{size}"),
            mime_type: "image/png".to_string(),
            purpose,
        }
    }
}

impl ManifestIcons {
    pub fn add_icon(&mut self, entry: IconEntry) {
        self.icons.push(entry);
    }
}

fn join_url(prefix: &str, file_name: &str) -> String {
    if prefix.is_empty() {
        file_name.to_string()
    } else if prefix.ends_with('/') {
        format!("{prefix}{file_name}")
    } else {
        format!("{prefix}/{file_name}")
    }
}

/// Writes `manifest-icons.json` into `dir` and returns its path.
pub fn write_manifest_icons(dir: &Path, manifest: &ManifestIcons) -> Result<PathBuf> {
    let json =
        serde_json::to_string_pretty(manifest).context("Failed to serialize manifest icons")?;

    let path = dir.join(MANIFEST_FILE_NAME);
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

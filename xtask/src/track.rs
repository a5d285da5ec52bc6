//! Opening host files through the player's storage layer.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use platform::storage_local::{LocalFile, LocalFileStorage};
use platform::Storage;

/// Open `path` through a [`LocalFileStorage`] rooted at its parent
/// directory, the same way the menu opens a track on the card.
pub fn open(path: &Path) -> Result<LocalFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("not a file name: {}", path.display()))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let root = parent
        .to_str()
        .ok_or_else(|| anyhow!("path is not UTF-8: {}", parent.display()))?;
    let mut storage = LocalFileStorage::new(root);
    storage
        .open_file(&format!("/{name}"))
        .with_context(|| format!("failed to open {}", path.display()))
}

//! Loads content trees from a directory of JSON files.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::{ContentError, ContentNode};

/// Loads every `*.json` file in `dir` (non-recursive, sorted by file name).
///
/// A tree without an `id` takes the file stem as its id.
pub async fn load_directory(dir: &Path) -> Result<Vec<ContentNode>, ContentError> {
    let read_dir_error = |e| ContentError::ReadDir {
        path: dir.display().to_string(),
        source: e,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_error)?;

    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            continue;
        }
        // Follows symlinks, unlike `DirEntry::file_type`.
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(path);
        }
    }
    files.sort();

    let mut nodes = Vec::with_capacity(files.len());
    for file in files {
        nodes.push(load_file(&file).await?);
    }

    info!("Loaded {} content trees from {:?}", nodes.len(), dir);
    Ok(nodes)
}

/// Loads a single content tree.
pub async fn load_file(path: &Path) -> Result<ContentNode, ContentError> {
    let file_name = path.display().to_string();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ContentError::ReadFile {
            file: file_name.clone(),
            source: e,
        })?;

    let mut node: ContentNode = serde_json::from_str(&raw).map_err(|e| ContentError::Parse {
        file: file_name.clone(),
        reason: e.to_string(),
    })?;

    if node.id.trim().is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            node.id = stem.to_string();
        }
    }

    debug!(
        "Loaded content tree {} ({} nodes) from {}",
        node.id,
        node.subtree_len(),
        file_name
    );
    Ok(node)
}

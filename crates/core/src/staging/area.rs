//! Staging paths and their lifecycle.
//!
//! Layout for a node with namespaced id `p1/c1` under root `R`:
//!
//! ```text
//! R/p1/c1/0.png, 0.mp3, 0.mkv, ...   per-unit files
//! R/p1/c1/filenames.txt              manifest of the own artifact
//! R/p1/c1/output.mkv                 own artifact
//! R/p1/c1.final.mkv                  final artifact (own + descendants)
//! R/p1/c1.final.txt                  manifest of the final artifact
//! ```
//!
//! The final artifact sits beside the node directory, inside the parent's
//! directory, so removing the node directory keeps it for the parent and
//! removing the parent directory disposes of it.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::content::NodePath;

use super::error::StagingError;

const MANIFEST_NAME: &str = "filenames.txt";
const OWN_ARTIFACT_STEM: &str = "output";
const IMAGE_EXTENSION: &str = "png";
const AUDIO_EXTENSION: &str = "mp3";

/// Root of the staging namespace.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    extension: String,
}

impl StagingArea {
    /// `extension` is the container extension of segments and artifacts.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Paths owned by the node at `path`. Nothing is touched on disk.
    pub fn node(&self, path: &NodePath) -> NodeStaging {
        let mut dir = self.root.clone();
        for segment in path.segments() {
            dir.push(segment);
        }
        let parent = dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        let leaf = path.leaf_id();

        NodeStaging {
            path: path.clone(),
            final_artifact: parent.join(format!("{}.final.{}", leaf, self.extension)),
            final_manifest: parent.join(format!("{}.final.txt", leaf)),
            dir,
            extension: self.extension.clone(),
        }
    }

    /// Creates the node directory (and its ancestors) if missing.
    pub async fn prepare(&self, node: &NodeStaging) -> Result<(), StagingError> {
        fs::create_dir_all(&node.dir)
            .await
            .map_err(|source| StagingError::CreateDir {
                path: node.dir.clone(),
                source,
            })
    }

    /// Removes the node directory, keeping its final artifact.
    ///
    /// Missing paths are not an error.
    pub async fn cleanup(&self, node: &NodeStaging) -> Result<(), StagingError> {
        remove_dir_if_exists(&node.dir).await?;
        remove_file_if_exists(&node.final_manifest).await?;
        debug!(node = %node.path, "Staging directory removed");
        Ok(())
    }

    /// [`cleanup`](Self::cleanup) with failures logged instead of returned.
    pub async fn cleanup_logged(&self, node: &NodeStaging) {
        if let Err(e) = self.cleanup(node).await {
            warn!(node = %node.path, error = %e, "Staging cleanup failed");
        }
    }

    /// Removes a final artifact that is no longer needed.
    pub async fn discard_final(&self, node: &NodeStaging) -> Result<(), StagingError> {
        remove_file_if_exists(&node.final_artifact).await?;
        remove_file_if_exists(&node.final_manifest).await
    }

    /// Moves `source` to `destination`, copying when a rename crosses filesystems.
    pub async fn move_file(&self, source: &Path, destination: &Path) -> Result<(), StagingError> {
        let move_error = |source_err: std::io::Error| StagingError::Move {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: source_err,
        };

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await.map_err(move_error)?;
        }

        match fs::rename(source, destination).await {
            Ok(()) => Ok(()),
            // Cross-filesystem renames fail with EXDEV (18 on Linux)
            Err(e)
                if e.kind() == std::io::ErrorKind::CrossesDevices
                    || e.raw_os_error() == Some(18) =>
            {
                debug!(
                    from = %source.display(),
                    to = %destination.display(),
                    "Rename crosses devices, copying"
                );
                fs::copy(source, destination).await.map_err(move_error)?;
                fs::remove_file(source).await.map_err(move_error)
            }
            Err(e) => Err(move_error(e)),
        }
    }
}

/// Paths of one node inside a [`StagingArea`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStaging {
    path: NodePath,
    dir: PathBuf,
    final_artifact: PathBuf,
    final_manifest: PathBuf,
    extension: String,
}

impl NodeStaging {
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn unit_image(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", index, IMAGE_EXTENSION))
    }

    pub fn unit_audio(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", index, AUDIO_EXTENSION))
    }

    pub fn unit_segment(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", index, self.extension))
    }

    /// Manifest listing the unit segments of the own artifact.
    pub fn manifest(&self) -> PathBuf {
        self.dir.join(MANIFEST_NAME)
    }

    pub fn own_artifact(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", OWN_ARTIFACT_STEM, self.extension))
    }

    pub fn final_artifact(&self) -> &Path {
        &self.final_artifact
    }

    pub fn final_manifest(&self) -> &Path {
        &self.final_manifest
    }
}

async fn remove_dir_if_exists(path: &Path) -> Result<(), StagingError> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StagingError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn remove_file_if_exists(path: &Path) -> Result<(), StagingError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StagingError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_node_layout() {
        let area = StagingArea::new("/staging", "mkv");
        let node = area.node(&NodePath::root("p1").child("c1"));

        assert_eq!(node.dir(), Path::new("/staging/p1/c1"));
        assert_eq!(node.unit_image(0), PathBuf::from("/staging/p1/c1/0.png"));
        assert_eq!(node.unit_audio(2), PathBuf::from("/staging/p1/c1/2.mp3"));
        assert_eq!(node.unit_segment(2), PathBuf::from("/staging/p1/c1/2.mkv"));
        assert_eq!(node.manifest(), PathBuf::from("/staging/p1/c1/filenames.txt"));
        assert_eq!(node.own_artifact(), PathBuf::from("/staging/p1/c1/output.mkv"));
        assert_eq!(node.final_artifact(), Path::new("/staging/p1/c1.final.mkv"));
        assert_eq!(node.final_manifest(), Path::new("/staging/p1/c1.final.txt"));
    }

    #[test]
    fn test_root_final_lives_in_staging_root() {
        let area = StagingArea::new("/staging", "mp4");
        let node = area.node(&NodePath::root("p1"));
        assert_eq!(node.final_artifact(), Path::new("/staging/p1.final.mp4"));
    }

    #[test]
    fn test_paths_are_stable_across_derivations() {
        let area = StagingArea::new("/staging", "mkv");
        let path = NodePath::root("p1").child("c1");
        assert_eq!(area.node(&path), area.node(&path.clone()));
    }

    #[tokio::test]
    async fn test_cleanup_keeps_final_artifact() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path(), "mkv");
        let node = area.node(&NodePath::root("p1").child("c1"));

        area.prepare(&node).await.unwrap();
        fs::write(node.unit_segment(0), b"seg").await.unwrap();
        fs::write(node.final_artifact(), b"final").await.unwrap();
        fs::write(node.final_manifest(), b"file 'x'").await.unwrap();

        area.cleanup(&node).await.unwrap();

        assert!(!node.dir().exists());
        assert!(!node.final_manifest().exists());
        assert!(node.final_artifact().exists());
    }

    #[tokio::test]
    async fn test_cleanup_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path(), "mkv");
        let node = area.node(&NodePath::root("never-created"));
        area.cleanup(&node).await.unwrap();
    }

    #[tokio::test]
    async fn test_move_file_creates_destination_dir() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path().join("staging"), "mkv");
        let source = temp.path().join("source.mkv");
        fs::write(&source, b"video").await.unwrap();

        let destination = temp.path().join("finished").join("p1.mkv");
        area.move_file(&source, &destination).await.unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).await.unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_move_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path(), "mkv");
        let err = area
            .move_file(&temp.path().join("missing"), &temp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, StagingError::Move { .. }));
    }
}

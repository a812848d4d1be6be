//! Evidence file storage
//!
//! Uploaded images live under a single evidence directory and are addressed
//! by relative path. Client-supplied filenames are never trusted for
//! storage: they are sanitized for the warning messages only, and every
//! stored file gets a collision-resistant generated name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

/// Image extensions accepted for evidence uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Whether the filename carries an allowed image extension.
pub fn allowed_file(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Lowercased extension, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Strip path components and unsafe characters from a client filename.
///
/// Keeps only the final path segment and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`, so the result can never escape the evidence
/// directory.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // ".." would still be a traversal after cleaning
    cleaned.replace("..", "_")
}

/// Generate a collision-resistant storage name, preserving only the
/// validated extension of the original filename.
pub fn unique_name(filename: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let token = Uuid::new_v4().simple();

    match extension_of(filename) {
        Some(ext) => format!("{}_{}.{}", stamp, token, ext),
        None => format!("{}_{}", stamp, token),
    }
}

/// Abstraction over the evidence file backend.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Write bytes under a relative path. Fails if the path already exists
    /// outside the store's control or the backend rejects the write.
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> std::io::Result<()>;

    /// Remove a stored file. Idempotent: a missing file is not an error.
    async fn remove(&self, relative_path: &str) -> std::io::Result<()>;
}

/// Filesystem-backed evidence store.
pub struct FsEvidenceStore {
    root: PathBuf,
}

impl FsEvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the store, ensuring the evidence directory exists.
    pub async fn init(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let store = Self::new(root);
        tokio::fs::create_dir_all(&store.root).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }
}

#[async_trait]
impl EvidenceStore for FsEvidenceStore {
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.full_path(relative_path), bytes).await
    }

    async fn remove(&self, relative_path: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.full_path(relative_path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("photo.jpg"));
        assert!(allowed_file("photo.JPEG"));
        assert!(allowed_file("a.b.webp"));
        assert!(!allowed_file("notes.txt"));
        assert!(!allowed_file("noextension"));
    }

    #[test]
    fn test_sanitize_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir\\evil.png"), "evil.png");
        assert_eq!(sanitize_filename("weird name!.png"), "weird_name_.png");
        assert_eq!(sanitize_filename("..png"), "_png");
    }

    #[test]
    fn test_unique_name_keeps_extension() {
        let name = unique_name("foto.JPG");
        assert!(name.ends_with(".jpg"));
        assert_ne!(unique_name("foto.jpg"), unique_name("foto.jpg"));
    }

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("evidence-test-{}", Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn test_write_and_remove_is_idempotent() {
        let store = FsEvidenceStore::init(temp_root()).await.unwrap();

        store.write("a.png", b"bytes").await.unwrap();
        assert!(store.root().join("a.png").exists());

        store.remove("a.png").await.unwrap();
        assert!(!store.root().join("a.png").exists());

        // second removal of a missing file still succeeds
        store.remove("a.png").await.unwrap();

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }
}

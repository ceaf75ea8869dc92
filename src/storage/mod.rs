//! Upload folder and index folder bookkeeping.
//!
//! Uploaded documents are written to `data/`. The vector store itself lives in
//! Chroma, but `db/` keeps a manifest of the last build so the app can tell
//! whether an index exists without a network round-trip.

use crate::types::{AppError, IndexManifest, Result, StoredDocument};
use crate::utils::toml_config::StorageConfig;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

const MANIFEST_FILE: &str = "index.json";

/// The pair of directories the application works in.
#[derive(Debug, Clone)]
pub struct Workspace {
    data_dir: PathBuf,
    db_dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl Workspace {
    pub fn new(data_dir: impl Into<PathBuf>, db_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_dir: db_dir.into(),
            allowed_extensions: vec!["pdf".to_string()],
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.data_dir, &config.db_dir)
            .with_allowed_extensions(config.allowed_extensions.clone())
    }

    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Create `data/` and `db/` if they do not exist.
    pub async fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).await?;
        fs::create_dir_all(&self.db_dir).await?;
        Ok(())
    }

    /// Whether `path` has one of the accepted extensions.
    pub fn is_allowed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let ext = e.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|a| *a == ext)
            })
            .unwrap_or(false)
    }

    /// Reduce an uploaded file name to a safe, bare file name.
    pub fn sanitize_file_name(&self, raw: &str) -> Result<String> {
        // Browsers on Windows may send the full client path.
        let name = raw
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();

        if name.is_empty() || name == "." || name == ".." {
            return Err(AppError::InvalidInput(format!(
                "Invalid file name '{}'",
                raw
            )));
        }
        if name.starts_with('.') {
            return Err(AppError::InvalidInput(format!(
                "Hidden files are not accepted: '{}'",
                name
            )));
        }
        if !self.is_allowed(Path::new(name)) {
            return Err(AppError::InvalidInput(format!(
                "Unsupported file type '{}'. Accepted: {}",
                name,
                self.allowed_extensions.join(", ")
            )));
        }

        Ok(name.to_string())
    }

    /// Persist uploaded bytes to `data/<name>`, overwriting any previous file.
    pub async fn save_upload(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = self.sanitize_file_name(file_name)?;
        fs::create_dir_all(&self.data_dir).await?;

        let path = self.data_dir.join(&name);
        fs::write(&path, bytes).await?;

        tracing::debug!(file = %name, bytes = bytes.len(), "Upload saved");
        Ok(path)
    }

    /// Paths of all indexable files in `data/`, sorted by name.
    pub async fn document_paths(&self) -> Result<Vec<PathBuf>> {
        if !fs::try_exists(&self.data_dir).await? {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && self.is_allowed(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Uploaded documents with size and modification time.
    pub async fn list_documents(&self) -> Result<Vec<StoredDocument>> {
        let mut documents = Vec::new();
        for path in self.document_paths().await? {
            let metadata = fs::metadata(&path).await?;
            let modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);
            documents.push(StoredDocument {
                name: file_name_of(&path),
                size_bytes: metadata.len(),
                modified_at,
            });
        }
        Ok(documents)
    }

    /// Remove every file in `data/`. Failures are logged and skipped.
    pub async fn clear_uploads(&self) -> Result<usize> {
        if !fs::try_exists(&self.data_dir).await? {
            return Ok(0);
        }

        let mut removed = 0;
        let mut entries = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not remove upload")
                }
            }
        }

        tracing::info!(removed, "Uploads cleared");
        Ok(removed)
    }

    /// Empty `db/`, keeping the directory itself.
    pub async fn clear_index_dir(&self) -> Result<()> {
        if !fs::try_exists(&self.db_dir).await? {
            return Ok(());
        }

        let mut entries = fs::read_dir(&self.db_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                if let Err(e) = fs::remove_dir_all(&path).await {
                    tracing::warn!(path = %path.display(), error = %e, "Could not remove directory");
                }
            } else {
                fs::remove_file(&path).await?;
            }
        }
        Ok(())
    }

    /// `db/` exists and holds at least one entry.
    pub async fn index_present(&self) -> bool {
        match fs::read_dir(&self.db_dir).await {
            Ok(mut entries) => matches!(entries.next_entry().await, Ok(Some(_))),
            Err(_) => false,
        }
    }

    pub async fn write_manifest(&self, manifest: &IndexManifest) -> Result<()> {
        fs::create_dir_all(&self.db_dir).await?;
        let json = serde_json::to_vec_pretty(manifest)
            .map_err(|e| AppError::Internal(format!("Failed to encode manifest: {}", e)))?;
        fs::write(self.db_dir.join(MANIFEST_FILE), json).await?;
        Ok(())
    }

    /// The last build's manifest, if one exists and is readable.
    pub async fn read_manifest(&self) -> Option<IndexManifest> {
        let bytes = fs::read(self.db_dir.join(MANIFEST_FILE)).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable index manifest");
                None
            }
        }
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{derive_asset_id, AssetStore, StoredAsset};

/// Local file system asset store, served back under `public_base_url`
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
    folder: String,
}

impl LocalStorage {
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            folder: folder.into(),
        }
    }

    /// Split an asset id into its directory and stem, refusing ids that escape the base path
    fn resolve(&self, id: &str) -> Option<(PathBuf, String)> {
        let rel = Path::new(id);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        let stem = rel.file_name()?.to_str()?.to_string();
        let dir = match rel.parent() {
            Some(parent) => self.base_path.join(parent),
            None => self.base_path.clone(),
        };
        Some((dir, stem))
    }

    /// URL of `file_name` stored next to asset `id`, each path segment percent-encoded
    fn public_url(&self, id: &str, file_name: &str) -> Result<String> {
        let mut url = Url::parse(&self.public_base_url).map_err(|e| {
            AppError::Internal(format!("Invalid public base URL {}: {}", self.public_base_url, e))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AppError::Internal(format!("Public base URL {} cannot carry a path", self.public_base_url))
            })?;
            segments.pop_if_empty();
            if let Some((parent, _)) = id.rsplit_once('/') {
                segments.extend(parent.split('/'));
            }
            segments.push(file_name);
        }
        Ok(url.to_string())
    }

    /// Remove every file in `dir` whose stem equals `stem`
    async fn remove_by_stem(dir: &Path, stem: &str) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path.file_stem().and_then(|s| s.to_str()) == Some(stem);
            if matches && entry.file_type().await?.is_file() {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl AssetStore for LocalStorage {
    async fn upload(&self, data: Bytes, suggested_name: &str) -> Result<StoredAsset> {
        let id = derive_asset_id(&self.folder, suggested_name)?;
        let (dir, stem) = self
            .resolve(&id)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid asset id: {}", id)))?;

        let ext = Path::new(suggested_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let file_name = match &ext {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem.clone(),
        };
        let url = self.public_url(&id, &file_name)?;

        let write = async {
            fs::create_dir_all(&dir).await?;
            // Same derived id overwrites, whatever the previous extension
            let replaced = Self::remove_by_stem(&dir, &stem).await?;
            if replaced > 0 {
                tracing::warn!("Overwriting existing asset {}", id);
            }

            let mut file = fs::File::create(dir.join(&file_name)).await?;
            file.write_all(&data).await?;
            file.flush().await?;
            Ok::<_, std::io::Error>(())
        };
        write
            .await
            .map_err(|e| AppError::AssetUploadFailed(format!("Failed to write {}: {}", id, e)))?;

        tracing::debug!("Saved asset {} ({} bytes)", id, data.len());

        Ok(StoredAsset { url, id })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let (dir, stem) = self
            .resolve(id)
            .ok_or_else(|| AppError::AssetDeleteFailed(format!("Invalid asset id: {}", id)))?;

        let removed = Self::remove_by_stem(&dir, &stem)
            .await
            .map_err(|e| AppError::AssetDeleteFailed(format!("Failed to delete {}: {}", id, e)))?;
        tracing::debug!("Deleted {} file(s) for asset {}", removed, id);
        Ok(())
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }
}

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::{AppError, Result};

/// Location of an uploaded asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Publicly fetchable URL
    pub url: String,
    /// Opaque identifier used for deletion
    pub id: String,
}

/// Remote or local image storage
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store image bytes under the folder namespace.
    /// An existing asset with the same derived id is overwritten.
    async fn upload(&self, data: Bytes, suggested_name: &str) -> Result<StoredAsset>;

    /// Remove an asset. Deleting an id that does not exist is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Get the storage type name
    fn storage_type(&self) -> &'static str;
}

/// Stem of the uploaded file name, e.g. `"shirts/blue shirt.JPG"` -> `"blue shirt"`.
/// Commas become `_` so the stem can sit inside a comma separated row.
pub fn file_stem(suggested_name: &str) -> Result<String> {
    Path::new(suggested_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.trim().replace(',', "_"))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid file name: {:?}", suggested_name)))
}

/// Derived asset identifier: `<folder>/<file stem>`
pub fn derive_asset_id(folder: &str, suggested_name: &str) -> Result<String> {
    let stem = file_stem(suggested_name)?;
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        Ok(stem)
    } else {
        Ok(format!("{}/{}", folder, stem))
    }
}

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::CloudinaryConfig;
use crate::error::{AppError, Result};
use crate::storage::{file_stem, AssetStore, StoredAsset};

use super::client::Client;

/// Cloudinary asset store
pub struct CloudinaryStorage {
    client: Client,
    folder: String,
}

impl CloudinaryStorage {
    pub fn new(config: &CloudinaryConfig, folder: impl Into<String>) -> Self {
        let client = Client::new(&config.cloud_name, &config.api_key, &config.api_secret)
            .with_api_base(&config.api_base);
        Self {
            client,
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl AssetStore for CloudinaryStorage {
    async fn upload(&self, data: Bytes, suggested_name: &str) -> Result<StoredAsset> {
        let public_id = file_stem(suggested_name)?;
        let size = data.len();

        let res = self
            .client
            .upload_image(data, suggested_name, &public_id, &self.folder)
            .await
            .map_err(|e| AppError::AssetUploadFailed(format!("Cloudinary upload failed: {}", e)))?;

        tracing::info!("Uploaded {} ({} bytes) to Cloudinary", res.public_id, size);
        Ok(StoredAsset {
            url: res.secure_url,
            id: res.public_id,
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let res = self
            .client
            .destroy_image(id)
            .await
            .map_err(|e| AppError::AssetDeleteFailed(format!("Cloudinary delete failed: {}", e)))?;

        if res.is_ok() {
            tracing::debug!("Deleted from Cloudinary: {}", id);
        } else if res.is_not_found() {
            tracing::debug!("Cloudinary asset already absent: {}", id);
        } else {
            return Err(AppError::AssetDeleteFailed(format!(
                "Cloudinary delete of {} returned '{}'",
                id, res.result
            )));
        }
        Ok(())
    }

    fn storage_type(&self) -> &'static str {
        "cloudinary"
    }
}

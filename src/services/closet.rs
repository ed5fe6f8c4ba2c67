use bytes::Bytes;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::metadata::MetadataStore;
use crate::models::{ClosetView, Facets, IndexedItem, ItemFilter, ItemTags, WardrobeItem};
use crate::storage::AssetStore;

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Closet browsing, upload and deletion
pub struct ClosetService;

impl ClosetService {
    /// Filtered closet with facet values taken from the whole table
    pub async fn browse(store: &MetadataStore, filter: &ItemFilter) -> Result<ClosetView> {
        let all = store.load().await?;
        let facets = Facets::collect(&all);
        let total = all.len();

        let items: Vec<IndexedItem> = all
            .into_iter()
            .enumerate()
            .filter(|(_, item)| filter.matches(item))
            .map(|(position, item)| IndexedItem { position, item })
            .collect();

        let shown = items.len();
        Ok(ClosetView {
            total,
            shown,
            label: format!(
                "{} item{} in your wardrobe",
                shown,
                if shown == 1 { "" } else { "s" }
            ),
            items,
            facets,
        })
    }

    /// Upload the image, then record it. No row is written if the upload fails.
    pub async fn add_item(
        store: &MetadataStore,
        assets: &dyn AssetStore,
        data: Bytes,
        file_name: &str,
        mut tags: ItemTags,
    ) -> Result<IndexedItem> {
        Self::validate_image(file_name, &data)?;
        tags.normalize().map_err(AppError::BadRequest)?;

        let asset = assets.upload(data, file_name).await?;

        let item = WardrobeItem {
            image_url: asset.url,
            asset_id: asset.id,
            category: tags.category,
            color: tags.color,
            season: tags.season,
        };
        let position = store.append(item.clone()).await?;
        tracing::info!(
            "Added {} ({} / {} / {}) via {}",
            item.asset_id,
            item.category,
            item.color,
            item.season,
            assets.storage_type()
        );

        Ok(IndexedItem { position, item })
    }

    /// Delete the item at `position`; `None` when the position is out of range
    pub async fn delete_item(
        store: &MetadataStore,
        assets: &dyn AssetStore,
        position: usize,
        expected_asset_id: Option<&str>,
    ) -> Result<Option<WardrobeItem>> {
        match expected_asset_id {
            Some(expected) => store.delete_at_checked(position, expected, assets).await,
            None => store.delete_at(position, assets).await,
        }
    }

    fn validate_image(file_name: &str, data: &Bytes) -> Result<()> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported image type '{}'; use png, jpg or jpeg",
                file_name
            )));
        }
        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded image is empty".to_string()));
        }
        Ok(())
    }
}

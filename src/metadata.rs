use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{MetadataRecord, WardrobeItem, REQUIRED_COLUMNS};
use crate::storage::AssetStore;

/// Flat-file wardrobe table, rewritten in full on every mutation.
///
/// Rows are addressed by position only. Mutations inside this process are
/// serialized; other processes writing the same file are not coordinated
/// and the last writer wins.
pub struct MetadataStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows in insertion order. A missing file, or one lacking any of the
    /// required columns, yields an empty table.
    pub async fn load(&self) -> Result<Vec<WardrobeItem>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_table(&path))
            .await
            .map_err(|e| AppError::Internal(format!("Metadata load task failed: {}", e)))?
    }

    /// Add one row at the end of the table, returning its position
    pub async fn append(&self, item: WardrobeItem) -> Result<usize> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        if items.iter().any(|i| i.asset_id == item.asset_id) {
            tracing::warn!(
                "Asset id {} is already cataloged; the stored image was overwritten",
                item.asset_id
            );
        }
        items.push(item);
        let position = items.len() - 1;
        self.persist(items).await?;
        Ok(position)
    }

    /// Remove the row at `position`, deleting its asset first.
    ///
    /// Asset deletion failures are logged and the row is removed anyway.
    /// Out-of-range positions leave the table untouched and return `None`.
    pub async fn delete_at(
        &self,
        position: usize,
        assets: &dyn AssetStore,
    ) -> Result<Option<WardrobeItem>> {
        self.remove_at(position, None, assets).await
    }

    /// Like [`delete_at`](Self::delete_at), but refuses to delete when the row
    /// at `position` no longer carries `expected_asset_id`.
    pub async fn delete_at_checked(
        &self,
        position: usize,
        expected_asset_id: &str,
        assets: &dyn AssetStore,
    ) -> Result<Option<WardrobeItem>> {
        self.remove_at(position, Some(expected_asset_id), assets).await
    }

    async fn remove_at(
        &self,
        position: usize,
        expected_asset_id: Option<&str>,
        assets: &dyn AssetStore,
    ) -> Result<Option<WardrobeItem>> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        let Some(current) = items.get(position) else {
            tracing::debug!("Delete at {} ignored: table has {} row(s)", position, items.len());
            return Ok(None);
        };

        if let Some(expected) = expected_asset_id {
            if current.asset_id != expected {
                return Err(AppError::Conflict(format!(
                    "Item at position {} is {}, not {}; reload the closet and retry",
                    position, current.asset_id, expected
                )));
            }
        }

        if let Err(e) = assets.delete(&current.asset_id).await {
            tracing::warn!("Could not delete asset {}: {}", current.asset_id, e);
        }

        let removed = items.remove(position);
        self.persist(items).await?;
        tracing::info!("Deleted item {} at position {}", removed.asset_id, position);
        Ok(Some(removed))
    }

    async fn persist(&self, items: Vec<WardrobeItem>) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_table(&path, &items))
            .await
            .map_err(|e| AppError::Internal(format!("Metadata write task failed: {}", e)))?
    }
}

fn unavailable(path: &Path, e: impl std::fmt::Display) -> AppError {
    AppError::StorageUnavailable(format!("{}: {}", path.display(), e))
}

fn read_table(path: &Path) -> Result<Vec<WardrobeItem>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| unavailable(path, e))?;

    let headers = reader.headers().map_err(|e| unavailable(path, e))?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        tracing::warn!(
            "{} is missing column(s) {:?}; treating it as empty",
            path.display(),
            missing
        );
        return Ok(Vec::new());
    }

    reader
        .deserialize::<MetadataRecord>()
        .map(|row| row.map(WardrobeItem::from).map_err(|e| unavailable(path, e)))
        .collect()
}

fn write_table(path: &Path, items: &[WardrobeItem]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| unavailable(path, e))?;

    writer
        .write_record(REQUIRED_COLUMNS)
        .map_err(|e| unavailable(path, e))?;
    for item in items {
        writer
            .serialize(MetadataRecord::from(item))
            .map_err(|e| unavailable(path, e))?;
    }
    writer.flush().map_err(|e| unavailable(path, e))?;
    Ok(())
}

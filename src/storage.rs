use crate::models::Item;
use crate::uploads::ImageStore;
use crate::user_models::UserIdentity;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Item records, persisted as one JSON document. Every read and mutation is
/// scoped to the calling [`UserIdentity`].
pub struct ItemStorage {
    path: PathBuf,
    items: RwLock<Vec<Item>>,
}

impl ItemStorage {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read items file {}", path.display()))?;
            serde_json::from_str(&data)
                .context("Failed to parse items file")?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    /// Records an item whose image has already been written. If the record
    /// cannot be persisted, the image is removed again so no file is left
    /// without a row.
    pub async fn create_item(
        &self,
        owner: &UserIdentity,
        images: &ImageStore,
        image_path: String,
        category: String,
    ) -> Result<Item> {
        let item = Item::new(owner, image_path, category);
        let mut items = self.items.write().await;
        items.push(item.clone());

        if let Err(e) = save_to_disk(&self.path, &items) {
            items.pop();
            if let Err(cleanup) = images.remove(&item.image_path) {
                tracing::warn!(error = ?cleanup, image = %item.image_path, "failed to clean up orphaned image");
            }
            return Err(e);
        }

        Ok(item)
    }

    pub async fn list_by_owner(&self, owner: &UserIdentity) -> Vec<Item> {
        let items = self.items.read().await;
        items
            .iter()
            .filter(|i| i.user_id == owner.user_id)
            .cloned()
            .collect()
    }

    pub async fn list_by_owner_and_category(&self, owner: &UserIdentity, category: &str) -> Vec<Item> {
        let items = self.items.read().await;
        items
            .iter()
            .filter(|i| i.user_id == owner.user_id && i.category == category)
            .cloned()
            .collect()
    }

    /// Deletes an item owned by `owner`, together with its image.
    ///
    /// Returns `Ok(None)` when there is no such item or it belongs to someone
    /// else; the two cases are deliberately indistinguishable. Ownership
    /// check, record removal and file removal all happen under the write lock.
    ///
    /// The record removal is persisted first. If that fails the item is put
    /// back and the image is left alone; the image is only removed once no
    /// persisted row refers to it.
    pub async fn delete_item(
        &self,
        owner: &UserIdentity,
        images: &ImageStore,
        item_id: &str,
    ) -> Result<Option<Item>> {
        let mut items = self.items.write().await;

        let Some(index) = items
            .iter()
            .position(|i| i.id == item_id && i.user_id == owner.user_id)
        else {
            return Ok(None);
        };

        let removed = items.remove(index);
        if let Err(e) = save_to_disk(&self.path, &items) {
            items.insert(index, removed);
            return Err(e);
        }

        if let Err(e) = images.remove(&removed.image_path) {
            tracing::warn!(error = ?e, image = %removed.image_path, "failed to remove image of deleted item");
        }

        Ok(Some(removed))
    }
}

fn save_to_disk(path: &Path, items: &[Item]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }
    let json = serde_json::to_string_pretty(items)
        .context("Failed to serialize items")?;
    fs::write(path, json)
        .context("Failed to write to items file")?;
    Ok(())
}

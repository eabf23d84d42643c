use anyhow::Result;

use crate::config::ServerConfig;
use crate::storage::ItemStorage;
use crate::uploads::ImageStore;
use crate::user_storage::UserStorage;

/// Shared by every handler behind an `Arc`.
pub struct AppState {
    pub users: UserStorage,
    pub items: ItemStorage,
    pub images: ImageStore,
    pub bcrypt_cost: u32,
    pub secure_cookies: bool,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn open(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            users: UserStorage::new(config.storage.users_file())?,
            items: ItemStorage::new(config.storage.items_file())?,
            images: ImageStore::new(&config.storage.upload_dir),
            bcrypt_cost: config.bcrypt_cost,
            secure_cookies: config.secure_cookies,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

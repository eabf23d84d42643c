use crate::error::StoreError;
use crate::user_models::User;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct UserStorage {
    path: PathBuf,
    users: RwLock<Vec<User>>,
}

impl UserStorage {
    pub fn new(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let users = if path.exists() {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read users file {}", path.display()))?;
            serde_json::from_str(&data)
                .context("Failed to parse users file")?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    /// Username uniqueness is checked under the write lock, so two
    /// concurrent registrations of the same name cannot both succeed.
    pub async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::DuplicateUsername(user.username));
        }

        users.push(user.clone());
        if let Err(e) = save_users_to_disk(&self.path, &users) {
            users.pop();
            return Err(e.into());
        }
        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.read().await;
        users.iter().find(|u| u.username == username).cloned()
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Option<User> {
        let users = self.users.read().await;
        users.iter().find(|u| u.id == user_id).cloned()
    }
}

fn save_users_to_disk(path: &Path, users: &[User]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }
    let json = serde_json::to_string_pretty(users)
        .context("Failed to serialize users")?;
    fs::write(path, json)
        .context("Failed to write to users file")?;
    Ok(())
}

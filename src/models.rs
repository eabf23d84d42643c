use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user_models::UserIdentity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub user_id: String,
    /// File name inside the upload directory.
    pub image_path: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(owner: &UserIdentity, image_path: String, category: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner.user_id.clone(),
            image_path,
            category,
            created_at: Utc::now(),
        }
    }

    pub fn image_url(&self) -> String {
        format!("/uploads/{}", self.image_path)
    }
}

/// The three categories the outfit randomizer draws from. Storage accepts
/// any category string; these are just the ones that count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Top,
    Bottom,
    Shoes,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Top, Category::Bottom, Category::Shoes];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Shoes => "shoes",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Outfit {
    pub top: Item,
    pub bottom: Item,
    pub shoes: Item,
}

use serde::Deserialize;

use crate::db::models::AlbumOrder;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlbum {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Assets seeded into the album in the same transaction.
    #[serde(default)]
    pub asset_ids: Vec<String>,
    /// Users granted shared access in the same transaction.
    #[serde(default)]
    pub shared_user_ids: Vec<String>,
}

/// Owner-only mutable fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlbumUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_activity_enabled: Option<bool>,
    pub display_order: Option<AlbumOrder>,
}

impl AlbumUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_activity_enabled.is_none()
            && self.display_order.is_none()
    }
}

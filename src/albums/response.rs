use serde::Serialize;

use crate::db::models::{Album, AlbumOrder, Asset, User};

/// Externally visible album: the record, its relations, and fields derived
/// from the member list. Never stored.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumResponse {
    pub id: String,
    pub owner_id: String,
    pub owner: User,
    pub name: String,
    pub description: String,
    pub is_activity_enabled: bool,
    pub display_order: AlbumOrder,
    pub shared: bool,
    pub shared_users: Vec<User>,
    pub assets: Vec<Asset>,
    pub asset_count: usize,
    pub thumbnail_asset_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AlbumResponse {
    /// Assets must already be in the album's display order; the first one
    /// becomes the thumbnail.
    pub fn project(album: Album, owner: User, shared_users: Vec<User>, assets: Vec<Asset>) -> Self {
        let mut start_date: Option<String> = None;
        let mut end_date: Option<String> = None;
        for asset in &assets {
            // stored timestamp format compares chronologically as a string
            let date = asset.effective_date();
            if start_date.as_deref().map_or(true, |s| date < s) {
                start_date = Some(date.to_string());
            }
            if end_date.as_deref().map_or(true, |e| date > e) {
                end_date = Some(date.to_string());
            }
        }

        let thumbnail_asset_id = assets.first().map(|a| a.id.clone());

        Self {
            id: album.id,
            owner_id: album.owner_id,
            owner,
            name: album.name,
            description: album.description,
            is_activity_enabled: album.is_activity_enabled,
            display_order: album.display_order,
            shared: !shared_users.is_empty(),
            shared_users,
            asset_count: assets.len(),
            thumbnail_asset_id,
            start_date,
            end_date,
            assets,
            created_at: album.created_at,
            updated_at: album.updated_at,
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "VIDEO")]
    Video,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Image => "IMAGE",
            AssetType::Video => "VIDEO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IMAGE" => Some(AssetType::Image),
            "VIDEO" => Some(AssetType::Video),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub owner_id: String,
    pub device_asset_id: String,
    pub device_id: String,
    pub asset_type: AssetType,
    pub original_path: String,
    pub resize_path: Option<String>,
    pub web_path: Option<String>,
    pub description: String,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub is_trashed: bool,
    pub is_visible: bool,
    pub taken_at: Option<String>,
    pub duration: Option<String>,
    pub library_id: Option<String>,
    pub stack_parent_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Column list matching `Asset::from_row`. Keep the two in sync.
pub const ASSET_COLUMNS: &str = "id, owner_id, device_asset_id, device_id, asset_type, \
     original_path, resize_path, web_path, description, \
     is_favorite, is_archived, is_trashed, is_visible, \
     taken_at, duration, library_id, stack_parent_id, created_at, updated_at";

impl Asset {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let type_str: String = row.get(4)?;
        let asset_type = AssetType::parse(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown asset type: {}", type_str).into(),
            )
        })?;

        Ok(Asset {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            device_asset_id: row.get(2)?,
            device_id: row.get(3)?,
            asset_type,
            original_path: row.get(5)?,
            resize_path: row.get(6)?,
            web_path: row.get(7)?,
            description: row.get(8)?,
            is_favorite: row.get(9)?,
            is_archived: row.get(10)?,
            is_trashed: row.get(11)?,
            is_visible: row.get(12)?,
            taken_at: row.get(13)?,
            duration: row.get(14)?,
            library_id: row.get(15)?,
            stack_parent_id: row.get(16)?,
            created_at: row.get(17)?,
            updated_at: row.get(18)?,
        })
    }

    /// Capture time when known, upload time otherwise.
    pub fn effective_date(&self) -> &str {
        self.taken_at.as_deref().unwrap_or(&self.created_at)
    }
}

/// Member ordering policy for an album: oldest or newest asset first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlbumOrder {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl AlbumOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumOrder::Asc => "asc",
            AlbumOrder::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(AlbumOrder::Asc),
            "desc" => Some(AlbumOrder::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub is_activity_enabled: bool,
    pub display_order: AlbumOrder,
    pub created_at: String,
    pub updated_at: String,
}

impl Album {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let order_str: String = row.get(5)?;
        let display_order = AlbumOrder::parse(&order_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("unknown display order: {}", order_str).into(),
            )
        })?;

        Ok(Album {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            is_activity_enabled: row.get(4)?,
            display_order,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

/// Column list matching `Album::from_row`.
pub const ALBUM_COLUMNS: &str =
    "id, owner_id, name, description, is_activity_enabled, display_order, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_type_round_trips() {
        assert_eq!(AssetType::parse("IMAGE"), Some(AssetType::Image));
        assert_eq!(AssetType::parse("VIDEO"), Some(AssetType::Video));
        assert_eq!(AssetType::parse("image"), None);
        assert_eq!(AssetType::Image.as_str(), "IMAGE");
    }

    #[test]
    fn album_order_round_trips() {
        assert_eq!(AlbumOrder::parse("asc"), Some(AlbumOrder::Asc));
        assert_eq!(AlbumOrder::parse("desc"), Some(AlbumOrder::Desc));
        assert_eq!(AlbumOrder::parse("newest"), None);
    }

    #[test]
    fn effective_date_prefers_capture_time() {
        let mut asset = Asset {
            id: "a1".into(),
            owner_id: "u1".into(),
            device_asset_id: "d1".into(),
            device_id: "phone".into(),
            asset_type: AssetType::Image,
            original_path: "/photos/a1.jpg".into(),
            resize_path: None,
            web_path: None,
            description: String::new(),
            is_favorite: false,
            is_archived: false,
            is_trashed: false,
            is_visible: true,
            taken_at: Some("2021-06-01 12:00:00".into()),
            duration: None,
            library_id: None,
            stack_parent_id: None,
            created_at: "2023-01-01 00:00:00".into(),
            updated_at: "2023-01-01 00:00:00".into(),
        };
        assert_eq!(asset.effective_date(), "2021-06-01 12:00:00");

        asset.taken_at = None;
        assert_eq!(asset.effective_date(), "2023-01-01 00:00:00");
    }
}

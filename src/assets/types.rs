use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::AssetType;

/// Listing filter. Every field is present-or-absent; `None` means "no
/// constraint", which is different from filtering on `false`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetFilter {
    pub asset_type: Option<AssetType>,
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_trashed: Option<bool>,
    pub library_id: Option<String>,
    pub taken_after: Option<DateTime<Utc>>,
    pub taken_before: Option<DateTime<Utc>>,
    pub path_contains: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Page {
    pub page: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 0, size: 100 }
    }
}

impl Page {
    pub fn offset(&self) -> u32 {
        self.page * self.size
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAsset {
    pub device_asset_id: String,
    pub device_id: String,
    pub asset_type: AssetType,
    pub original_path: String,
    #[serde(default)]
    pub resize_path: Option<String>,
    #[serde(default)]
    pub web_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub library_id: Option<String>,
    #[serde(default)]
    pub stack_parent_id: Option<String>,
}

/// Mutable subset of an asset: lifecycle flags and descriptive metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetUpdate {
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    pub description: Option<String>,
}

impl AssetUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_favorite.is_none() && self.is_archived.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetStats {
    pub images: u64,
    pub videos: u64,
    pub total: u64,
}

/// Timestamps are stored the way SQLite's `datetime('now')` writes them,
/// so string comparison orders chronologically.
pub(crate) fn to_sql_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn page_offset_multiplies() {
        let page = Page { page: 3, size: 50 };
        assert_eq!(page.offset(), 150);
        assert_eq!(Page::default().offset(), 0);
    }

    #[test]
    fn sql_datetime_matches_sqlite_format() {
        let dt = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 5).unwrap();
        assert_eq!(to_sql_datetime(&dt), "2021-06-01 12:30:05");
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(AssetUpdate::default().is_empty());
        let patch = AssetUpdate {
            is_favorite: Some(true),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}

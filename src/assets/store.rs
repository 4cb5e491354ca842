use std::collections::HashMap;

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::assets::types::{to_sql_datetime, AssetFilter, AssetStats, AssetUpdate, NewAsset, Page};
use crate::db::models::{Asset, ASSET_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Asset records and their lifecycle flags. All operations are scoped to the
/// calling user; rows owned by someone else behave as if they do not exist.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn list(&self, owner_id: &str, filter: &AssetFilter, page: &Page)
        -> AppResult<Vec<Asset>>;

    async fn get(&self, asset_id: &str, caller_id: &str) -> AppResult<Asset>;

    /// Insert a single asset. Re-uploading the same device asset for the
    /// same owner is a Conflict.
    async fn create(&self, owner_id: &str, new: &NewAsset) -> AppResult<Asset>;

    /// Insert every non-duplicate item in one transaction. Duplicates are
    /// skipped silently; only newly created records are returned.
    async fn bulk_upload_check(&self, owner_id: &str, items: &[NewAsset]) -> AppResult<Vec<Asset>>;

    /// Map each requested device asset id to a presence flag. Ids that are
    /// not found map to false, never omitted.
    async fn check_existing(
        &self,
        owner_id: &str,
        device_asset_ids: &[String],
        device_id: &str,
    ) -> AppResult<HashMap<String, bool>>;

    async fn update(
        &self,
        asset_id: &str,
        caller_id: &str,
        patch: &AssetUpdate,
    ) -> AppResult<Asset>;

    /// Bulk soft-delete. Ids not owned by the caller are silently excluded.
    /// Returns the number of rows changed.
    async fn trash(&self, owner_id: &str, ids: &[String]) -> AppResult<usize>;

    /// Bulk undo of `trash`. Same ownership filtering.
    async fn restore(&self, owner_id: &str, ids: &[String]) -> AppResult<usize>;

    /// Hard delete: removes album memberships and the asset row in one
    /// transaction.
    async fn delete(&self, asset_id: &str, caller_id: &str) -> AppResult<()>;

    async fn statistics(&self, owner_id: &str) -> AppResult<AssetStats>;

    /// Assets taken on the given day/month in any prior year, newest first,
    /// capped at 20.
    async fn memory_lane(&self, owner_id: &str, day: u32, month: u32) -> AppResult<Vec<Asset>>;
}

pub struct SqliteAssetStore {
    pool: DbPool,
}

impl SqliteAssetStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const MEMORY_LANE_LIMIT: u32 = 20;

#[async_trait]
impl AssetStore for SqliteAssetStore {
    async fn list(
        &self,
        owner_id: &str,
        filter: &AssetFilter,
        page: &Page,
    ) -> AppResult<Vec<Asset>> {
        let conn = self.pool.get()?;

        let mut sql = format!("SELECT {} FROM assets WHERE owner_id = ?", ASSET_COLUMNS);
        let mut args: Vec<Value> = vec![Value::from(owner_id.to_string())];

        if let Some(asset_type) = filter.asset_type {
            sql.push_str(" AND asset_type = ?");
            args.push(Value::from(asset_type.as_str().to_string()));
        }
        if let Some(favorite) = filter.is_favorite {
            sql.push_str(" AND is_favorite = ?");
            args.push(Value::from(i64::from(favorite)));
        }
        if let Some(archived) = filter.is_archived {
            sql.push_str(" AND is_archived = ?");
            args.push(Value::from(i64::from(archived)));
        }
        if let Some(trashed) = filter.is_trashed {
            sql.push_str(" AND is_trashed = ?");
            args.push(Value::from(i64::from(trashed)));
        }
        if let Some(library_id) = &filter.library_id {
            sql.push_str(" AND library_id = ?");
            args.push(Value::from(library_id.clone()));
        }
        if let Some(after) = &filter.taken_after {
            sql.push_str(" AND COALESCE(taken_at, created_at) >= ?");
            args.push(Value::from(to_sql_datetime(after)));
        }
        if let Some(before) = &filter.taken_before {
            sql.push_str(" AND COALESCE(taken_at, created_at) <= ?");
            args.push(Value::from(to_sql_datetime(before)));
        }
        if let Some(substring) = &filter.path_contains {
            sql.push_str(" AND original_path LIKE '%' || ? || '%'");
            args.push(Value::from(substring.clone()));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        args.push(Value::from(i64::from(page.size)));
        args.push(Value::from(i64::from(page.offset())));

        let mut stmt = conn.prepare(&sql)?;
        let assets = stmt
            .query_map(params_from_iter(args), Asset::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assets)
    }

    async fn get(&self, asset_id: &str, caller_id: &str) -> AppResult<Asset> {
        let conn = self.pool.get()?;
        get_owned(&conn, asset_id, caller_id)
    }

    async fn create(&self, owner_id: &str, new: &NewAsset) -> AppResult<Asset> {
        validate_new_asset(new)?;

        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();
        insert_asset(&conn, &id, owner_id, new).map_err(AppError::from_sqlite)?;
        get_owned(&conn, &id, owner_id)
    }

    async fn bulk_upload_check(&self, owner_id: &str, items: &[NewAsset]) -> AppResult<Vec<Asset>> {
        for item in items {
            validate_new_asset(item)?;
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut created_ids = Vec::new();
        for item in items {
            let exists: bool = tx.query_row(
                "SELECT COUNT(*) > 0 FROM assets \
                 WHERE device_asset_id = ?1 AND device_id = ?2 AND owner_id = ?3",
                params![item.device_asset_id, item.device_id, owner_id],
                |row| row.get(0),
            )?;
            if exists {
                continue;
            }

            let id = uuid::Uuid::now_v7().to_string();
            insert_asset(&tx, &id, owner_id, item).map_err(AppError::from_sqlite)?;
            created_ids.push(id);
        }
        tx.commit()?;

        created_ids
            .iter()
            .map(|id| get_owned(&conn, id, owner_id))
            .collect()
    }

    async fn check_existing(
        &self,
        owner_id: &str,
        device_asset_ids: &[String],
        device_id: &str,
    ) -> AppResult<HashMap<String, bool>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) > 0 FROM assets \
             WHERE device_asset_id = ?1 AND device_id = ?2 AND owner_id = ?3",
        )?;

        let mut result = HashMap::new();
        for device_asset_id in device_asset_ids {
            let exists: bool =
                stmt.query_row(params![device_asset_id, device_id, owner_id], |row| {
                    row.get(0)
                })?;
            result.insert(device_asset_id.clone(), exists);
        }
        Ok(result)
    }

    async fn update(
        &self,
        asset_id: &str,
        caller_id: &str,
        patch: &AssetUpdate,
    ) -> AppResult<Asset> {
        let conn = self.pool.get()?;
        let current = get_owned(&conn, asset_id, caller_id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let mut sets = vec!["updated_at = datetime('now')".to_string()];
        let mut args: Vec<Value> = Vec::new();

        if let Some(favorite) = patch.is_favorite {
            sets.push("is_favorite = ?".to_string());
            args.push(Value::from(i64::from(favorite)));
        }
        if let Some(archived) = patch.is_archived {
            sets.push("is_archived = ?".to_string());
            args.push(Value::from(i64::from(archived)));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?".to_string());
            args.push(Value::from(description.clone()));
        }
        args.push(Value::from(asset_id.to_string()));

        let sql = format!("UPDATE assets SET {} WHERE id = ?", sets.join(", "));
        conn.execute(&sql, params_from_iter(args))?;

        get_owned(&conn, asset_id, caller_id)
    }

    async fn trash(&self, owner_id: &str, ids: &[String]) -> AppResult<usize> {
        self.set_trashed(owner_id, ids, true)
    }

    async fn restore(&self, owner_id: &str, ids: &[String]) -> AppResult<usize> {
        self.set_trashed(owner_id, ids, false)
    }

    async fn delete(&self, asset_id: &str, caller_id: &str) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        get_owned(&tx, asset_id, caller_id)?;

        tx.execute(
            "DELETE FROM album_assets WHERE asset_id = ?1",
            params![asset_id],
        )?;
        tx.execute("DELETE FROM assets WHERE id = ?1", params![asset_id])?;

        tx.commit()?;
        Ok(())
    }

    async fn statistics(&self, owner_id: &str) -> AppResult<AssetStats> {
        let conn = self.pool.get()?;
        let (images, videos): (i64, i64) = conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN asset_type = 'IMAGE' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN asset_type = 'VIDEO' THEN 1 ELSE 0 END), 0) \
             FROM assets WHERE owner_id = ?1 AND is_trashed = 0",
            params![owner_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(AssetStats {
            images: images as u64,
            videos: videos as u64,
            total: (images + videos) as u64,
        })
    }

    async fn memory_lane(&self, owner_id: &str, day: u32, month: u32) -> AppResult<Vec<Asset>> {
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return Err(AppError::InvalidInput(format!(
                "invalid day/month: {}/{}",
                day, month
            )));
        }

        let current_year = chrono::Utc::now().format("%Y").to_string();

        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM assets \
             WHERE owner_id = ?1 AND is_trashed = 0 AND is_archived = 0 AND is_visible = 1 \
               AND strftime('%m', COALESCE(taken_at, created_at)) = ?2 \
               AND strftime('%d', COALESCE(taken_at, created_at)) = ?3 \
               AND strftime('%Y', COALESCE(taken_at, created_at)) < ?4 \
             ORDER BY COALESCE(taken_at, created_at) DESC \
             LIMIT {}",
            ASSET_COLUMNS, MEMORY_LANE_LIMIT
        );
        let mut stmt = conn.prepare(&sql)?;
        let assets = stmt
            .query_map(
                params![
                    owner_id,
                    format!("{:02}", month),
                    format!("{:02}", day),
                    current_year
                ],
                Asset::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assets)
    }
}

impl SqliteAssetStore {
    fn set_trashed(&self, owner_id: &str, ids: &[String], trashed: bool) -> AppResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.pool.get()?;
        let sql = format!(
            "UPDATE assets SET is_trashed = ?, updated_at = datetime('now') \
             WHERE owner_id = ? AND id IN ({})",
            placeholders(ids.len())
        );

        let mut args: Vec<Value> = vec![
            Value::from(i64::from(trashed)),
            Value::from(owner_id.to_string()),
        ];
        args.extend(ids.iter().map(|id| Value::from(id.clone())));

        let changed = conn.execute(&sql, params_from_iter(args))?;
        Ok(changed)
    }
}

/// Fetch an asset the caller owns. Absent rows and rows owned by someone
/// else are both NotFound, so existence is never leaked.
pub(crate) fn get_owned(conn: &Connection, asset_id: &str, caller_id: &str) -> AppResult<Asset> {
    let sql = format!("SELECT {} FROM assets WHERE id = ?1", ASSET_COLUMNS);
    let asset = conn
        .query_row(&sql, params![asset_id], Asset::from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
            other => AppError::Database(other),
        })?;

    if asset.owner_id != caller_id {
        return Err(AppError::NotFound);
    }
    Ok(asset)
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn validate_new_asset(new: &NewAsset) -> AppResult<()> {
    if new.device_asset_id.trim().is_empty() || new.device_id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "device_asset_id and device_id are required".to_string(),
        ));
    }
    if new.original_path.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "original_path is required".to_string(),
        ));
    }
    Ok(())
}

fn insert_asset(
    conn: &Connection,
    id: &str,
    owner_id: &str,
    new: &NewAsset,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO assets (id, owner_id, device_asset_id, device_id, asset_type, \
             original_path, resize_path, web_path, description, \
             is_favorite, is_archived, is_visible, \
             taken_at, duration, library_id, stack_parent_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            id,
            owner_id,
            new.device_asset_id,
            new.device_id,
            new.asset_type.as_str(),
            new.original_path,
            new.resize_path,
            new.web_path,
            new.description.as_deref().unwrap_or(""),
            new.is_favorite.unwrap_or(false),
            new.is_archived.unwrap_or(false),
            new.is_visible.unwrap_or(true),
            new.taken_at.as_ref().map(to_sql_datetime),
            new.duration,
            new.library_id,
            new.stack_parent_id,
        ],
    )?;
    Ok(())
}

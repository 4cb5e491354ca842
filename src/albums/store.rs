use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::albums::response::AlbumResponse;
use crate::albums::types::{AlbumUpdate, CreateAlbum};
use crate::assets::store::placeholders;
use crate::db::models::{Album, AlbumOrder, Asset, User, ALBUM_COLUMNS, ASSET_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Albums, their ownership, and the two membership relations
/// (album-asset, album-shared-user).
///
/// Access rule, applied uniformly: reads and membership edits are allowed
/// for the owner or any shared user; everything else is owner-only. A
/// caller with no relation to an album gets NotFound, never Forbidden, so
/// album existence is not leaked.
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// `shared = Some(true)`: albums where the caller is a shared user (not
    /// owner). `Some(false)`: albums the caller owns. `None`: both,
    /// deduplicated.
    async fn list(&self, caller_id: &str, shared: Option<bool>) -> AppResult<Vec<AlbumResponse>>;

    async fn get(&self, album_id: &str, caller_id: &str) -> AppResult<AlbumResponse>;

    /// Album row, shared-user rows and asset rows are written in one
    /// transaction; any failure rolls the whole creation back.
    async fn create(&self, owner_id: &str, new: &CreateAlbum) -> AppResult<AlbumResponse>;

    async fn update(
        &self,
        album_id: &str,
        caller_id: &str,
        patch: &AlbumUpdate,
    ) -> AppResult<AlbumResponse>;

    async fn delete(&self, album_id: &str, caller_id: &str) -> AppResult<()>;

    /// Already-present assets are skipped, the rest inserted. The caller is
    /// NOT required to own the referenced assets; any id they can name may
    /// be attached to an album they have access to.
    async fn add_assets(
        &self,
        album_id: &str,
        caller_id: &str,
        asset_ids: &[String],
    ) -> AppResult<AlbumResponse>;

    async fn remove_assets(
        &self,
        album_id: &str,
        caller_id: &str,
        asset_ids: &[String],
    ) -> AppResult<AlbumResponse>;

    async fn add_shared_users(
        &self,
        album_id: &str,
        caller_id: &str,
        user_ids: &[String],
    ) -> AppResult<AlbumResponse>;

    async fn remove_shared_user(
        &self,
        album_id: &str,
        caller_id: &str,
        user_id: &str,
    ) -> AppResult<AlbumResponse>;
}

pub struct SqliteAlbumStore {
    pool: DbPool,
}

impl SqliteAlbumStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumStore for SqliteAlbumStore {
    async fn list(&self, caller_id: &str, shared: Option<bool>) -> AppResult<Vec<AlbumResponse>> {
        let conn = self.pool.get()?;

        let mut album_ids: Vec<String> = Vec::new();
        if shared != Some(true) {
            let mut stmt = conn
                .prepare("SELECT id FROM albums WHERE owner_id = ?1 ORDER BY created_at DESC, id")?;
            let owned = stmt
                .query_map(params![caller_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            album_ids.extend(owned);
        }
        if shared != Some(false) {
            let mut stmt = conn.prepare(
                "SELECT s.album_id FROM album_shared_users s \
                 JOIN albums a ON a.id = s.album_id \
                 WHERE s.user_id = ?1 AND a.owner_id != ?1 \
                 ORDER BY a.created_at DESC, a.id",
            )?;
            let shared_ids = stmt
                .query_map(params![caller_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            for id in shared_ids {
                if !album_ids.contains(&id) {
                    album_ids.push(id);
                }
            }
        }

        album_ids
            .iter()
            .map(|id| load_response(&conn, id))
            .collect()
    }

    async fn get(&self, album_id: &str, caller_id: &str) -> AppResult<AlbumResponse> {
        let conn = self.pool.get()?;
        let album = load_album(&conn, album_id)?;
        require_access(&conn, &album, caller_id)?;
        load_response(&conn, album_id)
    }

    async fn create(&self, owner_id: &str, new: &CreateAlbum) -> AppResult<AlbumResponse> {
        if new.name.trim().is_empty() {
            return Err(AppError::InvalidInput("album name is required".to_string()));
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let id = uuid::Uuid::now_v7().to_string();
        tx.execute(
            "INSERT INTO albums (id, owner_id, name, description) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                owner_id,
                new.name,
                new.description.as_deref().unwrap_or("")
            ],
        )
        .map_err(AppError::from_sqlite)?;

        for user_id in &new.shared_user_ids {
            // the owner already has full access; a self-share is dropped
            if user_id == owner_id {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO album_shared_users (album_id, user_id) VALUES (?1, ?2)",
                params![id, user_id],
            )
            .map_err(AppError::from_sqlite)?;
        }

        for asset_id in &new.asset_ids {
            tx.execute(
                "INSERT OR IGNORE INTO album_assets (album_id, asset_id) VALUES (?1, ?2)",
                params![id, asset_id],
            )
            .map_err(AppError::from_sqlite)?;
        }

        tx.commit()?;
        load_response(&conn, &id)
    }

    async fn update(
        &self,
        album_id: &str,
        caller_id: &str,
        patch: &AlbumUpdate,
    ) -> AppResult<AlbumResponse> {
        let conn = self.pool.get()?;
        let album = load_album(&conn, album_id)?;
        require_owner(&conn, &album, caller_id)?;

        if patch.is_empty() {
            return load_response(&conn, album_id);
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(AppError::InvalidInput("album name is required".to_string()));
            }
        }

        let mut sets = vec!["updated_at = datetime('now')".to_string()];
        let mut args: Vec<Value> = Vec::new();

        if let Some(name) = &patch.name {
            sets.push("name = ?".to_string());
            args.push(Value::from(name.clone()));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?".to_string());
            args.push(Value::from(description.clone()));
        }
        if let Some(enabled) = patch.is_activity_enabled {
            sets.push("is_activity_enabled = ?".to_string());
            args.push(Value::from(i64::from(enabled)));
        }
        if let Some(order) = patch.display_order {
            sets.push("display_order = ?".to_string());
            args.push(Value::from(order.as_str().to_string()));
        }
        args.push(Value::from(album_id.to_string()));

        let sql = format!("UPDATE albums SET {} WHERE id = ?", sets.join(", "));
        conn.execute(&sql, params_from_iter(args))?;

        load_response(&conn, album_id)
    }

    async fn delete(&self, album_id: &str, caller_id: &str) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let album = load_album(&tx, album_id)?;
        require_owner(&tx, &album, caller_id)?;

        tx.execute(
            "DELETE FROM album_assets WHERE album_id = ?1",
            params![album_id],
        )?;
        tx.execute(
            "DELETE FROM album_shared_users WHERE album_id = ?1",
            params![album_id],
        )?;
        tx.execute("DELETE FROM albums WHERE id = ?1", params![album_id])?;

        tx.commit()?;
        Ok(())
    }

    async fn add_assets(
        &self,
        album_id: &str,
        caller_id: &str,
        asset_ids: &[String],
    ) -> AppResult<AlbumResponse> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let album = load_album(&tx, album_id)?;
        require_access(&tx, &album, caller_id)?;

        for asset_id in asset_ids {
            // composite primary key makes the duplicate add a no-op
            tx.execute(
                "INSERT OR IGNORE INTO album_assets (album_id, asset_id) VALUES (?1, ?2)",
                params![album_id, asset_id],
            )
            .map_err(AppError::from_sqlite)?;
        }
        tx.execute(
            "UPDATE albums SET updated_at = datetime('now') WHERE id = ?1",
            params![album_id],
        )?;

        tx.commit()?;
        load_response(&conn, album_id)
    }

    async fn remove_assets(
        &self,
        album_id: &str,
        caller_id: &str,
        asset_ids: &[String],
    ) -> AppResult<AlbumResponse> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let album = load_album(&tx, album_id)?;
        require_access(&tx, &album, caller_id)?;

        if !asset_ids.is_empty() {
            let sql = format!(
                "DELETE FROM album_assets WHERE album_id = ? AND asset_id IN ({})",
                placeholders(asset_ids.len())
            );
            let mut args: Vec<Value> = vec![Value::from(album_id.to_string())];
            args.extend(asset_ids.iter().map(|id| Value::from(id.clone())));
            tx.execute(&sql, params_from_iter(args))?;
        }
        tx.execute(
            "UPDATE albums SET updated_at = datetime('now') WHERE id = ?1",
            params![album_id],
        )?;

        tx.commit()?;
        load_response(&conn, album_id)
    }

    async fn add_shared_users(
        &self,
        album_id: &str,
        caller_id: &str,
        user_ids: &[String],
    ) -> AppResult<AlbumResponse> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let album = load_album(&tx, album_id)?;
        require_owner(&tx, &album, caller_id)?;

        for user_id in user_ids {
            if user_id == &album.owner_id {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO album_shared_users (album_id, user_id) VALUES (?1, ?2)",
                params![album_id, user_id],
            )
            .map_err(AppError::from_sqlite)?;
        }

        tx.commit()?;
        load_response(&conn, album_id)
    }

    async fn remove_shared_user(
        &self,
        album_id: &str,
        caller_id: &str,
        user_id: &str,
    ) -> AppResult<AlbumResponse> {
        let conn = self.pool.get()?;
        let album = load_album(&conn, album_id)?;
        require_owner(&conn, &album, caller_id)?;

        conn.execute(
            "DELETE FROM album_shared_users WHERE album_id = ?1 AND user_id = ?2",
            params![album_id, user_id],
        )?;

        load_response(&conn, album_id)
    }
}

fn load_album(conn: &Connection, album_id: &str) -> AppResult<Album> {
    let sql = format!("SELECT {} FROM albums WHERE id = ?1", ALBUM_COLUMNS);
    conn.query_row(&sql, params![album_id], Album::from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
            other => AppError::Database(other),
        })
}

fn has_shared_access(conn: &Connection, album_id: &str, user_id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM album_shared_users WHERE album_id = ?1 AND user_id = ?2",
        params![album_id, user_id],
        |row| row.get(0),
    )
}

/// Owner or shared user; anyone else sees NotFound.
fn require_access(conn: &Connection, album: &Album, caller_id: &str) -> AppResult<()> {
    if album.owner_id == caller_id || has_shared_access(conn, &album.id, caller_id)? {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

/// Strict owner equality. A shared user is told Forbidden; a stranger is
/// told NotFound, same as a missing album.
fn require_owner(conn: &Connection, album: &Album, caller_id: &str) -> AppResult<()> {
    if album.owner_id == caller_id {
        return Ok(());
    }
    if has_shared_access(conn, &album.id, caller_id)? {
        return Err(AppError::Forbidden);
    }
    Err(AppError::NotFound)
}

fn prefix_columns(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn load_response(conn: &Connection, album_id: &str) -> AppResult<AlbumResponse> {
    let album = load_album(conn, album_id)?;
    let owner = load_user(conn, &album.owner_id)?;

    let shared_users = {
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.display_name, u.created_at \
             FROM users u JOIN album_shared_users s ON s.user_id = u.id \
             WHERE s.album_id = ?1 ORDER BY s.created_at, u.id",
        )?;
        let users = stmt
            .query_map(params![album_id], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    display_name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        users
    };

    let direction = match album.display_order {
        AlbumOrder::Asc => "ASC",
        AlbumOrder::Desc => "DESC",
    };
    let assets = {
        let sql = format!(
            "SELECT {} FROM assets a \
             JOIN album_assets aa ON aa.asset_id = a.id \
             WHERE aa.album_id = ?1 \
             ORDER BY COALESCE(a.taken_at, a.created_at) {}, a.id",
            prefix_columns(ASSET_COLUMNS, "a"),
            direction
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![album_id], Asset::from_row)?
            .collect::<Result<Vec<Asset>, _>>()?;
        rows
    };

    Ok(AlbumResponse::project(album, owner, shared_users, assets))
}

fn load_user(conn: &Connection, user_id: &str) -> AppResult<User> {
    conn.query_row(
        "SELECT id, username, display_name, created_at FROM users WHERE id = ?1",
        params![user_id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                display_name: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => AppError::Database(other),
    })
}

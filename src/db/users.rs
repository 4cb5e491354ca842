use rusqlite::params;

use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Insert a user. Usernames are unique; a duplicate surfaces as Conflict.
pub fn create_user(pool: &DbPool, username: &str, display_name: Option<&str>) -> AppResult<User> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO users (id, username, display_name) VALUES (?1, ?2, ?3)",
        params![id, username, display_name],
    )
    .map_err(AppError::from_sqlite)?;
    drop(conn);

    get_user(pool, &id)
}

pub fn get_user(pool: &DbPool, user_id: &str) -> AppResult<User> {
    let conn = pool.get()?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_pool() -> DbPool {
        let pool = db::create_memory_pool().unwrap();
        db::run_migrations(&pool).unwrap();
        pool
    }

    #[test]
    fn create_and_fetch_user() {
        let pool = test_pool();
        let user = create_user(&pool, "alice", Some("Alice")).unwrap();
        let fetched = get_user(&pool, &user.id).unwrap();
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let pool = test_pool();
        create_user(&pool, "alice", None).unwrap();
        let err = create_user(&pool, "alice", None).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let pool = test_pool();
        let err = get_user(&pool, "nope").unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}

//! Shared-album scenarios: the capability matrix for owners, shared users
//! and strangers, and the transactional guarantees around album creation.

use chrono::TimeZone;
use fototeca::albums::{AlbumStore, AlbumUpdate, CreateAlbum, SqliteAlbumStore};
use fototeca::assets::{AssetStore, NewAsset, SqliteAssetStore};
use fototeca::db;
use fototeca::db::models::AssetType;
use fototeca::error::AppError;
use fototeca::state::DbPool;
use tempfile::TempDir;

struct Env {
    _tmp: TempDir,
    pool: DbPool,
    albums: SqliteAlbumStore,
    assets: SqliteAssetStore,
    u1: String,
    u2: String,
    u3: String,
}

fn setup() -> Env {
    let tmp = TempDir::new().unwrap();
    let pool = db::create_pool(&tmp.path().join("test.db")).unwrap();
    db::run_migrations(&pool).unwrap();
    let u1 = db::users::create_user(&pool, "u1", None).unwrap().id;
    let u2 = db::users::create_user(&pool, "u2", None).unwrap().id;
    let u3 = db::users::create_user(&pool, "u3", None).unwrap().id;
    Env {
        albums: SqliteAlbumStore::new(pool.clone()),
        assets: SqliteAssetStore::new(pool.clone()),
        _tmp: tmp,
        pool,
        u1,
        u2,
        u3,
    }
}

async fn upload_taken_at(
    env: &Env,
    owner: &str,
    name: &str,
    taken_at: chrono::DateTime<chrono::Utc>,
) -> String {
    let new = NewAsset {
        device_asset_id: name.to_string(),
        device_id: "pixel-7".to_string(),
        asset_type: AssetType::Image,
        original_path: format!("/upload/{}.jpg", name),
        resize_path: None,
        web_path: None,
        description: None,
        is_favorite: None,
        is_archived: None,
        is_visible: None,
        taken_at: Some(taken_at),
        duration: None,
        library_id: None,
        stack_parent_id: None,
    };
    env.assets.create(owner, &new).await.unwrap().id
}

#[tokio::test]
async fn shared_trip_album_scenario() {
    let env = setup();

    let a1 = upload_taken_at(
        &env,
        &env.u1,
        "A1",
        chrono::Utc.with_ymd_and_hms(2022, 7, 1, 10, 0, 0).unwrap(),
    )
    .await;
    let a2 = upload_taken_at(
        &env,
        &env.u1,
        "A2",
        chrono::Utc.with_ymd_and_hms(2022, 7, 4, 20, 30, 0).unwrap(),
    )
    .await;

    let album = env
        .albums
        .create(
            &env.u1,
            &CreateAlbum {
                name: "Trip".to_string(),
                description: None,
                asset_ids: vec![a1.clone(), a2.clone()],
                shared_user_ids: vec![env.u2.clone()],
            },
        )
        .await
        .unwrap();

    // U2 sees the album with derived fields spanning A1/A2 capture times
    let seen = env.albums.get(&album.id, &env.u2).await.unwrap();
    assert!(seen.shared);
    assert_eq!(seen.asset_count, 2);
    assert_eq!(seen.start_date.as_deref(), Some("2022-07-01 10:00:00"));
    assert_eq!(seen.end_date.as_deref(), Some("2022-07-04 20:30:00"));
    assert!(seen.thumbnail_asset_id.is_some());

    // shared user can contribute
    let a3 = upload_taken_at(
        &env,
        &env.u2,
        "A3",
        chrono::Utc.with_ymd_and_hms(2022, 7, 2, 12, 0, 0).unwrap(),
    )
    .await;
    let refreshed = env
        .albums
        .add_assets(&album.id, &env.u2, &[a3])
        .await
        .unwrap();
    assert_eq!(refreshed.asset_count, 3);

    // but cannot mutate or delete the album itself
    let err = env
        .albums
        .update(
            &album.id,
            &env.u2,
            &AlbumUpdate {
                name: Some("Mine now".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = env.albums.delete(&album.id, &env.u2).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // an unrelated user cannot even observe it
    let err = env.albums.get(&album.id, &env.u3).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn album_creation_is_atomic() {
    let env = setup();
    let a1 = upload_taken_at(
        &env,
        &env.u1,
        "A1",
        chrono::Utc.with_ymd_and_hms(2022, 7, 1, 10, 0, 0).unwrap(),
    )
    .await;

    let err = env
        .albums
        .create(
            &env.u1,
            &CreateAlbum {
                name: "Broken".to_string(),
                description: None,
                asset_ids: vec![a1, "not-a-real-asset".to_string()],
                shared_user_ids: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    // nothing was written: no album, no join rows
    let conn = env.pool.get().unwrap();
    let albums: i64 = conn
        .query_row("SELECT COUNT(*) FROM albums", [], |row| row.get(0))
        .unwrap();
    let members: i64 = conn
        .query_row("SELECT COUNT(*) FROM album_assets", [], |row| row.get(0))
        .unwrap();
    assert_eq!((albums, members), (0, 0));
}

#[tokio::test]
async fn overlapping_adds_never_double_count() {
    let env = setup();
    let a1 = upload_taken_at(
        &env,
        &env.u1,
        "A1",
        chrono::Utc.with_ymd_and_hms(2022, 7, 1, 10, 0, 0).unwrap(),
    )
    .await;
    let a2 = upload_taken_at(
        &env,
        &env.u1,
        "A2",
        chrono::Utc.with_ymd_and_hms(2022, 7, 2, 10, 0, 0).unwrap(),
    )
    .await;

    let album = env
        .albums
        .create(
            &env.u1,
            &CreateAlbum {
                name: "Trip".to_string(),
                description: None,
                asset_ids: vec![],
                shared_user_ids: vec![],
            },
        )
        .await
        .unwrap();

    env.albums
        .add_assets(&album.id, &env.u1, &[a1.clone(), a2.clone()])
        .await
        .unwrap();
    let after = env
        .albums
        .add_assets(&album.id, &env.u1, &[a1, a2])
        .await
        .unwrap();
    assert_eq!(after.asset_count, 2);
}

#[tokio::test]
async fn hard_deleting_an_asset_removes_it_from_albums() {
    let env = setup();
    let a1 = upload_taken_at(
        &env,
        &env.u1,
        "A1",
        chrono::Utc.with_ymd_and_hms(2022, 7, 1, 10, 0, 0).unwrap(),
    )
    .await;

    let album = env
        .albums
        .create(
            &env.u1,
            &CreateAlbum {
                name: "Trip".to_string(),
                description: None,
                asset_ids: vec![a1.clone()],
                shared_user_ids: vec![],
            },
        )
        .await
        .unwrap();
    assert_eq!(album.asset_count, 1);

    env.assets.delete(&a1, &env.u1).await.unwrap();

    let after = env.albums.get(&album.id, &env.u1).await.unwrap();
    assert_eq!(after.asset_count, 0);
    assert!(after.thumbnail_asset_id.is_none());
}

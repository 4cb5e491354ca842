use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::albums::AlbumStore;
use crate::assets::AssetStore;
use crate::config::Config;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub assets: Arc<dyn AssetStore>,
    pub albums: Arc<dyn AlbumStore>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let assets = Arc::new(crate::assets::SqliteAssetStore::new(db.clone()));
        let albums = Arc::new(crate::albums::SqliteAlbumStore::new(db.clone()));
        Self {
            db,
            config,
            assets,
            albums,
        }
    }
}

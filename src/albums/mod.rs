pub mod response;
pub mod store;
pub mod types;

pub use response::AlbumResponse;
pub use store::{AlbumStore, SqliteAlbumStore};
pub use types::{AlbumUpdate, CreateAlbum};

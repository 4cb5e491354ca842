pub mod albums;
pub mod assets;

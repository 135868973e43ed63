#![forbid(unsafe_code)]

pub mod catalog;
pub mod json;
pub mod repository;
pub mod sqlite;

pub use catalog::{Catalog, CatalogError};
pub use repository::{ContentProvider, Storage, StorageError};

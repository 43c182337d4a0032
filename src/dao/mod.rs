/// Catalog and leaderboard storage backends.
pub mod catalog_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;

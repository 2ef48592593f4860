pub mod api;
pub mod blockchain;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod service;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::route::create_router;
pub use blockchain::sync::{SyncEngine, SyncError, SyncReport};
pub use db::connection;
pub use db::SqliteStore;
pub use models::Transaction;
pub use validation::{parse_address_list, validate_address};

pub mod client;
pub mod models;
pub mod notifier;
pub mod polling;
pub mod processor;
pub mod resolver;
pub mod sync;

// Re-exports for convenience
pub use client::{ExplorerClient, LedgerClient};
pub use notifier::{BackendNotifier, BackendTarget, HttpBackend};
pub use polling::start_sync_loop;
pub use resolver::TransactionResolver;
pub use sync::SyncEngine;

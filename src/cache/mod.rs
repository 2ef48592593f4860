pub mod transaction;

use crate::config::Config;

pub use transaction::TransactionCacheManager;

pub fn init_cache(config: &Config) -> TransactionCacheManager {
    TransactionCacheManager::new(config.cache_max_capacity, config.cache_ttl)
}

use crate::blockchain::notifier::RetryPolicy;
use crate::blockchain::{BackendNotifier, BackendTarget, LedgerClient, SyncEngine, TransactionResolver};
use crate::cache;
use crate::config::Config;
use crate::db::SqliteStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub ledger: Arc<dyn LedgerClient>,
    pub resolver: Arc<TransactionResolver>,
    pub sync: Arc<SyncEngine>,
}

impl AppState {
    /// Wires the resolver, notifier and sync engine over one store and ledger client.
    pub fn new(
        config: Config,
        store: Arc<SqliteStore>,
        ledger: Arc<dyn LedgerClient>,
        backend: Arc<dyn BackendTarget>,
    ) -> Self {
        let resolver = Arc::new(TransactionResolver::new(
            ledger.clone(),
            store.clone(),
            cache::init_cache(&config),
            config.fetch_concurrency,
        ));

        let notifier = BackendNotifier::new(backend, store.clone(), RetryPolicy::from_config(&config));

        let sync = Arc::new(SyncEngine::new(
            ledger.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            resolver.clone(),
            notifier,
        ));

        Self {
            config,
            store,
            ledger,
            resolver,
            sync,
        }
    }
}

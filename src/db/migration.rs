use sqlx::SqlitePool;
use tracing::info;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tracked_addresses (
        address TEXT PRIMARY KEY,
        added_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    )",
    // Journal of hashes already scanned by a sync pass
    "CREATE TABLE IF NOT EXISTS processed_tx_updates (
        hash TEXT PRIMARY KEY,
        journaled_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    )",
    "CREATE TABLE IF NOT EXISTS transactions (
        hash TEXT PRIMARY KEY,
        date INTEGER NOT NULL,
        processed BOOLEAN NOT NULL DEFAULT 1
    )",
    "CREATE TABLE IF NOT EXISTS senders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        transaction_hash TEXT NOT NULL,
        position INTEGER NOT NULL,
        address TEXT NOT NULL,
        amount REAL NOT NULL,
        FOREIGN KEY (transaction_hash) REFERENCES transactions(hash) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS recipients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        transaction_hash TEXT NOT NULL,
        position INTEGER NOT NULL,
        address TEXT NOT NULL,
        amount REAL NOT NULL,
        FOREIGN KEY (transaction_hash) REFERENCES transactions(hash) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS idx_transactions_processed ON transactions(processed)",
    "CREATE INDEX IF NOT EXISTS idx_senders_hash ON senders(transaction_hash)",
    "CREATE INDEX IF NOT EXISTS idx_recipients_hash ON recipients(transaction_hash)",
];

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}

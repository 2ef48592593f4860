use chrono::Utc;
use sqlx::{Pool, Sqlite};

pub async fn is_journaled(pool: &Pool<Sqlite>, hash: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT hash FROM processed_tx_updates WHERE hash = ?")
        .bind(hash)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Records `hashes` as scanned. Hashes already present keep their original timestamp.
pub async fn journal_hashes(pool: &Pool<Sqlite>, hashes: &[String]) -> Result<(), sqlx::Error> {
    if hashes.is_empty() {
        return Ok(());
    }

    let now = Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    for hash in hashes {
        sqlx::query(
            "INSERT INTO processed_tx_updates (hash, journaled_at) VALUES (?, ?)
             ON CONFLICT(hash) DO NOTHING",
        )
        .bind(hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
pub async fn count_journaled(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM processed_tx_updates")
        .fetch_one(pool)
        .await
}

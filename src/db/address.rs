use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

pub async fn add_address(pool: &Pool<Sqlite>, address: &str) -> Result<bool, sqlx::Error> {
    let now = Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO tracked_addresses (address, added_at) VALUES (?, ?)
         ON CONFLICT(address) DO NOTHING",
    )
    .bind(address)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn replace_addresses(pool: &Pool<Sqlite>, addresses: &[String]) -> Result<usize, sqlx::Error> {
    let now = Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM tracked_addresses")
        .execute(&mut *tx)
        .await?;

    let mut stored = 0;
    for address in addresses {
        let result = sqlx::query(
            "INSERT INTO tracked_addresses (address, added_at) VALUES (?, ?)
             ON CONFLICT(address) DO NOTHING",
        )
        .bind(address)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        stored += result.rows_affected() as usize;
    }

    tx.commit().await?;

    Ok(stored)
}

pub async fn is_address_tracked(pool: &Pool<Sqlite>, address: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("SELECT address FROM tracked_addresses WHERE address = ?")
        .bind(address)
        .fetch_optional(pool)
        .await?;

    Ok(result.is_some())
}

pub async fn get_all_tracked_addresses(pool: &Pool<Sqlite>) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query("SELECT address FROM tracked_addresses ORDER BY added_at, address")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(|row| row.get("address")).collect())
}

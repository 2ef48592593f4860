use crate::models::{Participant, Transaction};
use sqlx::{Pool, Row, Sqlite, SqliteConnection};

#[derive(Clone, Copy)]
enum Side {
    Senders,
    Recipients,
}

impl Side {
    fn table(self) -> &'static str {
        match self {
            Side::Senders => "senders",
            Side::Recipients => "recipients",
        }
    }
}

pub async fn save_transactions(pool: &Pool<Sqlite>, transactions: &[Transaction]) -> Result<(), sqlx::Error> {
    if transactions.is_empty() {
        return Ok(());
    }

    // Start a transaction for batch upsert
    let mut tx = pool.begin().await?;

    for transaction in transactions {
        let inserted = sqlx::query(
            r#"
            INSERT INTO transactions (hash, date, processed)
            VALUES (?, ?, ?)
            ON CONFLICT(hash) DO NOTHING
            "#,
        )
        .bind(&transaction.hash)
        .bind(transaction.timestamp)
        .bind(transaction.processed)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            insert_participants(&mut *tx, Side::Senders, &transaction.hash, &transaction.senders).await?;
            insert_participants(&mut *tx, Side::Recipients, &transaction.hash, &transaction.recipients).await?;
        } else {
            // Detail is immutable once stored; only the delivery flag moves
            sqlx::query("UPDATE transactions SET processed = ? WHERE hash = ?")
                .bind(transaction.processed)
                .bind(&transaction.hash)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    Ok(())
}

async fn insert_participants(
    conn: &mut SqliteConnection,
    side: Side,
    hash: &str,
    participants: &[Participant],
) -> Result<(), sqlx::Error> {
    let statement = format!(
        "INSERT INTO {} (transaction_hash, position, address, amount) VALUES (?, ?, ?, ?)",
        side.table()
    );

    for (position, participant) in participants.iter().enumerate() {
        sqlx::query(&statement)
            .bind(hash)
            .bind(position as i64)
            .bind(&participant.address)
            .bind(participant.amount)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

async fn load_participants(
    pool: &Pool<Sqlite>,
    side: Side,
    hash: &str,
) -> Result<Vec<Participant>, sqlx::Error> {
    let statement = format!(
        "SELECT address, amount FROM {} WHERE transaction_hash = ? ORDER BY position ASC",
        side.table()
    );

    let rows = sqlx::query(&statement).bind(hash).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| Participant {
            address: row.get("address"),
            amount: row.get("amount"),
        })
        .collect())
}

async fn hydrate(pool: &Pool<Sqlite>, hash: String, timestamp: i64, processed: bool) -> Result<Transaction, sqlx::Error> {
    let senders = load_participants(pool, Side::Senders, &hash).await?;
    let recipients = load_participants(pool, Side::Recipients, &hash).await?;

    Ok(Transaction {
        hash,
        timestamp,
        recipients,
        senders,
        processed,
    })
}

pub async fn find_transaction(pool: &Pool<Sqlite>, hash: &str) -> Result<Option<Transaction>, sqlx::Error> {
    let row = sqlx::query("SELECT hash, date, processed FROM transactions WHERE hash = ?")
        .bind(hash)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let transaction = hydrate(pool, row.get("hash"), row.get("date"), row.get("processed")).await?;
            Ok(Some(transaction))
        }
        None => Ok(None),
    }
}

pub async fn find_by_processed(pool: &Pool<Sqlite>, processed: bool) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT hash, date, processed FROM transactions WHERE processed = ? ORDER BY date ASC, hash ASC",
    )
    .bind(processed)
    .fetch_all(pool)
    .await?;

    let mut transactions = Vec::with_capacity(rows.len());
    for row in rows {
        transactions.push(hydrate(pool, row.get("hash"), row.get("date"), row.get("processed")).await?);
    }

    Ok(transactions)
}

#[cfg(test)]
pub async fn count_transactions(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await
}

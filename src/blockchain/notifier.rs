use crate::config::Config;
use crate::db::TransactionRepository;
use crate::models::Transaction;
use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug, Clone)]
pub enum DeliveryError {
    #[error("Backend rejected update: status = {status}, body = {body}")]
    Rejected { status: u16, body: String },

    #[error("Backend unreachable: {0}")]
    Transport(String),
}

/// Downstream endpoint receiving transaction batches.
#[async_trait]
pub trait BackendTarget: Send + Sync {
    async fn send(&self, batch: &[Transaction]) -> Result<(), DeliveryError>;
}

pub struct HttpBackend {
    http_client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(config.request_timeout).build()?;
        let endpoint = format!(
            "{}/transaction/block_info",
            config.backend_api_url.trim_end_matches('/')
        );

        Ok(Self { http_client, endpoint })
    }
}

#[async_trait]
impl BackendTarget for HttpBackend {
    async fn send(&self, batch: &[Transaction]) -> Result<(), DeliveryError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(batch)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.forward_max_attempts.max(1),
            delay: config.forward_retry_delay,
        }
    }

    /// Retries after the first attempt. Zero attempts is treated as one.
    pub fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }
}

#[derive(Debug, Clone)]
pub enum ForwardOutcome {
    Delivered { count: usize, attempts: usize },
    Failed { count: usize, error: DeliveryError },
}

impl ForwardOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ForwardOutcome::Delivered { .. })
    }
}

/// Pushes batches to the backend and records the delivery result on every transaction.
pub struct BackendNotifier {
    target: Arc<dyn BackendTarget>,
    transactions: Arc<dyn TransactionRepository>,
    policy: RetryPolicy,
}

impl BackendNotifier {
    pub fn new(
        target: Arc<dyn BackendTarget>,
        transactions: Arc<dyn TransactionRepository>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            target,
            transactions,
            policy,
        }
    }

    /// Delivers `batch` all-or-nothing. The `processed` flag of every transaction is
    /// persisted before returning; only a storage failure is reported as `Err`.
    pub async fn forward(&self, mut batch: Vec<Transaction>) -> Result<ForwardOutcome, sqlx::Error> {
        let count = batch.len();
        let attempts = AtomicUsize::new(0);
        let backoff = ConstantBuilder::default()
            .with_delay(self.policy.delay)
            .with_max_times(self.policy.retries());

        info!("Attempting to update backend with {} transactions", count);

        let target = &self.target;
        let pending = &batch;
        let attempted = &attempts;
        let result = (move || async move {
            attempted.fetch_add(1, Ordering::SeqCst);
            target.send(pending).await
        })
        .retry(backoff)
        .sleep(tokio::time::sleep)
        .notify(|err: &DeliveryError, delay: Duration| {
            warn!(
                "Backend update attempt {} failed: {}. Retrying in {:?}",
                attempts.load(Ordering::SeqCst),
                err,
                delay
            );
        })
        .await;

        match result {
            Ok(()) => {
                info!("Transaction update has been successful");
                batch.iter_mut().for_each(|tx| tx.processed = true);
                self.transactions.save_transactions(&batch).await?;
                info!("Saved updated transactions to local data store, size: {}", count);
                Ok(ForwardOutcome::Delivered {
                    count,
                    attempts: attempts.load(Ordering::SeqCst),
                })
            }
            Err(e) => {
                error!("Backend tx update failed: {}", e);
                batch.iter_mut().for_each(|tx| tx.processed = false);
                self.transactions.save_transactions(&batch).await?;
                info!("Saved failed transactions to local data store, size: {}", count);
                Ok(ForwardOutcome::Failed { count, error: e })
            }
        }
    }
}

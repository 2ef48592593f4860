use crate::blockchain::models::{AddressSummary, RecentTx, TxDetail};
use crate::config::Config;
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Explorer returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode explorer response: {0}")]
    Decode(String),

    #[error("Explorer returned no data for {0}")]
    NoData(String),
}

/// Read-only view of the external ledger explorer.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The explorer's bounded window of most recent transactions.
    async fn list_recent_transactions(&self) -> Result<Vec<RecentTx>, ClientError>;

    async fn get_transaction_detail(&self, hash: &str) -> Result<TxDetail, ClientError>;

    async fn get_balance(&self, address: &str) -> Result<f64, ClientError>;

    /// Per-address totals plus up to `tx_limit` of their transactions.
    async fn get_address_summary(
        &self,
        addresses: &[String],
        tx_limit: usize,
    ) -> Result<AddressSummary, ClientError>;
}

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Chainz-style explorer over HTTP.
#[derive(Clone)]
pub struct ExplorerClient {
    http_client: Client,
    base_url: String,
    coin: String,
    api_key: String,
    limiter: Option<Arc<Limiter>>,
}

impl ExplorerClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http_client = Client::builder().timeout(config.request_timeout).build()?;

        let limiter = config
            .explorer_rate_limit
            .and_then(NonZeroU32::new)
            .map(|per_second| Arc::new(RateLimiter::direct(Quota::per_second(per_second))));

        info!(
            "Initializing explorer client with endpoint: {}, coin: {}, rate limit: {:?}",
            config.explorer_api_url, config.explorer_coin, config.explorer_rate_limit
        );

        Ok(Self {
            http_client,
            base_url: config.explorer_api_url.trim_end_matches('/').to_string(),
            coin: config.explorer_coin.clone(),
            api_key: config.explorer_api_key.clone(),
            limiter,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/{}/api.dws", self.base_url, self.coin)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, ClientError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        debug!("GET {} ({})", url, what);
        let response = self.http_client.get(url).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() || body.trim() == "null" {
            return Err(ClientError::NoData(what.to_string()));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl LedgerClient for ExplorerClient {
    async fn list_recent_transactions(&self) -> Result<Vec<RecentTx>, ClientError> {
        let query = [("q", "lasttxs".to_string()), ("key", self.api_key.clone())];
        self.get_json(&self.api_url(), &query, "lasttxs").await
    }

    async fn get_transaction_detail(&self, hash: &str) -> Result<TxDetail, ClientError> {
        let url = format!("{}/explorer/tx.data.dws", self.base_url);
        let query = [
            ("coin", self.coin.clone()),
            ("id", hash.to_string()),
            ("fmt.js", "true".to_string()),
        ];
        self.get_json(&url, &query, hash).await
    }

    async fn get_balance(&self, address: &str) -> Result<f64, ClientError> {
        let query = [
            ("q", "getbalance".to_string()),
            ("a", address.to_string()),
            ("key", self.api_key.clone()),
        ];
        self.get_json(&self.api_url(), &query, address).await
    }

    async fn get_address_summary(
        &self,
        addresses: &[String],
        tx_limit: usize,
    ) -> Result<AddressSummary, ClientError> {
        let query = [
            ("q", "multiaddr".to_string()),
            ("active", addresses.join("|")),
            ("n", tx_limit.to_string()),
            ("key", self.api_key.clone()),
        ];
        self.get_json(&self.api_url(), &query, "multiaddr").await
    }
}

// Configuration for:
// - explorer API endpoint, coin and key
// - downstream backend endpoint
// - database connection string
// - server listening address/port
// - sync interval and forward retry policy
// - cache settings (size, TTL)

use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub explorer_api_url: String,
    pub explorer_api_key: String,
    pub explorer_coin: String,
    pub explorer_rate_limit: Option<u32>,
    pub backend_api_url: String,
    pub request_timeout: Duration,
    pub sync_interval: Duration,
    pub sync_initial_delay: Duration,
    pub forward_max_attempts: usize,
    pub forward_retry_delay: Duration,
    pub fetch_concurrency: usize,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn secs_or(name: &str, default: u64) -> Duration {
    Duration::from_secs(parse_or(name, default))
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let default_concurrency = num_cpus::get().max(4);

        Self {
            database_url: var_or("DATABASE_URL", "sqlite:relay.db"),
            server_host: var_or("SERVER_HOST", "127.0.0.1"),
            server_port: parse_or("SERVER_PORT", 8080),
            explorer_api_url: var_or("EXPLORER_API_URL", "https://chainz.cryptoid.info"),
            explorer_api_key: var_or("EXPLORER_API_KEY", ""),
            explorer_coin: var_or("EXPLORER_COIN", "slr"),
            explorer_rate_limit: env::var("EXPLORER_RATE_LIMIT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|limit: &u32| *limit > 0),
            backend_api_url: var_or("BACKEND_API_URL", "http://127.0.0.1:9000"),
            request_timeout: secs_or("REQUEST_TIMEOUT_SECS", 30),
            sync_interval: secs_or("SYNC_INTERVAL_SECS", 60),
            sync_initial_delay: secs_or("SYNC_INITIAL_DELAY_SECS", 60),
            forward_max_attempts: parse_or("FORWARD_MAX_ATTEMPTS", 3usize).max(1),
            forward_retry_delay: secs_or("FORWARD_RETRY_DELAY_SECS", 20),
            fetch_concurrency: parse_or("FETCH_CONCURRENCY", default_concurrency).max(1),
            cache_ttl: secs_or("CACHE_TTL", 300),
            cache_max_capacity: parse_or("CACHE_MAX_CAPACITY", 10_000),
        }
    }
}

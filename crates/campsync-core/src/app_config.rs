use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub shortimize_base_url: String,
    pub shortimize_request_timeout_secs: u64,
    pub shortimize_page_limit: u32,
    pub shortimize_max_retries: u32,
    pub shortimize_retry_backoff_base_ms: u64,
    pub user_agent: String,
    /// Base URL of the hosted collaborator functions (clawback, direct message).
    pub functions_base_url: Option<String>,
    pub functions_service_key: Option<String>,
    pub sync_cron: String,
    /// Campaigns synced more recently than this are skipped unless forced.
    /// `0` disables the check.
    pub sync_min_interval_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("shortimize_base_url", &self.shortimize_base_url)
            .field(
                "shortimize_request_timeout_secs",
                &self.shortimize_request_timeout_secs,
            )
            .field("shortimize_page_limit", &self.shortimize_page_limit)
            .field("shortimize_max_retries", &self.shortimize_max_retries)
            .field(
                "shortimize_retry_backoff_base_ms",
                &self.shortimize_retry_backoff_base_ms,
            )
            .field("user_agent", &self.user_agent)
            .field("functions_base_url", &self.functions_base_url)
            .field(
                "functions_service_key",
                &self.functions_service_key.as_ref().map(|_| "[redacted]"),
            )
            .field("sync_cron", &self.sync_cron)
            .field("sync_min_interval_secs", &self.sync_min_interval_secs)
            .finish()
    }
}

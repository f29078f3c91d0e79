use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CAMPSYNC_ENV", "development"))?;

    let bind_addr = parse("CAMPSYNC_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CAMPSYNC_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("CAMPSYNC_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CAMPSYNC_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CAMPSYNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let shortimize_base_url = or_default("SHORTIMIZE_BASE_URL", "https://api.shortimize.com")
        .trim_end_matches('/')
        .to_string();
    let shortimize_request_timeout_secs = parse_u64("SHORTIMIZE_REQUEST_TIMEOUT_SECS", "60")?;
    let shortimize_page_limit = parse_u32("SHORTIMIZE_PAGE_LIMIT", "5000")?;
    if shortimize_page_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHORTIMIZE_PAGE_LIMIT".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let shortimize_max_retries = parse_u32("SHORTIMIZE_MAX_RETRIES", "3")?;
    let shortimize_retry_backoff_base_ms = parse_u64("SHORTIMIZE_RETRY_BACKOFF_BASE_MS", "1000")?;
    let user_agent = or_default("CAMPSYNC_USER_AGENT", "campsync/0.1 (campaign-video-sync)");

    let functions_base_url =
        optional("CAMPSYNC_FUNCTIONS_BASE_URL").map(|u| u.trim_end_matches('/').to_string());
    let functions_service_key = optional("CAMPSYNC_FUNCTIONS_SERVICE_KEY");

    let sync_cron = or_default("CAMPSYNC_SYNC_CRON", "0 0 * * * *");
    let sync_min_interval_secs = parse_u64("CAMPSYNC_SYNC_MIN_INTERVAL_SECS", "0")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        shortimize_base_url,
        shortimize_request_timeout_secs,
        shortimize_page_limit,
        shortimize_max_retries,
        shortimize_retry_backoff_base_ms,
        user_agent,
        functions_base_url,
        functions_service_key,
        sync_cron,
        sync_min_interval_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CAMPSYNC_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Offline tests for campsync-db pool configuration and row types.
//! These tests do not require a live database connection.

use campsync_core::{AppConfig, ClawbackStatus, Environment, LinkedAccount};
use campsync_db::{LinkedAccountRow, PayoutItemRow, PoolConfig, SyncRunRow};
use rust_decimal::Decimal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        shortimize_base_url: "https://api.shortimize.com".to_string(),
        shortimize_request_timeout_secs: 60,
        shortimize_page_limit: 5000,
        shortimize_max_retries: 3,
        shortimize_retry_backoff_base_ms: 1000,
        user_agent: "ua".to_string(),
        functions_base_url: None,
        functions_service_key: None,
        sync_cron: "0 0 * * * *".to_string(),
        sync_min_interval_secs: 0,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn sync_run_row_starts_with_zero_counters() {
    let row = SyncRunRow {
        id: 1,
        public_id: Uuid::new_v4(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        brand_id: None,
        campaign_id: None,
        started_at: None,
        completed_at: None,
        brands_processed: 0,
        videos_matched: 0,
        videos_unmatched: 0,
        error_message: None,
        created_at: chrono::Utc::now(),
    };

    assert_eq!(row.status, "queued");
    assert_eq!(row.videos_matched + row.videos_unmatched, 0);
    assert!(row.started_at.is_none());
}

#[test]
fn linked_account_row_converts_to_core_type() {
    let id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let account: LinkedAccount = LinkedAccountRow {
        id,
        user_id,
        platform: "tiktok".to_string(),
        username: "Acme".to_string(),
    }
    .into();

    assert_eq!(account.id, id);
    assert_eq!(account.user_id, user_id);
    assert_eq!(account.username, "Acme");
}

#[test]
fn payout_item_row_reports_flag_state() {
    let mut row = PayoutItemRow {
        id: Uuid::new_v4(),
        payout_request_id: Uuid::new_v4(),
        submission_id: Uuid::new_v4(),
        creator_id: Uuid::new_v4(),
        amount: Decimal::new(1250, 2),
        flagged_at: None,
        flagged_by: None,
        flag_reason: None,
        clawback_status: None,
        clawback_reason: None,
        clawed_back_at: None,
        clawed_back_by: None,
    };
    assert!(!row.is_flagged());
    assert_eq!(row.status(), None);

    row.flagged_at = Some(chrono::Utc::now());
    row.clawback_status = Some("pending_review".to_string());
    assert!(row.is_flagged());
    assert_eq!(row.status(), Some(ClawbackStatus::PendingReview));
}

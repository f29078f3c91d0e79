//! End-to-end sync tests: a fresh migrated database per test (`#[sqlx::test]`)
//! and a `wiremock` server standing in for Shortimize.

use campsync_shortimize::ShortimizeClient;
use campsync_sync::{SyncRequest, SyncRunner, SyncSettings, TriggerSource};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn runner(pool: PgPool, server: &MockServer, min_interval: Option<chrono::Duration>) -> SyncRunner {
    let client = ShortimizeClient::new(&server.uri(), 5, "campsync-test/0.1", 0, 0)
        .expect("failed to build test ShortimizeClient");
    SyncRunner::new(
        pool,
        client,
        SyncSettings {
            page_limit: 5000,
            min_interval,
        },
    )
}

async fn insert_brand(pool: &PgPool, name: &str, api_key: &str, collection: Option<&str>) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO brands (name, shortimize_api_key, collection_name) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(api_key)
    .bind(collection)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_brand failed for '{name}': {e}"))
}

async fn insert_campaign(pool: &PgPool, brand_id: Uuid, title: &str, hashtags: &[&str]) -> Uuid {
    let tags: Vec<String> = hashtags.iter().map(|t| (*t).to_string()).collect();
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO campaigns (brand_id, title, status, hashtags) \
         VALUES ($1, $2, 'active', $3) RETURNING id",
    )
    .bind(brand_id)
    .bind(title)
    .bind(&tags)
    .fetch_one(pool)
    .await
    .expect("insert_campaign failed")
}

async fn link_account(pool: &PgPool, campaign_id: Uuid, platform: &str, username: &str) {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO social_accounts (user_id, platform, username) VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(platform)
    .bind(username)
    .fetch_one(pool)
    .await
    .expect("insert social account failed");

    sqlx::query(
        "INSERT INTO social_account_campaigns (social_account_id, campaign_id, status) \
         VALUES ($1, $2, 'active')",
    )
    .bind(id)
    .bind(campaign_id)
    .execute(pool)
    .await
    .expect("insert campaign link failed");
}

fn video_json(id: &str, platform: &str, username: &str, views: i64, caption: &str) -> serde_json::Value {
    json!({
        "ad_id": id,
        "username": username,
        "platform": platform,
        "ad_link": format!("https://{platform}.example.com/{username}/{id}"),
        "latest_views": views,
        "latest_likes": 10,
        "latest_comments": 2,
        "latest_shares": 1,
        "latest_bookmarks": 0,
        "uploaded_at": "2026-10-15T09:00:00Z",
        "title": "Launch day",
        "caption": caption
    })
}

async fn mount_videos(server: &MockServer, api_key: &str, videos: Vec<serde_json::Value>) {
    let total = videos.len();
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(header("authorization", format!("Bearer {api_key}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": videos,
            "pagination": { "total": total }
        })))
        .mount(server)
        .await;
}

async fn count(pool: &PgPool, sql: &str, campaign_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(campaign_id)
        .fetch_one(pool)
        .await
        .expect("count query failed")
}

async fn cache_rows(pool: &PgPool, campaign_id: Uuid) -> i64 {
    count(
        pool,
        "SELECT COUNT(*) FROM cached_campaign_videos WHERE campaign_id = $1",
        campaign_id,
    )
    .await
}

async fn pending_submissions(pool: &PgPool, campaign_id: Uuid) -> i64 {
    count(
        pool,
        "SELECT COUNT(*) FROM video_submissions \
         WHERE source_id = $1 AND source = 'tracked' AND status = 'pending'",
        campaign_id,
    )
    .await
}

async fn snapshots(pool: &PgPool, campaign_id: Uuid) -> i64 {
    count(
        pool,
        "SELECT COUNT(*) FROM program_video_metrics WHERE source_id = $1",
        campaign_id,
    )
    .await
}

// ---------------------------------------------------------------------------
// Full runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn sync_caches_every_video_and_submits_matches(pool: PgPool) {
    let server = MockServer::start().await;
    let brand_id = insert_brand(&pool, "Acme", "sk_acme", Some("promoX")).await;
    let campaign_id = insert_campaign(&pool, brand_id, "Summer Drop", &[]).await;
    link_account(&pool, campaign_id, "tiktok", "acme").await;
    link_account(&pool, campaign_id, "instagram", "@Zed").await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("collections", "promoX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                video_json("v1", "tiktok", "ACME", 1000, "hello"),
                video_json("v2", "tiktok", "stranger", 500, "hello"),
                video_json("v3", "instagram", "zed", 250, "hello"),
            ],
            "pagination": { "total": 3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = runner(pool.clone(), &server, None)
        .run(&SyncRequest::default(), TriggerSource::Cli)
        .await
        .expect("sync should succeed");

    assert!(report.success);
    assert_eq!(report.total_brands_processed, 1);
    assert_eq!(report.total_videos_matched, 2);
    assert_eq!(report.total_videos_unmatched, 1);

    let campaign = &report.results[0].campaigns[0];
    assert_eq!(campaign.videos_found, 3);
    assert_eq!(campaign.accounts_updated, vec!["ACME", "zed"]);
    assert!(campaign.error.is_none());

    assert_eq!(cache_rows(&pool, campaign_id).await, 3);
    assert_eq!(pending_submissions(&pool, campaign_id).await, 2);
    assert_eq!(snapshots(&pool, campaign_id).await, 0, "nothing approved yet");

    let matched = count(
        &pool,
        "SELECT COUNT(*) FROM cached_campaign_videos \
         WHERE campaign_id = $1 AND user_id IS NOT NULL AND matched_at IS NOT NULL",
        campaign_id,
    )
    .await;
    assert_eq!(matched, 2);

    let status = campsync_db::get_campaign_sync_status(&pool, campaign_id)
        .await
        .expect("status query failed")
        .expect("status row should exist");
    assert_eq!(status.sync_status, "completed");
    assert_eq!(status.videos_synced, 3);

    let runs = campsync_db::list_sync_runs(&pool, 10)
        .await
        .expect("list_sync_runs failed");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "succeeded");
    assert_eq!(runs[0].trigger_source, "cli");
    assert_eq!(runs[0].videos_matched, 2);
    assert_eq!(runs[0].videos_unmatched, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn hashtag_filter_drops_untagged_videos(pool: PgPool) {
    let server = MockServer::start().await;
    let brand_id = insert_brand(&pool, "Acme", "sk_acme", Some("promoX")).await;
    let campaign_id = insert_campaign(&pool, brand_id, "Summer Drop", &["#SummerDrop"]).await;
    link_account(&pool, campaign_id, "tiktok", "acme").await;

    mount_videos(&server, "sk_acme", vec![
        video_json("v1", "tiktok", "acme", 100, "out now #summerdrop"),
        video_json("v2", "tiktok", "acme", 100, "unrelated"),
    ])
    .await;

    let report = runner(pool.clone(), &server, None)
        .run(&SyncRequest::default(), TriggerSource::Http)
        .await
        .expect("sync should succeed");

    let campaign = &report.results[0].campaigns[0];
    assert_eq!(campaign.videos_found, 1);
    assert_eq!(campaign.videos_matched, 1);
    assert_eq!(cache_rows(&pool, campaign_id).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn resync_preserves_review_and_snapshots_approved(pool: PgPool) {
    let server = MockServer::start().await;
    let brand_id = insert_brand(&pool, "Acme", "sk_acme", Some("promoX")).await;
    let campaign_id = insert_campaign(&pool, brand_id, "Summer Drop", &[]).await;
    link_account(&pool, campaign_id, "tiktok", "acme").await;

    mount_videos(&server, "sk_acme", vec![video_json("v1", "tiktok", "acme", 100, "")]).await;
    let runner = runner(pool.clone(), &server, None);
    runner
        .run(&SyncRequest::default(), TriggerSource::Scheduler)
        .await
        .expect("first sync should succeed");

    sqlx::query("UPDATE video_submissions SET status = 'approved' WHERE source_id = $1")
        .bind(campaign_id)
        .execute(&pool)
        .await
        .expect("approve failed");

    server.reset().await;
    mount_videos(&server, "sk_acme", vec![video_json("v1", "tiktok", "acme", 900, "")]).await;
    runner
        .run(&SyncRequest::default(), TriggerSource::Scheduler)
        .await
        .expect("second sync should succeed");

    let (status, views): (String, i64) = sqlx::query_as(
        "SELECT status, views FROM video_submissions WHERE source_id = $1",
    )
    .bind(campaign_id)
    .fetch_one(&pool)
    .await
    .expect("submission should exist");
    assert_eq!(status, "approved");
    assert_eq!(views, 900);

    let rows = campsync_db::list_metrics_snapshots(
        &pool,
        campsync_core::SourceType::Campaign,
        campaign_id,
        10,
    )
    .await
    .expect("list snapshots failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_views, 900);
    assert_eq!(rows[0].total_videos, 1);

    let cached = campsync_db::list_cached_videos(&pool, campaign_id)
        .await
        .expect("list cached failed");
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].views, 900);
    assert_eq!(cached[0].week_start_views, Some(100), "baseline carries forward");
}

#[sqlx::test(migrations = "../../migrations")]
async fn repeated_snapshot_appends_identical_totals(pool: PgPool) {
    let server = MockServer::start().await;
    let brand_id = insert_brand(&pool, "Acme", "sk_acme", Some("promoX")).await;
    let campaign_id = insert_campaign(&pool, brand_id, "Summer Drop", &[]).await;
    link_account(&pool, campaign_id, "tiktok", "acme").await;
    link_account(&pool, campaign_id, "instagram", "acme_ig").await;

    mount_videos(
        &server,
        "sk_acme",
        vec![
            video_json("v1", "tiktok", "acme", 100, ""),
            video_json("v2", "instagram", "acme_ig", 250, ""),
        ],
    )
    .await;
    runner(pool.clone(), &server, None)
        .run(&SyncRequest::default(), TriggerSource::Cli)
        .await
        .expect("sync should succeed");

    sqlx::query("UPDATE video_submissions SET status = 'approved' WHERE source_id = $1")
        .bind(campaign_id)
        .execute(&pool)
        .await
        .expect("approve failed");

    let first = campsync_sync::record_campaign_snapshot(&pool, campaign_id, brand_id)
        .await
        .expect("first snapshot failed")
        .expect("approved submissions should produce a snapshot");
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let second = campsync_sync::record_campaign_snapshot(&pool, campaign_id, brand_id)
        .await
        .expect("second snapshot failed")
        .expect("approved submissions should produce a snapshot");

    let rows = campsync_db::list_metrics_snapshots(
        &pool,
        campsync_core::SourceType::Campaign,
        campaign_id,
        10,
    )
    .await
    .expect("list snapshots failed");
    assert_eq!(rows.len(), 2, "each call appends a row");
    assert_ne!(first.id, second.id);
    assert_ne!(rows[0].recorded_at, rows[1].recorded_at);
    for row in &rows {
        assert_eq!(row.total_views, 350);
        assert_eq!(row.total_likes, 20);
        assert_eq!(row.total_comments, 4);
        assert_eq!(row.total_shares, 2);
        assert_eq!(row.total_bookmarks, 0);
        assert_eq!(row.total_videos, 2);
    }
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn provider_error_is_recorded_and_other_brands_continue(pool: PgPool) {
    let server = MockServer::start().await;
    let bad_brand = insert_brand(&pool, "Acme", "sk_bad", Some("promoX")).await;
    let bad_campaign = insert_campaign(&pool, bad_brand, "Broken", &[]).await;
    let good_brand = insert_brand(&pool, "Zeta", "sk_good", Some("zeta")).await;
    let good_campaign = insert_campaign(&pool, good_brand, "Working", &[]).await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(header("authorization", "Bearer sk_bad"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_videos(&server, "sk_good", vec![video_json("v9", "tiktok", "nobody", 10, "")]).await;

    let report = runner(pool.clone(), &server, None)
        .run(&SyncRequest::default(), TriggerSource::Http)
        .await
        .expect("run should succeed despite one campaign failing");

    assert_eq!(report.total_brands_processed, 2);
    let broken = &report.results[0].campaigns[0];
    assert_eq!(broken.error.as_deref(), Some("Shortimize API error: 401"));
    assert_eq!(broken.videos_found, 0);

    let working = &report.results[1].campaigns[0];
    assert!(working.error.is_none());
    assert_eq!(working.videos_unmatched, 1);
    assert_eq!(cache_rows(&pool, good_campaign).await, 1);

    let status = campsync_db::get_campaign_sync_status(&pool, bad_campaign)
        .await
        .expect("status query failed")
        .expect("status row should exist");
    assert_eq!(status.sync_status, "failed");
    assert_eq!(status.error_message.as_deref(), Some("Shortimize API error: 401"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn no_brands_reports_message(pool: PgPool) {
    let server = MockServer::start().await;
    sqlx::query("INSERT INTO brands (name, shortimize_api_key) VALUES ('Keyless', '  ')")
        .execute(&pool)
        .await
        .expect("insert brand failed");

    let report = runner(pool.clone(), &server, None)
        .run(&SyncRequest::default(), TriggerSource::Http)
        .await
        .expect("sync should succeed");

    assert!(report.success);
    assert_eq!(report.message.as_deref(), Some("No brands to sync"));
    assert_eq!(report.total_brands_processed, 0);

    let runs = campsync_db::list_sync_runs(&pool, 10)
        .await
        .expect("list_sync_runs failed");
    assert_eq!(runs[0].status, "succeeded");
}

#[sqlx::test(migrations = "../../migrations")]
async fn campaign_without_scope_is_skipped(pool: PgPool) {
    let server = MockServer::start().await;
    let brand_id = insert_brand(&pool, "Acme", "sk_acme", None).await;
    let campaign_id = insert_campaign(&pool, brand_id, "Unscoped", &[]).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let report = runner(pool.clone(), &server, None)
        .run(&SyncRequest::default(), TriggerSource::Cli)
        .await
        .expect("sync should succeed");

    let campaign = &report.results[0].campaigns[0];
    assert_eq!(campaign.campaign_id, campaign_id);
    assert_eq!(campaign.videos_found, 0);
    assert!(campaign.error.is_none());
}

// ---------------------------------------------------------------------------
// Narrowing and recent-sync skip
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn recent_sync_is_skipped_unless_forced(pool: PgPool) {
    let server = MockServer::start().await;
    let brand_id = insert_brand(&pool, "Acme", "sk_acme", Some("promoX")).await;
    let campaign_id = insert_campaign(&pool, brand_id, "Summer Drop", &[]).await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [video_json("v1", "tiktok", "acme", 10, "")]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let runner = runner(pool.clone(), &server, Some(chrono::Duration::hours(1)));
    let request = SyncRequest {
        campaign_id: Some(campaign_id),
        ..SyncRequest::default()
    };

    runner.run(&request, TriggerSource::Cli).await.expect("first sync");
    let skipped = runner.run(&request, TriggerSource::Cli).await.expect("second sync");
    assert_eq!(skipped.results[0].campaigns[0].videos_found, 0);

    let forced = SyncRequest {
        force_refresh: true,
        ..request
    };
    let report = runner.run(&forced, TriggerSource::Cli).await.expect("forced sync");
    assert_eq!(report.results[0].campaigns[0].videos_found, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn brand_filter_narrows_the_run(pool: PgPool) {
    let server = MockServer::start().await;
    let acme = insert_brand(&pool, "Acme", "sk_acme", Some("promoX")).await;
    insert_campaign(&pool, acme, "Summer Drop", &[]).await;
    let zeta = insert_brand(&pool, "Zeta", "sk_zeta", Some("zeta")).await;
    insert_campaign(&pool, zeta, "Winter", &[]).await;

    mount_videos(&server, "sk_zeta", vec![]).await;

    let report = runner(pool.clone(), &server, None)
        .run(
            &SyncRequest {
                brand_id: Some(zeta),
                ..SyncRequest::default()
            },
            TriggerSource::Http,
        )
        .await
        .expect("sync should succeed");

    assert_eq!(report.total_brands_processed, 1);
    assert_eq!(report.results[0].brand_name, "Zeta");
}

#[sqlx::test(migrations = "../../migrations")]
async fn plan_resolves_scopes_without_fetching(pool: PgPool) {
    let server = MockServer::start().await;
    let brand_id = insert_brand(&pool, "Acme", "sk_acme", Some("promoX")).await;
    insert_campaign(&pool, brand_id, "Summer Drop", &["#drop"]).await;

    let planned = runner(pool.clone(), &server, None)
        .plan(&SyncRequest::default())
        .await
        .expect("plan should succeed");

    assert_eq!(planned.len(), 1);
    let scope = planned[0].scope.as_ref().expect("campaign should be eligible");
    assert_eq!(scope.collection_name(), Some("promoX"));
    assert_eq!(scope.hashtags(), ["#drop".to_string()]);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

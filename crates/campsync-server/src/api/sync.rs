use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campsync_sync::{SyncRequest, TriggerSource};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
struct SyncFailure {
    success: bool,
    error: String,
}

/// Reads the optional narrowing body. Empty or malformed bodies mean a full
/// sync.
fn parse_request(body: &[u8]) -> SyncRequest {
    if body.iter().all(u8::is_ascii_whitespace) {
        return SyncRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unparseable sync request body");
        SyncRequest::default()
    })
}

/// `POST|GET /api/v1/sync`: run one sync invocation and return its report.
///
/// The response is the bare report rather than the `data`/`meta` envelope.
pub(super) async fn trigger_sync(State(state): State<AppState>, body: Bytes) -> Response {
    let request = parse_request(&body);

    match state.runner.run(&request, TriggerSource::Http).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "sync request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SyncFailure {
                    success: false,
                    error: format!("{e:#}"),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{app, send};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn empty_body_is_full_sync() {
        assert_eq!(parse_request(b""), SyncRequest::default());
        assert_eq!(parse_request(b"  \n"), SyncRequest::default());
    }

    #[test]
    fn malformed_body_is_full_sync() {
        assert_eq!(parse_request(b"{not json"), SyncRequest::default());
    }

    #[test]
    fn body_narrows_by_campaign() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"campaignId":"{id}","forceRefresh":true}}"#);
        let request = parse_request(body.as_bytes());
        assert_eq!(request.campaign_id, Some(id));
        assert!(request.force_refresh);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_without_brands_reports_message(pool: sqlx::PgPool) {
        let server = MockServer::start().await;
        let (status, json) = send(
            app(pool, &server),
            Request::builder()
                .method("POST")
                .uri("/api/v1/sync")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], json!(true));
        assert_eq!(json["message"], json!("No brands to sync"));
        assert_eq!(json["totalBrandsProcessed"], json!(0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_returns_camel_case_report(pool: sqlx::PgPool) {
        let server = MockServer::start().await;
        let brand_id: Uuid = sqlx::query_scalar(
            "INSERT INTO brands (name, shortimize_api_key, collection_name) \
             VALUES ('Acme', 'sk', 'promoX') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .expect("insert brand");
        sqlx::query("INSERT INTO campaigns (brand_id, title, status) VALUES ($1, 'Drop', 'active')")
            .bind(brand_id)
            .execute(&pool)
            .await
            .expect("insert campaign");

        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("collections", "promoX"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "ad_id": "v1", "username": "acme", "platform": "tiktok" }]
            })))
            .mount(&server)
            .await;

        let (status, json) = send(
            app(pool, &server),
            Request::builder()
                .method("GET")
                .uri("/api/v1/sync")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalVideosUnmatched"], json!(1));
        assert_eq!(json["results"][0]["brandName"], json!("Acme"));
        assert_eq!(json["results"][0]["campaigns"][0]["videosFound"], json!(1));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn database_failure_is_500_with_error(pool: sqlx::PgPool) {
        let server = MockServer::start().await;
        sqlx::query("DROP TABLE brands CASCADE")
            .execute(&pool)
            .await
            .expect("drop brands");

        let (status, json) = send(
            app(pool, &server),
            Request::builder()
                .method("POST")
                .uri("/api/v1/sync")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], json!(false));
        assert!(json["error"]
            .as_str()
            .is_some_and(|e| e.contains("failed to fetch brands")));
    }
}

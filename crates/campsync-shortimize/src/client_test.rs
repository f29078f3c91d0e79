use super::*;

fn client(base: &str) -> ShortimizeClient {
    ShortimizeClient::new(base, 5, "campsync-test/0.1", 0, 0).expect("client should build")
}

#[test]
fn videos_url_with_collection() {
    let url = client("https://api.shortimize.com").videos_url(Some("promoX"), 5000);
    assert_eq!(
        url.as_str(),
        "https://api.shortimize.com/videos?collections=promoX&limit=5000\
         &has_metrics=true&order_by=latest_updated_at&order_direction=desc"
    );
}

#[test]
fn videos_url_without_collection_omits_parameter() {
    let url = client("https://api.shortimize.com").videos_url(None, 100);
    assert!(!url.as_str().contains("collections="));
    assert!(url.as_str().starts_with("https://api.shortimize.com/videos?limit=100&"));
}

#[test]
fn videos_url_encodes_collection_name() {
    let url = client("https://api.shortimize.com").videos_url(Some("Summer Drop & Co"), 10);
    assert!(url.as_str().contains("collections=Summer+Drop+%26+Co"));
}

#[test]
fn videos_url_keeps_base_path() {
    let url = client("http://127.0.0.1:9999/mock/").videos_url(None, 1);
    assert_eq!(url.path(), "/mock/videos");
}

#[test]
fn new_rejects_unparseable_base_url() {
    let result = ShortimizeClient::new("not a url", 5, "ua", 0, 0);
    assert!(matches!(
        result,
        Err(ShortimizeError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn error_status_reports_http_code() {
    assert_eq!(
        ShortimizeError::RateLimited {
            retry_after_secs: 1
        }
        .status(),
        Some(429)
    );
    assert_eq!(
        ShortimizeError::UnexpectedStatus {
            status: 401,
            url: String::new()
        }
        .status(),
        Some(401)
    );
}

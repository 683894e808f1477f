mod common;

use std::sync::Arc;

use profile_ingestion::{
    infrastructure::{http::ReqwestTransport, identity::RandomUserAgentPool, storage::LocalStore},
    ProfileEndpoint, ProfileFetcher, RawProfileDocument, RetryPolicy, ScrapeError,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> ProfileFetcher {
    ProfileFetcher::new(
        Arc::new(ReqwestTransport::direct().unwrap()),
        Arc::new(RandomUserAgentPool::default()),
        Arc::new(LocalStore::new()),
    )
    .with_endpoint(ProfileEndpoint::new(server.uri()))
}

#[tokio::test]
async fn missing_user_returns_false_and_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ghost/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    assert!(!fetcher(&server).fetch_profile("ghost", dir.path()).await);
    assert!(common::file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn blocked_responses_are_polled_until_real_data_arrives() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nasa/"))
        .and(query_param("__a", "1"))
        .and(query_param("__d", "dis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Please wait a few minutes before you try again.",
            "require_login": true,
            "status": "fail"
        })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    let profile = common::profile_with_images(&["1"], |id| format!("https://cdn.test/{}.jpg", id));
    Mock::given(method("GET"))
        .and(path("/nasa/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile.clone()))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    assert!(fetcher(&server).fetch_profile("nasa", dir.path()).await);

    let stored = RawProfileDocument::from_slice(&std::fs::read(dir.path().join("nasa")).unwrap()).unwrap();
    assert_eq!(stored.as_value(), &profile);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r
        .headers
        .get("user-agent")
        .map(|ua| ua.to_str().unwrap().starts_with("Mozilla/5.0"))
        .unwrap_or(false)));
}

#[tokio::test]
async fn html_error_pages_count_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nasa/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = fetcher(&server)
        .with_retry_policy(RetryPolicy::bounded(3))
        .fetch("nasa", dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::RetriesExhausted { attempts: 3, .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn unreachable_endpoint_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ProfileFetcher::new(
        Arc::new(ReqwestTransport::direct().unwrap()),
        Arc::new(RandomUserAgentPool::default()),
        Arc::new(LocalStore::new()),
    )
    .with_endpoint(ProfileEndpoint::new("http://127.0.0.1:9"));

    let err = fetcher.fetch("nasa", dir.path()).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Transport(_)));
    assert!(common::file_names(dir.path()).is_empty());
}

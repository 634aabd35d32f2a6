mod common;

use common::mock_provider::{MockProvider, MockResponse};
use common::{closed_endpoint, generator, openai_ok, openai_session, GENERATE_PATH};
use rgenimg::{ImageGenError, ProviderConfig, RequestState};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_openai_success_sets_result() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(&openai_ok("https://cdn.example/fox.png")))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());

    let url = session.submit_prompt("a red fox in the snow").await.unwrap();

    assert_eq!(url, "https://cdn.example/fox.png");
    let snapshot = session.snapshot();
    assert_eq!(snapshot.result.as_deref(), Some("https://cdn.example/fox.png"));
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.request, RequestState::Idle);
    assert_eq!(snapshot.prompt, "a red fox in the snow");

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, GENERATE_PATH);
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(
        request.json(),
        json!({"prompt": "a red fox in the snow", "n": 1, "size": "1024x1024"})
    );
}

#[tokio::test]
async fn test_rapidapi_request_shape() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(r#"{"url": "https://cdn.example/tower.jpg"}"#))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let provider = ProviderConfig::rapidapi("rk-test")
        .with_host("text-to-image.p.rapidapi.com")
        .with_endpoint(mock.url("/realistic"));
    let session = generator(provider, dir.path()).session();

    let url = session.submit_prompt("a clock tower").await.unwrap();
    assert_eq!(url, "https://cdn.example/tower.jpg");

    let requests = mock.captured_requests().await;
    let request = &requests[0];
    assert_eq!(request.header("x-rapidapi-key"), Some("rk-test"));
    assert_eq!(
        request.header("x-rapidapi-host"),
        Some("text-to-image.p.rapidapi.com")
    );
    assert_eq!(request.header("authorization"), None);
    assert_eq!(request.json(), json!({"inputs": "a clock tower"}));
}

#[tokio::test]
async fn test_missing_url_field_sets_error() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(r#"{"created": 1, "data": []}"#))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());

    let err = session.submit_prompt("a boat").await.unwrap_err();

    assert!(matches!(err, ImageGenError::MalformedResponse(_)));
    let snapshot = session.snapshot();
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Unexpected API response structure")
    );
    assert_eq!(snapshot.result, None);
}

#[tokio::test]
async fn test_rapidapi_missing_url_message() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(r#"{"status": "queued"}"#)).await;
    let dir = tempfile::tempdir().unwrap();
    let provider = ProviderConfig::rapidapi("rk").with_endpoint(mock.url("/realistic"));
    let session = generator(provider, dir.path()).session();

    let _ = session.submit_prompt("a bridge").await;
    assert_eq!(
        session.error().as_deref(),
        Some("Image URL not found in the API response.")
    );
    assert_eq!(session.result(), None);
}

#[tokio::test]
async fn test_rejected_status_surfaces_provider_message() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json_with_status(
        401,
        r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#,
    ))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());

    let err = session.submit_prompt("a castle").await.unwrap_err();

    assert!(matches!(
        err,
        ImageGenError::RemoteRejected { status: 401, .. }
    ));
    let error = session.error().unwrap();
    assert!(error.contains("Incorrect API key provided"));
    assert!(error.contains("401"));
    assert_eq!(session.result(), None);
}

#[tokio::test]
async fn test_rejected_status_without_message() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json_with_status(503, "Service Unavailable"))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());

    let _ = session.submit_prompt("a castle").await;
    assert_eq!(
        session.error().as_deref(),
        Some("Server error: 503. Unknown error")
    );
}

#[tokio::test]
async fn test_unreachable_provider_sets_connectivity_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ProviderConfig::openai("sk").with_endpoint(closed_endpoint());
    let session = generator(provider, dir.path()).session();

    let err = session.submit_prompt("a meadow").await.unwrap_err();

    assert!(matches!(err, ImageGenError::Network(_)));
    assert_eq!(
        session.error().as_deref(),
        Some("No response received from server. Please check your internet connection.")
    );
    assert!(!session.is_in_flight());
}

#[tokio::test]
async fn test_new_submission_clears_previous_error() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json_with_status(500, r#"{"message": "overloaded"}"#))
        .await;
    mock.enqueue(MockResponse::json(&openai_ok("https://cdn.example/ok.png")))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());

    assert!(session.submit_prompt("first").await.is_err());
    assert!(session.error().unwrap().contains("overloaded"));

    session.submit_prompt("second").await.unwrap();
    assert_eq!(session.error(), None);
    assert_eq!(session.result().as_deref(), Some("https://cdn.example/ok.png"));
}

#[tokio::test]
async fn test_submit_is_blocked_while_in_flight() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(&openai_ok("https://cdn.example/slow.png")).with_delay(300))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());
    session.set_prompt("a slow render");

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit().await })
    };

    for _ in 0..200 {
        if session.is_in_flight() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let snapshot = session.snapshot();
    assert_eq!(snapshot.request, RequestState::InFlight);
    assert!(!snapshot.can_submit());
    assert_eq!(snapshot.submit_label(), "Generating...");

    let second = session.submit().await.unwrap_err();
    assert!(second.is_busy());

    let url = first.await.unwrap().unwrap();
    assert_eq!(url, "https://cdn.example/slow.png");
    assert!(!session.is_in_flight());
    assert_eq!(session.error(), None);
    assert_eq!(mock.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn test_blank_prompt_makes_no_request() {
    let mock = MockProvider::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());

    let err = session.submit_prompt("   ").await.unwrap_err();

    assert!(matches!(err, ImageGenError::Validation(_)));
    assert_eq!(session.snapshot().request, RequestState::Idle);
    assert_eq!(session.error(), None);
    assert!(mock.captured_requests().await.is_empty());
}

#[tokio::test]
async fn test_cancel_resets_in_flight() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(&openai_ok("https://cdn.example/late.png")).with_delay(2_000))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());
    session.set_prompt("a very detailed map");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = session.submit_with_cancel(&cancel).await.unwrap_err();

    assert!(matches!(err, ImageGenError::Cancelled));
    assert!(!session.is_in_flight());
    assert_eq!(session.error().as_deref(), Some("The request was cancelled."));
    assert_eq!(session.result(), None);
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(&openai_ok("https://cdn.example/late.png")).with_delay(2_000))
        .await;
    let client = rgenimg::ImageClient::new(
        reqwest::Client::new(),
        ProviderConfig::openai("sk").with_endpoint(mock.url(GENERATE_PATH)),
        Duration::from_millis(200),
    );

    let err = client.generate("a glacier").await.unwrap_err();
    assert!(matches!(err, ImageGenError::Timeout(_)));
    assert_eq!(err.user_message(), "The request timed out after 200ms.");
}

#[tokio::test]
async fn test_dropped_submission_resets_in_flight() {
    let mock = MockProvider::start().await;
    mock.enqueue(MockResponse::json(&openai_ok("https://cdn.example/x.png")).with_delay(2_000))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session = openai_session(&mock, dir.path());
    session.set_prompt("an abandoned request");

    let outcome = tokio::time::timeout(Duration::from_millis(100), session.submit()).await;

    assert!(outcome.is_err());
    assert!(!session.is_in_flight());
}

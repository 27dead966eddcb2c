use knighttodo_core::{ExperienceClient, ExperienceError, HttpExperienceClient, RetryPolicy};
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The blocking client must not run on the async test executor.
async fn award(
    url: String,
    timeout: Duration,
    retry: RetryPolicy,
    todo_id: Uuid,
) -> Result<u32, ExperienceError> {
    tokio::task::spawn_blocking(move || {
        let client = HttpExperienceClient::new(url, timeout, retry)?;
        client.award(todo_id)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn posts_todo_id_and_returns_award() {
    let server = MockServer::start().await;
    let todo_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/experience"))
        .and(body_json(serde_json::json!({
            "todoId": todo_id.to_string(),
            "userId": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "experience": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = award(
        format!("{}/experience", server.uri()),
        Duration::from_secs(2),
        RetryPolicy::default(),
        todo_id,
    )
    .await;

    assert_eq!(result, Ok(10));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_success_status_is_distinct_and_not_retried_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = award(
        server.uri(),
        Duration::from_secs(2),
        RetryPolicy::default(),
        Uuid::new_v4(),
    )
    .await;

    assert_eq!(result, Err(ExperienceError::Status(503)));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_retried_up_to_policy_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = award(
        server.uri(),
        Duration::from_secs(2),
        RetryPolicy::new(3, Duration::from_millis(1)),
        Uuid::new_v4(),
    )
    .await;

    assert_eq!(result, Err(ExperienceError::Status(500)));
}

#[tokio::test(flavor = "multi_thread")]
async fn client_errors_are_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .expect(1)
        .mount(&server)
        .await;

    let result = award(
        server.uri(),
        Duration::from_secs(2),
        RetryPolicy::new(3, Duration::from_millis(1)),
        Uuid::new_v4(),
    )
    .await;

    assert_eq!(result, Err(ExperienceError::Status(422)));
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "experience": 1 }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let result = award(
        server.uri(),
        Duration::from_millis(50),
        RetryPolicy::default(),
        Uuid::new_v4(),
    )
    .await;

    assert_eq!(result, Err(ExperienceError::Timeout));
}

#[tokio::test(flavor = "multi_thread")]
async fn negative_or_malformed_award_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/negative"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "experience": -4
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/malformed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    for route in ["negative", "malformed"] {
        let result = award(
            format!("{}/{route}", server.uri()),
            Duration::from_secs(2),
            RetryPolicy::default(),
            Uuid::new_v4(),
        )
        .await;
        assert!(
            matches!(result, Err(ExperienceError::InvalidResponse(_))),
            "{route}: {result:?}"
        );
    }
}

#[test]
fn rejects_invalid_url() {
    let result = HttpExperienceClient::new("not a url", Duration::from_secs(1), RetryPolicy::default());
    assert!(matches!(result, Err(ExperienceError::Misconfigured(_))));
}

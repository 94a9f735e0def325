//! Integration tests for the provider proxy
//!
//! The router is driven in-process; the upstream model API is a wiremock server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hridayai::config::ProxyConfig;
use hridayai::identity::ATTRIBUTION;
use hridayai::proxy::{AppState, MAX_BODY_BYTES, router};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(upstream: &str, api_key: Option<&str>) -> ProxyConfig {
    ProxyConfig {
        host: "127.0.0.1".into(),
        port: 0,
        api_key: api_key.map(str::to_string),
        upstream_url: format!("{upstream}/v1/chat/completions"),
        model: "gpt-4o-mini".into(),
        max_tokens: 500,
    }
}

async fn post_chat(state: AppState, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let resp = router(state).oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).expect("parse JSON");
    (status, json)
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

mod input_validation {
    use super::*;

    #[tokio::test]
    async fn empty_message_is_a_client_error() {
        let state = AppState::new(config("http://127.0.0.1:9", Some("key")));
        let (status, body) = post_chat(state, r#"{"message":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing message");
    }

    #[tokio::test]
    async fn missing_message_field_is_a_client_error() {
        let state = AppState::new(config("http://127.0.0.1:9", Some("key")));
        let (status, body) = post_chat(state, r#"{"image":{"name":"a.png"}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn whitespace_message_is_a_client_error() {
        let state = AppState::new(config("http://127.0.0.1:9", Some("key")));
        let (status, body) = post_chat(state, r#"{"message":"  \n\t "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing message");
    }

    #[tokio::test]
    async fn non_string_message_is_a_client_error() {
        let state = AppState::new(config("http://127.0.0.1:9", Some("key")));
        let (status, body) = post_chat(state, r#"{"message":42}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let state = AppState::new(config("http://127.0.0.1:9", Some("key")));
        let filler = "a".repeat(MAX_BODY_BYTES + 1024);
        let body = json!({ "message": filler }).to_string();

        let (status, body) = post_chat(state, &body).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn body_under_the_limit_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("long read")))
            .expect(1)
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("k")));
        let body = json!({ "message": "a".repeat(1024 * 1024) }).to_string();
        let (status, reply) = post_chat(state, &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["reply"], "long read");
    }

    #[tokio::test]
    async fn invalid_json_is_a_client_error() {
        let state = AppState::new(config("http://127.0.0.1:9", Some("key")));
        let (status, body) = post_chat(state, "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

mod relay {
    use super::*;

    #[tokio::test]
    async fn returns_first_completion_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 500,
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "tell me a joke" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Why did the crab cross?")))
            .expect(1)
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("test-key")));
        let (status, body) = post_chat(state, r#"{"message":"tell me a joke"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "reply": "Why did the crab cross?" }));
    }

    #[tokio::test]
    async fn image_is_noted_in_the_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "what is this\n\n[User attached an image: cat.png]" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("A cat.")))
            .expect(1)
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("k")));
        let (status, body) = post_chat(
            state,
            r#"{"message":"what is this","image":{"name":"cat.png"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "A cat.");
    }

    #[tokio::test]
    async fn caller_may_choose_the_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "model": "gpt-4o" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("k")));
        let (status, _) = post_chat(state, r#"{"message":"hi","model":"gpt-4o"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unexpected_shape_is_returned_as_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "odd" })))
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("k")));
        let (status, body) = post_chat(state, r#"{"message":"hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let reply = body["reply"].as_str().expect("reply is a string");
        let relayed: Value = serde_json::from_str(reply).expect("raw payload is JSON text");
        assert_eq!(relayed, json!({ "result": "odd" }));
    }
}

mod identity {
    use super::*;

    #[tokio::test]
    async fn identity_questions_never_reach_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("I am a robot")))
            .expect(0)
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("k")));
        for question in ["Who are you?", "who made you", "What is your name"] {
            let body = json!({ "message": question }).to_string();
            let (status, reply) = post_chat(state.clone(), &body).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(reply["reply"], ATTRIBUTION);
        }
    }

    #[tokio::test]
    async fn identity_answer_needs_no_credential() {
        let state = AppState::new(config("http://127.0.0.1:9", None));
        let (status, body) = post_chat(state, r#"{"message":"who built you?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], ATTRIBUTION);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn upstream_error_status_is_a_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": { "message": "bad key" } })),
            )
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("wrong")));
        let (status, body) = post_chat(state, r#"{"message":"hi"}"#).await;

        assert!(status.is_server_error());
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("401"), "unexpected error: {error}");
        assert!(!error.contains("wrong"), "credential leaked: {error}");
    }

    #[tokio::test]
    async fn non_json_upstream_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html>maintenance</html>"),
            )
            .mount(&server)
            .await;

        let state = AppState::new(config(&server.uri(), Some("k")));
        let (status, body) = post_chat(state, r#"{"message":"hi"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("malformed"));
    }

    #[tokio::test]
    async fn missing_credential_fails_at_call_time() {
        let state = AppState::new(config("http://127.0.0.1:9", None));
        let (status, body) = post_chat(state, r#"{"message":"hi"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("credential"));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_server_error() {
        let state = AppState::new(config("http://127.0.0.1:9", Some("k")));
        let (status, body) = post_chat(state, r#"{"message":"hi"}"#).await;
        assert!(status.is_server_error());
        assert!(body["error"].is_string());
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_credential_state() {
        let state = AppState::new(config("http://127.0.0.1:9", None));
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, json!({ "status": "ok", "credentialConfigured": false }));
    }
}

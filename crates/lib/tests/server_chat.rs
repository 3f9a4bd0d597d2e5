//! Integration tests: the chat server against a stub chat-completions provider.
//! Does not require network access or a real API key.

mod common;

use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use common::{free_port, spawn};
use sakhi::config::{Config, ProviderConfig};
use sakhi::server::{router, run_server, ServerState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

fn provider_for(upstream: SocketAddr) -> ProviderConfig {
    ProviderConfig {
        api_url: format!("http://{}{}", upstream, COMPLETIONS_PATH),
        timeout_secs: 5,
        ..ProviderConfig::default()
    }
}

/// Stub provider that always answers with `status` and `body`, counting calls.
async fn stub_provider(status: StatusCode, body: Value) -> (SocketAddr, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let app = Router::new().route(
        COMPLETIONS_PATH,
        post(move || {
            let counter = counter.clone();
            let body = body.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, Json(body))
            }
        }),
    );
    (spawn(app).await, calls)
}

async fn start_server(provider: ProviderConfig, api_key: Option<&str>) -> SocketAddr {
    let state = ServerState::new(provider, api_key.map(str::to_string)).expect("server state");
    spawn(router(state)).await
}

async fn post_chat(server: SocketAddr, body: Value) -> (StatusCode, Value) {
    let res = reqwest::Client::new()
        .post(format!("http://{}/chat", server))
        .json(&body)
        .send()
        .await
        .expect("POST /chat");
    let status = StatusCode::from_u16(res.status().as_u16()).expect("status");
    let json: Value = res.json().await.expect("parse JSON");
    (status, json)
}

#[tokio::test]
async fn chat_sends_persona_and_message_and_returns_trimmed_reply() {
    let seen: Arc<Mutex<Vec<(Option<String>, Value)>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let app = Router::new().route(
        COMPLETIONS_PATH,
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                recorder.lock().unwrap().push((auth, body));
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "  Hi there!\n" } }]
                }))
            }
        }),
    );
    let upstream = spawn(app).await;
    let server = start_server(provider_for(upstream), Some("test-key")).await;

    let (status, body) = post_chat(server, json!({ "message": "Hello" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "Hi there!" }));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, request) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(request["model"], "llama3-70b-8192");
    assert_eq!(request["messages"][0]["role"], "system");
    assert_eq!(
        request["messages"][1],
        json!({ "role": "user", "content": "Hello" })
    );
}

#[tokio::test]
async fn empty_message_is_rejected_without_calling_provider() {
    let (upstream, calls) = stub_provider(StatusCode::OK, json!({})).await;
    let server = start_server(provider_for(upstream), Some("test-key")).await;

    for message in ["", "   \n"] {
        let (status, body) = post_chat(server, json!({ "message": message })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "detail": "Message cannot be empty" }));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_api_key_is_a_server_error() {
    let (upstream, calls) = stub_provider(StatusCode::OK, json!({})).await;
    let server = start_server(provider_for(upstream), None).await;

    let (status, body) = post_chat(server, json!({ "message": "Hello" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "API key not configured" }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn provider_error_status_is_bad_gateway() {
    let (upstream, _) = stub_provider(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "Invalid API Key" } }),
    )
    .await;
    let server = start_server(provider_for(upstream), Some("bad-key")).await;

    let (status, body) = post_chat(server, json!({ "message": "Hello" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let detail = body["detail"].as_str().expect("detail string");
    assert!(detail.starts_with("Error communicating with Groq API: 401"), "{}", detail);
}

#[tokio::test]
async fn unreachable_provider_is_bad_gateway() {
    let provider = ProviderConfig {
        api_url: format!("http://127.0.0.1:{}{}", free_port(), COMPLETIONS_PATH),
        timeout_secs: 5,
        ..ProviderConfig::default()
    };
    let server = start_server(provider, Some("test-key")).await;

    let (status, body) = post_chat(server, json!({ "message": "Hello" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Error communicating with Groq API"));
}

/// Provider that sends 200 headers and part of the body, then closes the connection.
fn truncating_provider() -> SocketAddr {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"choi",
            );
            let _ = stream.flush();
        }
    });
    addr
}

#[tokio::test]
async fn provider_dropping_mid_body_is_communication_error() {
    let server = start_server(provider_for(truncating_provider()), Some("test-key")).await;

    let (status, body) = post_chat(server, json!({ "message": "Hello" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let detail = body["detail"].as_str().unwrap_or_default();
    assert!(detail.starts_with("Error communicating with Groq API"), "{}", detail);
}

#[tokio::test]
async fn provider_body_without_content_is_unexpected_format() {
    let (upstream, calls) = stub_provider(StatusCode::OK, json!({ "choices": [] })).await;
    let server = start_server(provider_for(upstream), Some("test-key")).await;

    let (status, body) = post_chat(server, json!({ "message": "Hello" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "detail": "Unexpected response format from Groq API" })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn index_serves_chat_page() {
    let server = start_server(ProviderConfig::default(), None).await;
    let res = reqwest::get(format!("http://{}/", server))
        .await
        .expect("GET /");
    assert!(res.status().is_success());
    let html = res.text().await.expect("body");
    assert!(html.contains("id=\"chat-box\""));
}

#[tokio::test]
async fn run_server_health_responds() {
    let port = free_port();
    let (upstream, _) = stub_provider(StatusCode::OK, json!({})).await;

    let mut config = Config::default();
    config.server.port = port;
    config.server.bind = "127.0.0.1".to_string();
    config.provider = provider_for(upstream);
    config.provider.api_key = Some("test-key".to_string());

    let server_handle = tokio::spawn(async move {
        let _ = run_server(config).await;
    });

    let url = format!("http://127.0.0.1:{}/health", port);
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let json: Value = resp.json().await.expect("parse JSON");
                assert_eq!(
                    json,
                    json!({ "status": "healthy", "api_key_configured": true })
                );
                server_handle.abort();
                return;
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    server_handle.abort();
    panic!(
        "GET {} did not return 200 with health JSON within 5s; last error: {:?}",
        url, last_err
    );
}

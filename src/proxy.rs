// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::routing::any;
use axum::routing::get;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::OllamaConfig;
use crate::error::Fallible;
use crate::generate::client::OllamaClient;

/// Relay for browser-hosted frontends: forwards `/api/ollama/*` to the
/// inference backend's `/api/*` with permissive CORS headers, since the
/// backend itself rejects cross-origin requests.
#[derive(Clone)]
struct ProxyState {
    ollama: OllamaConfig,
    http: reqwest::Client,
}

pub async fn start_proxy(port: u16, ollama: OllamaConfig) -> Fallible<()> {
    let state = ProxyState {
        ollama,
        http: reqwest::Client::new(),
    };
    let app = Router::new();
    let app = app.route("/health", get(health_handler));
    let app = app.route("/api/ollama/{*path}", any(relay_handler));
    let app = app.layer(CorsLayer::very_permissive());
    let app = app.with_state(state);
    let bind = format!("0.0.0.0:{port}");
    log::debug!("Starting proxy on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn relay_handler(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, HeaderMap, Bytes) {
    match relay(&state, &path, method, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Relay failed: {e}");
            let body = json!({
                "error": "upstream connection failed",
                "message": e.to_string(),
            });
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            (
                StatusCode::BAD_GATEWAY,
                headers,
                Bytes::from(body.to_string()),
            )
        }
    }
}

async fn relay(
    state: &ProxyState,
    path: &str,
    method: Method,
    headers: &HeaderMap,
    body: Bytes,
) -> Fallible<(StatusCode, HeaderMap, Bytes)> {
    let target = format!(
        "{}/api/{path}",
        state.ollama.url.trim_end_matches('/')
    );
    log::debug!("Proxying {method} {target}");
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())?;
    let mut request = state.http.request(method, &target).body(body.to_vec());
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        request = request.header(reqwest::header::CONTENT_TYPE, content_type.as_bytes());
    }
    let response = request.send().await?;

    let status = StatusCode::from_u16(response.status().as_u16())?;
    let mut response_headers = HeaderMap::new();
    if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
        response_headers.insert(CONTENT_TYPE, HeaderValue::from_bytes(content_type.as_bytes())?);
    }
    let bytes = response.bytes().await?;
    Ok((status, response_headers, Bytes::from(bytes.to_vec())))
}

async fn health_handler(State(state): State<ProxyState>) -> (StatusCode, Json<serde_json::Value>) {
    let client = OllamaClient::new(&state.ollama);
    let body = match client.list_models().await {
        Ok(models) => json!({
            "status": "healthy",
            "ollama": "connected",
            "models": models,
        }),
        Err(e) => {
            log::debug!("Health check failed: {e}");
            json!({
                "status": "unhealthy",
                "ollama": "not connected",
            })
        }
    };
    (StatusCode::OK, Json(body))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::routing::post;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use super::*;

    async fn start_stub_backend() -> u16 {
        let app = Router::new()
            .route(
                "/api/tags",
                get(|| async { Json(json!({"models": [{"name": "phi4-mini"}]})) }),
            )
            .route(
                "/api/generate",
                post(|Json(body): Json<serde_json::Value>| async move {
                    Json(json!({"response": format!("echo: {}", body["prompt"].as_str().unwrap())}))
                }),
            );
        let port = portpicker::pick_unused_port().unwrap();
        let listener = TcpListener::bind(("0.0.0.0", port)).await.unwrap();
        spawn(async move { axum::serve(listener, app).await });
        port
    }

    async fn start_test_proxy(ollama_url: String) -> u16 {
        let port = portpicker::pick_unused_port().unwrap();
        let ollama = OllamaConfig {
            url: ollama_url,
            ..OllamaConfig::default()
        };
        spawn(async move { start_proxy(port, ollama).await });
        loop {
            if let Ok(stream) = TcpStream::connect(("0.0.0.0", port)).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        port
    }

    #[tokio::test]
    async fn test_relay_get() -> Fallible<()> {
        let backend = start_stub_backend().await;
        let proxy = start_test_proxy(format!("http://localhost:{backend}")).await;

        let response = reqwest::Client::new()
            .get(format!("http://localhost:{proxy}/api/ollama/tags"))
            .header("Origin", "http://localhost:3000")
            .send()
            .await?;
        assert!(response.status().is_success());
        assert!(response.headers().contains_key("access-control-allow-origin"));
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["models"][0]["name"], "phi4-mini");
        Ok(())
    }

    #[tokio::test]
    async fn test_relay_post_body() -> Fallible<()> {
        let backend = start_stub_backend().await;
        let proxy = start_test_proxy(format!("http://localhost:{backend}")).await;

        let response = reqwest::Client::new()
            .post(format!("http://localhost:{proxy}/api/ollama/generate"))
            .json(&json!({"model": "phi4-mini", "prompt": "hello"}))
            .send()
            .await?;
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["response"], "echo: hello");
        Ok(())
    }

    #[tokio::test]
    async fn test_relay_upstream_down() -> Fallible<()> {
        let proxy = start_test_proxy("http://localhost:1".to_string()).await;

        let response = reqwest::Client::new()
            .get(format!("http://localhost:{proxy}/api/ollama/tags"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 502);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"], "upstream connection failed");
        Ok(())
    }

    #[tokio::test]
    async fn test_health_connected() -> Fallible<()> {
        let backend = start_stub_backend().await;
        let proxy = start_test_proxy(format!("http://localhost:{backend}")).await;

        let response = reqwest::get(format!("http://localhost:{proxy}/health")).await?;
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["models"][0], "phi4-mini");
        Ok(())
    }

    #[tokio::test]
    async fn test_health_disconnected() -> Fallible<()> {
        let proxy = start_test_proxy("http://localhost:1".to_string()).await;

        let response = reqwest::get(format!("http://localhost:{proxy}/health")).await?;
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["ollama"], "not connected");
        Ok(())
    }
}

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

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::config::OllamaConfig;
use crate::error::Fallible;
use crate::error::fail;

/// How long to wait for the tags endpoint before declaring the backend
/// unreachable.
const TAGS_TIMEOUT: Duration = Duration::from_secs(3);

/// Client for an Ollama-compatible inference server.
pub struct OllamaClient {
    base_url: String,
    temperature: f64,
    max_tokens: i64,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: i64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            http: reqwest::Client::new(),
        }
    }

    /// Names of the models installed on the backend.
    pub async fn list_models(&self) -> Fallible<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(TAGS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Run one non-streaming completion against the given model.
    pub async fn generate(&self, model: &str, prompt: &str) -> Fallible<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }

    /// Try each model in order, returning the first successful completion
    /// together with the model that produced it. Each model is tried at
    /// most once.
    pub async fn generate_any(&self, models: &[String], prompt: &str) -> Fallible<(String, String)> {
        for model in models {
            log::debug!("Trying model {model}.");
            match self.generate(model, prompt).await {
                Ok(response) => return Ok((model.clone(), response)),
                Err(e) => {
                    log::debug!("Model {model} failed: {e}");
                }
            }
        }
        fail("no working model found.")
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::routing::get;
    use axum::routing::post;
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::spawn;

    use super::*;

    /// Serve a canned Ollama lookalike on a free port and return its URL.
    async fn start_stub() -> String {
        let app = Router::new()
            .route(
                "/api/tags",
                get(|| async {
                    Json(json!({
                        "models": [{"name": "phi4-mini"}, {"name": "llama2"}]
                    }))
                }),
            )
            .route(
                "/api/generate",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["model"] == "phi4-mini" {
                        Json(json!({"response": "Q: q?\nA: a."}))
                    } else {
                        Json(json!({"error": "model not found"}))
                    }
                }),
            );
        let port = portpicker::pick_unused_port().unwrap();
        let listener = TcpListener::bind(("0.0.0.0", port)).await.unwrap();
        spawn(async move { axum::serve(listener, app).await });
        format!("http://localhost:{port}")
    }

    fn test_config(url: String) -> OllamaConfig {
        OllamaConfig {
            url,
            ..OllamaConfig::default()
        }
    }

    #[tokio::test]
    async fn test_list_models() -> Fallible<()> {
        let url = start_stub().await;
        let client = OllamaClient::new(&test_config(url));
        let models = client.list_models().await?;
        assert_eq!(models, vec!["phi4-mini".to_string(), "llama2".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_models_unreachable() {
        let client = OllamaClient::new(&test_config("http://localhost:1".to_string()));
        assert!(client.list_models().await.is_err());
    }

    #[tokio::test]
    async fn test_generate() -> Fallible<()> {
        let url = start_stub().await;
        let client = OllamaClient::new(&test_config(url));
        let response = client.generate("phi4-mini", "make cards").await?;
        assert_eq!(response, "Q: q?\nA: a.");
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_any_skips_broken_model() -> Fallible<()> {
        let url = start_stub().await;
        let client = OllamaClient::new(&test_config(url));
        // The first model's response has no `response` field, so the client
        // falls through to the second.
        let models = vec!["llama2".to_string(), "phi4-mini".to_string()];
        let (model, response) = client.generate_any(&models, "make cards").await?;
        assert_eq!(model, "phi4-mini");
        assert_eq!(response, "Q: q?\nA: a.");
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_any_all_fail() {
        let client = OllamaClient::new(&test_config("http://localhost:1".to_string()));
        let models = vec!["phi4-mini".to_string()];
        let result = client.generate_any(&models, "make cards").await;
        assert!(result.is_err());
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CompletionBackend;
use crate::config::Config;
use crate::error::{ChatError, Result};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, &config.model, config.request_timeout())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn query(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.response)
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Service {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let models_response: OllamaModelsResponse = response.json().await?;
        Ok(models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect())
    }

    pub async fn has_model(&self, name: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m == name))
    }
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.query(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ModelGateway, ERROR_PREFIX};
    use mockito::Matcher;
    use std::sync::Arc;

    #[tokio::test]
    async fn query_posts_non_streaming_generate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gemma2:2b",
                "prompt": "Say hi",
                "stream": false,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"gemma2:2b","response":"hi!","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), "gemma2:2b", None).unwrap();
        let reply = client.query("Say hi").await.unwrap();

        assert_eq!(reply, "hi!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_a_service_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'gemma2:2b' not found"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), "gemma2:2b", None).unwrap();
        match client.query("Say hi").await {
            Err(ChatError::Service { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("expected service error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), "gemma2:2b", None).unwrap();
        assert!(matches!(client.query("x").await, Err(ChatError::Http(_))));
    }

    #[tokio::test]
    async fn stalled_service_times_out_into_error_reply() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = OllamaClient::new(
            &format!("http://{}", addr),
            "gemma2:2b",
            Some(Duration::from_millis(200)),
        )
        .unwrap();
        let gateway = ModelGateway::new(Arc::new(client));

        let reply = tokio::time::timeout(Duration::from_secs(5), gateway.complete("", "hello"))
            .await
            .expect("client timeout should fire first");
        assert!(reply.starts_with(ERROR_PREFIX), "got {:?}", reply);
    }

    #[tokio::test]
    async fn lists_and_finds_models() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models":[{"name":"gemma2:2b"},{"name":"llama3.2:latest"}]}"#)
            .expect(2)
            .create_async()
            .await;

        let client = OllamaClient::new(&format!("{}/", server.url()), "gemma2:2b", None).unwrap();
        assert_eq!(
            client.list_models().await.unwrap(),
            vec!["gemma2:2b".to_string(), "llama3.2:latest".to_string()]
        );
        assert!(!client.has_model("mistral").await.unwrap());
    }
}

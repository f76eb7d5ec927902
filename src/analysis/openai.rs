//! OpenAI-compatible chat-completions analyzer

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::debug;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{FoodAnalysis, FoodAnalyzer, parse_analysis};
use crate::client::rate_limit::{Service, ServiceRateLimiter};
use crate::client::response::{check_status, read_json};
use crate::config::Config;
use crate::error::{ApiError, ConfigError, Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You are a nutrition expert. Identify every food and drink \
described or shown and estimate its nutrition for the portion present. Reply with a single \
JSON object and nothing else, shaped exactly as: {\"foods\":[{\"name\":string,\"calories\":number,\
\"proteins\":number,\"carbs\":number,\"fats\":number}],\"total_calories\":number,\
\"total_proteins\":number,\"total_carbs\":number,\"total_fats\":number,\"confidence\":number}. \
Calories are kcal, macros are grams, confidence is 0 to 100.";

const IMAGE_PROMPT: &str = "Analyze the food in this photo.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Analyzer backed by `{base_url}/chat/completions`
pub struct OpenAiAnalyzer {
    http: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    rate_limiter: ServiceRateLimiter,
}

impl OpenAiAnalyzer {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            rate_limiter: ServiceRateLimiter::always_on(Service::Analysis),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.ai.api_key.as_deref().ok_or(ConfigError::MissingAiKey)?;
        Self::new(&config.ai.base_url, api_key, &config.ai.model)
    }

    /// Send one user message and return the assistant's text.
    async fn complete(&self, user_content: Value) -> Result<String> {
        self.rate_limiter.wait_if_active().await;

        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_content },
            ],
        });

        debug!("POST {} (model {})", url, self.model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = check_status(response).await?;
        let chat: ChatResponse = read_json(response).await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Empty completion".to_string()).into())
    }
}

#[async_trait]
impl FoodAnalyzer for OpenAiAnalyzer {
    async fn analyze_text(&self, description: &str) -> Result<FoodAnalysis> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::Other("Nothing to analyze".to_string()));
        }

        let reply = self.complete(Value::String(description.to_string())).await?;
        debug!("Analysis reply: {}", reply);
        parse_analysis(&reply)
    }

    async fn analyze_image(&self, image: &[u8], mime_type: &str) -> Result<FoodAnalysis> {
        if image.is_empty() {
            return Err(Error::Other("Image is empty".to_string()));
        }

        let data_url = format!("data:{};base64,{}", mime_type, STANDARD.encode(image));
        let content = json!([
            { "type": "text", "text": IMAGE_PROMPT },
            { "type": "image_url", "image_url": { "url": data_url } },
        ]);

        let reply = self.complete(content).await?;
        debug!("Analysis reply: {}", reply);
        parse_analysis(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn completion(content: &str) -> String {
        json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
            .to_string()
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Config::default();
        assert!(OpenAiAnalyzer::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_empty_description_is_rejected() {
        let analyzer = OpenAiAnalyzer::new("http://127.0.0.1:9", "sk", "m").unwrap();
        assert!(analyzer.analyze_text("   ").await.is_err());
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "http-tests"), ignore)]
    async fn test_analyze_text_parses_fenced_reply() {
        let mut server = mockito::Server::new_async().await;
        let reply = "```json\n{\"foods\":[{\"name\":\"Pizza slice\",\"calories\":285,\"proteins\":12,\"carbs\":36,\"fats\":10}],\"confidence\":80}\n```";
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({ "model": "gpt-4o-mini" })))
            .with_status(200)
            .with_body(completion(reply))
            .create_async()
            .await;

        let analyzer = OpenAiAnalyzer::new(&server.url(), "sk-test", "gpt-4o-mini").unwrap();
        let analysis = analyzer.analyze_text("a slice of pizza").await.unwrap();

        mock.assert_async().await;
        assert_eq!(analysis.foods[0].name, "Pizza slice");
        assert_eq!(analysis.total_calories, 285.0);
        assert_eq!(analysis.confidence, 80);
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "http-tests"), ignore)]
    async fn test_analyze_image_sends_data_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("data:image/png;base64,iVBORw0K".to_string()))
            .with_status(200)
            .with_body(completion(r#"{"foods":[{"name":"Salad","calories":150}]}"#))
            .create_async()
            .await;

        let analyzer = OpenAiAnalyzer::new(&server.url(), "sk-test", "gpt-4o-mini").unwrap();
        let png_header = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        let analysis = analyzer.analyze_image(&png_header, "image/png").await.unwrap();

        mock.assert_async().await;
        assert_eq!(analysis.total_calories, 150.0);
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "http-tests"), ignore)]
    async fn test_garbage_reply_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion("Sorry, I can't tell what that is."))
            .create_async()
            .await;

        let analyzer = OpenAiAnalyzer::new(&server.url(), "sk-test", "gpt-4o-mini").unwrap();
        let analysis = analyzer.analyze_text_or_fallback("mystery stew").await;
        assert!(analysis.is_placeholder());
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "http-tests"), ignore)]
    async fn test_server_error_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let analyzer = OpenAiAnalyzer::new(&server.url(), "sk-test", "gpt-4o-mini").unwrap();
        assert!(analyzer.analyze_text("soup").await.is_err());
        assert!(analyzer.analyze_text_or_fallback("soup").await.is_placeholder());
    }
}

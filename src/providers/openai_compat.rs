//! # OpenAI 兼容适配器
//!
//! 覆盖 OpenAI 及暴露同格式 REST 接口的提供商（如 Azure OpenAI 的兼容端点）

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;

use entity::provider_credentials;

use super::traits::ProviderAdapter;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatStream, DiscoveredModel, ProviderError,
    ProviderResult, StreamChunk, TokenUsage,
};

/// `/v1/models` 响应
#[derive(Debug, Deserialize)]
struct ModelListResponse {
    data: Vec<ModelObject>,
}

#[derive(Debug, Deserialize)]
struct ModelObject {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    context_length: Option<i32>,
}

/// OpenAI 兼容 REST 适配器
pub struct OpenAiCompatAdapter {
    provider_name: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiCompatAdapter {
    /// 创建适配器，`base_url` 形如 `https://api.openai.com`
    #[must_use]
    pub fn new(provider_name: &str, base_url: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn parse_usage(body: &Value) -> TokenUsage {
        let usage = &body["usage"];
        TokenUsage {
            prompt_tokens: usage["prompt_tokens"].as_i64().unwrap_or(0),
            completion_tokens: usage["completion_tokens"].as_i64().unwrap_or(0),
            total_tokens: usage["total_tokens"].as_i64().unwrap_or(0),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatAdapter {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    async fn list_models(
        &self,
        credential: &provider_credentials::Model,
    ) -> ProviderResult<Vec<DiscoveredModel>> {
        let response = self
            .client
            .get(self.endpoint("/v1/models"))
            .bearer_auth(&credential.api_key)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ModelListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ResponseParseError(e.to_string()))?;

        Ok(parsed
            .data
            .into_iter()
            .map(|model| DiscoveredModel {
                native_id: model.id,
                display_name: model.display_name,
                context_length: model.context_length,
            })
            .collect())
    }

    async fn chat_completion(
        &self,
        credential: &provider_credentials::Model,
        request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatCompletionResponse> {
        let mut payload = serde_json::to_value(request)
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
        payload["stream"] = Value::Bool(false);

        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .bearer_auth(&credential.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ResponseParseError(e.to_string()))?;

        let usage = Self::parse_usage(&body);
        Ok(ChatCompletionResponse { body, usage })
    }

    async fn chat_completion_stream(
        &self,
        credential: &provider_credentials::Model,
        request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatStream> {
        let mut payload = serde_json::to_value(request)
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
        payload["stream"] = Value::Bool(true);

        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .bearer_auth(&credential.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|data| StreamChunk { data }).map_err(Into::into));

        Ok(Box::pin(stream))
    }
}

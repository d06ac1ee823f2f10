//! OpenAI chat-completions client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    preview, Completion, CompletionClient, CompletionError, CompletionRequest, ModelName,
    Temperature, TokenCount, TokenUsage, TraceEvent, TraceSink,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Connection and sampling settings for [`OpenAiProvider`].
///
/// `temperature`, `seed` and `max_tokens` are defaults applied to every
/// request that does not override them.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: ModelName,
    pub temperature: Temperature,
    pub seed: Option<u64>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("seed", &self.seed)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
    system_fingerprint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// [`CompletionClient`] backed by `POST {base_url}/chat/completions`.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    http: reqwest::Client,
    trace: Arc<dyn TraceSink>,
}

impl OpenAiProvider {
    pub fn new(
        config: OpenAiConfig,
        trace: Arc<dyn TraceSink>,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Transport {
                message: e.to_string(),
            })?;
        Ok(Self {
            config,
            http,
            trace,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn classify_transport(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout {
                after: self.config.timeout,
            }
        } else {
            CompletionError::Transport {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiProvider {
    #[instrument(skip_all, fields(agent = request.agent, prompt_chars = request.prompt.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let model = request.model.as_ref().unwrap_or(&self.config.model);
        let temperature = request.temperature.unwrap_or(self.config.temperature);
        let seed = request.seed.or(self.config.seed);
        let max_tokens = request.max_tokens.or(self.config.max_tokens);

        self.trace.record(TraceEvent::LlmRequest {
            agent: request.agent.to_string(),
            model: model.to_string(),
            prompt_preview: preview(&request.prompt),
            prompt_length: request.prompt.chars().count(),
            temperature: temperature.as_f32(),
            seed,
            max_tokens,
        });

        let body = ChatRequest {
            model: model.as_str(),
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: temperature.as_f32(),
            seed,
            max_tokens,
        };

        let result = async {
            let resp = self
                .http
                .post(self.endpoint())
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| self.classify_transport(e))?;

            let status = resp.status().as_u16();
            let text = resp.text().await.map_err(|e| self.classify_transport(e))?;
            if status >= 400 {
                return Err(classify_status(status, &text));
            }
            parse_completion(&text, model)
        }
        .await;

        match &result {
            Ok(completion) => {
                debug!(chars = completion.text.len(), "completion received");
                self.trace.record(TraceEvent::LlmResponse {
                    agent: request.agent.to_string(),
                    response_preview: preview(&completion.text),
                    response_length: completion.text.chars().count(),
                    tokens: completion.usage,
                    system_fingerprint: completion.system_fingerprint.clone(),
                });
            }
            // The calling stage records the `error` trace event.
            Err(err) => warn!(agent = request.agent, error = %err, "completion failed"),
        }
        result
    }

    fn default_model(&self) -> &ModelName {
        &self.config.model
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

fn parse_completion(body: &str, requested: &ModelName) -> Result<Completion, CompletionError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::MalformedResponse {
            message: e.to_string(),
        })?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse {
            message: "response contained no choices".to_string(),
        })?;

    Ok(Completion {
        text: choice.message.content.unwrap_or_default(),
        model: if response.model.is_empty() {
            requested.to_string()
        } else {
            response.model
        },
        usage: response.usage.map(|u| TokenUsage {
            prompt: TokenCount::new(u.prompt_tokens),
            completion: TokenCount::new(u.completion_tokens),
            total: TokenCount::new(u.total_tokens),
        }),
        system_fingerprint: response.system_fingerprint,
    })
}

fn classify_status(status: u16, body: &str) -> CompletionError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(500).collect());
    match status {
        401 | 403 => CompletionError::Unauthorized { status, message },
        429 => CompletionError::RateLimited { message },
        _ => CompletionError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use pipeline::InMemoryTraceSink;

    use super::*;

    fn model() -> ModelName {
        ModelName::new("gpt-4o").unwrap()
    }

    fn config(base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: base_url.to_string(),
            model: model(),
            temperature: Temperature::default(),
            seed: Some(42),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn parses_text_usage_and_fingerprint() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-2024-08-06",
            "system_fingerprint": "fp_abc",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;

        let completion = parse_completion(body, &model()).unwrap();

        assert_eq!(completion.text, "Hello");
        assert_eq!(completion.model, "gpt-4o-2024-08-06");
        assert_eq!(completion.system_fingerprint.as_deref(), Some("fp_abc"));
        assert_eq!(completion.usage.map(|u| u.total.as_u64()), Some(12));
    }

    #[test]
    fn null_content_becomes_empty_text() {
        let body = r#"{"choices": [{"message": {"content": null}}]}"#;
        let completion = parse_completion(body, &model()).unwrap();
        assert_eq!(completion.text, "");
        assert_eq!(completion.model, "gpt-4o");
    }

    #[test]
    fn missing_choices_is_malformed() {
        let err = parse_completion(r#"{"choices": []}"#, &model()).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse { .. }));
        let err = parse_completion("not json", &model()).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse { .. }));
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        let quota = r#"{"error": {"message": "You exceeded your current quota"}}"#;
        assert!(matches!(
            classify_status(429, quota),
            CompletionError::RateLimited { ref message } if message == "You exceeded your current quota"
        ));
        assert!(matches!(
            classify_status(401, "{}"),
            CompletionError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            classify_status(500, "upstream exploded"),
            CompletionError::Api { status: 500, ref message } if message == "upstream exploded"
        ));
    }

    #[test]
    fn request_body_carries_sampling_parameters() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.0,
            seed: Some(42),
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let rendered = format!("{:?}", config(DEFAULT_BASE_URL));
        assert!(!rendered.contains("sk-test"));
    }

    #[tokio::test]
    async fn failed_call_traces_the_request_but_leaves_the_error_to_the_caller() {
        let trace = Arc::new(InMemoryTraceSink::new());
        let provider = OpenAiProvider::new(config("http://127.0.0.1:9/v1"), trace.clone()).unwrap();

        let result = provider
            .complete(CompletionRequest::new("SummarizerAgent", "prompt"))
            .await;

        assert!(matches!(
            result,
            Err(CompletionError::Transport { .. }) | Err(CompletionError::Timeout { .. })
        ));
        assert_eq!(trace.kinds(), vec!["llm_request"]);
    }
}

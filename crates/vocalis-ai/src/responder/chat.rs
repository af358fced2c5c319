//! Chat completions client for Perplexity and OpenAI

use async_trait::async_trait;
use chrono::Local;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiProvider, Reply, ReplySource, Responder, fallback_reply};
use crate::error::ResponderError;
use crate::http_client::build_http_client;

const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
const PERPLEXITY_MODEL: &str = "pplx-7b-online";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";
const OPENAI_TEMPERATURE: f32 = 0.7;

/// Connection details for one provider
#[derive(Clone)]
pub struct ProviderEndpoint {
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl ProviderEndpoint {
    fn new(base_url: &str, model: &str) -> Self {
        Self {
            api_key: None,
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

impl std::fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Which backend serves the next request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Remote(AiProvider),
    Fallback,
}

/// Responder backed by an OpenAI-compatible chat completions API.
///
/// Perplexity is preferred when it is the active provider and has a key;
/// otherwise OpenAI is used when it has a key; otherwise replies come from
/// [`fallback_reply`].
#[derive(Debug)]
pub struct ChatResponder {
    client: Client,
    perplexity: ProviderEndpoint,
    openai: ProviderEndpoint,
    active: RwLock<AiProvider>,
}

impl Default for ChatResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatResponder {
    /// Create a responder with no keys configured
    pub fn new() -> Self {
        Self {
            client: build_http_client(),
            perplexity: ProviderEndpoint::new(PERPLEXITY_BASE_URL, PERPLEXITY_MODEL),
            openai: ProviderEndpoint::new(OPENAI_BASE_URL, OPENAI_MODEL),
            active: RwLock::new(AiProvider::default()),
        }
    }

    /// Create a responder with keys from `PERPLEXITY_API_KEY` and `OPENAI_API_KEY`
    pub fn from_env() -> Self {
        let mut responder = Self::new();
        responder.perplexity.api_key = read_key("PERPLEXITY_API_KEY");
        responder.openai.api_key = read_key("OPENAI_API_KEY");
        tracing::info!(
            perplexity = responder.perplexity.is_configured(),
            openai = responder.openai.is_configured(),
            "AI responder initialized"
        );
        responder
    }

    pub fn with_perplexity_key(mut self, key: impl Into<String>) -> Self {
        self.perplexity.api_key = Some(key.into());
        self
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai.api_key = Some(key.into());
        self
    }

    /// Set custom Perplexity base URL (for API-compatible services)
    pub fn with_perplexity_base_url(mut self, url: impl Into<String>) -> Self {
        self.perplexity.base_url = url.into();
        self
    }

    /// Set custom OpenAI base URL (for API-compatible services)
    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai.base_url = url.into();
        self
    }

    pub fn with_provider(self, provider: AiProvider) -> Self {
        *self.active.write() = provider;
        self
    }

    pub fn active_provider(&self) -> AiProvider {
        *self.active.read()
    }

    fn endpoint(&self, provider: AiProvider) -> &ProviderEndpoint {
        match provider {
            AiProvider::Perplexity => &self.perplexity,
            AiProvider::OpenAi => &self.openai,
        }
    }

    fn select_backend(&self) -> Backend {
        if self.active_provider() == AiProvider::Perplexity && self.perplexity.is_configured() {
            Backend::Remote(AiProvider::Perplexity)
        } else if self.openai.is_configured() {
            Backend::Remote(AiProvider::OpenAi)
        } else {
            Backend::Fallback
        }
    }

    async fn complete(
        &self,
        provider: AiProvider,
        text: &str,
        max_tokens: u32,
    ) -> Result<String, ResponderError> {
        let endpoint = self.endpoint(provider);
        let body = CompletionRequest {
            model: &endpoint.model,
            messages: vec![CompletionMessage {
                role: "user",
                content: text,
            }],
            max_tokens,
            temperature: match provider {
                AiProvider::OpenAi => Some(OPENAI_TEMPERATURE),
                AiProvider::Perplexity => None,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                endpoint.base_url.trim_end_matches('/')
            ))
            .bearer_auth(endpoint.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(provider = %provider, status = status.as_u16(), "AI API error");
            return Err(ResponderError::from_status(provider.display_name(), status));
        }

        let data: CompletionResponse = response
            .json()
            .await
            .map_err(|err| ResponderError::Malformed(err.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ResponderError::Malformed(format!(
                    "No response content from {}",
                    provider.display_name()
                ))
            })
    }
}

#[async_trait]
impl Responder for ChatResponder {
    fn provider(&self) -> &str {
        self.active_provider().as_str()
    }

    async fn respond(&self, text: &str, max_tokens: u32) -> Result<Reply, ResponderError> {
        match self.select_backend() {
            Backend::Remote(provider) => {
                let content = self
                    .complete(provider, text, max_tokens)
                    .await
                    .inspect_err(|err| {
                        tracing::error!(provider = %provider, error = %err, "Error getting AI response");
                    })?;
                Ok(Reply {
                    text: content,
                    source: ReplySource::Provider(provider),
                })
            }
            Backend::Fallback => {
                tracing::warn!("No AI API configured, using fallback response");
                Ok(Reply::fallback(fallback_reply(text, Local::now().time())))
            }
        }
    }

    fn set_provider(&self, name: &str) -> bool {
        match name.parse::<AiProvider>() {
            Ok(provider) => {
                *self.active.write() = provider;
                tracing::info!(provider = %provider, "AI provider set");
                true
            }
            Err(err) => {
                tracing::warn!("{}", err);
                false
            }
        }
    }
}

fn read_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|key| !key.trim().is_empty())
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Deserialize)]
struct CompletionChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn test_fallback_without_keys() {
        let responder = ChatResponder::new();
        let reply = responder.respond("hello there", 500).await.unwrap();
        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(reply.text, "Hello! How can I assist you today?");
    }

    #[tokio::test]
    async fn test_perplexity_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer pplx-key"))
            .and(body_partial_json(json!({
                "model": "pplx-7b-online",
                "messages": [{"role": "user", "content": "What is Rust?"}],
                "max_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("A language.")))
            .expect(1)
            .mount(&server)
            .await;

        let responder = ChatResponder::new()
            .with_perplexity_key("pplx-key")
            .with_perplexity_base_url(server.uri());

        let reply = responder.respond("What is Rust?", 500).await.unwrap();
        assert_eq!(reply.text, "A language.");
        assert_eq!(reply.source, ReplySource::Provider(AiProvider::Perplexity));
    }

    #[tokio::test]
    async fn test_openai_used_when_perplexity_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"model": "gpt-3.5-turbo", "max_tokens": 42})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hi")))
            .expect(1)
            .mount(&server)
            .await;

        let responder = ChatResponder::new()
            .with_openai_key("sk-test")
            .with_openai_base_url(server.uri());

        let reply = responder.respond("ping", 42).await.unwrap();
        assert_eq!(reply.source, ReplySource::Provider(AiProvider::OpenAi));
    }

    #[tokio::test]
    async fn test_openai_preferred_when_selected() {
        let perplexity = MockServer::start().await;
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("from openai")))
            .expect(1)
            .mount(&openai)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("from pplx")))
            .expect(0)
            .mount(&perplexity)
            .await;

        let responder = ChatResponder::new()
            .with_perplexity_key("pplx-key")
            .with_perplexity_base_url(perplexity.uri())
            .with_openai_key("sk-test")
            .with_openai_base_url(openai.uri());

        assert!(responder.set_provider("openai"));
        assert_eq!(responder.provider(), "openai");

        let reply = responder.respond("hi", 10).await.unwrap();
        assert_eq!(reply.text, "from openai");
    }

    #[tokio::test]
    async fn test_status_errors_are_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let responder = ChatResponder::new()
            .with_perplexity_key("pplx-key")
            .with_perplexity_base_url(server.uri());

        let err = responder.respond("hi", 10).await.unwrap_err();
        assert_eq!(err, ResponderError::RateLimited);
        assert!(!responder.test_connection().await);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let responder = ChatResponder::new()
            .with_openai_key("bad")
            .with_openai_base_url(server.uri());

        let err = responder.respond("hi", 10).await.unwrap_err();
        assert_eq!(err, ResponderError::Unauthorized);
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let responder = ChatResponder::new()
            .with_perplexity_key("pplx-key")
            .with_perplexity_base_url(server.uri());

        let err = responder.respond("hi", 10).await.unwrap_err();
        assert!(matches!(err, ResponderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let responder = ChatResponder::new()
            .with_perplexity_key("pplx-key")
            .with_perplexity_base_url(server.uri());

        let err = responder.respond("hi", 10).await.unwrap_err();
        assert!(matches!(err, ResponderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let responder = ChatResponder::new()
            .with_perplexity_key("pplx-key")
            .with_perplexity_base_url(uri);

        let err = responder.respond("hi", 10).await.unwrap_err();
        assert!(matches!(err, ResponderError::Unavailable(_)));
    }

    #[test]
    fn test_set_provider_rejects_unknown() {
        let responder = ChatResponder::new();
        assert!(!responder.set_provider("anthropic"));
        assert_eq!(responder.active_provider(), AiProvider::Perplexity);
        assert!(responder.set_provider("OpenAI"));
        assert_eq!(responder.active_provider(), AiProvider::OpenAi);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let responder = ChatResponder::new().with_openai_key("sk-secret");
        let debug = format!("{:?}", responder);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_fallback_connection_succeeds() {
        assert!(ChatResponder::new().test_connection().await);
    }
}

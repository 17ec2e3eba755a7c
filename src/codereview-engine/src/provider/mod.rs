//! Review providers.
//!
//! A provider is described by a [`ProviderDescriptor`]: which service it is, the
//! credential it needs, where to send requests, and which model variants to try.
//! [`HttpProvider`] turns a descriptor into something the chain can call through
//! the [`ReviewProvider`] trait.

pub mod anthropic;
pub mod huggingface;
pub mod openai;
pub mod response;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use codereview_common::{PROVIDER_TIMEOUT, Retry, RetryPolicy, provider_timeout};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, Result};
use crate::prompt::{PromptStyle, build_review_prompt};
use crate::request::AnalysisRequest;

/// The external services a review can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "huggingface")]
    HuggingFace,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl ProviderKind {
    /// Stable identifier used in logs and API responses.
    pub fn id(&self) -> &'static str {
        match self {
            Self::HuggingFace => "huggingface",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    pub fn prompt_style(&self) -> PromptStyle {
        match self {
            Self::HuggingFace => PromptStyle::Completion,
            Self::OpenAi | Self::Anthropic => PromptStyle::Chat,
        }
    }

    /// Whether a 503 from this service means "model still loading".
    pub fn reports_model_loading(&self) -> bool {
        matches!(self, Self::HuggingFace)
    }

    /// Whether an unrecognized 2xx body is passed through verbatim.
    pub fn raw_fallback(&self) -> bool {
        matches!(self, Self::HuggingFace)
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::HuggingFace => huggingface::DEFAULT_BASE_URL,
            Self::OpenAi => openai::DEFAULT_BASE_URL,
            Self::Anthropic => anthropic::DEFAULT_BASE_URL,
        }
    }

    fn default_models(&self) -> Vec<String> {
        match self {
            Self::HuggingFace => huggingface::DEFAULT_MODELS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            Self::OpenAi => vec![openai::DEFAULT_MODEL.to_string()],
            Self::Anthropic => vec![anthropic::DEFAULT_MODEL.to_string()],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HuggingFace => write!(f, "Hugging Face"),
            Self::OpenAi => write!(f, "OpenAI"),
            Self::Anthropic => write!(f, "Anthropic"),
        }
    }
}

/// Everything needed to call one provider.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    credential: Option<SecretString>,
    pub base_url: String,
    /// Model variants, tried in order.
    pub models: Vec<String>,
    /// Per-request timeout, never above [`PROVIDER_TIMEOUT`].
    pub timeout: Duration,
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("kind", &self.kind)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderDescriptor {
    /// Descriptor with the service defaults. An empty or blank credential counts
    /// as absent.
    pub fn new(kind: ProviderKind, credential: Option<String>) -> Self {
        let credential = credential
            .filter(|c| !c.trim().is_empty())
            .map(|c| SecretString::new(c.into()));

        Self {
            kind,
            credential,
            base_url: kind.default_base_url().to_string(),
            models: kind.default_models(),
            timeout: PROVIDER_TIMEOUT,
        }
    }

    pub fn huggingface(token: Option<String>) -> Self {
        Self::new(ProviderKind::HuggingFace, token)
    }

    pub fn openai(api_key: Option<String>) -> Self {
        Self::new(ProviderKind::OpenAi, api_key)
    }

    pub fn anthropic(api_key: Option<String>) -> Self {
        Self::new(ProviderKind::Anthropic, api_key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the model variants; an empty list keeps the defaults.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        if !models.is_empty() {
            self.models = models;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = provider_timeout(timeout);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    fn credential(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.expose_secret())
    }

    fn build_request(
        &self,
        client: &Client,
        model: &str,
        prompt: &str,
        credential: &str,
    ) -> RequestBuilder {
        let request = match self.kind {
            ProviderKind::HuggingFace => client
                .post(huggingface::model_url(&self.base_url, model))
                .bearer_auth(credential)
                .json(&huggingface::InferenceRequest::new(prompt)),
            ProviderKind::OpenAi => client
                .post(openai::completions_url(&self.base_url))
                .bearer_auth(credential)
                .json(&openai::ChatRequest::new(model, prompt)),
            ProviderKind::Anthropic => client
                .post(anthropic::messages_url(&self.base_url))
                .header("x-api-key", credential)
                .header("anthropic-version", anthropic::API_VERSION)
                .json(&anthropic::MessagesRequest::new(model, prompt)),
        };

        request.timeout(self.timeout)
    }

    fn classify_status(&self, model: &str, status: StatusCode) -> ProviderError {
        if status == StatusCode::SERVICE_UNAVAILABLE && self.kind.reports_model_loading() {
            ProviderError::ModelLoading {
                model: model.to_string(),
            }
        } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            ProviderError::Unavailable {
                provider: self.kind,
                message: format!("HTTP {status}"),
            }
        } else {
            ProviderError::ClientError {
                provider: self.kind,
                status: status.as_u16(),
            }
        }
    }
}

/// All providers in their fixed priority order, plus the retry policy applied
/// to each call.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub huggingface: ProviderDescriptor,
    pub openai: ProviderDescriptor,
    pub anthropic: ProviderDescriptor,
    pub retry: RetryPolicy,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            huggingface: ProviderDescriptor::huggingface(None),
            openai: ProviderDescriptor::openai(None),
            anthropic: ProviderDescriptor::anthropic(None),
            retry: RetryPolicy::default(),
        }
    }
}

impl ProviderSettings {
    /// Descriptors in priority order.
    pub fn into_ordered(self) -> [ProviderDescriptor; 3] {
        [self.huggingface, self.openai, self.anthropic]
    }
}

/// Something that can produce a markdown review.
#[async_trait]
pub trait ReviewProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Unconfigured providers are skipped without a call to [`Self::review`].
    fn is_configured(&self) -> bool;

    async fn review(&self, request: &AnalysisRequest) -> Result<String>;
}

/// A provider reached over HTTP.
pub struct HttpProvider {
    descriptor: ProviderDescriptor,
    client: Client,
    retry: Retry,
}

impl HttpProvider {
    pub fn new(descriptor: ProviderDescriptor, client: Client, retry: RetryPolicy) -> Self {
        Self {
            descriptor,
            client,
            retry: Retry::new(retry),
        }
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// One request against one model variant.
    async fn attempt(&self, model: &str, prompt: &str, credential: &str) -> Result<String> {
        let kind = self.descriptor.kind;
        let response = self
            .descriptor
            .build_request(&self.client, model, prompt, credential)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(provider = kind.id(), model, %status, body_len = body.len(), "Provider returned error status");
            return Err(self.descriptor.classify_status(model, status));
        }

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::Unparseable {
                provider: kind,
                message: format!("body is not JSON: {e}"),
            })?;

        response::extract_text(&value, kind.raw_fallback()).ok_or_else(|| {
            ProviderError::Unparseable {
                provider: kind,
                message: "no text field in response".to_string(),
            }
        })
    }
}

#[async_trait]
impl ReviewProvider for HttpProvider {
    fn kind(&self) -> ProviderKind {
        self.descriptor.kind
    }

    fn is_configured(&self) -> bool {
        self.descriptor.is_configured()
    }

    async fn review(&self, request: &AnalysisRequest) -> Result<String> {
        let kind = self.descriptor.kind;
        let credential = self
            .descriptor
            .credential()
            .ok_or(ProviderError::Misconfigured { provider: kind })?;

        let prompt = build_review_prompt(request, kind.prompt_style());
        let prompt = prompt.as_str();

        for model in &self.descriptor.models {
            let model = model.as_str();
            let label = format!("{}:{}", kind.id(), model);

            match self
                .retry
                .execute(&label, move || self.attempt(model, prompt, credential))
                .await
            {
                Ok(text) => {
                    info!(provider = kind.id(), model, "Review generated");
                    return Ok(text);
                }
                Err(ProviderError::ModelLoading { model }) => {
                    info!(provider = kind.id(), %model, "Model is loading, trying next variant");
                }
                Err(e) => return Err(e),
            }
        }

        Err(ProviderError::Unavailable {
            provider: kind,
            message: "all model variants are loading".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(descriptor: ProviderDescriptor) -> HttpProvider {
        HttpProvider::new(descriptor, Client::new(), RetryPolicy::immediate(3))
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("eval(input())", Some("Python")).unwrap()
    }

    #[test]
    fn test_blank_credential_is_unconfigured() {
        assert!(!ProviderDescriptor::openai(Some(String::new())).is_configured());
        assert!(!ProviderDescriptor::openai(Some("   ".into())).is_configured());
        assert!(!ProviderDescriptor::anthropic(None).is_configured());
        assert!(ProviderDescriptor::huggingface(Some("hf_token".into())).is_configured());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let descriptor = ProviderDescriptor::openai(Some("sk-secret".into()));
        let debug = format!("{descriptor:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_timeout_is_bounded() {
        let descriptor =
            ProviderDescriptor::openai(None).with_timeout(Duration::from_secs(90));
        assert_eq!(descriptor.timeout, PROVIDER_TIMEOUT);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(ProviderDescriptor::openai(None).with_base_url(server.uri()));
        let err = provider.review(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Misconfigured { .. }));
    }

    #[tokio::test]
    async fn test_huggingface_loading_model_falls_through_to_next_variant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/first"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/second"))
            .and(header("authorization", "Bearer hf_token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"generated_text": "## Looks risky"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(
            ProviderDescriptor::huggingface(Some("hf_token".into()))
                .with_base_url(server.uri())
                .with_models(vec!["first".into(), "second".into()]),
        );

        let text = provider.review(&request()).await.unwrap();
        assert_eq!(text, "## Looks risky");
    }

    #[tokio::test]
    async fn test_huggingface_all_variants_loading() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(
            ProviderDescriptor::huggingface(Some("hf_token".into()))
                .with_base_url(server.uri())
                .with_models(vec!["a".into(), "b".into()]),
        );

        let err = provider.review(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let provider = provider(
            ProviderDescriptor::openai(Some("sk-test".into())).with_base_url(server.uri()),
        );

        let err = provider.review(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(
            ProviderDescriptor::anthropic(Some("key".into())).with_base_url(server.uri()),
        );

        let err = provider.review(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ClientError { status: 401, .. }
        ));
    }

    #[tokio::test]
    async fn test_anthropic_headers_and_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "key"))
            .and(header("anthropic-version", anthropic::API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "## Security Vulnerabilities\nNone"}]
            })))
            .mount(&server)
            .await;

        let provider = provider(
            ProviderDescriptor::anthropic(Some("key".into())).with_base_url(server.uri()),
        );

        let text = provider.review(&request()).await.unwrap();
        assert!(text.starts_with("## Security Vulnerabilities"));
    }

    #[tokio::test]
    async fn test_unrecognized_chat_body_is_unparseable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(
            ProviderDescriptor::openai(Some("sk-test".into())).with_base_url(server.uri()),
        );

        let err = provider.review(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unparseable { .. }));
    }

    #[tokio::test]
    async fn test_huggingface_unknown_body_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"score": 0.5})),
            )
            .mount(&server)
            .await;

        let provider = provider(
            ProviderDescriptor::huggingface(Some("hf".into()))
                .with_base_url(server.uri())
                .with_models(vec!["only".into()]),
        );

        let text = provider.review(&request()).await.unwrap();
        assert_eq!(text, r#"{"score":0.5}"#);
    }
}

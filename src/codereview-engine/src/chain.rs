//! Provider fallback chain.

use std::fmt;

use codereview_common::{PROVIDER_TIMEOUT, create_client_with_timeout};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, Result};
use crate::provider::{HttpProvider, ProviderKind, ProviderSettings, ReviewProvider};
use crate::request::AnalysisRequest;
use crate::scanner::scan;

/// Where a review came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Provider(ProviderKind),
    Scanner,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider(kind) => kind.id(),
            Self::Scanner => "scanner",
        }
    }
}

impl fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnalysisSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Markdown feedback and the link of the chain that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub markdown: String,
    pub source: AnalysisSource,
}

/// Ordered providers followed by the scanner.
///
/// Providers are tried strictly one after another. The first non-blank answer
/// wins; every failure is logged and swallowed.
pub struct ReviewChain {
    providers: Vec<Box<dyn ReviewProvider>>,
}

impl ReviewChain {
    pub fn new(providers: Vec<Box<dyn ReviewProvider>>) -> Self {
        Self { providers }
    }

    /// A chain that always answers with the scanner.
    pub fn scanner_only() -> Self {
        Self::new(Vec::new())
    }

    /// Build the fixed-order chain: Hugging Face, OpenAI, Anthropic.
    ///
    /// Unconfigured providers stay in the list and are skipped at call time.
    pub fn from_settings(settings: ProviderSettings) -> Result<Self> {
        let client = create_client_with_timeout(PROVIDER_TIMEOUT).map_err(|e| {
            ProviderError::Transport(format!("failed to build HTTP client: {e}"))
        })?;
        let retry = settings.retry;

        let providers = settings
            .into_ordered()
            .into_iter()
            .map(|descriptor| {
                Box::new(HttpProvider::new(descriptor, client.clone(), retry))
                    as Box<dyn ReviewProvider>
            })
            .collect();

        Ok(Self::new(providers))
    }

    /// Providers that will actually be called, in order.
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.kind())
            .collect()
    }

    /// Review the request. Never fails; the scanner is the last resort.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Analysis {
        for provider in &self.providers {
            let kind = provider.kind();
            if !provider.is_configured() {
                debug!(provider = kind.id(), "Provider not configured, skipping");
                continue;
            }

            match provider.review(request).await {
                Ok(markdown) if !markdown.trim().is_empty() => {
                    return Analysis {
                        markdown,
                        source: AnalysisSource::Provider(kind),
                    };
                }
                Ok(_) => warn!(provider = kind.id(), "Provider returned blank review"),
                Err(e) => warn!(provider = kind.id(), error = %e, "Provider failed"),
            }
        }

        info!("Using rule-based scanner");
        Analysis {
            markdown: scan(request.code(), request.language()),
            source: AnalysisSource::Scanner,
        }
    }

    /// Markdown-only entry point over raw inputs.
    ///
    /// Blank code is not an error here; it goes straight to the scanner.
    pub async fn analyze_markdown(&self, code: &str, language: Option<&str>) -> String {
        match AnalysisRequest::new(code, language) {
            Ok(request) => self.analyze(&request).await.markdown,
            Err(e) => {
                debug!(error = %e, "Request rejected, scanning directly");
                scan(code, language)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        kind: ProviderKind,
        configured: bool,
        answer: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn boxed(
            kind: ProviderKind,
            configured: bool,
            answer: Option<&'static str>,
        ) -> (Box<dyn ReviewProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                kind,
                configured,
                answer,
                calls: calls.clone(),
            };
            (Box::new(provider), calls)
        }
    }

    #[async_trait]
    impl ReviewProvider for Scripted {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn review(&self, _request: &AnalysisRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Some(text) => Ok(text.to_string()),
                None => Err(ProviderError::Unavailable {
                    provider: self.kind,
                    message: "HTTP 500".to_string(),
                }),
            }
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("print(token)", Some("Python")).unwrap()
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let (hf, hf_calls) = Scripted::boxed(ProviderKind::HuggingFace, true, None);
        let (openai, openai_calls) =
            Scripted::boxed(ProviderKind::OpenAi, true, Some("## From OpenAI"));
        let (anthropic, anthropic_calls) =
            Scripted::boxed(ProviderKind::Anthropic, true, Some("## From Anthropic"));

        let chain = ReviewChain::new(vec![hf, openai, anthropic]);
        let analysis = chain.analyze(&request()).await;

        assert_eq!(analysis.markdown, "## From OpenAI");
        assert_eq!(analysis.source, AnalysisSource::Provider(ProviderKind::OpenAi));
        assert_eq!(hf_calls.load(Ordering::SeqCst), 1);
        assert_eq!(openai_calls.load(Ordering::SeqCst), 1);
        assert_eq!(anthropic_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_providers_are_not_called() {
        let (hf, hf_calls) = Scripted::boxed(ProviderKind::HuggingFace, false, Some("x"));
        let (openai, openai_calls) = Scripted::boxed(ProviderKind::OpenAi, false, Some("y"));

        let chain = ReviewChain::new(vec![hf, openai]);
        assert!(chain.configured_providers().is_empty());

        let analysis = chain.analyze(&request()).await;
        assert_eq!(analysis.source, AnalysisSource::Scanner);
        assert_eq!(hf_calls.load(Ordering::SeqCst), 0);
        assert_eq!(openai_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_answer_falls_through() {
        let (hf, _) = Scripted::boxed(ProviderKind::HuggingFace, true, Some("  \n"));
        let chain = ReviewChain::new(vec![hf]);

        let analysis = chain.analyze(&request()).await;
        assert_eq!(analysis.source, AnalysisSource::Scanner);
        assert_eq!(analysis.markdown, scan("print(token)", Some("Python")));
    }

    #[tokio::test]
    async fn test_analyze_markdown_is_total() {
        let chain = ReviewChain::scanner_only();
        let markdown = chain.analyze_markdown("   ", None).await;
        assert!(markdown.contains("**Analysis Info**"));
    }

    #[test]
    fn test_source_serialization() {
        let value = serde_json::to_value(AnalysisSource::Provider(ProviderKind::HuggingFace))
            .unwrap();
        assert_eq!(value, serde_json::json!("huggingface"));
        assert_eq!(AnalysisSource::Scanner.to_string(), "scanner");
    }

    #[test]
    fn test_from_settings_keeps_fixed_order() {
        let mut settings = ProviderSettings::default();
        settings.anthropic = crate::ProviderDescriptor::anthropic(Some("key".into()));
        settings.huggingface = crate::ProviderDescriptor::huggingface(Some("hf".into()));

        let chain = ReviewChain::from_settings(settings).unwrap();
        assert_eq!(
            chain.configured_providers(),
            vec![ProviderKind::HuggingFace, ProviderKind::Anthropic]
        );
    }
}

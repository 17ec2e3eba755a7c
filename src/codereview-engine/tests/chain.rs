//! End-to-end fallback chain tests against mocked provider endpoints.

use std::time::Duration;

use codereview_common::RetryPolicy;
use codereview_engine::{
    AnalysisRequest, AnalysisSource, ProviderDescriptor, ProviderKind, ProviderSettings,
    ReviewChain, scan,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        huggingface: ProviderDescriptor::huggingface(Some("hf_test".into()))
            .with_base_url(server.uri())
            .with_models(vec!["gpt2".into()]),
        openai: ProviderDescriptor::openai(Some("sk-test".into())).with_base_url(server.uri()),
        anthropic: ProviderDescriptor::anthropic(Some("ant-test".into()))
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(5)),
        retry: RetryPolicy::immediate(2),
    }
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new("password = input()\neval(password)", Some("Python")).unwrap()
}

#[tokio::test]
async fn test_third_provider_answers_after_two_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "ant-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "## Security Vulnerabilities\n- eval on input"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chain = ReviewChain::from_settings(settings(&server)).unwrap();
    let analysis = chain.analyze(&request()).await;

    assert_eq!(
        analysis.markdown,
        "## Security Vulnerabilities\n- eval on input"
    );
    assert_eq!(
        analysis.source,
        AnalysisSource::Provider(ProviderKind::Anthropic)
    );
}

#[tokio::test]
async fn test_all_failures_equal_scanner_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let chain = ReviewChain::from_settings(settings(&server)).unwrap();
    let request = request();
    let analysis = chain.analyze(&request).await;

    assert_eq!(analysis.source, AnalysisSource::Scanner);
    assert_eq!(analysis.markdown, scan(request.code(), request.language()));
}

#[tokio::test]
async fn test_unconfigured_chain_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(path_regex(".*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let settings = ProviderSettings {
        huggingface: ProviderDescriptor::huggingface(None).with_base_url(server.uri()),
        openai: ProviderDescriptor::openai(Some(String::new())).with_base_url(server.uri()),
        anthropic: ProviderDescriptor::anthropic(None).with_base_url(server.uri()),
        retry: RetryPolicy::no_retry(),
    };
    let chain = ReviewChain::from_settings(settings).unwrap();

    let markdown = chain
        .analyze_markdown("x = 1", Some("Python"))
        .await;
    assert_eq!(markdown, scan("x = 1", Some("Python")));
}

#[tokio::test]
async fn test_loading_model_moves_to_next_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/microsoft/DialoGPT-medium"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "Looks fine."}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.huggingface = ProviderDescriptor::huggingface(Some("hf_test".into()))
        .with_base_url(server.uri());

    let chain = ReviewChain::from_settings(settings).unwrap();
    let analysis = chain.analyze(&request()).await;

    assert_eq!(analysis.markdown, "Looks fine.");
    assert_eq!(
        analysis.source,
        AnalysisSource::Provider(ProviderKind::HuggingFace)
    );
}

#[tokio::test]
async fn test_openai_answer_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "## Bugs and Issues\nNone"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chain = ReviewChain::from_settings(settings(&server)).unwrap();
    let markdown = chain
        .analyze_markdown("fn main() {}", Some("Rust"))
        .await;

    assert_eq!(markdown, "## Bugs and Issues\nNone");
}

#[tokio::test]
async fn test_blank_huggingface_text_falls_back_to_scanner() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "   "}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.openai = ProviderDescriptor::openai(None);
    settings.anthropic = ProviderDescriptor::anthropic(None);

    let chain = ReviewChain::from_settings(settings).unwrap();
    let request = request();
    let analysis = chain.analyze(&request).await;

    assert_eq!(analysis.source, AnalysisSource::Scanner);
    assert_eq!(analysis.markdown, scan(request.code(), request.language()));
}

#[tokio::test]
async fn test_non_json_success_moves_to_next_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "## Best Practices\nOk"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chain = ReviewChain::from_settings(settings(&server)).unwrap();
    let analysis = chain.analyze(&request()).await;

    assert_eq!(analysis.markdown, "## Best Practices\nOk");
    assert_eq!(analysis.source, AnalysisSource::Provider(ProviderKind::OpenAi));
}

#[test]
fn test_scanner_is_pure() {
    let code = "while True:\n    time.sleep(1)\n    print(secret)";
    assert_eq!(scan(code, Some("Python")), scan(code, Some("Python")));
}

#[test]
fn test_scanner_reports_eval_once() {
    let markdown = scan("eval(a)\neval(b)", None);
    assert_eq!(markdown.matches("Use of eval()").count(), 1);
    assert!(markdown.starts_with("## 🚨 Security Issues"));
}

#[test]
fn test_scanner_clean_code() {
    let markdown = scan("x = 1\ny = x + 2", Some("Python"));
    assert!(markdown.contains("## ✅ Analysis Complete"));
    assert!(!markdown.contains("Security Issues"));
    assert!(!markdown.contains("Code Quality Issues"));
    assert!(!markdown.contains("Suggestions"));
    assert!(markdown.contains("- Language: Python"));
    assert!(markdown.contains("- Code Length: 15 characters"));
    assert!(markdown.contains("- Lines: 2"));
}

#[test]
fn test_scanner_long_code() {
    let code: Vec<String> = (0..150).map(|i| format!("x{i} = {i}")).collect();
    let markdown = scan(&code.join("\n"), None);
    assert!(markdown.contains("## ⚠️ Code Quality Issues"));
    assert!(markdown.contains("(over 100 lines)"));
    assert!(markdown.contains("- Lines: 150"));
}

#[test]
fn test_scanner_language_checks() {
    let markdown = scan("from os import *", Some("Python"));
    assert!(markdown.contains("Avoid 'import *'"));

    let markdown = scan("var x = 1;", Some("JavaScript"));
    assert!(markdown.contains("Use 'const' or 'let' instead of 'var'"));
}

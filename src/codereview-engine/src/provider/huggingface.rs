//! Hosted inference API request body.

use serde::Serialize;

/// Default inference API root.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Model variants tried in order; a loading model defers to the next one.
pub const DEFAULT_MODELS: &[&str] = &["microsoft/DialoGPT-medium", "gpt2", "distilgpt2"];

/// Text-generation request.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub inputs: &'a str,
    pub parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
pub struct InferenceParameters {
    pub max_length: u32,
    pub temperature: f32,
    pub do_sample: bool,
    pub return_full_text: bool,
}

impl<'a> InferenceRequest<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            inputs: prompt,
            parameters: InferenceParameters {
                max_length: 800,
                temperature: 0.7,
                do_sample: true,
                return_full_text: false,
            },
        }
    }
}

/// Endpoint for a model variant.
pub fn model_url(base_url: &str, model: &str) -> String {
    format!("{}/models/{}", base_url.trim_end_matches('/'), model)
}

//! The `analyze` command: review a local file from the terminal.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};
use codereview_engine::ReviewChain;
use codereview_engine::language::detect_language;

use crate::config::ServerConfig;

/// Read code from a file, or from stdin when the path is `-`.
pub fn read_source(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read code from stdin")?;
        return Ok(code);
    }

    std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))
}

/// Review `input` and return the markdown feedback.
///
/// The language defaults to the one detected from the file extension. With
/// `offline` no provider is called.
pub async fn analyze_source(
    config: &ServerConfig,
    input: &Path,
    language: Option<String>,
    offline: bool,
) -> anyhow::Result<String> {
    let code = read_source(input)?;
    if code.trim().is_empty() {
        bail!("Code cannot be empty");
    }

    let language = language
        .filter(|l| !l.trim().is_empty())
        .or_else(|| detect_language(input).map(String::from));

    let chain = if offline {
        ReviewChain::scanner_only()
    } else {
        ReviewChain::from_settings(config.provider_settings())?
    };

    Ok(chain.analyze_markdown(&code, language.as_deref()).await)
}

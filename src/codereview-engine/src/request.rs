//! Analysis request.

use serde::Serialize;

use crate::error::{ProviderError, Result};

/// Code to review plus an optional language hint.
///
/// Immutable once built. The code is guaranteed non-blank; length limits are the
/// caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    code: String,
    language: Option<String>,
}

impl AnalysisRequest {
    /// Build a request, rejecting code that is empty after trimming.
    ///
    /// A blank language hint is treated as absent.
    pub fn new(code: impl Into<String>, language: Option<&str>) -> Result<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "Code cannot be empty".to_string(),
            ));
        }

        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from);

        Ok(Self { code, language })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

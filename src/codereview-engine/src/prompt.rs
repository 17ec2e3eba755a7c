//! Review prompts sent to providers.

use crate::request::AnalysisRequest;

/// System message for chat-style providers that accept one.
pub const SYSTEM_PROMPT: &str = "You are an expert code reviewer and security analyst.";

/// Shape of the prompt a provider expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Plain text-completion models: short instruction, terse output.
    Completion,
    /// Instruction-tuned chat models: more detailed section guidance.
    Chat,
}

const COMPLETION_INSTRUCTIONS: &str = "Provide analysis in markdown format with sections for:
1. Security Vulnerabilities
2. Bugs and Issues
3. Code Quality Suggestions
4. Best Practices

Be concise but thorough.";

const CHAT_INSTRUCTIONS: &str = "Provide a detailed analysis in markdown format covering:
1. **Security Vulnerabilities**: Any security issues found
2. **Bugs and Issues**: Logic errors or potential runtime issues
3. **Code Quality Suggestions**: Suggestions for improvement
4. **Best Practices**: Recommendations for better coding

Be specific and actionable.";

/// Build the review prompt embedding the code in a fenced block.
pub fn build_review_prompt(request: &AnalysisRequest, style: PromptStyle) -> String {
    let subject = request.language().unwrap_or("code");
    let fence_tag = request.language().unwrap_or("text");

    let (headline, instructions) = match style {
        PromptStyle::Completion => (
            format!("Analyze this {subject} for bugs, security issues, and improvements:"),
            COMPLETION_INSTRUCTIONS,
        ),
        PromptStyle::Chat => (
            format!(
                "Analyze this {subject} for bugs, security vulnerabilities, and code quality issues:"
            ),
            CHAT_INSTRUCTIONS,
        ),
    };

    format!(
        "{headline}\n\n```{fence_tag}\n{code}\n```\n\n{instructions}",
        code = request.code()
    )
}

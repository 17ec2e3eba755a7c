//! Markdown rendering of a [`ScanReport`].

use std::fmt;

use super::ScanReport;

const SECURITY_HEADING: &str = "## 🚨 Security Issues";
const QUALITY_HEADING: &str = "## ⚠️ Code Quality Issues";
const SUGGESTIONS_HEADING: &str = "## 💡 Suggestions";

const CLEAN_SECTION: &[&str] = &[
    "## ✅ Analysis Complete",
    "No obvious issues found in this code!",
    "",
    "**Note**: This is a basic rule-based analysis. For comprehensive review, consider:",
    "- Setting up a Hugging Face API token for AI-powered analysis",
    "- Configuring an OpenAI or Anthropic API key for detailed code review",
    "- Running static analysis tools like ESLint, Pylint, or SonarQube",
];

fn push_section(lines: &mut Vec<String>, heading: &str, messages: &[&'static str]) {
    if messages.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    lines.extend(messages.iter().map(|m| format!("- {m}")));
    lines.push(String::new());
}

impl ScanReport {
    /// Render the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::new();

        push_section(&mut lines, SECURITY_HEADING, &self.security);
        push_section(&mut lines, QUALITY_HEADING, &self.quality);
        push_section(&mut lines, SUGGESTIONS_HEADING, &self.suggestions);

        if self.is_clean() {
            lines.extend(CLEAN_SECTION.iter().map(|l| (*l).to_string()));
        }

        lines.push("---".to_string());
        lines.push("**Analysis Info**:".to_string());
        lines.push(format!(
            "- Language: {}",
            self.language.as_deref().unwrap_or("Auto-detected")
        ));
        lines.push(format!("- Code Length: {} characters", self.characters));
        lines.push(format!("- Lines: {}", self.lines));

        lines.join("\n")
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markdown())
    }
}

//! Rule-based code scanner.
//!
//! The last link of the review chain. Matching is plain case-sensitive substring
//! containment over the raw text plus a few counting heuristics; there is no
//! parsing, so false positives (`token` inside an unrelated identifier) and false
//! negatives are expected. The output depends only on the inputs and the static
//! tables in [`rules`].

mod report;
pub mod rules;

use rules::{
    HANDLER_KEYWORDS, LONG_CODE_MESSAGE, LanguageFamily, MAX_LINES, MISSING_ELSE_MESSAGE,
    MISSING_HANDLER_MESSAGE, PERFORMANCE_RULES, PatternRule, QUALITY_RULES, SECURITY_RULES,
};

/// Size of a code snippet as shown in report footers and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMetrics {
    /// Unicode scalar values.
    pub characters: usize,
    /// Segments when splitting on `\n`; never zero.
    pub lines: usize,
}

impl CodeMetrics {
    pub fn of(code: &str) -> Self {
        Self {
            characters: code.chars().count(),
            lines: code.split('\n').count(),
        }
    }
}

/// Findings of one scan, grouped by report section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub security: Vec<&'static str>,
    /// Pattern matches, then structural heuristics, then language warnings.
    pub quality: Vec<&'static str>,
    pub suggestions: Vec<&'static str>,
    pub language: Option<String>,
    /// Unicode scalar values in the code.
    pub characters: usize,
    /// Segments when splitting on `\n`; never zero.
    pub lines: usize,
}

impl ScanReport {
    /// Scan `code` with an optional language hint.
    pub fn new(code: &str, language: Option<&str>) -> Self {
        let language = language.map(str::trim).filter(|l| !l.is_empty());
        let CodeMetrics { characters, lines } = CodeMetrics::of(code);

        let mut quality = matching(QUALITY_RULES, code);
        quality.extend(structural_warnings(code, lines));
        if let Some(family) = language.and_then(LanguageFamily::from_hint) {
            quality.extend(family.warnings(code));
        }

        Self {
            security: matching(SECURITY_RULES, code),
            quality,
            suggestions: matching(PERFORMANCE_RULES, code),
            language: language.map(String::from),
            characters,
            lines,
        }
    }

    /// Whether nothing at all was flagged.
    pub fn is_clean(&self) -> bool {
        self.security.is_empty() && self.quality.is_empty() && self.suggestions.is_empty()
    }
}

/// Scan `code` and render the markdown report.
pub fn scan(code: &str, language: Option<&str>) -> String {
    ScanReport::new(code, language).to_markdown()
}

fn matching(rules: &[PatternRule], code: &str) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| rule.matches(code))
        .map(|rule| rule.message)
        .collect()
}

fn structural_warnings(code: &str, lines: usize) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if lines > MAX_LINES {
        warnings.push(LONG_CODE_MESSAGE);
    }

    if occurrences(code, "if") > occurrences(code, "else") * 2 {
        warnings.push(MISSING_ELSE_MESSAGE);
    }

    let handlers: usize = HANDLER_KEYWORDS
        .iter()
        .map(|keyword| occurrences(code, keyword))
        .sum();
    if occurrences(code, "try") > handlers * 2 {
        warnings.push(MISSING_HANDLER_MESSAGE);
    }

    warnings
}

/// Non-overlapping substring count.
fn occurrences(code: &str, needle: &str) -> usize {
    code.matches(needle).count()
}

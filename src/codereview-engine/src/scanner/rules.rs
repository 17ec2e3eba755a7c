//! Static rule tables for the scanner.

/// Report section a rule contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Security,
    Quality,
    Performance,
}

/// A substring trigger and the message emitted when it occurs in the code.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    /// Case-sensitive substring, matched anywhere in the raw text.
    pub trigger: &'static str,
    pub category: Category,
    pub message: &'static str,
}

impl PatternRule {
    const fn new(trigger: &'static str, category: Category, message: &'static str) -> Self {
        Self {
            trigger,
            category,
            message,
        }
    }

    pub fn matches(&self, code: &str) -> bool {
        code.contains(self.trigger)
    }
}

const fn security(trigger: &'static str, message: &'static str) -> PatternRule {
    PatternRule::new(trigger, Category::Security, message)
}

const fn quality(trigger: &'static str, message: &'static str) -> PatternRule {
    PatternRule::new(trigger, Category::Quality, message)
}

const fn performance(trigger: &'static str, message: &'static str) -> PatternRule {
    PatternRule::new(trigger, Category::Performance, message)
}

pub static SECURITY_RULES: &[PatternRule] = &[
    security(
        "eval(",
        "🚨 **CRITICAL**: Use of eval() is extremely dangerous - allows arbitrary code execution",
    ),
    security(
        "exec(",
        "🚨 **CRITICAL**: Use of exec() is extremely dangerous - allows arbitrary code execution",
    ),
    security(
        "subprocess.call",
        "⚠️ **Security**: Be careful with subprocess calls - validate all inputs",
    ),
    security(
        "os.system",
        "⚠️ **Security**: os.system() is dangerous - use subprocess with proper arguments",
    ),
    security(
        "input(",
        "⚠️ **Security**: Validate user input to prevent injection attacks",
    ),
    security(
        "raw_input(",
        "⚠️ **Security**: Validate user input to prevent injection attacks",
    ),
    security(
        "document.write",
        "⚠️ **Security**: Avoid document.write() - can lead to XSS attacks",
    ),
    security(
        "innerHTML",
        "⚠️ **Security**: Be careful with innerHTML - validate content to prevent XSS",
    ),
    security(
        "innerText",
        "⚠️ **Security**: Be careful with innerText - validate content",
    ),
    security(
        "localStorage",
        "⚠️ **Security**: Don't store sensitive data in localStorage",
    ),
    security(
        "sessionStorage",
        "⚠️ **Security**: Don't store sensitive data in sessionStorage",
    ),
    security(
        "password",
        "🔒 **Security**: Ensure passwords are properly hashed and not logged",
    ),
    security(
        "secret",
        "🔒 **Security**: Check for hardcoded secrets or API keys",
    ),
    security("api_key", "🔒 **Security**: Check for hardcoded API keys"),
    security("token", "🔒 **Security**: Check for hardcoded tokens"),
];

pub static QUALITY_RULES: &[PatternRule] = &[
    quality(
        "TODO",
        "📝 **Code Quality**: TODO comment found - implement or remove",
    ),
    quality(
        "FIXME",
        "🔧 **Code Quality**: FIXME comment found - fix the issue",
    ),
    quality(
        "HACK",
        "🔧 **Code Quality**: HACK comment found - refactor this code",
    ),
    quality(
        "console.log",
        "🧹 **Code Quality**: Remove console.log statements in production",
    ),
    quality(
        "print(",
        "🧹 **Code Quality**: Remove print statements in production",
    ),
    quality(
        "debugger",
        "🧹 **Code Quality**: Remove debugger statements in production",
    ),
];

pub static PERFORMANCE_RULES: &[PatternRule] = &[
    performance(
        "for i in range",
        "⚡ **Performance**: Consider using list comprehension or generator",
    ),
    performance(
        "while True",
        "⚡ **Performance**: Ensure while True loops have proper exit conditions",
    ),
    performance(
        "sleep(",
        "⚡ **Performance**: Avoid sleep() in production code",
    ),
    performance(
        "time.sleep",
        "⚡ **Performance**: Avoid time.sleep() in production code",
    ),
];

/// Lines above which the code is flagged as too long.
pub const MAX_LINES: usize = 100;

pub const LONG_CODE_MESSAGE: &str =
    "📏 **Code Quality**: Consider breaking this into smaller functions (over 100 lines)";
pub const MISSING_ELSE_MESSAGE: &str =
    "🔍 **Code Quality**: Consider adding else clauses for better error handling";
pub const MISSING_HANDLER_MESSAGE: &str =
    "🛡️ **Code Quality**: Ensure all try blocks have proper except handlers";

/// Keywords counted as error handlers when balancing `try`.
pub const HANDLER_KEYWORDS: &[&str] = &["except", "catch"];

pub const PYTHON_WILDCARD_IMPORT: &str =
    "🐍 **Python**: Avoid 'import *' - import specific modules";
pub const PYTHON_INIT_WITHOUT_SELF: &str =
    "🐍 **Python**: Check if __init__ method properly initializes instance variables";
pub const JS_VAR_DECLARATION: &str = "🟨 **JavaScript**: Use 'const' or 'let' instead of 'var'";
pub const JS_LOOSE_EQUALITY: &str =
    "🟨 **JavaScript**: Use strict equality (===) instead of loose equality (==)";

/// Languages with extra checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    Python,
    JavaScript,
}

impl LanguageFamily {
    /// Match a language hint case-insensitively.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_ascii_lowercase().as_str() {
            "python" => Some(Self::Python),
            "javascript" | "typescript" => Some(Self::JavaScript),
            _ => None,
        }
    }

    /// Warnings specific to this family, in a fixed order.
    pub fn warnings(&self, code: &str) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        match self {
            Self::Python => {
                if code.contains("import *") {
                    warnings.push(PYTHON_WILDCARD_IMPORT);
                }
                if code.contains("__init__") && !code.contains("self.") {
                    warnings.push(PYTHON_INIT_WITHOUT_SELF);
                }
            }
            Self::JavaScript => {
                if code.contains("var ") {
                    warnings.push(JS_VAR_DECLARATION);
                }
                if code.contains("==") && !code.contains("===") {
                    warnings.push(JS_LOOSE_EQUALITY);
                }
            }
        }
        warnings
    }
}

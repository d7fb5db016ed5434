//! Compiled regex patterns and CSS selectors for locating and normalizing content.
//!
//! All patterns are compiled once using `LazyLock`. Patterns are grouped by the
//! stage of the pipeline that uses them.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Page Structure Selectors
// =============================================================================

/// Anything the host page renders as a clickable control.
pub const BUTTONS: &str = r#"button, [role="button"]"#;

/// Refresh control identified by its accessible label.
pub const REFRESH_BY_LABEL: &str = r#"button[aria-label="Refresh chat messages"]"#;

/// Refresh control identified by its class.
pub const REFRESH_BY_CLASS: &str = "button.refresh-button";

/// Attribute carried by the injected export control.
pub const INJECTED_MARKER_ATTR: &str = "data-nlm-export-toolbar";

/// Id of the injected export control.
pub const INJECTED_BUTTON_ID: &str = "nlm-toolbar-export";

/// Message-list-shaped regions, in priority order.
pub const CHAT_CONTAINERS: [&str; 4] = [
    r#"[role="feed"]"#,
    r#"[role="log"]"#,
    r#"[role="list"]"#,
    "[aria-live]",
];

/// Message-like items inside a chat region, grouped into tiers tried in order.
pub const CHAT_ITEM_TIERS: [&str; 4] = [
    "nlm-conversation-turn, mat-card",
    r#"[role="listitem"]"#,
    r#"[data-testid*="message"], [data-test-id*="message"], [data-testid*="conversation"], [data-test-id*="conversation"]"#,
    "article",
];

/// Note-shaped elements used when no chat region can be found.
pub const NOTES_FALLBACK: [&str; 5] = [
    r#"[data-testid*="note"]"#,
    r#"[data-test-id*="note"]"#,
    r#"[class*="note"] article"#,
    r#"[role="list"] [role="listitem"]"#,
    "article",
];

/// Elements that can execute code or embed another document.
pub const EXECUTABLE_ELEMENTS: &str = "script, iframe, object, embed";

/// Elements that mark explicit citation references.
pub const CITATION_MARKERS: &str = concat!(
    "sup, ",
    r##"a[href^="#cite"], "##,
    "a[data-reference-id], span[data-reference-id], button[data-reference-id], ",
    r#"[role="doc-noteref"], [role="doc-footnote"]"#,
);

/// Containers checked by the citation heuristics.
pub const CITATION_CANDIDATES: &str = "span, div, button";

/// Leaf elements that may hold undelimited LaTeX.
pub const BARE_LATEX_CANDIDATES: &str = "p, span, li, div";

// =============================================================================
// Sanitizer Patterns
// =============================================================================

/// Inline event handler attributes (`onclick`, `ONLOAD`, ...).
pub static EVENT_HANDLER_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^on").expect("EVENT_HANDLER_ATTR regex"));

/// Framework bookkeeping attributes (`_ngcontent-*`, `ng-reflect-*`, `ng-version`).
pub static FRAMEWORK_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_?ng").expect("FRAMEWORK_ATTR regex"));

// =============================================================================
// Text Patterns
// =============================================================================

/// Any markup tag.
pub static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("TAG regex"));

/// Blank line separating paragraphs in plain text.
pub static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("BLANK_LINE regex"));

/// Single line break inside a paragraph.
pub static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("LINE_BREAK regex"));

/// Runs of whitespace.
pub static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE regex"));

/// Characters dropped from generated file names.
pub static FILE_NAME_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").expect("FILE_NAME_UNSAFE regex"));

// =============================================================================
// Normalizer Patterns
// =============================================================================

/// A paragraph consisting only of a horizontal divider.
pub static DIVIDER_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_]{3,}$").expect("DIVIDER_TEXT regex"));

/// Class names or labels marking citation UI.
pub static CITATION_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)reference|citation|footnote|source").expect("CITATION_HINT regex")
});

/// A bare citation number.
pub static CITATION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}$").expect("CITATION_NUMBER regex"));

/// `\text{$$ 12}` style wrapper carrying a stray footnote number.
pub static LATEX_FOOTNOTE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\text\s*\{\s*\\?\$\$\s*[0-9]+\s*(?:\\text\s*\{[^}]*\}\s*)?\}")
        .expect("LATEX_FOOTNOTE_BLOCK regex")
});

/// `\text{$$}` with nothing inside.
pub static LATEX_EMPTY_DISPLAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\text\s*\{\s*\\?\$\$\s*\}").expect("LATEX_EMPTY_DISPLAY regex")
});

/// Wrapper-opened display math.
pub static LATEX_DISPLAY_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\text\s*\{\s*\\?\$\$").expect("LATEX_DISPLAY_OPEN regex")
});

/// Wrapper-closed display math.
pub static LATEX_DISPLAY_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?\$\$\s*\}").expect("LATEX_DISPLAY_CLOSE regex"));

/// Wrapper-opened inline math.
pub static LATEX_INLINE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\text\s*\{\s*\\?\$").expect("LATEX_INLINE_OPEN regex")
});

/// Wrapper-closed inline math.
pub static LATEX_INLINE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?\$\s*\}").expect("LATEX_INLINE_CLOSE regex"));

/// Display math whose close marker is followed by a stray citation number and brace.
pub static LATEX_DISPLAY_CITED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$([^$]+?)\${1,2}[0-9]{1,3}\s*\}").expect("LATEX_DISPLAY_CITED regex")
});

/// Inline math whose close marker is followed by a stray citation number and brace.
pub static LATEX_INLINE_CITED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^$])\$([^$]+?)\$[0-9]{1,3}\s*\}").expect("LATEX_INLINE_CITED regex")
});

/// Display close marker directly followed by a citation number and brace.
pub static LATEX_DISPLAY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$[0-9]{1,3}\s*\}").expect("LATEX_DISPLAY_NUMBER regex"));

/// Inline close marker directly followed by a citation number and brace.
pub static LATEX_INLINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[0-9]{1,3}\s*\}").expect("LATEX_INLINE_NUMBER regex"));

/// Any remaining `\text{...}` wrapper.
pub static LATEX_TEXT_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\text\s*\{([^}]*)\}").expect("LATEX_TEXT_WRAPPER regex"));

/// Text already delimited as display math.
pub static WRAPPED_DISPLAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\$[\s\S]*\$\$$").expect("WRAPPED_DISPLAY regex"));

/// Text opening with inline math.
pub static WRAPPED_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$[\s\S]*\$").expect("WRAPPED_INLINE regex"));

/// Commands that force display mode when promoting bare LaTeX.
pub static DISPLAY_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(begin|displaystyle|int|sum|prod|frac|cases|align|array)")
        .expect("DISPLAY_COMMAND regex")
});

/// Display math followed by a stray citation number.
pub static DISPLAY_CITED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\$\$[^$]+\$\$)[ \t]*[0-9]{1,3}\b").expect("DISPLAY_CITED regex")
});

/// A text node that is exactly one display math expression.
pub static DISPLAY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\$\$[\s\S]*\$\$\s*$").expect("DISPLAY_BLOCK regex"));

/// LaTeX command names that mark text as mathematical.
pub const LATEX_COMMANDS: [&str; 39] = [
    r"\frac",
    r"\sqrt",
    r"\int",
    r"\sum",
    r"\prod",
    r"\displaystyle",
    r"\over",
    r"\binom",
    r"\lim",
    r"\log",
    r"\ln",
    r"\exp",
    r"\sin",
    r"\cos",
    r"\tan",
    r"\theta",
    r"\phi",
    r"\pi",
    r"\Gamma",
    r"\beta",
    r"\alpha",
    r"\gamma",
    r"\lambda",
    r"\sigma",
    r"\rho",
    r"\mu",
    r"\nu",
    r"\omega",
    r"\cdot",
    r"\times",
    r"\leq",
    r"\geq",
    r"\neq",
    r"\approx",
    r"\rightarrow",
    r"\mapsto",
    r"\begin{cases}",
    r"\begin{align",
    r"\begin{array",
];

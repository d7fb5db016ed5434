//! Print surface preparation.
//!
//! Turns a hand-off payload into what the print page shows: a title, a meta
//! line, the cleaned body and the math renderer configuration.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::markup::escape_html;
use crate::patterns::{FILE_NAME_UNSAFE, WHITESPACE};
use crate::result::{ExportPayload, MathDelimiter};

/// Title used when the page had none.
pub const DEFAULT_TITLE: &str = "NotebookLM Export";

/// Elements the math renderer must not look into.
pub const MATH_IGNORED_TAGS: [&str; 6] = ["script", "noscript", "style", "textarea", "pre", "code"];

/// Math renderer settings. Rendering never throws and accepts any macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MathRenderConfig {
    pub delimiters: Vec<MathDelimiter>,
    pub throw_on_error: bool,
    pub strict: bool,
    pub trust: bool,
    pub ignored_tags: Vec<String>,
}

impl MathRenderConfig {
    /// Lenient settings for the given delimiters (defaults when empty).
    #[must_use]
    pub fn lenient(delimiters: &[MathDelimiter]) -> Self {
        let delimiters = if delimiters.is_empty() {
            MathDelimiter::defaults()
        } else {
            delimiters.to_vec()
        };
        Self {
            delimiters,
            throw_on_error: false,
            strict: false,
            trust: true,
            ignored_tags: MATH_IGNORED_TAGS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Everything the print page displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDocument {
    pub title: String,
    /// `<local timestamp> • <url>`.
    pub meta: String,
    /// Sanitized and normalized markup.
    pub body_html: String,
    pub math: MathRenderConfig,
    /// Suggested name for the saved PDF.
    pub file_name: String,
}

impl RenderDocument {
    /// A standalone page for printing.
    #[must_use]
    pub fn to_html(&self) -> String {
        let title = escape_html(&self.title);
        format!(
            concat!(
                "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>",
                "<body><header><h1 id=\"doc-title\">{title}</h1>",
                "<div id=\"doc-meta\">{meta}</div></header>",
                "<main id=\"content\">{body}</main></body></html>",
            ),
            title = title,
            meta = escape_html(&self.meta),
            body = self.body_html,
        )
    }
}

/// `<title>_<YYYYMMDDHHMMSS>.pdf`, with whitespace runs turned into `_` and
/// anything outside `[A-Za-z0-9_-]` dropped. The stamp is UTC.
#[must_use]
pub fn make_file_name(title: &str, now: DateTime<Utc>) -> String {
    let title = if title.is_empty() { DEFAULT_TITLE } else { title };
    let base = WHITESPACE.replace_all(title, "_");
    let base = FILE_NAME_UNSAFE.replace_all(&base, "");
    format!("{base}_{}.pdf", now.format("%Y%m%d%H%M%S"))
}

/// Build the print page content for `payload` as of `now`.
#[must_use]
pub fn prepare(payload: &ExportPayload, now: DateTime<Utc>) -> RenderDocument {
    let title = if payload.title.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        payload.title.clone()
    };
    let stamp = now.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");

    RenderDocument {
        meta: format!("{stamp} • {}", payload.url),
        body_html: crate::clean_markup(&payload.html),
        math: MathRenderConfig::lenient(&payload.math_delimiters),
        file_name: make_file_name(&title, now),
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 9).single().expect("valid time")
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            make_file_name("My  Notes: Q&A / 2024", at_noon()),
            "My_Notes_QA__2024_20240305123009.pdf"
        );
        assert_eq!(
            make_file_name("", at_noon()),
            "NotebookLM_Export_20240305123009.pdf"
        );
    }

    #[test]
    fn test_prepare_defaults() {
        let payload = ExportPayload {
            html: r#"<p onclick="x()">Hi<sup>1</sup></p><script>bad()</script>"#.to_string(),
            url: "https://notebooklm.google.com/notebook/1".to_string(),
            ..ExportPayload::default()
        };
        let doc = prepare(&payload, at_noon());

        assert_eq!(doc.title, DEFAULT_TITLE);
        assert!(doc.meta.ends_with(" • https://notebooklm.google.com/notebook/1"));
        assert_eq!(doc.body_html, "<p>Hi </p>");
        assert_eq!(doc.math.delimiters, MathDelimiter::defaults());
        assert!(!doc.math.throw_on_error);
        assert_eq!(doc.file_name, "NotebookLM_Export_20240305123009.pdf");
    }

    #[test]
    fn test_prepare_keeps_chosen_delimiters() {
        let payload = ExportPayload {
            html: "<p>x</p>".to_string(),
            title: "Chat".to_string(),
            math_delimiters: MathDelimiter::configured(false),
            ..ExportPayload::default()
        };
        let doc = prepare(&payload, at_noon());
        assert_eq!(doc.math.delimiters.len(), 3);
        assert_eq!(doc.title, "Chat");
    }

    #[test]
    fn test_to_html_escapes_title() {
        let payload = ExportPayload {
            html: "<p>body</p>".to_string(),
            title: "A <b> title".to_string(),
            ..ExportPayload::default()
        };
        let html = prepare(&payload, at_noon()).to_html();
        assert!(html.contains("<title>A &lt;b&gt; title</title>"));
        assert!(html.contains(r#"<main id="content"><p>body</p></main>"#));
    }
}

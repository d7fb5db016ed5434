//! Result types for extraction output.
//!
//! This module defines what an export produces: the located markup with the
//! strategy that found it, and the payload handed to the rendering surface.

use serde::{Deserialize, Serialize};

/// Which step of the extraction chain produced the markup.
///
/// Diagnostic only; nothing downstream branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStrategy {
    /// The user's active text selection.
    Selection,
    /// A chat area found through the toolbar and panel locator.
    LocatedRegion,
    /// The area remembered from an earlier locate.
    CachedRegion,
    /// Plain text copied by the host's own "copy chat" control.
    Clipboard,
    /// Note-shaped elements.
    Notes,
    /// Whatever the main, body or document element holds.
    RawDump,
}

impl SourceStrategy {
    /// Short lowercase name used in log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::LocatedRegion => "located_region",
            Self::CachedRegion => "cached_region",
            Self::Clipboard => "clipboard",
            Self::Notes => "notes",
            Self::RawDump => "raw_dump",
        }
    }
}

/// Markup produced by one strategy of the extraction chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Raw (unsanitized) markup.
    pub html: String,

    /// Strategy that produced `html`.
    pub source: SourceStrategy,
}

/// A math delimiter pair handed to the math renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathDelimiter {
    /// Opening marker.
    pub left: String,

    /// Closing marker.
    pub right: String,

    /// Render as a display block instead of inline.
    pub display: bool,
}

impl MathDelimiter {
    fn new(left: &str, right: &str, display: bool) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            display,
        }
    }

    /// The default ordered delimiter list.
    ///
    /// `$$…$$` and `\[…\]` render as display math, `\(…\)` and `$…$` inline.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        Self::configured(true)
    }

    /// Delimiters with the bare `$…$` pair included only when requested.
    ///
    /// The bare dollar pair always comes last so that `$$` is tried first.
    #[must_use]
    pub fn configured(include_inline_dollar: bool) -> Vec<Self> {
        let mut delimiters = vec![
            Self::new("$$", "$$", true),
            Self::new(r"\[", r"\]", true),
            Self::new(r"\(", r"\)", false),
        ];
        if include_inline_dollar {
            delimiters.push(Self::new("$", "$", false));
        }
        delimiters
    }
}

/// Everything the rendering surface needs to produce a document.
///
/// Missing fields deserialize to empty values; an empty delimiter list means
/// "use the defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportPayload {
    /// Sanitized and normalized markup.
    pub html: String,

    /// Page title.
    pub title: String,

    /// Page location.
    pub url: String,

    /// Delimiters to configure the math renderer with.
    pub math_delimiters: Vec<MathDelimiter>,
}

/// What a cross-context collect request should consider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Full fallback chain (without the clipboard step).
    #[default]
    Auto,
    /// Only the active selection.
    Selection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delimiters_order() {
        let delimiters = MathDelimiter::defaults();
        let lefts: Vec<&str> = delimiters.iter().map(|d| d.left.as_str()).collect();
        assert_eq!(lefts, vec!["$$", r"\[", r"\(", "$"]);
        assert!(delimiters[0].display);
        assert!(delimiters[1].display);
        assert!(!delimiters[2].display);
        assert!(!delimiters[3].display);
    }

    #[test]
    fn test_configured_without_dollar() {
        let delimiters = MathDelimiter::configured(false);
        assert_eq!(delimiters.len(), 3);
        assert!(delimiters.iter().all(|d| d.left != "$"));
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = ExportPayload {
            html: "<p>x</p>".to_string(),
            title: "T".to_string(),
            url: "https://example.com/".to_string(),
            math_delimiters: MathDelimiter::configured(false),
        };
        let json = serde_json::to_value(&payload).expect("serialize");
        assert!(json.get("mathDelimiters").is_some());
        assert_eq!(json["mathDelimiters"][0]["left"], "$$");
        assert_eq!(json["mathDelimiters"][0]["display"], true);
    }

    #[test]
    fn test_payload_tolerates_missing_fields() {
        let payload: ExportPayload =
            serde_json::from_str(r#"{"ok": true, "html": "<p>x</p>"}"#).expect("parse");
        assert_eq!(payload.html, "<p>x</p>");
        assert!(payload.title.is_empty());
        assert!(payload.math_delimiters.is_empty());
    }

    #[test]
    fn test_export_mode_wire_names() {
        let mode: ExportMode = serde_json::from_str("\"selection\"").expect("parse");
        assert_eq!(mode, ExportMode::Selection);
        assert_eq!(ExportMode::default(), ExportMode::Auto);
    }
}

//! Small text and markup helpers shared across the pipeline.

use crate::dom;
use crate::patterns::{BLANK_LINE, LINE_BREAK, TAG, WHITESPACE};

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode entities that survived one round of parsing (double-escaped text).
///
/// Returns the input unchanged when it contains no `&`.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let doc = dom::parse(&format!("<textarea>{text}</textarea>"));
    dom::text_content(&doc.select("textarea")).to_string()
}

/// Convert plain text into escaped paragraphs.
///
/// Blocks are separated by blank lines; single line breaks inside a block
/// become `<br>`. Blank blocks are dropped.
///
/// ```rust
/// use nlm_export::markup::text_to_paragraphs;
///
/// assert_eq!(
///     text_to_paragraphs("Para one.\n\nPara two."),
///     "<p>Para one.</p><p>Para two.</p>"
/// );
/// ```
#[must_use]
pub fn text_to_paragraphs(text: &str) -> String {
    BLANK_LINE
        .split(text.trim())
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            let escaped = escape_html(block);
            format!("<p>{}</p>", LINE_BREAK.replace_all(&escaped, "<br>"))
        })
        .collect()
}

/// Count characters that are not whitespace.
#[must_use]
pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// True when the string has anything besides whitespace.
#[inline]
#[must_use]
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// True when markup still has text once tags and whitespace are stripped.
///
/// ```rust
/// use nlm_export::markup::has_text;
///
/// assert!(!has_text("<div>   </div>"));
/// assert!(has_text("<div>x</div>"));
/// ```
#[must_use]
pub fn has_text(html: &str) -> bool {
    !is_blank(&TAG.replace_all(html, ""))
}

/// Collapse whitespace, trim and lowercase, for comparing control labels.
#[must_use]
pub fn normalize_label(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_text_to_paragraphs_splits_blank_lines() {
        assert_eq!(
            text_to_paragraphs("Para one.\n\nPara two."),
            "<p>Para one.</p><p>Para two.</p>"
        );
    }

    #[test]
    fn test_text_to_paragraphs_keeps_line_breaks() {
        assert_eq!(
            text_to_paragraphs("line 1\r\nline 2\r\n\r\n<b>"),
            "<p>line 1<br>line 2</p><p>&lt;b&gt;</p>"
        );
    }

    #[test]
    fn test_text_to_paragraphs_drops_blank_blocks() {
        assert_eq!(text_to_paragraphs("  a \n\n \n\n b"), "<p>a</p><p>b</p>");
        assert_eq!(text_to_paragraphs("   "), "");
    }

    #[test]
    fn test_has_text_boundary() {
        assert!(!has_text(""));
        assert!(!has_text("<div>   </div>"));
        assert!(!has_text("<div>\n<br>\t</div>"));
        assert!(has_text("<div>x</div>"));
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Copy \n  Chat "), "copy chat");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt; b"), "a < b");
        assert_eq!(decode_entities("no entities"), "no entities");
    }

    #[test]
    fn test_non_whitespace_len() {
        assert_eq!(non_whitespace_len(" a b\n c "), 3);
    }
}

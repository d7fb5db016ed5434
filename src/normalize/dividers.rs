//! Divider paragraphs.

use crate::dom::{self, Selection};
use crate::patterns::DIVIDER_TEXT;
use crate::Options;

/// Replacement for a divider paragraph.
pub const DIVIDER_HTML: &str = r#"<hr class="nlm-divider">"#;

/// Replace `<p>` elements holding only `---` or `___` (three or more marks)
/// with a horizontal rule.
pub fn convert(root: &Selection, _options: &Options) {
    for p in root.select("p").nodes() {
        if dom::has_element_children(p) {
            continue;
        }
        let text = dom::node_text(p);
        if DIVIDER_TEXT.is_match(text.trim()) {
            dom::replace_with_html(p, DIVIDER_HTML);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::apply_pass;

    #[test]
    fn test_dash_paragraph_becomes_rule() {
        assert_eq!(
            apply_pass("<p>Intro</p><p> --- </p><p>Next</p>", convert),
            r#"<p>Intro</p><hr class="nlm-divider"><p>Next</p>"#
        );
    }

    #[test]
    fn test_underscores() {
        assert_eq!(apply_pass("<p>_____</p>", convert), DIVIDER_HTML);
    }

    #[test]
    fn test_short_or_mixed_kept() {
        let html = "<p>--</p><p>-- x --</p><p><b>---</b></p>";
        assert_eq!(apply_pass(html, convert), html);
    }
}

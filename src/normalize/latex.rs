//! Repair of `\text{…}` wrappers left around math by the chat renderer.
//!
//! Only text nodes containing `\text` are touched.

use std::borrow::Cow;

use regex::Captures;

use crate::dom::{self, Selection};
use crate::patterns::{
    LATEX_DISPLAY_CITED, LATEX_DISPLAY_CLOSE, LATEX_DISPLAY_NUMBER, LATEX_DISPLAY_OPEN,
    LATEX_EMPTY_DISPLAY, LATEX_FOOTNOTE_BLOCK, LATEX_INLINE_CITED, LATEX_INLINE_CLOSE,
    LATEX_INLINE_NUMBER, LATEX_INLINE_OPEN, LATEX_TEXT_WRAPPER,
};
use crate::Options;

const WRAPPER: &str = r"\text";

/// One round of every rewrite, in order. Each replacement shortens the text.
fn repair_round(text: &str) -> String {
    let out = LATEX_FOOTNOTE_BLOCK.replace_all(text, "");
    let out = LATEX_EMPTY_DISPLAY.replace_all(&out, "");
    let out = LATEX_DISPLAY_OPEN.replace_all(&out, "$$$$");
    let out = LATEX_DISPLAY_CLOSE.replace_all(&out, "$$$$");
    let out = LATEX_INLINE_OPEN.replace_all(&out, "$$");
    let out = LATEX_INLINE_CLOSE.replace_all(&out, "$$");
    let out = LATEX_DISPLAY_CITED.replace_all(&out, |caps: &Captures| format!("$${}$$", &caps[1]));
    let out = LATEX_INLINE_CITED.replace_all(&out, |caps: &Captures| {
        format!("{}${}$", &caps[1], &caps[2])
    });
    let out = LATEX_DISPLAY_NUMBER.replace_all(&out, "$$$$");
    let out = LATEX_INLINE_NUMBER.replace_all(&out, "$$");
    LATEX_TEXT_WRAPPER.replace_all(&out, "${1}").into_owned()
}

/// Rewrite one text value. Returns the input borrowed when nothing changed.
///
/// Rounds repeat while a wrapper is left and the last round changed
/// something, so nested wrappers come off in a single call.
#[must_use]
pub fn repair_text(text: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(text);
    while current.contains(WRAPPER) {
        let next = repair_round(&current);
        if next == *current {
            break;
        }
        current = Cow::Owned(next);
    }
    current
}

/// Repair wrapper artifacts in every text node under `root`.
pub fn repair(root: &Selection, _options: &Options) {
    for node in root.nodes() {
        for text_node in dom::text_descendants(node) {
            let text = dom::node_text(&text_node);
            if let Cow::Owned(fixed) = repair_text(&text) {
                dom::set_node_text(&text_node, &fixed);
            }
        }
    }
}

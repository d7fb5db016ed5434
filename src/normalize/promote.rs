//! Promotion of undelimited LaTeX to renderable math.

use crate::dom::{self, NodeRef, Selection};
use crate::markup::decode_entities;
use crate::patterns::{
    BARE_LATEX_CANDIDATES, DISPLAY_COMMAND, LATEX_COMMANDS, WRAPPED_DISPLAY, WRAPPED_INLINE,
};
use crate::Options;

/// True inside (or on) an already-rendered formula.
fn in_rendered_math(node: &NodeRef) -> bool {
    let rendered = |n: &NodeRef| dom::matches(n, ".katex") || dom::has_tag(n, &["math"]);
    rendered(node) || node.ancestors_it(None).any(|a| rendered(&a))
}

/// True when the text uses the LaTeX vocabulary.
#[must_use]
pub fn looks_like_latex(text: &str) -> bool {
    text.contains('\\') && LATEX_COMMANDS.iter().any(|cmd| text.contains(cmd))
}

/// Delimit `text` as math if it is bare LaTeX, choosing display mode for
/// block commands, explicit line breaks or long expressions.
///
/// Returns `None` when the text is not bare LaTeX.
#[must_use]
pub fn delimit(text: &str, options: &Options) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || !looks_like_latex(text) {
        return None;
    }
    let text = decode_entities(text);
    if WRAPPED_DISPLAY.is_match(&text) || WRAPPED_INLINE.is_match(&text) {
        return None;
    }
    let display = DISPLAY_COMMAND.is_match(&text)
        || text.contains(r"\\")
        || text.chars().count() > options.display_math_min_len;
    Some(if display {
        format!("$${text}$$")
    } else {
        format!("${text}$")
    })
}

/// Wrap bare LaTeX in leaf `p`, `span`, `li` and `div` elements with math
/// delimiters. Rendered formulas are left alone.
pub fn promote(root: &Selection, options: &Options) {
    for node in root.select(BARE_LATEX_CANDIDATES).nodes() {
        if dom::has_element_children(node) || in_rendered_math(node) {
            continue;
        }
        if let Some(math) = delimit(&dom::node_text(node), options) {
            dom::set_node_text(node, &math);
        }
    }
}

//! Citation marker removal.
//!
//! Chat answers carry numbered source chips (`<sup>3</sup>`, reference
//! buttons, footnote roles). They are meaningless on paper, so they are
//! removed while keeping the surrounding words apart.

use std::collections::HashSet;

use crate::dom::{self, NodeId, NodeRef, Selection};
use crate::patterns::{CITATION_CANDIDATES, CITATION_HINT, CITATION_MARKERS, CITATION_NUMBER};
use crate::Options;

/// True when a span/div/button looks like citation UI.
fn is_citation_like(node: &NodeRef) -> bool {
    let class = dom::get_attribute(node, "class").unwrap_or_default();
    let label = dom::get_attribute(node, "aria-label")
        .filter(|l| !l.is_empty())
        .or_else(|| dom::get_attribute(node, "title"))
        .unwrap_or_default();
    if CITATION_HINT.is_match(&class) || CITATION_HINT.is_match(&label) {
        return true;
    }
    let text = dom::node_text(node);
    let text = text.trim();
    !text.is_empty() && CITATION_NUMBER.is_match(text)
}

/// Citation nodes under `root`, explicit markers first, without duplicates.
fn citation_nodes<'a>(root: &Selection<'a>) -> Vec<NodeRef<'a>> {
    let mut seen = HashSet::new();
    let mut queue = Vec::new();

    for node in root.select(CITATION_MARKERS).nodes() {
        if seen.insert(node.id) {
            queue.push(*node);
        }
    }
    for node in root.select(CITATION_CANDIDATES).nodes() {
        if !seen.contains(&node.id) && is_citation_like(node) {
            seen.insert(node.id);
            queue.push(*node);
        }
    }
    queue
}

/// Remove a node, leaving one space behind unless a neighbouring text node
/// already supplies it.
fn remove_keeping_space(node: &NodeRef) {
    let prev = dom::prev_text_sibling(node);
    let prev_text = prev.as_ref().map(dom::node_text);
    let next_starts_with_space = dom::next_text_sibling(node)
        .map(|n| dom::node_text(&n))
        .is_some_and(|t| t.starts_with(char::is_whitespace));
    let prev_ends_with_space = prev_text
        .as_deref()
        .is_some_and(|t| t.ends_with(char::is_whitespace));

    if !prev_ends_with_space && !next_starts_with_space {
        match (prev, prev_text) {
            (Some(prev), Some(text)) => dom::set_node_text(&prev, &format!("{text} ")),
            _ => dom::insert_text_before(node, " "),
        }
    }
    dom::remove(node);
}

/// Remove citation markers under `root`.
///
/// Targets `sup`, `#cite` anchors, `data-reference-id` controls, footnote
/// roles, and any `span`/`div`/`button` whose class or label mentions a
/// reference, citation, footnote or source, or whose text is a bare 1-3 digit
/// number.
///
/// Removing a marker can leave its container holding a bare number, so
/// rounds repeat until one finds nothing.
pub fn remove(root: &Selection, _options: &Options) {
    loop {
        let queue = citation_nodes(root);
        if queue.is_empty() {
            break;
        }
        let mut removed: HashSet<NodeId> = HashSet::new();
        for node in &queue {
            if !node.ancestors_it(None).any(|a| removed.contains(&a.id)) {
                remove_keeping_space(node);
            }
            removed.insert(node.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::apply_pass;

    #[test]
    fn test_sup_followed_by_space() {
        assert_eq!(
            apply_pass("<p>Result<sup>12</sup> shown</p>", remove),
            "<p>Result shown</p>"
        );
    }

    #[test]
    fn test_space_appended_to_previous_text() {
        assert_eq!(
            apply_pass("<p>alpha<sup>1</sup>beta</p>", remove),
            "<p>alpha beta</p>"
        );
    }

    #[test]
    fn test_no_double_space() {
        assert_eq!(
            apply_pass("<p>alpha <sup>1</sup>beta</p>", remove),
            "<p>alpha beta</p>"
        );
    }

    #[test]
    fn test_space_inserted_without_text_before() {
        assert_eq!(
            apply_pass("<p><b>bold</b><button data-reference-id=\"r\">2</button>next</p>", remove),
            "<p><b>bold</b> next</p>"
        );
    }

    #[test]
    fn test_heuristic_candidates() {
        let html = concat!(
            r#"<p>a<span class="Citation-chip">x</span> "#,
            r#"b<button aria-label="Open source">go</button> "#,
            r#"c<span title="Footnote">*</span> "#,
            r#"d<span>7</span> e</p>"#,
        );
        assert_eq!(apply_pass(html, remove), "<p>a b c d e</p>");
    }

    #[test]
    fn test_roles_and_cite_links() {
        let html = concat!(
            r##"<p>x<a href="#cite-1">[1]</a> y"##,
            r#"<span role="doc-noteref">n</span> z</p>"#,
        );
        assert_eq!(apply_pass(html, remove), "<p>x y z</p>");
    }

    #[test]
    fn test_nested_marker_removed_once() {
        assert_eq!(
            apply_pass(r#"<p>w<span class="source"><sup>4</sup></span> v</p>"#, remove),
            "<p>w v</p>"
        );
    }

    #[test]
    fn test_container_left_with_bare_number_removed_too() {
        let once = apply_pass("<p>a <span>12<sup>345</sup></span>b</p>", remove);
        assert_eq!(once, "<p>a b</p>");
        assert_eq!(apply_pass(&once, remove), once);
    }

    #[test]
    fn test_ordinary_markup_kept() {
        let html = "<p>Year <span>2024</span> and <a href=\"/x\">link</a></p>";
        assert_eq!(apply_pass(html, remove), html);
    }
}

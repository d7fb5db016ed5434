//! Standalone display math gets a block of its own.

use crate::dom::{self, NodeRef, Selection};
use crate::markup::escape_html;
use crate::patterns::{DISPLAY_BLOCK, DISPLAY_CITED};
use crate::Options;

/// Class of the generated block.
pub const MATH_BLOCK_CLASS: &str = "math-block";

fn already_wrapped(parent: &NodeRef) -> bool {
    let classes = dom::class_list(parent);
    classes
        .iter()
        .any(|c| c == "katex-display" || c == MATH_BLOCK_CLASS)
}

/// Where a display expression goes once wrapped.
enum Placement<'a> {
    /// Replace the text node where it stands.
    InPlace(NodeRef<'a>),
    /// Split the paragraph around `unit`, its child holding the expression.
    SplitParagraph { paragraph: NodeRef<'a>, unit: NodeRef<'a> },
}

/// Nearest `<p>` above `node` within the fragment.
fn enclosing_paragraph<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.ancestors_it(None)
        .take_while(|a| a.is_element() && !dom::has_tag(a, &["body", "html"]))
        .find(|a| dom::has_tag(a, &["p"]))
}

/// Child of `paragraph` leading down to `node`.
///
/// Inline wrappers on the way must carry nothing but the expression,
/// otherwise `None` and the expression stays inline.
fn paragraph_unit<'a>(
    node: &NodeRef<'a>,
    paragraph: &NodeRef<'a>,
    text: &str,
) -> Option<NodeRef<'a>> {
    let mut unit = *node;
    while let Some(parent) = unit.parent() {
        if parent.id == paragraph.id {
            return Some(unit);
        }
        if dom::node_text(&parent).trim() != text.trim() {
            return None;
        }
        unit = parent;
    }
    None
}

fn placement<'a>(node: &NodeRef<'a>) -> Option<(Placement<'a>, String)> {
    let text = dom::node_text(node);
    if !DISPLAY_BLOCK.is_match(&text) {
        return None;
    }
    let parent = node.parent()?;
    if already_wrapped(&parent) {
        return None;
    }
    let placement = match enclosing_paragraph(node) {
        Some(paragraph) => {
            let unit = paragraph_unit(node, &paragraph, &text)?;
            Placement::SplitParagraph { paragraph, unit }
        }
        None => Placement::InPlace(*node),
    };
    Some((placement, text))
}

/// Whitespace text and line breaks at a paragraph split carry nothing.
fn is_filler(node: &NodeRef) -> bool {
    if node.is_text() {
        return dom::node_text(node).trim().is_empty();
    }
    dom::has_tag(node, &["br"])
}

fn serialize(nodes: &[NodeRef]) -> String {
    nodes.iter().map(|n| n.html().to_string()).collect()
}

/// Markup replacing `paragraph`: leading siblings of `unit` in one
/// paragraph, the block, trailing siblings in another.
fn split_paragraph(paragraph: &NodeRef, unit: &NodeRef, block: &str) -> String {
    let children = paragraph.children();
    let at = children.iter().position(|c| c.id == unit.id).unwrap_or(0);

    let mut leading = &children[..at];
    while leading.last().is_some_and(is_filler) {
        leading = &leading[..leading.len() - 1];
    }
    let mut trailing = children.get(at + 1..).unwrap_or_default();
    while trailing.first().is_some_and(is_filler) {
        trailing = &trailing[1..];
    }

    let mut out = String::new();
    if !leading.is_empty() {
        out.push_str(&dom::wrap_in_clone(paragraph, &serialize(leading)));
    }
    out.push_str(block);
    if !trailing.is_empty() {
        out.push_str(&dom::wrap_in_clone(paragraph, &serialize(trailing)));
    }
    out
}

/// Drop a citation number trailing display math (`$$…$$ 3`), then wrap text
/// nodes that are exactly one `$$…$$` expression in `div.math-block`.
///
/// A block never stays inside a `<p>`: the paragraph is split around it and
/// halves left empty are dropped.
pub fn wrap(root: &Selection, _options: &Options) {
    let text_nodes: Vec<NodeRef> = root.nodes().iter().flat_map(dom::text_descendants).collect();
    for node in text_nodes {
        let text = dom::node_text(&node);
        let mut collapsed = text.clone();
        // `$$ a $$ 1 2` loses one number per replacement
        loop {
            let shorter = DISPLAY_CITED.replace_all(&collapsed, "${1}").into_owned();
            if shorter == collapsed {
                break;
            }
            collapsed = shorter;
        }
        if collapsed != text {
            dom::set_node_text(&node, &collapsed);
        }
    }

    // Splitting reparses a paragraph, so each round starts from fresh nodes.
    loop {
        let next = root
            .nodes()
            .iter()
            .flat_map(dom::text_descendants)
            .find_map(|node| placement(&node));
        let Some((target, text)) = next else {
            break;
        };
        let block = format!(
            r#"<div class="{MATH_BLOCK_CLASS}">{}</div>"#,
            escape_html(&text)
        );
        match target {
            Placement::InPlace(node) => dom::replace_with_html(&node, &block),
            Placement::SplitParagraph { paragraph, unit } => {
                let html = split_paragraph(&paragraph, &unit, &block);
                dom::replace_with_html(&paragraph, &html);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::apply_pass;

    #[test]
    fn test_paragraph_replaced() {
        assert_eq!(
            apply_pass("<p>$$ E = mc^2 $$</p>", wrap),
            r#"<div class="math-block">$$ E = mc^2 $$</div>"#
        );
    }

    #[test]
    fn test_trailing_citation_collapsed() {
        assert_eq!(
            apply_pass("<p>$$ a+b $$ 12</p>", wrap),
            r#"<div class="math-block">$$ a+b $$</div>"#
        );
    }

    #[test]
    fn test_several_trailing_numbers_collapsed() {
        assert_eq!(
            apply_pass("<li>$$ a+b $$ 1 2</li>", wrap),
            r#"<li><div class="math-block">$$ a+b $$</div></li>"#
        );
    }

    #[test]
    fn test_text_inside_other_parent_wrapped_in_place() {
        assert_eq!(
            apply_pass("<li>$$ x &lt; y $$</li>", wrap),
            r#"<li><div class="math-block">$$ x &lt; y $$</div></li>"#
        );
    }

    #[test]
    fn test_paragraph_split_around_block() {
        assert_eq!(
            apply_pass("<p><b>Eq</b>$$ x $$</p>", wrap),
            r#"<p><b>Eq</b></p><div class="math-block">$$ x $$</div>"#
        );
        assert_eq!(
            apply_pass(r#"<p class="a">The formula:<br>$$ E = mc^2 $$<br>holds.</p>"#, wrap),
            concat!(
                r#"<p class="a">The formula:</p>"#,
                r#"<div class="math-block">$$ E = mc^2 $$</div>"#,
                r#"<p class="a">holds.</p>"#,
            )
        );
    }

    #[test]
    fn test_two_blocks_in_one_paragraph() {
        let once = apply_pass("<p>$$ a $$<br>$$ b $$</p>", wrap);
        assert_eq!(
            once,
            r#"<div class="math-block">$$ a $$</div><div class="math-block">$$ b $$</div>"#
        );
        assert_eq!(apply_pass(&once, wrap), once);
    }

    #[test]
    fn test_inline_wrapper_with_other_text_left_alone() {
        let html = "<p><b>see <i>$$ x $$</i></b></p>";
        assert_eq!(apply_pass(html, wrap), html);
    }

    #[test]
    fn test_mixed_text_left_inline() {
        let html = "<p>where $$ x $$ holds</p><p>$x$</p>";
        assert_eq!(apply_pass(html, wrap), html);
    }

    #[test]
    fn test_rendered_display_skipped() {
        let html = r#"<span class="katex-display">$$ y $$</span>"#;
        assert_eq!(apply_pass(html, wrap), html);
    }
}

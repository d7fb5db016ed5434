//! DOM Operations Adapter
//!
//! Thin wrappers over `dom_query` with browser-flavored names. Everything
//! else in the crate reads and mutates trees through this module, so the
//! handful of node-level calls the pipeline depends on live in one place.

// Re-export core types for external use
pub use dom_query::{Document, Matcher, NodeId, NodeRef, Selection};

pub use tendril::StrTendril;

/// Elements the browser never renders.
pub const NON_RENDERED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// Elements that start a new line in rendered text.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tr",
    "ul",
];

/// Elements whose rendered text is separated from siblings by a blank line.
pub const PARAGRAPH_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

// === Parsing ===

/// Parse an HTML string into a document (lenient, never fails).
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// The `<body>` of a parsed document as a selection.
///
/// The parser always synthesizes a body, so this is only empty for
/// fragment documents.
#[must_use]
pub fn body(doc: &Document) -> Selection<'_> {
    doc.body().map(Selection::from).unwrap_or_default()
}

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(node: &NodeRef, name: &str) -> Option<String> {
    node.attr(name).map(|s| s.to_string())
}

/// Set an attribute value
#[inline]
pub fn set_attribute(node: &NodeRef, name: &str, value: &str) {
    node.set_attr(name, value);
}

/// Check if attribute exists
#[inline]
#[must_use]
pub fn has_attribute(node: &NodeRef, name: &str) -> bool {
    node.has_attr(name)
}

/// Remove an attribute
#[inline]
pub fn remove_attribute(node: &NodeRef, name: &str) {
    node.remove_attr(name);
}

/// Get all attributes as name/value pairs, in source order.
///
/// Returns an empty vector for non-element nodes.
#[must_use]
pub fn get_all_attributes(node: &NodeRef) -> Vec<(String, String)> {
    node.attrs()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect()
}

/// Space-separated class tokens of an element.
#[must_use]
pub fn class_list(node: &NodeRef) -> Vec<String> {
    node.attr("class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

// === Tag/Node Information ===

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    if node.is_element() {
        node.node_name().map(|t| t.to_ascii_lowercase())
    } else {
        None
    }
}

/// True when the node is an element with one of the given tag names.
#[must_use]
pub fn has_tag(node: &NodeRef, tags: &[&str]) -> bool {
    tag_name(node).is_some_and(|t| tags.contains(&t.as_str()))
}

/// Match a node against a CSS selector. Invalid selectors never match.
#[inline]
#[must_use]
pub fn matches(node: &NodeRef, selector: &str) -> bool {
    node.is(selector)
}

/// True when the node still hangs off its document's root.
///
/// Removed nodes stay in the arena with their parent link cut, so a node is
/// connected exactly when its topmost ancestor is the document node.
#[must_use]
pub fn is_connected(doc: &Document, node: &NodeRef) -> bool {
    let root = doc.root().id;
    if node.id == root {
        return true;
    }
    node.ancestors_it(None).last().is_some_and(|top| top.id == root)
}

/// Resolve a node id back into a node of the given document.
#[inline]
#[must_use]
pub fn node_by_id<'a>(doc: &'a Document, id: NodeId) -> Option<NodeRef<'a>> {
    doc.tree.get(&id)
}

// === Text Content ===

/// Get all text content of a selection and its descendants
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get inner HTML content
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Text of a single text node, or the concatenated text of an element.
#[inline]
#[must_use]
pub fn node_text(node: &NodeRef) -> String {
    node.text().to_string()
}

/// Replace the contents of a text node in place.
///
/// The new text is stored as-is; serialization escapes it.
#[inline]
pub fn set_node_text(node: &NodeRef, text: &str) {
    node.set_text(text);
}

// === Tree Navigation ===

/// True when the node has at least one element child.
#[must_use]
pub fn has_element_children(node: &NodeRef) -> bool {
    node.first_element_child().is_some()
}

/// Previous sibling node if it is a text node.
#[must_use]
pub fn prev_text_sibling<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.prev_sibling().filter(NodeRef::is_text)
}

/// Next sibling node if it is a text node.
#[must_use]
pub fn next_text_sibling<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.next_sibling().filter(NodeRef::is_text)
}

/// Text descendants of a node, in document order.
#[must_use]
pub fn text_descendants<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.descendants_it().filter(NodeRef::is_text).collect()
}

// === Tree Manipulation ===

/// Detach a node from its parent.
#[inline]
pub fn remove(node: &NodeRef) {
    node.remove_from_parent();
}

/// Replace a node with parsed markup.
#[inline]
pub fn replace_with_html(node: &NodeRef, html: &str) {
    node.replace_with_html(html);
}

/// Insert a new text node right before `node`.
pub fn insert_text_before(node: &NodeRef, text: &str) {
    let text_node = node.tree.new_text(text);
    node.insert_before(&text_node);
}

/// Insert parsed markup right after `node`.
#[inline]
pub fn insert_html_after(node: &NodeRef, html: &str) {
    node.after_html(html);
}

/// Append parsed markup as the last children of `node`.
#[inline]
pub fn append_html(node: &NodeRef, html: &str) {
    node.append_html(html);
}

/// Clone an element without its children into a standalone opening/closing
/// pair wrapped around `inner`.
///
/// Attribute values are escaped; the element name is kept as parsed.
#[must_use]
pub fn wrap_in_clone(node: &NodeRef, inner: &str) -> String {
    let tag = tag_name(node).unwrap_or_else(|| "div".to_string());
    let mut open = format!("<{tag}");
    for (name, value) in get_all_attributes(node) {
        open.push(' ');
        open.push_str(&name);
        open.push_str("=\"");
        open.push_str(&crate::markup::escape_html(&value));
        open.push('"');
    }
    format!("{open}>{inner}</{tag}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_and_attributes() {
        let doc = parse(r#"<div id="a" class="x  y" data-k="v">t</div>"#);
        let sel = doc.select("#a");
        let node = sel.nodes()[0];

        assert_eq!(tag_name(&node).as_deref(), Some("div"));
        assert_eq!(get_attribute(&node, "data-k").as_deref(), Some("v"));
        assert_eq!(class_list(&node), vec!["x", "y"]);
        assert_eq!(get_all_attributes(&node).len(), 3);
        assert!(has_tag(&node, &["span", "div"]));
    }

    #[test]
    fn test_is_connected_after_remove() {
        let doc = parse("<div><p id=\"p\">x</p></div>");
        let node = doc.select("#p").nodes()[0];
        assert!(is_connected(&doc, &node));

        remove(&node);
        assert!(!is_connected(&doc, &node));
        assert!(node_by_id(&doc, node.id).is_some());
    }

    #[test]
    fn test_set_node_text_on_text_node() {
        let doc = parse("<p>a<b>b</b>c</p>");
        let p = doc.select("p").nodes()[0];
        let first = p.first_child().expect("text child");
        assert!(first.is_text());

        set_node_text(&first, "A<");
        assert_eq!(doc.select("p").inner_html().to_string(), "A&lt;<b>b</b>c");
    }

    #[test]
    fn test_insert_text_before() {
        let doc = parse("<p><sup>1</sup>x</p>");
        let sup = doc.select("sup").nodes()[0];
        insert_text_before(&sup, " ");
        remove(&sup);
        assert_eq!(doc.select("p").inner_html().to_string(), " x");
    }

    #[test]
    fn test_wrap_in_clone_escapes_attributes() {
        let doc = parse(r#"<section class="turn" title="a&quot;b">x</section>"#);
        let node = doc.select("section").nodes()[0];
        assert_eq!(
            wrap_in_clone(&node, "<p>y</p>"),
            r#"<section class="turn" title="a&quot;b"><p>y</p></section>"#
        );
    }

    #[test]
    fn test_matches_invalid_selector_is_false() {
        let doc = parse("<div class=\"k\">x</div>");
        let node = doc.select("div").nodes()[0];
        assert!(matches(&node, ".k"));
        assert!(!matches(&node, "[[["));
    }
}

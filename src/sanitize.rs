//! Sanitizer: strips executable content and host bookkeeping from raw markup.

use crate::dom::{self, Document};
use crate::patterns::{EVENT_HANDLER_ATTR, EXECUTABLE_ELEMENTS, FRAMEWORK_ATTR};

/// Attribute names removed from every element.
fn is_unsafe_attribute(name: &str) -> bool {
    EVENT_HANDLER_ATTR.is_match(name)
        || name.eq_ignore_ascii_case("srcdoc")
        || FRAMEWORK_ATTR.is_match(name)
}

/// Clean raw markup for display.
///
/// Parses leniently as a full document, removes `script`, `iframe`, `object`
/// and `embed` elements, drops inline event handlers, `srcdoc` and framework
/// bookkeeping attributes, and returns the body's inner markup. Never fails
/// and is idempotent.
///
/// ```rust
/// use nlm_export::sanitize;
///
/// let clean = sanitize(r#"<p onclick="x()" _ngcontent-abc="">Hi</p><script>x()</script>"#);
/// assert_eq!(clean, "<p>Hi</p>");
/// ```
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let doc = dom::parse(raw);
    sanitize_document(&doc);
    dom::inner_html(&dom::body(&doc)).to_string()
}

/// Sanitize a parsed document in place.
pub fn sanitize_document(doc: &Document) {
    let executable = doc.select(EXECUTABLE_ELEMENTS).nodes().to_vec();
    for node in executable.into_iter().rev() {
        dom::remove(&node);
    }

    for node in doc.select("*").nodes() {
        for (name, _) in dom::get_all_attributes(node) {
            if is_unsafe_attribute(&name) {
                dom::remove_attribute(node, &name);
            }
        }
    }
}

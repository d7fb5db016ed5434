//! Page snapshot: the light document, its encapsulated subtrees, the active
//! text selection, and composed traversal across all of them.
//!
//! Every element is addressed by an [`ElementHandle`], a copyable
//! `(scope, node id)` pair. Scope `0` is the light document; each attached
//! encapsulated subtree gets its own scope whose root is the `<body>` of its
//! own parsed document. Handles never keep nodes alive: a handle whose node
//! was detached (or whose subtree was replaced) simply stops being connected.

use std::collections::HashMap;

use dom_query::{Document, Matcher, NodeId, NodeRef, Selection};
use tracing::debug;

use crate::dom;
use crate::markup;
use crate::patterns::WHITESPACE;
use crate::visibility::InlineStyle;

/// Identifies the tree an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The light (non-encapsulated) document.
    pub const LIGHT: Self = Self(0);

    /// True for the light document scope.
    #[inline]
    #[must_use]
    pub const fn is_light(self) -> bool {
        self.0 == 0
    }
}

/// Non-owning reference to an element of a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    pub scope: ScopeId,
    pub node: NodeId,
}

impl ElementHandle {
    #[inline]
    fn new(scope: ScopeId, node: NodeId) -> Self {
        Self { scope, node }
    }
}

struct ShadowScope {
    host: ElementHandle,
    doc: Document,
}

/// A snapshot of the host page.
pub struct Page {
    light: Document,
    shadows: Vec<ShadowScope>,
    hosts: HashMap<ElementHandle, ScopeId>,
    selection: Vec<String>,
    url: String,
    title: Option<String>,
}

impl Page {
    /// Parse a full page snapshot. Never fails.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            light: dom::parse(html),
            shadows: Vec::new(),
            hosts: HashMap::new(),
            selection: Vec::new(),
            url: String::new(),
            title: None,
        }
    }

    /// Set the page location.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Override the title read from `<title>`.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Page location, empty when unknown.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Title override, else the trimmed `<title>` text.
    #[must_use]
    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        self.light.select("title").text().trim().to_string()
    }

    // === Scopes ===

    /// Attach an encapsulated subtree to `host` and return its scope.
    ///
    /// Hosts may themselves live inside another subtree. Attaching to a host
    /// that already carries a subtree replaces its content in place, which
    /// disconnects every handle into the old content.
    pub fn attach_shadow(&mut self, host: ElementHandle, html: &str) -> ScopeId {
        let doc = dom::parse(html);
        if let Some(&scope) = self.hosts.get(&host) {
            if let Some(shadow) = self.shadows.get_mut(scope.0 - 1) {
                shadow.doc = doc;
            }
            return scope;
        }
        self.shadows.push(ShadowScope { host, doc });
        let scope = ScopeId(self.shadows.len());
        self.hosts.insert(host, scope);
        scope
    }

    /// The document backing a scope.
    #[must_use]
    pub fn document(&self, scope: ScopeId) -> Option<&Document> {
        if scope.is_light() {
            Some(&self.light)
        } else {
            self.shadows.get(scope.0 - 1).map(|s| &s.doc)
        }
    }

    /// Host element of an encapsulated scope.
    #[must_use]
    pub fn host_of(&self, scope: ScopeId) -> Option<ElementHandle> {
        if scope.is_light() {
            return None;
        }
        self.shadows.get(scope.0 - 1).map(|s| s.host)
    }

    /// Scope hosted by an element, if it carries one.
    #[must_use]
    pub fn shadow_scope(&self, host: ElementHandle) -> Option<ScopeId> {
        self.hosts.get(&host).copied()
    }

    fn shadow_root(&self, scope: ScopeId) -> Option<NodeRef<'_>> {
        if scope.is_light() {
            return None;
        }
        self.shadows.get(scope.0 - 1).and_then(|s| s.doc.body())
    }

    fn is_scope_root(&self, scope: ScopeId, node: &NodeRef) -> bool {
        self.shadow_root(scope).is_some_and(|root| root.id == node.id)
    }

    // === Nodes ===

    /// Resolve a handle to its node.
    #[must_use]
    pub fn node(&self, handle: ElementHandle) -> Option<NodeRef<'_>> {
        self.document(handle.scope)
            .and_then(|doc| dom::node_by_id(doc, handle.node))
    }

    /// Resolve a handle to a single-node selection (empty when unresolvable).
    #[must_use]
    pub fn selection(&self, handle: ElementHandle) -> Selection<'_> {
        self.node(handle).map(Selection::from).unwrap_or_default()
    }

    /// Handle for the light document node; the widest query root.
    #[must_use]
    pub fn root(&self) -> ElementHandle {
        ElementHandle::new(ScopeId::LIGHT, self.light.root().id)
    }

    /// The `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<ElementHandle> {
        self.light
            .root()
            .first_element_child()
            .map(|n| ElementHandle::new(ScopeId::LIGHT, n.id))
    }

    /// The light `<body>`.
    #[must_use]
    pub fn body(&self) -> Option<ElementHandle> {
        self.light
            .body()
            .map(|n| ElementHandle::new(ScopeId::LIGHT, n.id))
    }

    /// First `<main>` element of the light document.
    #[must_use]
    pub fn main(&self) -> Option<ElementHandle> {
        self.light
            .select_single("main")
            .nodes()
            .first()
            .map(|n| ElementHandle::new(ScopeId::LIGHT, n.id))
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag_name(&self, handle: ElementHandle) -> Option<String> {
        self.node(handle).and_then(|n| dom::tag_name(&n))
    }

    /// Attribute value.
    #[must_use]
    pub fn attr(&self, handle: ElementHandle, name: &str) -> Option<String> {
        self.node(handle).and_then(|n| dom::get_attribute(&n, name))
    }

    /// `tag#id.class1.class2`, or `<none>`.
    #[must_use]
    pub fn describe(&self, handle: Option<ElementHandle>) -> String {
        let Some(node) = handle.and_then(|h| self.node(h)) else {
            return "<none>".to_string();
        };
        let mut out = dom::tag_name(&node).unwrap_or_else(|| "#node".to_string());
        if let Some(id) = dom::get_attribute(&node, "id").filter(|id| !id.is_empty()) {
            out.push('#');
            out.push_str(&id);
        }
        for class in dom::class_list(&node) {
            out.push('.');
            out.push_str(&class);
        }
        out
    }

    // === Navigation ===

    /// Parent element within the same scope (`parentElement`).
    #[must_use]
    pub fn parent(&self, handle: ElementHandle) -> Option<ElementHandle> {
        let node = self.node(handle)?;
        if self.is_scope_root(handle.scope, &node) {
            return None;
        }
        let parent = node.parent().filter(NodeRef::is_element)?;
        if self.is_scope_root(handle.scope, &parent) {
            return None;
        }
        Some(ElementHandle::new(handle.scope, parent.id))
    }

    /// Parent element, hopping from the top of an encapsulated subtree to its host.
    #[must_use]
    pub fn composed_parent(&self, handle: ElementHandle) -> Option<ElementHandle> {
        if let Some(parent) = self.parent(handle) {
            return Some(parent);
        }
        let node = self.node(handle)?;
        let at_top = self.is_scope_root(handle.scope, &node)
            || node
                .parent()
                .is_some_and(|p| self.is_scope_root(handle.scope, &p));
        if at_top {
            self.host_of(handle.scope)
        } else {
            None
        }
    }

    /// Ancestors from nearest to farthest, crossing into hosts.
    #[must_use]
    pub fn composed_ancestors(&self, handle: ElementHandle) -> Vec<ElementHandle> {
        let mut out = Vec::new();
        let mut current = self.composed_parent(handle);
        while let Some(h) = current {
            out.push(h);
            current = self.composed_parent(h);
        }
        out
    }

    /// True when `ancestor` is `handle` or one of its composed ancestors.
    #[must_use]
    pub fn contains(&self, ancestor: ElementHandle, handle: ElementHandle) -> bool {
        ancestor == handle || self.composed_ancestors(handle).contains(&ancestor)
    }

    // === Composed queries ===

    /// All elements under `root` matching `selector`, including matches inside
    /// encapsulated subtrees hosted by `root` or its descendants.
    ///
    /// Results are in composed document order: a host's subtree content is
    /// listed right after the host. Invalid selectors match nothing.
    #[must_use]
    pub fn query_all(&self, root: ElementHandle, selector: &str) -> Vec<ElementHandle> {
        let Ok(matcher) = Matcher::new(selector) else {
            debug!(selector, "skipping invalid selector");
            return Vec::new();
        };
        let mut out = Vec::new();
        if let Some(node) = self.node(root) {
            self.walk_shadow(root, &matcher, &mut out);
            self.walk(root.scope, node, &matcher, &mut out);
        }
        out
    }

    /// First element under `root` matching `selector`, composed.
    #[must_use]
    pub fn query_first(&self, root: ElementHandle, selector: &str) -> Option<ElementHandle> {
        self.query_all(root, selector).into_iter().next()
    }

    fn walk(&self, scope: ScopeId, node: NodeRef<'_>, matcher: &Matcher, out: &mut Vec<ElementHandle>) {
        for child in node.descendants() {
            if !child.is_element() {
                continue;
            }
            let handle = ElementHandle::new(scope, child.id);
            if child.is_match(matcher) {
                out.push(handle);
            }
            self.walk_shadow(handle, matcher, out);
        }
    }

    fn walk_shadow(&self, host: ElementHandle, matcher: &Matcher, out: &mut Vec<ElementHandle>) {
        if let Some(scope) = self.shadow_scope(host) {
            if let Some(root) = self.shadow_root(scope) {
                self.walk(scope, root, matcher, out);
            }
        }
    }

    // === Liveness & visibility ===

    /// True when the element is attached to its scope's document and, for
    /// encapsulated scopes, its host is connected too.
    #[must_use]
    pub fn is_connected(&self, handle: ElementHandle) -> bool {
        let Some(doc) = self.document(handle.scope) else {
            return false;
        };
        let Some(node) = dom::node_by_id(doc, handle.node) else {
            return false;
        };
        if !dom::is_connected(doc, &node) {
            return false;
        }
        match self.host_of(handle.scope) {
            Some(host) => self.is_connected(host),
            None => true,
        }
    }

    /// Connected, with a box, not hidden by style, and not fully transparent.
    ///
    /// Recomputed on every call.
    #[must_use]
    pub fn is_visible(&self, handle: ElementHandle) -> bool {
        if !self.is_connected(handle) {
            return false;
        }
        let Some(node) = self.node(handle) else {
            return false;
        };
        if !node.is_element() {
            return false;
        }
        let own = style_of(&node);
        if own.is_zero_box() || own.is_transparent() {
            return false;
        }
        if !self.is_rendered(handle) {
            return false;
        }
        self.inherited_visibility(handle) != Some(true)
    }

    /// No element on the composed ancestor-or-self chain removes the box.
    fn is_rendered(&self, handle: ElementHandle) -> bool {
        std::iter::once(handle)
            .chain(self.composed_ancestors(handle))
            .all(|h| self.node(h).is_none_or(|n| !removes_box(&n)))
    }

    /// Nearest ancestor-or-self `visibility` declaration.
    fn inherited_visibility(&self, handle: ElementHandle) -> Option<bool> {
        std::iter::once(handle)
            .chain(self.composed_ancestors(handle))
            .find_map(|h| self.node(h).and_then(|n| style_of(&n).visibility_hidden))
    }

    // === Text ===

    /// Light `textContent`.
    #[must_use]
    pub fn text(&self, handle: ElementHandle) -> String {
        self.node(handle).map(|n| dom::node_text(&n)).unwrap_or_default()
    }

    /// Text including every hosted subtree, subtree text first.
    #[must_use]
    pub fn composed_text(&self, handle: ElementHandle) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(handle) {
            self.composed_text_into(handle.scope, node, &mut out);
        }
        out
    }

    fn composed_text_into(&self, scope: ScopeId, node: NodeRef<'_>, out: &mut String) {
        if node.is_text() {
            out.push_str(&node.text());
            return;
        }
        if node.is_element() {
            let handle = ElementHandle::new(scope, node.id);
            if let Some(shadow) = self.shadow_scope(handle) {
                if let Some(root) = self.shadow_root(shadow) {
                    self.composed_text_into(shadow, root, out);
                }
            }
        }
        for child in node.children() {
            self.composed_text_into(scope, child, out);
        }
    }

    /// Rendered text, roughly `innerText`.
    ///
    /// Invisible subtrees and never-rendered elements are skipped, block
    /// elements start new lines and paragraphs/headings are separated by a
    /// blank line. Hosted subtrees are included.
    #[must_use]
    pub fn visible_text(&self, handle: ElementHandle) -> String {
        if !self.is_connected(handle) || !self.is_rendered(handle) {
            return String::new();
        }
        let Some(node) = self.node(handle) else {
            return String::new();
        };
        let inherited_hidden = self
            .composed_parent(handle)
            .and_then(|p| self.inherited_visibility(p))
            .unwrap_or(false);
        let mut builder = TextBuilder::default();
        self.visible_text_into(handle.scope, node, inherited_hidden, &mut builder);
        builder.finish()
    }

    fn visible_text_into(
        &self,
        scope: ScopeId,
        node: NodeRef<'_>,
        hidden: bool,
        builder: &mut TextBuilder,
    ) {
        if node.is_text() {
            if !hidden {
                builder.push_text(&node.text());
            }
            return;
        }
        if !node.is_element() {
            return;
        }
        if removes_box(&node) {
            return;
        }
        let style = style_of(&node);
        if style.is_transparent() || style.is_zero_box() {
            return;
        }
        let hidden = style.visibility_hidden.unwrap_or(hidden);
        let tag = dom::tag_name(&node).unwrap_or_default();
        if tag == "br" {
            if !hidden {
                builder.push_newline();
            }
            return;
        }
        let breaks = block_breaks(&tag);
        builder.request_break(breaks);

        let handle = ElementHandle::new(scope, node.id);
        if let Some(shadow) = self.shadow_scope(handle) {
            if let Some(root) = self.shadow_root(shadow) {
                for child in root.children() {
                    self.visible_text_into(shadow, child, hidden, builder);
                }
            }
        }
        for child in node.children() {
            self.visible_text_into(scope, child, hidden, builder);
        }
        builder.request_break(breaks);
    }

    // === Markup ===

    /// Light inner markup.
    #[must_use]
    pub fn inner_html(&self, handle: ElementHandle) -> String {
        dom::inner_html(&self.selection(handle)).to_string()
    }

    /// Light outer markup.
    #[must_use]
    pub fn outer_html(&self, handle: ElementHandle) -> String {
        dom::outer_html(&self.selection(handle)).to_string()
    }

    /// Markup of the subtree hosted by `handle`.
    #[must_use]
    pub fn shadow_html(&self, handle: ElementHandle) -> Option<String> {
        let scope = self.shadow_scope(handle)?;
        let root = self.shadow_root(scope)?;
        Some(root.inner_html().to_string())
    }

    /// Composed text of the subtree hosted by `handle`.
    #[must_use]
    pub fn shadow_text(&self, handle: ElementHandle) -> Option<String> {
        let scope = self.shadow_scope(handle)?;
        let root = self.shadow_root(scope)?;
        let mut out = String::new();
        self.composed_text_into(scope, root, &mut out);
        Some(out)
    }

    // === Mutation ===

    /// Detach an element from its parent, as a re-rendering page would.
    pub fn detach(&self, handle: ElementHandle) {
        if let Some(node) = self.node(handle) {
            dom::remove(&node);
        }
    }

    /// Append parsed markup as the last children of an element.
    pub fn append_html(&self, handle: ElementHandle, html: &str) {
        if let Some(node) = self.node(handle) {
            dom::append_html(&node, html);
        }
    }

    /// Insert parsed markup right after an element.
    pub fn insert_html_after(&self, handle: ElementHandle, html: &str) {
        if let Some(node) = self.node(handle) {
            dom::insert_html_after(&node, html);
        }
    }

    // === Text selection ===

    /// Replace the active selection with the given ranges (each range is the
    /// markup of its cloned contents).
    pub fn set_selection<I, S>(&mut self, ranges: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = ranges.into_iter().map(Into::into).collect();
    }

    /// Drop the active selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Markup of the active selection, each range wrapped in its own `<div>`.
    ///
    /// `None` when nothing is selected.
    #[must_use]
    pub fn selection_html(&self) -> Option<String> {
        if self.selection.is_empty() {
            return None;
        }
        let wrapped: String = self
            .selection
            .iter()
            .map(|range| format!("<div>{range}</div>"))
            .collect();
        let container = dom::parse(&format!("<div>{wrapped}</div>"));
        let html = dom::inner_html(&dom::body(&container).children()).to_string();
        Some(html)
    }

    /// True when the current selection has any non-whitespace text.
    #[must_use]
    pub fn has_selected_text(&self) -> bool {
        self.selection_html()
            .is_some_and(|html| markup::has_text(&html))
    }
}

fn style_of(node: &NodeRef) -> InlineStyle {
    dom::get_attribute(node, "style")
        .map(|s| InlineStyle::parse(&s))
        .unwrap_or_default()
}

/// `display:none`, the `hidden` attribute, or an element that never renders.
fn removes_box(node: &NodeRef) -> bool {
    if !node.is_element() {
        return false;
    }
    dom::has_tag(node, dom::NON_RENDERED_TAGS)
        || dom::has_attribute(node, "hidden")
        || style_of(node).display_none
}

fn block_breaks(tag: &str) -> usize {
    if dom::PARAGRAPH_TAGS.contains(&tag) {
        2
    } else if dom::BLOCK_TAGS.contains(&tag) {
        1
    } else {
        0
    }
}

/// Accumulates rendered text with collapsed whitespace and pending breaks.
#[derive(Default)]
struct TextBuilder {
    out: String,
    pending_breaks: usize,
}

impl TextBuilder {
    fn request_break(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }

    fn push_newline(&mut self) {
        self.flush_breaks();
        self.trim_trailing_spaces();
        self.out.push('\n');
    }

    fn push_text(&mut self, text: &str) {
        let collapsed = WHITESPACE.replace_all(text, " ");
        if markup::is_blank(&collapsed) {
            if !self.out.is_empty() && !self.out.ends_with([' ', '\n']) {
                self.out.push(' ');
            }
            return;
        }
        self.flush_breaks();
        let at_line_start = self.out.is_empty() || self.out.ends_with('\n');
        if at_line_start || self.out.ends_with(' ') {
            self.out.push_str(collapsed.trim_start());
        } else {
            self.out.push_str(&collapsed);
        }
    }

    fn flush_breaks(&mut self) {
        if self.pending_breaks == 0 {
            return;
        }
        if !self.out.is_empty() {
            self.trim_trailing_spaces();
            let existing = self.out.len() - self.out.trim_end_matches('\n').len();
            for _ in existing..self.pending_breaks {
                self.out.push('\n');
            }
        }
        self.pending_breaks = 0;
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed);
    }

    fn finish(self) -> String {
        self.out
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

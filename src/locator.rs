//! Locator engine: finds the chat toolbar, the panel around it and the
//! message area inside the panel.
//!
//! Every step is a heuristic over a page the crate does not control, so all
//! lookups return `Option` and a miss is the expected steady state on pages
//! without a chat.

use tracing::debug;

use crate::markup::normalize_label;
use crate::options::Options;
use crate::page::{ElementHandle, Page};
use crate::patterns::{
    BUTTONS, CHAT_CONTAINERS, INJECTED_MARKER_ATTR, REFRESH_BY_CLASS, REFRESH_BY_LABEL,
};
use crate::session::SessionContext;

/// A located chat panel and the message area inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLocation {
    pub panel: ElementHandle,
    pub area: ElementHandle,
}

/// True for the control this crate injects.
#[must_use]
pub fn is_injected(page: &Page, handle: ElementHandle) -> bool {
    page.attr(handle, INJECTED_MARKER_ATTR).is_some()
}

/// First visible button under `root` whose normalized text equals `text`.
///
/// Normalization collapses whitespace, trims and lowercases both sides.
#[must_use]
pub fn find_button_by_text(page: &Page, text: &str, root: ElementHandle) -> Option<ElementHandle> {
    let want = normalize_label(text);
    page.query_all(root, BUTTONS)
        .into_iter()
        .find(|&btn| normalize_label(&page.text(btn)) == want && page.is_visible(btn))
}

/// The host's "refresh chat" control under `root`.
///
/// Tried in order: the accessible label, the `refresh-button` class, then a
/// button reading "Refresh". The injected control never qualifies.
#[must_use]
pub fn find_refresh_button(page: &Page, root: ElementHandle) -> Option<ElementHandle> {
    let usable = |h: &ElementHandle| !is_injected(page, *h) && page.is_visible(*h);

    page.query_first(root, REFRESH_BY_LABEL)
        .filter(usable)
        .or_else(|| page.query_first(root, REFRESH_BY_CLASS).filter(usable))
        .or_else(|| find_button_by_text(page, "Refresh", root).filter(usable))
}

/// Find the toolbar that hosts the chat controls.
///
/// The anchor is the refresh control, else a visible "Export" button. From
/// the anchor: the nearest `role="toolbar"` ancestor when visible; else the
/// first visible ancestor (within `max_ancestor_climb` levels) whose visible
/// buttons include the anchor and at least one peer; else the anchor's parent.
#[must_use]
pub fn locate_toolbar(page: &Page, options: &Options) -> Option<ElementHandle> {
    let root = page.root();
    let anchor = find_refresh_button(page, root)
        .or_else(|| find_button_by_text(page, "Export", root));
    let Some(anchor) = anchor else {
        debug!("no toolbar anchor");
        return None;
    };
    debug!(anchor = %page.describe(Some(anchor)), "toolbar anchor");

    if let Some(toolbar) = closest_toolbar(page, anchor) {
        if page.is_visible(toolbar) {
            debug!(toolbar = %page.describe(Some(toolbar)), "toolbar by role");
            return Some(toolbar);
        }
    }

    let mut node = page.parent(anchor);
    for _ in 0..options.max_ancestor_climb {
        let Some(current) = node else { break };
        let buttons: Vec<ElementHandle> = page
            .query_all(current, BUTTONS)
            .into_iter()
            .filter(|&b| page.is_visible(b))
            .collect();
        let contains_anchor = buttons.contains(&anchor);
        let has_peer = buttons.iter().any(|&b| b != anchor);
        if contains_anchor && has_peer && page.is_visible(current) {
            debug!(toolbar = %page.describe(Some(current)), "toolbar by button group");
            return Some(current);
        }
        node = page.parent(current);
    }

    let fallback = page.parent(anchor);
    debug!(toolbar = %page.describe(fallback), "toolbar is anchor parent");
    fallback
}

fn closest_toolbar(page: &Page, anchor: ElementHandle) -> Option<ElementHandle> {
    let mut node = Some(anchor);
    while let Some(current) = node {
        if page.attr(current, "role").as_deref() == Some("toolbar") {
            return Some(current);
        }
        node = page.parent(current);
    }
    None
}

fn has_chat_container(page: &Page, root: ElementHandle) -> bool {
    CHAT_CONTAINERS
        .iter()
        .any(|sel| page.query_first(root, sel).is_some())
}

/// Resolve the panel around `toolbar` and the message area inside it.
///
/// The panel is the first of the toolbar and its ancestors (within
/// `max_ancestor_climb` nodes) containing a message-list-shaped element,
/// else the toolbar's parent. The area is the first visible such element in
/// priority order, else the panel itself. A visible area is remembered in the
/// session's region cache.
#[must_use]
pub fn locate_panel(
    page: &Page,
    session: &SessionContext,
    toolbar: ElementHandle,
    options: &Options,
) -> Option<PanelLocation> {
    let mut candidate = Some(toolbar);
    let mut panel = None;
    for _ in 0..options.max_ancestor_climb {
        let Some(current) = candidate else { break };
        if has_chat_container(page, current) {
            panel = Some(current);
            break;
        }
        candidate = page.parent(current);
    }
    let panel = panel.or_else(|| page.parent(toolbar))?;

    let area = CHAT_CONTAINERS
        .iter()
        .find_map(|sel| {
            page.query_all(panel, sel)
                .into_iter()
                .find(|&h| page.is_visible(h))
        })
        .unwrap_or(panel);

    debug!(
        panel = %page.describe(Some(panel)),
        area = %page.describe(Some(area)),
        "located chat panel"
    );
    session.region().remember(page, area);
    Some(PanelLocation { panel, area })
}

/// Remember the first visible message-list-shaped element anywhere on the page.
pub fn locate_area_fallback(page: &Page, session: &SessionContext) -> Option<ElementHandle> {
    let selector = CHAT_CONTAINERS.join(", ");
    let area = page
        .query_all(page.root(), &selector)
        .into_iter()
        .find(|&h| page.is_visible(h))?;
    debug!(area = %page.describe(Some(area)), "fallback located chat area");
    session.region().remember(page, area);
    Some(area)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: &str = r#"
        <section id="panel">
          <div id="bar" role="toolbar">
            <button aria-label="Refresh chat messages">r</button>
            <button>Copy chat</button>
          </div>
          <div id="log" role="log"><p>msg</p></div>
        </section>"#;

    #[test]
    fn test_find_button_by_text_normalizes() {
        let page = Page::parse(r#"<button style="display:none">Export</button><div role="button">  EXPORT </div>"#);
        let found = find_button_by_text(&page, "export", page.root()).expect("button");
        assert_eq!(page.tag_name(found).as_deref(), Some("div"));
    }

    #[test]
    fn test_refresh_skips_injected_control() {
        let page = Page::parse(concat!(
            r#"<button class="refresh-button" data-nlm-export-toolbar="1">x</button>"#,
            r#"<button id="real">Refresh</button>"#,
        ));
        let found = find_refresh_button(&page, page.root()).expect("refresh");
        assert_eq!(page.attr(found, "id").as_deref(), Some("real"));
    }

    #[test]
    fn test_toolbar_by_role() {
        let page = Page::parse(PANEL);
        let toolbar = locate_toolbar(&page, &Options::default()).expect("toolbar");
        assert_eq!(page.attr(toolbar, "id").as_deref(), Some("bar"));
    }

    #[test]
    fn test_toolbar_by_button_group() {
        let page = Page::parse(r#"<div id="group"><span><button class="refresh-button">r</button></span><button>other</button></div>"#);
        let toolbar = locate_toolbar(&page, &Options::default()).expect("toolbar");
        assert_eq!(page.attr(toolbar, "id").as_deref(), Some("group"));
    }

    #[test]
    fn test_no_anchor_is_none() {
        let page = Page::parse("<div><button>Save</button></div>");
        assert_eq!(locate_toolbar(&page, &Options::default()), None);
    }

    #[test]
    fn test_panel_and_area() {
        let page = Page::parse(PANEL);
        let session = SessionContext::new();
        let options = Options::default();
        let toolbar = locate_toolbar(&page, &options).expect("toolbar");
        let loc = locate_panel(&page, &session, toolbar, &options).expect("panel");

        assert_eq!(page.attr(loc.panel, "id").as_deref(), Some("panel"));
        assert_eq!(page.attr(loc.area, "id").as_deref(), Some("log"));
        assert_eq!(session.region().get(&page), Some(loc.area));
    }

    #[test]
    fn test_area_fallback() {
        let page = Page::parse(r#"<div role="feed" style="display:none">a</div><div id="live" aria-live="polite">b</div>"#);
        let session = SessionContext::new();
        let area = locate_area_fallback(&page, &session).expect("area");
        assert_eq!(page.attr(area, "id").as_deref(), Some("live"));
        assert_eq!(session.region().get(&page), Some(area));
    }
}

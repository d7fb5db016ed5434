//! The export control injected into the chat toolbar.

use tracing::{debug, info};

use crate::dom::{self, Selection};
use crate::locator::{find_button_by_text, find_refresh_button, locate_toolbar};
use crate::options::Options;
use crate::page::{ElementHandle, Page};
use crate::patterns::{INJECTED_BUTTON_ID, INJECTED_MARKER_ATTR};

/// Accessible label of the injected control.
pub const BUTTON_LABEL: &str = "Export chat as PDF";

/// Inline style of the control when there is no host button to imitate.
const PLAIN_STYLE: &str = "margin-left: 8px; padding: 6px 10px; border-radius: 8px; cursor: pointer;";

/// Attributes never copied from the reference control.
const SKIPPED_ATTRS: [&str; 2] = ["id", "aria-label"];

/// The injected control, if present on the page.
#[must_use]
pub fn find_injected(page: &Page) -> Option<ElementHandle> {
    page.query_first(page.root(), &format!("#{INJECTED_BUTTON_ID}"))
}

/// Build the control's markup, imitating `reference` when given.
fn build_button(page: &Page, reference: Option<ElementHandle>) -> Option<String> {
    let scratch = dom::parse("<button></button>");
    let btn = scratch.select("button").nodes().first().copied()?;
    let sel = Selection::from(btn);

    match reference.and_then(|r| page.node(r)) {
        Some(refnode) => {
            for (name, value) in dom::get_all_attributes(&refnode) {
                if !SKIPPED_ATTRS.contains(&name.as_str()) {
                    dom::set_attribute(&btn, &name, &value);
                }
            }
            let classes: Vec<String> = dom::class_list(&btn)
                .into_iter()
                .filter(|c| c != "refresh-button")
                .collect();
            if classes.is_empty() {
                dom::remove_attribute(&btn, "class");
            } else {
                dom::set_attribute(&btn, "class", &classes.join(" "));
            }

            btn.set_html(refnode.inner_html());
            match sel.select(".mdc-button__label").nodes().first() {
                Some(label) => label.set_text(" Export PDF "),
                None => btn.set_text("Export PDF"),
            }
            if let Some(icon) = sel.select("mat-icon").nodes().first() {
                icon.set_text("picture_as_pdf");
            }
            dom::remove_attribute(&btn, "disabled");
        }
        None => {
            btn.set_text("Export PDF");
            dom::set_attribute(&btn, "style", PLAIN_STYLE);
        }
    }

    dom::set_attribute(&btn, "id", INJECTED_BUTTON_ID);
    dom::set_attribute(&btn, "type", "button");
    dom::set_attribute(&btn, "aria-label", BUTTON_LABEL);
    dom::set_attribute(&btn, INJECTED_MARKER_ATTR, "1");
    Some(btn.html().to_string())
}

/// Add the export control to the chat toolbar.
///
/// Does nothing when the control is already attached. Otherwise the control
/// imitates the host's refresh (else "Export") button and sits right after
/// it, or is a plain button appended to the toolbar. Returns the control, or
/// `None` when no toolbar exists yet.
pub fn inject_toolbar_button(page: &Page, options: &Options) -> Option<ElementHandle> {
    if let Some(existing) = find_injected(page) {
        return Some(existing);
    }

    let toolbar = locate_toolbar(page, options)?;
    let reference =
        find_refresh_button(page, toolbar).or_else(|| find_button_by_text(page, "Export", toolbar));
    let markup = build_button(page, reference)?;

    match reference {
        Some(reference) => page.insert_html_after(reference, &markup),
        None => page.append_html(toolbar, &markup),
    }

    let injected = find_injected(page);
    match injected {
        Some(btn) => info!(control = %page.describe(Some(btn)), "toolbar export control injected"),
        None => debug!(toolbar = %page.describe(Some(toolbar)), "export control did not attach"),
    }
    injected
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOOLBAR: &str = r#"
        <div role="toolbar" id="bar">
          <button id="refresh" class="mdc-button refresh-button" aria-label="Refresh chat messages" disabled>
            <mat-icon class="icon">refresh</mat-icon><span class="mdc-button__label">Refresh</span>
          </button>
          <button id="other">Copy chat</button>
        </div>"#;

    #[test]
    fn test_imitates_refresh_control() {
        let page = Page::parse(TOOLBAR);
        let btn = inject_toolbar_button(&page, &Options::default()).expect("injected");

        assert_eq!(page.attr(btn, "class").as_deref(), Some("mdc-button"));
        assert_eq!(page.attr(btn, "aria-label").as_deref(), Some(BUTTON_LABEL));
        assert_eq!(page.attr(btn, "type").as_deref(), Some("button"));
        assert_eq!(page.attr(btn, INJECTED_MARKER_ATTR).as_deref(), Some("1"));
        assert!(page.attr(btn, "disabled").is_none());
        let words: Vec<String> = page.text(btn).split_whitespace().map(String::from).collect();
        assert_eq!(words, vec!["picture_as_pdf", "Export", "PDF"]);

        let refresh = page.query_first(page.root(), "#refresh").expect("refresh");
        let bar = page.parent(refresh).expect("bar");
        let order: Vec<Option<String>> = page
            .query_all(bar, "button")
            .into_iter()
            .map(|b| page.attr(b, "id"))
            .collect();
        assert_eq!(
            order,
            vec![
                Some("refresh".to_string()),
                Some(INJECTED_BUTTON_ID.to_string()),
                Some("other".to_string())
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let page = Page::parse(TOOLBAR);
        let opts = Options::default();
        let first = inject_toolbar_button(&page, &opts);
        let second = inject_toolbar_button(&page, &opts);
        assert_eq!(first, second);
        assert_eq!(page.query_all(page.root(), "[data-nlm-export-toolbar]").len(), 1);
    }

    #[test]
    fn test_reinjected_after_detach() {
        let page = Page::parse(TOOLBAR);
        let opts = Options::default();
        let first = inject_toolbar_button(&page, &opts).expect("injected");
        page.detach(first);
        assert!(find_injected(&page).is_none());

        let second = inject_toolbar_button(&page, &opts).expect("reinjected");
        assert_ne!(first, second);
        assert!(page.is_connected(second));
    }

    #[test]
    fn test_no_toolbar() {
        let page = Page::parse("<main><p>nothing here</p></main>");
        assert!(inject_toolbar_button(&page, &Options::default()).is_none());
    }
}

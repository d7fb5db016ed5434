//! Content collector: pulls message-like elements out of a chat area.

use std::collections::HashSet;

use tracing::debug;

use crate::dom;
use crate::markup::{has_text, is_blank, non_whitespace_len, text_to_paragraphs};
use crate::options::Options;
use crate::page::{ElementHandle, Page};
use crate::patterns::CHAT_ITEM_TIERS;

/// Per-call collection switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    /// Accept items regardless of visibility (last-resort dumps).
    pub ignore_visibility: bool,
}

impl CollectOptions {
    /// Collection that also accepts invisible items.
    #[must_use]
    pub const fn loose() -> Self {
        Self {
            ignore_visibility: true,
        }
    }
}

/// Collect message-like items from `area` and concatenate their markup.
///
/// Item selectors are tried tier by tier; collection stops after the first
/// tier that brings the total to `min_collected_items`. When no item is found
/// the area itself is rendered through the same fallbacks a single item gets.
/// Returns an empty string when nothing has content.
#[must_use]
pub fn collect(
    page: &Page,
    area: ElementHandle,
    collect_options: CollectOptions,
    options: &Options,
) -> String {
    let items = find_items(page, area, collect_options, options);
    debug!(
        area = %page.describe(Some(area)),
        items = items.len(),
        ignore_visibility = collect_options.ignore_visibility,
        "collected chat items"
    );

    if !items.is_empty() {
        return items
            .into_iter()
            .filter_map(|item| normalize_item(page, item, options))
            .collect();
    }

    let html = area_fallback(page, area);
    debug!(len = html.len(), "collector fell back to area markup");
    html
}

fn find_items(
    page: &Page,
    area: ElementHandle,
    collect_options: CollectOptions,
    options: &Options,
) -> Vec<ElementHandle> {
    let mut seen = HashSet::new();
    let mut items: Vec<ElementHandle> = Vec::new();

    for tier in CHAT_ITEM_TIERS {
        for candidate in page.query_all(area, tier) {
            if !collect_options.ignore_visibility && !page.is_visible(candidate) {
                continue;
            }
            if is_blank(&page.composed_text(candidate)) {
                continue;
            }
            if !seen.insert(candidate) {
                continue;
            }
            // nested inside, or wrapping, an item we already have
            if items
                .iter()
                .any(|&item| page.contains(item, candidate) || page.contains(candidate, item))
            {
                continue;
            }
            items.push(candidate);
        }
        if items.len() >= options.min_collected_items {
            break;
        }
    }
    items
}

/// Render one collected element as a self-contained fragment.
///
/// Elements whose own markup is negligible are replaced by, in order: the
/// markup of their encapsulated subtree inside a clone of the element, that
/// subtree's text as paragraphs, or the element's own text as paragraphs.
/// Returns `None` when nothing has content.
#[must_use]
pub fn normalize_item(page: &Page, item: ElementHandle, options: &Options) -> Option<String> {
    let inner = page.inner_html(item);
    if non_whitespace_len(&inner) >= options.negligible_markup_chars {
        return Some(page.outer_html(item));
    }

    if let Some(shadow) = page.shadow_html(item).filter(|html| has_text(html)) {
        let node = page.node(item)?;
        return Some(dom::wrap_in_clone(&node, &shadow));
    }

    if let Some(paragraphs) = page
        .shadow_text(item)
        .map(|text| text_to_paragraphs(&text))
        .filter(|html| !html.is_empty())
    {
        return Some(text_fallback("shadow-text", &paragraphs));
    }

    let paragraphs = text_to_paragraphs(&page.text(item));
    if paragraphs.is_empty() {
        debug!(item = %page.describe(Some(item)), "dropping item without content");
        return None;
    }
    Some(text_fallback("text", &paragraphs))
}

fn text_fallback(origin: &str, paragraphs: &str) -> String {
    format!(r#"<div data-nlm-fallback="{origin}">{paragraphs}</div>"#)
}

fn area_fallback(page: &Page, area: ElementHandle) -> String {
    let inner = page.inner_html(area);
    if has_text(&inner) {
        return inner;
    }
    if let Some(shadow) = page.shadow_html(area).filter(|html| has_text(html)) {
        return shadow;
    }
    if let Some(paragraphs) = page
        .shadow_text(area)
        .map(|text| text_to_paragraphs(&text))
        .filter(|html| !html.is_empty())
    {
        return paragraphs;
    }
    text_to_paragraphs(&page.visible_text(area))
}

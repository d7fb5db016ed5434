//! The individual extraction strategies, from most to least precise.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::chain::{ChainContext, ExtractionStrategy};
use crate::collector::{collect, CollectOptions};
use crate::locator::{locate_panel, locate_toolbar};
use crate::markup::{has_text, is_blank, text_to_paragraphs};
use crate::page::{ElementHandle, Page};
use crate::patterns::{BUTTONS, NOTES_FALLBACK};
use crate::result::SourceStrategy;

/// The user's active text selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveSelection;

#[async_trait(?Send)]
impl ExtractionStrategy for ActiveSelection {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::Selection
    }

    async fn attempt(&self, cx: &ChainContext<'_>) -> Option<String> {
        cx.page.selection_html().filter(|html| has_text(html))
    }
}

/// Toolbar, then panel, then the items of its message area.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatedRegion;

#[async_trait(?Send)]
impl ExtractionStrategy for LocatedRegion {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::LocatedRegion
    }

    async fn attempt(&self, cx: &ChainContext<'_>) -> Option<String> {
        let toolbar = locate_toolbar(cx.page, cx.options)?;
        let location = locate_panel(cx.page, cx.session, toolbar, cx.options)?;
        Some(collect(
            cx.page,
            location.area,
            CollectOptions::default(),
            cx.options,
        ))
    }
}

/// The area remembered by an earlier locate, if still attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedRegion;

#[async_trait(?Send)]
impl ExtractionStrategy for CachedRegion {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::CachedRegion
    }

    async fn attempt(&self, cx: &ChainContext<'_>) -> Option<String> {
        let area = cx.session.region().get(cx.page)?;
        debug!(area = %cx.page.describe(Some(area)), "using cached area");
        Some(collect(cx.page, area, CollectOptions::default(), cx.options))
    }
}

/// Click the host's own "copy chat" control and read the clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardCopy;

/// The host's "copy chat" control: label (`data-tooltip`, else `aria-label`)
/// or text containing "copy chat", case-insensitively.
#[must_use]
pub fn find_copy_chat_button(page: &Page) -> Option<ElementHandle> {
    const NEEDLE: &str = "copy chat";
    page.query_all(page.root(), BUTTONS).into_iter().find(|&btn| {
        let label = page
            .attr(btn, "data-tooltip")
            .filter(|label| !label.is_empty())
            .or_else(|| page.attr(btn, "aria-label"))
            .unwrap_or_default()
            .to_lowercase();
        label.contains(NEEDLE) || page.text(btn).to_lowercase().contains(NEEDLE)
    })
}

#[async_trait(?Send)]
impl ExtractionStrategy for ClipboardCopy {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::Clipboard
    }

    async fn attempt(&self, cx: &ChainContext<'_>) -> Option<String> {
        let Some(button) = find_copy_chat_button(cx.page) else {
            debug!("no copy chat control");
            return None;
        };
        if let Err(err) = cx.host.activate(cx.page, button).await {
            warn!(error = %err, "copy chat activation failed");
            return None;
        }
        tokio::time::sleep(cx.options.clipboard_settle_delay).await;

        let text = match cx.host.read_clipboard().await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "clipboard read failed");
                return None;
            }
        };
        if is_blank(&text) {
            debug!("clipboard is empty");
            return None;
        }
        debug!(len = text.len(), "clipboard text");
        cx.host.notify("Copied chat to clipboard, preparing PDF export…");
        Some(text_to_paragraphs(&text))
    }
}

/// Note-shaped elements anywhere on the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotesScan;

#[async_trait(?Send)]
impl ExtractionStrategy for NotesScan {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::Notes
    }

    async fn attempt(&self, cx: &ChainContext<'_>) -> Option<String> {
        let page = cx.page;
        let limit = cx.options.min_collected_items;
        let mut seen = HashSet::new();
        let mut picked: Vec<ElementHandle> = Vec::new();

        'tiers: for selector in NOTES_FALLBACK {
            for el in page.query_all(page.root(), selector) {
                if seen.contains(&el) || !page.is_visible(el) || is_blank(&page.text(el)) {
                    continue;
                }
                seen.insert(el);
                if picked
                    .iter()
                    .any(|&note| page.contains(note, el) || page.contains(el, note))
                {
                    continue;
                }
                picked.push(el);
                if picked.len() >= limit {
                    break 'tiers;
                }
            }
        }

        if picked.is_empty() {
            return None;
        }
        debug!(notes = picked.len(), "notes fallback");
        Some(picked.into_iter().map(|el| page.outer_html(el)).collect())
    }
}

/// `main`, then `body`, then the document element, each tried strict,
/// loose and raw.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDump;

#[async_trait(?Send)]
impl ExtractionStrategy for RawDump {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::RawDump
    }

    async fn attempt(&self, cx: &ChainContext<'_>) -> Option<String> {
        let page = cx.page;
        let targets = [page.main(), page.body(), page.document_element()];
        for target in targets.into_iter().flatten() {
            debug!(target = %page.describe(Some(target)), "raw dump");
            let html = non_blank(collect(page, target, CollectOptions::default(), cx.options))
                .or_else(|| non_blank(collect(page, target, CollectOptions::loose(), cx.options)))
                .or_else(|| non_blank(page.inner_html(target)));
            if html.is_some() {
                return html;
            }
        }
        None
    }
}

fn non_blank(html: String) -> Option<String> {
    (!is_blank(&html)).then_some(html)
}

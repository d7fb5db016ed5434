//! Extraction strategy chain.
//!
//! # Module Structure
//!
//! - `host`: the browser seam (click, clipboard, notices)
//! - `chain`: strategy trait, context and the first-success combinator
//! - `strategies`: selection, located region, cached region, clipboard,
//!   notes and raw dump
//!
//! # Usage
//!
//! ```rust,ignore
//! use nlm_export::extractor::{export, ChainContext, DetachedHost};
//!
//! let cx = ChainContext::new(&page, &session, &DetachedHost, &options);
//! let payload = export(&cx).await?;
//! ```

pub mod chain;
pub mod host;
pub mod strategies;

pub use chain::{Chain, ChainContext, ExtractionStrategy};
pub use host::{DetachedHost, HostBridge};

use tracing::warn;

use crate::error::{Error, Result};
use crate::markup::has_text;
use crate::result::{ExportPayload, ExtractionResult, MathDelimiter};

/// Raw markup from the standard chain, or an empty string when every
/// strategy came up empty. Never fails.
pub async fn gather_export_html(cx: &ChainContext<'_>) -> String {
    Chain::standard()
        .first_success(cx)
        .await
        .map(|result| result.html)
        .unwrap_or_default()
}

/// Run the standard chain and build the payload for the rendering surface.
///
/// # Errors
///
/// Returns [`Error::InsufficientContent`] when no strategy produced markup
/// with readable text.
pub async fn export(cx: &ChainContext<'_>) -> Result<ExportPayload> {
    export_with(cx, &Chain::standard()).await
}

/// Export limited to the active selection.
///
/// # Errors
///
/// Returns [`Error::InsufficientContent`] when nothing is selected.
pub async fn export_selection(cx: &ChainContext<'_>) -> Result<ExportPayload> {
    export_with(cx, &Chain::selection_only()).await
}

/// Run `chain`, clean the markup and build the payload.
///
/// The user is notified through the host when the export is aborted.
///
/// # Errors
///
/// Returns [`Error::InsufficientContent`] when the cleaned markup has no text
/// left once tags and whitespace are stripped.
pub async fn export_with(cx: &ChainContext<'_>, chain: &Chain) -> Result<ExportPayload> {
    let raw = chain.first_success(cx).await;
    let html = raw
        .as_ref()
        .map(|ExtractionResult { html, .. }| crate::clean_markup(html))
        .unwrap_or_default();

    if !has_text(&html) {
        let preview: String = raw
            .as_ref()
            .map(|r| r.html.chars().take(120).collect())
            .unwrap_or_else(|| "<empty>".to_string());
        warn!(preview = %preview, "export aborted, insufficient markup");
        let err = Error::InsufficientContent;
        cx.host.notify(&err.to_string());
        return Err(err);
    }

    Ok(ExportPayload {
        html,
        title: cx.page.title(),
        url: cx.page.url().to_string(),
        math_delimiters: MathDelimiter::configured(cx.options.include_inline_dollar),
    })
}

//! # nlm-export
//!
//! Heuristic chat extraction and print-ready markup normalization for
//! NotebookLM pages.
//!
//! The crate finds the chat on a page whose markup it does not control,
//! collects the conversation through an ordered chain of fallbacks, strips
//! executable and framework content, and rewrites the markup for print:
//! citation chips go away, broken LaTeX wrappers are repaired and bare LaTeX
//! gets math delimiters.
//!
//! ## Quick Start
//!
//! ```rust
//! use nlm_export::{normalize, sanitize};
//!
//! let raw = r#"<p onclick="track()">Energy<sup>3</sup> is</p><p>\frac{m c^2}{1}</p>"#;
//! let clean = normalize(&sanitize(raw));
//! assert_eq!(
//!     clean,
//!     r#"<p>Energy is</p><div class="math-block">$$\frac{m c^2}{1}$$</div>"#
//! );
//! ```
//!
//! Exporting a live page goes through the strategy chain:
//!
//! ```rust
//! use nlm_export::extractor::{export, ChainContext, DetachedHost};
//! use nlm_export::{Options, Page, SessionContext};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let page = Page::parse(r#"<main><article><p>Q: what is a graph?</p></article></main>"#)
//!     .with_title("Notebook")
//!     .with_url("https://notebooklm.google.com/notebook/1");
//! let session = SessionContext::new();
//! let options = Options::default();
//! let cx = ChainContext::new(&page, &session, &DetachedHost, &options);
//!
//! let payload = export(&cx).await?;
//! assert!(payload.html.contains("what is a graph?"));
//! # Ok::<(), nlm_export::Error>(())
//! # }).unwrap();
//! ```
//!
//! ## Features
//!
//! - **Locating**: toolbar, panel and message area found from the host's own
//!   controls, across encapsulated subtrees
//! - **Extraction chain**: selection, located region, cached region,
//!   clipboard, notes and a raw dump, first success wins
//! - **Sanitizing**: scripts, frames, handlers and framework attributes removed
//! - **Normalizing**: dividers, citations, LaTeX artifacts, display math
//! - **Upkeep**: an idempotent, debounced injector for the toolbar control

mod error;
mod options;
mod patterns;
mod result;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Page snapshot with encapsulated subtrees, visibility and text selection.
pub mod page;

/// Inline style parsing for visibility checks.
pub mod visibility;

/// Per-page session state (remembered chat area).
pub mod session;

/// Small text and markup helpers.
pub mod markup;

/// Toolbar, panel and message area lookup.
pub mod locator;

/// Message collection from a chat area.
pub mod collector;

/// Extraction strategies and the first-success chain.
pub mod extractor;

/// Removal of executable content and framework attributes.
pub mod sanitize;

/// Print normalization passes.
pub mod normalize;

/// The injected toolbar control.
pub mod inject;

/// Debounced reactive upkeep.
pub mod scheduler;

/// Cross-context request and response types.
pub mod messaging;

/// Payload hand-off to the print surface.
pub mod handoff;

/// Print surface preparation.
pub mod render;

// Public API - re-exports
pub use error::{Error, Result};
pub use normalize::{normalize, normalize_with_options};
pub use options::Options;
pub use page::{ElementHandle, Page, ScopeId};
pub use result::{ExportMode, ExportPayload, ExtractionResult, MathDelimiter, SourceStrategy};
pub use sanitize::sanitize;
pub use session::SessionContext;

/// Sanitize, then normalize, raw markup for display.
///
/// ```rust
/// use nlm_export::clean_markup;
///
/// assert_eq!(
///     clean_markup("<p>---</p><script>x()</script><p>Done<sup>2</sup> now.</p>"),
///     r#"<hr class="nlm-divider"><p>Done now.</p>"#
/// );
/// ```
#[must_use]
pub fn clean_markup(html: &str) -> String {
    normalize(&sanitize(html))
}

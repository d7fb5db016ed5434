//! Ordered, short-circuiting strategy chain.

use async_trait::async_trait;
use tracing::debug;

use super::host::HostBridge;
use super::strategies::{
    ActiveSelection, CachedRegion, ClipboardCopy, LocatedRegion, NotesScan, RawDump,
};
use crate::markup::is_blank;
use crate::options::Options;
use crate::page::Page;
use crate::result::{ExtractionResult, SourceStrategy};
use crate::session::SessionContext;

/// Everything a strategy may look at.
#[derive(Clone, Copy)]
pub struct ChainContext<'a> {
    pub page: &'a Page,
    pub session: &'a SessionContext,
    pub host: &'a dyn HostBridge,
    pub options: &'a Options,
}

impl<'a> ChainContext<'a> {
    #[must_use]
    pub fn new(
        page: &'a Page,
        session: &'a SessionContext,
        host: &'a dyn HostBridge,
        options: &'a Options,
    ) -> Self {
        Self {
            page,
            session,
            host,
            options,
        }
    }
}

/// One way of producing exportable markup.
///
/// A strategy either yields raw markup or `None`; it never fails the chain.
#[async_trait(?Send)]
pub trait ExtractionStrategy {
    /// Which result source this strategy reports.
    fn source(&self) -> SourceStrategy;

    /// Try to produce markup.
    async fn attempt(&self, cx: &ChainContext<'_>) -> Option<String>;
}

/// Strategies evaluated in order until one yields non-blank markup.
pub struct Chain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Chain {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Chain for the injected toolbar control (a user gesture, so the
    /// clipboard step is allowed).
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ActiveSelection),
            Box::new(LocatedRegion),
            Box::new(CachedRegion),
            Box::new(ClipboardCopy),
            Box::new(NotesScan),
            Box::new(RawDump),
        ])
    }

    /// Chain for exports limited to the active selection.
    #[must_use]
    pub fn selection_only() -> Self {
        Self::new(vec![Box::new(ActiveSelection)])
    }

    /// Chain for cross-context requests: no user gesture, no clipboard.
    #[must_use]
    pub fn message() -> Self {
        Self::new(vec![
            Box::new(ActiveSelection),
            Box::new(LocatedRegion),
            Box::new(CachedRegion),
            Box::new(NotesScan),
            Box::new(RawDump),
        ])
    }

    /// Sources in evaluation order.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceStrategy> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    /// Run strategies in order and return the first non-blank result.
    ///
    /// Later strategies are never evaluated once one succeeds.
    pub async fn first_success(&self, cx: &ChainContext<'_>) -> Option<ExtractionResult> {
        for strategy in &self.strategies {
            let source = strategy.source();
            match strategy.attempt(cx).await {
                Some(html) if !is_blank(&html) => {
                    debug!(source = source.as_str(), len = html.len(), "export source");
                    return Some(ExtractionResult { html, source });
                }
                _ => debug!(source = source.as_str(), "strategy yielded nothing"),
            }
        }
        None
    }
}

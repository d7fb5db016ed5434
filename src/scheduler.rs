//! Reactive upkeep of the injected control and the remembered chat area.
//!
//! The host page re-renders freely. Every batch of structural changes
//! triggers one [`Scheduler::tick`], which re-checks the page and performs
//! only the corrective actions that are needed, so ticks can run any number
//! of times without piling up side effects.

use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, trace};

use crate::inject::{find_injected, inject_toolbar_button};
use crate::locator::{locate_area_fallback, locate_panel, locate_toolbar};
use crate::options::Options;
use crate::page::{ElementHandle, Page};
use crate::session::SessionContext;

/// One structural-change notification from the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationBatch {
    /// Nodes added by the batch.
    pub added: usize,
    /// Nodes removed by the batch.
    pub removed: usize,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The control on the page after the tick.
    pub control: Option<ElementHandle>,
    /// True when the tick had to (re)inject the control.
    pub injected: bool,
    /// True when a detached cached area was dropped.
    pub cache_cleared: bool,
    /// The remembered area after the tick.
    pub area: Option<ElementHandle>,
}

/// Debounced driver of the upkeep ticks.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    options: Options,
}

impl Scheduler {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Re-inject the control if needed, drop a detached cached area and
    /// refresh the cache from the located panel, falling back to any
    /// message-list-shaped region when nothing is remembered.
    pub fn tick(&self, page: &Page, session: &SessionContext) -> TickReport {
        let present = find_injected(page).is_some();
        let control = inject_toolbar_button(page, &self.options);
        let cache_cleared = session.region().clear_if_detached(page);

        let located = locate_toolbar(page, &self.options)
            .and_then(|toolbar| locate_panel(page, session, toolbar, &self.options));
        if located.is_none() && session.region().is_empty() {
            locate_area_fallback(page, session);
        }

        let report = TickReport {
            control,
            injected: !present && control.is_some(),
            cache_cleared,
            area: session.region().get(page),
        };
        trace!(?report, "scheduler tick");
        report
    }

    /// Tick once, then once per debounced burst of batches until the channel
    /// closes. Returns the number of ticks run.
    ///
    /// Batches arriving within `scheduler_debounce` of each other are
    /// coalesced.
    pub async fn run(
        &self,
        page: &Page,
        session: &SessionContext,
        mut rx: mpsc::UnboundedReceiver<MutationBatch>,
    ) -> usize {
        self.tick(page, session);
        let mut ticks = 1;

        while let Some(first) = rx.recv().await {
            let mut pending = vec![first];
            let mut closed = false;
            loop {
                tokio::select! {
                    next = rx.recv() => match next {
                        Some(batch) => pending.push(batch),
                        None => {
                            closed = true;
                            break;
                        }
                    },
                    () = time::sleep(self.options.scheduler_debounce) => break,
                }
            }

            debug!(
                batches = pending.len(),
                added = pending.iter().map(|b| b.added).sum::<usize>(),
                removed = pending.iter().map(|b| b.removed).sum::<usize>(),
                "page changed"
            );
            self.tick(page, session);
            ticks += 1;
            if closed {
                break;
            }
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <section id="panel">
          <div role="toolbar">
            <button aria-label="Refresh chat messages">r</button>
            <button>Copy chat</button>
          </div>
          <div id="log" role="log"><p>msg</p></div>
        </section>"#;

    #[test]
    fn test_tick_injects_and_remembers() {
        let page = Page::parse(PAGE);
        let session = SessionContext::new();
        let scheduler = Scheduler::default();

        let report = scheduler.tick(&page, &session);
        assert!(report.injected);
        assert!(report.control.is_some());
        let log = page.query_first(page.root(), "#log");
        assert_eq!(report.area, log);

        let again = scheduler.tick(&page, &session);
        assert!(!again.injected);
        assert_eq!(again.control, report.control);
        assert_eq!(again.area, log);
    }

    #[test]
    fn test_tick_clears_detached_area() {
        let page = Page::parse(PAGE);
        let session = SessionContext::new();
        let scheduler = Scheduler::default();
        scheduler.tick(&page, &session);

        let log = page.query_first(page.root(), "#log").expect("log");
        page.detach(log);
        let report = scheduler.tick(&page, &session);
        assert!(report.cache_cleared);
        assert_ne!(report.area, Some(log));
    }

    #[test]
    fn test_tick_fallback_without_toolbar() {
        let page = Page::parse(r#"<div role="feed" id="feed"><article>x</article></div>"#);
        let session = SessionContext::new();
        let report = Scheduler::default().tick(&page, &session);
        assert!(report.control.is_none());
        assert_eq!(report.area, page.query_first(page.root(), "#feed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_coalesces_bursts() {
        let page = Page::parse(PAGE);
        let session = SessionContext::new();
        let scheduler = Scheduler::default();
        let (tx, rx) = mpsc::unbounded_channel();

        let driver = async move {
            for _ in 0..5 {
                let _ = tx.send(MutationBatch { added: 1, removed: 0 });
            }
            time::sleep(std::time::Duration::from_millis(200)).await;
            let _ = tx.send(MutationBatch::default());
            time::sleep(std::time::Duration::from_millis(200)).await;
        };

        let (ticks, ()) = tokio::join!(scheduler.run(&page, &session, rx), driver);
        assert_eq!(ticks, 3);
    }
}

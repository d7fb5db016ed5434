//! Host seam: the interactions that need the live browser.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::page::{ElementHandle, Page};

/// What the extraction chain needs from the browser around the page.
///
/// Futures are not `Send`: the page snapshot is single-threaded.
#[async_trait(?Send)]
pub trait HostBridge {
    /// Activate (click) a control of the page.
    async fn activate(&self, page: &Page, control: ElementHandle) -> Result<()>;

    /// Read the system clipboard as text.
    async fn read_clipboard(&self) -> Result<String>;

    /// Show a short user-facing notice.
    fn notify(&self, message: &str) {
        info!(message, "notice");
    }
}

/// Host for snapshots with no browser behind them.
///
/// Activation does nothing and the clipboard is never readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

#[async_trait(?Send)]
impl HostBridge for DetachedHost {
    async fn activate(&self, page: &Page, control: ElementHandle) -> Result<()> {
        debug!(control = %page.describe(Some(control)), "activate ignored without a browser");
        Ok(())
    }

    async fn read_clipboard(&self) -> Result<String> {
        Err(Error::Clipboard("no clipboard without a browser".to_string()))
    }
}

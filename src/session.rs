//! Per-page session state.
//!
//! One [`SessionContext`] lives as long as the page session and is passed by
//! reference to the locator, the scheduler and the extraction chain. Its only
//! mutable state is the remembered chat area.

use std::cell::Cell;

use tracing::debug;

use crate::page::{ElementHandle, Page};

/// Remembers the most recently located chat area.
///
/// The stored handle is a weak reference: it never keeps the element alive,
/// and reads go through [`RegionCache::get`], which drops it once the element
/// has been detached.
#[derive(Debug, Default)]
pub struct RegionCache {
    area: Cell<Option<ElementHandle>>,
}

impl RegionCache {
    /// Remember `area` if it is attached and visible. Otherwise a no-op.
    ///
    /// Returns whether the cache was updated.
    pub fn remember(&self, page: &Page, area: ElementHandle) -> bool {
        if !page.is_connected(area) || !page.is_visible(area) {
            return false;
        }
        self.area.set(Some(area));
        debug!(area = %page.describe(Some(area)), "remembered chat area");
        true
    }

    /// The remembered area, if it is still attached.
    ///
    /// A stale entry is cleared as a side effect.
    #[must_use]
    pub fn get(&self, page: &Page) -> Option<ElementHandle> {
        let area = self.area.get()?;
        if page.is_connected(area) {
            Some(area)
        } else {
            debug!("dropping detached chat area");
            self.area.set(None);
            None
        }
    }

    /// Drop the entry if its element has been detached.
    ///
    /// Returns whether something was cleared.
    pub fn clear_if_detached(&self, page: &Page) -> bool {
        self.area.get().is_some() && self.get(page).is_none()
    }

    /// True when nothing is remembered (stale entries still count).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.area.get().is_none()
    }
}

/// State shared by every operation of one page session.
#[derive(Debug, Default)]
pub struct SessionContext {
    region: RegionCache,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The remembered chat area.
    #[must_use]
    pub fn region(&self) -> &RegionCache {
        &self.region
    }
}

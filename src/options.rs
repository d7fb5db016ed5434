//! Configuration options for locating, collecting and exporting content.
//!
//! The `Options` struct holds the tuning constants of the heuristics. There is
//! no persisted configuration and no environment lookup; callers construct it
//! in code.

use std::time::Duration;

/// Configuration options for extraction and normalization.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use nlm_export::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     clipboard_settle_delay: Duration::from_millis(500),
///     include_inline_dollar: false,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Time to wait after activating the host's "copy chat" control before
    /// reading the clipboard.
    ///
    /// Default: `200ms`
    pub clipboard_settle_delay: Duration,

    /// Maximum number of ancestor levels climbed when resolving the toolbar
    /// from its anchor and the panel from its toolbar.
    ///
    /// Default: `6`
    pub max_ancestor_climb: usize,

    /// Number of message-like items after which the collector stops trying
    /// further selector tiers. Also caps the notes scan.
    ///
    /// Default: `3`
    pub min_collected_items: usize,

    /// Collected elements whose inner markup has fewer non-whitespace
    /// characters than this are replaced by a fallback rendition.
    ///
    /// Default: `10`
    pub negligible_markup_chars: usize,

    /// Bare LaTeX longer than this (in characters) is promoted to display math
    /// even without a block command.
    ///
    /// Default: `80`
    pub display_math_min_len: usize,

    /// Include the bare `$…$` inline delimiter in the renderer configuration.
    ///
    /// Disable on pages where `$` is mostly used for currency.
    ///
    /// Default: `true`
    pub include_inline_dollar: bool,

    /// Window during which structural-change batches are coalesced into a
    /// single scheduler tick.
    ///
    /// Default: `50ms`
    pub scheduler_debounce: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            clipboard_settle_delay: Duration::from_millis(200),
            max_ancestor_climb: 6,
            min_collected_items: 3,
            negligible_markup_chars: 10,
            display_math_min_len: 80,
            include_inline_dollar: true,
            scheduler_debounce: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();

        assert_eq!(opts.clipboard_settle_delay, Duration::from_millis(200));
        assert_eq!(opts.max_ancestor_climb, 6);
        assert_eq!(opts.min_collected_items, 3);
        assert_eq!(opts.negligible_markup_chars, 10);
        assert_eq!(opts.display_math_min_len, 80);
        assert!(opts.include_inline_dollar);
        assert_eq!(opts.scheduler_debounce, Duration::from_millis(50));
    }

    #[test]
    fn test_custom_options() {
        let opts = Options {
            max_ancestor_climb: 3,
            include_inline_dollar: false,
            ..Options::default()
        };

        assert_eq!(opts.max_ancestor_climb, 3);
        assert!(!opts.include_inline_dollar);
        assert_eq!(opts.min_collected_items, 3);
    }
}

//! Content normalizer.
//!
//! Rewrites sanitized markup for print: stray citation UI goes away, broken
//! LaTeX wrappers are repaired, undelimited LaTeX is delimited and display
//! math gets its own block.
//!
//! # Module Structure
//!
//! - `dividers`: `<p>---</p>` to `<hr>`
//! - `citations`: citation markers removed, word spacing kept
//! - `latex`: `\text{$$…}` wrapper repair
//! - `promote`: bare LaTeX gets `$`/`$$` delimiters
//! - `display`: standalone `$$…$$` wrapped in `div.math-block`
//!
//! Every pass works on the fragment root only, is idempotent, and leaves text
//! it does not target byte-for-byte intact.

pub mod citations;
pub mod display;
pub mod dividers;
pub mod latex;
pub mod promote;

use tracing::trace;

use crate::dom::{self, Selection};
use crate::Options;

/// A single rewrite over the fragment root.
pub type PassFn = fn(&Selection, &Options);

/// Ordered list of named passes.
#[derive(Debug, Clone)]
pub struct Pipeline {
    passes: Vec<(&'static str, PassFn)>,
}

impl Pipeline {
    /// Divider conversion, citation removal, LaTeX repair, bare LaTeX
    /// promotion, display blocks.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            passes: vec![
                ("dividers", dividers::convert as PassFn),
                ("citations", citations::remove as PassFn),
                ("latex", latex::repair as PassFn),
                ("promote", promote::promote as PassFn),
                ("display", display::wrap as PassFn),
            ],
        }
    }

    /// Pass names in application order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|(name, _)| *name).collect()
    }

    /// Apply every pass to `root` in order.
    pub fn run(&self, root: &Selection, options: &Options) {
        for (name, pass) in &self.passes {
            trace!(pass = name, "normalize");
            pass(root, options);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Normalize a markup fragment with default options.
///
/// ```rust
/// use nlm_export::normalize;
///
/// assert_eq!(
///     normalize("<p>Result<sup>12</sup> shown</p><p>---</p>"),
///     r#"<p>Result shown</p><hr class="nlm-divider">"#
/// );
/// ```
#[must_use]
pub fn normalize(html: &str) -> String {
    normalize_with_options(html, &Options::default())
}

/// Normalize a markup fragment.
#[must_use]
pub fn normalize_with_options(html: &str, options: &Options) -> String {
    let doc = dom::parse(html);
    let root = dom::body(&doc);
    Pipeline::standard().run(&root, options);
    dom::inner_html(&root).to_string()
}

/// Apply a single pass to a markup fragment with default options.
#[must_use]
pub fn apply_pass(html: &str, pass: PassFn) -> String {
    let doc = dom::parse(html);
    let root = dom::body(&doc);
    pass(&root, &Options::default());
    dom::inner_html(&root).to_string()
}

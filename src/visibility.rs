//! Inline-style based visibility rules.
//!
//! A page snapshot has no layout engine, so the `style` attribute is the only
//! computed-style source. Declarations are parsed leniently: anything that
//! does not look like `name: value` is skipped and `!important` is ignored.

/// The subset of inline style declarations that affect visibility.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    pub display_none: bool,
    /// `Some(true)` for `hidden`/`collapse`, `Some(false)` for `visible`.
    pub visibility_hidden: Option<bool>,
    pub opacity: Option<f32>,
    pub zero_width: bool,
    pub zero_height: bool,
}

impl InlineStyle {
    /// Parse the value of a `style` attribute. Later declarations win.
    #[must_use]
    pub fn parse(style: &str) -> Self {
        let mut parsed = Self::default();
        for declaration in style.split(';') {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            let value = value.trim_end_matches("!important").trim();
            if value.is_empty() {
                continue;
            }
            match name.as_str() {
                "display" => parsed.display_none = value == "none",
                "visibility" => {
                    parsed.visibility_hidden = Some(matches!(value, "hidden" | "collapse"));
                }
                "opacity" => parsed.opacity = parse_opacity(value),
                "width" => parsed.zero_width = is_zero_length(value),
                "height" => parsed.zero_height = is_zero_length(value),
                _ => {}
            }
        }
        parsed
    }

    /// Element declares no box of its own.
    #[inline]
    #[must_use]
    pub fn is_zero_box(&self) -> bool {
        self.zero_width && self.zero_height
    }

    /// Own opacity is zero (opacity is not inherited here, only composed).
    #[inline]
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity.is_some_and(|o| o <= 0.0)
    }
}

fn parse_opacity(value: &str) -> Option<f32> {
    if let Some(percent) = value.strip_suffix('%') {
        return percent.trim().parse::<f32>().ok().map(|p| p / 100.0);
    }
    value.parse::<f32>().ok()
}

fn is_zero_length(value: &str) -> bool {
    let number = value.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number.parse::<f32>().is_ok_and(|n| n.abs() <= f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_none() {
        assert!(InlineStyle::parse("display: none").display_none);
        assert!(InlineStyle::parse("color:red;DISPLAY:NONE !important").display_none);
        assert!(!InlineStyle::parse("display:block").display_none);
    }

    #[test]
    fn test_later_declaration_wins() {
        assert!(!InlineStyle::parse("display:none; display:flex").display_none);
    }

    #[test]
    fn test_visibility_values() {
        assert_eq!(InlineStyle::parse("visibility:hidden").visibility_hidden, Some(true));
        assert_eq!(InlineStyle::parse("visibility:collapse").visibility_hidden, Some(true));
        assert_eq!(InlineStyle::parse("visibility:visible").visibility_hidden, Some(false));
        assert_eq!(InlineStyle::parse("color:red").visibility_hidden, None);
    }

    #[test]
    fn test_opacity() {
        assert!(InlineStyle::parse("opacity:0").is_transparent());
        assert!(InlineStyle::parse("opacity: 0%").is_transparent());
        assert!(!InlineStyle::parse("opacity:0.5").is_transparent());
        assert!(!InlineStyle::parse("opacity:bogus").is_transparent());
    }

    #[test]
    fn test_zero_box_needs_both_dimensions() {
        assert!(InlineStyle::parse("width:0;height:0px").is_zero_box());
        assert!(!InlineStyle::parse("width:0").is_zero_box());
        assert!(!InlineStyle::parse("width:0;height:10px").is_zero_box());
    }

    #[test]
    fn test_garbage_is_skipped() {
        let style = InlineStyle::parse(";;nonsense;display:;:none");
        assert_eq!(style, InlineStyle::default());
    }
}

//! Shared helpers for the HTML and script scrapers.

use regex::Regex;
use scraper::{ElementRef, Selector};

/// Compiles a regex from a static pattern.
///
/// Panics only when the pattern literal itself is invalid, which is a
/// programming error caught by the unit tests of each caller.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Parses a CSS selector from a static pattern.
pub(crate) fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e}"))
}

/// All text under an element, whitespace-collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    crate::architecture::collapse_whitespace(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_element_text_collapses_nested_text() {
        let html = Html::parse_fragment("<h3>  There are <b>3</b>\n sequences </h3>");
        let selector = compile_static_selector("h3");
        let h3 = html.select(&selector).next();
        assert_eq!(h3.map(element_text).as_deref(), Some("There are 3 sequences"));
    }

    #[test]
    #[should_panic(expected = "invalid static regex")]
    fn test_compile_static_regex_panics_on_bad_pattern() {
        let _ = compile_static_regex("(unclosed");
    }
}

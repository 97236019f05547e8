//! Architecture-graphics listing: candidate rows and their script accessors.
//!
//! A listing page carries one `div.graphicRow` per architecture. The row's
//! `id` is `row<primary protein id>` and its `h3` holds a sentence such as
//! "There are 24 sequences with the following architecture: DEAD, Helicase_C".
//! An inline script maps each row id to an opaque accessor on the line right
//! after the row is first referenced:
//!
//! ```text
//! rows["rowQ9XYZ1"] = $("rowQ9XYZ1");
//! rows["rowQ9XYZ1"].store( "arch", "10010 20020" );
//! ```

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::{ARCHITECTURE_LABEL, ExtractionMiss};
use crate::markup::{compile_static_regex, compile_static_selector, element_text};

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"div.graphicRow[id^="row"]"#));
static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("h3"));
static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("script"));

static ACCESSOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"\.store\(\s*"arch"\s*,\s*(?:"([^"]*)"|([^\s",;)]+))"#)
});

/// Marker after which the listing script stops describing rows.
const SCRIPT_LAYOUT_MARKER: &str = "var layout";

/// Multiplicity markers that make an architecture name a fusion.
const MULTIPLICITY_MARKERS: [&str; 2] = [" x ", " \u{d7} "];

/// One row of the listing, before qualification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Row id without its `row` prefix.
    pub primary_id: String,
    /// Heading text, whitespace-collapsed.
    pub description: String,
}

impl ListingRow {
    /// Text after the first `architecture:` label, trimmed.
    #[must_use]
    pub fn architecture_name(&self) -> &str {
        self.description
            .split_once(ARCHITECTURE_LABEL)
            .map_or("", |(_, name)| name.trim())
    }

    /// True when the architecture has more than one domain: a multiplicity
    /// marker or a comma-separated list.
    #[must_use]
    pub fn qualifies(&self) -> bool {
        let name = self.architecture_name();
        name.contains(',') || MULTIPLICITY_MARKERS.iter().any(|m| name.contains(m))
    }
}

/// Owned extraction of one listing document.
///
/// Parsing happens up front so no `scraper::Html` (which is `!Send`) is held
/// across an await point by the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    rows: Vec<Result<ListingRow, ExtractionMiss>>,
    scripts: Vec<Vec<String>>,
}

impl ListingPage {
    /// Parses a listing document.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let rows = document
            .select(&ROW_SELECTOR)
            .filter_map(|row| {
                let primary_id = row.value().id()?.strip_prefix("row")?.to_string();
                let heading = row.select(&HEADING_SELECTOR).next().map(element_text);
                Some(match heading {
                    Some(description) if description.contains(ARCHITECTURE_LABEL) => {
                        Ok(ListingRow {
                            primary_id,
                            description,
                        })
                    }
                    _ => Err(ExtractionMiss::RowHeading { primary_id }),
                })
            })
            .collect();

        let scripts = document
            .select(&SCRIPT_SELECTOR)
            .map(|script| {
                let text = script.text().collect::<String>();
                text.split_once(SCRIPT_LAYOUT_MARKER)
                    .map_or(text.as_str(), |(head, _)| head)
                    .lines()
                    .map(|line| line.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .collect();

        Self { rows, scripts }
    }

    /// Rows in page order; rows without a usable heading are misses.
    #[must_use]
    pub fn rows(&self) -> &[Result<ListingRow, ExtractionMiss>] {
        &self.rows
    }

    /// Lines of each `script` element preceding its layout block, trimmed.
    #[must_use]
    pub fn scripts(&self) -> &[Vec<String>] {
        &self.scripts
    }

    /// Finds the accessor token for a row.
    ///
    /// The first script line referencing `row<primary_id>` is correlated with
    /// the line that follows it in the same script.
    ///
    /// # Errors
    ///
    /// [`ExtractionMiss::AccessorNotFound`] when no line references the row;
    /// [`ExtractionMiss::AccessorMalformed`] when the next line is missing or
    /// carries no `.store( "arch", ... )` token.
    pub fn accessor_for(&self, primary_id: &str) -> Result<String, ExtractionMiss> {
        let needle = format!("row{primary_id}");
        let (lines, position) = self
            .scripts
            .iter()
            .find_map(|lines| {
                let position = lines.iter().position(|line| references_row(line, &needle))?;
                Some((lines, position))
            })
            .ok_or_else(|| ExtractionMiss::AccessorNotFound {
                primary_id: primary_id.to_string(),
            })?;

        lines
            .get(position + 1)
            .and_then(|line| ACCESSOR_RE.captures(line))
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|token| token.as_str().trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ExtractionMiss::AccessorMalformed {
                primary_id: primary_id.to_string(),
            })
    }
}

/// True when `needle` occurs in `line` and is not the prefix of a longer id.
fn references_row(line: &str, needle: &str) -> bool {
    line.match_indices(needle).any(|(at, _)| {
        line[at + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
    })
}

//! Member blocks of the zoomed detail view.
//!
//! Each block reads `ID [organism] function (N residues)`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{ExtractionMiss, Member};
use crate::markup::{compile_static_selector, element_text};

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("body"));

const RESIDUES_SUFFIX: &str = "residues)";

/// Texts of the member blocks in a detail document, in page order.
///
/// Blocks are the direct `div` children of `body`. A lone wrapper `div`
/// holding `div` children is looked through. Blocks without visible text are
/// skipped.
#[must_use]
pub fn detail_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return Vec::new();
    };

    let top = div_children(body);
    let wrapped = match top.as_slice() {
        [wrapper] => div_children(*wrapper),
        _ => Vec::new(),
    };
    let blocks = if wrapped.is_empty() { top } else { wrapped };

    blocks
        .into_iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn div_children(parent: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div")
        .collect()
}

/// Parses one member block.
///
/// # Errors
///
/// Returns [`ExtractionMiss::MemberBlock`] naming the first delimiter that
/// is missing, or a length that is not an integer.
pub fn parse_member(text: &str) -> Result<Member, ExtractionMiss> {
    let miss = |reason: &'static str| ExtractionMiss::MemberBlock {
        text: text.to_string(),
        reason,
    };

    let (protein_id, after_open) = text.split_once('[').ok_or_else(|| miss("missing '['"))?;
    let protein_id = protein_id.trim();
    if protein_id.is_empty() {
        return Err(miss("empty protein id"));
    }
    let (organism_name, after_close) = after_open
        .split_once(']')
        .ok_or_else(|| miss("missing ']'"))?;
    let (function, _) = after_close
        .split_once('(')
        .ok_or_else(|| miss("missing '('"))?;

    let (_, tail) = text.rsplit_once('(').ok_or_else(|| miss("missing '('"))?;
    let (length, _) = tail
        .split_once(RESIDUES_SUFFIX)
        .ok_or_else(|| miss("missing 'residues)'"))?;
    let length = length
        .trim()
        .parse::<u32>()
        .map_err(|_| miss("length is not an integer"))?;

    Ok(Member {
        protein_id: protein_id.to_string(),
        organism_name: organism_name.trim().to_string(),
        function: function.trim().to_string(),
        length,
    })
}

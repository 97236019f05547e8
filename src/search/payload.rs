//! XML payload extraction for the search service.
//!
//! Three documents are read here: the submission acknowledgement (carrying the
//! polling URL), the finished result set (carrying family matches) and the
//! family detail document (carrying the family's display name).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use super::FamilyMatch;

/// A structured payload could not be read.
#[derive(Debug, Clone, Error)]
#[error("malformed XML payload: {reason}")]
pub struct PayloadError {
    reason: String,
}

impl PayloadError {
    fn new(reason: impl ToString) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

/// Returns the text of the first `result_url` element, trimmed.
///
/// `None` means the submission was rejected: either the element is missing,
/// empty, or the response is not XML at all.
#[must_use]
pub fn parse_result_url(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut inside = false;
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"result_url" => inside = true,
            Ok(Event::End(e)) if inside && e.local_name().as_ref() == b"result_url" => break,
            Ok(Event::Text(e)) if inside => text.push_str(&e.unescape().ok()?),
            Ok(Event::CData(e)) if inside => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Extracts every `match` element's `accession` attribute in document order.
///
/// Matches without an accession are skipped.
///
/// # Errors
///
/// Returns [`PayloadError`] when the document is not well-formed XML.
pub fn extract_family_accessions(xml: &str) -> Result<Vec<String>, PayloadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut accessions = Vec::new();
    loop {
        match reader.read_event().map_err(PayloadError::new)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"match" => {
                if let Some(accession) = attribute_value(&e, "accession")? {
                    accessions.push(accession);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(accessions)
}

/// Result extraction: one [`FamilyMatch`] per `match` element, order preserved.
///
/// # Errors
///
/// Returns [`PayloadError`] when the result document is not well-formed XML.
pub fn extract_matches(identifier: &str, xml: &str) -> Result<Vec<FamilyMatch>, PayloadError> {
    Ok(extract_family_accessions(xml)?
        .into_iter()
        .map(|family_id| FamilyMatch {
            identifier: identifier.to_string(),
            family_id,
        })
        .collect())
}

/// Returns the `id` attribute of the first `entry` element.
///
/// # Errors
///
/// Returns [`PayloadError`] when the document is not well-formed XML before
/// the entry is reached.
pub fn parse_family_name(xml: &str) -> Result<Option<String>, PayloadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event().map_err(PayloadError::new)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"entry" => {
                return attribute_value(&e, "id");
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn attribute_value(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, PayloadError> {
    let Some(attribute) = element
        .try_get_attribute(name)
        .map_err(PayloadError::new)?
    else {
        return Ok(None);
    };
    let value = attribute.unescape_value().map_err(PayloadError::new)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

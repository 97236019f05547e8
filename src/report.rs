//! Tab-separated summary and details reports, plus the optional JSON dump.
//!
//! Both reports are spreadsheet-oriented: protein and FIG ids are written as
//! `=HYPERLINK(...)` formulas.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::architecture::Architecture;
use crate::endpoints::Endpoints;
use crate::fetch::FetchError;
use crate::resolver::IdentifierResolver;

/// Summary report header row.
pub const SUMMARY_HEADER: &str = "ORF ID\tFunction\tPfam family\tNumber of seqs with this architecture\tRepresentative Protein ID\tFIG ID\tDomains";

/// Details report header row.
pub const DETAILS_HEADER: &str = "ORF ID\tFunction\tPfam family\tArchitecture, with statistics\tProtein ID\tFunction\tLength\tOrganism Name";

/// Errors raised while producing report files.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A report file could not be written.
    #[error("could not write report '{path}': {source}\n  Suggestion: Check that the directory exists and is writable")]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The JSON dump could not be serialized.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Renders report rows for one run.
#[derive(Debug, Clone, Copy)]
pub struct ReportWriter<'a> {
    endpoints: &'a Endpoints,
    aliases: &'a HashMap<String, String>,
}

impl<'a> ReportWriter<'a> {
    /// Creates a writer; `aliases` maps each identifier to its FASTA alias.
    #[must_use]
    pub fn new(endpoints: &'a Endpoints, aliases: &'a HashMap<String, String>) -> Self {
        Self { endpoints, aliases }
    }

    /// Renders the summary report, one row per architecture.
    ///
    /// The resolver is consulted once per architecture with its member ids.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when a resolver lookup fails.
    pub async fn summary(
        &self,
        architectures: &[Architecture],
        resolver: &dyn IdentifierResolver,
    ) -> Result<String, FetchError> {
        info!("Looking for FIG ids");
        let mut out = String::new();
        push_line(&mut out, SUMMARY_HEADER);

        for architecture in architectures {
            let resolved = resolver.resolve(&architecture.member_ids()).await?;
            let (representative, fig_link) = match resolved {
                Some(found) => (found.alias, self.fig_link(&found.fig_id)),
                None => (architecture.primary_id.clone(), String::new()),
            };
            debug!(
                identifier = %architecture.identifier,
                primary_id = %architecture.primary_id,
                representative = %representative,
                "Summary row"
            );

            let mut cells = vec![
                cell(&architecture.identifier),
                cell(self.alias(&architecture.identifier)),
                family_cell(architecture),
                architecture.sequence_count().unwrap_or_default().to_string(),
                self.protein_link(&representative),
                fig_link,
            ];
            cells.extend(architecture.domains().into_iter().map(cell));
            push_line(&mut out, &cells.join("\t"));
        }
        Ok(out)
    }

    /// Renders the details report, one row per member.
    #[must_use]
    pub fn details(&self, architectures: &[Architecture]) -> String {
        let mut out = String::new();
        push_line(&mut out, DETAILS_HEADER);

        for architecture in architectures {
            for member in &architecture.members {
                let cells = [
                    cell(&architecture.identifier),
                    cell(self.alias(&architecture.identifier)),
                    family_cell(architecture),
                    cell(&architecture.description),
                    self.protein_link(&member.protein_id),
                    cell(&member.function),
                    member.length.to_string(),
                    cell(&member.organism_name),
                ];
                push_line(&mut out, &cells.join("\t"));
            }
        }
        out
    }

    fn alias(&self, identifier: &str) -> &str {
        self.aliases.get(identifier).map_or("", String::as_str)
    }

    fn protein_link(&self, protein_id: &str) -> String {
        hyperlink(&self.endpoints.protein_url(protein_id), protein_id)
    }

    fn fig_link(&self, fig_id: &str) -> String {
        hyperlink(&self.endpoints.annotation_url(fig_id), fig_id)
    }
}

/// Writes a rendered report to `path`.
///
/// # Errors
///
/// Returns [`ReportError::Io`] when the file cannot be written.
pub async fn write_report(path: &Path, contents: &str) -> Result<(), ReportError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), bytes = contents.len(), "Report written");
    Ok(())
}

/// Writes the collected architectures as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ReportError`] on serialization or I/O failure.
pub async fn write_json(path: &Path, architectures: &[Architecture]) -> Result<(), ReportError> {
    let mut json = serde_json::to_string_pretty(architectures)?;
    json.push('\n');
    write_report(path, &json).await
}

fn family_cell(architecture: &Architecture) -> String {
    format!(
        "{} ({})",
        cell(&architecture.family_name),
        architecture.family_id
    )
}

fn hyperlink(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\",\"{}\")",
        formula_string(url),
        formula_string(label)
    )
}

// A double quote inside a formula string literal is written twice.
fn formula_string(text: &str) -> String {
    cell(text).replace('"', "\"\"")
}

// Tabs and line breaks would shift columns.
fn cell(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

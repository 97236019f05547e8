//! FASTA input reading.
//!
//! Yields `(identifier, alias, sequence)` records with a forward-only cursor.
//! The header's first space-separated field is the identifier; anything after
//! it is the alias (usually a free-text function description).

use std::iter::Enumerate;
use std::path::{Path, PathBuf};
use std::str::Lines;

use thiserror::Error;

/// Errors raised while reading a FASTA file.
#[derive(Debug, Error)]
pub enum FastaError {
    /// The file could not be read.
    #[error("could not read FASTA file '{path}': {source}\n  Suggestion: Check the input path")]
    Io {
        /// Input path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A header line carried no identifier.
    #[error("could not find the sequence id on line {line}\n  Suggestion: Headers must look like '>ID optional alias'")]
    MissingIdentifier {
        /// 1-based line number.
        line: usize,
    },

    /// Sequence data appeared before the first header.
    #[error("sequence data before the first '>' header on line {line}\n  Suggestion: Check that the input is FASTA formatted")]
    SequenceBeforeHeader {
        /// 1-based line number.
        line: usize,
    },
}

/// One input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Sequence identifier (ORF name).
    pub identifier: String,
    /// Header text after the identifier; empty when absent.
    pub alias: String,
    /// Concatenated residues.
    pub sequence: String,
}

/// Reads a whole FASTA file into memory.
///
/// # Errors
///
/// Returns [`FastaError::Io`] when the file cannot be read, or the first
/// format error found in it.
pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>, FastaError> {
    let text = std::fs::read_to_string(path).map_err(|source| FastaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FastaRecords::new(&text).collect()
}

/// Forward cursor over the records of a FASTA text.
#[derive(Debug)]
pub struct FastaRecords<'a> {
    lines: Enumerate<Lines<'a>>,
    pending_header: Option<(usize, &'a str)>,
    done: bool,
}

impl<'a> FastaRecords<'a> {
    /// Creates a cursor over `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            pending_header: None,
            done: false,
        }
    }

    fn next_non_blank(&mut self) -> Option<(usize, &'a str)> {
        self.lines.by_ref().find_map(|(index, line)| {
            let line = line.trim();
            (!line.is_empty()).then_some((index + 1, line))
        })
    }

    fn fail(&mut self, error: FastaError) -> Option<Result<FastaRecord, FastaError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for FastaRecords<'_> {
    type Item = Result<FastaRecord, FastaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let (line_no, header) = match self.pending_header.take() {
            Some(header) => header,
            None => {
                let (line_no, line) = self.next_non_blank()?;
                if !line.starts_with('>') {
                    return self.fail(FastaError::SequenceBeforeHeader { line: line_no });
                }
                (line_no, line)
            }
        };

        let Some((identifier, alias)) = parse_header(header) else {
            return self.fail(FastaError::MissingIdentifier { line: line_no });
        };

        let mut sequence = String::new();
        while let Some((next_no, line)) = self.next_non_blank() {
            if line.starts_with('>') {
                self.pending_header = Some((next_no, line));
                break;
            }
            sequence.push_str(line);
        }

        Some(Ok(FastaRecord {
            identifier,
            alias,
            sequence,
        }))
    }
}

fn parse_header(line: &str) -> Option<(String, String)> {
    let mut fields = line.trim_start_matches('>').split(' ');
    let identifier = fields.next().filter(|id| !id.is_empty())?;
    let alias = fields.collect::<Vec<_>>().join(" ");
    Some((identifier.to_string(), alias))
}

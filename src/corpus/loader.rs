//! CSV corpus loader.
//!
//! The first row is the header. One column holds the email text and one
//! holds the label; both are found by name through [`ColumnAliases`]:
//! ```csv
//! email,label
//! "Verify your account now: http://fake-bank.com/login",1
//! "Meeting moved to Friday",0
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::normalize;
use crate::error::{PhishError, Result};

use super::{Corpus, Label, LabeledDocument};

/// Accepted header names for the text and label columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    /// Candidate names for the email text column, in priority order.
    pub text: Vec<String>,
    /// Candidate names for the label column, in priority order.
    pub label: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let owned =
            |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };
        Self {
            text: owned(&["email", "text", "content", "body", "message"]),
            label: owned(&["label", "phishing", "is_phishing", "target", "class"]),
        }
    }
}

impl ColumnAliases {
    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() || self.label.is_empty() {
            return Err(PhishError::config("column alias lists must not be empty"));
        }
        Ok(())
    }

    /// Positions of the text and label columns in `headers`.
    ///
    /// Header names are compared case-insensitively after trimming.
    pub fn resolve(&self, headers: &StringRecord) -> Result<(usize, usize)> {
        let find = |aliases: &[String]| {
            aliases.iter().find_map(|alias| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(alias))
            })
        };
        let text = find(&self.text).ok_or_else(|| {
            PhishError::corpus(format!(
                "no text column found; expected one of: {}",
                self.text.join(", ")
            ))
        })?;
        let label = find(&self.label).ok_or_else(|| {
            PhishError::corpus(format!(
                "no label column found; expected one of: {}",
                self.label.join(", ")
            ))
        })?;
        Ok((text, label))
    }
}

/// Reads labeled corpora from CSV.
#[derive(Debug, Clone)]
pub struct CsvCorpusLoader {
    aliases: ColumnAliases,
    delimiter: u8,
}

impl Default for CsvCorpusLoader {
    fn default() -> Self {
        Self::new(ColumnAliases::default())
    }
}

impl CsvCorpusLoader {
    pub fn new(aliases: ColumnAliases) -> Self {
        CsvCorpusLoader {
            aliases,
            delimiter: b',',
        }
    }

    /// Set a custom delimiter character.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a corpus from a CSV file.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Corpus> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let corpus = self.from_reader(file)?;
        info!("Loaded {} emails from {}", corpus.len(), path.display());
        Ok(corpus)
    }

    /// Load a corpus from any CSV byte stream.
    ///
    /// Rows whose text is empty after normalization are skipped. An
    /// unrecognized label value fails the whole load.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Corpus> {
        self.aliases.validate()?;
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let (text_col, label_col) = self.aliases.resolve(&headers)?;
        debug!(
            "Using column {:?} for text and {:?} for labels",
            &headers[text_col], &headers[label_col]
        );

        let mut corpus = Corpus::new();
        let mut skipped = 0;
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // Header is line 1.
            let row = i + 2;
            let (Some(text), Some(raw_label)) = (record.get(text_col), record.get(label_col))
            else {
                return Err(PhishError::corpus(format!(
                    "row {row}: expected at least {} fields, found {}",
                    text_col.max(label_col) + 1,
                    record.len()
                )));
            };

            if normalize(text).is_empty() {
                skipped += 1;
                continue;
            }
            let label = Label::parse(raw_label).map_err(|_| {
                PhishError::corpus(format!("row {row}: unrecognized label value {raw_label:?}"))
            })?;
            corpus.push(LabeledDocument::new(text, label));
        }

        if skipped > 0 {
            debug!("Skipped {skipped} rows with empty text");
        }
        Ok(corpus)
    }
}

/// Load a CSV corpus with the given column aliases.
pub fn load_csv<P: AsRef<Path>>(path: P, aliases: &ColumnAliases) -> Result<Corpus> {
    CsvCorpusLoader::new(aliases.clone()).load(path)
}

//! CSV Data Loader Module
//! Decodes CSV files through an encoding fallback chain and parses them with Polars.

use encoding_rs::{Encoding, UTF_8};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Rows sampled by Polars when inferring column types.
const INFER_SCHEMA_ROWS: usize = 10000;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),
    #[error("Encoding chain is empty")]
    EmptyEncodingChain,
    #[error("Could not decode {path} with any of [{tried}]")]
    Undecodable { path: PathBuf, tried: String },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Columns missing from dataset: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Loads CSV files, trying each configured text encoding in order.
///
/// Only a decode failure moves on to the next encoding. Any other failure,
/// or running out of encodings, is returned to the caller.
#[derive(Debug, Clone)]
pub struct DataLoader {
    encodings: Vec<&'static Encoding>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self {
            encodings: vec![UTF_8],
        }
    }
}

impl DataLoader {
    /// Build a loader from WHATWG encoding labels, e.g. `["utf-8", "cp949"]`.
    pub fn with_encodings<S: AsRef<str>>(labels: &[S]) -> Result<Self, LoaderError> {
        let encodings = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                Encoding::for_label(label.trim().as_bytes())
                    .ok_or_else(|| LoaderError::UnknownEncoding(label.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if encodings.is_empty() {
            return Err(LoaderError::EmptyEncodingChain);
        }
        Ok(Self { encodings })
    }

    /// Names of the encodings this loader tries, in order.
    pub fn encoding_names(&self) -> Vec<&'static str> {
        self.encodings.iter().map(|e| e.name()).collect()
    }

    /// Load a CSV file into a DataFrame.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (text, encoding) = self.decode(path, &bytes)?;
        let df = Self::parse_csv(text)?;

        info!(
            path = %path.display(),
            encoding,
            rows = df.height(),
            columns = df.width(),
            "loaded dataset"
        );
        Ok(df)
    }

    /// Parse already-decoded CSV text.
    pub fn parse_csv(text: String) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
            .finish()?;
        Ok(df)
    }

    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<(String, &'static str), LoaderError> {
        for (attempt, encoding) in self.encodings.iter().enumerate() {
            let input = if *encoding == UTF_8 {
                bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
            } else {
                bytes
            };

            match encoding.decode_without_bom_handling_and_without_replacement(input) {
                Some(text) => {
                    if attempt > 0 {
                        warn!(
                            path = %path.display(),
                            encoding = encoding.name(),
                            "decoded with fallback encoding"
                        );
                    }
                    return Ok((text.into_owned(), encoding.name()));
                }
                None => debug!(
                    path = %path.display(),
                    encoding = encoding.name(),
                    "decode failed"
                ),
            }
        }

        Err(LoaderError::Undecodable {
            path: path.to_path_buf(),
            tried: self.encoding_names().join(", "),
        })
    }
}

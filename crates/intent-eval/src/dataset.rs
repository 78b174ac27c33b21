//! Evaluation dataset loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EvalError;

/// Column holding the utterance
pub const TEXT_COLUMN: &str = "text";

/// Column holding the gold intent
pub const LABEL_COLUMN: &str = "intent_true";

/// One labelled evaluation utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRow {
    pub text: String,
    pub intent_true: String,
}

impl EvalRow {
    pub fn new(text: impl Into<String>, intent_true: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intent_true: intent_true.into(),
        }
    }
}

/// Load evaluation rows from a CSV file.
///
/// Other columns are ignored. Rows where `text` or `intent_true` is missing
/// or empty are dropped.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<EvalRow>, EvalError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| EvalError::Dataset(format!("{}: {}", path.display(), e)))?;

    let rows = read_rows(reader).map_err(|e| match e {
        EvalError::Dataset(msg) => EvalError::Dataset(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    info!(path = ?path, count = rows.len(), "Loaded evaluation dataset");
    Ok(rows)
}

fn read_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<EvalRow>, EvalError> {
    let headers = reader
        .headers()
        .map_err(|e| EvalError::Dataset(e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| EvalError::Dataset(format!("missing column '{}'", name)))
    };
    let text_idx = column(TEXT_COLUMN)?;
    let label_idx = column(LABEL_COLUMN)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| EvalError::Dataset(e.to_string()))?;
        match (non_empty(record.get(text_idx)), non_empty(record.get(label_idx))) {
            (Some(text), Some(label)) => rows.push(EvalRow::new(text, label)),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, "Dropped rows with missing fields");
    }
    Ok(rows)
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|f| !f.is_empty())
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UsanError {
    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Malformed input in {source_name} (record {record}): {reason}")]
    MalformedInput {
        source_name: String,
        record: usize,
        reason: String,
    },

    #[error("No description found for stem '{stem}' matched by drug '{drug}'")]
    ExhaustedFallback { drug: String, stem: String },

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl UsanError {
    pub fn malformed(source_name: &str, record: usize, reason: impl Into<String>) -> Self {
        UsanError::MalformedInput {
            source_name: source_name.to_string(),
            record,
            reason: reason.into(),
        }
    }
}

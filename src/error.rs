use thiserror::Error;

// ---------------------------------------------------------------------------
// DeckError – the pipeline-wide error taxonomy
// ---------------------------------------------------------------------------

/// Every failure the pipeline can surface to the UI. Each variant maps to one
/// user-visible status message; none of them is fatal to the session.
#[derive(Debug, Error)]
pub enum DeckError {
    /// The backing file is missing or could not be parsed.
    #[error("source unavailable: {0:#}")]
    SourceUnavailable(anyhow::Error),

    /// The loaded source lacks a column the rename mapping expects.
    #[error("schema mismatch: source column '{column}' not found")]
    SchemaMismatch { column: String },

    /// A requested column does not exist in the table being filtered.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// The filtered view could not be serialized to a spreadsheet.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The recipient address is empty or not minimally well-formed.
    #[error("invalid recipient address '{address}'")]
    InvalidRecipient { address: String },

    /// Network or authentication failure from the mail transport.
    #[error("mail transport failed: {0}")]
    Transport(String),
}

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RowsetError {
    /// By-name lookup found no field with the requested name.
    #[error("record contains no '{0}' field")]
    FieldNotFound(String),

    /// By-name lookup matched more than one field. Duplicate field names
    /// are allowed in storage but not resolvable by name.
    #[error("record contains multiple '{0}' fields")]
    AmbiguousField(String),

    /// Positional access past the available (or producible) elements.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// `one()` found several rows when at most one was required.
    #[error("multiple rows found when exactly one was required")]
    MultipleRows,

    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
}

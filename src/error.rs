//! Error taxonomy for a TEA run.
//!
//! Every variant aborts the run before any output is produced. None of them
//! are fatal to the process: the caller reports the diagnostic and may retry
//! with corrected input.

use thiserror::Error;

/// Errors raised while loading inputs or computing a TEA run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TeaError {
    /// Malformed or out-of-range numeric/list input.
    #[error("invalid parameter `{field}`: {message}")]
    InvalidParameter {
        /// Dotted field path (e.g. `"cases.lifetime_years[1]"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },

    /// Region or sector key absent from the price table.
    #[error("lookup failed for {kind} \"{key}\"{}", available_hint(.available))]
    LookupError {
        /// What was looked up (`"region"`, `"sector"`, `"column"`, ...).
        kind: String,
        /// The key that did not match.
        key: String,
        /// Keys that would have matched, if known.
        available: Vec<String>,
    },

    /// Requested horizon exceeds the rows available in a source table.
    #[error(
        "insufficient history in {series}: horizon needs {requested} steps, table provides {available}"
    )]
    InsufficientHistory {
        /// Which aligned series ran short (`"price"` or `"activity"`).
        series: String,
        /// Horizon length in steps.
        requested: usize,
        /// Steps the source could supply.
        available: usize,
    },

    /// A table loaded but a value needed for the run is missing or unusable.
    #[error("malformed {table} table: {message}")]
    MalformedTable {
        /// Table name (`"price"` or `"activity"`).
        table: String,
        /// What is wrong and where.
        message: String,
    },

    /// The source file could not be read or parsed as CSV.
    #[error("cannot read \"{path}\": {message}")]
    Input {
        /// Path of the offending file.
        path: String,
        /// Underlying I/O or CSV error.
        message: String,
    },
}

impl TeaError {
    /// Shorthand for [`TeaError::InvalidParameter`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`TeaError::MalformedTable`].
    pub fn malformed(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedTable {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Field path for parameter errors, `None` for the other variants.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(", available: {}", available.join(", "))
    }
}

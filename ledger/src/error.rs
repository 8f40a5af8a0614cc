use std::fmt;

use thiserror::Error;

/// A required field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingTechnician,
    MissingAmount,
    MissingDate,
    MissingJustification,
    UnsupportedAttachment(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingTechnician => write!(f, "technician name is required"),
            ValidationIssue::MissingAmount => write!(f, "amount is required"),
            ValidationIssue::MissingDate => write!(f, "date is required"),
            ValidationIssue::MissingJustification => write!(f, "justification is required"),
            ValidationIssue::UnsupportedAttachment(name) => {
                write!(f, "attachment '{}' is not a jpg, jpeg, png, webp or pdf file", name)
            }
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(String),

    #[error("Remote backend error: {0}")]
    RemoteError(String),

    #[error("Attachment upload failed for '{name}': {reason}")]
    UploadError { name: String, reason: String },

    #[error("Ledger could not be persisted: {0}")]
    PersistError(String),
}

impl LedgerError {
    pub fn validation_issues(&self) -> &[ValidationIssue] {
        match self {
            LedgerError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_issue() {
        let err = LedgerError::Validation(vec![ValidationIssue::MissingAmount, ValidationIssue::MissingDate]);
        assert_eq!(err.to_string(), "Validation failed: amount is required; date is required");
        assert_eq!(err.validation_issues().len(), 2);
    }

    #[test]
    fn io_errors_convert() {
        let err: LedgerError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.to_string().starts_with("I/O error"));
        assert!(err.validation_issues().is_empty());
    }
}

// Validation and identifier helpers for the submission handler
use std::collections::HashSet;

use chrono::NaiveDate;
use shared::models::{Submission, Upload};
use shared::utils::is_accepted_attachment;

use crate::error::{LedgerError, ValidationIssue};

/// A submission whose required fields are present and trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub technician: String,
    pub amount: String,
    pub date: NaiveDate,
    pub justification: String,
    pub uploads: Vec<Upload>,
}

/// Checks every field and reports all problems at once.
pub fn validate(submission: Submission) -> Result<ValidSubmission, LedgerError> {
    let technician = submission.technician.trim().to_string();
    let amount = submission.amount.trim().to_string();
    let justification = submission.justification.trim().to_string();

    let mut issues = Vec::new();
    if technician.is_empty() {
        issues.push(ValidationIssue::MissingTechnician);
    }
    if amount.is_empty() {
        issues.push(ValidationIssue::MissingAmount);
    }
    if submission.date.is_none() {
        issues.push(ValidationIssue::MissingDate);
    }
    if justification.is_empty() {
        issues.push(ValidationIssue::MissingJustification);
    }
    for upload in &submission.uploads {
        if !is_accepted_attachment(&upload.file_name) {
            issues.push(ValidationIssue::UnsupportedAttachment(upload.file_name.clone()));
        }
    }

    match submission.date {
        Some(date) if issues.is_empty() => Ok(ValidSubmission {
            technician,
            amount,
            date,
            justification,
            uploads: submission.uploads,
        }),
        _ => Err(LedgerError::Validation(issues)),
    }
}

/// Short identifier not present in `existing`.
pub fn generate_id(existing: &HashSet<&str>) -> String {
    loop {
        let candidate = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
    }
}

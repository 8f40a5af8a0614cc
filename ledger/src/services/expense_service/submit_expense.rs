// Handler for a technician submission: validate, store receipts, append.
use std::collections::HashSet;

use shared::models::{ExpenseRecord, Submission};

use crate::data::attachments::AttachmentStore;
use crate::data::ledger_store::LedgerStore;
use crate::error::LedgerError;

use super::helpers::{generate_id, validate};

pub fn handle_submit_expense(
    submission: Submission,
    ledger: &dyn LedgerStore,
    attachments: &dyn AttachmentStore,
) -> Result<ExpenseRecord, LedgerError> {
    let valid = validate(submission).map_err(|e| {
        tracing::warn!(error = %e, "Submission rejected");
        e
    })?;

    let existing = ledger.load();
    let id = generate_id(&existing.iter().map(|r| r.id.as_str()).collect::<HashSet<_>>());

    // Uploads run one after another; the first failure aborts before the ledger is touched.
    // Files stored earlier in this submission stay where they are.
    let mut references = Vec::with_capacity(valid.uploads.len());
    for upload in &valid.uploads {
        match attachments.store(&upload.bytes, &upload.file_name, &valid.technician) {
            Ok(reference) => references.push(reference),
            Err(e) => {
                tracing::error!(id = %id, stored = references.len(), error = %e, "Attachment failed, submission aborted");
                return Err(e);
            }
        }
    }

    let record = ExpenseRecord {
        id,
        technician: valid.technician,
        amount: valid.amount,
        date: Some(valid.date),
        justification: valid.justification,
        attachments: references,
    };

    ledger.append(&record).map_err(|e| {
        tracing::error!(id = %record.id, error = %e, "Ledger append failed");
        e
    })?;
    Ok(record)
}

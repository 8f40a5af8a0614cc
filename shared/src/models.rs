use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Header of the persisted ledger table, in storage order.
pub const LEDGER_COLUMNS: [&str; 6] = ["ID", "Technicien", "Montant", "Date", "Justification", "Photos"];

/// Separator used when several attachment references share the `Photos` cell.
/// `|` is rewritten by filename sanitization, so it never occurs inside a local reference.
pub const ATTACHMENT_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub technician: String,
    /// Amount exactly as typed; see `utils::parse_amount` for the numeric view.
    pub amount: String,
    /// `None` only for stored rows whose date could not be read back.
    pub date: Option<NaiveDate>,
    pub justification: String,
    pub attachments: Vec<String>,
}

impl ExpenseRecord {
    /// Cell values in `LEDGER_COLUMNS` order.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.id.clone(),
            self.technician.clone(),
            self.amount.clone(),
            self.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            self.justification.clone(),
            self.attachments.join(ATTACHMENT_SEPARATOR),
        ]
    }

    pub fn numeric_amount(&self) -> Option<f64> {
        crate::utils::parse_amount(&self.amount)
    }
}

/// Splits a `Photos` cell back into its ordered references.
/// A bare `|` inside a reference is kept; only the spaced separator splits.
pub fn split_attachments(cell: &str) -> Vec<String> {
    cell.split(ATTACHMENT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A receipt file handed over by the form collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw field values of one submission, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub technician: String,
    pub amount: String,
    pub date: Option<NaiveDate>,
    pub justification: String,
    pub uploads: Vec<Upload>,
}

// Filtering and totals over the loaded ledger, for display.
use std::collections::BTreeSet;

use chrono::NaiveDate;
use shared::models::ExpenseRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    /// `None` keeps every technician; an empty set keeps nobody.
    pub technicians: Option<BTreeSet<String>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn date_filter_active(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if let Some(technicians) = &self.technicians {
            if !technicians.contains(&record.technician) {
                return false;
            }
        }
        if !self.date_filter_active() {
            return true;
        }
        match record.date {
            Some(date) => {
                self.date_from.map_or(true, |start| date >= start) && self.date_to.map_or(true, |end| date <= end)
            }
            None => false,
        }
    }

    /// Matching records in ledger order.
    pub fn apply(&self, records: &[ExpenseRecord]) -> Vec<ExpenseRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistorySummary {
    pub count: usize,
    pub total: f64,
    /// Records whose amount text could not be read as a number and were left out of `total`.
    pub unparsed_amounts: usize,
}

pub fn summarize(records: &[ExpenseRecord]) -> HistorySummary {
    records.iter().fold(HistorySummary::default(), |mut summary, record| {
        summary.count += 1;
        match record.numeric_amount() {
            Some(value) => summary.total += value,
            None => {
                tracing::warn!(id = %record.id, amount = %record.amount, "Amount excluded from total");
                summary.unparsed_amounts += 1;
            }
        }
        summary
    })
}

/// Distinct technician names, sorted, for filter choices.
pub fn technicians(records: &[ExpenseRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.technician.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

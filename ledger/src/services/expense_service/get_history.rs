// Handler for the history view
use shared::models::ExpenseRecord;

use crate::data::history::{self, HistoryFilter, HistorySummary};
use crate::data::ledger_store::LedgerStore;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub records: Vec<ExpenseRecord>,
    pub summary: HistorySummary,
    /// Every technician in the ledger, not only the filtered ones.
    pub technicians: Vec<String>,
}

pub fn handle_get_history(filter: &HistoryFilter, ledger: &dyn LedgerStore) -> HistoryView {
    let all = ledger.load();
    let records = filter.apply(&all);
    let summary = history::summarize(&records);
    tracing::debug!(total = all.len(), shown = records.len(), "History filtered");
    HistoryView { records, summary, technicians: history::technicians(&all) }
}

// Handler for the export surface
use crate::data::export::{self, Export, ExportFormat};
use crate::data::ledger_store::LedgerStore;
use crate::error::LedgerError;

/// Full ledger in the requested format, header first.
pub fn handle_export_ledger(ledger: &dyn LedgerStore, format: ExportFormat) -> Result<Export, LedgerError> {
    let records = ledger.load();
    let export = export::export_records(&records, format)?;
    tracing::info!(
        records = records.len(),
        bytes = export.bytes.len(),
        format = export.format.extension(),
        "Exported ledger"
    );
    Ok(export)
}

// Download format for the whole ledger, and reading such a download back.
use std::path::Path;

use shared::models::ExpenseRecord;

use crate::data::csv_codec::LedgerCsv;
use crate::data::xlsx_codec::LedgerXlsx;
use crate::error::LedgerError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// `.csv` selects CSV; anything else gets a workbook.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Xlsx,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Format actually produced; CSV when the workbook could not be built.
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

pub fn export_records(records: &[ExpenseRecord], format: ExportFormat) -> Result<Export, LedgerError> {
    if format == ExportFormat::Xlsx {
        match LedgerXlsx::to_bytes(records) {
            Ok(bytes) => return Ok(Export { format, bytes }),
            Err(e) => tracing::warn!(error = %e, "Workbook export failed, falling back to CSV"),
        }
    }
    Ok(Export { format: ExportFormat::Csv, bytes: LedgerCsv::to_bytes(records)? })
}

/// Reads an export of either format. Unreadable input is an empty ledger.
pub fn load_from_bytes(bytes: &[u8]) -> Vec<ExpenseRecord> {
    let result = if bytes.starts_with(ZIP_MAGIC) {
        LedgerXlsx::read_bytes(bytes)
    } else {
        LedgerCsv::read_records(bytes)
    };
    match result {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, size = bytes.len(), "Export unreadable, using an empty ledger");
            Vec::new()
        }
    }
}

use std::fmt;
use std::io::Cursor;

use calamine::{Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use shared::models::ExpenseRecord;

use crate::data::csv_codec::LedgerCsv;
use crate::error::LedgerError;

pub const WORKSHEET_NAME: &str = "Depenses";

fn spreadsheet_error(e: impl fmt::Display) -> LedgerError {
    LedgerError::SpreadsheetError(e.to_string())
}

/// The ledger table as an Excel workbook, first worksheet only.
pub struct LedgerXlsx;

impl LedgerXlsx {
    pub fn to_bytes(records: &[ExpenseRecord]) -> Result<Vec<u8>, LedgerError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(WORKSHEET_NAME).map_err(spreadsheet_error)?;

        // Every cell is written as text so amounts keep their typed form
        for (row_idx, row) in LedgerCsv::rows_from_records(records).iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet
                    .write_string(row_idx as u32, col_idx as u16, value.as_str())
                    .map_err(spreadsheet_error)?;
            }
        }
        workbook.save_to_buffer().map_err(spreadsheet_error)
    }

    pub fn read_bytes(bytes: &[u8]) -> Result<Vec<ExpenseRecord>, LedgerError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(spreadsheet_error)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(spreadsheet_error)?,
            None => return Ok(Vec::new()),
        };
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Ok(LedgerCsv::records_from_rows(&rows))
    }
}

// Ledger backends. Every backend rewrites the full table on append; there is no
// locking, so two writers racing on the same medium can lose each other's rows.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared::models::ExpenseRecord;

use crate::data::csv_codec::LedgerCsv;
use crate::data::remote::SheetClient;
use crate::data::xlsx_codec::LedgerXlsx;
use crate::error::LedgerError;

pub trait LedgerStore: Send + Sync {
    /// Human readable location, used in logs.
    fn describe(&self) -> String;

    /// Strict read of the backing medium. A medium that does not exist yet is an empty ledger.
    fn read(&self) -> Result<Vec<ExpenseRecord>, LedgerError>;

    /// Replaces the persisted table with `records`, header included.
    fn write_all(&self, records: &[ExpenseRecord]) -> Result<(), LedgerError>;

    /// Reads the ledger, degrading to an empty one when the medium cannot be read.
    fn load(&self) -> Vec<ExpenseRecord> {
        match self.read() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(store = %self.describe(), error = %e, "Ledger unreadable, using an empty ledger");
                Vec::new()
            }
        }
    }

    /// Adds one record and persists the whole ledger immediately.
    fn append(&self, record: &ExpenseRecord) -> Result<(), LedgerError> {
        let mut records = self
            .read()
            .map_err(|e| LedgerError::PersistError(format!("cannot read {} before appending: {}", self.describe(), e)))?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(LedgerError::PersistError(format!("record id '{}' already exists", record.id)));
        }
        records.push(record.clone());
        self.write_all(&records)?;
        tracing::info!(store = %self.describe(), id = %record.id, total = records.len(), "Appended expense record");
        Ok(())
    }

    /// Rewrites the medium in the fixed schema. Safe to repeat.
    fn ensure_schema(&self) -> Result<(), LedgerError> {
        let records = self.read()?;
        self.write_all(&records)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes beside `path` then swaps, so a failed write leaves the previous file intact.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), LedgerError> {
    let persist_error = |e: std::io::Error| LedgerError::PersistError(format!("{}: {}", path.display(), e));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persist_error)?;
    }
    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(persist_error(e));
    }
    fs::rename(&tmp, path).map_err(persist_error)
}

pub struct CsvLedgerStore {
    path: PathBuf,
}

impl CsvLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvLedgerStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for CsvLedgerStore {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn read(&self) -> Result<Vec<ExpenseRecord>, LedgerError> {
        LedgerCsv::read_file(&self.path)
    }

    fn write_all(&self, records: &[ExpenseRecord]) -> Result<(), LedgerError> {
        replace_file(&self.path, &LedgerCsv::to_bytes(records)?)
    }
}

/// Local Excel workbook, first worksheet.
pub struct XlsxLedgerStore {
    path: PathBuf,
}

impl XlsxLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        XlsxLedgerStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for XlsxLedgerStore {
    fn describe(&self) -> String {
        format!("xlsx:{}", self.path.display())
    }

    fn read(&self) -> Result<Vec<ExpenseRecord>, LedgerError> {
        match fs::read(&self.path) {
            Ok(bytes) => LedgerXlsx::read_bytes(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, records: &[ExpenseRecord]) -> Result<(), LedgerError> {
        replace_file(&self.path, &LedgerXlsx::to_bytes(records)?)
    }
}

pub struct SheetLedgerStore {
    client: Arc<dyn SheetClient>,
    spreadsheet: String,
}

impl SheetLedgerStore {
    pub fn new(client: Arc<dyn SheetClient>, spreadsheet: impl Into<String>) -> Self {
        SheetLedgerStore { client, spreadsheet: spreadsheet.into() }
    }
}

impl LedgerStore for SheetLedgerStore {
    fn describe(&self) -> String {
        format!("sheet:{}", self.spreadsheet)
    }

    fn read(&self) -> Result<Vec<ExpenseRecord>, LedgerError> {
        let rows = self.client.read_rows(&self.spreadsheet)?;
        Ok(LedgerCsv::records_from_rows(&rows))
    }

    fn write_all(&self, records: &[ExpenseRecord]) -> Result<(), LedgerError> {
        self.client
            .write_rows(&self.spreadsheet, &LedgerCsv::rows_from_records(records))
            .map_err(|e| LedgerError::PersistError(format!("{}: {}", self.describe(), e)))
    }
}

/// Reads from `primary` and copies every write to `mirror`.
/// The mirror receives the full primary state each time, so a missed copy heals on the next append.
pub struct MirroredLedgerStore {
    primary: Box<dyn LedgerStore>,
    mirror: Box<dyn LedgerStore>,
}

impl MirroredLedgerStore {
    pub fn new(primary: Box<dyn LedgerStore>, mirror: Box<dyn LedgerStore>) -> Self {
        MirroredLedgerStore { primary, mirror }
    }
}

impl LedgerStore for MirroredLedgerStore {
    fn describe(&self) -> String {
        format!("{} (mirrored to {})", self.primary.describe(), self.mirror.describe())
    }

    fn read(&self) -> Result<Vec<ExpenseRecord>, LedgerError> {
        self.primary.read()
    }

    fn write_all(&self, records: &[ExpenseRecord]) -> Result<(), LedgerError> {
        self.primary.write_all(records)?;
        if let Err(e) = self.mirror.write_all(records) {
            tracing::error!(mirror = %self.mirror.describe(), error = %e, "Mirror write failed, primary ledger kept");
        }
        Ok(())
    }
}

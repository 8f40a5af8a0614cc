// Narrow interfaces to cloud spreadsheets and folders. Transports and credentials
// live outside this crate; the in-memory implementations back tests and embedders.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LedgerError;

/// First worksheet of a remote spreadsheet, as rows of cell text.
pub trait SheetClient: Send + Sync {
    fn read_rows(&self, spreadsheet: &str) -> Result<Vec<Vec<String>>, LedgerError>;
    /// Replaces the whole worksheet content.
    fn write_rows(&self, spreadsheet: &str, rows: &[Vec<String>]) -> Result<(), LedgerError>;
}

/// Remote storage folder.
pub trait FolderClient: Send + Sync {
    /// Returns the id of the subfolder `name` under `parent`, creating it when absent.
    fn ensure_folder(&self, parent: &str, name: &str) -> Result<String, LedgerError>;
    /// Uploads a file and returns its reference (identifier or URL).
    fn upload(&self, folder: &str, name: &str, bytes: &[u8]) -> Result<String, LedgerError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySheet {
    sheets: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(spreadsheet: &str, rows: Vec<Vec<String>>) -> Self {
        let sheet = Self::new();
        if let Ok(mut sheets) = sheet.sheets.lock() {
            sheets.insert(spreadsheet.to_string(), rows);
        }
        sheet
    }

    /// While set, every write is rejected as if the remote were unreachable.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

fn poisoned() -> LedgerError {
    LedgerError::RemoteError("in-memory backend lock poisoned".to_string())
}

impl SheetClient for InMemorySheet {
    fn read_rows(&self, spreadsheet: &str) -> Result<Vec<Vec<String>>, LedgerError> {
        let sheets = self.sheets.lock().map_err(|_| poisoned())?;
        sheets
            .get(spreadsheet)
            .cloned()
            .ok_or_else(|| LedgerError::RemoteError(format!("spreadsheet '{}' not found", spreadsheet)))
    }

    fn write_rows(&self, spreadsheet: &str, rows: &[Vec<String>]) -> Result<(), LedgerError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::RemoteError(format!("spreadsheet '{}' is unreachable", spreadsheet)));
        }
        let mut sheets = self.sheets.lock().map_err(|_| poisoned())?;
        sheets.insert(spreadsheet.to_string(), rows.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub folder: String,
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct FolderState {
    folders: HashMap<(String, String), String>,
    objects: Vec<StoredObject>,
    fail_uploads_after: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFolder {
    state: Arc<Mutex<FolderState>>,
}

impl InMemoryFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every upload beyond the first `count` fail.
    pub fn fail_uploads_after(&self, count: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_uploads_after = Some(count);
        }
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.state.lock().map(|s| s.objects.clone()).unwrap_or_default()
    }
}

impl FolderClient for InMemoryFolder {
    fn ensure_folder(&self, parent: &str, name: &str) -> Result<String, LedgerError> {
        let mut state = self.state.lock().map_err(|_| poisoned())?;
        let id = state
            .folders
            .entry((parent.to_string(), name.to_string()))
            .or_insert_with(|| format!("{}/{}", parent, name))
            .clone();
        Ok(id)
    }

    fn upload(&self, folder: &str, name: &str, bytes: &[u8]) -> Result<String, LedgerError> {
        let mut state = self.state.lock().map_err(|_| poisoned())?;
        if state.fail_uploads_after.is_some_and(|limit| state.objects.len() >= limit) {
            return Err(LedgerError::RemoteError("upload quota exceeded".to_string()));
        }
        state.objects.push(StoredObject { folder: folder.to_string(), name: name.to_string(), bytes: bytes.to_vec() });
        Ok(format!("mem://{}/{}", folder, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_rows_are_replaced_on_write() {
        let sheet = InMemorySheet::with_rows("Depenses", vec![vec!["ID".to_string()]]);
        sheet.write_rows("Depenses", &[vec!["A".to_string()], vec!["B".to_string()]]).unwrap();
        assert_eq!(sheet.read_rows("Depenses").unwrap().len(), 2);
    }

    #[test]
    fn failing_writes_leave_rows_untouched() {
        let sheet = InMemorySheet::with_rows("Depenses", vec![vec!["ID".to_string()]]);
        sheet.fail_writes(true);
        assert!(sheet.write_rows("Depenses", &[]).is_err());
        sheet.fail_writes(false);
        assert_eq!(sheet.read_rows("Depenses").unwrap().len(), 1);
    }

    #[test]
    fn unknown_sheet_is_an_error() {
        let sheet = InMemorySheet::new();
        assert!(matches!(sheet.read_rows("absent"), Err(LedgerError::RemoteError(_))));
    }

    #[test]
    fn folders_are_created_once() {
        let folder = InMemoryFolder::new();
        let a = folder.ensure_folder("root", "Karim").unwrap();
        let b = folder.ensure_folder("root", "Karim").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn uploads_fail_past_the_limit() {
        let folder = InMemoryFolder::new();
        folder.fail_uploads_after(1);
        assert!(folder.upload("root", "a.jpg", b"1").is_ok());
        assert!(folder.upload("root", "b.jpg", b"2").is_err());
        assert_eq!(folder.objects().len(), 1);
    }
}

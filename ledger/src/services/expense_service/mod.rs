// ExpenseService ties a ledger backend and an attachment backend together.
// It keeps no session state: every call re-reads the ledger.
use std::sync::Arc;

use shared::models::{ExpenseRecord, Submission};

use crate::config::settings::{AttachmentBackendSettings, LedgerBackendSettings, LedgerSettings};
use crate::data::attachments::{AttachmentStore, LocalAttachmentStore, RemoteFolderAttachmentStore};
use crate::data::export::{Export, ExportFormat};
use crate::data::history::HistoryFilter;
use crate::data::ledger_store::{CsvLedgerStore, LedgerStore, MirroredLedgerStore, SheetLedgerStore, XlsxLedgerStore};
use crate::data::remote::{FolderClient, SheetClient};
use crate::error::LedgerError;

pub mod export_ledger;
pub mod get_history;
pub mod helpers;
pub mod submit_expense;

pub use get_history::HistoryView;

/// Clients for remote backends, supplied by whoever owns the credentials.
#[derive(Clone, Default)]
pub struct RemoteClients {
    pub sheets: Option<Arc<dyn SheetClient>>,
    pub folders: Option<Arc<dyn FolderClient>>,
}

pub struct ExpenseService {
    ledger: Box<dyn LedgerStore>,
    attachments: Box<dyn AttachmentStore>,
}

impl ExpenseService {
    pub fn new(ledger: Box<dyn LedgerStore>, attachments: Box<dyn AttachmentStore>) -> Self {
        ExpenseService { ledger, attachments }
    }

    /// Builds the backends named in `settings`.
    pub fn from_settings(settings: &LedgerSettings, remote: &RemoteClients) -> Result<Self, LedgerError> {
        let sheet_client = || {
            remote
                .sheets
                .clone()
                .ok_or_else(|| LedgerError::ConfigError("spreadsheet backend selected but no spreadsheet client is available".to_string()))
        };

        let ledger: Box<dyn LedgerStore> = match &settings.ledger {
            LedgerBackendSettings::Csv { path } => Box::new(CsvLedgerStore::new(path)),
            LedgerBackendSettings::Xlsx { path } => Box::new(XlsxLedgerStore::new(path)),
            LedgerBackendSettings::Sheet { spreadsheet } => Box::new(SheetLedgerStore::new(sheet_client()?, spreadsheet)),
            LedgerBackendSettings::Mirrored { path, spreadsheet } => Box::new(MirroredLedgerStore::new(
                Box::new(CsvLedgerStore::new(path)),
                Box::new(SheetLedgerStore::new(sheet_client()?, spreadsheet)),
            )),
        };

        let attachments: Box<dyn AttachmentStore> = match &settings.attachments {
            AttachmentBackendSettings::Local { base_dir } => Box::new(LocalAttachmentStore::new(base_dir)),
            AttachmentBackendSettings::RemoteFolder { folder_id } => {
                let client = remote.folders.clone().ok_or_else(|| {
                    LedgerError::ConfigError("remote folder selected but no folder client is available".to_string())
                })?;
                Box::new(RemoteFolderAttachmentStore::new(client, folder_id))
            }
        };

        tracing::info!(ledger = %ledger.describe(), "Expense service configured");
        Ok(Self::new(ledger, attachments))
    }

    /// Makes sure the ledger medium exists and carries the fixed header.
    pub fn ensure_schema(&self) -> Result<(), LedgerError> {
        self.ledger.ensure_schema()
    }

    pub fn submit(&self, submission: Submission) -> Result<ExpenseRecord, LedgerError> {
        tracing::info!(technician = %submission.technician.trim(), uploads = submission.uploads.len(), "Received expense submission");
        submit_expense::handle_submit_expense(submission, self.ledger.as_ref(), self.attachments.as_ref())
    }

    pub fn history(&self, filter: &HistoryFilter) -> HistoryView {
        get_history::handle_get_history(filter, self.ledger.as_ref())
    }

    /// Whole ledger as a download. Never touches the ledger medium.
    pub fn export(&self, format: ExportFormat) -> Result<Export, LedgerError> {
        export_ledger::handle_export_ledger(self.ledger.as_ref(), format)
    }
}

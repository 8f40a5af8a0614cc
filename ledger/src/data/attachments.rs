// Receipt storage. Names are prefixed with a sortable timestamp and a random
// suffix so two uploads of "photo.jpg" in the same second never collide.
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use shared::utils::sanitize_filename;

use crate::data::remote::FolderClient;
use crate::error::LedgerError;

pub trait AttachmentStore: Send + Sync {
    /// Persists `bytes` and returns the reference to record in the ledger.
    fn store(&self, bytes: &[u8], suggested_name: &str, group_key: &str) -> Result<String, LedgerError>;
}

/// Folder name for a technician. Names made only of dots would point outside the base.
pub fn group_folder(group_key: &str) -> String {
    let group = sanitize_filename(group_key);
    if group.chars().all(|c| c == '.') {
        shared::utils::PLACEHOLDER_NAME.to_string()
    } else {
        group
    }
}

/// `<YYYYMMDD_HHMMSS>_<6 hex>_<sanitized name>`
pub fn stored_name(suggested_name: &str, at: NaiveDateTime) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", at.format("%Y%m%d_%H%M%S"), &suffix[..6], sanitize_filename(suggested_name))
}

pub struct LocalAttachmentStore {
    base_dir: PathBuf,
}

impl LocalAttachmentStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        LocalAttachmentStore { base_dir: base_dir.into() }
    }

    /// Absolute location of a reference returned by `store`. References that would
    /// leave the base directory resolve to `None`.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference);
        if reference.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.base_dir.join(relative))
    }
}

impl AttachmentStore for LocalAttachmentStore {
    fn store(&self, bytes: &[u8], suggested_name: &str, group_key: &str) -> Result<String, LedgerError> {
        let group = group_folder(group_key);
        let name = stored_name(suggested_name, Local::now().naive_local());
        let dir = self.base_dir.join(&group);

        fs::create_dir_all(&dir)
            .and_then(|_| fs::write(dir.join(&name), bytes))
            .map_err(|e| LedgerError::UploadError { name: suggested_name.to_string(), reason: e.to_string() })?;

        let reference = format!("{}/{}", group, name);
        tracing::info!(reference = %reference, size = bytes.len(), "Stored attachment locally");
        Ok(reference)
    }
}

pub struct RemoteFolderAttachmentStore {
    client: Arc<dyn FolderClient>,
    folder_id: String,
}

impl RemoteFolderAttachmentStore {
    pub fn new(client: Arc<dyn FolderClient>, folder_id: impl Into<String>) -> Self {
        RemoteFolderAttachmentStore { client, folder_id: folder_id.into() }
    }
}

impl AttachmentStore for RemoteFolderAttachmentStore {
    fn store(&self, bytes: &[u8], suggested_name: &str, group_key: &str) -> Result<String, LedgerError> {
        let name = stored_name(suggested_name, Local::now().naive_local());
        let upload_error = |e: LedgerError| LedgerError::UploadError { name: suggested_name.to_string(), reason: e.to_string() };

        let folder = self.client.ensure_folder(&self.folder_id, &group_folder(group_key)).map_err(upload_error)?;
        let reference = self.client.upload(&folder, &name, bytes).map_err(upload_error)?;
        tracing::info!(reference = %reference, size = bytes.len(), "Uploaded attachment");
        Ok(reference)
    }
}

// Backend selection for the ledger and the receipt store.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LedgerError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LedgerSettings {
    pub ledger: LedgerBackendSettings,
    pub attachments: AttachmentBackendSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum LedgerBackendSettings {
    Csv { path: PathBuf },
    /// Local Excel workbook, first worksheet.
    Xlsx { path: PathBuf },
    /// First worksheet of the named spreadsheet.
    Sheet { spreadsheet: String },
    /// Local CSV as the source of truth, every append copied to the spreadsheet.
    Mirrored { path: PathBuf, spreadsheet: String },
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum AttachmentBackendSettings {
    Local { base_dir: PathBuf },
    RemoteFolder { folder_id: String },
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            ledger: LedgerBackendSettings::Csv { path: PathBuf::from("data/depenses_gasoil.csv") },
            attachments: AttachmentBackendSettings::Local { base_dir: PathBuf::from("data/justificatifs") },
        }
    }
}

impl LedgerSettings {
    /// Settings bundled with the binary.
    pub fn load_default() -> Result<Self, LedgerError> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json(config_str)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, LedgerError> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::ConfigError(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(config_str).map_err(|e| LedgerError::ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_default_matches_default_impl() {
        assert_eq!(LedgerSettings::load_default().unwrap(), LedgerSettings::default());
    }

    #[test]
    fn parses_remote_backends() {
        let settings = LedgerSettings::from_json(
            r#"{
                "ledger": { "backend": "mirrored", "path": "ledger.csv", "spreadsheet": "Depenses" },
                "attachments": { "backend": "remote_folder", "folder_id": "1AbC" }
            }"#,
        )
        .unwrap();
        assert_eq!(
            settings.ledger,
            LedgerBackendSettings::Mirrored { path: PathBuf::from("ledger.csv"), spreadsheet: "Depenses".to_string() }
        );
        assert_eq!(settings.attachments, AttachmentBackendSettings::RemoteFolder { folder_id: "1AbC".to_string() });
    }

    #[test]
    fn parses_workbook_backend() {
        let settings = LedgerSettings::from_json(
            r#"{ "ledger": { "backend": "xlsx", "path": "depenses.xlsx" }, "attachments": { "backend": "local", "base_dir": "b" } }"#,
        )
        .unwrap();
        assert_eq!(settings.ledger, LedgerBackendSettings::Xlsx { path: PathBuf::from("depenses.xlsx") });
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let err = LedgerSettings::from_json(
            r#"{ "ledger": { "backend": "ods", "path": "a" }, "attachments": { "backend": "local", "base_dir": "b" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ConfigError(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = LedgerSettings::load_from_path(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}

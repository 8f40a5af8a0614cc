// Gasoil expense ledger library root

pub mod config;
pub mod data;
pub mod error;
pub mod services;

pub use error::{LedgerError, ValidationIssue};
pub use services::{ExpenseService, HistoryView, RemoteClients};

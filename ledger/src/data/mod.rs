pub mod attachments;
pub mod csv_codec;
pub mod export;
pub mod history;
pub mod ledger_store;
pub mod remote;
pub mod xlsx_codec;

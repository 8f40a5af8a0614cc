use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use shared::models::{split_attachments, ExpenseRecord, LEDGER_COLUMNS};

use crate::error::LedgerError;

// Date handling for ledgers edited by hand or exported from spreadsheets
pub mod date_format {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"];
    const DATETIME_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    /// Coerces the textual forms found in stored ledgers to a calendar date.
    pub fn parse_date(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .map(|dt| dt.date())
            })
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    }

    pub fn format_date(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

}

/// Reads and writes the six-column ledger table.
pub struct LedgerCsv;

impl LedgerCsv {
    /// Reads a ledger file. A missing file is an empty ledger; any other failure is returned.
    pub fn read_file(path: &Path) -> Result<Vec<ExpenseRecord>, LedgerError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Self::read_records(BufReader::new(file))
    }

    pub fn read_records<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>, LedgerError> {
        let mut rdr = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        Ok(Self::records_from_rows(&rows))
    }

    /// Maps raw rows (header first) onto records, locating columns by header name.
    /// Missing columns read as empty and unknown ones are ignored.
    pub fn records_from_rows(rows: &[Vec<String>]) -> Vec<ExpenseRecord> {
        let Some((header, body)) = rows.split_first() else {
            return Vec::new();
        };
        let positions: Vec<Option<usize>> = LEDGER_COLUMNS.iter().map(|name| Self::column_position(header, name)).collect();

        let mut records = Vec::new();
        for (idx, row) in body.iter().enumerate() {
            let field: Vec<&str> = positions.iter().map(|pos| Self::get_field(row, *pos).trim()).collect();
            if field.iter().all(|value| value.is_empty()) {
                continue;
            }

            let date_str = field[3];
            let date = date_format::parse_date(date_str);
            if date.is_none() && !date_str.is_empty() {
                tracing::warn!(line = idx + 2, value = %date_str, "Unparseable ledger date left empty");
            }

            records.push(ExpenseRecord {
                id: field[0].to_string(),
                technician: field[1].to_string(),
                amount: field[2].to_string(),
                date,
                justification: field[4].to_string(),
                attachments: split_attachments(field[5]),
            });
        }
        records
    }

    /// Header row followed by one row per record, in the fixed column order.
    pub fn rows_from_records(records: &[ExpenseRecord]) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect());
        rows.extend(records.iter().map(|r| r.to_row().to_vec()));
        rows
    }

    pub fn write_records<W: Write>(writer: W, records: &[ExpenseRecord]) -> Result<(), LedgerError> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        for row in Self::rows_from_records(records) {
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_bytes(records: &[ExpenseRecord]) -> Result<Vec<u8>, LedgerError> {
        let mut buf = Vec::new();
        Self::write_records(&mut buf, records)?;
        Ok(buf)
    }

    fn column_position(header: &[String], name: &str) -> Option<usize> {
        header
            .iter()
            .position(|cell| cell.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
    }

    fn get_field(row: &[String], position: Option<usize>) -> &str {
        position.and_then(|pos| row.get(pos)).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    fn sample_record(id: &str, technician: &str, amount: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: id.to_string(),
            technician: technician.to_string(),
            amount: amount.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            justification: "Plein, trajet \"Lyon\"".to_string(),
            attachments: vec!["Karim/20240305_101500_a1b2c3_recu.jpg".to_string()],
        }
    }

    #[test]
    fn test_read_file_valid_data() {
        let csv_content = "\
ID,Technicien,Montant,Date,Justification,Photos
a1b2c3d4,Karim,\"50,00 €\",2024-03-05,Plein,Karim/a.jpg | Karim/b.pdf
e5f6a7b8,Sophie,42.10,06/03/2024,Dépannage,";
        let tmp_file = create_test_csv(csv_content);
        let records = LedgerCsv::read_file(tmp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a1b2c3d4");
        assert_eq!(records[0].amount, "50,00 €");
        assert_eq!(records[0].attachments, vec!["Karim/a.jpg", "Karim/b.pdf"]);
        assert_eq!(records[1].technician, "Sophie");
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 3, 6));
        assert!(records[1].attachments.is_empty());
    }

    #[test]
    fn test_read_file_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = LedgerCsv::read_file(&dir.path().join("absent.csv")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_read_header_only_and_empty_input() {
        let tmp_file = create_test_csv("ID,Technicien,Montant,Date,Justification,Photos");
        assert!(LedgerCsv::read_file(tmp_file.path()).unwrap().is_empty());
        assert!(LedgerCsv::read_records("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_read_reordered_missing_and_extra_columns() {
        let csv_content = "\
Montant,Commentaire,Technicien,ID,Date
12,interne,Karim,x1,05/03/2024";
        let records = LedgerCsv::read_records(csv_content.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "x1");
        assert_eq!(records[0].technician, "Karim");
        assert_eq!(records[0].amount, "12");
        assert_eq!(records[0].justification, "");
        assert!(records[0].attachments.is_empty());
    }

    #[test]
    fn test_read_unparseable_date_is_none() {
        let csv_content = "ID,Technicien,Montant,Date,Justification,Photos\nx1,Karim,12,bientôt,Plein,";
        let records = LedgerCsv::read_records(csv_content.as_bytes()).unwrap();
        assert_eq!(records[0].date, None);
    }

    #[test]
    fn test_read_tolerates_ragged_rows_and_blank_lines() {
        let csv_content = "\
ID,Technicien,Montant,Date,Justification,Photos
x1,Karim,12
,,,,,
x2,Sophie,8,2024-01-02,Plein,,surplus";
        let records = LedgerCsv::read_records(csv_content.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, None);
        assert_eq!(records[1].id, "x2");
    }

    #[test]
    fn test_write_empty_ledger_has_header() {
        let bytes = LedgerCsv::to_bytes(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "ID,Technicien,Montant,Date,Justification,Photos\n");
    }

    #[test]
    fn test_export_reload_preserves_records() {
        let records = vec![sample_record("a1", "Karim", "50,00 €"), sample_record("b2", "Jean Dupont", " 12 EUR")];
        let bytes = LedgerCsv::to_bytes(&records).unwrap();
        let reloaded = LedgerCsv::read_records(bytes.as_slice()).unwrap();
        assert_eq!(reloaded[0], records[0]);
        assert_eq!(reloaded[1].amount, "12 EUR");
        assert_eq!(reloaded[1].justification, records[1].justification);
    }
}

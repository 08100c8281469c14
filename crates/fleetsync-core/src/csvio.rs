// ── CSV import/export ──
//
// Import is header-driven with recognized synonyms per column, matching
// the files the hardware vendors hand out. Export derives its header
// from the first record's field names and emits CRLF rows.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Recognized header spellings, in match order.
const SERIAL_HEADERS: &[&str] = &["Device Serial Number", "SerialNumber"];
const HASH_HEADERS: &[&str] = &["Hardware Hash", "HardwareHash"];
const TAG_HEADERS: &[&str] = &["Group Tag", "GroupTag"];

/// One parsed import row.
///
/// Serialization uses the canonical vendor header spellings so an
/// exported file parses back in unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    #[serde(rename = "Device Serial Number")]
    pub serial_number: String,
    #[serde(rename = "Hardware Hash")]
    pub hardware_identifier: String,
    #[serde(rename = "Group Tag")]
    pub group_tag: String,
}

/// Parse an import CSV.
///
/// Serial and hardware-hash columns are required (under either
/// spelling); the group tag column is optional and defaults to empty.
/// A row missing a serial or hash is rejected with its row number --
/// silently importing a device with no identity would only fail later
/// with a far less useful remote error.
pub fn parse_import_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>, CoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |names: &[&str]| headers.iter().position(|h| names.contains(&h));

    let serial_idx = position(SERIAL_HEADERS).ok_or_else(|| CoreError::CsvRow {
        row: 1,
        message: format!("missing serial number column (expected one of: {SERIAL_HEADERS:?})"),
    })?;
    let hash_idx = position(HASH_HEADERS).ok_or_else(|| CoreError::CsvRow {
        row: 1,
        message: format!("missing hardware hash column (expected one of: {HASH_HEADERS:?})"),
    })?;
    let tag_idx = position(TAG_HEADERS);

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 2; // 1-based, after the header row
        let record = result?;

        let field = |idx: usize| record.get(idx).unwrap_or("").to_owned();
        let serial_number = field(serial_idx);
        let hardware_identifier = field(hash_idx);

        if serial_number.is_empty() {
            return Err(CoreError::CsvRow {
                row,
                message: "empty serial number".into(),
            });
        }
        if hardware_identifier.is_empty() {
            return Err(CoreError::CsvRow {
                row,
                message: "empty hardware hash".into(),
            });
        }

        rows.push(ImportRow {
            serial_number,
            hardware_identifier,
            group_tag: tag_idx.map(field).unwrap_or_default(),
        });
    }

    Ok(rows)
}

/// Export records as CSV with CRLF line endings.
///
/// The header row comes from the first record's field names; an empty
/// slice produces no output at all.
pub fn export_records<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<(), CoreError> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    let first = serde_json::to_value(first).map_err(std::io::Error::from)?;
    let Value::Object(fields) = first else {
        return Err(CoreError::Io(std::io::Error::other(
            "CSV export requires struct-shaped records",
        )));
    };
    let headers: Vec<String> = fields.keys().cloned().collect();
    wtr.write_record(&headers)?;

    for record in records {
        let value = serde_json::to_value(record).map_err(std::io::Error::from)?;
        let row: Vec<String> = headers
            .iter()
            .map(|key| display_field(value.get(key)))
            .collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn display_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VENDOR_CSV: &str = "Device Serial Number,Hardware Hash,Group Tag\r\n\
        SN-0001,AAEAHQcAEAAKAAX=,Sales\r\n\
        SN-0002,BBEAHQcAEAAKAAY=,\r\n";

    #[test]
    fn parses_vendor_headers() {
        let rows = parse_import_rows(VENDOR_CSV.as_bytes()).expect("parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].serial_number, "SN-0001");
        assert_eq!(rows[0].group_tag, "Sales");
        assert_eq!(rows[1].group_tag, "");
    }

    #[test]
    fn parses_compact_header_synonyms() {
        let csv = "SerialNumber,HardwareHash\nSN-9,hash-9\n";
        let rows = parse_import_rows(csv.as_bytes()).expect("parse");
        assert_eq!(rows[0].serial_number, "SN-9");
        assert_eq!(rows[0].group_tag, "");
    }

    #[test]
    fn rejects_missing_hash_column() {
        let csv = "Device Serial Number,Group Tag\nSN-1,Sales\n";
        let err = parse_import_rows(csv.as_bytes()).expect_err("should fail");
        let CoreError::CsvRow { row, message } = err else {
            panic!("expected CsvRow, got {err:?}");
        };
        assert_eq!(row, 1);
        assert!(message.contains("hardware hash"));
    }

    #[test]
    fn rejects_row_with_empty_serial() {
        let csv = "Device Serial Number,Hardware Hash\n,hash-1\n";
        let err = parse_import_rows(csv.as_bytes()).expect_err("should fail");
        assert!(matches!(err, CoreError::CsvRow { row: 2, .. }));
    }

    #[test]
    fn round_trip_preserves_serials_exactly() {
        let rows = parse_import_rows(VENDOR_CSV.as_bytes()).expect("parse");

        let mut out = Vec::new();
        export_records(&mut out, &rows).expect("export");
        let exported = String::from_utf8(out).expect("utf8");

        assert!(exported.starts_with("Device Serial Number,Hardware Hash,Group Tag\r\n"));
        assert!(exported.ends_with("\r\n"));

        let reparsed = parse_import_rows(exported.as_bytes()).expect("reparse");
        assert_eq!(reparsed, rows);
    }

    #[test]
    fn export_of_nothing_is_empty() {
        let mut out = Vec::new();
        export_records::<_, ImportRow>(&mut out, &[]).expect("export");
        assert!(out.is_empty());
    }
}

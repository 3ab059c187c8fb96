//! Flat tabular export.
//!
//! Records are built from the filtered collection (or the selection, in
//! filtered order), one field per declared column in declaration order.
//!
//! ## JSON shape
//!
//! Each record serializes as an object keyed by column header. Field order
//! follows the column declarations:
//!
//! ```json
//! [{"Name": "edge-1", "Region": "north", "Uptime": ""}]
//! ```

use csv::WriterBuilder;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use crate::error::ExportError;
use crate::model::{CellValue, Column, Row, RowKey};

/// One exported cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportField {
    /// Column header.
    pub header: String,
    /// Stringified value; missing values are empty.
    pub value: String,
}

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// Identity of the source row.
    pub key: RowKey,
    /// Fields in column declaration order.
    pub fields: Vec<ExportField>,
}

impl ExportRecord {
    /// Value under `header`, if the record has it.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.header == header)
            .map(|f| f.value.as_str())
    }
}

impl Serialize for ExportRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.header, &field.value)?;
        }
        map.end()
    }
}

/// Headers plus records, ready to be written out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    /// Column headers in declaration order.
    pub headers: Vec<String>,
    /// Exported rows.
    pub records: Vec<ExportRecord>,
}

impl ExportTable {
    /// Number of exported rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no rows were exported.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row keys in export order.
    pub fn keys(&self) -> Vec<&RowKey> {
        self.records.iter().map(|r| &r.key).collect()
    }

    /// Delimited text with a header line, one record per line.
    ///
    /// Fields are quoted only when they need it.
    pub fn to_delimited(&self, delimiter: u8) -> Result<String, ExportError> {
        let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for record in &self.records {
            writer.write_record(record.fields.iter().map(|f| f.value.as_str()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// JSON array of objects keyed by header.
    pub fn to_json(&self) -> Result<serde_json::Value, ExportError> {
        Ok(serde_json::to_value(&self.records)?)
    }
}

/// Turns rows into flat records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exporter;

impl Exporter {
    /// One record per row, in the order given.
    pub fn to_flat_rows<'a, T: 'a>(
        rows: impl IntoIterator<Item = &'a Row<T>>,
        columns: &[Column<T>],
    ) -> Vec<ExportRecord> {
        rows.into_iter()
            .map(|row| ExportRecord {
                key: row.key().clone(),
                fields: columns
                    .iter()
                    .map(|column| ExportField {
                        header: column.header().to_string(),
                        value: match column.value(row.data()) {
                            CellValue::Missing => String::new(),
                            value => value.to_text().into_owned(),
                        },
                    })
                    .collect(),
            })
            .collect()
    }

    /// Records plus headers.
    pub fn to_table<'a, T: 'a>(rows: impl IntoIterator<Item = &'a Row<T>>, columns: &[Column<T>]) -> ExportTable {
        ExportTable {
            headers: columns.iter().map(|c| c.header().to_string()).collect(),
            records: Self::to_flat_rows(rows, columns),
        }
    }
}

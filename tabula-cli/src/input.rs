//! Loading records and deriving columns

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tabula_lib::model::{CellValue, Column, Row, RowKey};

/// One input record.
pub type Record = Map<String, Value>;

/// Read a JSON array of objects.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&text).with_context(|| format!("Invalid input in {}", path.display()))
}

/// Parse a JSON array of objects.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        bail!("expected a JSON array of objects");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => bail!("item {} is {}, not an object", i, json_kind(&other)),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Key every record by `key_field`, or by position when none is given.
pub fn into_rows(records: Vec<Record>, key_field: Option<&str>) -> Result<Vec<Row<Record>>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let key = match key_field {
                None => RowKey::new(i.to_string()),
                Some(field) => match record.get(field) {
                    Some(Value::String(s)) => RowKey::from(s),
                    Some(Value::Number(n)) => RowKey::new(n.to_string()),
                    Some(Value::Bool(b)) => RowKey::new(b.to_string()),
                    _ => bail!("record {} has no usable '{}' key", i, field),
                },
            };
            Ok(Row::new(key, record))
        })
        .collect()
}

/// Column ids: the requested ones, or the first record's fields in order.
pub fn column_ids(requested: &[String], records: &[Record]) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    records
        .first()
        .map(|record| record.keys().cloned().collect())
        .unwrap_or_default()
}

/// One sortable, filterable column per field, headed by the field name.
pub fn build_columns(ids: &[String]) -> Result<Vec<Column<Record>>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            bail!("column '{}' listed twice", id);
        }
        let field = id.clone();
        columns.push(
            Column::new(id.as_str(), id.as_str(), move |record: &Record| {
                record.get(&field).map(CellValue::from_json).unwrap_or_default()
            })
            .sortable(),
        );
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 7, "name": "edge-7", "region": "north"},
        {"id": 8, "name": "edge-8", "region": null}
    ]"#;

    #[test]
    fn test_parse_and_key_records() {
        let records = parse_records(SAMPLE).unwrap();
        let rows = into_rows(records, Some("id")).unwrap();
        assert_eq!(rows[1].key().as_str(), "8");
    }

    #[test]
    fn test_position_keys_by_default() {
        let rows = into_rows(parse_records(SAMPLE).unwrap(), None).unwrap();
        assert_eq!(rows[0].key().as_str(), "0");
    }

    #[test]
    fn test_rejects_non_objects_and_missing_keys() {
        assert!(parse_records("[1, 2]").is_err());
        assert!(parse_records("{}").is_err());
        let records = parse_records(SAMPLE).unwrap();
        assert!(into_rows(records, Some("serial")).is_err());
    }

    #[test]
    fn test_columns_follow_first_record() {
        let records = parse_records(SAMPLE).unwrap();
        let ids = column_ids(&[], &records);
        assert_eq!(ids, vec!["id", "name", "region"]);

        let columns = build_columns(&ids).unwrap();
        assert_eq!(columns[2].value(&records[1]), CellValue::Missing);
        assert_eq!(columns[1].text(&records[0]), "edge-7");
        assert!(build_columns(&["a".to_string(), "a".to_string()]).is_err());
    }
}

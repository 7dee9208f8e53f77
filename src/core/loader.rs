//! File loading: one export file in, one [`Table`] out.

use crate::domain::model::{ExtractResult, Record, SkippedFile, Table};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Value};

/// Parses a file's bytes into a table.
///
/// Two shapes are accepted: an array of objects (one record per element) and
/// an object whose values are equal-length arrays (one record per index).
pub fn parse_table(source: &str, bytes: &[u8]) -> Result<Table> {
    let json: Value = serde_json::from_slice(bytes)?;

    let records = match json {
        Value::Array(items) => rows_from_array(items)?,
        Value::Object(columns) => rows_from_columns(columns)?,
        other => {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "expected a JSON array of objects, found {}",
                    describe(&other)
                ),
            })
        }
    };

    Ok(Table::from_records(source, records))
}

fn rows_from_array(items: Vec<Value>) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(data) => Ok(Record::new(data)),
            other => Err(EtlError::ProcessingError {
                message: format!("element {} is {}, not an object", index, describe(&other)),
            }),
        })
        .collect()
}

fn rows_from_columns(columns: Map<String, Value>) -> Result<Vec<Record>> {
    let mut arrays = Vec::with_capacity(columns.len());
    let mut row_count = None;

    for (name, value) in columns {
        let values = match value {
            Value::Array(values) => values,
            other => {
                return Err(EtlError::ProcessingError {
                    message: format!("column '{}' is {}, not an array", name, describe(&other)),
                })
            }
        };
        match row_count {
            None => row_count = Some(values.len()),
            Some(n) if n != values.len() => {
                return Err(EtlError::ProcessingError {
                    message: format!(
                        "column '{}' has {} values, expected {}",
                        name,
                        values.len(),
                        n
                    ),
                })
            }
            Some(_) => {}
        }
        arrays.push((name, values.into_iter()));
    }

    let mut records = Vec::with_capacity(row_count.unwrap_or(0));
    for _ in 0..row_count.unwrap_or(0) {
        let mut data = Map::new();
        for (name, values) in arrays.iter_mut() {
            data.insert(name.clone(), values.next().unwrap_or(Value::Null));
        }
        records.push(Record::new(data));
    }
    Ok(records)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub async fn load_table<S: Storage>(storage: &S, path: &str) -> Result<Table> {
    let bytes = storage.read_file(path).await?;
    parse_table(path, &bytes)
}

/// Loads every file matching `pattern`. A file that cannot be read or parsed
/// is logged and left out; it never fails the batch.
pub async fn load_tables<S: Storage>(storage: &S, pattern: &str) -> Result<ExtractResult> {
    let files = storage.list_files(pattern).await?;
    let mut result = ExtractResult {
        files_matched: files.len(),
        ..Default::default()
    };

    for path in files {
        match load_table(storage, &path).await {
            Ok(table) => {
                tracing::info!("📄 Loaded {} ({} records)", path, table.len());
                result.tables.push(table);
            }
            Err(e) => {
                tracing::error!("❌ Error loading JSON file {}: {}", path, e);
                result.files_skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_array_of_objects() {
        let table = parse_table(
            "a.json",
            br#"[{"ts":"t1","platform":"p1","ms_played":100},{"ts":"t2"}]"#,
        )
        .unwrap();

        assert_eq!(table.source, "a.json");
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, vec!["ts", "platform", "ms_played"]);
        assert_eq!(table.records[1].get("ms_played"), &Value::Null);
    }

    #[test]
    fn test_parse_column_oriented_object() {
        let table = parse_table(
            "cols.json",
            br#"{"ts":["t1","t2"],"ms_played":[1,2]}"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("ts"), &json!("t1"));
        assert_eq!(table.records[1].get("ms_played"), &json!(2));
    }

    #[test]
    fn test_parse_empty_array() {
        let table = parse_table("empty.json", b"[]").unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(
            parse_table("bad.json", b"[{\"ts\": "),
            Err(EtlError::SerializationError(_))
        ));
        assert!(matches!(
            parse_table("scalar.json", b"42"),
            Err(EtlError::ProcessingError { .. })
        ));
        assert!(matches!(
            parse_table("mixed.json", br#"[{"ts":"t1"}, 3]"#),
            Err(EtlError::ProcessingError { .. })
        ));
        assert!(matches!(
            parse_table("ragged.json", br#"{"ts":["t1","t2"],"ms_played":[1]}"#),
            Err(EtlError::ProcessingError { .. })
        ));
        assert!(matches!(
            parse_table("scalars.json", br#"{"ts":"t1"}"#),
            Err(EtlError::ProcessingError { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        assert!(parse_table("latin1.json", b"[{\"name\":\"caf\xe9\"}]").is_err());
    }
}

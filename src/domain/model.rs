use crate::domain::target_row::TargetRow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// One JSON object from an export file. Key order follows the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Missing keys read as `Value::Null`.
    pub fn get(&self, key: &str) -> &Value {
        self.data.get(key).unwrap_or(&Value::Null)
    }
}

/// The records parsed from a single file.
///
/// `columns` is the union of every record's keys in first-seen order, and each
/// record carries every column, with `Value::Null` filling the gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub source: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn from_records(source: impl Into<String>, records: Vec<Record>) -> Self {
        let columns = column_union(records.iter());
        let records = null_fill(records, &columns);

        Self {
            source: source.into(),
            columns,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How many rows of the combined table came from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub source: String,
    pub rows: usize,
}

/// Every loaded table concatenated in load order. A row's index is its
/// position in `records`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedTable {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub sources: Vec<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: String,
    pub non_null: usize,
    pub kinds: Vec<&'static str>,
}

impl CombinedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    /// Non-null count and the JSON types seen, per column.
    pub fn column_summary(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|name| {
                let mut non_null = 0;
                let mut kinds: Vec<&'static str> = Vec::new();
                for record in &self.records {
                    let value = record.get(name);
                    if !value.is_null() {
                        non_null += 1;
                        let kind = json_kind(value);
                        if !kinds.contains(&kind) {
                            kinds.push(kind);
                        }
                    }
                }
                ColumnSummary {
                    name: name.clone(),
                    non_null,
                    kinds,
                }
            })
            .collect()
    }

    /// One line per row: the row index followed by the record as compact JSON.
    pub fn render_preview(&self, n: usize) -> String {
        self.head(n)
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let json = serde_json::to_string(&record.data).unwrap_or_default();
                format!("{:>6}  {}", index, json)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    pub tables: Vec<Table>,
    pub files_matched: usize,
    pub files_skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub combined: CombinedTable,
    pub rows: Vec<TargetRow>,
}

pub(crate) fn column_union<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for key in record.data.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

pub(crate) fn null_fill(records: Vec<Record>, columns: &[String]) -> Vec<Record> {
    records
        .into_iter()
        .map(|mut record| {
            for column in columns {
                if !record.data.contains_key(column) {
                    record.data.insert(column.clone(), Value::Null);
                }
            }
            record
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map),
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_table_null_fills_missing_columns() {
        let table = Table::from_records(
            "a.json",
            vec![
                record(json!({"ts": "t1", "platform": "p1"})),
                record(json!({"ts": "t2", "skipped": true})),
            ],
        );

        assert_eq!(table.columns, vec!["ts", "platform", "skipped"]);
        assert_eq!(table.records[0].get("skipped"), &Value::Null);
        assert!(table.records[0].data.contains_key("skipped"));
        assert_eq!(table.records[1].get("platform"), &Value::Null);
        assert_eq!(table.records[1].get("skipped"), &json!(true));
    }

    #[test]
    fn test_column_summary_counts_non_null() {
        let combined = CombinedTable {
            columns: vec!["ms_played".to_string(), "skipped".to_string()],
            records: vec![
                record(json!({"ms_played": 100, "skipped": null})),
                record(json!({"ms_played": 2.5, "skipped": false})),
            ],
            sources: vec![],
        };

        let summary = combined.column_summary();
        assert_eq!(summary[0].non_null, 2);
        assert_eq!(summary[0].kinds, vec!["int", "float"]);
        assert_eq!(summary[1].non_null, 1);
        assert_eq!(summary[1].kinds, vec!["bool"]);
    }

    #[test]
    fn test_head_is_bounded() {
        let combined = CombinedTable {
            columns: vec!["ts".to_string()],
            records: vec![record(json!({"ts": "t1"}))],
            sources: vec![],
        };
        assert_eq!(combined.head(5).len(), 1);
        assert_eq!(combined.render_preview(5).lines().count(), 1);
        assert!(combined.render_preview(5).contains("\"ts\":\"t1\""));
    }
}

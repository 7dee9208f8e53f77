use crate::domain::model::{column_union, null_fill, CombinedTable, SourceSpan, Table};

/// Concatenates tables in the order given. Returns `None` for an empty input
/// so the caller can skip the load stage.
pub fn combine(tables: Vec<Table>) -> Option<CombinedTable> {
    if tables.is_empty() {
        return None;
    }

    let columns = column_union(tables.iter().flat_map(|t| t.records.iter()));
    let mut sources = Vec::with_capacity(tables.len());
    let mut records = Vec::with_capacity(tables.iter().map(Table::len).sum());

    for table in tables {
        sources.push(SourceSpan {
            source: table.source,
            rows: table.records.len(),
        });
        records.extend(table.records);
    }

    Some(CombinedTable {
        records: null_fill(records, &columns),
        columns,
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::parse_table;
    use serde_json::{json, Value};

    #[test]
    fn test_no_tables_means_no_data() {
        assert!(combine(Vec::new()).is_none());
    }

    #[test]
    fn test_concatenation_preserves_order_and_count() {
        let a = parse_table("a.json", br#"[{"ts":"t1"},{"ts":"t2"}]"#).unwrap();
        let b = parse_table("b.json", br#"[{"ts":"t3"}]"#).unwrap();
        let c = parse_table("c.json", br#"[{"ts":"t4"},{"ts":"t5"}]"#).unwrap();

        let combined = combine(vec![a, b, c]).unwrap();

        assert_eq!(combined.len(), 5);
        let order: Vec<&Value> = combined.records.iter().map(|r| r.get("ts")).collect();
        assert_eq!(
            order,
            vec![&json!("t1"), &json!("t2"), &json!("t3"), &json!("t4"), &json!("t5")]
        );
        assert_eq!(
            combined.sources,
            vec![
                SourceSpan { source: "a.json".to_string(), rows: 2 },
                SourceSpan { source: "b.json".to_string(), rows: 1 },
                SourceSpan { source: "c.json".to_string(), rows: 2 },
            ]
        );
    }

    #[test]
    fn test_columns_are_unioned_across_tables() {
        let a = parse_table("a.json", br#"[{"ts":"t1","platform":"p1","ms_played":100}]"#).unwrap();
        let b = parse_table(
            "b.json",
            br#"[{"ts":"t2","platform":"p2","ms_played":200,"master_metadata_track_name":"X"}]"#,
        )
        .unwrap();

        let combined = combine(vec![a, b]).unwrap();

        assert_eq!(
            combined.columns,
            vec!["ts", "platform", "ms_played", "master_metadata_track_name"]
        );
        let first = combined.row(0).unwrap();
        assert!(first.data.contains_key("master_metadata_track_name"));
        assert_eq!(first.get("master_metadata_track_name"), &Value::Null);
        assert_eq!(
            combined.row(1).unwrap().get("master_metadata_track_name"),
            &json!("X")
        );
    }

    #[test]
    fn test_empty_tables_still_count_as_loaded() {
        let empty = parse_table("empty.json", b"[]").unwrap();
        let combined = combine(vec![empty]).unwrap();
        assert!(combined.is_empty());
        assert_eq!(combined.sources.len(), 1);
    }
}

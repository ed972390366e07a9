//! Scenario E from spec.md §8, run end-to-end through the public API.

use sqlgen::{to_sql, Dialect, FieldMetadata, InsertHeader, InsertRecord, LogicalType, RenderedValue, Statement, TableMetadata};

#[test]
fn scenario_e_dml_to_sql() {
    let stmt = Statement::Insert {
        header: InsertHeader {
            table: TableMetadata { schema_name: "s".to_string(), table_name: "t".to_string() },
            fields: vec![
                FieldMetadata { name: "id".to_string(), logical_type: LogicalType::Int },
                FieldMetadata { name: "v".to_string(), logical_type: LogicalType::Varchar },
            ],
        },
        data: vec![InsertRecord {
            is_null: vec![false, false],
            insert_value: vec![RenderedValue::Text("7".to_string()), RenderedValue::Text("hi".to_string())],
        }],
        segment_id: 1,
    };

    let sql = to_sql(&stmt, Dialect::Native, false).unwrap();
    assert_eq!(sql, "INSERT INTO `s`.`t` (`id`,`v`) VALUES (7,'hi')");
}

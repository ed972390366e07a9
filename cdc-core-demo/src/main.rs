//! A small CLI that runs the seed scenarios from spec.md §8 against
//! `storage::MemoryCursor`, printing before/after rows and emitted SQL.
//! Grounded on the `binlog_cli`/`rustcdc-cli` clap-derived CLI shape
//! (`Args` + subcommand `Cmd`), ported from `structopt` to `clap`
//! (see DESIGN.md).

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use common::collation::Binary;
use common::config::SessionConfig;
use common::log::tracing_factory::TracingFactory;
use common::session::Session;
use dml::{bulk_insert_rows, CopyInfo, DuplicatePolicy, NeverCancelled, PreparedRow, UpdateAssignment};
use field::{Field, FieldKind, FieldValue, RowBuffer};
use sqlgen::{to_sql, Dialect, FieldMetadata, InsertHeader, InsertRecord, LogicalType, RenderedValue, Statement, TableMetadata};
use storage::mock::{KeySpec, MemoryCursor};
use storage::Table;

#[derive(Debug, Parser)]
#[command(name = "cdc-core-demo", about = "typed-column execution layer and DML pipeline demo")]
struct Args {
    /// enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Run one seed scenario, or all of them if omitted.
    Run {
        #[arg(value_enum)]
        scenario: Option<Scenario>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    A,
    B,
    C,
    D,
    E,
    F,
}

fn main() {
    let args = Args::parse();
    TracingFactory::init_log(args.debug);

    let Cmd::Run { scenario } = args.cmd;
    tracing::info!(?scenario, "running scenario(s)");
    match scenario {
        Some(Scenario::A) => scenario_a(),
        Some(Scenario::B) => scenario_b(),
        Some(Scenario::C) => scenario_c(),
        Some(Scenario::D) => scenario_d(),
        Some(Scenario::E) => scenario_e(),
        Some(Scenario::F) => scenario_f(),
        None => {
            scenario_a();
            scenario_b();
            scenario_c();
            scenario_d();
            scenario_e();
            scenario_f();
        }
    }
}

fn id_s_table() -> Table {
    let id = Field::new("id", FieldKind::Long, 0, 4, Arc::new(Binary));
    let s = Field::new("s", FieldKind::Varchar, 4, 10, Arc::new(Binary)).with_declared_len(8);
    Table::new("t", vec![id, s], 14, 0).with_unique_key(vec![0])
}

fn row_with(table: &Table, id: i64, s: &str, session: &mut Session) -> RowBuffer {
    let mut row = table.blank_row();
    table.fields[0].store_str(&mut row, &id.to_string(), session, false);
    table.fields[1].store_str(&mut row, s, session, false);
    row
}

fn print_rows(label: &str, table: &Table, cursor: &MemoryCursor) {
    println!("{}:", label);
    for row in cursor.all_rows() {
        let id = table.fields[0].val_int(&row);
        let s = String::from_utf8_lossy(&table.fields[1].val_str(&row)).into_owned();
        println!("  ({}, {:?})", id, s);
    }
}

/// Scenario A (type coercion): `CREATE TABLE t(c INT)`; `INSERT INTO t
/// VALUES ('42abc')`. Non-strict: one row with c=42, one truncation
/// warning. Strict mode: the statement fails with no row (spec.md §8).
fn scenario_a() {
    println!("\n=== Scenario A: type coercion ===");

    let c = Field::new("c", FieldKind::Long, 0, 4, Arc::new(Binary));
    let mut table = Table::new("t", vec![c], 4, 0);
    let mut session = Session::new(SessionConfig::default());

    let mut row = table.blank_row();
    let result = table.fields[0].store_str(&mut row, "42abc", &mut session, false);
    table.row = row;

    println!("non-strict store result: {:?}", result);
    println!("c = {}", table.fields[0].val_int(&table.row));
    println!("warnings: {}", session.warnings().len());

    let c = Field::new("c", FieldKind::Long, 0, 4, Arc::new(Binary));
    let mut strict_table = Table::new("t", vec![c], 4, 0);
    let mut strict_session = Session::new(SessionConfig::default());
    let mut cursor = MemoryCursor::new(vec![], 0);

    let mut row = strict_table.blank_row();
    let result = strict_table.fields[0].store_str(&mut row, "42abc", &mut strict_session, true);
    let mut prepared = PreparedRow::new(row);
    prepared.record(result, true);

    let mut info = CopyInfo::new(DuplicatePolicy::Error);
    let outcome = bulk_insert_rows(&mut strict_table, &mut cursor, &mut strict_session, &mut info, vec![prepared], 1, &NeverCancelled);

    println!("strict store result: {:?}", result);
    println!("strict insert outcome: {:?}, rows written: {}", outcome, cursor.row_count());
}

/// Scenario B (REPLACE): table t(id INT PRIMARY KEY, s VARCHAR(8)) holds
/// (1,'old'). REPLACE INTO t VALUES (1,'new').
fn scenario_b() {
    println!("\n=== Scenario B: REPLACE ===");
    let mut table = id_s_table();
    let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
    let mut session = Session::new(SessionConfig::default());

    let existing = row_with(&table, 1, "old", &mut session);
    cursor.write_row(&existing);
    print_rows("before", &table, &cursor);

    let mut info = CopyInfo::new(DuplicatePolicy::Replace);
    let incoming = row_with(&table, 1, "new", &mut session);
    bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(incoming)], 1, &NeverCancelled).unwrap();

    print_rows("after", &table, &cursor);
    println!("records={} deleted={} copied={}", info.records, info.deleted, info.copied);
}

/// Scenario C (ON DUPLICATE KEY UPDATE): starting with (1,'old'), INSERT
/// INTO t VALUES (1,'x') ON DUPLICATE KEY UPDATE s='y'.
fn scenario_c() {
    println!("\n=== Scenario C: ON DUPLICATE KEY UPDATE ===");
    let mut table = id_s_table();
    let mut cursor = MemoryCursor::new(vec![KeySpec::new(vec![(0, 4)])], 0);
    let mut session = Session::new(SessionConfig::default());

    let existing = row_with(&table, 1, "old", &mut session);
    cursor.write_row(&existing);
    print_rows("before", &table, &cursor);

    let mut info = CopyInfo::new(DuplicatePolicy::Update).with_update_assignments(vec![UpdateAssignment {
        field_index: 1,
        value: FieldValue::Str(b"y".to_vec()),
    }]);
    let incoming = row_with(&table, 1, "x", &mut session);
    bulk_insert_rows(&mut table, &mut cursor, &mut session, &mut info, vec![PreparedRow::new(incoming)], 1, &NeverCancelled).unwrap();

    print_rows("after", &table, &cursor);
    println!("records={} updated={} touched={} copied={}", info.records, info.updated, info.touched, info.copied);
}

/// Scenario D (Date arithmetic): DateTime("2007-06-09 09:30:00") -
/// Time("16:30:00") -> DateTime("2007-06-08 17:00:00").
fn scenario_d() {
    println!("\n=== Scenario D: DateTime - Time ===");
    let dt = common::temporal::DateTime::parse("2007-06-09 09:30:00", false).unwrap();
    let t = common::temporal::Time::parse("16:30:00").unwrap();
    let result = dt.sub_time(&t);
    println!("{} - {} = {}", dt, t, result);
}

/// Scenario E (DML -> SQL): an INSERT wire record rendered in native
/// dialect.
fn scenario_e() {
    println!("\n=== Scenario E: DML -> SQL ===");
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
    println!("{}", to_sql(&stmt, Dialect::Native, false).unwrap());
}

/// Scenario F (DECIMAL store): declared DECIMAL(5,2), store "123.456" and
/// "99999.9".
fn scenario_f() {
    println!("\n=== Scenario F: DECIMAL store ===");
    let d = Field::new("d", FieldKind::Decimal, 0, 16, Arc::new(Binary)).with_decimal(5, 2);
    let mut session = Session::new(SessionConfig::default());

    let mut row = RowBuffer::new(16, 0);
    let result = d.store_str(&mut row, "123.456", &mut session, false);
    println!("store(\"123.456\") -> {:?}, value={}", result, d.val_decimal(&row).to_plain_string());

    let mut row2 = RowBuffer::new(16, 0);
    let result2 = d.store_str(&mut row2, "99999.9", &mut session, false);
    println!("store(\"99999.9\") -> {:?}, value={}", result2, d.val_decimal(&row2).to_plain_string());
}

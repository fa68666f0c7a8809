//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use tablecheck_core::{Table, TableSet};
use tablecheck_engine::{FunctionLibrary, Registry};
use tablecheck_expr::ExprParser;

pub const DATATYPE_COLUMNS: [&str; 6] = ["datatype", "parent", "match", "level", "description", "replace"];

/// Builtin datatypes plus `text`, `trimmed` and `word`
pub fn datatype_table() -> Table {
    Table::from_records(
        "datatype",
        &DATATYPE_COLUMNS,
        &[
            &["text", "", r"/[^\n]*$/", "", "text without newlines", ""],
            &[
                "trimmed",
                "text",
                r"/\S(.*\S)?$/",
                "warn",
                "text without surrounding whitespace",
                r"s/^\s+|\s+$//g",
            ],
            &["word", "trimmed", r"/\w+$/", "error", "a single word", ""],
        ],
    )
}

pub fn field_table(rows: &[&[&str]]) -> Table {
    Table::from_records("field", &["table", "column", "condition"], rows)
}

pub fn rule_table(rows: &[&[&str]]) -> Table {
    Table::from_records(
        "rule",
        &[
            "table",
            "when column",
            "when condition",
            "then column",
            "then condition",
            "level",
            "description",
        ],
        rows,
    )
}

/// Configuration tables followed by data tables
pub fn table_set(config: Vec<Table>, data: Vec<Table>) -> TableSet {
    let mut tables = vec![datatype_table()];
    tables.extend(config);
    tables.extend(data);
    TableSet::from_tables(2, tables).unwrap()
}

pub fn build(config: Vec<Table>, data: Vec<Table>) -> Registry {
    Registry::build(
        table_set(config, data),
        FunctionLibrary::new(),
        &ExprParser::new(),
    )
    .unwrap()
}

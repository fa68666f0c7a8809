//! Structure and content conditions of the `datatype`, `field` and `rule`
//! tables
//!
//! The content conditions are ordinary conditions evaluated by the engine
//! itself, so the configuration tables are checked the same way data is.

use tablecheck_core::{Condition, Message, Table};

/// Columns every `datatype` table must have (`replace` is optional)
pub const DATATYPE_COLUMNS: [&str; 5] = ["datatype", "parent", "match", "level", "description"];

/// Columns every `field` table must have
pub const FIELD_COLUMNS: [&str; 3] = ["table", "column", "condition"];

/// Columns every `rule` table must have (`level` and `description` are
/// optional)
pub const RULE_COLUMNS: [&str; 5] = [
    "table",
    "when column",
    "when condition",
    "then column",
    "then condition",
];

/// Required columns of a configuration table
pub fn required_columns(table: &str) -> &'static [&'static str] {
    match table {
        "datatype" => &DATATYPE_COLUMNS,
        "field" => &FIELD_COLUMNS,
        "rule" => &RULE_COLUMNS,
        _ => &[],
    }
}

/// One message per required column the table lacks
pub fn missing_columns(table: &Table) -> Vec<Message> {
    required_columns(table.name())
        .iter()
        .filter(|column| !table.has_column(column))
        .map(|column| {
            Message::new(
                table.name(),
                format!("missing required column '{}'", column),
            )
        })
        .collect()
}

fn level_condition() -> Condition {
    let levels = ["ERROR", "error", "WARN", "warn", "INFO", "info"]
        .into_iter()
        .map(Condition::literal)
        .collect();
    Condition::call(
        "any",
        vec![Condition::datatype("blank"), Condition::call("in", levels)],
    )
}

fn not_blank() -> Condition {
    Condition::call("not", vec![Condition::datatype("blank")])
}

fn blank_or(datatype: &str) -> Condition {
    Condition::call(
        "any",
        vec![Condition::datatype("blank"), Condition::datatype(datatype)],
    )
}

/// Conditions applied to each column of a configuration table
pub fn content_conditions(table: &str) -> Vec<(&'static str, Condition)> {
    match table {
        "datatype" => vec![
            ("datatype", Condition::datatype("datatype_label")),
            (
                "parent",
                Condition::call(
                    "any",
                    vec![
                        Condition::datatype("blank"),
                        Condition::call("in", vec![Condition::field("datatype", "datatype")]),
                    ],
                ),
            ),
            ("match", blank_or("regex")),
            ("level", level_condition()),
            ("replace", blank_or("regex_sub")),
        ],
        "field" => FIELD_COLUMNS.iter().map(|&c| (c, not_blank())).collect(),
        "rule" => {
            let mut conditions: Vec<_> = RULE_COLUMNS.iter().map(|&c| (c, not_blank())).collect();
            conditions.push(("level", level_condition()));
            conditions
        }
        _ => Vec::new(),
    }
}

//! Distinct-message post-processing
//!
//! Collapses a table's messages to one per distinct message text and
//! re-points them at a `<table>_distinct` table holding only the rows that
//! carry those messages.

use crate::message::{Cell, Message};
use std::collections::{BTreeMap, HashSet};

/// Suffix of the derived table name
pub const DISTINCT_SUFFIX: &str = "_distinct";

/// Result of collapsing a table's messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinctTable {
    /// `<table>_distinct`
    pub name: String,

    /// 0-based source rows to copy into the derived table, ascending
    pub source_rows: Vec<usize>,

    /// Distinct messages, located in the derived table
    pub messages: Vec<Message>,
}

/// Keep the first message for each distinct text, in input order
pub fn distinct_by_text(messages: &[Message]) -> Vec<Message> {
    let mut seen = HashSet::new();
    messages
        .iter()
        .filter(|m| seen.insert(m.message.as_str()))
        .cloned()
        .collect()
}

/// Collapse `messages` of `table` and relocate them into the derived table.
///
/// `row_start` is the sheet row of the first data row in both the source and
/// the derived table. Messages without a cell are kept first, unchanged
/// apart from the table name.
pub fn collect_distinct(table: &str, messages: &[Message], row_start: usize) -> DistinctTable {
    let name = format!("{}{}", table, DISTINCT_SUFFIX);
    let distinct = distinct_by_text(messages);

    let mut unlocated = Vec::new();
    let mut by_row: BTreeMap<usize, Vec<Message>> = BTreeMap::new();
    for msg in distinct {
        match msg.cell {
            Some(cell) if cell.row >= row_start => by_row.entry(cell.row).or_default().push(msg),
            _ => unlocated.push(msg),
        }
    }

    let mut source_rows = Vec::with_capacity(by_row.len());
    let mut relocated = Vec::new();
    for msg in &mut unlocated {
        msg.table = name.clone();
    }
    for (new_idx, (sheet_row, row_messages)) in by_row.into_iter().enumerate() {
        source_rows.push(sheet_row - row_start);
        for mut msg in row_messages {
            msg.table = name.clone();
            msg.cell = msg.cell.map(|c| Cell::new(row_start + new_idx, c.column));
            relocated.push(msg);
        }
    }

    unlocated.extend(relocated);
    DistinctTable {
        name,
        source_rows,
        messages: unlocated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(row: usize, column: usize, text: &str) -> Message {
        Message::new("terms", text).at(Cell::new(row, column))
    }

    #[test]
    fn keeps_first_of_each_text() {
        let messages = vec![msg(2, 1, "a"), msg(3, 1, "b"), msg(4, 2, "a")];
        let kept = distinct_by_text(&messages);
        assert_eq!(kept, vec![msg(2, 1, "a"), msg(3, 1, "b")]);
    }

    #[test]
    fn relocates_into_derived_table() {
        let messages = vec![msg(5, 2, "x"), msg(9, 1, "y"), msg(12, 3, "x"), msg(9, 3, "z")];
        let distinct = collect_distinct("terms", &messages, 2);

        assert_eq!(distinct.name, "terms_distinct");
        assert_eq!(distinct.source_rows, vec![3, 7]);

        let cells: Vec<_> = distinct
            .messages
            .iter()
            .map(|m| (m.table.as_str(), m.cell.map(|c| c.to_string()), m.message.as_str()))
            .collect();
        assert_eq!(
            cells,
            vec![
                ("terms_distinct", Some("B2".to_string()), "x"),
                ("terms_distinct", Some("A3".to_string()), "y"),
                ("terms_distinct", Some("C3".to_string()), "z"),
            ]
        );
    }

    #[test]
    fn unlocated_messages_lead() {
        let messages = vec![msg(3, 1, "x"), Message::new("terms", "missing column")];
        let distinct = collect_distinct("terms", &messages, 2);
        assert_eq!(distinct.messages[0].message, "missing column");
        assert_eq!(distinct.messages[0].cell, None);
        assert_eq!(distinct.source_rows, vec![1]);
    }
}

//! Value to row indexes for columns queried by `in`, `distinct` and `lookup`

use std::collections::HashMap;
use tablecheck_core::TableSet;

type ValueRows = HashMap<String, Vec<usize>>;

/// Rows holding each value, per indexed `table.column`
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    columns: HashMap<String, HashMap<String, ValueRows>>,
}

impl ColumnIndex {
    /// Index the requested `(table, column)` pairs; unknown pairs are skipped
    pub fn build<'a>(
        tables: &TableSet,
        wanted: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut index = Self::default();
        for (table_name, column) in wanted {
            if index.is_indexed(table_name, column) {
                continue;
            }
            let Some(values) = tables.get(table_name).and_then(|t| t.column_values(column)) else {
                continue;
            };
            let mut rows: ValueRows = HashMap::new();
            for (row, value) in values.enumerate() {
                rows.entry(value.to_string()).or_default().push(row);
            }
            tracing::debug!(
                table = table_name,
                column,
                distinct_values = rows.len(),
                "Indexed column"
            );
            index
                .columns
                .entry(table_name.to_string())
                .or_default()
                .insert(column.to_string(), rows);
        }
        index
    }

    pub fn is_indexed(&self, table: &str, column: &str) -> bool {
        self.columns
            .get(table)
            .is_some_and(|columns| columns.contains_key(column))
    }

    /// Rows holding `value`, ascending; `None` when the column is not indexed
    pub fn rows(&self, table: &str, column: &str, value: &str) -> Option<&[usize]> {
        let values = self.columns.get(table)?.get(column)?;
        Some(values.get(value).map(Vec::as_slice).unwrap_or(&[]))
    }
}

//! Message and distinct-table writers

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tablecheck_core::{collect_distinct, Message, TableSet};

/// Header of a message table
pub const MESSAGE_COLUMNS: [&str; 7] = [
    "table",
    "cell",
    "rule ID",
    "rule",
    "level",
    "message",
    "suggestion",
];

/// `,` for `.csv`, tab for everything else
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

fn message_record(message: &Message) -> [String; 7] {
    [
        message.table.clone(),
        message.cell.map(|c| c.to_string()).unwrap_or_default(),
        message.rule_id.map(|r| r.to_string()).unwrap_or_default(),
        message.rule.clone().unwrap_or_default(),
        message.level.to_string(),
        message.message.clone(),
        message.suggestion.clone().unwrap_or_default(),
    ]
}

/// Write messages as a CSV or TSV table, chosen by the extension of `path`
pub fn write_messages(path: &Path, messages: &[Message]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)
        .with_context(|| format!("write messages: {}", path.display()))?;

    writer.write_record(MESSAGE_COLUMNS)?;
    for message in messages {
        writer.write_record(message_record(message))?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), count = messages.len(), "Wrote messages");
    Ok(())
}

/// Write `<dir>/<table>_distinct.<ext>` holding the rows that carry each
/// distinct message of `table`, and return those messages re-pointed at it.
///
/// The extension follows the source file; tables without one are written
/// as TSV. Nothing is written when `messages` is empty.
pub fn write_distinct(
    dir: &Path,
    tables: &TableSet,
    table: &str,
    messages: &[Message],
) -> Result<Vec<Message>> {
    if messages.is_empty() {
        return Ok(Vec::new());
    }
    let source = tables
        .get(table)
        .with_context(|| format!("unknown table '{}'", table))?;
    let distinct = collect_distinct(table, messages, tables.row_start());

    let ext = source
        .path()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .unwrap_or("tsv");
    let path: PathBuf = dir.join(format!("{}.{}", distinct.name, ext));

    std::fs::create_dir_all(dir)
        .with_context(|| format!("create directory: {}", dir.display()))?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter_for(&path))
        .from_path(&path)
        .with_context(|| format!("write distinct table: {}", path.display()))?;

    writer.write_record(source.columns())?;
    for &idx in &distinct.source_rows {
        if let Some(row) = source.row(idx) {
            writer.write_record(row.values())?;
        }
    }
    writer.flush()?;

    tracing::info!(
        table,
        distinct = distinct.messages.len(),
        path = %path.display(),
        "Wrote rows with distinct messages"
    );
    Ok(distinct.messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tablecheck_core::{Cell, Level, RuleId, Table};

    #[test]
    fn delimiter_by_extension() {
        assert_eq!(delimiter_for(Path::new("out.csv")), b',');
        assert_eq!(delimiter_for(Path::new("out.CSV")), b',');
        assert_eq!(delimiter_for(Path::new("out.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("out")), b'\t');
    }

    #[test]
    fn message_table_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.tsv");
        let message = Message::new("colors", "'purple' must be in: \"red\"")
            .at(Cell::new(3, 2))
            .with_rule_id(RuleId::Field(4))
            .with_level(Level::Warn)
            .with_suggestion("red");

        write_messages(&path, &[message]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "table\tcell\trule ID\trule\tlevel\tmessage\tsuggestion");
        assert_eq!(
            lines[1],
            "colors\tB3\tfield:4\t\tWARN\t\"'purple' must be in: \"\"red\"\"\"\tred"
        );
    }

    #[test]
    fn distinct_rows_are_copied() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::from_records(
            "colors",
            &["id", "color"],
            &[&["1", "red"], &["2", "x"], &["3", "y"], &["4", "x"]],
        )
        .with_path("colors.csv");
        let tables = TableSet::from_tables(2, [table]).unwrap();
        let messages = vec![
            Message::new("colors", "bad").at(Cell::new(3, 2)),
            Message::new("colors", "worse").at(Cell::new(4, 2)),
            Message::new("colors", "bad").at(Cell::new(5, 2)),
        ];

        let relocated = write_distinct(dir.path(), &tables, "colors", &messages).unwrap();
        let written = std::fs::read_to_string(dir.path().join("colors_distinct.csv")).unwrap();
        assert_eq!(written, "id,color\n2,x\n3,y\n");

        let cells: Vec<(String, String)> = relocated
            .iter()
            .map(|m| (m.table.clone(), m.cell.map(|c| c.to_string()).unwrap_or_default()))
            .collect();
        assert_eq!(
            cells,
            vec![
                ("colors_distinct".to_string(), "B2".to_string()),
                ("colors_distinct".to_string(), "B3".to_string()),
            ]
        );
    }

    #[test]
    fn no_messages_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let tables = TableSet::from_tables(2, [Table::from_records("t", &["a"], &[])]).unwrap();
        assert!(write_distinct(dir.path(), &tables, "t", &[]).unwrap().is_empty());
        assert!(!dir.path().join("t_distinct.tsv").exists());
    }
}

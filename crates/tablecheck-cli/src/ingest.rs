//! CSV/TSV table provider

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tablecheck_core::{Table, TableSet};
use walkdir::WalkDir;

/// Extensions picked up when a directory is given
const TABLE_EXTENSIONS: [&str; 2] = ["tsv", "csv"];

fn has_table_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TABLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Expand inputs into table files: files are taken as given, directories
/// contribute their `*.tsv` and `*.csv` entries sorted by name
pub fn table_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
                let entry =
                    entry.with_context(|| format!("read directory: {}", input.display()))?;
                if entry.file_type().is_file() && has_table_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            paths.extend(found);
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", input.display());
        }
    }
    Ok(paths)
}

/// Read one table. The name is the file stem; `.csv` is comma-separated and
/// anything else tab-separated. Records before `row_start` are skipped.
pub fn read_table(path: &Path, row_start: usize) -> Result<Table> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("table name from path: {}", path.display()))?
        .to_string();

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(crate::output::delimiter_for(path))
        .from_path(path)
        .with_context(|| format!("read table: {}", path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("read headers: {}", path.display()))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').to_string())
        .collect();

    let mut table = Table::new(name, columns).with_path(path);
    let skip = row_start.saturating_sub(2);
    for record in reader.records().skip(skip) {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    tracing::debug!(table = table.name(), rows = table.len(), "Loaded table");
    Ok(table)
}

/// Load every table under `inputs`, in path order
pub fn load_tables(inputs: &[PathBuf], row_start: usize) -> Result<TableSet> {
    let mut tables = TableSet::new(row_start);
    for path in table_paths(inputs)? {
        let table = read_table(&path, row_start)?;
        tables
            .insert(table)
            .with_context(|| format!("load table: {}", path.display()))?;
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn csv_and_tsv_delimiters() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("colors.csv");
        let tsv = dir.path().join("shapes.tsv");
        fs::write(&csv, "id,color\n1,\"red, dark\"\n").unwrap();
        fs::write(&tsv, "id\tshape\n1\tsquare\n").unwrap();

        let colors = read_table(&csv, 2).unwrap();
        assert_eq!(colors.name(), "colors");
        assert_eq!(colors.get(0, "color"), Some("red, dark"));

        let shapes = read_table(&tsv, 2).unwrap();
        assert_eq!(shapes.get(0, "shape"), Some("square"));
    }

    #[test]
    fn short_records_are_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terms.tsv");
        fs::write(&path, "id\tlabel\tparent\na\n").unwrap();

        let table = read_table(&path, 2).unwrap();
        assert_eq!(table.get(0, "parent"), Some(""));
    }

    #[test]
    fn leading_records_skipped_for_later_row_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terms.tsv");
        fs::write(&path, "id\nskip\nkeep\n").unwrap();

        let table = read_table(&path, 3).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "id"), Some("keep"));
    }

    #[test]
    fn directories_are_expanded_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.tsv"), "x\n").unwrap();
        fs::write(dir.path().join("a.csv"), "x\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.tsv"), "x\n").unwrap();

        let names: Vec<String> = table_paths(&[dir.path().to_path_buf()])
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.tsv"]);
    }

    #[test]
    fn duplicate_stems_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("terms.csv"), "x\n").unwrap();
        fs::write(dir.path().join("terms.tsv"), "x\n").unwrap();

        let err = load_tables(&[dir.path().to_path_buf()], 2).unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate table name 'terms'"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(table_paths(&[dir.path().join("nope.tsv")]).is_err());
    }
}

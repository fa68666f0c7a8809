//! File-system side of the `tablecheck` binary
//!
//! Reads CSV/TSV files into a [`tablecheck_core::TableSet`] and writes
//! message tables and `<table>_distinct` tables back out.

pub mod ingest;
pub mod output;

pub use ingest::{load_tables, read_table, table_paths};
pub use output::{delimiter_for, write_distinct, write_messages, MESSAGE_COLUMNS};

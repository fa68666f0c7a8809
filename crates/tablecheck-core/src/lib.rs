//! tablecheck core
//!
//! Core domain model shared by the parser, the engine and the CLI.
//! Message fields and rule ID formats are part of the output contract.

pub mod condition;
pub mod config;
pub mod distinct;
pub mod message;
pub mod parse;
pub mod report;
pub mod table;

pub use condition::Condition;
pub use config::{Config, SettingsError};
pub use distinct::{collect_distinct, distinct_by_text, DistinctTable};
pub use message::{has_errors, Cell, Level, Message, RuleId};
pub use parse::{ConditionParser, ParseError};
pub use report::{Report, ReportSummary, ReportVersion};
pub use table::{is_meta_table, Row, Table, TableError, TableSet, META_TABLES};

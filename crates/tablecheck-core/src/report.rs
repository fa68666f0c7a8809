//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use crate::message::{Level, Message};
use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of messages
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,

    /// Number of data tables validated
    pub tables_checked: usize,
}

/// Validation report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All messages, in table then row order
    pub messages: Vec<Message>,
}

impl Report {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            messages: Vec::new(),
        }
    }

    /// Create a report from messages
    pub fn from_messages(messages: Vec<Message>, tables_checked: usize) -> Self {
        let mut report = Self::new();
        report.summary.tables_checked = tables_checked;
        for message in messages {
            report.add_message(message);
        }
        report
    }

    /// Add a message to the report
    pub fn add_message(&mut self, message: Message) {
        match message.level {
            Level::Error => self.summary.errors += 1,
            Level::Warn => self.summary.warnings += 1,
            Level::Info => self.summary.info += 1,
        }

        self.summary.total += 1;
        self.messages.push(message);
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Whether any message is at or above `level`
    pub fn fails_at(&self, level: Level) -> bool {
        self.messages.iter().any(|m| m.is_at_least(level))
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report() {
        let report = Report::new();
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(!report.has_errors());
    }

    #[test]
    fn report_with_messages() {
        let messages = vec![
            Message::new("colors", "'purple' must be in: \"red\""),
            Message::new("colors", "looks odd").with_level(Level::Info),
        ];

        let report = Report::from_messages(messages, 1);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.info, 1);
        assert_eq!(report.summary.tables_checked, 1);
        assert!(report.has_errors());
        assert!(report.fails_at(Level::Info));
    }

    #[test]
    fn warnings_do_not_fail_at_error() {
        let report = Report::from_messages(
            vec![Message::new("t", "w").with_level(Level::Warn)],
            1,
        );
        assert!(!report.fails_at(Level::Error));
        assert!(report.fails_at(Level::Warn));
    }

    #[test]
    fn report_serialization() {
        let report = Report::new();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"messages\""));
    }
}

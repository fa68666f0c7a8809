//! Validation messages
//!
//! A message is a located finding: which table, which cell, which field or
//! rule declaration produced it, and how severe it is.

use serde::{Deserialize, Serialize};

/// Message severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - blocking issue that fails validation
    Error,
}

impl Level {
    /// Stable upper-case name, as written in the `level` columns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Error
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "WARN" => Ok(Self::Warn),
            "INFO" => Ok(Self::Info),
            _ => Err(format!("unknown level '{}'", s)),
        }
    }
}

/// A spreadsheet cell, both coordinates 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Column letters: 1 -> A, 26 -> Z, 27 -> AA
    pub fn column_label(&self) -> String {
        let mut label = Vec::new();
        let mut div = self.column;
        while div > 0 {
            let rem = (div - 1) % 26;
            label.push(b'A' + rem as u8);
            div = (div - 1) / 26;
        }
        label.reverse();
        String::from_utf8(label).unwrap_or_default()
    }

    /// Parse `B5` style coordinates
    pub fn parse_a1(text: &str) -> Option<Self> {
        let split = text.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = text.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }
        let column = letters.bytes().try_fold(0usize, |acc, b| {
            acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)
        })?;
        let row = digits.parse().ok()?;
        Some(Self { row, column })
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.column_label(), self.row)
    }
}

impl Serialize for Cell {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Cell::parse_a1(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid cell '{}'", text)))
    }
}

/// Which configuration row produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// Row of the `field` table (sheet row number)
    Field(usize),

    /// Row of the `rule` table (sheet row number)
    Rule(usize),
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(row) => write!(f, "field:{}", row),
            Self::Rule(row) => write!(f, "rule:{}", row),
        }
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let parsed = match text.split_once(':') {
            Some(("field", row)) => row.parse().ok().map(Self::Field),
            Some(("rule", row)) => row.parse().ok().map(Self::Rule),
            _ => None,
        };
        parsed.ok_or_else(|| serde::de::Error::custom(format!("invalid rule ID '{}'", text)))
    }
}

/// A located validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Table the finding is in
    pub table: String,

    /// Offending cell; `None` for table-level structure problems
    pub cell: Option<Cell>,

    /// Field or rule declaration that produced the finding
    #[serde(rename = "rule ID")]
    pub rule_id: Option<RuleId>,

    /// Declared description of the rule
    pub rule: Option<String>,

    /// Severity
    pub level: Level,

    /// Human-readable text
    pub message: String,

    /// Suggested replacement value
    pub suggestion: Option<String>,
}

impl Message {
    /// Create an ERROR message with no location
    pub fn new(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            cell: None,
            rule_id: None,
            rule: None,
            level: Level::Error,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Set the cell
    pub fn at(mut self, cell: Cell) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Set the level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the producing declaration
    pub fn with_rule_id(mut self, rule_id: RuleId) -> Self {
        self.rule_id = Some(rule_id);
        self
    }

    /// Set the declared rule description
    pub fn with_rule(mut self, rule: Option<String>) -> Self {
        self.rule = rule;
        self
    }

    /// Set a suggested replacement
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Whether the message is at or above `level`
    pub fn is_at_least(&self, level: Level) -> bool {
        self.level >= level
    }
}

/// True when any message is an ERROR
pub fn has_errors(messages: &[Message]) -> bool {
    messages.iter().any(|m| m.level == Level::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_labels() {
        assert_eq!(Cell::new(5, 2).to_string(), "B5");
        assert_eq!(Cell::new(1, 26).to_string(), "Z1");
        assert_eq!(Cell::new(3, 27).to_string(), "AA3");
        assert_eq!(Cell::new(9, 703).to_string(), "AAA9");
    }

    #[test]
    fn cell_parse_inverts_display() {
        assert_eq!(Cell::parse_a1("AA3"), Some(Cell::new(3, 27)));
        assert_eq!(Cell::parse_a1("3"), None);
        assert_eq!(Cell::parse_a1("b2"), None);
    }

    #[test]
    fn overlong_column_label_is_rejected() {
        let label = format!("{}2", "Z".repeat(20));
        assert_eq!(Cell::parse_a1(&label), None);

        let json = format!("\"{}\"", label);
        assert!(serde_json::from_str::<Cell>(&json).is_err());
    }

    #[test]
    fn level_parsing_ignores_case() {
        assert_eq!("warn".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("INFO".parse::<Level>(), Ok(Level::Info));
        assert!("fatal".parse::<Level>().is_err());
        assert!(Level::Error > Level::Warn);
    }

    #[test]
    fn message_serialization() {
        let msg = Message::new("colors", "'purple' must be in: \"red\"")
            .at(Cell::new(2, 1))
            .with_rule_id(RuleId::Field(4));

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"cell\":\"A2\""));
        assert!(json.contains("\"rule ID\":\"field:4\""));
        assert!(json.contains("\"level\":\"ERROR\""));

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn error_detection() {
        let warn = Message::new("t", "w").with_level(Level::Warn);
        assert!(!has_errors(&[warn.clone()]));
        assert!(has_errors(&[warn, Message::new("t", "e")]));
    }
}

//! Parsed condition model
//!
//! A condition is the typed form of a cell in the `field` or `rule` tables
//! (and of the `match`/`replace` cells of the `datatype` table). It is pure
//! data: evaluation lives in `tablecheck-engine`.

use serde::{Deserialize, Serialize};

/// A parsed condition expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// A bare word: names a datatype when used as an expression, or stands
    /// for a plain string where a function expects one
    DatatypeRef(String),

    /// A double-quoted string literal
    Literal(String),

    /// A function call such as `any(blank, label)`
    Call { name: String, args: Vec<Condition> },

    /// A `table.column` reference
    FieldRef { table: String, column: String },

    /// A `key=value` argument
    NamedArg { key: String, value: Box<Condition> },

    /// `/pattern/flags` or `s/pattern/replacement/flags`
    Regex {
        pattern: String,
        flags: String,
        replacement: Option<String>,
    },
}

impl Condition {
    /// Shorthand for a call condition
    pub fn call(name: impl Into<String>, args: Vec<Condition>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// Shorthand for a datatype reference
    pub fn datatype(name: impl Into<String>) -> Self {
        Self::DatatypeRef(name.into())
    }

    /// Shorthand for a quoted literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Shorthand for a `table.column` reference
    pub fn field(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::FieldRef {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Shorthand for a `key=value` argument
    pub fn named(key: impl Into<String>, value: Condition) -> Self {
        Self::NamedArg {
            key: key.into(),
            value: Box::new(value),
        }
    }

    /// The string payload of a bare word or literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::DatatypeRef(value) | Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Name of the outermost call, if this is one
    pub fn call_name(&self) -> Option<&str> {
        match self {
            Self::Call { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether a call to `name` appears anywhere in this condition
    pub fn contains_call(&self, name: &str) -> bool {
        match self {
            Self::Call { name: n, args } => n == name || args.iter().any(|a| a.contains_call(name)),
            Self::NamedArg { value, .. } => value.contains_call(name),
            _ => false,
        }
    }

    /// Every `table.column` reference in this condition, depth first
    pub fn field_refs(&self) -> Vec<(&str, &str)> {
        let mut refs = Vec::new();
        self.collect_field_refs(&mut refs);
        refs
    }

    fn collect_field_refs<'a>(&'a self, refs: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Self::FieldRef { table, column } => refs.push((table, column)),
            Self::Call { args, .. } => {
                for arg in args {
                    arg.collect_field_refs(refs);
                }
            }
            Self::NamedArg { value, .. } => value.collect_field_refs(refs),
            _ => {}
        }
    }
}

fn quote_if_spaced(value: &str) -> String {
    if value.contains(' ') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatatypeRef(name) => write!(f, "{}", quote_if_spaced(name)),
            Self::Literal(value) => write!(f, "\"{}\"", value.replace('"', "\\\"")),
            Self::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Self::FieldRef { table, column } => {
                write!(f, "{}.{}", quote_if_spaced(table), quote_if_spaced(column))
            }
            Self::NamedArg { key, value } => write!(f, "{}={}", key, value),
            Self::Regex {
                pattern,
                flags,
                replacement: Some(replacement),
            } => write!(f, "s/{}/{}/{}", pattern, replacement, flags),
            Self::Regex { pattern, flags, .. } => write!(f, "/{}/{}", pattern, flags),
        }
    }
}

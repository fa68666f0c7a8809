//! Datatype registry
//!
//! Datatypes form single-inheritance chains through their `parent`. A value
//! is checked against the named datatype first and then each ancestor,
//! nearest first; the first pattern that does not match decides the result.

use crate::error::ConfigError;
use crate::pattern::{compile_match, Substitution};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tablecheck_core::Level;

/// Builtin datatypes: name, pattern, description
const BUILTINS: [(&str, &str, &str); 4] = [
    ("blank", r"^$", "an empty string"),
    (
        "datatype_label",
        r"^[A-Za-z][A-Za-z0-9_-]+$",
        "a word that starts with a letter and may contain dashes and underscores",
    ),
    ("regex", r"^/.+/[a-z]*$", "a regex match"),
    ("regex_sub", r"^s/.+/.*/[a-z]*$", "a regex substitution"),
];

/// A single datatype record
#[derive(Debug, Clone)]
pub struct Datatype {
    pub name: String,
    pub parent: Option<String>,
    pub pattern: Option<Regex>,
    pub level: Level,
    pub description: Option<String>,
    pub replacement: Option<Substitution>,
}

impl Datatype {
    /// A datatype with no parent, pattern or description
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            pattern: None,
            level: Level::Error,
            description: None,
            replacement: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_replacement(mut self, replacement: Substitution) -> Self {
        self.replacement = Some(replacement);
        self
    }

    /// Text reported when a value fails this datatype
    pub fn failure_text(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }

    fn accepts(&self, value: &str) -> bool {
        self.pattern.as_ref().map_or(true, |re| re.is_match(value))
    }
}

/// A failed datatype check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Datatype whose pattern rejected the value
    pub datatype: String,
    pub level: Level,
    pub message: String,
    pub suggestion: Option<String>,
}

/// All known datatypes, builtins included
#[derive(Debug, Clone)]
pub struct Datatypes {
    types: HashMap<String, Datatype>,
    order: Vec<String>,
}

impl Default for Datatypes {
    fn default() -> Self {
        Self::new()
    }
}

impl Datatypes {
    /// A registry holding only the builtin datatypes
    pub fn new() -> Self {
        let mut datatypes = Self {
            types: HashMap::new(),
            order: Vec::new(),
        };
        for (name, pattern, description) in BUILTINS {
            let mut datatype = Datatype::new(name).with_description(description);
            datatype.pattern = compile_match(pattern, "").ok();
            datatypes.order.push(name.to_string());
            datatypes.types.insert(name.to_string(), datatype);
        }
        datatypes
    }

    /// Whether `name` is one of the builtin datatypes
    pub fn is_builtin(name: &str) -> bool {
        BUILTINS.iter().any(|(builtin, _, _)| *builtin == name)
    }

    /// Register a datatype; its parent must already be registered
    pub fn insert(&mut self, datatype: Datatype) -> Result<(), ConfigError> {
        if Self::is_builtin(&datatype.name) {
            return Err(ConfigError::ReservedDatatype(datatype.name));
        }
        if self.types.contains_key(&datatype.name) {
            return Err(ConfigError::DuplicateDatatype(datatype.name));
        }
        if let Some(parent) = &datatype.parent {
            if !self.types.contains_key(parent) {
                return Err(ConfigError::UndeclaredParent {
                    datatype: datatype.name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        self.order.push(datatype.name.clone());
        self.types.insert(datatype.name.clone(), datatype);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Datatype> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Datatype names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Ancestors of `name`, nearest parent first, excluding `name` itself
    pub fn ancestors(&self, name: &str) -> Result<Vec<&Datatype>, ConfigError> {
        let start = self
            .types
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDatatype(name.to_string()))?;

        let mut visited = HashSet::new();
        visited.insert(start.name.as_str());

        let mut ancestors = Vec::new();
        let mut current = start;
        while let Some(parent) = &current.parent {
            if !visited.insert(parent.as_str()) {
                return Err(ConfigError::DatatypeCycle(name.to_string()));
            }
            let next = self
                .types
                .get(parent)
                .ok_or_else(|| ConfigError::UnknownDatatype(parent.clone()))?;
            ancestors.push(next);
            current = next;
        }
        Ok(ancestors)
    }

    /// Check `value` against `name` and its ancestors
    pub fn validate(&self, name: &str, value: &str) -> Result<Option<Violation>, ConfigError> {
        let start = self
            .types
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDatatype(name.to_string()))?;

        let chain = std::iter::once(start).chain(self.ancestors(name)?);
        for datatype in chain {
            if datatype.accepts(value) {
                continue;
            }
            return Ok(Some(Violation {
                datatype: datatype.name.clone(),
                level: datatype.level,
                message: datatype.failure_text().to_string(),
                suggestion: datatype.replacement.as_ref().map(|sub| sub.apply(value)),
            }));
        }
        Ok(None)
    }
}

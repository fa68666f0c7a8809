//! Configuration registry
//!
//! Assembles datatypes, field conditions, trees and rules from the
//! `datatype`, `field` and `rule` tables. Every configuration table is
//! first checked against its own content conditions; any problem found
//! while building is collected and returned as [`ConfigError::Invalid`],
//! so data tables are only ever evaluated against a sound configuration.

use crate::datatype::{Datatype, Datatypes};
use crate::error::ConfigError;
use crate::functions::FunctionLibrary;
use crate::index::ColumnIndex;
use crate::meta;
use crate::pattern::{compile_match, substitution_key, Substitution};
use crate::shape::CheckContext;
use crate::tree::{build_tree, Tree, TreeSpec};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use tablecheck_core::{Cell, Condition, ConditionParser, Level, Message, TableSet, META_TABLES};

/// Table name that applies a field condition to every table
pub const ANY_TABLE: &str = "*";

/// A condition bound to a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub table: String,
    pub column: String,
    pub condition: Condition,

    /// Sheet row of the declaring `field` row
    pub row: usize,
}

/// A when/then rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub table: String,
    pub when_column: String,
    pub when_condition: Condition,
    pub then_column: String,
    pub then_condition: Condition,
    pub level: Level,
    pub description: Option<String>,

    /// Sheet row of the declaring `rule` row
    pub row: usize,
}

/// Everything needed to validate data tables; read-only once built
#[derive(Debug)]
pub struct Registry {
    tables: TableSet,
    functions: FunctionLibrary,
    datatypes: Datatypes,
    fields: HashMap<String, HashMap<String, FieldRule>>,
    rules: HashMap<String, Vec<Rule>>,
    trees: HashMap<String, Tree>,
    tree_messages: Vec<Message>,
    index: ColumnIndex,
    substitutions: HashMap<String, Substitution>,
}

impl Registry {
    /// Build the registry from the configuration tables in `tables`
    pub fn build(
        tables: TableSet,
        functions: FunctionLibrary,
        parser: &dyn ConditionParser,
    ) -> Result<Self, ConfigError> {
        for required in ["datatype", "field"] {
            if !tables.contains(required) {
                return Err(ConfigError::MissingTable(required.to_string()));
            }
        }

        let mut registry = Self {
            tables,
            functions,
            datatypes: Datatypes::new(),
            fields: HashMap::new(),
            rules: HashMap::new(),
            trees: HashMap::new(),
            tree_messages: Vec::new(),
            index: ColumnIndex::default(),
            substitutions: HashMap::new(),
        };

        let structure: Vec<Message> = META_TABLES
            .iter()
            .filter_map(|name| registry.tables.get(name))
            .flat_map(meta::missing_columns)
            .collect();
        if !structure.is_empty() {
            tracing::warn!(problems = structure.len(), "Configuration tables are malformed");
            return Err(ConfigError::Invalid(structure));
        }

        let mut messages = registry.configure_datatypes(parser);
        messages.extend(registry.configure_fields(parser));
        if registry.tables.contains("rule") {
            messages.extend(registry.configure_rules(parser));
        }
        if !messages.is_empty() {
            tracing::warn!(problems = messages.len(), "Configuration has errors");
            return Err(ConfigError::Invalid(messages));
        }

        registry.prepare();
        tracing::info!(
            datatypes = registry.datatypes.len(),
            fields = registry.fields.values().map(HashMap::len).sum::<usize>(),
            rules = registry.rules.values().map(Vec::len).sum::<usize>(),
            trees = registry.trees.len(),
            "Configuration loaded"
        );
        Ok(registry)
    }

    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    pub fn datatypes(&self) -> &Datatypes {
        &self.datatypes
    }

    pub fn functions(&self) -> &FunctionLibrary {
        &self.functions
    }

    /// A tree by its `table.column` name
    pub fn tree(&self, name: &str) -> Option<&Tree> {
        self.trees.get(name)
    }

    pub fn trees(&self) -> &HashMap<String, Tree> {
        &self.trees
    }

    /// Field condition for a column: the table's own, else the `*` one
    pub fn field_for(&self, table: &str, column: &str) -> Option<&FieldRule> {
        self.fields
            .get(table)
            .and_then(|columns| columns.get(column))
            .or_else(|| {
                self.fields
                    .get(ANY_TABLE)
                    .and_then(|columns| columns.get(column))
            })
    }

    /// Rules declared for a table, in declaration order
    pub fn rules_for(&self, table: &str) -> &[Rule] {
        self.rules.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rules whose when column is `column`
    pub fn rules_when<'a>(&'a self, table: &str, column: &'a str) -> impl Iterator<Item = &'a Rule> {
        self.rules_for(table)
            .iter()
            .filter(move |rule| rule.when_column == column)
    }

    /// Problems found while building trees over `table`
    pub fn tree_messages<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Message> {
        self.tree_messages.iter().filter(move |m| m.table == table)
    }

    /// A message located at `column` of a 0-based `row`
    pub fn error(&self, table: &str, column: &str, row: usize, text: impl Into<String>) -> Message {
        let message = Message::new(table, text);
        match self.tables.cell(table, column, row) {
            Some(cell) => message.at(cell),
            None => message,
        }
    }

    /// Validate a value against a condition; an empty result means it passes
    pub fn validate_condition(
        &self,
        condition: &Condition,
        table: &str,
        column: &str,
        row: usize,
        value: &str,
    ) -> Vec<Message> {
        match condition {
            Condition::Call { name, args } => match self.functions.get(name) {
                Some(function) => function.validate(self, args, table, column, row, value),
                None => vec![self.error(
                    table,
                    column,
                    row,
                    format!("unrecognized function '{}'", name),
                )],
            },
            // A quoted datatype name is the same condition as the bare word.
            Condition::DatatypeRef(name) | Condition::Literal(name) => {
                self.validate_datatype(name, table, column, row, value)
            }
            other => vec![self.error(table, column, row, format!("invalid condition '{}'", other))],
        }
    }

    fn validate_datatype(
        &self,
        name: &str,
        table: &str,
        column: &str,
        row: usize,
        value: &str,
    ) -> Vec<Message> {
        match self.datatypes.validate(name, value) {
            Ok(None) => Vec::new(),
            Ok(Some(violation)) => {
                let mut message = self
                    .error(table, column, row, violation.message)
                    .with_level(violation.level);
                if let Some(suggestion) = violation.suggestion {
                    message = message.with_suggestion(suggestion);
                }
                vec![message]
            }
            Err(err) => vec![self.error(table, column, row, err.to_string())],
        }
    }

    /// 0-based rows of `table.column` holding `value`, ascending
    pub fn rows_with_value(&self, table: &str, column: &str, value: &str) -> Cow<'_, [usize]> {
        if let Some(rows) = self.index.rows(table, column, value) {
            return Cow::Borrowed(rows);
        }
        let rows = self
            .tables
            .get(table)
            .and_then(|t| t.column_values(column))
            .map(|values| {
                values
                    .enumerate()
                    .filter(|(_, v)| *v == value)
                    .map(|(row, _)| row)
                    .collect()
            })
            .unwrap_or_default();
        Cow::Owned(rows)
    }

    /// A compiled substitution, cached when it appears in the configuration
    pub fn substitution(
        &self,
        pattern: &str,
        replacement: &str,
        flags: &str,
    ) -> Result<Cow<'_, Substitution>, String> {
        match self
            .substitutions
            .get(&substitution_key(pattern, replacement, flags))
        {
            Some(cached) => Ok(Cow::Borrowed(cached)),
            None => Substitution::compile(pattern, replacement, flags).map(Cow::Owned),
        }
    }

    fn check_context(&self) -> CheckContext<'_> {
        CheckContext {
            tables: &self.tables,
            datatypes: &self.datatypes,
            trees: &self.trees,
        }
    }

    /// Check a parsed condition before it is stored
    pub fn check_condition(&self, table: &str, column: &str, condition: &Condition) -> Result<(), String> {
        match condition {
            Condition::Call { name, args } => {
                let Some(function) = self.functions.get(name) else {
                    return Err(format!("unrecognized function '{}'", name));
                };
                for arg in args {
                    match arg {
                        Condition::Call { .. } => self.check_condition(table, column, arg)?,
                        Condition::FieldRef { table: t, column: c } => {
                            if !self.tables.contains(t) {
                                return Err(format!("unrecognized table '{}'", t));
                            }
                            if !self.tables.has_column(t, c) {
                                return Err(format!("unrecognized column '{}' in table '{}'", c, t));
                            }
                        }
                        _ => {}
                    }
                }
                function.check(&self.check_context(), table, column, args)
            }
            Condition::DatatypeRef(name) | Condition::Literal(name) => {
                if self.datatypes.contains(name) {
                    Ok(())
                } else {
                    Err(format!("unrecognized datatype '{}'", name))
                }
            }
            other => Err(format!("invalid condition '{}'", other)),
        }
    }

    /// Run a configuration table's content conditions, row by row
    fn check_contents(&self, table: &str) -> Vec<Message> {
        let Some(meta_table) = self.tables.get(table) else {
            return Vec::new();
        };
        let conditions: Vec<_> = meta::content_conditions(table)
            .into_iter()
            .filter(|(column, _)| meta_table.has_column(column))
            .collect();

        let mut messages = Vec::new();
        for (idx, row) in meta_table.rows().enumerate() {
            for (column, condition) in &conditions {
                messages.extend(self.validate_condition(condition, table, column, idx, row.get(column)));
            }
        }
        messages
    }

    /// Copy a configuration table's rows out so `self` can be mutated while
    /// walking them
    fn owned_rows(&self, table: &str, columns: &[&str]) -> Vec<Vec<String>> {
        self.tables
            .get(table)
            .map(|t| {
                t.rows()
                    .map(|row| columns.iter().map(|c| row.get(c).to_string()).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn configure_datatypes(&mut self, parser: &dyn ConditionParser) -> Vec<Message> {
        let mut messages = self.check_contents("datatype");
        let flagged = flagged_cells(&messages);
        let is_flagged = |column: &str, idx: usize| {
            self.tables
                .cell("datatype", column, idx)
                .is_some_and(|cell| flagged.contains(&cell))
        };

        let columns = ["datatype", "parent", "match", "level", "description", "replace"];
        let mut pending = Vec::new();
        for (idx, row) in self.owned_rows("datatype", &columns).into_iter().enumerate() {
            let [name, parent, matcher, level, description, replace] = &row[..] else {
                continue;
            };
            if name.is_empty() || is_flagged("datatype", idx) {
                continue;
            }

            let mut datatype = Datatype::new(name.as_str());
            if !parent.is_empty() && !is_flagged("parent", idx) {
                datatype = datatype.with_parent(parent.as_str());
            }
            if !matcher.is_empty() && !is_flagged("match", idx) {
                match self.parse_regex(parser, matcher, false) {
                    Ok((pattern, flags, _)) => match compile_match(&pattern, &flags) {
                        Ok(re) => datatype = datatype.with_pattern(re),
                        Err(err) => messages.push(self.error("datatype", "match", idx, err)),
                    },
                    Err(err) => messages.push(self.error("datatype", "match", idx, err)),
                }
            }
            if let Ok(level) = level.parse::<Level>() {
                datatype = datatype.with_level(level);
            }
            if !description.is_empty() {
                datatype = datatype.with_description(description.as_str());
            }
            if !replace.is_empty() && !is_flagged("replace", idx) {
                match self.parse_regex(parser, replace, true) {
                    Ok((pattern, flags, replacement)) => {
                        match Substitution::compile(&pattern, &replacement, &flags) {
                            Ok(sub) => datatype = datatype.with_replacement(sub),
                            Err(err) => messages.push(self.error("datatype", "replace", idx, err)),
                        }
                    }
                    Err(err) => messages.push(self.error("datatype", "replace", idx, err)),
                }
            }
            pending.push((idx, datatype));
        }

        for (idx, datatype) in pending {
            if let Err(err) = self.datatypes.insert(datatype) {
                let column = match err {
                    ConfigError::UndeclaredParent { .. } => "parent",
                    _ => "datatype",
                };
                messages.push(self.error("datatype", column, idx, err.to_string()));
            }
        }
        tracing::debug!(datatypes = self.datatypes.len(), "Configured datatypes");
        messages
    }

    /// Parse a `match` or `replace` cell into pattern, flags and replacement
    fn parse_regex(
        &self,
        parser: &dyn ConditionParser,
        raw: &str,
        substitution: bool,
    ) -> Result<(String, String, String), String> {
        match parser.parse(raw).map_err(|e| e.to_string())? {
            Condition::Regex {
                pattern,
                flags,
                replacement: None,
            } if !substitution => Ok((pattern, flags, String::new())),
            Condition::Regex {
                pattern,
                flags,
                replacement: Some(replacement),
            } if substitution => Ok((pattern, flags, replacement)),
            _ if substitution => Err(format!("'{}' must be a regex substitution", raw)),
            _ => Err(format!("'{}' must be a regex match", raw)),
        }
    }

    fn configure_fields(&mut self, parser: &dyn ConditionParser) -> Vec<Message> {
        let mut messages = self.check_contents("field");
        let flagged = flagged_cells(&messages);

        let columns = ["table", "column", "condition"];
        for (idx, row) in self.owned_rows("field", &columns).into_iter().enumerate() {
            let [table, column, raw] = &row[..] else {
                continue;
            };
            let skip = columns.iter().any(|c| {
                self.tables
                    .cell("field", c, idx)
                    .is_some_and(|cell| flagged.contains(&cell))
            });
            if skip {
                continue;
            }

            if table != ANY_TABLE {
                if !self.tables.contains(table) {
                    let text = format!("unrecognized table '{}'", table);
                    messages.push(self.error("field", "table", idx, text));
                    continue;
                }
                if !self.tables.has_column(table, column) {
                    let text = format!("unrecognized column '{}' for table '{}'", column, table);
                    messages.push(self.error("field", "column", idx, text));
                    continue;
                }
            }

            let declared = self
                .fields
                .get(table.as_str())
                .is_some_and(|columns| columns.contains_key(column.as_str()))
                || self.trees.contains_key(&format!("{}.{}", table, column));
            if declared {
                let text = format!("Multiple condition defined for {}.{}", table, column);
                messages.push(self.error("field", "column", idx, text));
                continue;
            }

            let condition = match parser.parse(raw) {
                Ok(condition) => condition,
                Err(err) => {
                    messages.push(self.error("field", "condition", idx, err.to_string()));
                    continue;
                }
            };

            let field_row = self.tables.sheet_row(idx);
            if let Condition::Call { name, args } = &condition {
                if name == "tree" {
                    match self.configure_tree(table, column, args, field_row) {
                        Ok(()) => {}
                        Err(err) => messages.push(self.error("field", "condition", idx, err)),
                    }
                    continue;
                }
            }

            let placement = if condition.contains_call("tree") {
                Err("the `tree` function must be the outermost call of a field condition".to_string())
            } else if condition.contains_call("lookup") {
                Err("the `lookup` function is only allowed as a rule's then condition".to_string())
            } else {
                self.check_condition(table, column, &condition)
            };
            if let Err(err) = placement {
                messages.push(self.error("field", "condition", idx, err));
                continue;
            }

            self.fields.entry(table.clone()).or_default().insert(
                column.clone(),
                FieldRule {
                    table: table.clone(),
                    column: column.clone(),
                    condition,
                    row: field_row,
                },
            );
        }
        tracing::debug!(trees = self.trees.len(), "Configured fields");
        messages
    }

    /// Check a `tree()` declaration, build the tree and register it
    fn configure_tree(
        &mut self,
        table: &str,
        column: &str,
        args: &[Condition],
        field_row: usize,
    ) -> Result<(), String> {
        if table == ANY_TABLE {
            return Err("the `tree` function requires a named table".to_string());
        }
        let function = self
            .functions
            .get("tree")
            .ok_or_else(|| "unrecognized function 'tree'".to_string())?;
        function.check(&self.check_context(), table, column, args)?;

        let child_column = args.first().and_then(Condition::as_str).unwrap_or_default();
        let mut extend = None;
        let mut split = None;
        for arg in args.iter().skip(1) {
            match arg {
                Condition::FieldRef { table: t, column: c } => extend = Some(format!("{}.{}", t, c)),
                Condition::NamedArg { key, value } if key == "split" => split = value.as_str(),
                _ => {}
            }
        }

        let (tree, problems) = {
            let spec = TreeSpec {
                table,
                parent_column: column,
                child_column,
                extend: extend
                    .as_deref()
                    .and_then(|name| self.trees.get(name).map(|tree| (name, tree))),
                split,
                field_row,
            };
            build_tree(&self.tables, &spec)
        };
        self.tree_messages.extend(problems);
        self.trees.insert(format!("{}.{}", table, column), tree);
        Ok(())
    }

    fn configure_rules(&mut self, parser: &dyn ConditionParser) -> Vec<Message> {
        let mut messages = self.check_contents("rule");
        let flagged = flagged_cells(&messages);

        let columns = [
            "table",
            "when column",
            "when condition",
            "then column",
            "then condition",
            "level",
            "description",
        ];
        for (idx, row) in self.owned_rows("rule", &columns).into_iter().enumerate() {
            let [table, when_column, when_raw, then_column, then_raw, level, description] = &row[..]
            else {
                continue;
            };
            let skip = meta::RULE_COLUMNS.iter().any(|c| {
                self.tables
                    .cell("rule", c, idx)
                    .is_some_and(|cell| flagged.contains(&cell))
            });
            if skip {
                continue;
            }

            if !self.tables.contains(table) {
                let text = format!("unrecognized table '{}'", table);
                messages.push(self.error("rule", "table", idx, text));
                continue;
            }
            let mut columns_ok = true;
            for (meta_column, column) in [("when column", when_column), ("then column", then_column)] {
                if !self.tables.has_column(table, column) {
                    let text = format!("unrecognized column '{}' for table '{}'", column, table);
                    messages.push(self.error("rule", meta_column, idx, text));
                    columns_ok = false;
                }
            }
            if !columns_ok {
                continue;
            }

            let when_condition = self.parse_rule_condition(parser, table, when_column, when_raw, false);
            let then_condition = self.parse_rule_condition(parser, table, then_column, then_raw, true);
            let (when_condition, then_condition) = match (when_condition, then_condition) {
                (Ok(when), Ok(then)) => (when, then),
                (when, then) => {
                    if let Err(err) = when {
                        messages.push(self.error("rule", "when condition", idx, err));
                    }
                    if let Err(err) = then {
                        messages.push(self.error("rule", "then condition", idx, err));
                    }
                    continue;
                }
            };

            let rule = Rule {
                table: table.clone(),
                when_column: when_column.clone(),
                when_condition,
                then_column: then_column.clone(),
                then_condition,
                level: level.parse().unwrap_or_default(),
                description: Some(description.clone()).filter(|d| !d.is_empty()),
                row: self.tables.sheet_row(idx),
            };
            self.rules.entry(table.clone()).or_default().push(rule);
        }
        tracing::debug!(
            rules = self.rules.values().map(Vec::len).sum::<usize>(),
            "Configured rules"
        );
        messages
    }

    fn parse_rule_condition(
        &self,
        parser: &dyn ConditionParser,
        table: &str,
        column: &str,
        raw: &str,
        is_then: bool,
    ) -> Result<Condition, String> {
        let condition = parser.parse(raw).map_err(|e| e.to_string())?;
        if condition.contains_call("tree") {
            return Err("the `tree` function is only allowed in a field condition".to_string());
        }
        let lookup_misplaced = match &condition {
            Condition::Call { name, args } if name == "lookup" => {
                !is_then || args.iter().any(|a| a.contains_call("lookup"))
            }
            other => other.contains_call("lookup"),
        };
        if lookup_misplaced {
            return Err("the `lookup` function is only allowed as a rule's then condition".to_string());
        }
        self.check_condition(table, column, &condition)?;
        Ok(condition)
    }

    /// Index the columns queried during validation and cache substitutions
    fn prepare(&mut self) {
        let mut wanted: Vec<(String, String)> = Vec::new();
        let mut conditions: Vec<(&str, &str, &Condition)> = Vec::new();
        for field in self.fields.values().flat_map(HashMap::values) {
            conditions.push((&field.table, &field.column, &field.condition));
        }
        for rule in self.rules.values().flatten() {
            conditions.push((&rule.table, &rule.when_column, &rule.when_condition));
            conditions.push((&rule.table, &rule.then_column, &rule.then_condition));
            if let Condition::Call { name, args } = &rule.then_condition {
                if let (true, Some(t), Some(k)) = (
                    name == "lookup",
                    args.first().and_then(Condition::as_str),
                    args.get(1).and_then(Condition::as_str),
                ) {
                    wanted.push((t.to_string(), k.to_string()));
                }
            }
        }

        let mut substitutions = HashMap::new();
        for (table, column, condition) in &conditions {
            for (t, c) in condition.field_refs() {
                wanted.push((t.to_string(), c.to_string()));
            }
            if condition.contains_call("distinct") {
                if *table == ANY_TABLE {
                    for data in self.tables.data_tables().filter(|t| t.has_column(column)) {
                        wanted.push((data.name().to_string(), column.to_string()));
                    }
                } else {
                    wanted.push((table.to_string(), column.to_string()));
                }
            }
            collect_substitutions(condition, &mut substitutions);
        }

        self.index = ColumnIndex::build(
            &self.tables,
            wanted.iter().map(|(t, c)| (t.as_str(), c.as_str())),
        );
        self.substitutions = substitutions;
    }
}

fn collect_substitutions(condition: &Condition, cache: &mut HashMap<String, Substitution>) {
    match condition {
        Condition::Regex {
            pattern,
            flags,
            replacement: Some(replacement),
        } => {
            if let Ok(sub) = Substitution::compile(pattern, replacement, flags) {
                cache.insert(substitution_key(pattern, replacement, flags), sub);
            }
        }
        Condition::Call { args, .. } => {
            for arg in args {
                collect_substitutions(arg, cache);
            }
        }
        _ => {}
    }
}

fn flagged_cells(messages: &[Message]) -> HashSet<Cell> {
    messages.iter().filter_map(|m| m.cell).collect()
}

//! Rule evaluation over data tables

use crate::error::ConfigError;
use crate::functions::{lookup, FunctionLibrary};
use crate::registry::Registry;
use rayon::prelude::*;
use tablecheck_core::{Condition, ConditionParser, Message, RuleId, TableSet};

/// Messages produced for one data table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    pub table: String,
    pub messages: Vec<Message>,
}

/// Validate every row of one table: field conditions first, then rules keyed
/// on the column, row by row in column order. A `lookup` then condition is
/// keyed by the when value of the rule that fired.
pub fn validate_table(registry: &Registry, table: &str) -> Vec<Message> {
    let mut messages: Vec<Message> = registry.tree_messages(table).cloned().collect();
    let Some(data) = registry.tables().get(table) else {
        return messages;
    };

    for (idx, row) in data.rows().enumerate() {
        for (column, value) in row.iter() {
            if let Some(field) = registry.field_for(table, column) {
                let found = registry.validate_condition(&field.condition, table, column, idx, value);
                messages.extend(
                    found
                        .into_iter()
                        .map(|m| m.with_rule_id(RuleId::Field(field.row))),
                );
            }

            for rule in registry.rules_when(table, column) {
                if !registry
                    .validate_condition(&rule.when_condition, table, column, idx, value)
                    .is_empty()
                {
                    continue;
                }
                let then_value = row.get(&rule.then_column);
                let found = match &rule.then_condition {
                    Condition::Call { name, args } if name == "lookup" => {
                        lookup(registry, args, table, &rule.then_column, idx, value, then_value)
                    }
                    then => registry.validate_condition(then, table, &rule.then_column, idx, then_value),
                };
                messages.extend(found.into_iter().map(|mut m| {
                    m.message = format!(
                        "because '{}' is '{}', {}",
                        value, rule.when_condition, m.message
                    );
                    m.with_rule_id(RuleId::Rule(rule.row))
                        .with_rule(rule.description.clone())
                        .with_level(rule.level)
                }));
            }
        }
    }

    tracing::info!(table, problems = messages.len(), "Validated table");
    messages
}

/// Validate all data tables in parallel, in load order
pub fn validate_all(registry: &Registry) -> Vec<TableOutcome> {
    let names: Vec<&str> = registry.tables().data_tables().map(|t| t.name()).collect();
    names
        .par_iter()
        .map(|&table| TableOutcome {
            table: table.to_string(),
            messages: validate_table(registry, table),
        })
        .collect()
}

/// Build a registry from `tables` and validate every data table
pub fn validate(
    tables: TableSet,
    functions: FunctionLibrary,
    parser: &dyn ConditionParser,
) -> Result<Vec<TableOutcome>, ConfigError> {
    let registry = Registry::build(tables, functions, parser)?;
    Ok(validate_all(&registry))
}

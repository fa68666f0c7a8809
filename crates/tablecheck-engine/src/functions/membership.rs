//! `in`, `distinct` and `lookup`

use super::Function;
use crate::registry::Registry;
use crate::shape::{ArgKind, CheckContext, Clause};
use std::collections::HashSet;
use tablecheck_core::{Condition, Message};

/// The value must equal a literal or appear in a referenced column
pub struct InFn;

impl Function for InFn {
    fn name(&self) -> &str {
        "in"
    }

    fn usage(&self) -> &str {
        "in(value+)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![Clause::OneOrMore(ArgKind::Alternation(vec![
            ArgKind::String,
            ArgKind::Field,
        ]))]
    }

    fn validate(
        &self,
        registry: &Registry,
        args: &[Condition],
        table: &str,
        column: &str,
        row: usize,
        value: &str,
    ) -> Vec<Message> {
        let mut allowed = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Condition::FieldRef {
                    table: source,
                    column: source_column,
                } => {
                    if !registry.rows_with_value(source, source_column, value).is_empty() {
                        return Vec::new();
                    }
                    allowed.push(format!("{}.{}", source, source_column));
                }
                other => {
                    let Some(literal) = other.as_str() else {
                        continue;
                    };
                    if literal == value {
                        return Vec::new();
                    }
                    allowed.push(format!("\"{}\"", literal));
                }
            }
        }
        let text = format!("'{}' must be in: {}", value, allowed.join(", "));
        vec![registry.error(table, column, row, text)]
    }
}

/// The value must satisfy an expression and not repeat in its column or
/// in any listed column
pub struct DistinctFn;

impl Function for DistinctFn {
    fn name(&self) -> &str {
        "distinct"
    }

    fn usage(&self) -> &str {
        "distinct(expression, field*)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![
            Clause::Exactly(ArgKind::Expression),
            Clause::ZeroOrMore(ArgKind::Field),
        ]
    }

    fn validate(
        &self,
        registry: &Registry,
        args: &[Condition],
        table: &str,
        column: &str,
        row: usize,
        value: &str,
    ) -> Vec<Message> {
        let Some((expression, extra)) = args.split_first() else {
            return Vec::new();
        };
        let messages = registry.validate_condition(expression, table, column, row, value);
        if !messages.is_empty() {
            return messages;
        }

        let mut seen = HashSet::new();
        let mut locations = Vec::new();
        let mut record = |t: &str, c: &str, r: usize| {
            if t == table && c == column && r == row {
                return;
            }
            if let Some(cell) = registry.tables().cell(t, c, r) {
                let location = format!("{}:{}", t, cell);
                if seen.insert(location.clone()) {
                    locations.push(location);
                }
            }
        };

        for &other in registry.rows_with_value(table, column, value).iter() {
            record(table, column, other);
        }
        for arg in extra {
            if let Condition::FieldRef {
                table: t,
                column: c,
            } = arg
            {
                for &other in registry.rows_with_value(t, c, value).iter() {
                    record(t, c, other);
                }
            }
        }

        if locations.is_empty() {
            return Vec::new();
        }
        let text = format!(
            "'{}' must be distinct with value(s) at: {}",
            value,
            locations.join(", ")
        );
        vec![registry.error(table, column, row, text)]
    }
}

/// In a rule's then condition: the value must equal the entry found by
/// looking up the row's when value in another table
pub struct LookupFn;

impl Function for LookupFn {
    fn name(&self) -> &str {
        "lookup"
    }

    fn usage(&self) -> &str {
        "lookup(table, key_column, value_column)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![
            Clause::Exactly(ArgKind::String),
            Clause::Exactly(ArgKind::String),
            Clause::Exactly(ArgKind::String),
        ]
    }

    fn check(
        &self,
        ctx: &CheckContext<'_>,
        _table: &str,
        _column: &str,
        args: &[Condition],
    ) -> Result<(), String> {
        let mut errors = Vec::new();
        let mut target: Option<&str> = None;
        for (idx, arg) in args.iter().take(3).enumerate() {
            let position = idx + 1;
            let Some(name) = arg.as_str() else {
                errors.push(format!("argument {} must be of type 'string'", position));
                continue;
            };
            if position == 1 {
                if !ctx.tables.contains(name) {
                    errors.push("argument 1 must be a table in inputs".to_string());
                    return Err(format!("lookup {}", errors.join("; ")));
                }
                target = Some(name);
            } else if let Some(target) = target {
                if !ctx.tables.has_column(target, name) {
                    errors.push(format!(
                        "argument {} must be a column in '{}'",
                        position, target
                    ));
                }
            }
        }
        if args.len() != 3 {
            errors.push(format!(
                "expects 3 arguments, but {} were passed",
                args.len()
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(format!("lookup {}", errors.join("; ")))
        }
    }

    /// The key comes from the rule that fired, so a bare call has nothing
    /// to look up; rules go through [`lookup`] instead.
    fn validate(
        &self,
        registry: &Registry,
        _args: &[Condition],
        table: &str,
        column: &str,
        row: usize,
        _value: &str,
    ) -> Vec<Message> {
        let text = "the `lookup` function is only allowed as a rule's then condition";
        vec![registry.error(table, column, row, text)]
    }
}

/// Check `value` against the `value_column` of the `search_table` row whose
/// `key_column` holds `key`
pub fn lookup(
    registry: &Registry,
    args: &[Condition],
    table: &str,
    column: &str,
    row: usize,
    key: &str,
    value: &str,
) -> Vec<Message> {
    let [search_table, key_column, value_column] = args else {
        return Vec::new();
    };
    let (Some(search_table), Some(key_column), Some(value_column)) =
        (search_table.as_str(), key_column.as_str(), value_column.as_str())
    else {
        return Vec::new();
    };

    let expected = registry
        .rows_with_value(search_table, key_column, key)
        .first()
        .and_then(|&found| registry.tables().get(search_table)?.get(found, value_column));
    match expected {
        Some(expected) if expected == value => Vec::new(),
        Some(expected) => {
            let text = format!("'{}' must be '{}'", value, expected);
            vec![registry
                .error(table, column, row, text)
                .with_suggestion(expected)]
        }
        None => {
            let text = format!(
                "'{}' must be present in {}.{}",
                value, search_table, value_column
            );
            vec![registry.error(table, column, row, text)]
        }
    }
}

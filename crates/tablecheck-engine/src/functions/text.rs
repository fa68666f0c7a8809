//! `concat`, `list` and `sub`

use super::Function;
use crate::registry::Registry;
use crate::shape::{ArgKind, Clause};
use tablecheck_core::{Condition, Message};

/// Splits the value on literal separators and checks each fragment against
/// the expressions between them
pub struct ConcatFn;

impl ConcatFn {
    fn separator<'a>(registry: &Registry, arg: &'a Condition) -> Option<&'a str> {
        match arg {
            Condition::Literal(text) => Some(text),
            Condition::DatatypeRef(name) if !registry.datatypes().contains(name) => Some(name),
            _ => None,
        }
    }
}

impl Function for ConcatFn {
    fn name(&self) -> &str {
        "concat"
    }

    fn usage(&self) -> &str {
        "concat(value+)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![Clause::OneOrMore(ArgKind::Alternation(vec![
            ArgKind::Expression,
            ArgKind::String,
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
        let mut messages = Vec::new();
        let mut pending: Vec<&Condition> = Vec::new();
        let mut rest = value;

        for arg in args {
            let Some(separator) = Self::separator(registry, arg) else {
                pending.push(arg);
                continue;
            };
            let Some((fragment, after)) = rest.split_once(separator) else {
                let text = format!("'{}' must contain substring '{}'", value, separator);
                return vec![registry.error(table, column, row, text)];
            };
            messages.extend(check_fragment(registry, table, column, row, value, fragment, &pending));
            pending.clear();
            rest = after;
        }
        messages.extend(check_fragment(registry, table, column, row, value, rest, &pending));
        messages
    }
}

/// Check one `concat` fragment against the expressions preceding its
/// separator; with no expressions the fragment must be empty
fn check_fragment(
    registry: &Registry,
    table: &str,
    column: &str,
    row: usize,
    value: &str,
    fragment: &str,
    pending: &[&Condition],
) -> Vec<Message> {
    if pending.is_empty() {
        if fragment.is_empty() {
            return Vec::new();
        }
        let text = format!("'{}' has unexpected text '{}'", value, fragment);
        return vec![registry.error(table, column, row, text)];
    }
    pending
        .iter()
        .flat_map(|condition| registry.validate_condition(condition, table, column, row, fragment))
        .collect()
}

/// Splits the value and checks every item against one expression
pub struct ListFn;

impl Function for ListFn {
    fn name(&self) -> &str {
        "list"
    }

    fn usage(&self) -> &str {
        "list(string, expression)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![
            Clause::Exactly(ArgKind::String),
            Clause::Exactly(ArgKind::Expression),
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
        let [split, expression] = args else {
            return Vec::new();
        };
        let separator = split.as_str().unwrap_or_default();
        let items: Vec<&str> = if separator.is_empty() {
            vec![value]
        } else {
            value.split(separator).collect()
        };

        let failures: Vec<String> = items
            .into_iter()
            .flat_map(|item| registry.validate_condition(expression, table, column, row, item))
            .map(|m| m.message)
            .collect();
        if failures.is_empty() {
            return Vec::new();
        }
        vec![registry.error(table, column, row, failures.join("; "))]
    }
}

/// Applies a substitution and checks the result
pub struct SubFn;

impl Function for SubFn {
    fn name(&self) -> &str {
        "sub"
    }

    fn usage(&self) -> &str {
        "sub(regex_sub, expression)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![
            Clause::Exactly(ArgKind::RegexSub),
            Clause::Exactly(ArgKind::Expression),
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
        let [Condition::Regex {
            pattern,
            flags,
            replacement: Some(replacement),
        }, expression] = args
        else {
            return Vec::new();
        };
        match registry.substitution(pattern, replacement, flags) {
            Ok(substitution) => {
                let substituted = substitution.apply(value);
                registry.validate_condition(expression, table, column, row, &substituted)
            }
            Err(err) => vec![registry.error(table, column, row, err)],
        }
    }
}

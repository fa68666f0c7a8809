//! `any` and `not`

use super::Function;
use crate::registry::Registry;
use crate::shape::{ArgKind, Clause};
use tablecheck_core::{Condition, Message};

/// Passes when at least one expression passes
pub struct AnyFn;

impl Function for AnyFn {
    fn name(&self) -> &str {
        "any"
    }

    fn usage(&self) -> &str {
        "any(expression+)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![Clause::OneOrMore(ArgKind::Expression)]
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
        let mut attempted = Vec::with_capacity(args.len());
        for arg in args {
            if registry
                .validate_condition(arg, table, column, row, value)
                .is_empty()
            {
                return Vec::new();
            }
            attempted.push(arg.to_string());
        }
        let text = format!("'{}' must meet one of: {}", value, attempted.join(", "));
        vec![registry.error(table, column, row, text)]
    }
}

/// Passes only when every expression fails
pub struct NotFn;

impl Function for NotFn {
    fn name(&self) -> &str {
        "not"
    }

    fn usage(&self) -> &str {
        "not(expression+)"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![Clause::OneOrMore(ArgKind::Expression)]
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
        for arg in args {
            if !registry
                .validate_condition(arg, table, column, row, value)
                .is_empty()
            {
                continue;
            }
            let text = if arg.as_str() == Some("blank") {
                "value must not be blank".to_string()
            } else {
                format!("'{}' must not be '{}'", value, arg)
            };
            return vec![registry.error(table, column, row, text)];
        }
        Vec::new()
    }
}

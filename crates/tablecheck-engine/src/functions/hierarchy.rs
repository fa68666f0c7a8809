//! `tree` and `under`

use super::Function;
use crate::registry::Registry;
use crate::shape::{ArgKind, Clause};
use tablecheck_core::{Condition, Message};

/// Declares a tree over a table; handled while the registry is built and
/// never evaluated per cell
pub struct TreeFn;

impl Function for TreeFn {
    fn name(&self) -> &str {
        "tree"
    }

    fn usage(&self) -> &str {
        "tree(column, [tree], [split=CHAR])"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![
            Clause::Exactly(ArgKind::Column),
            Clause::Optional(ArgKind::Tree),
            Clause::Optional(ArgKind::Named("split".to_string())),
        ]
    }

    fn validate(
        &self,
        _registry: &Registry,
        _args: &[Condition],
        _table: &str,
        _column: &str,
        _row: usize,
        _value: &str,
    ) -> Vec<Message> {
        Vec::new()
    }
}

/// The value must be at or below an ancestor in a tree
pub struct UnderFn;

impl Function for UnderFn {
    fn name(&self) -> &str {
        "under"
    }

    fn usage(&self) -> &str {
        "under(tree, string, [direct=true])"
    }

    fn shape(&self) -> Vec<Clause> {
        vec![
            Clause::Exactly(ArgKind::Tree),
            Clause::Exactly(ArgKind::String),
            Clause::Optional(ArgKind::Named("direct".to_string())),
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
        let (
            Some(Condition::FieldRef {
                table: tree_table,
                column: tree_column,
            }),
            Some(ancestor),
        ) = (args.first(), args.get(1).and_then(Condition::as_str))
        else {
            return Vec::new();
        };
        let direct = matches!(
            args.get(2),
            Some(Condition::NamedArg { value: flag, .. })
                if flag.as_str().is_some_and(|v| v.eq_ignore_ascii_case("true"))
        );

        let tree_name = format!("{}.{}", tree_table, tree_column);
        let Some(tree) = registry.tree(&tree_name) else {
            let text = format!("'{}' must be a defined tree", tree_name);
            return vec![registry.error(table, column, row, text)];
        };
        if tree.has_ancestor(value, ancestor, direct) {
            return Vec::new();
        }

        let text = if direct {
            format!(
                "'{}' must be a direct subclass of '{}' from {}",
                value, ancestor, tree_name
            )
        } else {
            format!(
                "'{}' must be equal to or under '{}' from {}",
                value, ancestor, tree_name
            )
        };
        vec![registry.error(table, column, row, text)]
    }
}

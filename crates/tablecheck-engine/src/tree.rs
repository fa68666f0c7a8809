//! Child to parents hierarchies built by `tree()` field declarations
//!
//! A tree is keyed by child value; each child maps to the set of its direct
//! parents. Roots map to an empty set.

use std::collections::{HashMap, HashSet, VecDeque};
use tablecheck_core::{Message, RuleId, TableSet};

/// A built hierarchy, immutable once registered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    parents: HashMap<String, HashSet<String>>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `child` with no parents if it is not already present
    pub fn add_node(&mut self, child: &str) {
        self.parents.entry(child.to_string()).or_default();
    }

    /// Add a `child -> parent` edge
    pub fn add_edge(&mut self, child: &str, parent: &str) {
        self.parents
            .entry(child.to_string())
            .or_default()
            .insert(parent.to_string());
    }

    pub fn contains(&self, node: &str) -> bool {
        self.parents.contains_key(node)
    }

    /// Direct parents of a node
    pub fn parents(&self, node: &str) -> Vec<&str> {
        self.parents
            .get(node)
            .map(|parents| parents.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// All nodes with an entry in the tree
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.parents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Every ancestor of a node (transitive closure of parents)
    pub fn ancestors(&self, node: &str) -> Vec<&str> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<&str> = self.parents(node).into_iter().collect();
        let mut result = Vec::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);
            for parent in self.parents(current) {
                if !visited.contains(parent) {
                    queue.push_back(parent);
                }
            }
        }

        result
    }

    /// Whether `ancestor` is `node` itself or above it.
    ///
    /// With `direct`, only a direct parent counts and the node itself does
    /// not.
    pub fn has_ancestor(&self, node: &str, ancestor: &str, direct: bool) -> bool {
        if direct {
            return self
                .parents
                .get(node)
                .is_some_and(|parents| parents.contains(ancestor));
        }
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }
}

/// Arguments of one `tree()` declaration
#[derive(Debug, Clone, Copy)]
pub struct TreeSpec<'a> {
    /// Table holding both columns
    pub table: &'a str,

    /// Column holding parent values (the declaring field's column)
    pub parent_column: &'a str,

    /// Column holding child values
    pub child_column: &'a str,

    /// Previously built tree to extend, with its `table.column` name
    pub extend: Option<(&'a str, &'a Tree)>,

    /// Separator for cells holding several parents
    pub split: Option<&'a str>,

    /// Sheet row of the declaring `field` row
    pub field_row: usize,
}

/// Build a tree from a table's rows.
///
/// Parents that are not child values of the table (or nodes of the extended
/// tree) are reported but still added as edges.
pub fn build_tree(tables: &TableSet, spec: &TreeSpec<'_>) -> (Tree, Vec<Message>) {
    let mut tree = spec.extend.map(|(_, t)| t.clone()).unwrap_or_default();
    let mut messages = Vec::new();

    let Some(table) = tables.get(spec.table) else {
        return (tree, messages);
    };

    let mut allowed: HashSet<String> = tree.nodes().map(str::to_string).collect();
    if let Some(children) = table.column_values(spec.child_column) {
        allowed.extend(children.map(str::to_string));
    }

    for (idx, row) in table.rows().enumerate() {
        let child = row.get(spec.child_column);
        let parent_cell = row.get(spec.parent_column);
        if parent_cell.trim().is_empty() {
            tree.add_node(child);
            continue;
        }

        let parents: Vec<&str> = match spec.split {
            Some(split) if !split.is_empty() => parent_cell.split(split).collect(),
            _ => vec![parent_cell],
        };
        for parent in parents {
            if !allowed.contains(parent) {
                let mut text = format!(
                    "'{}' from {}.{} must exist in {}.{}",
                    parent, spec.table, spec.parent_column, spec.table, spec.child_column
                );
                if let Some((name, _)) = spec.extend {
                    text.push_str(&format!(" or {} tree", name));
                }
                let mut message =
                    Message::new(spec.table, text).with_rule_id(RuleId::Field(spec.field_row));
                if let Some(cell) = tables.cell(spec.table, spec.parent_column, idx) {
                    message = message.at(cell);
                }
                messages.push(message);
            }
            tree.add_edge(child, parent);
        }
    }

    tracing::debug!(
        table = spec.table,
        column = spec.parent_column,
        nodes = tree.len(),
        problems = messages.len(),
        "Built tree"
    );
    (tree, messages)
}

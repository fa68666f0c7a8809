//! Function library
//!
//! Functions are looked up by name from the conditions in the `field` and
//! `rule` tables. The builtins are always present; callers may register
//! more through [`FunctionLibrary::register`].

mod hierarchy;
mod logic;
mod membership;
mod text;

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::shape::{check_args, CheckContext, Clause};
use std::collections::HashMap;
use tablecheck_core::{Condition, Message};

pub use hierarchy::{TreeFn, UnderFn};
pub use logic::{AnyFn, NotFn};
pub use membership::{lookup, DistinctFn, InFn, LookupFn};
pub use text::{ConcatFn, ListFn, SubFn};

/// Names of the builtin functions
pub const BUILTIN_FUNCTIONS: [&str; 10] = [
    "any", "concat", "distinct", "in", "list", "lookup", "not", "sub", "tree", "under",
];

/// A validator callable from a condition
pub trait Function: Send + Sync {
    /// Name used in conditions
    fn name(&self) -> &str;

    /// Human readable signature, shown in argument errors
    fn usage(&self) -> &str;

    /// Declared argument shape
    fn shape(&self) -> Vec<Clause>;

    /// Check a call's arguments once, at configuration time
    fn check(
        &self,
        ctx: &CheckContext<'_>,
        table: &str,
        _column: &str,
        args: &[Condition],
    ) -> Result<(), String> {
        check_args(ctx, table, self.name(), self.usage(), args, &self.shape())
    }

    /// Validate one cell value; an empty result means the value passes
    fn validate(
        &self,
        registry: &Registry,
        args: &[Condition],
        table: &str,
        column: &str,
        row: usize,
        value: &str,
    ) -> Vec<Message>;
}

/// Functions by name
pub struct FunctionLibrary {
    functions: HashMap<String, Box<dyn Function>>,
}

impl std::fmt::Debug for FunctionLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("FunctionLibrary")
            .field("functions", &names)
            .finish()
    }
}

impl Default for FunctionLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionLibrary {
    /// A library holding the builtin functions
    pub fn new() -> Self {
        let builtins: Vec<Box<dyn Function>> = vec![
            Box::new(AnyFn),
            Box::new(ConcatFn),
            Box::new(DistinctFn),
            Box::new(InFn),
            Box::new(ListFn),
            Box::new(LookupFn),
            Box::new(NotFn),
            Box::new(SubFn),
            Box::new(TreeFn),
            Box::new(UnderFn),
        ];
        let functions = builtins
            .into_iter()
            .map(|f| (f.name().to_string(), f))
            .collect();
        Self { functions }
    }

    /// Add a caller-supplied function
    pub fn register(&mut self, function: Box<dyn Function>) -> Result<(), ConfigError> {
        let name = function.name().to_string();
        if BUILTIN_FUNCTIONS.contains(&name.as_str()) {
            return Err(ConfigError::ReservedFunction(name));
        }
        if !is_function_name(&name) {
            return Err(ConfigError::InvalidFunctionName(name));
        }
        if self.functions.contains_key(&name) {
            return Err(ConfigError::DuplicateFunction(name));
        }
        tracing::debug!(function = %name, "Registered custom function");
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Function> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

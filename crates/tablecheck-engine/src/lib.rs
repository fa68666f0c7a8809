//! Table validation engine
//!
//! Builds a [`Registry`] from the `datatype`, `field` and `rule`
//! configuration tables and evaluates every data table against it.
//!
//! ```text
//! TableSet --Registry::build--> Registry --validate_all--> Vec<TableOutcome>
//! ```

pub mod datatype;
pub mod engine;
pub mod error;
pub mod functions;
pub mod index;
pub mod meta;
pub mod pattern;
pub mod registry;
pub mod shape;
pub mod tree;

pub use datatype::{Datatype, Datatypes, Violation};
pub use engine::{validate, validate_all, validate_table, TableOutcome};
pub use error::ConfigError;
pub use functions::{Function, FunctionLibrary, BUILTIN_FUNCTIONS};
pub use registry::{FieldRule, Registry, Rule, ANY_TABLE};
pub use shape::{ArgKind, CheckContext, Clause};
pub use tree::{build_tree, Tree, TreeSpec};

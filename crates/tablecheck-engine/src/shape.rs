//! Argument shapes for function calls
//!
//! A function declares its arguments as a sequence of [`Clause`]s, each
//! typed by an [`ArgKind`]. [`check_args`] matches a call's arguments
//! against that sequence and explains every mismatch by position.

use crate::datatype::Datatypes;
use crate::pattern::{compile_match, Substitution};
use crate::tree::Tree;
use std::collections::HashMap;
use std::fmt;
use tablecheck_core::{Condition, TableSet};

/// What a single argument must be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    /// A column of the table the condition applies to
    Column,
    /// A function call or a known datatype
    Expression,
    /// A `table.column` reference
    Field,
    /// A bare word or quoted string
    String,
    /// `/pattern/flags`
    RegexMatch,
    /// `s/pattern/replacement/flags`
    RegexSub,
    /// `table.column` naming a built tree
    Tree,
    /// `key=value` with the given key
    Named(String),
    /// Any one of several kinds
    Alternation(Vec<ArgKind>),
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column => write!(f, "column"),
            Self::Expression => write!(f, "expression"),
            Self::Field => write!(f, "field"),
            Self::String => write!(f, "string"),
            Self::RegexMatch => write!(f, "regex_match"),
            Self::RegexSub => write!(f, "regex_sub"),
            Self::Tree => write!(f, "tree"),
            Self::Named(key) => write!(f, "named:{}", key),
            Self::Alternation(kinds) => {
                let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
                write!(f, "{}", names.join(" or "))
            }
        }
    }
}

/// How many arguments a clause consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Exactly(ArgKind),
    ZeroOrMore(ArgKind),
    OneOrMore(ArgKind),
    Optional(ArgKind),
}

/// What argument checks can see while the registry is being assembled
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub tables: &'a TableSet,
    pub datatypes: &'a Datatypes,
    pub trees: &'a HashMap<String, Tree>,
}

/// Match `args` of a call to `name` against `clauses`
pub fn check_args(
    ctx: &CheckContext<'_>,
    table: &str,
    name: &str,
    usage: &str,
    args: &[Condition],
    clauses: &[Clause],
) -> Result<(), String> {
    let mut errors = Vec::new();
    let mut carried = String::new();
    let mut i = 0;
    let mut remaining = clauses.iter().peekable();

    while let Some(clause) = remaining.next() {
        match clause {
            Clause::ZeroOrMore(kind) => {
                while i < args.len() {
                    if let Err(err) = check_arg(ctx, table, &args[i], kind) {
                        errors.push(format!("optional argument {} {}", i + 1, err));
                    }
                    i += 1;
                }
            }
            Clause::Optional(kind) => {
                if i >= args.len() {
                    break;
                }
                match check_arg(ctx, table, &args[i], kind) {
                    Ok(()) => i += 1,
                    // leave the argument for the next clause
                    Err(err) if remaining.peek().is_some() => {
                        carried = format!(" or {}", err);
                        continue;
                    }
                    Err(err) => {
                        errors.push(format!("optional argument {} {}{}", i + 1, err, carried));
                        i += 1;
                        break;
                    }
                }
            }
            Clause::OneOrMore(kind) => {
                if i >= args.len() {
                    errors.push(format!("requires one or more '{}' at argument {}", kind, i + 1));
                    break;
                }
                while i < args.len() {
                    if let Err(err) = check_arg(ctx, table, &args[i], kind) {
                        errors.push(format!("argument {} {}{}", i + 1, err, carried));
                    }
                    i += 1;
                }
            }
            Clause::Exactly(kind) => {
                if i >= args.len() {
                    errors.push(format!("requires one '{}' at argument {}", kind, i + 1));
                    break;
                }
                if let Err(err) = check_arg(ctx, table, &args[i], kind) {
                    errors.push(format!("argument {} {}{}", i + 1, err, carried));
                }
                i += 1;
            }
        }
        carried.clear();
    }

    if i < args.len() {
        errors.push(format!(
            "expects {} argument(s), but {} were given",
            i,
            args.len()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} {} (usage: {})", name, errors.join("; "), usage))
    }
}

/// Check one argument against one kind
pub fn check_arg(
    ctx: &CheckContext<'_>,
    table: &str,
    arg: &Condition,
    kind: &ArgKind,
) -> Result<(), String> {
    match kind {
        ArgKind::Alternation(kinds) => {
            let mut errors = Vec::new();
            for kind in kinds {
                match check_arg(ctx, table, arg, kind) {
                    Ok(()) => return Ok(()),
                    Err(err) => errors.push(err),
                }
            }
            Err(errors.join(" or "))
        }
        ArgKind::Named(key) => match arg {
            Condition::NamedArg { key: actual, .. } if actual == key => Ok(()),
            Condition::NamedArg { .. } => Err(format!("named argument must be '{}'", key)),
            _ => Err(format!("value must be a named argument '{}'", key)),
        },
        ArgKind::Column => {
            let Some(column) = arg.as_str() else {
                return Err(format!(
                    "value must be a string representing a column in '{}'",
                    table
                ));
            };
            if ctx.tables.has_column(table, column) {
                Ok(())
            } else {
                Err(format!("'{}' must be a column in '{}'", column, table))
            }
        }
        ArgKind::Expression => match arg {
            Condition::Call { .. } => Ok(()),
            Condition::DatatypeRef(name) | Condition::Literal(name) => {
                if ctx.datatypes.contains(name) {
                    Ok(())
                } else {
                    Err(format!("'{}' must be a defined datatype", name))
                }
            }
            _ => Err("value must be a function or datatype".to_string()),
        },
        ArgKind::Field => match arg {
            Condition::FieldRef { .. } => Ok(()),
            _ => Err("value must be a field".to_string()),
        },
        ArgKind::String => match arg.as_str() {
            Some(_) => Ok(()),
            None => Err("value must be a string".to_string()),
        },
        ArgKind::RegexMatch => match arg {
            Condition::Regex {
                replacement: Some(_),
                ..
            } => Err("regex pattern should not have a substitution".to_string()),
            Condition::Regex { pattern, flags, .. } => compile_match(pattern, flags).map(|_| ()),
            _ => Err("value must be a regex pattern".to_string()),
        },
        ArgKind::RegexSub => match arg {
            Condition::Regex {
                pattern,
                flags,
                replacement: Some(replacement),
            } => Substitution::compile(pattern, replacement, flags).map(|_| ()),
            Condition::Regex { .. } => Err("regex pattern requires a substitution".to_string()),
            _ => Err("value must be a regex pattern".to_string()),
        },
        ArgKind::Tree => match arg {
            Condition::FieldRef { table, column } => {
                let name = format!("{}.{}", table, column);
                if ctx.trees.contains_key(&name) {
                    Ok(())
                } else {
                    Err(format!("'{}' must be a defined tree", name))
                }
            }
            _ => Err("value must be a table-column pair representing a tree name".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tablecheck_core::Table;

    struct Fixture {
        tables: TableSet,
        datatypes: Datatypes,
        trees: HashMap<String, Tree>,
    }

    impl Fixture {
        fn new() -> Self {
            let tables = TableSet::from_tables(
                2,
                [Table::from_records("terms", &["id", "parent"], &[&["a", ""]])],
            )
            .unwrap();
            let mut trees = HashMap::new();
            trees.insert("terms.parent".to_string(), Tree::new());
            Self {
                tables,
                datatypes: Datatypes::new(),
                trees,
            }
        }

        fn ctx(&self) -> CheckContext<'_> {
            CheckContext {
                tables: &self.tables,
                datatypes: &self.datatypes,
                trees: &self.trees,
            }
        }
    }

    fn tree_shape() -> Vec<Clause> {
        vec![
            Clause::Exactly(ArgKind::Column),
            Clause::Optional(ArgKind::Tree),
            Clause::Optional(ArgKind::Named("split".to_string())),
        ]
    }

    #[test]
    fn optional_clause_falls_through() {
        let fixture = Fixture::new();
        let args = vec![
            Condition::datatype("id"),
            Condition::named("split", Condition::literal("|")),
        ];
        assert_eq!(
            check_args(&fixture.ctx(), "terms", "tree", "tree(column)", &args, &tree_shape()),
            Ok(())
        );
    }

    #[test]
    fn failed_optional_carries_its_reason() {
        let fixture = Fixture::new();
        let args = vec![Condition::datatype("id"), Condition::literal("x")];
        let err = check_args(&fixture.ctx(), "terms", "tree", "tree(column)", &args, &tree_shape())
            .unwrap_err();
        assert_eq!(
            err,
            "tree optional argument 2 value must be a named argument 'split' or value must be a \
             table-column pair representing a tree name (usage: tree(column))"
        );
    }

    #[test]
    fn missing_and_extra_arguments() {
        let fixture = Fixture::new();
        let shape = vec![
            Clause::Exactly(ArgKind::String),
            Clause::Exactly(ArgKind::Expression),
        ];
        let err = check_args(&fixture.ctx(), "terms", "list", "list(s, e)", &[], &shape)
            .unwrap_err();
        assert!(err.contains("requires one 'string' at argument 1"));

        let args = vec![
            Condition::literal("|"),
            Condition::datatype("blank"),
            Condition::datatype("blank"),
        ];
        let err = check_args(&fixture.ctx(), "terms", "list", "list(s, e)", &args, &shape)
            .unwrap_err();
        assert!(err.contains("expects 2 argument(s), but 3 were given"));
    }

    #[test]
    fn one_or_more_reports_each_bad_argument() {
        let fixture = Fixture::new();
        let shape = vec![Clause::OneOrMore(ArgKind::Expression)];
        let args = vec![
            Condition::datatype("blank"),
            Condition::datatype("nope"),
            Condition::field("terms", "id"),
        ];
        let err = check_args(&fixture.ctx(), "terms", "any", "any(e+)", &args, &shape)
            .unwrap_err();
        assert_eq!(
            err,
            "any argument 2 'nope' must be a defined datatype; argument 3 value must be a \
             function or datatype (usage: any(e+))"
        );
    }

    #[test]
    fn argument_kinds() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        assert!(check_arg(&ctx, "terms", &Condition::datatype("parent"), &ArgKind::Column).is_ok());
        assert!(check_arg(&ctx, "terms", &Condition::datatype("label"), &ArgKind::Column).is_err());
        assert!(check_arg(&ctx, "terms", &Condition::field("terms", "parent"), &ArgKind::Tree).is_ok());
        assert!(check_arg(&ctx, "terms", &Condition::field("terms", "id"), &ArgKind::Tree).is_err());

        let sub = Condition::Regex {
            pattern: "a".to_string(),
            flags: "g".to_string(),
            replacement: Some("b".to_string()),
        };
        assert!(check_arg(&ctx, "terms", &sub, &ArgKind::RegexSub).is_ok());
        assert!(check_arg(&ctx, "terms", &sub, &ArgKind::RegexMatch).is_err());

        let either = ArgKind::Alternation(vec![ArgKind::String, ArgKind::Field]);
        assert!(check_arg(&ctx, "terms", &Condition::field("terms", "id"), &either).is_ok());
        assert_eq!(either.to_string(), "string or field");
    }
}

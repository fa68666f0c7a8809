//! Configuration error types

use tablecheck_core::Message;

/// Errors that stop validation before any data table is evaluated
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing table '{0}'")]
    MissingTable(String),

    #[error("duplicate table '{0}'")]
    DuplicateTable(String),

    #[error("unrecognized datatype '{0}'")]
    UnknownDatatype(String),

    #[error("parent '{parent}' of datatype '{datatype}' must be declared before it")]
    UndeclaredParent { datatype: String, parent: String },

    #[error("datatype '{0}' is already defined")]
    DuplicateDatatype(String),

    #[error("cannot redefine builtin datatype '{0}'")]
    ReservedDatatype(String),

    #[error("datatype '{0}' has a cyclic parent chain")]
    DatatypeCycle(String),

    #[error("cannot use builtin function name '{0}'")]
    ReservedFunction(String),

    #[error("function '{0}' is already registered")]
    DuplicateFunction(String),

    #[error("invalid function name '{0}'")]
    InvalidFunctionName(String),

    #[error("configuration has {} problem(s)", .0.len())]
    Invalid(Vec<Message>),
}

impl From<tablecheck_core::TableError> for ConfigError {
    fn from(err: tablecheck_core::TableError) -> Self {
        match err {
            tablecheck_core::TableError::Duplicate(name) => Self::DuplicateTable(name),
        }
    }
}

impl ConfigError {
    /// Configuration-table messages carried by [`ConfigError::Invalid`]
    pub fn messages(&self) -> &[Message] {
        match self {
            Self::Invalid(messages) => messages,
            _ => &[],
        }
    }
}

//! Statement construction errors.

use crate::builder::StatementKind;

/// An error raised while turning a configuration into SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No table name is bound.
    MissingTable,
    /// The statement kind name is not one of select/update/insert/delete.
    UnsupportedStatement(String),
    /// A where group holds no condition-sets.
    EmptyWhereGroup {
        /// Index of the group in the configuration.
        group: usize,
    },
    /// A condition-set holds no column conditions.
    EmptyConditionSet {
        /// Index of the group in the configuration.
        group: usize,
        /// Index of the condition-set inside the group.
        set: usize,
    },
    /// A membership clause supplies neither an option list nor a query.
    MissingMembershipSource {
        /// `where_in` or `where_not_in`.
        clause: &'static str,
    },
    /// No columns or assignments were supplied.
    EmptyFields(StatementKind),
    /// INSERT column and value counts differ.
    InsertArity {
        /// Number of column names.
        columns: usize,
        /// Number of values.
        values: usize,
    },
    /// The limit shape is not accepted by the statement kind.
    InvalidLimit(StatementKind),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTable => write!(f, "no table bound"),
            Self::UnsupportedStatement(kind) => write!(f, "unsupported statement kind '{kind}'"),
            Self::EmptyWhereGroup { group } => write!(f, "where group {group} is empty"),
            Self::EmptyConditionSet { group, set } => {
                write!(f, "condition-set {set} of where group {group} has no column conditions")
            }
            Self::MissingMembershipSource { clause } => {
                write!(f, "{clause} needs either options or a query")
            }
            Self::EmptyFields(kind) => write!(f, "{kind} needs at least one column"),
            Self::InsertArity { columns, values } => write!(
                f,
                "INSERT has {columns} column(s) but {values} value(s)"
            ),
            Self::InvalidLimit(kind) => write!(f, "{kind} does not accept this limit"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Result type for statement construction.
pub type Result<T> = std::result::Result<T, BuildError>;

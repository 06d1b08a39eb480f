//! # rowmap-core
//!
//! Configuration-driven SQL construction for single-table data mappers.
//!
//! This crate provides:
//! - A strongly-typed configuration model ([`QueryConfig`]) for where groups,
//!   joins, membership clauses, limits and distinct selection
//! - A clause composer turning where groups into one parenthesized boolean chain
//! - Statement pipelines for SELECT, UPDATE, INSERT and DELETE
//! - The literal encoder used to interpolate values into statement text
//!
//! Statements are plain text with interpolated literals; there is no
//! parameter binding.
//!
//! ```rust
//! use rowmap_core::{
//!     ConditionSet, Conjunction, Projection, QueryConfig, StatementBuilder, WhereGroup,
//! };
//!
//! let config = QueryConfig::new().where_group(WhereGroup::new(vec![
//!     ConditionSet::new().eq("actor_id", 5).next_op(Conjunction::Or),
//!     ConditionSet::new().like("last_name", "%ER"),
//! ]));
//!
//! let statement = StatementBuilder::new("actor")
//!     .select(&Projection::All, &config)
//!     .unwrap();
//!
//! assert_eq!(
//!     statement.sql(),
//!     concat!(
//!         "SELECT  * FROM `actor`  WHERE (`actor_id` = 5 ) ",
//!         "OR (`last_name` LIKE '%ER' ) LIMIT 0, 1000;"
//!     )
//! );
//! ```

pub mod builder;
pub mod clause;
pub mod config;
pub mod error;
pub mod value;

pub use builder::{
    quote_identifier, Assignments, FieldSpec, Projection, Statement, StatementBuilder,
    StatementKind,
};
pub use config::{
    CompareOp, Condition, ConditionSet, Conjunction, JoinSpec, Limit, MembershipClause,
    OptionList, QueryConfig, WhereGroup,
};
pub use error::BuildError;
pub use value::{encode, FieldValue, SqlValue, ToSqlValue};

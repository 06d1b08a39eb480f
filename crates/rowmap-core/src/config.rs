//! Per-call query configuration.
//!
//! A [`QueryConfig`] describes everything a statement needs beyond the table
//! and its fields: where groups, joins, membership clauses, limit and the
//! distinct flag. It is caller-owned and read-only during a build, and it can
//! be deserialized from JSON:
//!
//! ```rust
//! use rowmap_core::config::QueryConfig;
//!
//! let config: QueryConfig = serde_json::from_str(r#"{
//!     "whereGroups": [[
//!         { "actor_id": { "value": 5, "operator": "=" }, "nextOp": "OR" },
//!         { "last_name": { "value": "%ER", "operator": "LIKE" } }
//!     ]],
//!     "limit": { "index": 2, "count": 18 }
//! }"#).unwrap();
//!
//! assert_eq!(config.where_groups[0].sets.len(), 2);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::value::{SqlValue, ToSqlValue};

/// Default row offset for SELECT.
pub const DEFAULT_OFFSET: u64 = 0;

/// Default row count for SELECT.
pub const DEFAULT_LIMIT: u64 = 1000;

/// Boolean operator joining conditions or condition-sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Conjunction {
    /// AND
    #[default]
    And,
    /// OR
    Or,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for Conjunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" | "&&" => Ok(Self::And),
            "OR" | "||" => Ok(Self::Or),
            other => Err(format!("unknown boolean operator '{other}'")),
        }
    }
}

impl TryFrom<String> for Conjunction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Comparison operator between a column and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum CompareOp {
    /// Equal (=)
    #[default]
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Pattern match (LIKE)
    Like,
    /// Negated pattern match (NOT LIKE)
    NotLike,
    /// Identity test, used with NULL (IS)
    Is,
    /// Negated identity test (IS NOT)
    IsNot,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::NotLike => write!(f, "NOT LIKE"),
            Self::Is => write!(f, "IS"),
            Self::IsNot => write!(f, "IS NOT"),
        }
    }
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            "IS" => Ok(Self::Is),
            "IS NOT" => Ok(Self::IsNot),
            other => Err(format!("unknown comparison operator '{other}'")),
        }
    }
}

impl TryFrom<String> for CompareOp {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One `column operator value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column name.
    pub column: String,
    /// Comparison operator.
    pub operator: CompareOp,
    /// Value compared against, encoded into a literal.
    pub value: SqlValue,
}

/// A parenthesized group of conditions joined by one operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    /// Conditions in declaration order.
    pub conditions: Vec<Condition>,
    /// Operator joining the conditions of this set.
    pub comparison_op: Conjunction,
    /// Operator joining this set to the following one.
    pub next_op: Conjunction,
}

impl ConditionSet {
    /// Creates an empty condition-set joined by AND on both sides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition.
    #[must_use]
    pub fn condition<V: ToSqlValue>(mut self, column: &str, operator: CompareOp, value: V) -> Self {
        self.conditions.push(Condition {
            column: String::from(column),
            operator,
            value: value.to_sql_value(),
        });
        self
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn eq<V: ToSqlValue>(self, column: &str, value: V) -> Self {
        self.condition(column, CompareOp::Eq, value)
    }

    /// Adds a LIKE condition.
    #[must_use]
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.condition(column, CompareOp::Like, pattern)
    }

    /// Adds an `IS NULL` condition.
    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.condition(column, CompareOp::Is, SqlValue::Null)
    }

    /// Adds an `IS NOT NULL` condition.
    #[must_use]
    pub fn is_not_null(self, column: &str) -> Self {
        self.condition(column, CompareOp::IsNot, SqlValue::Null)
    }

    /// Sets the operator joining the conditions of this set.
    #[must_use]
    pub const fn comparison_op(mut self, op: Conjunction) -> Self {
        self.comparison_op = op;
        self
    }

    /// Sets the operator joining this set to the next one.
    #[must_use]
    pub const fn next_op(mut self, op: Conjunction) -> Self {
        self.next_op = op;
        self
    }
}

impl<'de> Deserialize<'de> for ConditionSet {
    /// Reads `{column: {value, operator}, comparisonOp, nextOp}`.
    ///
    /// A bare `operator` key at set level is not a column and is skipped.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ConditionRepr {
            Full {
                #[serde(default)]
                value: Option<SqlValue>,
                #[serde(default)]
                operator: CompareOp,
            },
            Bare(SqlValue),
        }

        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = ConditionSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a condition-set object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<ConditionSet, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut set = ConditionSet::new();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "comparisonOp" => set.comparison_op = map.next_value()?,
                        "nextOp" => set.next_op = map.next_value()?,
                        "operator" => {
                            map.next_value::<IgnoredAny>()?;
                        }
                        _ => {
                            let (value, operator) = match map.next_value::<ConditionRepr>()? {
                                ConditionRepr::Full { value, operator } => {
                                    (value.unwrap_or(SqlValue::Null), operator)
                                }
                                ConditionRepr::Bare(value) => (value, CompareOp::Eq),
                            };
                            set.conditions.push(Condition {
                                column: key,
                                operator,
                                value,
                            });
                        }
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

/// An ordered chain of condition-sets.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct WhereGroup {
    /// Condition-sets in declaration order.
    pub sets: Vec<ConditionSet>,
}

impl WhereGroup {
    /// Creates a group from condition-sets.
    #[must_use]
    pub fn new(sets: Vec<ConditionSet>) -> Self {
        Self { sets }
    }
}

impl FromIterator<ConditionSet> for WhereGroup {
    fn from_iter<I: IntoIterator<Item = ConditionSet>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// An INNER JOIN against the base table (aliased `T1`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinSpec {
    /// Joined table.
    pub table: String,
    /// Column of the base table.
    #[serde(rename = "conditional_column_a")]
    pub left_column: String,
    /// Column of the joined table.
    #[serde(rename = "conditional_column_b")]
    pub right_column: String,
}

impl JoinSpec {
    /// Creates a join on `T1.left_column = Tn.right_column`.
    #[must_use]
    pub fn new(table: &str, left_column: &str, right_column: &str) -> Self {
        Self {
            table: String::from(table),
            left_column: String::from(left_column),
            right_column: String::from(right_column),
        }
    }
}

/// Literal values of an IN / NOT IN list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionList(pub Vec<SqlValue>);

impl OptionList {
    /// Splits a comma-separated list such as `" 10, 15, 22"`.
    ///
    /// Commas inside single quotes do not split (`'a,b'` is one element).
    /// Elements wrapped in single quotes are unwrapped; empty elements are
    /// dropped.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let values = split_outside_quotes(list)
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                let unquoted = item
                    .strip_prefix('\'')
                    .and_then(|rest| rest.strip_suffix('\''))
                    .unwrap_or(item);
                SqlValue::Text(String::from(unquoted))
            })
            .collect();
        Self(values)
    }
}

fn split_outside_quotes(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                items.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);
    items
}

impl<'de> Deserialize<'de> for OptionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<SqlValue>),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::List(values) => Self(values),
            Repr::Text(list) => Self::parse(&list),
        })
    }
}

/// An IN / NOT IN predicate over a literal list or a raw sub-query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MembershipClause {
    /// Column tested for membership.
    #[serde(rename = "fieldName")]
    pub field_name: String,
    /// Literal option list.
    #[serde(default)]
    pub options: Option<OptionList>,
    /// Raw sub-query; takes precedence over `options`.
    #[serde(default)]
    pub query: Option<String>,
    /// Operator joining this clause to the preceding predicate.
    #[serde(default)]
    pub operator: Conjunction,
}

impl MembershipClause {
    /// Creates a clause over literal options.
    #[must_use]
    pub fn options<V, I>(field_name: &str, values: I) -> Self
    where
        V: ToSqlValue,
        I: IntoIterator<Item = V>,
    {
        Self {
            field_name: String::from(field_name),
            options: Some(OptionList(
                values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            )),
            query: None,
            operator: Conjunction::And,
        }
    }

    /// Creates a clause over a raw sub-query.
    #[must_use]
    pub fn query(field_name: &str, query: &str) -> Self {
        Self {
            field_name: String::from(field_name),
            options: None,
            query: Some(String::from(query)),
            operator: Conjunction::And,
        }
    }

    /// Sets the joining operator.
    #[must_use]
    pub const fn operator(mut self, op: Conjunction) -> Self {
        self.operator = op;
        self
    }
}

/// Row limit of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `LIMIT index, count` (SELECT only).
    Range {
        /// Row offset.
        index: u64,
        /// Row count.
        count: u64,
    },
    /// A bare row count.
    Rows(u64),
}

impl Limit {
    /// Creates an offset/count range.
    #[must_use]
    pub const fn range(index: u64, count: u64) -> Self {
        Self::Range { index, count }
    }

    /// Creates a limit from loosely typed text, cast like an integer.
    #[must_use]
    pub fn loose(text: &str) -> Self {
        Self::Rows(cast_int(text))
    }
}

/// Casts text to a row count: leading digits after optional whitespace and
/// sign are taken, anything else yields 0, negatives clamp to 0.
#[must_use]
pub fn cast_int(text: &str) -> u64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseInt {
    fn value(self) -> u64 {
        match self {
            Self::Int(n) => u64::try_from(n).unwrap_or(0),
            Self::Float(f) => cast_int(&f.to_string()),
            Self::Text(s) => cast_int(&s),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Range { index: LooseInt, count: LooseInt },
            Rows(LooseInt),
        }

        match Repr::deserialize(deserializer) {
            Ok(Repr::Range { index, count }) => Ok(Self::Range {
                index: index.value(),
                count: count.value(),
            }),
            Ok(Repr::Rows(rows)) => Ok(Self::Rows(rows.value())),
            Err(_) => Err(de::Error::custom(
                "limit must be {index, count} or a row count",
            )),
        }
    }
}

/// Configuration of one statement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Where groups, chained under a single WHERE.
    #[serde(rename = "whereGroups")]
    pub where_groups: Vec<WhereGroup>,
    /// Inner joins (SELECT only).
    pub joins: Vec<JoinSpec>,
    /// IN predicate.
    pub where_in: Option<MembershipClause>,
    /// NOT IN predicate.
    pub where_not_in: Option<MembershipClause>,
    /// Row limit.
    #[serde(alias = "LIMIT")]
    pub limit: Option<Limit>,
    /// SELECT DISTINCT.
    pub distinct: bool,
}

impl QueryConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a where group.
    #[must_use]
    pub fn where_group(mut self, group: WhereGroup) -> Self {
        self.where_groups.push(group);
        self
    }

    /// Adds an inner join.
    #[must_use]
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    /// Sets the IN clause.
    #[must_use]
    pub fn where_in(mut self, clause: MembershipClause) -> Self {
        self.where_in = Some(clause);
        self
    }

    /// Sets the NOT IN clause.
    #[must_use]
    pub fn where_not_in(mut self, clause: MembershipClause) -> Self {
        self.where_not_in = Some(clause);
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requests distinct rows.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

//! Where-group composition.
//!
//! Every condition-set becomes one parenthesized expression. Sets are joined
//! by the `next_op` of the set before them, and groups continue the same
//! chain, so any number of groups sits under a single `WHERE`:
//!
//! ```text
//! (`a` = 1 AND `b` = 2 ) OR (`c` LIKE 'x%' ) AND (`d` = 4 )
//! ```

use crate::builder::quote_identifier;
use crate::config::{Condition, ConditionSet, Conjunction, WhereGroup};
use crate::error::{BuildError, Result};
use crate::value::encode;

/// Composes where groups into a boolean expression.
///
/// Returns `None` when there are no groups. Empty groups and condition-sets
/// without column conditions are rejected.
pub fn compose(groups: &[WhereGroup]) -> Result<Option<String>> {
    if groups.is_empty() {
        return Ok(None);
    }

    let mut sql = String::new();
    let mut joiner: Option<Conjunction> = None;

    for (g, group) in groups.iter().enumerate() {
        if group.sets.is_empty() {
            return Err(BuildError::EmptyWhereGroup { group: g });
        }

        for (s, set) in group.sets.iter().enumerate() {
            if set.conditions.is_empty() {
                return Err(BuildError::EmptyConditionSet { group: g, set: s });
            }
            if let Some(op) = joiner {
                sql.push(' ');
                sql.push_str(&op.to_string());
                sql.push(' ');
            }
            sql.push('(');
            sql.push_str(&render_set(set));
            sql.push_str(" )");
            joiner = Some(set.next_op);
        }
    }

    Ok(Some(sql))
}

fn render_set(set: &ConditionSet) -> String {
    let separator = format!(" {} ", set.comparison_op);
    set.conditions
        .iter()
        .map(render_condition)
        .collect::<Vec<_>>()
        .join(&separator)
}

fn render_condition(condition: &Condition) -> String {
    format!(
        "{} {} {}",
        quote_identifier(&condition.column),
        condition.operator,
        encode(&condition.value)
    )
}

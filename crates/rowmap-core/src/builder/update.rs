//! UPDATE pipeline.

use super::{
    push_filters, quote_identifier, Assignments, Statement, StatementBuilder, StatementKind,
};
use crate::config::QueryConfig;
use crate::error::{BuildError, Result};
use crate::value::{encode, FieldValue};

impl StatementBuilder<'_> {
    /// Builds `UPDATE <table> SET col = literal, ... [where];`.
    ///
    /// Raw expressions are emitted verbatim. Limits are not applied.
    pub fn update(&self, assignments: &Assignments, config: &QueryConfig) -> Result<Statement> {
        let table = self.quoted_table()?;
        if assignments.is_empty() {
            return Err(BuildError::EmptyFields(StatementKind::Update));
        }

        let set_parts: Vec<String> = assignments
            .0
            .iter()
            .map(|(column, value)| {
                let rendered = match value {
                    FieldValue::Literal(v) => encode(v),
                    FieldValue::Raw(expr) => expr.clone(),
                };
                format!("{} = {rendered}", quote_identifier(column))
            })
            .collect();

        let mut sql = format!("UPDATE {table} SET {}", set_parts.join(", "));
        push_filters(&mut sql, config)?;
        sql.push(';');

        Ok(Statement::new(StatementKind::Update, sql))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConditionSet, Limit, MembershipClause, WhereGroup};

    #[test]
    fn test_update_with_where() {
        let assignments = Assignments::new().set("email", "a@example.org").set("active", 1);
        let config =
            QueryConfig::new().where_group(WhereGroup::new(vec![ConditionSet::new().eq("id", 7)]));
        let stmt = StatementBuilder::new("customer").update(&assignments, &config).unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE `customer` SET `email` = 'a@example.org', `active` = 1 WHERE (`id` = 7 );"
        );
        assert!(!stmt.is_fetch());
    }

    #[test]
    fn test_update_raw_expression_is_verbatim() {
        let assignments = Assignments::new().set_raw("updated_at", "NOW()").set("note", "NOW()");
        let stmt = StatementBuilder::new("t")
            .update(&assignments, &QueryConfig::new())
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE `t` SET `updated_at` = NOW(), `note` = 'NOW()';"
        );
    }

    #[test]
    fn test_update_ignores_limit() {
        let stmt = StatementBuilder::new("t")
            .update(
                &Assignments::new().set("a", 1),
                &QueryConfig::new().limit(Limit::Rows(3)),
            )
            .unwrap();
        assert!(!stmt.sql().contains("LIMIT"));
    }

    #[test]
    fn test_update_membership_only() {
        let stmt = StatementBuilder::new("t")
            .update(
                &Assignments::new().set("a", ""),
                &QueryConfig::new().where_not_in(MembershipClause::options("id", [1, 2])),
            )
            .unwrap();
        assert_eq!(stmt.sql(), "UPDATE `t` SET `a` = NULL WHERE `id` NOT IN (1, 2);");
    }

    #[test]
    fn test_update_requires_assignments() {
        let err = StatementBuilder::new("t")
            .update(&Assignments::new(), &QueryConfig::new())
            .unwrap_err();
        assert_eq!(err, BuildError::EmptyFields(StatementKind::Update));
    }
}

use crate::{Db, Result, SelectOptions, Statement};

use tabula_core::{
    schema::{JoinToken, RoleKind, Source, SourceKind, SourceView},
    stmt::{Expr, Record, Value},
    Error,
};

use std::sync::Arc;

impl Db {
    /// A statement selecting the records reached from `record` through
    /// `role`.
    ///
    /// Roles walking a path of other roles are joined with inner joins and
    /// select only the columns of the last table.
    pub fn follow(&self, record: &Record, role: &str) -> Result<Statement> {
        let (source, role) = self.role_of(record, role)?;
        let target = self.schema().source(&role.target)?.clone();

        match &role.kind {
            RoleKind::Direct { join } => {
                let filter = Expr::and(
                    join.iter()
                        .map(|(owner_column, target_column)| {
                            owner_value(&source, record, owner_column, &role.name)
                                .map(|value| Expr::eq(target_column.as_str(), value))
                        })
                        .collect::<Result<Vec<_>>>()?,
                );
                let mut stmt = Statement::new(self.clone(), target);
                stmt.refine(SelectOptions::new().filter(filter))?;
                Ok(stmt)
            }
            RoleKind::Path { roles } => {
                let mut tokens = vec![];
                for name in roles {
                    tokens.push(JoinToken::ForceInner);
                    tokens.push(JoinToken::role(name.as_str()));
                }
                // a join row resolves the path from the member source owning the role
                let owner = self.schema().source(&role.owner)?.clone();
                let plan = self.schema().resolve_join(&owner.name, &tokens)?;

                let start = plan.alias.clone().unwrap_or_else(|| plan.table.clone());
                let filter = Expr::and(
                    owner
                        .primary_key
                        .iter()
                        .map(|column| {
                            owner_value(&source, record, column, &role.name)
                                .map(|value| Expr::eq(format!("{start}.{column}"), value))
                        })
                        .collect::<Result<Vec<_>>>()?,
                );
                let columns = vec![format!("{}.*", plan.last_qualifier())];

                let mut view = Source::clone(&target);
                view.kind = SourceKind::View(SourceView {
                    columns,
                    from: plan.into_table_ref(),
                    filter: Some(filter),
                    parents: vec![target.name.clone()],
                });
                Ok(Statement::new(self.clone(), Arc::new(view)))
            }
        }
    }

    /// Loads the records reached through `role` and stores them in
    /// `record` under the role name: a record or null for to-one roles, a
    /// list otherwise.
    pub async fn expand(&self, record: &mut Record, role: &str) -> Result<()> {
        let to_one = self.role_of(record, role)?.1.is_to_one();
        let rows = self.follow(record, role)?.all().await?;

        let value = if to_one {
            rows.into_iter().next().map(Value::Record).unwrap_or_default()
        } else {
            Value::from(rows)
        };
        record.insert(role, value);
        Ok(())
    }
}

fn owner_value(source: &Source, record: &Record, column: &str, role: &str) -> Result<Value> {
    record
        .get(column)
        .cloned()
        .ok_or_else(|| {
            Error::invalid_record(format!(
                "`{}` record has no `{column}` to follow role `{role}`",
                source.name
            ))
        })
}

mod delete;
mod insert;
mod update;

use crate::{Db, Result};

use tabula_core::{
    schema::{Role, Source},
    stmt::Record,
    Error,
};

use std::sync::Arc;

impl Db {
    fn writable_table<'a>(&self, source: &'a Source) -> Result<&'a str> {
        source.table_name().ok_or_else(|| {
            Error::invalid_statement(format!(
                "`{}` is a view; only tables can be written",
                source.name
            ))
        })
    }

    /// The role `role` of `record`'s source, with its target source.
    pub(crate) fn role_of(&self, record: &Record, role: &str) -> Result<(Arc<Source>, Role)> {
        let source = self.record_source(record)?;
        let found = self
            .schema()
            .lookup_join(&source, role)
            .cloned()
            .ok_or_else(|| Error::unknown_role(&source.name, role))?;
        Ok((source, found))
    }
}

/// Copies the owner's join columns into a component record.
fn inject_foreign_key(
    role: &Role,
    join: &[(String, String)],
    owner: &Record,
    child: &mut Record,
) -> Result<()> {
    for (owner_column, target_column) in join {
        let value = owner
            .get(owner_column)
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                Error::invalid_record(format!(
                    "`{}` has no value for `{owner_column}`, needed by role `{}`",
                    role.owner, role.name
                ))
            })?;
        child.insert(target_column.as_str(), value.clone());
    }
    Ok(())
}

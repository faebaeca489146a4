use super::{
    AssociationEnd, AutoColumn, ColumnHandler, ColumnType, Multiplicity, Role, RoleKind, Schema,
    Source, SourceKind, SourceTable, SourceView,
};
use crate::{
    stmt::{Expr, TableRef},
    Error, Result,
};

use std::sync::Arc;

/// Multiplicities of both ends of an association, parsed and checked.
struct Ends<'a> {
    a: &'a AssociationEnd,
    b: &'a AssociationEnd,
    mult_a: Multiplicity,
    mult_b: Multiplicity,
}

impl Schema {
    /// Registers a table source.
    pub fn declare_table<I, S>(
        &mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        primary_key: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return Err(Error::duplicate_source(name));
        }

        let primary_key: Vec<String> = primary_key.into_iter().map(Into::into).collect();
        if primary_key.is_empty() {
            return Err(Error::invalid_schema(format!(
                "table `{name}` needs at least one primary key column"
            )));
        }

        let source = Source::new(
            name.clone(),
            SourceKind::Table(SourceTable {
                table: table.into(),
            }),
            primary_key,
        );
        tracing::debug!(source = %name, "declared table");
        self.sources.insert(name, Arc::new(source));
        Ok(())
    }

    /// Registers a view derived from `parents`. The view inherits their
    /// handlers and roles, and its primary key is the first parent's.
    pub fn declare_view<C, P>(
        &mut self,
        name: impl Into<String>,
        columns: C,
        from: impl Into<TableRef>,
        filter: Option<Expr>,
        parents: P,
    ) -> Result<()>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return Err(Error::duplicate_source(name));
        }

        let parents: Vec<String> = parents.into_iter().map(Into::into).collect();
        for parent in &parents {
            self.source(parent)?;
        }

        let primary_key = match parents.first() {
            Some(parent) => self.source(parent)?.primary_key.clone(),
            None => vec![],
        };

        let source = Source::new(
            name.clone(),
            SourceKind::View(SourceView {
                columns: columns.into_iter().map(Into::into).collect(),
                from: from.into(),
                filter,
                parents,
            }),
            primary_key,
        );
        tracing::debug!(source = %name, "declared view");
        self.sources.insert(name, Arc::new(source));
        Ok(())
    }

    /// Declares an association between two sources.
    ///
    /// The role of each end is installed on the *other* end's source. When
    /// both ends are to-many, each role walks the `through` path of its end
    /// instead of joining directly.
    pub fn declare_association(&mut self, a: AssociationEnd, b: AssociationEnd) -> Result<()> {
        let ends = self.check_ends(&a, &b)?;
        let (role_a, role_b) = self.build_roles(&ends)?;
        self.install_roles(role_a, role_b);
        Ok(())
    }

    /// Declares a composition: `a` is the composite, `b` the component.
    ///
    /// Components are inserted and deleted along with their composite.
    pub fn declare_composition(&mut self, a: AssociationEnd, b: AssociationEnd) -> Result<()> {
        let ends = self.check_ends(&a, &b)?;

        if !ends.mult_a.is_to_one() {
            return Err(Error::invalid_schema(format!(
                "composite `{}` must have multiplicity at most 1, got `{}`",
                a.source, ends.mult_a
            )));
        }
        if !ends.mult_b.is_to_many() {
            return Err(Error::invalid_schema(format!(
                "component `{}` must have multiplicity greater than 1, got `{}`",
                b.source, ends.mult_b
            )));
        }
        if !b.has_role() {
            return Err(Error::invalid_schema(format!(
                "composition of `{}` into `{}` needs a component role",
                b.source, a.source
            )));
        }

        let component = self.source(&b.source)?;
        let shared_ownership_allowed = ends.mult_a.is_optional()
            && component.composite_of.iter().all(|(_, min)| *min == 0);
        if let Some((owner, _)) = component.composite_of.first() {
            if !shared_ownership_allowed {
                return Err(Error::invalid_schema(format!(
                    "`{}` is already a component of `{owner}`, cannot also be a component of `{}`",
                    b.source, a.source
                )));
            }
        }

        let (role_a, role_b) = self.build_roles(&ends)?;
        let role_b = role_b.map(|role| Role {
            composition: true,
            ..role
        });
        self.install_roles(role_a, role_b);

        let min_a = ends.mult_a.min;
        self.source_mut(&a.source)?.components.push(b.role.clone());
        self.source_mut(&b.source)?
            .composite_of
            .push((a.source.clone(), min_a));
        Ok(())
    }

    fn check_ends<'a>(&self, a: &'a AssociationEnd, b: &'a AssociationEnd) -> Result<Ends<'a>> {
        let mult_a: Multiplicity = a.multiplicity.parse()?;
        let mult_b: Multiplicity = b.multiplicity.parse()?;

        self.source(&a.source)?;
        self.source(&b.source)?;

        if !a.has_role() && !b.has_role() {
            return Err(Error::invalid_schema(format!(
                "association between `{}` and `{}` has no role",
                a.source, b.source
            )));
        }

        for (end, owner) in [(a, b), (b, a)] {
            if end.has_role() && self.source(&owner.source)?.roles.contains_key(&end.role) {
                return Err(Error::invalid_schema(format!(
                    "role `{}` is already declared on `{}`",
                    end.role, owner.source
                )));
            }
        }
        if a.source == b.source && a.role == b.role {
            return Err(Error::invalid_schema(format!(
                "both ends of the association on `{}` are named `{}`",
                a.source, a.role
            )));
        }

        Ok(Ends {
            a,
            b,
            mult_a,
            mult_b,
        })
    }

    fn build_roles(&self, ends: &Ends<'_>) -> Result<(Option<Role>, Option<Role>)> {
        let Ends {
            a,
            b,
            mult_a,
            mult_b,
        } = *ends;

        let (kind_a, kind_b) = if mult_a.is_to_many() && mult_b.is_to_many() {
            (self.path_kind(b, a)?, self.path_kind(a, b)?)
        } else {
            let (cols_a, cols_b) = self.join_columns(ends)?;
            (
                RoleKind::Direct {
                    join: cols_b.iter().cloned().zip(cols_a.iter().cloned()).collect(),
                },
                RoleKind::Direct {
                    join: cols_a.into_iter().zip(cols_b).collect(),
                },
            )
        };

        let role_a = a.has_role().then(|| Role {
            name: a.role.clone(),
            owner: b.source.clone(),
            target: a.source.clone(),
            multiplicity: mult_a,
            kind: kind_a,
            composition: false,
        });
        let role_b = b.has_role().then(|| Role {
            name: b.role.clone(),
            owner: a.source.clone(),
            target: b.source.clone(),
            multiplicity: mult_b,
            kind: kind_b,
            composition: false,
        });
        Ok((role_a, role_b))
    }

    /// Join columns of both ends, inferred from the to-one end's primary key
    /// when neither end lists them.
    fn join_columns(&self, ends: &Ends<'_>) -> Result<(Vec<String>, Vec<String>)> {
        let Ends { a, b, mult_a, .. } = *ends;

        let (cols_a, cols_b) = match (a.join.is_empty(), b.join.is_empty()) {
            (false, false) => (a.join.clone(), b.join.clone()),
            (false, true) => (a.join.clone(), a.join.clone()),
            (true, false) => (b.join.clone(), b.join.clone()),
            (true, true) => {
                let one = if mult_a.is_to_one() { a } else { b };
                let primary_key = self.source(&one.source)?.primary_key.clone();
                (primary_key.clone(), primary_key)
            }
        };

        if cols_a.len() != cols_b.len() {
            return Err(Error::invalid_schema(format!(
                "join columns of `{}` ({}) and `{}` ({}) differ in count",
                a.source,
                cols_a.join(", "),
                b.source,
                cols_b.join(", ")
            )));
        }
        if cols_a.is_empty() {
            return Err(Error::invalid_schema(format!(
                "association between `{}` and `{}` has no join columns",
                a.source, b.source
            )));
        }

        Ok((cols_a, cols_b))
    }

    /// Path of the role leading from `from.source` to `to.source`, checked by
    /// walking it through the roles declared so far.
    fn path_kind(&self, from: &AssociationEnd, to: &AssociationEnd) -> Result<RoleKind> {
        if !to.has_role() {
            return Ok(RoleKind::Path { roles: vec![] });
        }
        if to.through.is_empty() {
            return Err(Error::invalid_schema(format!(
                "many-to-many role `{}` needs the roles to go through",
                to.role
            )));
        }

        let mut current = Arc::clone(self.source(&from.source)?);
        for hop in &to.through {
            let role = self
                .lookup_join(&current, hop)
                .ok_or_else(|| Error::unknown_role(&current.name, hop))?;
            if role.join().is_none() {
                return Err(Error::invalid_schema(format!(
                    "role `{}` cannot go through many-to-many role `{hop}`",
                    to.role
                )));
            }
            let target = role.target.clone();
            current = Arc::clone(self.source(&target)?);
        }

        if current.name != to.source {
            return Err(Error::invalid_schema(format!(
                "roles `{}` lead from `{}` to `{}`, not to `{}`",
                to.through.join(", "),
                from.source,
                current.name,
                to.source
            )));
        }

        Ok(RoleKind::Path {
            roles: to.through.clone(),
        })
    }

    fn install_roles(&mut self, role_a: Option<Role>, role_b: Option<Role>) {
        for role in [role_a, role_b].into_iter().flatten() {
            tracing::debug!(
                owner = %role.owner,
                role = %role.name,
                target = %role.target,
                multiplicity = %role.multiplicity,
                "declared role"
            );
            if let Some(owner) = self.sources.get_mut(&role.owner) {
                Arc::make_mut(owner).roles.insert(role.name.clone(), role);
            }
        }
    }

    /// Registers `handler` under `name` for `source.column`.
    ///
    /// Registering the same handler twice is a no-op; registering a different
    /// one fails unless done through [`replace_column_handler`].
    ///
    /// [`replace_column_handler`]: Schema::replace_column_handler
    pub fn register_column_handler(
        &mut self,
        source: &str,
        column: &str,
        name: &str,
        handler: ColumnHandler,
    ) -> Result<()> {
        if let Some(existing) = self.source(source)?.handler(column, name) {
            if existing.same_as(&handler) {
                return Ok(());
            }
            return Err(Error::duplicate_handler(source, column, name));
        }
        self.insert_handler(source, column, name, handler)
    }

    /// Registers `handler`, replacing any previous handler of the same name.
    pub fn replace_column_handler(
        &mut self,
        source: &str,
        column: &str,
        name: &str,
        handler: ColumnHandler,
    ) -> Result<()> {
        self.insert_handler(source, column, name, handler)
    }

    fn insert_handler(
        &mut self,
        source: &str,
        column: &str,
        name: &str,
        handler: ColumnHandler,
    ) -> Result<()> {
        self.source_mut(source)?
            .handlers
            .entry(column.to_string())
            .or_default()
            .insert(name.to_string(), handler);
        Ok(())
    }

    pub fn define_column_type(&mut self, column_type: ColumnType) -> Result<()> {
        if self.column_types.contains_key(&column_type.name) {
            return Err(Error::invalid_schema(format!(
                "column type `{}` is already defined",
                column_type.name
            )));
        }
        self.column_types
            .insert(column_type.name.clone(), column_type);
        Ok(())
    }

    /// Registers every handler of the column type `type_name` on `columns`.
    pub fn apply_column_type<I, S>(&mut self, source: &str, type_name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let column_type = self
            .column_types
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::invalid_schema(format!("unknown column type `{type_name}`")))?;

        let columns: Vec<S> = columns.into_iter().collect();
        let target = self.source(source)?;
        for column in &columns {
            for (name, handler) in &column_type.handlers {
                match target.handler(column.as_ref(), name) {
                    Some(existing) if !existing.same_as(handler) => {
                        return Err(Error::duplicate_handler(source, column.as_ref(), name));
                    }
                    _ => {}
                }
            }
        }

        for column in &columns {
            for (name, handler) in &column_type.handlers {
                self.insert_handler(source, column.as_ref(), name, handler.clone())?;
            }
        }
        Ok(())
    }

    /// Columns never included in the SET clause of an update.
    pub fn declare_no_update_columns<I, S>(&mut self, source: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_mut(source)?
            .no_update_columns
            .extend(columns.into_iter().map(Into::into));
        Ok(())
    }

    /// Columns stripped from every insert and update.
    pub fn declare_transient_columns<I, S>(&mut self, source: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_mut(source)?
            .transient_columns
            .extend(columns.into_iter().map(Into::into));
        Ok(())
    }

    /// A column computed when a record is inserted.
    pub fn declare_auto_insert_column(
        &mut self,
        source: &str,
        column: &str,
        compute: AutoColumn,
    ) -> Result<()> {
        self.source_mut(source)?
            .auto_insert
            .insert(column.to_string(), compute);
        Ok(())
    }

    /// A column computed when a record is inserted or updated.
    pub fn declare_auto_update_column(
        &mut self,
        source: &str,
        column: &str,
        compute: AutoColumn,
    ) -> Result<()> {
        self.source_mut(source)?
            .auto_update
            .insert(column.to_string(), compute);
        Ok(())
    }
}

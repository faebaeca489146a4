use super::{Role, RoleKind, Schema, Source, SourceKind, SourceView};
use crate::{
    stmt::{Join, JoinKind, TableRef, TableWithJoins},
    Error, Result,
};

/// One element of a role chain given to [`Schema::resolve_join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinToken {
    /// Follow a role, optionally aliasing the joined table
    Role { name: String, alias: Option<String> },

    /// Join the next role with an inner join
    ForceInner,

    /// Join the next role with a left outer join
    ForceLeft,
}

impl JoinToken {
    pub const INNER: &'static str = "<=>";
    pub const LEFT: &'static str = "=>";

    pub fn role(name: impl Into<String>) -> JoinToken {
        JoinToken::Role {
            name: name.into(),
            alias: None,
        }
    }

    /// Parses a chain written as strings.
    ///
    /// `"<=>"` and `"=>"` force the kind of the following join, and may also
    /// prefix the role directly (`"=>employee"`). `"role|alias"` aliases the
    /// joined table.
    pub fn parse_all<I, S>(tokens: I) -> Vec<JoinToken>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = vec![];
        for token in tokens {
            let mut rest = token.as_ref().trim();
            if let Some(role) = rest.strip_prefix(Self::INNER) {
                out.push(JoinToken::ForceInner);
                rest = role;
            } else if let Some(role) = rest.strip_prefix(Self::LEFT) {
                out.push(JoinToken::ForceLeft);
                rest = role;
            }

            let rest = rest.trim();
            if rest.is_empty() {
                continue;
            }
            out.push(match rest.split_once('|') {
                Some((name, alias)) => JoinToken::Role {
                    name: name.to_string(),
                    alias: Some(alias.to_string()),
                },
                None => JoinToken::role(rest),
            });
        }
        out
    }
}

impl From<&str> for JoinToken {
    fn from(src: &str) -> JoinToken {
        match src {
            JoinToken::INNER => JoinToken::ForceInner,
            JoinToken::LEFT => JoinToken::ForceLeft,
            _ => JoinToken::parse_all([src])
                .pop()
                .unwrap_or_else(|| JoinToken::role(src)),
        }
    }
}

/// Output of the join resolver: the starting table followed by one step per
/// joined table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    pub start: String,
    pub table: String,
    pub alias: Option<String>,
    pub steps: Vec<JoinStep>,

    /// Every source visited, in join order, starting with `start`
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinStep {
    /// Role followed to reach this table
    pub role: String,

    pub source: String,
    pub table: String,
    pub alias: Option<String>,
    pub kind: JoinKind,

    /// Qualified `(left column, right column)` equalities
    pub on: Vec<(String, String)>,
}

impl JoinPlan {
    /// Name used to qualify columns of the last joined table.
    pub fn last_qualifier(&self) -> &str {
        match self.steps.last() {
            Some(step) => step.alias.as_deref().unwrap_or(&step.table),
            None => self.alias.as_deref().unwrap_or(&self.table),
        }
    }

    pub fn into_table_ref(self) -> TableRef {
        TableRef::Join(TableWithJoins {
            table: self.table,
            alias: self.alias,
            joins: self
                .steps
                .into_iter()
                .map(|step| Join {
                    table: step.table,
                    alias: step.alias,
                    kind: step.kind,
                    on: step.on,
                })
                .collect(),
        })
    }
}

/// A table visited while walking the chain.
struct Visited<'a> {
    source: &'a Source,
    qualifier: String,
}

impl Schema {
    /// Turns a chain of role names into a join plan, starting at `start`.
    ///
    /// Each role is looked up on the most recently joined table first, then
    /// on earlier ones. Unless forced, a role with a zero minimum
    /// multiplicity is a left join, and once a left join is emitted every
    /// later join is left as well.
    pub fn resolve_join(&self, start: &str, tokens: &[JoinToken]) -> Result<JoinPlan> {
        self.walk_roles(start, tokens)
            .map_err(|err| err.context(format!("resolving joins from `{start}`")))
    }

    fn walk_roles(&self, start: &str, tokens: &[JoinToken]) -> Result<JoinPlan> {
        let source: &Source = self.source(start)?;
        let table = joinable_table(source)?.to_string();
        let qualifier = table.clone();

        let mut plan = JoinPlan {
            start: start.to_string(),
            table,
            alias: None,
            steps: vec![],
            parents: vec![start.to_string()],
        };
        let mut visited = vec![Visited { source, qualifier }];
        let mut forced = None;
        let mut left_emitted = false;

        for token in tokens {
            let (name, alias) = match token {
                JoinToken::ForceInner => {
                    forced = Some(JoinKind::Inner);
                    continue;
                }
                JoinToken::ForceLeft => {
                    forced = Some(JoinKind::Left);
                    continue;
                }
                JoinToken::Role { name, alias } => (name, alias),
            };

            let (from, role) = visited
                .iter()
                .enumerate()
                .rev()
                .find_map(|(i, visited)| Some((i, self.lookup_join(visited.source, name)?)))
                .ok_or_else(|| {
                    let last = visited.last().map(|v| v.source.name.as_str());
                    Error::unknown_role(last.unwrap_or(start), name)
                })?;

            let hops = self.expand_role(role)?;
            let last_hop = hops.len() - 1;
            let mut from = from;

            for (i, hop) in hops.into_iter().enumerate() {
                let kind = match forced {
                    Some(kind) => kind,
                    None if hop.multiplicity.is_optional() || left_emitted => JoinKind::Left,
                    None => JoinKind::Inner,
                };
                left_emitted |= kind.is_left();

                let target: &Source = self.source(&hop.target)?;
                let table = joinable_table(target)?.to_string();
                let alias = if i == last_hop { alias.clone() } else { None };
                let qualifier = alias.clone().unwrap_or_else(|| table.clone());

                if visited.iter().any(|v| v.qualifier == qualifier) {
                    return Err(Error::invalid_statement(format!(
                        "table `{qualifier}` appears twice in the join chain; alias it with `{}|alias`",
                        hop.name
                    )));
                }

                let join = hop.join().unwrap_or_default();
                let on = join
                    .iter()
                    .map(|(left, right)| {
                        (
                            format!("{}.{left}", visited[from].qualifier),
                            format!("{qualifier}.{right}"),
                        )
                    })
                    .collect();

                plan.steps.push(JoinStep {
                    role: hop.name.clone(),
                    source: target.name.clone(),
                    table,
                    alias,
                    kind,
                    on,
                });
                if !plan.parents.contains(&target.name) {
                    plan.parents.push(target.name.clone());
                }
                visited.push(Visited {
                    source: target,
                    qualifier,
                });
                from = visited.len() - 1;
            }
            forced = None;
        }

        tracing::trace!(start, steps = plan.steps.len(), "resolved join");
        Ok(plan)
    }

    /// The direct roles a role stands for: itself, or the hops of its path.
    fn expand_role<'a>(&'a self, role: &'a Role) -> Result<Vec<&'a Role>> {
        match &role.kind {
            RoleKind::Direct { .. } => Ok(vec![role]),
            RoleKind::Path { roles } => {
                let mut hops = vec![];
                let mut current = self.source(&role.owner)?;
                for name in roles {
                    let hop = self
                        .lookup_join(current, name)
                        .ok_or_else(|| Error::unknown_role(&current.name, name))?;
                    current = self.source(&hop.target)?;
                    hops.push(hop);
                }
                if hops.is_empty() {
                    return Err(Error::invalid_statement(format!(
                        "role `{}` of `{}` is not navigable",
                        role.name, role.owner
                    )));
                }
                Ok(hops)
            }
        }
    }

    /// A view over the tables reached by following `tokens` from `start`.
    ///
    /// The view selects every column, inherits from every joined source and
    /// takes its primary key from the last joined table.
    pub fn join_source(&self, start: &str, tokens: &[JoinToken]) -> Result<Source> {
        let plan = self.resolve_join(start, tokens)?;

        let last = plan.steps.last().map_or(start, |step| step.source.as_str());
        let primary_key = self.source(last)?.primary_key.clone();

        let mut name = start.to_string();
        for step in &plan.steps {
            name.push_str(JoinToken::LEFT);
            name.push_str(&step.role);
        }

        let parents = plan.parents.clone();
        Ok(Source::new(
            name,
            SourceKind::View(SourceView {
                columns: vec![],
                from: plan.into_table_ref(),
                filter: None,
                parents,
            }),
            primary_key,
        ))
    }
}

fn joinable_table(source: &Source) -> Result<&str> {
    source.table_name().ok_or_else(|| {
        Error::invalid_statement(format!(
            "view `{}` cannot take part in a role join",
            source.name
        ))
    })
}

//! Render a [`Selection`] as parameterised SQL. Literals become `$n` placeholders and are returned,
//! in placeholder order, alongside the statement.

use crate::ast::{ComparisonOperator, Expr, Literal, OrderDirection, PathExpr, Predicate, Selection};
use crate::error::SqlGenerationError;

pub enum SqlExpr {
    Sql(String),
    Argument(Literal),
}

fn quote(identifier: &str) -> String { format!(r#""{}""#, identifier.replace('"', "\"\"")) }

#[derive(Default)]
pub struct SqlBuilder {
    expressions: Vec<SqlExpr>,
    /// Table name used to qualify root columns once joins make bare names ambiguous
    qualifier: Option<String>,
    /// Join paths already introduced, in declaration order
    aliases: Vec<PathExpr>,
}

impl SqlBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn qualified(table: impl Into<String>) -> Self { Self { qualifier: Some(table.into()), ..Self::default() } }

    pub fn push(&mut self, expr: SqlExpr) { self.expressions.push(expr); }

    pub fn arg(&mut self, arg: Literal) { self.push(SqlExpr::Argument(arg)); }

    pub fn sql(&mut self, s: impl AsRef<str>) { self.push(SqlExpr::Sql(s.as_ref().to_owned())); }

    /// Declare a join alias so that paths through it can be rendered.
    pub fn alias(&mut self, path: PathExpr) { self.aliases.push(path); }

    pub fn build(self) -> (String, Vec<Literal>) {
        let mut counter = 1;
        let mut sql = String::new();
        let mut args = Vec::new();

        for expr in self.expressions {
            match expr {
                SqlExpr::Argument(arg) => {
                    sql += &format!("${}", counter);
                    args.push(arg);
                    counter += 1;
                }
                SqlExpr::Sql(s) => {
                    sql += &s;
                }
            }
        }

        (sql, args)
    }

    fn owner_alias(&self, owner: &PathExpr) -> Result<Option<String>, SqlGenerationError> {
        if owner.is_root() {
            return Ok(self.qualifier.clone());
        }
        if self.aliases.contains(owner) {
            Ok(Some(owner.to_string()))
        } else {
            Err(SqlGenerationError::UnboundPath(owner.clone()))
        }
    }

    pub fn path(&mut self, path: &PathExpr) -> Result<(), SqlGenerationError> {
        match self.owner_alias(&path.parent())? {
            Some(alias) => self.sql(format!("{}.{}", quote(&alias), quote(path.property()))),
            None => self.sql(quote(path.property())),
        }
        Ok(())
    }

    pub fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Null => self.sql("NULL"),
            other => self.arg(other.clone()),
        }
    }

    // --- AST flattening ---
    pub fn expr(&mut self, expr: &Expr) -> Result<(), SqlGenerationError> {
        match expr {
            Expr::Literal(lit) => self.literal(lit),
            Expr::Path(path) => self.path(path)?,
            Expr::Upper(inner) => {
                self.sql("UPPER(");
                self.expr(inner)?;
                self.sql(")");
            }
            Expr::TimeOfDay(inner) => {
                self.sql("CAST((");
                self.expr(inner)?;
                self.sql(" AT TIME ZONE 'UTC') AS TIME)");
            }
            Expr::List(exprs) => {
                self.sql("(");
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        self.sql(", ");
                    }
                    match expr {
                        Expr::Literal(lit) => self.literal(lit),
                        _ => return Err(SqlGenerationError::UnsupportedExpression("Only literal expressions are supported in IN lists")),
                    }
                }
                self.sql(")");
            }
        }
        Ok(())
    }

    pub fn predicate(&mut self, predicate: &Predicate) -> Result<(), SqlGenerationError> {
        match predicate {
            Predicate::Comparison { operator: ComparisonOperator::In, right, .. } if matches!(right.as_ref(), Expr::List(items) if items.is_empty()) => {
                // `x IN ()` is not valid SQL, and an empty candidate set matches nothing
                self.sql("FALSE");
            }
            Predicate::Comparison { left, operator, right } => {
                self.expr(left)?;
                self.sql(format!(" {} ", operator));
                self.expr(right)?;
            }
            Predicate::Like { expr, pattern } => {
                self.expr(expr)?;
                self.sql(" LIKE ");
                self.arg(Literal::String(pattern.clone()));
            }
            Predicate::Between { expr, low, high } => {
                self.expr(expr)?;
                self.sql(" BETWEEN ");
                self.expr(low)?;
                self.sql(" AND ");
                self.expr(high)?;
            }
            Predicate::And(left, right) => {
                self.predicate(left)?;
                self.sql(" AND ");
                self.predicate(right)?;
            }
            Predicate::Or(left, right) => {
                self.sql("(");
                self.predicate(left)?;
                self.sql(" OR ");
                self.predicate(right)?;
                self.sql(")");
            }
            Predicate::Not(pred) => {
                self.sql("NOT (");
                self.predicate(pred)?;
                self.sql(")");
            }
            Predicate::IsNull(expr) => {
                self.expr(expr)?;
                self.sql(" IS NULL");
            }
            Predicate::True => self.sql("TRUE"),
            Predicate::False => self.sql("FALSE"),
        }
        Ok(())
    }

    /// Render `FROM` and the joins of a selection, registering each join alias.
    fn from_clause(&mut self, table: &str, selection: &Selection) -> Result<(), SqlGenerationError> {
        self.sql(format!(" FROM {}", quote(table)));
        for join in &selection.joins {
            let parent = join.path.parent();
            let parent_alias = if parent.is_root() {
                table.to_string()
            } else if self.aliases.contains(&parent) {
                parent.to_string()
            } else {
                return Err(SqlGenerationError::OrphanJoin(join.path.clone()));
            };
            let alias = join.path.to_string();
            self.sql(format!(
                " INNER JOIN {} AS {} ON {}.{} = {}.{}",
                quote(&join.collection),
                quote(&alias),
                quote(&parent_alias),
                quote(&join.local_key),
                quote(&alias),
                quote(&join.foreign_key)
            ));
            self.alias(join.path.clone());
        }
        Ok(())
    }
}

/// Render only the boolean condition of a predicate, with unqualified root columns.
pub fn generate_where_clause(predicate: &Predicate) -> Result<(String, Vec<Literal>), SqlGenerationError> {
    let mut builder = SqlBuilder::new();
    builder.predicate(predicate)?;
    Ok(builder.build())
}

/// Render a full `SELECT` for the selection. Rows are de-duplicated when joins are present,
/// since a to-many join yields one row per matching related record.
pub fn generate_selection_sql(table: &str, selection: &Selection) -> Result<(String, Vec<Literal>), SqlGenerationError> {
    let mut builder = SqlBuilder::qualified(table);
    let distinct = if selection.joins.is_empty() { "" } else { "DISTINCT " };
    builder.sql(format!("SELECT {}{}.*", distinct, quote(table)));
    builder.from_clause(table, selection)?;
    builder.sql(" WHERE ");
    builder.predicate(&selection.predicate)?;

    if let Some(order_by) = selection.order_by.as_ref().filter(|o| !o.is_empty()) {
        builder.sql(" ORDER BY ");
        for (i, item) in order_by.iter().enumerate() {
            if i > 0 {
                builder.sql(", ");
            }
            builder.path(&item.path)?;
            builder.sql(match item.direction {
                OrderDirection::Asc => " ASC",
                OrderDirection::Desc => " DESC",
            });
        }
    }
    if let Some(limit) = selection.limit {
        builder.sql(format!(" LIMIT {}", limit));
    }
    if let Some(offset) = selection.offset {
        builder.sql(format!(" OFFSET {}", offset));
    }
    Ok(builder.build())
}

/// Render a row count for the selection, ignoring its order, limit and offset.
pub fn generate_count_sql(table: &str, selection: &Selection) -> Result<(String, Vec<Literal>), SqlGenerationError> {
    let mut builder = SqlBuilder::qualified(table);
    builder.sql(format!("SELECT COUNT(*) FROM (SELECT DISTINCT {}.*", quote(table)));
    builder.from_clause(table, selection)?;
    builder.sql(" WHERE ");
    builder.predicate(&selection.predicate)?;
    builder.sql(r#") AS "matches""#);
    Ok(builder.build())
}

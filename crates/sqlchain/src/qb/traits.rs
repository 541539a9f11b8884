//! Trait definitions for query builders.

use crate::error::{BuildError, BuildResult};
use crate::qb::clause::{identifier, parenthesize};
use crate::qb::expr::Expr;
use crate::qb::param::Value;
use crate::qb::placeholder::PlaceholderFormat;
use serde::Serialize;
use std::fmt;
use tokio_postgres::types::ToSql;

/// Anything that compiles to an expression node with generic `?` markers.
///
/// Statements, predicates and aliases all implement this; it is also the
/// bound for sub-statements embedded in equality or assignment values.
pub trait ToExpr: fmt::Debug + Send + Sync {
    /// Compile to a fragment. Never mutates `self`.
    fn to_expr(&self) -> BuildResult<Expr>;
}

impl ToExpr for Expr {
    fn to_expr(&self) -> BuildResult<Expr> {
        Ok(self.clone())
    }
}

/// Conversion accepted by fragment mutators (`column`, `from`, `join`, `prefix`, ...).
///
/// Strings are validated to contain no markers; sub-statements are wrapped
/// in parentheses; a `BuildResult<Expr>` passes its error through so that
/// `Expr::new(..)` can be handed over without `?`.
pub trait IntoExpr {
    fn into_expr(self) -> BuildResult<Expr>;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> BuildResult<Expr> {
        Ok(self)
    }
}

impl IntoExpr for BuildResult<Expr> {
    fn into_expr(self) -> BuildResult<Expr> {
        self
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> BuildResult<Expr> {
        Expr::raw(self)
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> BuildResult<Expr> {
        Expr::raw(self)
    }
}

/// `(<sub-statement>) AS <alias>`.
///
/// # Example
/// ```ignore
/// let sub = sqlchain::select(["id"]).from("tickets");
/// let qb = sqlchain::select(["a"]).column(Alias::new(sub, "subq"));
/// ```
#[derive(Clone, Debug)]
pub struct Alias<T> {
    inner: T,
    alias: String,
}

impl<T: ToExpr> Alias<T> {
    pub fn new(inner: T, alias: impl Into<String>) -> Self {
        Self {
            inner,
            alias: alias.into(),
        }
    }
}

impl<T: ToExpr> ToExpr for Alias<T> {
    fn to_expr(&self) -> BuildResult<Expr> {
        identifier(&self.alias)?;
        Ok(parenthesize(self.inner.to_expr()?, Some(&self.alias)))
    }
}

impl<T: ToExpr> IntoExpr for Alias<T> {
    fn into_expr(self) -> BuildResult<Expr> {
        self.to_expr()
    }
}

/// Final output: SQL text in the target placeholder format plus its arguments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Compiled {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Compiled {
    /// Get parameters as references compatible with tokio-postgres.
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    /// Split into SQL text and arguments.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// Base trait for all statement builders.
pub trait SqlQb: ToExpr {
    /// Placeholder format configured on this builder.
    fn format(&self) -> PlaceholderFormat;

    /// Compile with the builder's placeholder format.
    fn build(&self) -> BuildResult<Compiled> {
        self.build_with(self.format())
    }

    /// Compile with an explicit placeholder format.
    fn build_with(&self, format: PlaceholderFormat) -> BuildResult<Compiled> {
        let expr = self.to_expr().inspect_err(log_failure)?;
        let (sql, args) = expr.into_parts();
        let compiled = Compiled {
            sql: format.replace(&sql),
            args,
        };
        log_built(format, &compiled);
        Ok(compiled)
    }

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> BuildResult<String> {
        self.build().map(|c| c.sql)
    }
}

/// Maximum SQL length (bytes) included in log events.
#[cfg(feature = "tracing")]
const MAX_LOGGED_SQL: usize = 512;

#[cfg(feature = "tracing")]
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(feature = "tracing")]
fn log_built(format: PlaceholderFormat, compiled: &Compiled) {
    tracing::trace!(
        target: "sqlchain.sql",
        %format,
        sql = truncate_sql_bytes(&compiled.sql, MAX_LOGGED_SQL),
        args = compiled.args.len(),
        "built statement"
    );
}

#[cfg(not(feature = "tracing"))]
fn log_built(_format: PlaceholderFormat, _compiled: &Compiled) {}

#[cfg(feature = "tracing")]
fn log_failure(err: &BuildError) {
    tracing::debug!(target: "sqlchain.sql", error = %err, "statement build failed");
}

#[cfg(not(feature = "tracing"))]
fn log_failure(_err: &BuildError) {}

//! DELETE statement builder.

use crate::error::{BuildError, BuildResult};
use crate::qb::clause::{Slot, SqlWriter, identifier, push_slot, record};
use crate::qb::expr::Expr;
use crate::qb::param::Value;
use crate::qb::placeholder::PlaceholderFormat;
use crate::qb::pred::{IntoPred, Pred, write_group};
use crate::qb::traits::{IntoExpr, SqlQb, ToExpr};
use std::sync::Arc;

/// Immutable DELETE builder.
///
/// An unset WHERE clause is omitted, so a bare `delete("t")` removes every
/// row.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct DeleteQb {
    format: PlaceholderFormat,
    prefixes: Slot<Expr>,
    /// Target table
    table: Arc<str>,
    /// WHERE predicates, ANDed
    where_preds: Slot<Pred>,
    order_by: Slot<Expr>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Slot<Expr>,
    build_error: Option<BuildError>,
}

impl DeleteQb {
    /// Create a DELETE builder for `table`.
    pub fn new(table: &str) -> Self {
        let mut qb = Self {
            table: Arc::from(table),
            ..Self::default()
        };
        record(&mut qb.build_error, identifier(table));
        qb
    }

    /// Set the placeholder format used by `build()`.
    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a fragment before DELETE.
    pub fn prefix(mut self, sql: impl IntoExpr) -> Self {
        if let Some(expr) = record(&mut self.build_error, sql.into_expr()) {
            push_slot(&mut self.prefixes, expr);
        }
        self
    }

    /// Add a fragment with `?` placeholders before DELETE.
    pub fn prefix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.prefix(Expr::new(sql, args))
    }

    /// Add a fragment after the last clause.
    pub fn suffix(mut self, sql: impl IntoExpr) -> Self {
        if let Some(expr) = record(&mut self.build_error, sql.into_expr()) {
            push_slot(&mut self.suffixes, expr);
        }
        self
    }

    /// Add a fragment with `?` placeholders after the last clause.
    pub fn suffix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.suffix(Expr::new(sql, args))
    }

    /// Add a WHERE predicate. Repeated calls are ANDed.
    pub fn where_(mut self, pred: impl IntoPred) -> Self {
        if let Some(pred) = record(&mut self.build_error, pred.into_pred()) {
            push_slot(&mut self.where_preds, pred);
        }
        self
    }

    /// Add a WHERE fragment with `?` placeholders.
    pub fn where_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.where_(Expr::new(sql, args))
    }

    /// Append ORDER BY items.
    pub fn order_by<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            if let Some(expr) = record(&mut self.build_error, Expr::raw(item)) {
                push_slot(&mut self.order_by, expr);
            }
        }
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }
}

impl ToExpr for DeleteQb {
    fn to_expr(&self) -> BuildResult<Expr> {
        if let Some(ref err) = self.build_error {
            return Err(err.clone());
        }
        if self.table.is_empty() {
            return Err(BuildError::incomplete("DELETE requires a table"));
        }

        let mut w = SqlWriter::new();
        w.bare_list(&self.prefixes);
        w.keyword("DELETE FROM ").push(&self.table);

        if !self.where_preds.is_empty() {
            w.keyword("WHERE ");
            write_group(&self.where_preds, " AND ", "", &mut w)?;
        }

        w.clause_list("ORDER BY", &self.order_by, ", ");
        w.clause_u64("LIMIT", self.limit);
        w.clause_u64("OFFSET", self.offset);
        w.bare_list(&self.suffixes);
        Ok(w.finish())
    }
}

impl SqlQb for DeleteQb {
    fn format(&self) -> PlaceholderFormat {
        self.format
    }
}

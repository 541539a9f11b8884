//! SELECT statement builder.

use crate::error::{BuildError, BuildResult};
use crate::qb::clause::{Slot, SqlWriter, parenthesize, push_slot, record, with_keyword};
use crate::qb::expr::Expr;
use crate::qb::param::Value;
use crate::qb::placeholder::PlaceholderFormat;
use crate::qb::pred::{IntoPred, Pred, write_group};
use crate::qb::traits::{Alias, IntoExpr, SqlQb, ToExpr};
use std::sync::Arc;

/// Immutable SELECT builder.
///
/// Every mutator consumes the builder and returns a new one. Clause slots are
/// reference-counted, so cloning a base builder is cheap and branches derived
/// from it never observe each other's changes.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SelectQb {
    format: PlaceholderFormat,
    /// Fragments emitted before SELECT
    prefixes: Slot<Expr>,
    distinct: bool,
    /// Result columns
    columns: Slot<Expr>,
    /// FROM source
    from: Option<Arc<Expr>>,
    joins: Slot<Expr>,
    /// WHERE predicates, ANDed
    where_preds: Slot<Pred>,
    group_by: Slot<Expr>,
    /// HAVING predicates, ANDed
    having_preds: Slot<Pred>,
    order_by: Slot<Expr>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Fragments emitted after everything else
    suffixes: Slot<Expr>,
    /// First error raised by a mutator
    build_error: Option<BuildError>,
}

impl SelectQb {
    /// Create an empty SELECT builder (no columns yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder format used by `build()`.
    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.format = format;
        self
    }

    fn push_fragment(
        mut self,
        slot: fn(&mut Self) -> &mut Slot<Expr>,
        expr: BuildResult<Expr>,
    ) -> Self {
        if let Some(expr) = record(&mut self.build_error, expr) {
            push_slot(slot(&mut self), expr);
        }
        self
    }

    // ==================== Prefix / suffix ====================

    /// Add a fragment before SELECT (e.g. a CTE).
    pub fn prefix(self, sql: impl IntoExpr) -> Self {
        self.push_fragment(|s| &mut s.prefixes, sql.into_expr())
    }

    /// Add a fragment with `?` placeholders before SELECT.
    pub fn prefix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.prefix(Expr::new(sql, args))
    }

    /// Add a fragment after the last clause.
    pub fn suffix(self, sql: impl IntoExpr) -> Self {
        self.push_fragment(|s| &mut s.suffixes, sql.into_expr())
    }

    /// Add a fragment with `?` placeholders after the last clause.
    pub fn suffix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.suffix(Expr::new(sql, args))
    }

    // ==================== SELECT columns ====================

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append plain result columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column: String = column.into();
            self = self.column(column);
        }
        self
    }

    /// Append one result column: a name, an [`Expr`], a predicate, an
    /// [`Alias`] or a parenthesized sub-select.
    pub fn column(self, column: impl IntoExpr) -> Self {
        self.push_fragment(|s| &mut s.columns, column.into_expr())
    }

    /// Append a result column with `?` placeholders.
    pub fn column_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.column(Expr::new(sql, args))
    }

    // ==================== FROM ====================

    /// Set the FROM source (table name or fragment).
    pub fn from(mut self, from: impl IntoExpr) -> Self {
        if let Some(expr) = record(&mut self.build_error, from.into_expr()) {
            self.from = Some(Arc::new(expr));
        }
        self
    }

    /// Set the FROM source to `(<sub-select>) AS alias`.
    pub fn from_select(self, sub: SelectQb, alias: &str) -> Self {
        self.from(Alias::new(sub, alias))
    }

    // ==================== JOIN ====================

    fn join_with(self, keyword: &str, join: impl IntoExpr) -> Self {
        let expr = join.into_expr().map(|e| with_keyword(keyword, e));
        self.push_fragment(|s| &mut s.joins, expr)
    }

    /// Add a complete join clause as written.
    pub fn join_clause(self, join: impl IntoExpr) -> Self {
        self.push_fragment(|s| &mut s.joins, join.into_expr())
    }

    /// Add `JOIN <join>`.
    pub fn join(self, join: impl IntoExpr) -> Self {
        self.join_with("JOIN", join)
    }

    /// Add `INNER JOIN <join>`.
    pub fn inner_join(self, join: impl IntoExpr) -> Self {
        self.join_with("INNER JOIN", join)
    }

    /// Add `LEFT JOIN <join>`.
    pub fn left_join(self, join: impl IntoExpr) -> Self {
        self.join_with("LEFT JOIN", join)
    }

    /// Add `RIGHT JOIN <join>`.
    pub fn right_join(self, join: impl IntoExpr) -> Self {
        self.join_with("RIGHT JOIN", join)
    }

    /// Add `CROSS JOIN <join>`.
    pub fn cross_join(self, join: impl IntoExpr) -> Self {
        self.join_with("CROSS JOIN", join)
    }

    // ==================== WHERE / HAVING ====================

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

    /// Add a HAVING predicate. Repeated calls are ANDed.
    pub fn having(mut self, pred: impl IntoPred) -> Self {
        if let Some(pred) = record(&mut self.build_error, pred.into_pred()) {
            push_slot(&mut self.having_preds, pred);
        }
        self
    }

    /// Add a HAVING fragment with `?` placeholders.
    pub fn having_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.having(Expr::new(sql, args))
    }

    // ==================== Grouping & ordering ====================

    /// Append GROUP BY items.
    pub fn group_by<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self = self.push_fragment(|s| &mut s.group_by, Expr::raw(item));
        }
        self
    }

    /// Append ORDER BY items.
    pub fn order_by<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self = self.push_fragment(|s| &mut s.order_by, Expr::raw(item));
        }
        self
    }

    /// Append an ORDER BY item that carries arguments.
    pub fn order_by_clause(self, clause: impl IntoExpr) -> Self {
        self.push_fragment(|s| &mut s.order_by, clause.into_expr())
    }

    // ==================== Pagination ====================

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Drop LIMIT.
    pub fn remove_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Drop OFFSET.
    pub fn remove_offset(mut self) -> Self {
        self.offset = None;
        self
    }
}

impl ToExpr for SelectQb {
    fn to_expr(&self) -> BuildResult<Expr> {
        if let Some(ref err) = self.build_error {
            return Err(err.clone());
        }
        if self.columns.is_empty() {
            return Err(BuildError::incomplete(
                "SELECT requires at least one result column",
            ));
        }

        let mut w = SqlWriter::new();
        w.bare_list(&self.prefixes);

        w.keyword("SELECT");
        if self.distinct {
            w.push(" DISTINCT");
        }
        w.push(" ").push_joined(&self.columns, ", ");

        if let Some(ref from) = self.from {
            w.keyword("FROM").push(" ").push_expr(from);
        }

        w.bare_list(&self.joins);

        if !self.where_preds.is_empty() {
            w.keyword("WHERE").push(" ");
            write_group(&self.where_preds, " AND ", "", &mut w)?;
        }

        w.clause_list("GROUP BY", &self.group_by, ", ");

        if !self.having_preds.is_empty() {
            w.keyword("HAVING").push(" ");
            write_group(&self.having_preds, " AND ", "", &mut w)?;
        }

        w.clause_list("ORDER BY", &self.order_by, ", ");
        w.clause_u64("LIMIT", self.limit);
        w.clause_u64("OFFSET", self.offset);
        w.bare_list(&self.suffixes);

        Ok(w.finish())
    }
}

impl SqlQb for SelectQb {
    fn format(&self) -> PlaceholderFormat {
        self.format
    }
}

/// A sub-select embedded as a fragment is always parenthesized.
impl IntoExpr for SelectQb {
    fn into_expr(self) -> BuildResult<Expr> {
        Ok(parenthesize(self.to_expr()?, None))
    }
}

impl From<SelectQb> for crate::qb::pred::ColumnValue {
    fn from(sub: SelectQb) -> Self {
        crate::qb::pred::ColumnValue::sub(sub)
    }
}

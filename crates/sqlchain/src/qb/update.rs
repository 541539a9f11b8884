//! UPDATE statement builder.

use crate::error::{BuildError, BuildResult};
use crate::qb::clause::{Slot, SqlWriter, identifier, push_slot, record};
use crate::qb::expr::Expr;
use crate::qb::param::Value;
use crate::qb::placeholder::PlaceholderFormat;
use crate::qb::pred::{ColumnMap, ColumnValue, IntoPred, Pred, write_group};
use crate::qb::traits::{IntoExpr, SqlQb, ToExpr};
use std::sync::Arc;

/// Immutable UPDATE builder.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct UpdateQb {
    format: PlaceholderFormat,
    prefixes: Slot<Expr>,
    /// Target table
    table: Arc<str>,
    /// SET assignments in call order
    assignments: Arc<ColumnMap>,
    /// WHERE predicates, ANDed
    where_preds: Slot<Pred>,
    suffixes: Slot<Expr>,
    build_error: Option<BuildError>,
}

impl UpdateQb {
    /// Create an UPDATE builder for `table`.
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

    /// Add a fragment before UPDATE.
    pub fn prefix(mut self, sql: impl IntoExpr) -> Self {
        if let Some(expr) = record(&mut self.build_error, sql.into_expr()) {
            push_slot(&mut self.prefixes, expr);
        }
        self
    }

    /// Add a fragment with `?` placeholders before UPDATE.
    pub fn prefix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.prefix(Expr::new(sql, args))
    }

    /// Add a fragment after WHERE (e.g. `RETURNING *`).
    pub fn suffix(mut self, sql: impl IntoExpr) -> Self {
        if let Some(expr) = record(&mut self.build_error, sql.into_expr()) {
            push_slot(&mut self.suffixes, expr);
        }
        self
    }

    /// Add a fragment with `?` placeholders after WHERE.
    pub fn suffix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.suffix(Expr::new(sql, args))
    }

    // ==================== SET ====================

    /// Assign a column: a bind value, an [`Expr`] such as
    /// `COALESCE(bar, 0) + 1`, or a sub-select.
    ///
    /// Assigning the same column twice keeps the latest value at the
    /// column's first position.
    pub fn set(mut self, column: &str, value: impl Into<ColumnValue>) -> Self {
        let value = value.into();
        let checked = identifier(column).and_then(|()| value.check_assignable(column));
        if record(&mut self.build_error, checked).is_some() {
            Arc::make_mut(&mut self.assignments).insert(column.to_string(), value);
        }
        self
    }

    /// Assign every entry of `map`, in the map's order.
    pub fn set_map(mut self, map: impl Into<ColumnMap>) -> Self {
        for (column, value) in map.into().into_entries() {
            let checked = identifier(&column).and_then(|()| value.check_assignable(&column));
            if record(&mut self.build_error, checked).is_some() {
                Arc::make_mut(&mut self.assignments).insert(column, value);
            }
        }
        self
    }

    // ==================== WHERE ====================

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
}

impl ToExpr for UpdateQb {
    fn to_expr(&self) -> BuildResult<Expr> {
        if let Some(ref err) = self.build_error {
            return Err(err.clone());
        }
        if self.table.is_empty() {
            return Err(BuildError::incomplete("UPDATE requires a table"));
        }
        if self.assignments.is_empty() {
            return Err(BuildError::incomplete(
                "UPDATE requires at least one SET assignment",
            ));
        }

        let mut w = SqlWriter::new();
        w.bare_list(&self.prefixes);
        w.keyword("UPDATE ").push(&self.table);

        w.keyword("SET ");
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            value.write_assignment(column, &mut w)?;
        }

        if !self.where_preds.is_empty() {
            w.keyword("WHERE ");
            write_group(&self.where_preds, " AND ", "", &mut w)?;
        }

        w.bare_list(&self.suffixes);
        Ok(w.finish())
    }
}

impl SqlQb for UpdateQb {
    fn format(&self) -> PlaceholderFormat {
        self.format
    }
}

//! INSERT statement builder.

use crate::error::{BuildError, BuildResult};
use crate::qb::clause::{Slot, SqlWriter, identifier, push_slot, record};
use crate::qb::expr::Expr;
use crate::qb::param::Value;
use crate::qb::placeholder::PlaceholderFormat;
use crate::qb::pred::{ColumnMap, ColumnValue};
use crate::qb::select::SelectQb;
use crate::qb::traits::{IntoExpr, SqlQb, ToExpr};
use std::sync::Arc;

/// Immutable INSERT builder.
///
/// Rows come either from `values` (one call per row) or from a SELECT
/// source. Each row must carry one value per declared column.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct InsertQb {
    format: PlaceholderFormat,
    prefixes: Slot<Expr>,
    /// Target table
    table: Arc<str>,
    /// Column header
    columns: Slot<String>,
    /// VALUES rows
    rows: Slot<Vec<ColumnValue>>,
    /// `INSERT ... SELECT` source
    select: Option<Arc<SelectQb>>,
    suffixes: Slot<Expr>,
    build_error: Option<BuildError>,
}

impl InsertQb {
    /// Create an INSERT builder for `table`.
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

    /// Add a fragment before INSERT.
    pub fn prefix(mut self, sql: impl IntoExpr) -> Self {
        if let Some(expr) = record(&mut self.build_error, sql.into_expr()) {
            push_slot(&mut self.prefixes, expr);
        }
        self
    }

    /// Add a fragment with `?` placeholders before INSERT.
    pub fn prefix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.prefix(Expr::new(sql, args))
    }

    /// Add a fragment after the rows (e.g. `RETURNING id`).
    pub fn suffix(mut self, sql: impl IntoExpr) -> Self {
        if let Some(expr) = record(&mut self.build_error, sql.into_expr()) {
            push_slot(&mut self.suffixes, expr);
        }
        self
    }

    /// Add a fragment with `?` placeholders after the rows.
    pub fn suffix_expr(self, sql: &str, args: Vec<Value>) -> Self {
        self.suffix(Expr::new(sql, args))
    }

    /// Append columns to the header.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column: String = column.into();
            if record(&mut self.build_error, identifier(&column)).is_some() {
                push_slot(&mut self.columns, column);
            }
        }
        self
    }

    /// Append one row of values, replacing any SELECT source.
    ///
    /// Values may be plain bind values, [`Expr`] fragments or sub-selects.
    /// A row whose length differs from the header is recorded as
    /// [`BuildError::RowShapeMismatch`].
    pub fn values<I, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ColumnValue>,
    {
        let row: Vec<ColumnValue> = row.into_iter().map(Into::into).collect();
        let checked = self.check_row(self.rows.len(), &row);
        if record(&mut self.build_error, checked).is_some() {
            push_slot(&mut self.rows, row);
            self.select = None;
        }
        self
    }

    /// Replace the header, rows and SELECT source with a single row taken
    /// from `map`.
    pub fn set_map(mut self, map: impl Into<ColumnMap>) -> Self {
        let map = map.into();
        let mut columns = Vec::with_capacity(map.len());
        let mut row = Vec::with_capacity(map.len());
        for (column, value) in map.into_entries() {
            let checked = identifier(&column).and_then(|()| value.check_assignable(&column));
            if record(&mut self.build_error, checked).is_none() {
                return self;
            }
            columns.push(column);
            row.push(value);
        }
        self.columns = Arc::new(columns);
        self.rows = Arc::new(vec![row]);
        self.select = None;
        self
    }

    /// Take rows from a SELECT instead of a VALUES list.
    ///
    /// Rows added earlier with `values` are dropped.
    pub fn select(mut self, source: SelectQb) -> Self {
        self.select = Some(Arc::new(source));
        self.rows = Slot::default();
        self
    }

    fn check_row(&self, index: usize, row: &[ColumnValue]) -> BuildResult<()> {
        if !self.columns.is_empty() && row.len() != self.columns.len() {
            return Err(BuildError::RowShapeMismatch {
                row: index,
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        for (i, value) in row.iter().enumerate() {
            let column = self.columns.get(i).map_or("?", String::as_str);
            value.check_assignable(column)?;
        }
        Ok(())
    }
}

impl ToExpr for InsertQb {
    fn to_expr(&self) -> BuildResult<Expr> {
        if let Some(ref err) = self.build_error {
            return Err(err.clone());
        }
        if self.table.is_empty() {
            return Err(BuildError::incomplete("INSERT requires a table"));
        }
        if self.columns.is_empty() {
            return Err(BuildError::incomplete("INSERT requires at least one column"));
        }
        if self.select.is_none() && self.rows.is_empty() {
            return Err(BuildError::incomplete(
                "INSERT requires at least one row of values or a SELECT source",
            ));
        }

        let mut w = SqlWriter::new();
        w.bare_list(&self.prefixes);
        w.keyword("INSERT INTO ").push(&self.table).push(" (");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(column);
        }
        w.push(")");

        match self.select {
            Some(ref source) => {
                w.push(" ").push_expr(&source.to_expr()?);
            }
            None => {
                w.push(" VALUES ");
                for (r, row) in self.rows.iter().enumerate() {
                    self.check_row(r, row)?;
                    if r > 0 {
                        w.push(", ");
                    }
                    w.push("(");
                    for (i, value) in row.iter().enumerate() {
                        if i > 0 {
                            w.push(", ");
                        }
                        value.write_value(&self.columns[i], &mut w)?;
                    }
                    w.push(")");
                }
            }
        }

        w.bare_list(&self.suffixes);
        Ok(w.finish())
    }
}

impl SqlQb for InsertQb {
    fn format(&self) -> PlaceholderFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn test_simple_insert() {
        let qb = InsertQb::new("a")
            .columns(["b", "c"])
            .values(args![1, 2])
            .values([
                ColumnValue::from(3),
                ColumnValue::from(Expr::new("? + 1", args![4]).unwrap()),
            ]);
        let c = qb.build().unwrap();
        assert_eq!(c.sql, "INSERT INTO a (b, c) VALUES (?, ?), (?, ? + 1)");
        assert_eq!(c.args, args![1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_with_prefix_and_suffix() {
        let qb = InsertQb::new("users")
            .prefix("WITH x AS (SELECT 1)")
            .columns(["name"])
            .values(args!["alice"])
            .suffix("RETURNING id")
            .placeholder_format(PlaceholderFormat::Dollar);
        let c = qb.build().unwrap();
        assert_eq!(
            c.sql,
            "WITH x AS (SELECT 1) INSERT INTO users (name) VALUES ($1) RETURNING id"
        );
    }

    #[test]
    fn test_row_shape_mismatch() {
        let err = InsertQb::new("t")
            .columns(["a", "b"])
            .values(args![1, 2])
            .values(args![3])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::RowShapeMismatch {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_row_shape_checked_at_build_when_columns_come_last() {
        let err = InsertQb::new("t")
            .values(args![1])
            .columns(["a", "b"])
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::RowShapeMismatch { row: 0, .. }));
    }

    #[test]
    fn test_incomplete_insert() {
        assert!(InsertQb::new("").columns(["a"]).values(args![1]).build().unwrap_err().is_incomplete());
        assert!(InsertQb::new("t").values(args![1]).build().unwrap_err().is_incomplete());
        assert!(InsertQb::new("t").columns(["a"]).build().unwrap_err().is_incomplete());
    }

    #[test]
    fn test_set_map() {
        let qb = InsertQb::new("t").set_map(ColumnMap::new().set("b", 1).set("a", Option::<i32>::None));
        let c = qb.build().unwrap();
        assert_eq!(c.sql, "INSERT INTO t (b, a) VALUES (?, ?)");
        assert_eq!(c.args, args![1, Value::Null]);
    }

    #[test]
    fn test_list_value_is_rejected() {
        let err = InsertQb::new("t")
            .columns(["tags"])
            .values([ColumnValue::from(vec![1, 2])])
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedValueType { ref column, .. } if column == "tags"));
    }

    #[test]
    fn test_names_with_markers_are_rejected() {
        let err = InsertQb::new("t?")
            .columns(["a"])
            .values(args![1])
            .build_with(PlaceholderFormat::Dollar)
            .unwrap_err();
        assert_eq!(err, BuildError::malformed("t?", 1, 0));

        let err = InsertQb::new("t").columns(["a", "b?"]).values(args![1, 2]).build().unwrap_err();
        assert_eq!(err, BuildError::malformed("b?", 1, 0));

        let err = InsertQb::new("t").set_map(ColumnMap::new().set("c?", 1)).build().unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_select_source_and_values_replace_each_other() {
        let source = SelectQb::new().columns(["a"]).from("src");

        let qb = InsertQb::new("dst").columns(["a"]).values(args![1]).select(source.clone());
        let c = qb.build().unwrap();
        assert_eq!(c.sql, "INSERT INTO dst (a) SELECT a FROM src");
        assert!(c.args.is_empty());

        let c = qb.values(args![2]).build().unwrap();
        assert_eq!(c.sql, "INSERT INTO dst (a) VALUES (?)");
        assert_eq!(c.args, args![2]);
    }

    #[test]
    fn test_insert_select() {
        let source = SelectQb::new()
            .columns(["a", "b"])
            .from("src")
            .where_expr("c = ?", args![1]);
        let c = InsertQb::new("dst")
            .columns(["a", "b"])
            .select(source)
            .build_with(PlaceholderFormat::Dollar)
            .unwrap();
        assert_eq!(c.sql, "INSERT INTO dst (a, b) SELECT a, b FROM src WHERE c = $1");
        assert_eq!(c.args, args![1]);
    }
}

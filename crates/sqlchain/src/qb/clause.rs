//! Clause assembly shared by the statement builders.
//!
//! [`SqlWriter`] accumulates one text buffer and one argument list side by
//! side. Every fragment is pushed together with its own arguments, so nested
//! sub-statements land their values exactly where their markers appear.

use crate::error::{BuildError, BuildResult};
use crate::qb::expr::{Expr, count_markers};
use crate::qb::param::Value;
use std::sync::Arc;

/// A clause slot shared between builder values until one of them writes to it.
pub(crate) type Slot<T> = Arc<Vec<T>>;

/// Append to a shared slot, copying it only if another builder still holds it.
pub(crate) fn push_slot<T: Clone>(slot: &mut Slot<T>, item: T) {
    Arc::make_mut(slot).push(item);
}

/// Keep the first error raised by a mutator; later ones are dropped.
pub(crate) fn record<T>(error: &mut Option<BuildError>, result: BuildResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "sqlchain.sql", error = %err, "builder argument rejected");
            if error.is_none() {
                *error = Some(err);
            }
            None
        }
    }
}

/// Reject a table or column name that contains `?` markers.
///
/// Names are emitted verbatim and carry no arguments, so a marker in one
/// would shift every later placeholder. `??` escapes are allowed.
pub(crate) fn identifier(name: &str) -> BuildResult<()> {
    match count_markers(name) {
        0 => Ok(()),
        n => Err(BuildError::malformed(name, n, 0)),
    }
}

/// Prepend a keyword to a fragment: `JOIN` + `t ON ...`.
pub(crate) fn with_keyword(keyword: &str, expr: Expr) -> Expr {
    let (sql, args) = expr.into_parts();
    let mut out = String::with_capacity(keyword.len() + 1 + sql.len());
    out.push_str(keyword);
    out.push(' ');
    out.push_str(&sql);
    Expr::from_parts(out, args)
}

/// Wrap a fragment in parentheses, optionally followed by `AS alias`.
pub(crate) fn parenthesize(expr: Expr, alias: Option<&str>) -> Expr {
    let (sql, args) = expr.into_parts();
    let mut out = String::with_capacity(sql.len() + 2 + alias.map_or(0, |a| a.len() + 4));
    out.push('(');
    out.push_str(&sql);
    out.push(')');
    if let Some(alias) = alias {
        out.push_str(" AS ");
        out.push_str(alias);
    }
    Expr::from_parts(out, args)
}

/// Text buffer plus parallel argument list.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    args: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self {
            sql: String::with_capacity(128),
            args: Vec::new(),
        }
    }

    /// Append raw text that carries no markers.
    pub(crate) fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a `?` marker bound to `value`.
    pub(crate) fn push_bind(&mut self, value: Value) -> &mut Self {
        self.sql.push('?');
        self.args.push(value);
        self
    }

    /// Append a fragment and its arguments.
    pub(crate) fn push_expr(&mut self, expr: &Expr) -> &mut Self {
        self.sql.push_str(expr.sql());
        self.args.extend_from_slice(expr.args());
        self
    }

    /// Append `(fragment)`.
    pub(crate) fn push_sub(&mut self, expr: &Expr) -> &mut Self {
        self.sql.push('(');
        self.push_expr(expr);
        self.sql.push(')');
        self
    }

    /// Append fragments separated by `sep`.
    pub(crate) fn push_joined(&mut self, exprs: &[Expr], sep: &str) -> &mut Self {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            self.push_expr(expr);
        }
        self
    }

    /// Append an unsigned integer literal.
    pub(crate) fn push_u64(&mut self, n: u64) -> &mut Self {
        use std::fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(self.sql, "{n}");
        self
    }

    /// Start a new clause: a single space unless the buffer is empty, then `keyword`.
    pub(crate) fn keyword(&mut self, keyword: &str) -> &mut Self {
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(keyword);
        self
    }

    /// Emit `KEYWORD a<sep>b...` when `exprs` is non-empty; skip the clause otherwise.
    pub(crate) fn clause_list(&mut self, keyword: &str, exprs: &[Expr], sep: &str) -> &mut Self {
        if exprs.is_empty() {
            return self;
        }
        self.keyword(keyword);
        self.sql.push(' ');
        self.push_joined(exprs, sep)
    }

    /// Emit fragments that form a clause of their own (prefixes, joins, suffixes).
    pub(crate) fn bare_list(&mut self, exprs: &[Expr]) -> &mut Self {
        for expr in exprs {
            if !self.sql.is_empty() {
                self.sql.push(' ');
            }
            self.push_expr(expr);
        }
        self
    }

    /// Emit `KEYWORD n` when `value` is set.
    pub(crate) fn clause_u64(&mut self, keyword: &str, value: Option<u64>) -> &mut Self {
        if let Some(n) = value {
            self.keyword(keyword);
            self.sql.push(' ');
            self.push_u64(n);
        }
        self
    }

    pub(crate) fn finish(self) -> Expr {
        Expr::from_parts(self.sql, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn test_clauses_are_space_separated_and_skipped_when_empty() {
        let cols = vec![Expr::raw("a").unwrap(), Expr::raw("b").unwrap()];
        let mut w = SqlWriter::new();
        w.keyword("SELECT").push(" ").push_joined(&cols, ", ");
        w.clause_list("GROUP BY", &[], ", ");
        w.clause_u64("LIMIT", Some(7)).clause_u64("OFFSET", None);
        let e = w.finish();
        assert_eq!(e.sql(), "SELECT a, b LIMIT 7");
        assert!(e.args().is_empty());
    }

    #[test]
    fn test_args_follow_emission_order() {
        let sub = Expr::new("SELECT id FROM t WHERE x = ?", args![2]).unwrap();
        let mut w = SqlWriter::new();
        w.push("a = ").push_bind(Value::Int(1));
        w.push(", ").push_sub(&sub);
        w.push(", c = ").push_bind(Value::Int(3));
        let e = w.finish();
        assert_eq!(e.sql(), "a = ?, (SELECT id FROM t WHERE x = ?), c = ?");
        assert_eq!(e.args(), &args![1, 2, 3][..]);
    }

    #[test]
    fn test_push_slot_copies_only_shared_slots() {
        let mut a: Slot<i32> = Arc::new(vec![1]);
        let b = a.clone();
        push_slot(&mut a, 2);
        assert_eq!(*a, vec![1, 2]);
        assert_eq!(*b, vec![1]);
    }

    #[test]
    fn test_record_keeps_first_error() {
        let mut error = None;
        assert_eq!(record(&mut error, Ok(1)), Some(1));
        record::<()>(&mut error, Err(BuildError::incomplete("first")));
        record::<()>(&mut error, Err(BuildError::incomplete("second")));
        assert_eq!(error, Some(BuildError::incomplete("first")));
    }

    #[test]
    fn test_identifier_rejects_markers() {
        assert!(identifier("users").is_ok());
        assert!(identifier("data??").is_ok());
        assert_eq!(identifier("a?"), Err(BuildError::malformed("a?", 1, 0)));
    }

    #[test]
    fn test_keyword_and_parenthesize() {
        let e = with_keyword("LEFT JOIN", Expr::new("t ON t.a = ?", args![1]).unwrap());
        assert_eq!(e.sql(), "LEFT JOIN t ON t.a = ?");

        let e = parenthesize(Expr::raw("SELECT 1").unwrap(), Some("one"));
        assert_eq!(e.sql(), "(SELECT 1) AS one");
    }
}

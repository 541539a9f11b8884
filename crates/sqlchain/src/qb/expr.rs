//! Expression nodes: SQL fragments with embedded bind values.
//!
//! An [`Expr`] pairs a template containing generic `?` markers with the
//! ordered values those markers stand for. The marker count is validated when
//! the node is created, so a mismatch surfaces at the call that introduced it
//! rather than at the final `build()`.

use crate::error::{BuildError, BuildResult};
use crate::qb::param::Value;

/// A SQL fragment and its bind values.
///
/// Invariant: the number of `?` markers in `sql` (not counting `??`
/// escapes) equals `args.len()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expr {
    sql: String,
    args: Vec<Value>,
}

impl Expr {
    /// Create an expression, checking that markers and arguments line up.
    ///
    /// # Example
    /// ```ignore
    /// let e = Expr::new("a > ? AND b < ?", sqlchain::args![1, 10])?;
    /// ```
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> BuildResult<Self> {
        let sql = sql.into();
        let expected = count_markers(&sql);
        if expected != args.len() {
            return Err(BuildError::malformed(sql, expected, args.len()));
        }
        Ok(Self { sql, args })
    }

    /// Create an expression without arguments.
    pub fn raw(sql: impl Into<String>) -> BuildResult<Self> {
        Self::new(sql, Vec::new())
    }

    /// Assemble from parts whose alignment the caller already guarantees.
    pub(crate) fn from_parts(sql: String, args: Vec<Value>) -> Self {
        debug_assert_eq!(count_markers(&sql), args.len(), "misaligned fragment: {sql}");
        Self { sql, args }
    }

    /// Concatenate two nodes with `sep` between the templates.
    ///
    /// Arguments keep their order: `self`'s first, then `other`'s.
    pub fn combine(&self, sep: &str, other: &Expr) -> Expr {
        let mut sql = String::with_capacity(self.sql.len() + sep.len() + other.sql.len());
        sql.push_str(&self.sql);
        sql.push_str(sep);
        sql.push_str(&other.sql);

        let mut args = Vec::with_capacity(self.args.len() + other.args.len());
        args.extend_from_slice(&self.args);
        args.extend_from_slice(&other.args);
        Self { sql, args }
    }

    /// The template with generic `?` markers.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bind values, in marker order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Check if the template is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Split into template and arguments.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// Count generic `?` markers, treating `??` as an escaped literal.
pub fn count_markers(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'?' {
            if bytes.get(i + 1) == Some(&b'?') {
                i += 2;
                continue;
            }
            count += 1;
        }
        i += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn test_new_checks_marker_count() {
        let e = Expr::new("a = ? AND b = ?", args![1, "x"]).unwrap();
        assert_eq!(e.sql(), "a = ? AND b = ?");
        assert_eq!(e.args(), &args![1, "x"][..]);

        let err = Expr::new("a = ?", args![1, 2]).unwrap_err();
        assert_eq!(err, BuildError::malformed("a = ?", 1, 2));

        let err = Expr::raw("j = ?").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_escaped_markers_are_not_counted() {
        assert_eq!(count_markers("data ?? 'k' AND id = ?"), 1);
        assert_eq!(count_markers("???"), 1);
        assert!(Expr::raw("tags ?? 'a'").is_ok());
    }

    #[test]
    fn test_combine_keeps_arg_order() {
        let a = Expr::new("a = ?", args![1]).unwrap();
        let b = Expr::new("b IN (?, ?)", args![2, 3]).unwrap();
        let c = a.combine(" AND ", &b);
        assert_eq!(c.sql(), "a = ? AND b IN (?, ?)");
        assert_eq!(c.args(), &args![1, 2, 3][..]);
        // operands untouched
        assert_eq!(a.args().len(), 1);
    }
}

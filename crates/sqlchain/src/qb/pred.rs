//! Predicate trees for WHERE/HAVING clauses.
//!
//! [`Pred`] is a tagged tree of raw fragments, equality maps, conjunctions and
//! disjunctions. [`ColumnMap`] is the ordered column→value list shared by the
//! equality shorthand and by UPDATE/INSERT assignments.
//!
//! Map ordering is always explicit: entries keep the order they were added
//! in, and sources without an intrinsic order (`HashMap`) are sorted by key
//! first. Two equal maps therefore always compile to identical SQL.

use crate::error::{BuildError, BuildResult};
use crate::qb::clause::{SqlWriter, identifier};
use crate::qb::expr::Expr;
use crate::qb::param::Value;
use crate::qb::traits::{IntoExpr, ToExpr};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

/// Always-true fragment (empty conjunction or empty equality map).
pub(crate) const ALWAYS_TRUE: &str = "1=1";
/// Always-false fragment (empty disjunction or empty IN list).
pub(crate) const ALWAYS_FALSE: &str = "1=0";

/// A value compared against, or assigned to, a column.
#[derive(Clone, Debug)]
pub enum ColumnValue {
    /// A single bind value (`Null` compiles to `IS NULL` in equality).
    Value(Value),
    /// A list of bind values (`IN (...)` in equality).
    List(Vec<Value>),
    /// An inline fragment: `bar = COALESCE(bar, 0) + 1`.
    Expr(Expr),
    /// A sub-statement, emitted in parentheses.
    Sub(Arc<dyn ToExpr>),
}

impl ColumnValue {
    /// Wrap a sub-statement.
    pub fn sub<T: ToExpr + 'static>(statement: T) -> Self {
        ColumnValue::Sub(Arc::new(statement))
    }

    /// Write `column = <value>` for an assignment.
    pub(crate) fn write_assignment(&self, column: &str, w: &mut SqlWriter) -> BuildResult<()> {
        w.push(column).push(" = ");
        self.write_value(column, w)
    }

    /// Write the value alone (INSERT rows).
    pub(crate) fn write_value(&self, column: &str, w: &mut SqlWriter) -> BuildResult<()> {
        match self {
            ColumnValue::Value(v) => {
                w.push_bind(v.clone());
            }
            ColumnValue::Expr(e) => {
                w.push_expr(e);
            }
            ColumnValue::Sub(s) => {
                w.push_sub(&s.to_expr()?);
            }
            ColumnValue::List(_) => return Err(list_not_assignable(column)),
        }
        Ok(())
    }

    /// Reject values that cannot stand in a single-value position.
    pub(crate) fn check_assignable(&self, column: &str) -> BuildResult<()> {
        match self {
            ColumnValue::List(_) => Err(list_not_assignable(column)),
            _ => Ok(()),
        }
    }

    fn write_equality(&self, column: &str, w: &mut SqlWriter) -> BuildResult<()> {
        identifier(column)?;
        match self {
            ColumnValue::Value(Value::Null) => {
                w.push(column).push(" IS NULL");
            }
            ColumnValue::Value(v) => {
                w.push(column).push(" = ").push_bind(v.clone());
            }
            ColumnValue::List(values) if values.is_empty() => {
                w.push(ALWAYS_FALSE);
            }
            ColumnValue::List(values) => {
                w.push(column).push(" IN (");
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    w.push_bind(v.clone());
                }
                w.push(")");
            }
            ColumnValue::Expr(e) => {
                w.push(column).push(" = ").push_expr(e);
            }
            ColumnValue::Sub(s) => {
                w.push(column).push(" = ").push_sub(&s.to_expr()?);
            }
        }
        Ok(())
    }
}

fn list_not_assignable(column: &str) -> BuildError {
    BuildError::unsupported(column, "a list cannot be bound to a single value position")
}

/// Implement `From<$ty> for ColumnValue` through `Value`.
macro_rules! impl_column_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ColumnValue {
                fn from(value: $ty) -> Self {
                    ColumnValue::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_column_value_from! {
    bool, i8, i16, i32, i64, u8, u16, u32, f32, f64,
    String, &str, &String,
    uuid::Uuid, DateTime<Utc>, NaiveDate, serde_json::Value,
}

impl From<Value> for ColumnValue {
    fn from(value: Value) -> Self {
        ColumnValue::Value(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        ColumnValue::Value(Value::from(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for ColumnValue {
    fn from(values: Vec<T>) -> Self {
        ColumnValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for ColumnValue {
    fn from(values: [T; N]) -> Self {
        ColumnValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for ColumnValue {
    fn from(values: &[T]) -> Self {
        ColumnValue::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl From<Expr> for ColumnValue {
    fn from(expr: Expr) -> Self {
        ColumnValue::Expr(expr)
    }
}

/// Ordered column→value pairs.
///
/// # Example
/// ```ignore
/// let m = ColumnMap::new().set("f", 2).set("x", "hi");
/// let m: ColumnMap = HashMap::from([("b", 1), ("a", 2)]).into(); // a, b
/// ```
#[derive(Clone, Debug, Default)]
pub struct ColumnMap {
    entries: Vec<(String, ColumnValue)>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace a column. A replaced column keeps its original position.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.insert(column.into(), value.into());
        self
    }

    pub(crate) fn insert(&mut self, column: String, value: ColumnValue) {
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, ColumnValue)> {
        self.entries
    }

    /// Build from any serializable map or struct.
    ///
    /// Scalars become bind values and arrays of scalars become lists.
    /// Nested objects and nested arrays are rejected with
    /// [`BuildError::UnsupportedValueType`].
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> BuildResult<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| BuildError::unsupported("<root>", e.to_string()))?;
        match json {
            serde_json::Value::Object(map) => Self::from_json(map),
            other => Err(BuildError::unsupported(
                "<root>",
                format!("expected a map or struct, got {}", json_kind(&other)),
            )),
        }
    }

    /// Build from a JSON object, in the object's iteration order.
    pub fn from_json(map: serde_json::Map<String, serde_json::Value>) -> BuildResult<Self> {
        let mut out = ColumnMap::new();
        for (column, value) in map {
            let value = match value {
                serde_json::Value::Array(items) => ColumnValue::List(
                    items
                        .into_iter()
                        .map(|item| json_scalar(&column, item))
                        .collect::<BuildResult<_>>()?,
                ),
                scalar => ColumnValue::Value(json_scalar(&column, scalar)?),
            };
            out.insert(column, value);
        }
        Ok(out)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn json_scalar(column: &str, value: serde_json::Value) -> BuildResult<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => n.as_f64().map(Value::Float).ok_or_else(|| {
                BuildError::unsupported(column, format!("number {n} is not representable"))
            }),
        },
        serde_json::Value::String(s) => Ok(Value::Text(s)),
        other => Err(BuildError::unsupported(
            column,
            format!("nested {} cannot be bound", json_kind(&other)),
        )),
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for ColumnMap
where
    K: Into<String>,
    V: Into<ColumnValue>,
    S: BuildHasher,
{
    /// `HashMap` has no stable order: entries are sorted by column name.
    fn from(map: HashMap<K, V, S>) -> Self {
        let mut entries: Vec<(String, ColumnValue)> =
            map.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self { entries }
    }
}

impl<K, V> From<BTreeMap<K, V>> for ColumnMap
where
    K: Into<String>,
    V: Into<ColumnValue>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V> From<Vec<(K, V)>> for ColumnMap
where
    K: Into<String>,
    V: Into<ColumnValue>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ColumnMap
where
    K: Into<String>,
    V: Into<ColumnValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMap
where
    K: Into<String>,
    V: Into<ColumnValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = ColumnMap::new();
        for (k, v) in iter {
            out.insert(k.into(), v.into());
        }
        out
    }
}

/// Boolean condition tree.
#[derive(Clone, Debug)]
pub enum Pred {
    /// A fragment used as-is.
    Raw(Expr),
    /// Equality shorthand: every entry must match.
    Eq(ColumnMap),
    /// All children must be true. Empty is true.
    And(Vec<Pred>),
    /// At least one child must be true. Empty is false.
    Or(Vec<Pred>),
}

impl Pred {
    /// Raw fragment with arguments.
    pub fn expr(sql: impl Into<String>, args: Vec<Value>) -> BuildResult<Self> {
        Expr::new(sql, args).map(Pred::Raw)
    }

    /// Raw fragment without arguments.
    pub fn raw(sql: impl Into<String>) -> BuildResult<Self> {
        Expr::raw(sql).map(Pred::Raw)
    }

    /// Equality shorthand.
    pub fn eq(map: impl Into<ColumnMap>) -> Self {
        Pred::Eq(map.into())
    }

    pub fn and(preds: impl IntoIterator<Item = Pred>) -> Self {
        Pred::And(preds.into_iter().collect())
    }

    pub fn or(preds: impl IntoIterator<Item = Pred>) -> Self {
        Pred::Or(preds.into_iter().collect())
    }

    /// True when this node must be parenthesized inside another group.
    ///
    /// Single-element groups are transparent, so the decision is made on
    /// the node they wrap.
    fn needs_parens(&self) -> bool {
        match self {
            Pred::And(preds) | Pred::Or(preds) => match preds.as_slice() {
                [only] => only.needs_parens(),
                many => many.len() > 1,
            },
            _ => false,
        }
    }

    pub(crate) fn write(&self, w: &mut SqlWriter) -> BuildResult<()> {
        match self {
            Pred::Raw(expr) => {
                w.push_expr(expr);
            }
            Pred::Eq(map) => {
                if map.is_empty() {
                    w.push(ALWAYS_TRUE);
                }
                for (i, (column, value)) in map.iter().enumerate() {
                    if i > 0 {
                        w.push(" AND ");
                    }
                    value.write_equality(column, w)?;
                }
            }
            Pred::And(preds) => write_group(preds, " AND ", ALWAYS_TRUE, w)?,
            Pred::Or(preds) => write_group(preds, " OR ", ALWAYS_FALSE, w)?,
        }
        Ok(())
    }
}

/// Write `preds` joined by `sep`, or `empty` when there are none.
pub(crate) fn write_group(
    preds: &[Pred],
    sep: &str,
    empty: &str,
    w: &mut SqlWriter,
) -> BuildResult<()> {
    match preds {
        [] => {
            w.push(empty);
            return Ok(());
        }
        [only] => return only.write(w),
        _ => {}
    }
    for (i, pred) in preds.iter().enumerate() {
        if i > 0 {
            w.push(sep);
        }
        if pred.needs_parens() {
            w.push("(");
            pred.write(w)?;
            w.push(")");
        } else {
            pred.write(w)?;
        }
    }
    Ok(())
}

impl ToExpr for Pred {
    fn to_expr(&self) -> BuildResult<Expr> {
        let mut w = SqlWriter::new();
        self.write(&mut w)?;
        Ok(w.finish())
    }
}

impl IntoExpr for Pred {
    fn into_expr(self) -> BuildResult<Expr> {
        self.to_expr()
    }
}

impl IntoExpr for ColumnMap {
    fn into_expr(self) -> BuildResult<Expr> {
        Pred::Eq(self).to_expr()
    }
}

impl From<ColumnMap> for Pred {
    fn from(map: ColumnMap) -> Self {
        Pred::Eq(map)
    }
}

impl From<Expr> for Pred {
    fn from(expr: Expr) -> Self {
        Pred::Raw(expr)
    }
}

/// Conversion accepted by `where_` and `having`.
pub trait IntoPred {
    fn into_pred(self) -> BuildResult<Pred>;
}

impl IntoPred for Pred {
    fn into_pred(self) -> BuildResult<Pred> {
        Ok(self)
    }
}

impl IntoPred for BuildResult<Pred> {
    fn into_pred(self) -> BuildResult<Pred> {
        self
    }
}

impl IntoPred for Expr {
    fn into_pred(self) -> BuildResult<Pred> {
        Ok(Pred::Raw(self))
    }
}

impl IntoPred for BuildResult<Expr> {
    fn into_pred(self) -> BuildResult<Pred> {
        self.map(Pred::Raw)
    }
}

impl IntoPred for &str {
    fn into_pred(self) -> BuildResult<Pred> {
        Pred::raw(self)
    }
}

impl IntoPred for String {
    fn into_pred(self) -> BuildResult<Pred> {
        Pred::raw(self)
    }
}

impl IntoPred for ColumnMap {
    fn into_pred(self) -> BuildResult<Pred> {
        Ok(Pred::Eq(self))
    }
}

impl<K, V, S> IntoPred for HashMap<K, V, S>
where
    K: Into<String>,
    V: Into<ColumnValue>,
    S: BuildHasher,
{
    fn into_pred(self) -> BuildResult<Pred> {
        Ok(Pred::Eq(self.into()))
    }
}

impl<K, V> IntoPred for BTreeMap<K, V>
where
    K: Into<String>,
    V: Into<ColumnValue>,
{
    fn into_pred(self) -> BuildResult<Pred> {
        Ok(Pred::Eq(self.into()))
    }
}

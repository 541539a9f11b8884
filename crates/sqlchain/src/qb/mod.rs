//! Query Builder (QB) system for sqlchain.
//!
//! Builders are immutable values: every mutator consumes the builder and
//! returns a new one, and clause slots are shared between the two until one
//! side writes to them. A base builder can therefore be cloned into many
//! branches, or shared across threads, without any branch seeing another's
//! changes.
//!
//! # Features
//!
//! - **Validated fragments**: `?` markers are counted against their arguments when a fragment is added
//! - **Predicate trees**: raw fragments, equality maps and AND/OR groups with minimal parentheses
//! - **Deterministic output**: map-shaped input is compiled in a fixed column order
//! - **Placeholder formats**: `?`, `$N`, `:N` and `@pN`, applied in one final pass
//!
//! # Usage
//!
//! ```ignore
//! use sqlchain::{args, qb, PlaceholderFormat, SqlQb};
//!
//! // SELECT
//! let c = qb::select(["id", "name"])
//!     .from("users")
//!     .where_expr("status = ?", args!["active"])
//!     .order_by(["created_at DESC"])
//!     .limit(20)
//!     .build_with(PlaceholderFormat::Dollar)?;
//!
//! // INSERT
//! let c = qb::insert("users")
//!     .columns(["username", "email"])
//!     .values(args!["alice", "alice@example.com"])
//!     .suffix("RETURNING id")
//!     .build()?;
//!
//! // UPDATE
//! let c = qb::update("users")
//!     .set("status", "inactive")
//!     .where_expr("id = ?", args![user_id])
//!     .build()?;
//!
//! // DELETE
//! let c = qb::delete("users")
//!     .where_(ColumnMap::new().set("id", user_id))
//!     .build()?;
//! ```

mod clause;
mod delete;
mod expr;
mod insert;
mod param;
mod placeholder;
mod pred;
mod select;
mod statement;
mod traits;
mod update;

pub use delete::DeleteQb;
pub use expr::{Expr, count_markers};
pub use insert::InsertQb;
pub use param::Value;
pub use placeholder::{PlaceholderFormat, UnknownFormat, placeholders};
pub use pred::{ColumnMap, ColumnValue, IntoPred, Pred};
pub use select::SelectQb;
pub use statement::StatementBuilder;
pub use traits::{Alias, Compiled, IntoExpr, SqlQb, ToExpr};
pub use update::UpdateQb;

/// Create a SELECT builder with the given result columns.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::select(["id"]).from("users");
/// ```
pub fn select<I, S>(columns: I) -> SelectQb
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SelectQb::new().columns(columns)
}

/// Create an INSERT builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::insert("users").columns(["name"]).values(args!["alice"]);
/// ```
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::update("users").set("status", "inactive");
/// ```
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE builder for the given table.
///
/// Without a WHERE predicate the statement targets every row.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::delete("users").where_expr("id = ?", args![user_id]);
/// ```
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

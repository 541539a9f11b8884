//! # sqlchain
//!
//! Fluent, immutable SQL statement builders with a predicate compiler.
//!
//! ## Features
//!
//! - **Immutable builders**: every mutator returns a new value; a base builder can be shared across threads
//! - **Validated fragments**: placeholder/argument mismatches are reported with the offending SQL
//! - **Predicate trees**: equality maps (`=`, `IN`, `IS NULL`) and nested AND/OR groups
//! - **Placeholder formats**: `?`, `$N`, `:N`, `@pN`
//! - **Driver hand-off**: [`Value`] implements `tokio_postgres::types::ToSql`
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use sqlchain::{args, qb, ColumnMap, PlaceholderFormat, SqlQb};
//!
//! let c = qb::select(["*"])
//!     .from("users")
//!     .where_(ColumnMap::new().set("status", "active").set("role", vec!["admin", "owner"]))
//!     .order_by(["created_at DESC"])
//!     .limit(10)
//!     .build_with(PlaceholderFormat::Dollar)?;
//!
//! assert_eq!(
//!     c.sql,
//!     "SELECT * FROM users WHERE status = $1 AND role IN ($2, $3) ORDER BY created_at DESC LIMIT 10"
//! );
//! client.query(&c.sql, &c.params()).await?;
//! ```

pub mod error;
pub mod prelude;
pub mod qb;

pub use error::{BuildError, BuildResult};

// Re-export qb module for easy access
pub use qb::{
    Alias, ColumnMap, ColumnValue, Compiled, DeleteQb, Expr, InsertQb, IntoExpr, IntoPred,
    PlaceholderFormat, Pred, SelectQb, SqlQb, StatementBuilder, ToExpr, UpdateQb, Value, delete,
    insert, placeholders, select, update,
};

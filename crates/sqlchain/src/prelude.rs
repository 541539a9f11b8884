//! Convenient imports for typical `sqlchain` usage.
//!
//! ```ignore
//! use sqlchain::prelude::*;
//! ```

pub use crate::args;
pub use crate::{
    Alias, BuildError, BuildResult, ColumnMap, Compiled, Expr, PlaceholderFormat, Pred, SqlQb,
    StatementBuilder, Value, delete, insert, placeholders, select, update,
};

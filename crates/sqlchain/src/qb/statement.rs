//! Builder factory carrying a placeholder format.

use crate::qb::delete::DeleteQb;
use crate::qb::insert::InsertQb;
use crate::qb::placeholder::PlaceholderFormat;
use crate::qb::select::SelectQb;
use crate::qb::update::UpdateQb;
use serde::Deserialize;

/// Creates builders that share one placeholder format.
///
/// `StatementBuilder` is `Copy`, so a configured instance can live in a
/// `static` or be passed around freely.
///
/// # Example
/// ```ignore
/// let psql = StatementBuilder::new().placeholder_format(PlaceholderFormat::Dollar);
/// let c = psql.select(["id"]).from("users").where_expr("id = ?", args![1]).build()?;
/// assert_eq!(c.sql, "SELECT id FROM users WHERE id = $1");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatementBuilder {
    placeholder_format: PlaceholderFormat,
}

impl StatementBuilder {
    /// Question-mark placeholders.
    pub const fn new() -> Self {
        Self {
            placeholder_format: PlaceholderFormat::Question,
        }
    }

    /// Postgres-style `$N` placeholders.
    pub const fn dollar() -> Self {
        Self {
            placeholder_format: PlaceholderFormat::Dollar,
        }
    }

    /// Use `format` for every builder created from now on.
    pub const fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder_format = format;
        self
    }

    /// The configured format.
    pub fn format(&self) -> PlaceholderFormat {
        self.placeholder_format
    }

    pub fn select<I, S>(&self, columns: I) -> SelectQb
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectQb::new()
            .placeholder_format(self.placeholder_format)
            .columns(columns)
    }

    pub fn insert(&self, table: &str) -> InsertQb {
        InsertQb::new(table).placeholder_format(self.placeholder_format)
    }

    pub fn update(&self, table: &str) -> UpdateQb {
        UpdateQb::new(table).placeholder_format(self.placeholder_format)
    }

    pub fn delete(&self, table: &str) -> DeleteQb {
        DeleteQb::new(table).placeholder_format(self.placeholder_format)
    }
}

//! Placeholder formats and the final rewrite pass.
//!
//! Builders always assemble SQL with generic `?` markers. The last step of
//! `build()` scans that text once and substitutes the dialect's tokens, so
//! argument order is never touched by the rewrite.
//!
//! `??` escapes a literal question mark: numbered formats emit a single `?`
//! for it, [`PlaceholderFormat::Question`] leaves the text untouched.
//!
//! The rewriter does not parse SQL string literals. A single `?` inside a
//! quoted literal is rewritten like any other marker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target placeholder token scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderFormat {
    /// `?` everywhere (MySQL, SQLite).
    #[default]
    Question,
    /// `$1, $2, ...` (PostgreSQL).
    Dollar,
    /// `:1, :2, ...` (Oracle).
    Colon,
    /// `@p1, @p2, ...` (SQL Server).
    AtP,
}

impl PlaceholderFormat {
    fn prefix(self) -> Option<&'static str> {
        match self {
            PlaceholderFormat::Question => None,
            PlaceholderFormat::Dollar => Some("$"),
            PlaceholderFormat::Colon => Some(":"),
            PlaceholderFormat::AtP => Some("@p"),
        }
    }

    /// Rewrite generic `?` markers into this format's tokens.
    pub fn replace(&self, sql: &str) -> String {
        let Some(prefix) = self.prefix() else {
            return sql.to_string();
        };

        let mut out = String::with_capacity(sql.len() + 8);
        let mut idx: usize = 0;
        let mut rest = sql;
        while let Some(pos) = rest.find('?') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(escaped) = after.strip_prefix('?') {
                out.push('?');
                rest = escaped;
            } else {
                idx += 1;
                out.push_str(prefix);
                push_usize(&mut out, idx);
                rest = after;
            }
        }
        out.push_str(rest);
        out
    }

    /// Lowercase name, as accepted by `FromStr` and serde.
    pub fn name(self) -> &'static str {
        match self {
            PlaceholderFormat::Question => "question",
            PlaceholderFormat::Dollar => "dollar",
            PlaceholderFormat::Colon => "colon",
            PlaceholderFormat::AtP => "atp",
        }
    }
}

impl fmt::Display for PlaceholderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unknown placeholder format name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placeholder format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for PlaceholderFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "question" | "?" => Ok(PlaceholderFormat::Question),
            "dollar" | "$" => Ok(PlaceholderFormat::Dollar),
            "colon" | ":" => Ok(PlaceholderFormat::Colon),
            "atp" | "@p" => Ok(PlaceholderFormat::AtP),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Write a usize as decimal digits into `out` without going through fmt.
#[inline]
fn push_usize(out: &mut String, mut n: usize) {
    if n < 10 {
        out.push(char::from(b'0' + n as u8));
        return;
    }
    let mut buf = [0u8; 20];
    let mut pos = buf.len();
    while n > 0 {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
    }
    out.extend(buf[pos..].iter().copied().map(char::from));
}

/// Generate `n` comma-separated generic markers: `?, ?, ?`.
pub fn placeholders(n: usize) -> String {
    let mut out = String::with_capacity(n.saturating_mul(3));
    for i in 0..n {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_is_identity() {
        let sql = "a = ? AND b = ?? AND c = ?";
        assert_eq!(PlaceholderFormat::Question.replace(sql), sql);
    }

    #[test]
    fn test_dollar() {
        let sql = "subdomain_id = ? and (state = ? or state = ?)";
        assert_eq!(
            PlaceholderFormat::Dollar.replace(sql),
            "subdomain_id = $1 and (state = $2 or state = $3)"
        );
    }

    #[test]
    fn test_other_numbered_formats() {
        assert_eq!(PlaceholderFormat::Colon.replace("a = ? OR b = ?"), "a = :1 OR b = :2");
        assert_eq!(PlaceholderFormat::AtP.replace("a = ? OR b = ?"), "a = @p1 OR b = @p2");
    }

    #[test]
    fn test_escaped_marker() {
        assert_eq!(
            PlaceholderFormat::Dollar.replace("data ?? 'key' AND id = ?"),
            "data ? 'key' AND id = $1"
        );
    }

    #[test]
    fn test_many_placeholders() {
        let sql = placeholders(12);
        let out = PlaceholderFormat::Dollar.replace(&sql);
        assert!(out.starts_with("$1, $2,"));
        assert!(out.ends_with("$11, $12"));
    }

    #[test]
    fn test_marker_in_literal_is_rewritten() {
        assert_eq!(
            PlaceholderFormat::Dollar.replace("name = 'who?' AND id = ?"),
            "name = 'who$1' AND id = $2"
        );
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_parse_and_serde() {
        assert_eq!("dollar".parse::<PlaceholderFormat>(), Ok(PlaceholderFormat::Dollar));
        assert_eq!(" AtP ".parse::<PlaceholderFormat>(), Ok(PlaceholderFormat::AtP));
        assert!("percent".parse::<PlaceholderFormat>().is_err());

        let fmt: PlaceholderFormat = serde_json::from_str(r#""colon""#).unwrap();
        assert_eq!(fmt, PlaceholderFormat::Colon);
        assert_eq!(serde_json::to_string(&PlaceholderFormat::Question).unwrap(), r#""question""#);
        assert_eq!(PlaceholderFormat::Dollar.to_string(), "dollar");
    }
}

//! Quoted SQL column identifiers.
//!
//! Postgres cannot bind identifiers as parameters, so column names that end up
//! in generated SQL go through [`Ident`]: the name is always wrapped in double
//! quotes (preserving case and dodging keyword collisions) and any embedded `"`
//! is escaped as `""`.

use crate::error::{StoreError, StoreResult};

/// A single quoted column identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    name: String,
}

impl Ident {
    /// Create a quoted identifier.
    ///
    /// Rejects empty names and names containing NUL, which Postgres refuses
    /// even inside quotes.
    pub fn quoted(name: &str) -> StoreResult<Self> {
        if name.is_empty() {
            return Err(StoreError::invalid_argument("Empty column identifier"));
        }
        if name.contains('\0') {
            return Err(StoreError::invalid_argument(
                "Column identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// The unquoted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push('"');
        for ch in self.name.chars() {
            if ch == '"' {
                out.push('"');
                out.push('"');
            } else {
                out.push(ch);
            }
        }
        out.push('"');
    }
}

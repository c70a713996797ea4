//! Positional parameter numbering shared by the clause builders.
//!
//! Both builders hand their output back as a [`Clause`]: a SQL fragment plus
//! the values for the `$1, $2, ...` placeholders it contains. The numbering
//! itself lives in [`ParamList`], which assigns 1-based positions in push
//! order so that `$k` always binds `params[k - 1]`.

use crate::value::SqlValue;
use std::fmt::Write as _;
use tokio_postgres::types::ToSql;

/// Append a `$n` placeholder to `out`.
pub(crate) fn write_placeholder(out: &mut String, idx: usize) {
    out.push('$');
    // Writing into a String cannot fail.
    let _ = write!(out, "{idx}");
}

/// Render a `$n` placeholder.
pub fn placeholder(idx: usize) -> String {
    let mut out = String::with_capacity(4);
    write_placeholder(&mut out, idx);
    out
}

/// An ordered list of positional parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<SqlValue>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, value: impl Into<SqlValue>) -> usize {
        self.params.push(value.into());
        self.params.len()
    }

    /// Add a parameter and return its `$n` placeholder.
    pub fn push_placeholder(&mut self, value: impl Into<SqlValue>) -> String {
        let idx = self.push(value);
        placeholder(idx)
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Index the next pushed parameter will receive.
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }

    pub fn as_slice(&self) -> &[SqlValue] {
        &self.params
    }
}

/// A SQL fragment paired with its positional parameter list.
///
/// Invariant: `text` contains placeholders `$1..=$n` where `n == params.len()`.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct Clause {
    text: String,
    params: ParamList,
}

impl Clause {
    pub(crate) fn new(text: String, params: ParamList) -> Self {
        Self { text, params }
    }

    /// A clause with no text and no parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The SQL fragment.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bound values, in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        self.params.as_slice()
    }

    /// Whether the fragment is empty (e.g. a filter with no criteria).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The placeholder the next appended value will bind to (`$n+1`).
    pub fn next_placeholder(&self) -> String {
        placeholder(self.params.next_index())
    }

    /// Append a trailing value (typically the row identifier of an UPDATE)
    /// and return the placeholder it binds to.
    ///
    /// The clause text is unchanged; the caller splices the returned
    /// placeholder into its own statement template.
    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> String {
        self.params.push_placeholder(value)
    }

    /// `" WHERE <text>"`, or an empty string when there is nothing to filter on.
    pub fn where_sql(&self) -> String {
        if self.text.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.text)
        }
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.as_refs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_one_based_index() {
        let mut params = ParamList::new();
        assert_eq!(params.next_index(), 1);
        assert_eq!(params.push(10), 1);
        assert_eq!(params.push("x"), 2);
        assert_eq!(params.len(), 2);
        assert_eq!(params.next_index(), 3);
    }

    #[test]
    fn placeholder_renders_multi_digit() {
        assert_eq!(placeholder(1), "$1");
        assert_eq!(placeholder(12), "$12");
        assert_eq!(placeholder(305), "$305");
    }

    #[test]
    fn clause_push_bind_appends_after_existing() {
        let mut params = ParamList::new();
        params.push("v1");
        params.push("v2");
        let mut clause = Clause::new(r#""a"=$1, "b"=$2"#.to_string(), params);

        assert_eq!(clause.next_placeholder(), "$3");
        let id_placeholder = clause.push_bind(42);
        assert_eq!(id_placeholder, "$3");
        assert_eq!(clause.params().len(), 3);
        assert_eq!(clause.params()[2], SqlValue::Int(42));
        assert_eq!(clause.text(), r#""a"=$1, "b"=$2"#);
    }

    #[test]
    fn empty_clause_has_no_where() {
        let clause = Clause::empty();
        assert!(clause.is_empty());
        assert_eq!(clause.where_sql(), "");
        assert_eq!(clause.next_placeholder(), "$1");
        assert!(clause.params_ref().is_empty());
    }

    #[test]
    fn where_sql_prefixes_keyword() {
        let mut params = ParamList::new();
        params.push(1);
        let clause = Clause::new("salary >= $1".to_string(), params);
        assert_eq!(clause.where_sql(), " WHERE salary >= $1");
    }
}

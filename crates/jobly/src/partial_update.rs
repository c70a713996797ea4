//! Partial-update compiler.
//!
//! Turns a sparse set of `field → value` pairs into the body of an UPDATE's
//! `SET` clause plus its parameter list:
//!
//! ```ignore
//! use jobly::{ColumnAliases, FieldMap, compile_partial_update};
//!
//! let mut fields = FieldMap::new();
//! fields.insert("name", "Acme");
//! fields.insert("numEmployees", 12);
//!
//! let aliases = ColumnAliases::new(&[("numEmployees", "num_employees")]);
//! let mut clause = compile_partial_update(fields, &aliases)?;
//! // clause.text() == r#""name"=$1, "num_employees"=$2"#
//!
//! let id = clause.push_bind("acme");
//! let sql = format!("UPDATE companies SET {} WHERE handle = {id}", clause.text());
//! ```

use crate::error::{StoreError, StoreResult};
use crate::ident::Ident;
use crate::param::{Clause, ParamList, write_placeholder};
use crate::value::SqlValue;

/// An ordered set of field assignments.
///
/// Keys are unique. Re-inserting a key replaces its value but keeps the
/// position of the first insertion, so placeholder numbering depends only on
/// the order fields were first supplied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, SqlValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == field) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((field, value)),
        }
        self
    }

    /// Consuming variant of [`FieldMap::insert`] for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Build from a JSON object, keeping the object's key order.
    ///
    /// Fails with [`StoreError::InvalidArgument`] when `value` is not an object
    /// or one of its values is not a scalar.
    pub fn from_json(value: serde_json::Value) -> StoreResult<Self> {
        let serde_json::Value::Object(obj) = value else {
            return Err(StoreError::invalid_argument(
                "partial update data must be a JSON object",
            ));
        };
        let mut fields = Self::new();
        for (key, value) in obj {
            let value = SqlValue::from_json(value)
                .map_err(|e| StoreError::invalid_argument(format!("field '{key}': {e}")))?;
            fields.insert(key, value);
        }
        Ok(fields)
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.entries.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fail with `BadRequest` if any key is outside `allowed`.
    ///
    /// Record-access callers use this to keep client-chosen keys out of
    /// generated SQL entirely.
    pub fn ensure_only(&self, allowed: &[&str]) -> StoreResult<()> {
        match self.keys().find(|k| !allowed.contains(k)) {
            Some(key) => Err(StoreError::bad_request(format!(
                "field '{key}' cannot be updated"
            ))),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Logical field name → storage column name.
///
/// Fields without an entry use their logical name as the column name.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColumnAliases {
    entries: &'static [(&'static str, &'static str)],
}

impl ColumnAliases {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// No aliasing: every field maps to a column of the same name.
    pub const fn none() -> Self {
        Self { entries: &[] }
    }

    /// Resolve the storage column for `field`.
    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(logical, _)| *logical == field)
            .map_or(field, |&(_, column)| column)
    }
}

/// Compile `fields` into `"<column>"=$<i>` assignments joined by `, `.
///
/// Fails with [`StoreError::BadRequest`] when `fields` is empty. The returned
/// clause's parameters are the field values in order; append the row
/// identifier with [`Clause::push_bind`] to get its placeholder.
pub fn compile_partial_update(fields: FieldMap, aliases: &ColumnAliases) -> StoreResult<Clause> {
    if fields.is_empty() {
        return Err(StoreError::bad_request("No data"));
    }

    let mut params = ParamList::new();
    let mut text = String::new();
    for (field, value) in fields {
        let column = Ident::quoted(aliases.column(&field))?;
        if !params.is_empty() {
            text.push_str(", ");
        }
        let idx = params.push(value);
        column.write_sql(&mut text);
        text.push('=');
        write_placeholder(&mut text, idx);
    }

    Ok(Clause::new(text, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alias_substitution() {
        let fields = FieldMap::new().with("f1", "v1");
        const ALIASES: ColumnAliases = ColumnAliases::new(&[("f1", "col1")]);

        let clause = compile_partial_update(fields, &ALIASES).unwrap();
        assert_eq!(clause.text(), r#""col1"=$1"#);
        assert_eq!(clause.params(), &[SqlValue::Text("v1".into())]);
    }

    #[test]
    fn falls_back_to_field_name() {
        let fields = FieldMap::new().with("f1", "v1");
        const ALIASES: ColumnAliases = ColumnAliases::new(&[("other", "x")]);

        let clause = compile_partial_update(fields, &ALIASES).unwrap();
        assert_eq!(clause.text(), r#""f1"=$1"#);
        assert_eq!(clause.params(), &[SqlValue::Text("v1".into())]);
    }

    #[test]
    fn identity_alias_is_harmless() {
        let fields = FieldMap::new().with("f1", "v1");
        const ALIASES: ColumnAliases = ColumnAliases::new(&[("f1", "f1"), ("fF2", "f2")]);

        let clause = compile_partial_update(fields, &ALIASES).unwrap();
        assert_eq!(clause.text(), r#""f1"=$1"#);
    }

    #[test]
    fn empty_fields_is_bad_request() {
        let err = compile_partial_update(FieldMap::new(), &ColumnAliases::none()).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn multiple_fields_keep_order_and_positions() {
        let fields = FieldMap::new()
            .with("name", "Acme")
            .with("numEmployees", 12)
            .with("logoUrl", None::<String>);
        const ALIASES: ColumnAliases =
            ColumnAliases::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

        let clause = compile_partial_update(fields, &ALIASES).unwrap();
        assert_eq!(
            clause.text(),
            r#""name"=$1, "num_employees"=$2, "logo_url"=$3"#
        );
        assert_eq!(
            clause.params(),
            &[
                SqlValue::Text("Acme".into()),
                SqlValue::Int(12),
                SqlValue::Null
            ]
        );
    }

    #[test]
    fn assignment_count_matches_params() {
        for n in 1..=12 {
            let fields: FieldMap = (0..n).map(|i| (format!("c{i}"), i as i64)).collect();
            let clause = compile_partial_update(fields, &ColumnAliases::none()).unwrap();

            assert_eq!(clause.text().split(", ").count(), n);
            assert_eq!(clause.params().len(), n);
            for (i, assignment) in clause.text().split(", ").enumerate() {
                assert_eq!(assignment, format!(r#""c{i}"=${}"#, i + 1));
                assert_eq!(clause.params()[i], SqlValue::Int(i as i64));
            }
        }
    }

    #[test]
    fn reinsert_keeps_first_position() {
        let mut fields = FieldMap::new();
        fields.insert("title", "a").insert("salary", 1).insert("title", "b");
        assert_eq!(fields.len(), 2);

        let clause = compile_partial_update(fields, &ColumnAliases::none()).unwrap();
        assert_eq!(clause.text(), r#""title"=$1, "salary"=$2"#);
        assert_eq!(clause.params()[0], SqlValue::Text("b".into()));
    }

    #[test]
    fn row_identifier_follows_assignments() {
        let fields = FieldMap::new().with("title", "J-New").with("salary", 5);
        let mut clause = compile_partial_update(fields, &ColumnAliases::none()).unwrap();

        let id = clause.push_bind(9);
        assert_eq!(id, "$3");
        assert_eq!(clause.params().last(), Some(&SqlValue::Int(9)));
    }

    #[test]
    fn hostile_field_name_stays_inside_quotes() {
        let fields = FieldMap::new().with(r#"title"=1, "salary"#, "x");
        let clause = compile_partial_update(fields, &ColumnAliases::none()).unwrap();
        assert_eq!(clause.text(), r#""title""=1, ""salary"=$1"#);
    }

    #[test]
    fn empty_field_name_is_invalid_argument() {
        let fields = FieldMap::new().with("", "x");
        let err = compile_partial_update(fields, &ColumnAliases::none()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn compile_is_idempotent() {
        let fields = FieldMap::new().with("a", 1).with("b", "two");
        let first = compile_partial_update(fields.clone(), &ColumnAliases::none()).unwrap();
        let second = compile_partial_update(fields, &ColumnAliases::none()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn from_json_keeps_values() {
        let fields = FieldMap::from_json(json!({"title": "J-New", "salary": 10})).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("title"), Some(&SqlValue::Text("J-New".into())));
        assert_eq!(fields.get("salary"), Some(&SqlValue::Int(10)));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let err = FieldMap::from_json(json!(["title"])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn from_json_rejects_nested_value() {
        let err = FieldMap::from_json(json!({"title": {"en": "x"}})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn ensure_only_rejects_unknown_keys() {
        let fields = FieldMap::new().with("title", "x").with("id", 3);
        let err = fields.ensure_only(&["title", "salary"]).unwrap_err();
        assert!(err.is_bad_request());
        assert!(fields.ensure_only(&["title", "id"]).is_ok());
    }
}

//! Filtered-query builders.
//!
//! Each filter struct compiles into a WHERE-clause body (without the `WHERE`
//! keyword) and its parameters. Criteria are evaluated in a fixed order and
//! only criteria that bind a value consume a placeholder number.

use crate::error::{StoreError, StoreResult};
use crate::param::{Clause, ParamList};
use crate::value::SqlValue;
use serde::Deserialize;

/// Accumulates AND-ed conditions and their parameters.
#[derive(Debug, Default)]
pub(crate) struct WhereBuilder {
    conditions: Vec<String>,
    params: ParamList,
}

impl WhereBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add `<col> <op> $n`, binding `value` to the next position.
    pub(crate) fn and_bound(&mut self, col: &str, op: &str, value: impl Into<SqlValue>) {
        let placeholder = self.params.push_placeholder(value);
        self.conditions.push(format!("{col} {op} {placeholder}"));
    }

    /// Add a condition that binds nothing.
    pub(crate) fn and_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    pub(crate) fn build(self) -> Clause {
        Clause::new(self.conditions.join(" AND "), self.params)
    }
}

/// Optional criteria for listing jobs.
///
/// Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Minimum salary, inclusive.
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps only jobs with positive equity. `Some(false)` is
    /// the same as `None`: it does not exclude jobs with equity.
    pub has_equity: Option<bool>,
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_salary(mut self, salary: i32) -> Self {
        self.min_salary = Some(salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = Some(has_equity);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Compile job criteria in the order `min_salary`, `has_equity`, `title`.
pub fn compile_filter(criteria: &JobFilter) -> Clause {
    let mut w = WhereBuilder::new();

    if let Some(min_salary) = criteria.min_salary {
        w.and_bound("salary", ">=", min_salary);
    }

    if criteria.has_equity == Some(true) {
        w.and_raw("equity > 0");
    }

    if let Some(title) = &criteria.title {
        w.and_bound("title", "ILIKE", format!("%{title}%"));
    }

    w.build()
}

/// Optional criteria for listing companies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the company name.
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn min_employees(mut self, n: i32) -> Self {
        self.min_employees = Some(n);
        self
    }

    pub fn max_employees(mut self, n: i32) -> Self {
        self.max_employees = Some(n);
        self
    }
}

/// Compile company criteria in the order `name`, `min_employees`, `max_employees`.
///
/// Fails with `BadRequest` when both bounds are given and `min > max`.
pub fn compile_company_filter(criteria: &CompanyFilter) -> StoreResult<Clause> {
    if let (Some(min), Some(max)) = (criteria.min_employees, criteria.max_employees) {
        if min > max {
            return Err(StoreError::bad_request(format!(
                "minEmployees ({min}) cannot be greater than maxEmployees ({max})"
            )));
        }
    }

    let mut w = WhereBuilder::new();

    if let Some(name) = &criteria.name {
        w.and_bound("name", "ILIKE", format!("%{name}%"));
    }

    if let Some(min) = criteria.min_employees {
        w.and_bound("num_employees", ">=", min);
    }

    if let Some(max) = criteria.max_employees {
        w.and_bound("num_employees", "<=", max);
    }

    Ok(w.build())
}

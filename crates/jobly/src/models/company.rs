//! Companies (the organizations that post jobs).

use super::{exists, fetch_all, fetch_opt};
use crate::client::GenericClient;
use crate::error::{StoreError, StoreResult};
use crate::filter::{CompanyFilter, compile_company_filter};
use crate::partial_update::{ColumnAliases, FieldMap, compile_partial_update};
use crate::row::{FromRow, RowExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Fields a partial update may touch, by caller-visible name.
pub const UPDATABLE_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

/// Caller-visible field name → `companies` column.
pub const COMPANY_ALIASES: ColumnAliases = ColumnAliases::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A job as embedded in [`CompanyDetail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Insert a company.
///
/// Fails with `BadRequest` if the handle is taken.
#[tracing::instrument(level = "debug", skip(conn))]
pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> StoreResult<Company> {
    if exists(
        conn,
        "SELECT handle FROM companies WHERE handle = $1",
        &[&data.handle],
    )
    .await?
    {
        return Err(duplicate(&data.handle));
    }

    let sql = format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {COMPANY_COLUMNS}"
    );
    let params: [&(dyn ToSql + Sync); 5] = [
        &data.handle,
        &data.name,
        &data.description,
        &data.num_employees,
        &data.logo_url,
    ];
    match super::fetch_one(conn, &sql, &params).await {
        // Lost a race with a concurrent insert of the same handle.
        Err(StoreError::UniqueViolation(_)) => Err(duplicate(&data.handle)),
        other => other,
    }
}

/// List companies matching `filter`, ordered by name.
#[tracing::instrument(level = "debug", skip(conn))]
pub async fn find_all(conn: &impl GenericClient, filter: &CompanyFilter) -> StoreResult<Vec<Company>> {
    let clause = compile_company_filter(filter)?;
    let sql = format!(
        "SELECT {COMPANY_COLUMNS} FROM companies{} ORDER BY name",
        clause.where_sql()
    );
    fetch_all(conn, &sql, &clause.params_ref()).await
}

/// Fetch a company and its jobs.
#[tracing::instrument(level = "debug", skip(conn))]
pub async fn get(conn: &impl GenericClient, handle: &str) -> StoreResult<CompanyDetail> {
    let company = fetch_company(conn, handle)
        .await?
        .ok_or_else(|| company_not_found(handle))?;

    let jobs = fetch_all(
        conn,
        "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        &[&handle],
    )
    .await?;

    Ok(CompanyDetail { company, jobs })
}

/// Apply a partial update to company `handle`.
///
/// Only [`UPDATABLE_FIELDS`] may appear in `data`; the handle is immutable.
#[tracing::instrument(level = "debug", skip(conn))]
pub async fn update(conn: &impl GenericClient, handle: &str, data: FieldMap) -> StoreResult<Company> {
    data.ensure_only(UPDATABLE_FIELDS)?;
    let mut clause = compile_partial_update(data, &COMPANY_ALIASES)?;
    let handle_placeholder = clause.push_bind(handle);

    let sql = format!(
        "UPDATE companies SET {} WHERE handle = {handle_placeholder} RETURNING {COMPANY_COLUMNS}",
        clause.text()
    );
    fetch_opt(conn, &sql, &clause.params_ref())
        .await?
        .ok_or_else(|| company_not_found(handle))
}

#[tracing::instrument(level = "debug", skip(conn))]
pub async fn remove(conn: &impl GenericClient, handle: &str) -> StoreResult<()> {
    if exists(
        conn,
        "DELETE FROM companies WHERE handle = $1 RETURNING handle",
        &[&handle],
    )
    .await?
    {
        Ok(())
    } else {
        Err(company_not_found(handle))
    }
}

pub(crate) async fn fetch_company(
    conn: &impl GenericClient,
    handle: &str,
) -> StoreResult<Option<Company>> {
    let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1");
    fetch_opt(conn, &sql, &[&handle]).await
}

fn company_not_found(handle: &str) -> StoreError {
    tracing::debug!(handle, "company not found");
    StoreError::not_found(format!("No company: {handle}"))
}

fn duplicate(handle: &str) -> StoreError {
    StoreError::bad_request(format!("Duplicate company: {handle}"))
}

//! Job postings.

use super::{exists, fetch_all, fetch_one, fetch_opt};
use crate::client::GenericClient;
use crate::error::{StoreError, StoreResult};
use crate::filter::{JobFilter, compile_filter};
use crate::models::company::Company;
use crate::partial_update::{ColumnAliases, FieldMap, compile_partial_update};
use crate::row::{FromRow, RowExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Fields a partial update may touch, by caller-visible name.
pub const UPDATABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A job as listed by [`find_all`], with its company's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
    pub company_name: Option<String>,
}

impl FromRow for JobListing {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
            company_name: row.try_get_column("company_name")?,
        })
    }
}

/// A single job with its company embedded in place of the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

#[tracing::instrument(level = "debug", skip(conn))]
pub async fn create(conn: &impl GenericClient, data: &NewJob) -> StoreResult<Job> {
    let sql = format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {JOB_COLUMNS}"
    );
    let params: [&(dyn ToSql + Sync); 4] =
        [&data.title, &data.salary, &data.equity, &data.company_handle];
    fetch_one(conn, &sql, &params).await
}

/// List jobs matching `filter`, ordered by title.
#[tracing::instrument(level = "debug", skip(conn))]
pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> StoreResult<Vec<JobListing>> {
    let clause = compile_filter(filter);
    let sql = format!(
        "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, c.name AS company_name \
         FROM jobs j \
         LEFT JOIN companies AS c ON c.handle = j.company_handle{} \
         ORDER BY j.title",
        clause.where_sql()
    );
    fetch_all(conn, &sql, &clause.params_ref()).await
}

#[tracing::instrument(level = "debug", skip(conn))]
pub async fn get(conn: &impl GenericClient, id: i32) -> StoreResult<JobDetail> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
    let job: Job = fetch_opt(conn, &sql, &[&id])
        .await?
        .ok_or_else(|| job_not_found(id))?;

    let company = super::company::fetch_company(conn, &job.company_handle)
        .await?
        .ok_or_else(|| StoreError::not_found(format!("No company: {}", job.company_handle)))?;

    Ok(JobDetail {
        id: job.id,
        title: job.title,
        salary: job.salary,
        equity: job.equity,
        company,
    })
}

/// Apply a partial update to job `id`.
///
/// Only [`UPDATABLE_FIELDS`] may appear in `data`; `id` and the company
/// cannot be changed.
#[tracing::instrument(level = "debug", skip(conn))]
pub async fn update(conn: &impl GenericClient, id: i32, data: FieldMap) -> StoreResult<Job> {
    data.ensure_only(UPDATABLE_FIELDS)?;
    let mut clause = compile_partial_update(data, &ColumnAliases::none())?;
    let id_placeholder = clause.push_bind(id);

    let sql = format!(
        "UPDATE jobs SET {} WHERE id = {id_placeholder} RETURNING {JOB_COLUMNS}",
        clause.text()
    );
    fetch_opt(conn, &sql, &clause.params_ref())
        .await?
        .ok_or_else(|| job_not_found(id))
}

#[tracing::instrument(level = "debug", skip(conn))]
pub async fn remove(conn: &impl GenericClient, id: i32) -> StoreResult<()> {
    if exists(conn, "DELETE FROM jobs WHERE id = $1 RETURNING id", &[&id]).await? {
        Ok(())
    } else {
        Err(job_not_found(id))
    }
}

fn job_not_found(id: i32) -> StoreError {
    tracing::debug!(id, "job not found");
    StoreError::not_found(format!("No job: {id}"))
}

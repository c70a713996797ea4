//! Record access for companies and jobs.
//!
//! Each function owns a fixed statement template. Dynamic parts come only from
//! [`compile_filter`](crate::compile_filter),
//! [`compile_company_filter`](crate::compile_company_filter) and
//! [`compile_partial_update`](crate::compile_partial_update), spliced in as
//! text and bound positionally.

pub mod company;
pub mod job;


use crate::client::GenericClient;
use crate::error::StoreResult;
use crate::row::{FromRow, map_rows};
use tokio_postgres::types::ToSql;

fn trace_sql(sql: &str, params: usize) {
    tracing::debug!(target: "jobly.sql", sql, params, "executing statement");
}

async fn fetch_all<T: FromRow>(
    conn: &impl GenericClient,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
) -> StoreResult<Vec<T>> {
    trace_sql(sql, params.len());
    let rows = conn.query(sql, params).await?;
    map_rows(&rows)
}

async fn fetch_one<T: FromRow>(
    conn: &impl GenericClient,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
) -> StoreResult<T> {
    trace_sql(sql, params.len());
    let row = conn.query_one(sql, params).await?;
    T::from_row(&row)
}

async fn fetch_opt<T: FromRow>(
    conn: &impl GenericClient,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
) -> StoreResult<Option<T>> {
    trace_sql(sql, params.len());
    let row = conn.query_opt(sql, params).await?;
    row.as_ref().map(T::from_row).transpose()
}

/// Run a statement that returns a row per affected record; `true` if any matched.
async fn exists(
    conn: &impl GenericClient,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
) -> StoreResult<bool> {
    trace_sql(sql, params.len());
    Ok(conn.query_opt(sql, params).await?.is_some())
}

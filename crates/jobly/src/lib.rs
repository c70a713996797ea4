//! # jobly
//!
//! Record access for companies and job postings on PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: [`compile_partial_update`] turns a sparse [`FieldMap`] into a
//!   `SET` clause with positional parameters; empty updates are rejected
//! - **Filtered reads**: [`compile_filter`] / [`compile_company_filter`] build WHERE
//!   clauses whose placeholder numbers always match their parameter list
//! - **Values never touch SQL text**: only quoted column identifiers are interpolated
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{FieldMap, JobFilter, StoreConfig, models::job};
//!
//! let pool = jobly::create_pool(&StoreConfig::from_env()?)?;
//! let conn = pool.get().await?;
//!
//! let engineering = job::find_all(&conn, &JobFilter::new().title("engineer").has_equity(true)).await?;
//!
//! let patch = FieldMap::new().with("salary", 120_000);
//! let updated = job::update(&conn, engineering[0].id, patch).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod models;
pub mod param;
pub mod partial_update;
pub mod row;
pub mod value;

pub use client::GenericClient;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use filter::{CompanyFilter, JobFilter, compile_company_filter, compile_filter};
pub use ident::Ident;
pub use param::{Clause, ParamList, placeholder};
pub use partial_update::{ColumnAliases, FieldMap, compile_partial_update};
pub use row::{FromRow, RowExt};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;

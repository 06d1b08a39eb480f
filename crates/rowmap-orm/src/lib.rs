//! # rowmap-orm
//!
//! A single-table data mapper on top of `rowmap-core`.
//!
//! This crate provides:
//! - `ConnectionConfig` for connection settings and pool bootstrap
//! - `SchemaIntrospector` for column and primary-key discovery
//! - `Executor` for running finished statements and materializing `Record`s
//! - `Mapper`, the facade binding one table and exposing select, update,
//!   insert, delete, `max_of` and `min_of`
//!
//! The only supported backend is SQLite through `sqlx`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rowmap_core::{Assignments, ConditionSet, QueryConfig, WhereGroup};
//! use rowmap_orm::{ConnectionConfig, Mapper};
//!
//! # async fn example() -> rowmap_orm::Result<()> {
//! let config = ConnectionConfig::from_env()?;
//! let mut customers = Mapper::connect(&config, "customer").await?;
//!
//! let output = customers
//!     .try_update(
//!         &Assignments::new().set("active", 0).set("last_update", "TIME()"),
//!         &QueryConfig::new()
//!             .where_group(WhereGroup::new(vec![ConditionSet::new().eq("store_id", 2)])),
//!     )
//!     .await?;
//! println!("{} customers deactivated", output.row_count);
//!
//! customers.max_of("customer_id").await;
//! if let Some(records) = customers.records() {
//!     println!("{:?}", records.first().map(rowmap_orm::Record::to_json));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod record;
pub mod schema;

pub use config::ConnectionConfig;
pub use error::{MapperError, Result};
pub use executor::{expand_time_macros, Executor, QueryOutput};
pub use mapper::{ExecutionResult, Mapper};
pub use record::Record;
pub use schema::{SchemaIntrospector, TableBinding};

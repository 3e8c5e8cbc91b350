//! Data access layer for the orgchart employee tracker.
//!
//! This crate owns everything that touches PostgreSQL:
//! - connection configuration from `DB_*` environment variables
//! - a bounded, traced connection pool
//! - idempotent schema provisioning and baseline seed data
//! - the fixed set of parameterized CRUD operations ([`Store`])
//!
//! # Naming Convention
//!
//! **Table names use singular form** (`department`, `role`, `employee`).
//! Each table defines what a single record represents; foreign keys like
//! `department_id` read as "the department table".
//!
//! # Usage
//!
//! ```ignore
//! let config = DbConfig::from_env()?;
//! let store = Store::new(config.create_pool()?);
//! store.ensure_schema().await?;
//! let departments = store.list_departments().await?;
//! ```
//!
//! The interactive shell (or any other caller) holds a [`Store`] and
//! nothing else; failures surface as typed [`Error`] values and are never
//! retried here.

mod config;
mod error;
mod model;
mod pool;
mod schema;
mod store;

pub use config::DbConfig;
pub use error::Error;
pub use model::{Department, Employee, EmployeeRow, NO_MANAGER, Role, RoleRow};
pub use pool::{DbConn, DbPool};
pub use store::Store;

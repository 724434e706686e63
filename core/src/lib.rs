//! Tree storage engine: a multi-tenant forest of labeled nodes, stored with
//! materialized paths and served back as nested JSON. See `service` for the
//! entry point most callers want.

pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod service;

pub use db::Database;
pub use error::{Result, TreeError};
pub use service::TreeService;

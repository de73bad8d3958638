pub mod backend;
pub mod queries;
pub mod schema;
pub mod store_impl;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `sitepulse_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;

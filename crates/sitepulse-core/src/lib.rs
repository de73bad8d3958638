pub mod aggregate;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod flow;
pub mod ingest;
pub mod recover;
pub mod store;
pub mod window;

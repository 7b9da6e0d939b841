//! Data models for lot records, the field schema, configuration and reports.

pub mod config;
pub mod record;
pub mod report;
pub mod schema;

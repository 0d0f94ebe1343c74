//! Database access layer for tcv-server
//!
//! One module per table. Queries return `sqlx::Result`; handlers convert
//! through `ApiError`. Schema creation lives in `tcv_common::db`.

pub mod audios;
pub mod feedback;
pub mod models;
pub mod stats;
pub mod transcriptions;

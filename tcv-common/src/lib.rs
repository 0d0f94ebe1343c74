//! # TCV Common Library
//!
//! Shared code for the transcription comparison vote service and its client:
//! - Entity models (audios, models, transcriptions, feedback)
//! - Database initialization, schema sync and migrations
//! - Configuration loading and root folder resolution
//! - Vote tally and gallery filtering used by both server and CLI
//! - CSV row header aliasing for transcription import
//! - API request/response types shared by server and client

pub mod api_types;
pub mod config;
pub mod csv_row;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod gallery;
pub mod models;
pub mod tally;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use models::{Audio, Feedback, Model, Transcription};

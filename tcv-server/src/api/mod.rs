//! HTTP API handlers for tcv-server

pub mod audio;
pub mod debug;
pub mod feedback;
pub mod health;
pub mod import_csv;
pub mod models;
pub mod stats;
pub mod upload;

pub use audio::{get_audio_detail, update_audio};
pub use debug::debug_dump;
pub use feedback::{list_feedback, submit_feedback};
pub use health::health_routes;
pub use import_csv::import_csv;
pub use models::{create_model, delete_model, list_models, update_model};
pub use stats::validation_stats;
pub use upload::{list_audios, upload_audio};

//! Subcommand implementations

pub mod import;
pub mod models;
pub mod review;
pub mod upload;

use tcv_common::models::ModelSummary;

/// Match a model by id, or by name ignoring case
pub fn find_model<'a>(models: &'a [ModelSummary], key: &str) -> Option<&'a ModelSummary> {
    models
        .iter()
        .find(|m| m.id == key)
        .or_else(|| models.iter().find(|m| m.model_name.eq_ignore_ascii_case(key.trim())))
}

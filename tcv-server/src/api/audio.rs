//! Audio detail (comparison view) and validation flag

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tcv_common::api_types::{AudioDetailResponse, UpdateAudioRequest};
use tcv_common::models::TranscriptionView;
use tcv_common::tally::VoteTally;
use tcv_common::Audio;
use tracing::info;

use crate::db::{audios, feedback, transcriptions};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const NOT_FOUND: &str = "Audio not found";

/// GET /api/audio/:id
///
/// Tallies are computed on every read, so the response is never cached.
pub async fn get_audio_detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let audio = audios::get(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let joined = transcriptions::list_for_audio(&state.db, &id).await?;
    let tally = VoteTally::from_preferences(feedback::preferences_for_audio(&state.db, &id).await?);
    let navigation = audios::neighbours(&state.db, &id).await?;

    let transcriptions = joined
        .into_iter()
        .map(|(transcription, model)| {
            let vote_count = tally.count_for(&transcription.id);
            let vote_percentage = tally.percentage_for(&transcription.id);
            let is_leading = tally.is_leading(&transcription.id);
            TranscriptionView {
                vote_count,
                vote_percentage,
                is_leading,
                transcription,
                model,
            }
        })
        .collect();

    let body = AudioDetailResponse {
        audio,
        transcriptions,
        total_votes: tally.total(),
        vote_counts: tally.into_counts(),
        navigation,
    };

    Ok(([(header::CACHE_CONTROL, "no-store, max-age=0")], Json(body)))
}

/// PATCH /api/audio/:id
pub async fn update_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAudioRequest>,
) -> ApiResult<Json<Audio>> {
    let audio = audios::set_validated(&state.db, &id, request.is_validated)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    info!("Audio {} validated = {}", audio.id, audio.is_validated);
    Ok(Json(audio))
}

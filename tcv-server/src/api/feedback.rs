//! Feedback (vote) endpoints

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tcv_common::api_types::{FeedbackListResponse, SubmitFeedbackRequest, SubmitFeedbackResponse};
use tracing::{info, warn};

use crate::db::feedback::{self, NewFeedback};
use crate::error::{ApiError, ApiResult};
use crate::session;
use crate::AppState;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// POST /api/feedback
///
/// Only the audio id is validated. The preferred transcription may belong to
/// another audio and a session may vote any number of times.
pub async fn submit_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitFeedbackRequest>,
) -> ApiResult<Response> {
    let audio_id = request
        .audio_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Audio ID is required".to_string()))?;

    let existing_session = session::session_from_headers(&headers);
    let is_new_session = existing_session.is_none();
    let session_id = existing_session.unwrap_or_else(session::generate_session_id);

    let ip_address = session::client_ip(&headers);
    let user_agent = session::user_agent(&headers);

    let row = feedback::insert(
        &state.db,
        &NewFeedback {
            audio_id,
            preferred_transcription_id: non_empty(&request.preferred_transcription_id),
            user_comments: non_empty(&request.user_comments),
            session_id: Some(&session_id),
            ip_address: ip_address.as_deref(),
            user_agent: user_agent.as_deref(),
        },
    )
    .await?;

    info!(
        "Feedback {} for audio {} (preferred: {:?})",
        row.id, row.audio_id, row.preferred_transcription_id
    );

    let mut response = Json(SubmitFeedbackResponse {
        message: "Feedback submitted successfully".to_string(),
        feedback: row,
    })
    .into_response();

    if is_new_session {
        let cookie = session::session_cookie(&session_id, state.config.secure_cookies);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Could not encode session cookie: {}", e),
        }
    }

    Ok(response)
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    #[serde(default, rename = "audioId")]
    pub audio_id: Option<String>,
}

/// GET /api/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<FeedbackQuery>,
) -> ApiResult<Json<FeedbackListResponse>> {
    let audio_id = non_empty(&query.audio_id);
    let feedback = feedback::list(&state.db, audio_id).await?;
    Ok(Json(FeedbackListResponse { feedback }))
}

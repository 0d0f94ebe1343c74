//! Per-audio validation statistics

use sqlx::SqlitePool;
use std::collections::HashMap;
use tcv_common::api_types::ValidationStats;

#[derive(sqlx::FromRow)]
struct AudioVotes {
    audio_id: String,
    audio_name: String,
    language_tag: Option<String>,
    total_votes: i64,
}

#[derive(sqlx::FromRow)]
struct ModelVotes {
    audio_id: String,
    model_name: String,
    votes: i64,
}

/// Vote totals per audio, newest audio first, with a per-model breakdown
///
/// A vote is attributed to the model of its preferred transcription. Votes
/// without a preference only count toward `total_votes`.
pub async fn validation_stats(pool: &SqlitePool) -> sqlx::Result<Vec<ValidationStats>> {
    let totals = sqlx::query_as::<_, AudioVotes>(
        r#"
        SELECT a.id AS audio_id,
               a.audio_name,
               a.language_tag,
               COUNT(f.id) AS total_votes
        FROM audios a
        LEFT JOIN feedback f ON f.audio_id = a.id
        GROUP BY a.id
        ORDER BY a.created_at DESC, a.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let per_model = sqlx::query_as::<_, ModelVotes>(
        r#"
        SELECT f.audio_id, m.model_name, COUNT(*) AS votes
        FROM feedback f
        JOIN transcriptions t ON t.id = f.preferred_transcription_id
        JOIN models m ON m.id = t.model_id
        GROUP BY f.audio_id, m.model_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut by_audio: HashMap<String, Vec<ModelVotes>> = HashMap::new();
    for row in per_model {
        by_audio.entry(row.audio_id.clone()).or_default().push(row);
    }

    Ok(totals
        .into_iter()
        .map(|audio| {
            let votes_by_model = by_audio
                .remove(&audio.audio_id)
                .unwrap_or_default()
                .into_iter()
                .map(|row| (row.model_name, row.votes))
                .collect();
            ValidationStats {
                audio_id: audio.audio_id,
                audio_name: audio.audio_name,
                language_tag: audio.language_tag,
                total_votes: audio.total_votes,
                votes_by_model,
            }
        })
        .collect())
}

//! Reviewer commands: gallery, comparison view, voting

use anyhow::{bail, Result};
use std::fmt::{self, Write as _};
use std::path::Path;
use tcv_common::api_types::{AudioDetailResponse, SubmitFeedbackRequest};
use tcv_common::gallery::{filter_audios, GalleryStats, StatusFilter};
use tracing::info;

use crate::client::TcvClient;
use crate::session;

const BAR_WIDTH: usize = 20;

pub async fn gallery(client: &TcvClient, search: &str, status: StatusFilter) -> Result<()> {
    let listing = client.list_audios().await?;
    let stats = GalleryStats::from_audios(&listing.audios);
    println!(
        "{} audios: {} validated, {} pending",
        stats.total, stats.validated, stats.pending
    );

    let shown = filter_audios(&listing.audios, search, status);
    if shown.is_empty() {
        println!("No audio matches.");
    }
    for audio in shown {
        let mark = if audio.is_validated { "validated" } else { "pending" };
        println!(
            "{}  {:<9}  {}  [{}]",
            audio.id,
            mark,
            audio.audio_name,
            audio.language_tag.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// `#####...............` for a whole-percent share
pub fn vote_bar(percentage: i64) -> String {
    let filled = (percentage.clamp(0, 100) as usize * BAR_WIDTH + 50) / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Comparison view: one numbered block per transcription
pub fn render_detail(detail: &AudioDetailResponse) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_detail(&mut out, detail);
    out
}

fn write_detail(out: &mut String, detail: &AudioDetailResponse) -> fmt::Result {
    let audio = &detail.audio;
    writeln!(out, "{} ({})", audio.audio_name, audio.id)?;
    writeln!(out, "  listen: {}", audio.storage_url)?;
    writeln!(
        out,
        "  status: {}   votes: {}",
        if audio.is_validated { "validated" } else { "pending" },
        detail.total_votes
    )?;

    if detail.transcriptions.is_empty() {
        writeln!(out, "\nNo transcriptions imported for this audio yet.")?;
    }

    for (index, view) in detail.transcriptions.iter().enumerate() {
        let t = &view.transcription;
        let leading = if view.is_leading { "  * leading" } else { "" };
        writeln!(out, "\n[{}] {}{}", index + 1, view.model.model_name, leading)?;
        writeln!(
            out,
            "    BLEU {}  chrF++ {}  words {}",
            score(t.bleu_score),
            score(t.chrf_score),
            t.word_count.map_or_else(|| "-".to_string(), |w| w.to_string())
        )?;
        writeln!(
            out,
            "    {} {:>3}% ({} votes)",
            vote_bar(view.vote_percentage),
            view.vote_percentage,
            view.vote_count
        )?;
        writeln!(out, "    {}", t.text)?;
        writeln!(out, "    id: {}", t.id)?;
    }

    let nav = &detail.navigation;
    if nav.previous_id.is_some() || nav.next_id.is_some() {
        writeln!(
            out,
            "\nprevious: {}   next: {}",
            nav.previous_id.as_deref().unwrap_or("-"),
            nav.next_id.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

pub async fn show(client: &TcvClient, audio_id: &str) -> Result<()> {
    let detail = client.get_audio(audio_id).await?;
    print!("{}", render_detail(&detail));
    Ok(())
}

/// Turn `--prefer` into a transcription id
///
/// A small number picks the numbered block of the comparison view; anything
/// else is taken as an id.
pub fn resolve_preference(prefer: &str, detail: Option<&AudioDetailResponse>) -> Result<String> {
    if let (Ok(n), Some(detail)) = (prefer.parse::<usize>(), detail) {
        return match n.checked_sub(1).and_then(|i| detail.transcriptions.get(i)) {
            Some(view) => Ok(view.transcription.id.clone()),
            None => bail!("No transcription numbered {n}"),
        };
    }
    Ok(prefer.to_string())
}

/// A vote needs a preferred transcription or a non-blank comment
pub fn build_vote(audio_id: &str, preferred: Option<String>, comment: Option<String>) -> Result<SubmitFeedbackRequest> {
    let comment = comment.filter(|c| !c.trim().is_empty());
    if preferred.is_none() && comment.is_none() {
        bail!("Pick a transcription with --prefer or leave a comment with --comment");
    }
    Ok(SubmitFeedbackRequest {
        audio_id: Some(audio_id.to_string()),
        preferred_transcription_id: preferred,
        user_comments: comment,
    })
}

pub async fn vote(
    client: &TcvClient,
    session_path: &Path,
    audio_id: &str,
    prefer: Option<String>,
    comment: Option<String>,
) -> Result<()> {
    let preferred = match prefer {
        Some(p) if p.parse::<usize>().is_ok() => {
            let detail = client.get_audio(audio_id).await?;
            Some(resolve_preference(&p, Some(&detail))?)
        }
        Some(p) => Some(resolve_preference(&p, None)?),
        None => None,
    };
    let request = build_vote(audio_id, preferred, comment)?;

    let existing = session::load(session_path);
    let (response, minted) = client.submit_feedback(&request, existing.as_deref()).await?;
    if let Some(session_id) = minted {
        session::save(session_path, &session_id)?;
        info!("Saved session to {}", session_path.display());
    }

    println!("{}", response.message);
    Ok(())
}

pub async fn feedback(client: &TcvClient, audio_id: Option<&str>) -> Result<()> {
    let listing = client.list_feedback(audio_id).await?;
    if listing.feedback.is_empty() {
        println!("No feedback yet.");
    }
    for row in listing.feedback {
        println!(
            "{}  audio {}  prefers {}  {}",
            row.created_at,
            row.audio_id,
            row.preferred_transcription_id.as_deref().unwrap_or("-"),
            row.user_comments.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn stats(client: &TcvClient) -> Result<()> {
    let response = client.stats().await?;
    for entry in response.stats {
        let breakdown: Vec<String> = entry
            .votes_by_model
            .iter()
            .map(|(model, votes)| format!("{model}: {votes}"))
            .collect();
        println!(
            "{}  {} votes  {}",
            entry.audio_name,
            entry.total_votes,
            breakdown.join(", ")
        );
    }
    Ok(())
}

pub async fn validate(client: &TcvClient, audio_id: &str, validated: bool) -> Result<()> {
    let audio = client.set_validated(audio_id, validated).await?;
    println!(
        "{} is now {}",
        audio.audio_name,
        if audio.is_validated { "validated" } else { "pending" }
    );
    Ok(())
}

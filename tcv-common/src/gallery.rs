//! Gallery filtering
//!
//! Search and status filter over an already-fetched audio list, plus the
//! total/validated/pending counters shown above the gallery.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::Audio;

/// Validation status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Validated,
    Pending,
}

impl StatusFilter {
    fn matches(self, audio: &Audio) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Validated => audio.is_validated,
            StatusFilter::Pending => !audio.is_validated,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "validated" => Ok(StatusFilter::Validated),
            "pending" => Ok(StatusFilter::Pending),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}

/// Counters over the whole (unfiltered) list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryStats {
    pub total: usize,
    pub validated: usize,
    pub pending: usize,
}

impl GalleryStats {
    pub fn from_audios(audios: &[Audio]) -> Self {
        let validated = audios.iter().filter(|a| a.is_validated).count();
        Self {
            total: audios.len(),
            validated,
            pending: audios.len() - validated,
        }
    }
}

/// True when the query is a case-insensitive substring of the audio name or
/// language tag. An empty query matches everything.
pub fn matches_search(audio: &Audio, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    audio.audio_name.to_lowercase().contains(&needle)
        || audio
            .language_tag
            .as_deref()
            .is_some_and(|tag| tag.to_lowercase().contains(&needle))
}

/// Apply search and status filter, preserving input order
pub fn filter_audios<'a>(audios: &'a [Audio], query: &str, status: StatusFilter) -> Vec<&'a Audio> {
    audios
        .iter()
        .filter(|audio| matches_search(audio, query) && status.matches(audio))
        .collect()
}

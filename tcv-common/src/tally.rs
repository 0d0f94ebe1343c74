//! Vote tally
//!
//! Votes are never materialized: a tally is recomputed from the feedback rows
//! of one audio on every read. Every feedback row counts toward the total,
//! including comment-only rows that prefer no transcription.

use std::collections::BTreeMap;

/// Vote counts for one audio
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    counts: BTreeMap<String, i64>,
    total: i64,
}

impl VoteTally {
    /// Build a tally from the `preferred_transcription_id` column of every
    /// feedback row for an audio
    pub fn from_preferences<I, S>(preferences: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut tally = Self::default();
        for preferred in preferences {
            tally.total += 1;
            if let Some(id) = preferred {
                *tally.counts.entry(id.as_ref().to_string()).or_insert(0) += 1;
            }
        }
        tally
    }

    /// Number of feedback rows considered
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Votes for one transcription (0 when never preferred)
    pub fn count_for(&self, transcription_id: &str) -> i64 {
        self.counts.get(transcription_id).copied().unwrap_or(0)
    }

    /// Share of all feedback rows preferring the transcription, in whole percent
    pub fn percentage_for(&self, transcription_id: &str) -> i64 {
        vote_percentage(self.count_for(transcription_id), self.total)
    }

    /// A transcription leads once it has votes and holds at least half of them
    pub fn is_leading(&self, transcription_id: &str) -> bool {
        is_leading(self.count_for(transcription_id), self.total)
    }

    /// Per-transcription counts, ids with zero votes omitted
    pub fn counts(&self) -> &BTreeMap<String, i64> {
        &self.counts
    }

    pub fn into_counts(self) -> BTreeMap<String, i64> {
        self.counts
    }
}

/// Whole-percent share, halves rounded up; 0 when there are no votes
pub fn vote_percentage(count: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (count * 200 + total) / (total * 2)
}

pub fn is_leading(count: i64, total: i64) -> bool {
    count > 0 && total > 0 && vote_percentage(count, total) >= 50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tally() {
        let tally = VoteTally::from_preferences(Vec::<Option<&str>>::new());
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.count_for("t1"), 0);
        assert_eq!(tally.percentage_for("t1"), 0);
        assert!(!tally.is_leading("t1"));
        assert!(tally.counts().is_empty());
    }

    #[test]
    fn test_comment_only_rows_count_toward_total() {
        let tally = VoteTally::from_preferences(vec![Some("t1"), None, Some("t2"), Some("t1")]);
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.count_for("t1"), 2);
        assert_eq!(tally.count_for("t2"), 1);
        assert_eq!(tally.percentage_for("t1"), 50);
        assert_eq!(tally.percentage_for("t2"), 25);
        assert_eq!(tally.counts().len(), 2);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 1/3 = 33.33 -> 33, 2/3 = 66.67 -> 67, 1/8 = 12.5 -> 13
        assert_eq!(vote_percentage(1, 3), 33);
        assert_eq!(vote_percentage(2, 3), 67);
        assert_eq!(vote_percentage(1, 8), 13);
        assert_eq!(vote_percentage(3, 3), 100);
        assert_eq!(vote_percentage(0, 5), 0);
    }

    #[test]
    fn test_leading_requires_votes_and_half_share() {
        assert!(is_leading(1, 2));
        assert!(is_leading(5, 9));
        assert!(!is_leading(4, 9));
        assert!(!is_leading(0, 0));
        assert!(!is_leading(0, 3));
    }

    #[test]
    fn test_tie_marks_both_leading() {
        let tally = VoteTally::from_preferences(vec![Some("a"), Some("b")]);
        assert!(tally.is_leading("a"));
        assert!(tally.is_leading("b"));
    }
}

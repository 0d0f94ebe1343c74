//! CSV row aliasing for transcription import
//!
//! A row is a header -> cell map as produced by a header-aware CSV parser.
//! Canonical fields are resolved from a list of accepted header aliases,
//! compared case-insensitively after trimming.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Headers accepted for the audio file name
pub const AUDIO_NAME_HEADERS: &[&str] = &["audio_name", "audio", "filename"];
/// Headers accepted for the transcription text
pub const TRANSCRIPTION_HEADERS: &[&str] = &["transcription"];
/// Headers accepted for the BLEU score
pub const BLEU_HEADERS: &[&str] = &["BLEU", "bleu", "bleu_score"];
/// Headers accepted for the chrF++ score
pub const CHRF_HEADERS: &[&str] = &["chrF++", "chrf", "chrf_score"];

/// One parsed CSV row
///
/// Deserializes from any JSON object; numbers and booleans are kept in their
/// text form, nulls and nested values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct CsvRow(BTreeMap<String, String>);

impl From<BTreeMap<String, Value>> for CsvRow {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let cells = raw
            .into_iter()
            .filter_map(|(header, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => return None,
                };
                Some((header, text))
            })
            .collect();
        CsvRow(cells)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CsvRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        CsvRow(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl CsvRow {
    /// First non-blank cell whose header matches one of the aliases.
    /// Aliases are tried in order.
    pub fn lookup(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            self.0
                .iter()
                .find(|(header, value)| {
                    header.trim().eq_ignore_ascii_case(alias) && !value.trim().is_empty()
                })
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn audio_name(&self) -> Option<&str> {
        self.lookup(AUDIO_NAME_HEADERS)
    }

    pub fn transcription(&self) -> Option<&str> {
        self.lookup(TRANSCRIPTION_HEADERS)
    }

    pub fn bleu_score(&self) -> Option<f64> {
        self.lookup(BLEU_HEADERS).and_then(parse_score)
    }

    pub fn chrf_score(&self) -> Option<f64> {
        self.lookup(CHRF_HEADERS).and_then(parse_score)
    }

    pub fn cells(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// Parse an optional metric cell; anything unparsable or non-finite is None
pub fn parse_score(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when a header list can feed the importer: it needs an audio name
/// column and a transcription column
pub fn has_required_headers<S: AsRef<str>>(headers: &[S]) -> bool {
    let has = |aliases: &[&str]| {
        headers
            .iter()
            .any(|h| aliases.iter().any(|a| h.as_ref().trim().eq_ignore_ascii_case(a)))
    };
    has(AUDIO_NAME_HEADERS) && has(TRANSCRIPTION_HEADERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audio_name_alias_order() {
        let row: CsvRow = [("filename", "b.wav"), ("audio_name", "a.wav")].into_iter().collect();
        assert_eq!(row.audio_name(), Some("a.wav"));

        let row: CsvRow = [("audio_name", "  "), ("Audio", "c.wav")].into_iter().collect();
        assert_eq!(row.audio_name(), Some("c.wav"));
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let row: CsvRow = [(" Transcription ", "salam"), ("CHRF++", "41.2")].into_iter().collect();
        assert_eq!(row.transcription(), Some("salam"));
        assert_eq!(row.chrf_score(), Some(41.2));
    }

    #[test]
    fn test_scores_fall_back_to_none() {
        let row: CsvRow = [("bleu", "n/a"), ("chrf_score", "")].into_iter().collect();
        assert_eq!(row.bleu_score(), None);
        assert_eq!(row.chrf_score(), None);

        let row: CsvRow = [("BLEU", "NaN")].into_iter().collect();
        assert_eq!(row.bleu_score(), None);
    }

    #[test]
    fn test_zero_score_is_kept() {
        let row: CsvRow = [("bleu_score", "0")].into_iter().collect();
        assert_eq!(row.bleu_score(), Some(0.0));
    }

    #[test]
    fn test_deserialize_coerces_cells() {
        let row: CsvRow = serde_json::from_value(json!({
            "audio_name": "x.wav",
            "BLEU": 23.5,
            "notes": null,
            "flag": true
        }))
        .unwrap();
        assert_eq!(row.audio_name(), Some("x.wav"));
        assert_eq!(row.bleu_score(), Some(23.5));
        assert_eq!(row.cells().get("flag").map(String::as_str), Some("true"));
        assert!(!row.cells().contains_key("notes"));
    }

    #[test]
    fn test_required_headers() {
        assert!(has_required_headers(&["Filename", "transcription", "bleu"]));
        assert!(!has_required_headers(&["audio_name", "text"]));
        assert!(!has_required_headers(&["transcription"]));
    }
}

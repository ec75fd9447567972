//! Word-level timing data as reported by the alignment source
//!
//! The API reports each word as a camelCase JSON record:
//! {"word": "Hello ", "startS": 1.0, "endS": 1.5, "success": true, "palign": 0}
//!
//! `normalize` adapts those records into the internal token shape so the
//! segmenter never sees upstream field naming.

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// One word record on the wire. `word` may carry trailing whitespace,
/// newlines or partial section-marker punctuation; it is passed through
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedWord {
    pub word: String,
    #[serde(rename = "startS")]
    pub start_s: f64,
    #[serde(rename = "endS")]
    pub end_s: f64,
    pub success: bool,
    #[serde(default)]
    pub palign: f64,
}

/// Normalized word token consumed by the segmenter.
#[derive(Debug, Clone)]
pub struct WordToken {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Whether the source managed to time this word. Informational only;
    /// untimed words are still segmented.
    #[allow(dead_code)]
    pub alignment_succeeded: bool,
    #[allow(dead_code)]
    pub alignment_score: f64,
}

/// Map wire records to tokens, 1:1 and in order. No filtering, no sorting.
pub fn normalize(raw: &[AlignedWord]) -> Vec<WordToken> {
    raw.iter()
        .map(|w| WordToken {
            text: w.word.clone(),
            start_seconds: w.start_s,
            end_seconds: w.end_s,
            alignment_succeeded: w.success,
            alignment_score: w.palign,
        })
        .collect()
}

/// Check the timing contract the segmenter assumes: finite, non-negative
/// starts, end after start, starts non-decreasing across the sequence.
pub fn validate(words: &[WordToken]) -> anyhow::Result<()> {
    let mut prev_start = 0.0_f64;
    for (i, w) in words.iter().enumerate() {
        if !w.start_seconds.is_finite() || !w.end_seconds.is_finite() {
            bail!("word {i} {:?}: non-finite timing", w.text);
        }
        if w.start_seconds < 0.0 {
            bail!("word {i} {:?}: negative start {}", w.text, w.start_seconds);
        }
        if w.end_seconds <= w.start_seconds {
            bail!(
                "word {i} {:?}: end {} not after start {}",
                w.text,
                w.end_seconds,
                w.start_seconds
            );
        }
        if w.start_seconds < prev_start {
            bail!(
                "word {i} {:?}: starts at {} before previous word at {}",
                w.text,
                w.start_seconds,
                prev_start
            );
        }
        prev_start = w.start_seconds;
    }
    Ok(())
}

/// Lenient twin of [`validate`]: log the first violation and keep going,
/// matching the permissive behavior of the upstream conversion.
pub fn warn_on_invalid(words: &[WordToken]) {
    if let Err(err) = validate(words) {
        tracing::warn!("alignment timing looks corrupt, converting anyway: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, start: f64, end: f64) -> WordToken {
        WordToken {
            text: text.to_string(),
            start_seconds: start,
            end_seconds: end,
            alignment_succeeded: true,
            alignment_score: 0.0,
        }
    }

    #[test]
    fn deserializes_wire_field_names() {
        let raw: Vec<AlignedWord> = serde_json::from_str(
            r#"[{"word":"Hello ","startS":1.0,"endS":1.5,"success":true,"palign":0.42}]"#,
        )
        .unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].word, "Hello ");
        assert_eq!(raw[0].start_s, 1.0);
        assert_eq!(raw[0].end_s, 1.5);
        assert!(raw[0].success);
        assert_eq!(raw[0].palign, 0.42);
    }

    #[test]
    fn palign_defaults_to_zero() {
        let raw: Vec<AlignedWord> = serde_json::from_str(
            r#"[{"word":"Hi","startS":0.5,"endS":0.9,"success":false}]"#,
        )
        .unwrap();
        assert_eq!(raw[0].palign, 0.0);
        assert!(!raw[0].success);
    }

    #[test]
    fn normalize_maps_every_record_in_order() {
        let raw = vec![
            AlignedWord {
                word: "one ".to_string(),
                start_s: 0.1,
                end_s: 0.4,
                success: true,
                palign: 1.0,
            },
            AlignedWord {
                word: "two\n".to_string(),
                start_s: 0.4,
                end_s: 0.8,
                success: false,
                palign: 0.0,
            },
        ];
        let tokens = normalize(&raw);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "one ");
        assert_eq!(tokens[0].start_seconds, 0.1);
        assert_eq!(tokens[0].alignment_score, 1.0);
        assert_eq!(tokens[1].text, "two\n");
        assert!(!tokens[1].alignment_succeeded);
    }

    #[test]
    fn validate_accepts_well_formed_timing() {
        let words = vec![token("a", 0.0, 0.5), token("b", 0.5, 1.0), token("c", 2.0, 2.5)];
        assert!(validate(&words).is_ok());
    }

    #[test]
    fn validate_rejects_inverted_span() {
        let words = vec![token("a", 1.0, 0.5)];
        assert!(validate(&words).is_err());
    }

    #[test]
    fn validate_rejects_non_monotonic_starts() {
        let words = vec![token("a", 2.0, 2.5), token("b", 1.0, 1.5)];
        assert!(validate(&words).is_err());
    }

    #[test]
    fn validate_rejects_negative_start() {
        let words = vec![token("a", -0.1, 0.5)];
        assert!(validate(&words).is_err());
    }
}

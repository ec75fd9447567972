//! Greedy segmentation of a word-token stream into display lines
//!
//! Single left-to-right pass over the tokens. Each token is appended to an
//! accumulator, then a fixed-priority break predicate decides whether the
//! accumulated line is finished:
//!
//! 1. end of stream
//! 2. the current word is a self-contained section marker like `(Chorus)`
//! 3. the next word is a section marker (keep it off this line)
//! 4. the current word carries terminal punctuation
//! 5. the silence before the next word exceeds the gap threshold
//! 6. appending the next word would push the line past the length limit
//!
//! Lines display slightly before they are sung: the lead-in offset is
//! subtracted from the first word's start and the result is NOT clamped, so
//! `start` can be negative near the top of the track.

use serde::{Deserialize, Serialize};

use super::words::WordToken;

/// Tunable segmentation thresholds, exposed in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Silence between adjacent words (seconds) that forces a line break.
    pub gap_seconds: f64,
    /// Upper bound on a joined line, in characters.
    pub max_line_chars: usize,
    /// Subtracted from each line's first word start (seconds).
    pub lead_in_seconds: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            gap_seconds: 1.5,
            max_line_chars: 80,
            lead_in_seconds: 0.2,
        }
    }
}

/// One display line. `index` is assigned at emission and survives cleaning
/// unchanged, so consumers must treat it as an id, not an array position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub index: usize,
    pub text: String,
    #[serde(rename = "start")]
    pub start_ms: i64,
    #[serde(rename = "end")]
    pub end_ms: i64,
}

const TERMINAL_PUNCTUATION: [char; 4] = ['.', '!', '?', '…'];

/// Partition `words` into raw lines. Whitespace-only accumulations are
/// skipped and consume no index; everything else (section markers included)
/// is emitted and left for the cleaning pass.
pub fn segment_lines(words: &[WordToken], cfg: &SegmenterConfig) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = Vec::new();
    let mut acc: Vec<&WordToken> = Vec::new();

    for (i, word) in words.iter().enumerate() {
        acc.push(word);
        if should_break(word, words.get(i + 1), &acc, cfg) {
            emit_line(&mut lines, &acc, cfg);
            acc.clear();
        }
    }

    // The predicate always fires on the last word, so this only runs for
    // malformed streams.
    if !acc.is_empty() {
        emit_line(&mut lines, &acc, cfg);
    }

    lines
}

fn should_break(
    current: &WordToken,
    next: Option<&WordToken>,
    acc: &[&WordToken],
    cfg: &SegmenterConfig,
) -> bool {
    let Some(next) = next else {
        return true;
    };
    if is_section_marker(&current.text) || is_section_marker(&next.text) {
        return true;
    }
    if current.text.contains(TERMINAL_PUNCTUATION) {
        return true;
    }
    if next.start_seconds - current.end_seconds > cfg.gap_seconds {
        return true;
    }
    let joined = joined_text(acc).chars().count() + 1 + next.text.trim().chars().count();
    joined > cfg.max_line_chars
}

fn is_section_marker(text: &str) -> bool {
    text.contains('(') && text.contains(')')
}

fn joined_text(words: &[&WordToken]) -> String {
    words
        .iter()
        .map(|w| w.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

// Single emission path for both the in-loop break and the end-of-stream
// flush; start and end always come from the accumulator itself.
fn emit_line(lines: &mut Vec<LyricLine>, acc: &[&WordToken], cfg: &SegmenterConfig) {
    let (Some(first), Some(last)) = (acc.first(), acc.last()) else {
        return;
    };
    let text = joined_text(acc);
    if text.is_empty() {
        return;
    }
    lines.push(LyricLine {
        index: lines.len(),
        text,
        start_ms: ((first.start_seconds - cfg.lead_in_seconds) * 1000.0).round() as i64,
        end_ms: (last.end_seconds * 1000.0).round() as i64,
    });
}

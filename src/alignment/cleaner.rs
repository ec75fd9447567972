//! Post-pass over segmented lines
//!
//! Strips the formatting noise the word stream carries (embedded newlines,
//! space-padded parens) and drops lines with nothing singable on them.
//! Dropped lines are not renumbered.

use once_cell::sync::Lazy;
use regex::Regex;

use super::segmenter::LyricLine;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static OPEN_PAREN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s+").unwrap());
static CLOSE_PAREN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\)").unwrap());
static BARE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([^)]+\)$").unwrap());

/// Clean every line's text, dropping bare `(marker)` lines and lines that
/// end up empty. Surviving lines keep their emission-time indices.
pub fn clean_lines(lines: Vec<LyricLine>) -> Vec<LyricLine> {
    lines
        .into_iter()
        .filter_map(|mut line| {
            let text = WHITESPACE_RUN.replace_all(&line.text, " ");
            let text = OPEN_PAREN_GAP.replace_all(&text, "(");
            let text = CLOSE_PAREN_GAP.replace_all(&text, ")");
            let text = text.trim();
            if text.is_empty() || BARE_MARKER.is_match(text) {
                return None;
            }
            line.text = text.to_string();
            Some(line)
        })
        .collect()
}

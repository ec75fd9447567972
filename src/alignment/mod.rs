//! Conversion of word-level alignment data into timed display lines
//!
//! This module provides:
//! - wire and internal word-token types plus the normalizer
//! - the greedy line segmenter with its break heuristics
//! - the cleaning pass that strips markers and formatting noise
//! - the playback-position lookup used to highlight the active line
//!
//! Data flows one way: raw words -> tokens -> raw lines -> cleaned lines.
//! Every call is independent, so callers may convert variants concurrently.

pub mod cleaner;
pub mod segmenter;
pub mod words;

pub use segmenter::{LyricLine, SegmenterConfig};
pub use words::AlignedWord;

/// Run the full pipeline. Corrupt timing is logged and tolerated; output
/// timing is then best-effort, matching the permissive upstream contract.
pub fn convert_alignment(raw: &[AlignedWord], cfg: &SegmenterConfig) -> Vec<LyricLine> {
    let tokens = words::normalize(raw);
    words::warn_on_invalid(&tokens);
    let lines = cleaner::clean_lines(segmenter::segment_lines(&tokens, cfg));
    tracing::debug!(words = raw.len(), lines = lines.len(), "converted alignment");
    lines
}

/// Strict variant: reject the whole conversion if the word timing violates
/// the input contract, instead of emitting nonsensical line windows.
pub fn convert_alignment_strict(
    raw: &[AlignedWord],
    cfg: &SegmenterConfig,
) -> anyhow::Result<Vec<LyricLine>> {
    let tokens = words::normalize(raw);
    words::validate(&tokens)?;
    Ok(cleaner::clean_lines(segmenter::segment_lines(&tokens, cfg)))
}

/// Array position of the most recently started line at `position_ms`, or
/// None before the first line. Lines are start-ordered, so the scan stops at
/// the first line still in the future.
pub fn find_active_line(lines: &[LyricLine], position_ms: i64) -> Option<usize> {
    let mut current = None;
    for (i, line) in lines.iter().enumerate() {
        if line.start_ms <= position_ms {
            current = Some(i);
        } else {
            break;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> AlignedWord {
        AlignedWord {
            word: text.to_string(),
            start_s: start,
            end_s: end,
            success: true,
            palign: 0.0,
        }
    }

    #[test]
    fn empty_input_converts_to_empty_output() {
        let lines = convert_alignment(&[], &SegmenterConfig::default());
        assert!(lines.is_empty());
    }

    #[test]
    fn marker_breaks_neighbors_and_is_dropped() {
        let words = vec![
            word("Hello", 0.0, 0.5),
            word("(Chorus)", 0.5, 1.0),
            word("World", 1.0, 1.5),
        ];
        let lines = convert_alignment(&words, &SegmenterConfig::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello");
        assert_eq!(lines[1].text, "World");
        // The dropped marker keeps its index slot.
        assert_eq!(lines[0].index, 0);
        assert_eq!(lines[1].index, 2);
    }

    #[test]
    fn marker_only_input_converts_to_empty_output() {
        let words = vec![word("(Intro)", 0.0, 1.0), word("(Outro)", 3.0, 4.0)];
        let lines = convert_alignment(&words, &SegmenterConfig::default());
        assert!(lines.is_empty());
    }

    #[test]
    fn strict_mode_rejects_corrupt_timing() {
        let words = vec![word("b", 2.0, 2.5), word("a", 1.0, 1.5)];
        let cfg = SegmenterConfig::default();
        assert!(convert_alignment_strict(&words, &cfg).is_err());
        // The lenient path still produces output.
        assert!(!convert_alignment(&words, &cfg).is_empty());
    }

    // Excerpt of a generated Hindi song: a section marker followed by one
    // verse line, ragged whitespace and all.
    #[test]
    fn hindi_verse_drops_marker_and_keeps_timing() {
        let words = vec![
            word("(Verse 1)\n", 24.3, 24.6),
            word("जब ", 24.71809, 24.958),
            word("से ", 24.958, 25.158),
            word("तुम ", 25.158, 25.438),
            word("मेरी ", 25.438, 25.738),
            word("ज़िंदगी ", 25.738, 26.238),
            word("में ", 26.238, 26.458),
            word("आई ", 26.458, 26.758),
            word("हो\n", 26.758, 27.118),
            word("तब ", 28.9, 29.12),
            word("से ", 29.12, 29.32),
            word("मैंने ", 29.32, 29.62),
            word("जीना ", 29.62, 29.92),
            word("सीखा ", 29.92, 30.25),
            word("है…\n", 30.25, 30.78),
        ];
        let lines = convert_alignment(&words, &SegmenterConfig::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "जब से तुम मेरी ज़िंदगी में आई हो");
        assert_eq!(lines[0].start_ms, 24518);
        assert_eq!(lines[0].end_ms, 27118);
        assert_eq!(lines[0].index, 1);
        assert_eq!(lines[1].text, "तब से मैंने जीना सीखा है…");
    }

    #[test]
    fn active_line_follows_the_playhead() {
        let lines = vec![
            LyricLine {
                index: 0,
                text: "one".to_string(),
                start_ms: 800,
                end_ms: 2000,
            },
            LyricLine {
                index: 1,
                text: "two".to_string(),
                start_ms: 5000,
                end_ms: 7000,
            },
        ];
        assert_eq!(find_active_line(&lines, 0), None);
        assert_eq!(find_active_line(&lines, 800), Some(0));
        assert_eq!(find_active_line(&lines, 3000), Some(0));
        assert_eq!(find_active_line(&lines, 5000), Some(1));
        assert_eq!(find_active_line(&lines, 60_000), Some(1));
        assert_eq!(find_active_line(&[], 1000), None);
    }
}

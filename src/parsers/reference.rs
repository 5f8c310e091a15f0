/*!
 * Reference track parser.
 *
 * Reads timestamp-pair delimited cue records:
 *
 * ```text
 * 3
 * 00:01:08.360 --> 00:01:09.653 align:start position:48% line:79%
 * <i>All he does is just talk about</i>
 * ```
 *
 * The numeric index line and the positioning metadata are optional. Header
 * lines (`WEBVTT`, `X-TIMESTAMP-MAP`) before the first timestamp are ignored,
 * which also lets several concatenated segment files parse as one track.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::{parse_timestamp, ReferenceCue};
use crate::text_normalizer::{has_words, normalize_reference};

static CUE_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?:\d{2,}:)?\d{2}:\d{2}\.\d{3})\s*-->\s*((?:\d{2,}:)?\d{2}:\d{2}\.\d{3})").unwrap()
});

static INDEX_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").unwrap()
});

struct PendingCue {
    start_ms: i64,
    end_ms: i64,
    lines: Vec<String>,
}

/// Parse a reference track body into normalized cues.
///
/// Cues without a single comparable word are dropped. Adjacent duplicates
/// produced by segmented delivery are merged afterwards.
pub fn parse_reference(body: &str) -> Vec<ReferenceCue> {
    let lines: Vec<&str> = body.lines().map(|l| l.trim_end_matches('\r')).collect();
    let mut pending: Vec<PendingCue> = Vec::new();
    let mut current: Option<PendingCue> = None;
    let mut body_closed = false;

    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = CUE_TIMING_REGEX.captures(line) {
            let timing = (parse_timestamp(&caps[1]), parse_timestamp(&caps[2]));
            match timing {
                (Ok(start_ms), Ok(end_ms)) => {
                    if let Some(cue) = current.take() {
                        pending.push(cue);
                    }
                    current = Some(PendingCue { start_ms, end_ms, lines: Vec::new() });
                    body_closed = false;
                }
                _ => warn!("Invalid cue timing at line {}: {}", idx + 1, line),
            }
            continue;
        }

        let Some(cue) = current.as_mut() else {
            continue;
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !cue.lines.is_empty() {
                body_closed = true;
            }
            continue;
        }
        if body_closed {
            continue;
        }

        // an index line directly followed by the next timing belongs to the next cue
        let next_is_timing = lines.get(idx + 1).is_some_and(|next| CUE_TIMING_REGEX.is_match(next));
        if next_is_timing && INDEX_LINE_REGEX.is_match(trimmed) {
            continue;
        }

        cue.lines.push(trimmed.to_string());
    }

    if let Some(cue) = current.take() {
        pending.push(cue);
    }

    let mut cues = Vec::with_capacity(pending.len());
    for cue in pending {
        let text = normalize_reference(&cue.lines.join("\n"));
        if !has_words(&text) {
            continue;
        }
        let sequence_id = cues.len() + 1;
        cues.push(ReferenceCue::new(sequence_id, cue.start_ms, cue.end_ms, text));
    }

    let parsed = cues.len();
    let cues = merge_touching_duplicates(cues);
    if cues.len() < parsed {
        debug!("Merged {} duplicated reference cues", parsed - cues.len());
    }

    cues
}

/// Merge adjacent cues with identical text whose timings touch.
///
/// Touching means the later cue starts exactly at the earlier cue's start or
/// end. The merged cue keeps the earlier id and spans both.
pub fn merge_touching_duplicates(cues: Vec<ReferenceCue>) -> Vec<ReferenceCue> {
    let mut merged: Vec<ReferenceCue> = Vec::with_capacity(cues.len());

    for cue in cues {
        match merged.last_mut() {
            Some(prev)
                if prev.text == cue.text
                    && (cue.start_ms == prev.start_ms || cue.start_ms == prev.end_ms) =>
            {
                prev.end_ms = cue.end_ms;
            }
            _ => merged.push(cue),
        }
    }

    merged
}

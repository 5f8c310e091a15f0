/*!
 * Structured diagnostics of one alignment run.
 *
 * Every decision the engine and the repair step take is recorded as a
 * `TraceEvent`. The `Display` form is the human-readable episode log; the
 * serialized form is what the JSON report carries.
 */

use serde::Serialize;
use std::fmt;

use crate::alignment::similarity::MatchType;
use crate::app_config::MatchConfig;
use crate::subtitle_processor::{format_trace_timestamp, CaptionCue, ReferenceCue};

const SEPARATOR: &str = "------------------------------";

/// Which track a merge touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Reference,
    Caption,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Reference => f.write_str("reference"),
            Track::Caption => f.write_str("caption"),
        }
    }
}

/// One recorded decision
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Options the run was started with
    RunParameters { config: MatchConfig },

    /// A candidate was accepted
    Accepted {
        match_type: MatchType,
        offset_ms: i64,
        ref_index: usize,
        cap_index: usize,
        reference: ReferenceCue,
        caption: CaptionCue,
    },

    /// A short caption sentence matched too far away and was discarded
    OutlierRejected {
        match_type: MatchType,
        offset_ms: i64,
        ref_index: usize,
        cap_index: usize,
        reference: ReferenceCue,
        caption: CaptionCue,
    },

    /// An unmatched caption cue moved by the last accepted offset
    UnmatchedShift { cap_index: usize, cap_id: usize, offset_ms: i64 },

    /// Two adjacent cues were combined for good
    Merged { track: Track, index: usize, kept_id: usize, removed_id: usize },

    /// Caption cues before the first match were dropped
    LeadingTrim { count: usize },

    /// Caption cues after the last match were dropped
    TrailingTrim { count: usize },

    /// Caption cues after the last match were left with their own timing
    UnmatchedTail { count: usize },

    /// A retimed cue starts before its predecessor ends
    Overlap { index: usize, previous_id: usize, cue_id: usize, overflow_ms: i64 },
}

fn write_pair(
    f: &mut fmt::Formatter<'_>,
    reference: &ReferenceCue,
    caption: &CaptionCue,
) -> fmt::Result {
    writeln!(
        f,
        "{} --> {}",
        format_trace_timestamp(caption.start_ms),
        format_trace_timestamp(caption.end_ms)
    )?;
    writeln!(f, "{}", caption.text_foreign)?;
    writeln!(f, "{}", caption.text_native)?;
    writeln!(f, "{}", SEPARATOR)?;
    writeln!(
        f,
        "{} --> {}",
        format_trace_timestamp(reference.start_ms),
        format_trace_timestamp(reference.end_ms)
    )?;
    writeln!(f, "{}", reference.text)
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::RunParameters { config } => write!(
                f,
                "search_forward_max = {}, multiline_merge_max_offset_ms = {}, \
                 offset_alert_max_words = {}, offset_alert_max_ms = {}, \
                 same_tolerant_ratio = {}, same_tolerant_min_words = {}",
                config.search_forward_max,
                config.multiline_merge_max_offset_ms,
                config.offset_alert_max_words,
                config.offset_alert_max_ms,
                config.same_tolerant_ratio,
                config.same_tolerant_min_words
            ),
            TraceEvent::Accepted { match_type, offset_ms, ref_index, cap_index, reference, caption } => {
                write_pair(f, reference, caption)?;
                write!(
                    f,
                    "[{}] offset = {}, cap_index = {}, ref_index = {}",
                    match_type, offset_ms, cap_index, ref_index
                )
            }
            TraceEvent::OutlierRejected { match_type, offset_ms, ref_index, cap_index, reference, caption } => {
                write_pair(f, reference, caption)?;
                write!(
                    f,
                    "[{}] rejected, offset = {} too large for a short sentence, cap_index = {}, ref_index = {}",
                    match_type, offset_ms, cap_index, ref_index
                )
            }
            TraceEvent::UnmatchedShift { cap_index, cap_id, offset_ms } => write!(
                f,
                "caption cue {} (cap_index = {}) unmatched, shifted by {}",
                cap_id, cap_index, offset_ms
            ),
            TraceEvent::Merged { track, index, kept_id, removed_id } => write!(
                f,
                "merged {} cue {} into {} at index {}",
                track, removed_id, kept_id, index
            ),
            TraceEvent::LeadingTrim { count } => {
                write!(f, "deleted {} caption cues before the first match", count)
            }
            TraceEvent::TrailingTrim { count } => {
                write!(f, "deleted {} caption cues after the last match", count)
            }
            TraceEvent::UnmatchedTail { count } => {
                write!(f, "{} caption cues after the last match are unmatched", count)
            }
            TraceEvent::Overlap { index, previous_id, cue_id, overflow_ms } => write!(
                f,
                "cue {} overlaps cue {} by {}ms at index {}",
                cue_id, previous_id, overflow_ms, index
            ),
        }
    }
}

/// Ordered events of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events matching a predicate
    pub fn count(&self, predicate: impl Fn(&TraceEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{}", event)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/*!
 * Post-alignment repair of the caption track.
 *
 * Applies the accepted matches to the caption cues, trims junk outside the
 * matched range, restores start-time order and reports overlaps it finds
 * afterwards. Overlaps are reported, never corrected.
 */

use log::{debug, warn};
use serde::Serialize;

use crate::alignment::engine::MatchRecord;
use crate::alignment::trace::{Trace, TraceEvent};
use crate::subtitle_processor::CaptionCue;

/// What the repair step changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    /// Caption cues deleted before the first match
    pub leading_deleted: usize,
    /// Caption cues deleted after the last match
    pub trailing_deleted: usize,
    /// Caption cues after the last match kept with propagated timing
    pub unmatched_tail: usize,
    /// Adjacent pairs where a cue starts before its predecessor ends
    pub overlap_count: usize,
}

/// Retime, trim and reorder `captions` according to `matches`.
///
/// `reference_len` is the length of the working reference sequence the
/// matches were computed against. Leading cues are only trimmed when the
/// first reference cue matched, trailing cues only when the last one did.
pub fn repair(
    captions: &mut Vec<CaptionCue>,
    matches: &[MatchRecord],
    reference_len: usize,
    trace: &mut Trace,
) -> RepairSummary {
    let mut summary = RepairSummary::default();

    let (Some(first), Some(last)) = (matches.first(), matches.last()) else {
        return summary;
    };

    for record in matches {
        let Some(cue) = captions.get_mut(record.cap_index) else {
            warn!("Match refers to missing caption index {}", record.cap_index);
            continue;
        };
        if record.match_type.keeps_caption_duration() {
            cue.shift(record.offset_ms);
        } else {
            cue.start_ms = record.reference.start_ms;
            cue.end_ms = record.reference.end_ms;
        }
    }

    if first.ref_index == 0 && first.cap_index > 0 {
        let count = first.cap_index.min(captions.len());
        captions.drain(..count);
        summary.leading_deleted = count;
        trace.push(TraceEvent::LeadingTrim { count });
    }

    if let Some(position) = captions.iter().position(|c| c.sequence_id == last.cap_id) {
        let after = captions.len() - position - 1;
        if last.ref_index + 1 == reference_len {
            if after > 0 {
                captions.truncate(position + 1);
                summary.trailing_deleted = after;
                trace.push(TraceEvent::TrailingTrim { count: after });
            }
        } else if after > 0 {
            summary.unmatched_tail = after;
            warn!("{} caption cues after the last match are unmatched", after);
            trace.push(TraceEvent::UnmatchedTail { count: after });
        }
    }

    captions.sort_by_key(|c| c.start_ms);

    for index in 1..captions.len() {
        let previous = &captions[index - 1];
        let cue = &captions[index];
        if cue.start_ms < previous.end_ms {
            summary.overlap_count += 1;
            trace.push(TraceEvent::Overlap {
                index,
                previous_id: previous.sequence_id,
                cue_id: cue.sequence_id,
                overflow_ms: previous.end_ms - cue.start_ms,
            });
        }
    }

    debug!(
        "Repair: {} leading and {} trailing cues removed, {} overlaps",
        summary.leading_deleted, summary.trailing_deleted, summary.overlap_count
    );

    summary
}

/*!
 * Greedy two-cursor matcher.
 *
 * The engine walks the caption track once. For each caption cue it scans a
 * bounded window of reference cues starting right after the last accepted
 * match and stops at the first candidate the similarity predicates accept.
 * It never backtracks, so accepted matches are monotonic on both tracks.
 *
 * Merges found while evaluating a candidate are applied to the working
 * sequences immediately and stay applied. Removed cues always sit after
 * both cursors, which keeps every previously recorded index valid.
 */

use log::{debug, info, warn};
use serde::Serialize;

use crate::alignment::similarity::{is_prefix_similar, is_same, MatchType};
use crate::alignment::trace::{Trace, TraceEvent, Track};
use crate::app_config::MatchConfig;
use crate::subtitle_processor::{CaptionCue, ReferenceCue};
use crate::text_normalizer::{has_words, word_count};

// @struct: One accepted pairing of a caption cue with a reference cue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    // @field: How the pair matched
    pub match_type: MatchType,

    // @field: Reference start minus caption start, in ms
    pub offset_ms: i64,

    // @field: Position in the working reference sequence
    pub ref_index: usize,

    // @field: Position in the working caption sequence
    pub cap_index: usize,

    // @field: Sequence id of the reference cue
    pub ref_id: usize,

    // @field: Sequence id of the caption cue
    pub cap_id: usize,

    // @field: Reference cue as accepted, merges included
    pub reference: ReferenceCue,

    // @field: Caption cue as accepted, merges included
    pub caption: CaptionCue,
}

/// Matches one caption track against one reference track
pub struct MatchEngine<'a> {
    config: &'a MatchConfig,
}

impl<'a> MatchEngine<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        Self { config }
    }

    /// Run the matcher over both working sequences.
    ///
    /// Both sequences may shrink through merges, and unmatched caption cues
    /// are moved by the most recent accepted offset. Every decision is
    /// appended to `trace`.
    pub fn find_matches(
        &self,
        reference: &mut Vec<ReferenceCue>,
        captions: &mut Vec<CaptionCue>,
        trace: &mut Trace,
    ) -> Vec<MatchRecord> {
        trace.push(TraceEvent::RunParameters { config: self.config.clone() });

        let mut matches: Vec<MatchRecord> = Vec::new();
        let mut i_ref = 0;
        let mut i_cap = 0;
        let mut rejected = 0;

        while i_cap < captions.len() {
            let mut found = false;

            if has_words(&captions[i_cap].text_foreign) {
                let mut candidates = 0;
                let mut k = i_ref;

                while k < reference.len() && candidates < self.config.search_forward_max {
                    if !has_words(&reference[k].text) {
                        k += 1;
                        continue;
                    }
                    candidates += 1;

                    let match_type = self.evaluate_candidate(reference, captions, k, i_cap, trace);
                    if match_type == MatchType::NoMatch {
                        k += 1;
                        continue;
                    }

                    let offset_ms = reference[k].start_ms - captions[i_cap].start_ms;
                    let record = MatchRecord {
                        match_type,
                        offset_ms,
                        ref_index: k,
                        cap_index: i_cap,
                        ref_id: reference[k].sequence_id,
                        cap_id: captions[i_cap].sequence_id,
                        reference: reference[k].clone(),
                        caption: captions[i_cap].clone(),
                    };

                    if self.is_outlier(&record) {
                        warn!(
                            "Discarding {} match of caption {} with offset {}ms",
                            record.match_type, record.cap_id, record.offset_ms
                        );
                        rejected += 1;
                        trace.push(TraceEvent::OutlierRejected {
                            match_type: record.match_type,
                            offset_ms: record.offset_ms,
                            ref_index: record.ref_index,
                            cap_index: record.cap_index,
                            reference: record.reference,
                            caption: record.caption,
                        });
                    } else {
                        debug!(
                            "[{}] caption {} -> reference {}, offset = {}",
                            record.match_type, record.cap_id, record.ref_id, record.offset_ms
                        );
                        trace.push(TraceEvent::Accepted {
                            match_type: record.match_type,
                            offset_ms: record.offset_ms,
                            ref_index: record.ref_index,
                            cap_index: record.cap_index,
                            reference: record.reference.clone(),
                            caption: record.caption.clone(),
                        });
                        matches.push(record);
                        i_ref = k + 1;
                        found = true;
                    }

                    // first hit ends the window whether it was kept or not
                    break;
                }
            }

            if !found {
                if let Some(last) = matches.last() {
                    let cue = &mut captions[i_cap];
                    cue.shift(last.offset_ms);
                    trace.push(TraceEvent::UnmatchedShift {
                        cap_index: i_cap,
                        cap_id: cue.sequence_id,
                        offset_ms: last.offset_ms,
                    });
                }
            }

            i_cap += 1;
        }

        info!(
            "Matched {} of {} caption cues against {} reference cues ({} outliers discarded)",
            matches.len(),
            captions.len(),
            reference.len(),
            rejected
        );

        matches
    }

    /// Short sentences far away from their reference are not trusted
    fn is_outlier(&self, record: &MatchRecord) -> bool {
        word_count(&record.caption.text_foreign) <= self.config.offset_alert_max_words
            && record.offset_ms.abs() > self.config.offset_alert_max_ms
    }

    /// Classify one candidate pair, committing any merge the verdict relies on.
    ///
    /// Tried in order: plain sameness, reference two-line merge, caption
    /// two-line merge, both merges, then a shared opening.
    pub fn evaluate_candidate(
        &self,
        reference: &mut Vec<ReferenceCue>,
        captions: &mut Vec<CaptionCue>,
        k: usize,
        c: usize,
        trace: &mut Trace,
    ) -> MatchType {
        if is_same(&reference[k].text, &captions[c].text_foreign, self.config) {
            return MatchType::AllSame;
        }

        let max_gap = self.config.multiline_merge_max_offset_ms;

        let merged_ref = reference.get(k + 1).and_then(|next| {
            let current = &reference[k];
            let mergeable = has_words(&next.text) && next.start_ms - current.start_ms <= max_gap;
            mergeable.then(|| {
                let mut merged = current.clone();
                merged.merge_next(next);
                merged
            })
        });

        let merged_cap = captions.get(c + 1).and_then(|next| {
            let current = &captions[c];
            let mergeable = has_words(&next.text_foreign)
                && next.start_ms >= current.start_ms
                && next.start_ms - current.start_ms <= max_gap;
            mergeable.then(|| {
                let mut merged = current.clone();
                merged.merge_next(next);
                merged
            })
        });

        if let Some(merged) = &merged_ref {
            if is_same(&merged.text, &captions[c].text_foreign, self.config) {
                commit_reference_merge(reference, k, merged.clone(), trace);
                return MatchType::RefMultiSame;
            }
        }

        if let Some(merged) = &merged_cap {
            if is_same(&reference[k].text, &merged.text_foreign, self.config) {
                commit_caption_merge(captions, c, merged.clone(), trace);
                return MatchType::CapMultiSame;
            }
        }

        if let (Some(ref_merged), Some(cap_merged)) = (merged_ref, merged_cap) {
            if is_same(&ref_merged.text, &cap_merged.text_foreign, self.config) {
                commit_reference_merge(reference, k, ref_merged, trace);
                commit_caption_merge(captions, c, cap_merged, trace);
                return MatchType::BothMultiSame;
            }
        }

        is_prefix_similar(&reference[k].text, &captions[c].text_foreign)
    }
}

fn commit_reference_merge(
    reference: &mut Vec<ReferenceCue>,
    k: usize,
    merged: ReferenceCue,
    trace: &mut Trace,
) {
    let removed = reference.remove(k + 1);
    trace.push(TraceEvent::Merged {
        track: Track::Reference,
        index: k,
        kept_id: merged.sequence_id,
        removed_id: removed.sequence_id,
    });
    reference[k] = merged;
}

fn commit_caption_merge(
    captions: &mut Vec<CaptionCue>,
    c: usize,
    merged: CaptionCue,
    trace: &mut Trace,
) {
    let removed = captions.remove(c + 1);
    trace.push(TraceEvent::Merged {
        track: Track::Caption,
        index: c,
        kept_id: merged.sequence_id,
        removed_id: removed.sequence_id,
    });
    captions[c] = merged;
}

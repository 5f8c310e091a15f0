/*!
 * Subtitle alignment core.
 *
 * - `similarity`: sentence predicates and match types
 * - `engine`: the greedy matcher over both cue sequences
 * - `repair`: retiming, trimming and overlap detection after matching
 * - `report`: statistics of a finished run
 * - `trace`: structured record of every decision taken
 *
 * Everything here is synchronous and owns its working copies; nothing is
 * shared between runs.
 */

pub mod engine;
pub mod repair;
pub mod report;
pub mod similarity;
pub mod trace;

use log::info;
use serde::Serialize;

use crate::app_config::MatchConfig;
use crate::errors::AlignError;
use crate::subtitle_processor::{format_percentage, CaptionCue, ReferenceCue};

pub use engine::{MatchEngine, MatchRecord};
pub use repair::RepairSummary;
pub use report::MatchReport;
pub use similarity::MatchType;
pub use trace::{Trace, TraceEvent};

// @struct: Outcome of aligning one caption track with one reference track
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentResult {
    // @field: Reference cues after merges
    pub reference: Vec<ReferenceCue>,

    // @field: Retimed caption cues, sorted by start
    pub captions: Vec<CaptionCue>,

    // @field: Accepted matches in caption order
    pub matches: Vec<MatchRecord>,

    // @field: Every decision taken during the run
    pub trace: Trace,

    // @field: Derived statistics
    pub report: MatchReport,
}

impl AlignmentResult {
    pub fn match_rate(&self) -> f64 {
        self.report.match_rate
    }
}

/// Align a caption track to a reference track with one configuration.
///
/// Takes ownership of both sequences; callers running several
/// configurations pass a fresh clone to each run. Fails only when a track
/// is empty. A run without a single match succeeds with a zero rate.
pub fn align(
    reference: Vec<ReferenceCue>,
    captions: Vec<CaptionCue>,
    config: &MatchConfig,
) -> Result<AlignmentResult, AlignError> {
    if reference.is_empty() {
        return Err(AlignError::EmptyReference);
    }
    if captions.is_empty() {
        return Err(AlignError::EmptyCaption);
    }

    let mut reference = reference;
    let mut captions = captions;
    let mut trace = Trace::new();

    let matches = MatchEngine::new(config).find_matches(&mut reference, &mut captions, &mut trace);
    let summary = repair::repair(&mut captions, &matches, reference.len(), &mut trace);
    let report = MatchReport::build(&matches, captions.len(), reference.len(), summary);

    info!(
        "Alignment finished: {} matches, match rate {}",
        report.match_count,
        format_percentage(report.match_rate)
    );

    Ok(AlignmentResult { reference, captions, matches, trace, report })
}

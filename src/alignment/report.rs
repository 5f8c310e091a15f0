/*!
 * Statistics derived from one alignment run.
 */

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::alignment::engine::MatchRecord;
use crate::alignment::repair::RepairSummary;
use crate::alignment::similarity::MatchType;
use crate::subtitle_processor::format_percentage;

/// Largest forward step between two consecutive matches on one track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Jump {
    pub size: usize,
    /// Index of the later match of the pair
    pub at_index: usize,
}

/// Aggregated view of an alignment run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub type_counts: BTreeMap<MatchType, usize>,
    pub match_count: usize,
    pub caption_count: usize,
    pub reference_count: usize,
    pub match_rate: f64,
    pub max_ref_jump: Jump,
    pub max_cap_jump: Jump,
    pub first_ref_index: Option<usize>,
    pub first_cap_index: Option<usize>,
    pub max_abs_offset_ms: Option<i64>,
    pub min_abs_offset_ms: Option<i64>,
    pub repair: RepairSummary,
}

impl MatchReport {
    /// Build the report from accepted matches and the repaired track sizes
    pub fn build(
        matches: &[MatchRecord],
        caption_count: usize,
        reference_count: usize,
        repair: RepairSummary,
    ) -> Self {
        let mut type_counts: BTreeMap<MatchType, usize> =
            MatchType::ACCEPTED.iter().map(|t| (*t, 0)).collect();
        for record in matches {
            *type_counts.entry(record.match_type).or_insert(0) += 1;
        }

        let match_rate = if caption_count == 0 {
            0.0
        } else {
            matches.len() as f64 / caption_count as f64
        };

        let offsets = matches.iter().map(|m| m.offset_ms.abs());

        Self {
            type_counts,
            match_count: matches.len(),
            caption_count,
            reference_count,
            match_rate,
            max_ref_jump: max_jump(matches, |m| m.ref_index),
            max_cap_jump: max_jump(matches, |m| m.cap_index),
            first_ref_index: matches.first().map(|m| m.ref_index),
            first_cap_index: matches.first().map(|m| m.cap_index),
            max_abs_offset_ms: offsets.clone().max(),
            min_abs_offset_ms: offsets.min(),
            repair,
        }
    }

    pub fn count_of(&self, match_type: MatchType) -> usize {
        self.type_counts.get(&match_type).copied().unwrap_or(0)
    }
}

fn max_jump(matches: &[MatchRecord], index: impl Fn(&MatchRecord) -> usize) -> Jump {
    matches.windows(2).fold(Jump::default(), |best, pair| {
        let size = index(&pair[1]).saturating_sub(index(&pair[0]));
        if size > best.size {
            Jump { size, at_index: index(&pair[1]) }
        } else {
            best
        }
    })
}

fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {} invalid end timestamps", self.repair.overlap_count)?;
        if self.repair.leading_deleted > 0 {
            writeln!(f, "### removed {} leading caption cues", self.repair.leading_deleted)?;
        }
        if self.repair.trailing_deleted > 0 {
            writeln!(f, "### removed {} trailing caption cues", self.repair.trailing_deleted)?;
        }

        for match_type in MatchType::ACCEPTED {
            let count = self.count_of(match_type);
            let ratio = if self.match_count == 0 { 0.0 } else { count as f64 / self.match_count as f64 };
            writeln!(f, "### [{}] = {}, ratio = {}", match_type, count, format_percentage(ratio))?;
        }

        writeln!(
            f,
            "### max_ref_jump = {}, jump_ref_index = {}",
            self.max_ref_jump.size, self.max_ref_jump.at_index
        )?;
        writeln!(
            f,
            "### max_cap_jump = {}, jump_cap_index = {}",
            self.max_cap_jump.size, self.max_cap_jump.at_index
        )?;
        writeln!(
            f,
            "### first_matched_ref = {}, first_matched_cap = {}",
            or_dash(self.first_ref_index),
            or_dash(self.first_cap_index)
        )?;
        writeln!(f, "### unmatched_tail = {}", self.repair.unmatched_tail)?;
        writeln!(
            f,
            "### caption_count = {}, reference_count = {}",
            self.caption_count, self.reference_count
        )?;
        writeln!(
            f,
            "### match_count = {}, match rate = {}",
            self.match_count,
            format_percentage(self.match_rate)
        )?;
        write!(
            f,
            "### max_offset = {}, min_offset = {}",
            or_dash(self.max_abs_offset_ms),
            or_dash(self.min_abs_offset_ms)
        )
    }
}

/*!
 * Runs every configured profile over the same pair of tracks and keeps
 * the best outcome.
 */

use log::{debug, info};

use crate::alignment::{align, AlignmentResult};
use crate::app_config::MatchConfig;
use crate::errors::AlignError;
use crate::subtitle_processor::{format_percentage, CaptionCue, ReferenceCue};

/// Best result among several profile runs
#[derive(Debug, Clone)]
pub struct ProfileRun {
    /// Result with the highest match rate
    pub best: AlignmentResult,
    /// Position of the winning profile
    pub best_index: usize,
    /// Match rate of every profile, in profile order
    pub rates: Vec<f64>,
}

/// Align once per profile, each run on its own copy of both tracks.
///
/// The highest match rate wins; on a tie the earlier profile is kept.
pub fn run_profiles(
    reference: &[ReferenceCue],
    captions: &[CaptionCue],
    profiles: &[MatchConfig],
) -> Result<ProfileRun, AlignError> {
    let mut best: Option<(usize, AlignmentResult)> = None;
    let mut rates = Vec::with_capacity(profiles.len());

    for (index, profile) in profiles.iter().enumerate() {
        let result = align(reference.to_vec(), captions.to_vec(), profile)?;
        let rate = result.match_rate();
        rates.push(rate);

        if profiles.len() > 1 {
            debug!("Profile {} match rate: {}", index + 1, format_percentage(rate));
        }

        let better = best.as_ref().is_none_or(|(_, current)| rate > current.match_rate());
        if better {
            best = Some((index, result));
        }
    }

    // no profile means nothing was aligned; report it like an absent caption track
    let (best_index, best) = best.ok_or(AlignError::EmptyCaption)?;

    if profiles.len() > 1 {
        info!(
            "Best match rate from profile {}: {}",
            best_index + 1,
            format_percentage(best.match_rate())
        );
    }

    Ok(ProfileRun { best, best_index, rates })
}

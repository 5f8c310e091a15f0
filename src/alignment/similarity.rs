/*!
 * Sentence similarity predicates.
 *
 * Both predicates work on case-folded word sequences produced by
 * `text_normalizer::words`. They tolerate exactly one divergent word so
 * that a typo or a dropped interjection on either side still matches.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::app_config::MatchConfig;
use crate::text_normalizer::words;

/// Consecutive equal leading words needed for a prefix match
const SIMILAR_MIN_WORDS: usize = 6;

/// Same as above after the single tolerated divergence was used
const SIMILAR_MIN_WORDS_TOLERANT: usize = 7;

/// Both sentences need this many words before one substitution is forgiven
const SAME_MIN_LENGTH_TOLERANT: usize = 5;

/// How a caption cue was matched to a reference cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    NoMatch,
    /// Whole sentences are the same
    AllSame,
    /// Two reference lines merged equal one caption line
    RefMultiSame,
    /// One reference line equals two merged caption lines
    CapMultiSame,
    /// Two merged lines on both sides are the same
    BothMultiSame,
    /// Sentences share a long common opening
    Similar,
}

impl MatchType {
    /// Every accepted match type, in report order
    pub const ACCEPTED: [MatchType; 5] = [
        MatchType::AllSame,
        MatchType::RefMultiSame,
        MatchType::CapMultiSame,
        MatchType::BothMultiSame,
        MatchType::Similar,
    ];

    /// Human-readable label used in traces and reports
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::NoMatch => "no match",
            MatchType::AllSame => "all same",
            MatchType::RefMultiSame => "reference two-line same",
            MatchType::CapMultiSame => "caption two-line same",
            MatchType::BothMultiSame => "both two-line same",
            MatchType::Similar => "same opening",
        }
    }

    /// Similar matches keep the caption's own duration when retimed
    pub fn keeps_caption_duration(&self) -> bool {
        matches!(self, MatchType::Similar)
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a reference sentence and a caption sentence say the same thing.
///
/// Long caption sentences (at least `same_tolerant_min_words`) first get a
/// bigram similarity check against `1 - same_tolerant_ratio`. Otherwise the
/// word lists must be equal, except that one substitution or one extra word
/// is forgiven when both sides have at least five words.
pub fn is_same(reference: &str, caption: &str, config: &MatchConfig) -> bool {
    let words_ref = words(reference);
    let words_cap = words(caption);

    if words_cap.len() >= config.same_tolerant_min_words {
        let score = bigram_similarity(reference, caption);
        if score >= 1.0 - config.same_tolerant_ratio {
            return true;
        }
    }

    if words_ref.len().abs_diff(words_cap.len()) > 1 {
        return false;
    }

    let long_enough = words_ref.len() >= SAME_MIN_LENGTH_TOLERANT
        && words_cap.len() >= SAME_MIN_LENGTH_TOLERANT;

    let (mut i, mut j) = (0, 0);
    let mut tolerated = false;
    while i < words_ref.len() && j < words_cap.len() {
        if words_ref[i] == words_cap[j] {
            i += 1;
            j += 1;
            continue;
        }

        if tolerated || !long_enough {
            return false;
        }
        tolerated = true;

        // skip the extra word of the longer side, or the substituted pair
        match words_ref.len().cmp(&words_cap.len()) {
            std::cmp::Ordering::Greater => i += 1,
            std::cmp::Ordering::Less => j += 1,
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }

    words_ref.len() == words_cap.len() || long_enough
}

/// Dice coefficient over the character bigrams of two case-folded strings.
///
/// Whitespace and punctuation are part of the bigrams and lengths are
/// counted in characters. Strings shorter than two characters score 0.
pub fn bigram_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut remaining: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *remaining.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0;
    for pair in b.windows(2) {
        if let Some(count) = remaining.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f64 / (a.len() + b.len() - 2) as f64
}

/// Whether two sentences open the same way.
///
/// Counts equal words from the start. One divergence is bridged by
/// looking one word ahead on the left, the right, or both; a second one ends
/// the walk. Returns `Similar` after 6 equal words without a divergence or 7
/// with one, otherwise `NoMatch`.
pub fn is_prefix_similar(reference: &str, caption: &str) -> MatchType {
    let words_ref = words(reference);
    let words_cap = words(caption);

    let (mut i, mut j) = (0, 0);
    let mut equal = 0;
    let mut tolerated = false;

    while i < words_ref.len() && j < words_cap.len() {
        if words_ref[i] == words_cap[j] {
            i += 1;
            j += 1;
            equal += 1;
            if equal >= SIMILAR_MIN_WORDS && !tolerated {
                return MatchType::Similar;
            }
            continue;
        }

        if tolerated {
            break;
        }
        tolerated = true;

        let ref_next = words_ref.get(i + 1);
        let cap_next = words_cap.get(j + 1);
        if ref_next == Some(&words_cap[j]) {
            i += 1;
        } else if cap_next == Some(&words_ref[i]) {
            j += 1;
        } else if ref_next.is_some() && ref_next == cap_next {
            i += 1;
            j += 1;
        } else {
            break;
        }
    }

    let required = if tolerated { SIMILAR_MIN_WORDS_TOLERANT } else { SIMILAR_MIN_WORDS };
    if equal >= required {
        MatchType::Similar
    } else {
        MatchType::NoMatch
    }
}

/*!
 * Text normalization for subtitle comparison.
 *
 * Reference and caption tracks render the same sentence differently:
 * markup, speaker labels, sound-effect asides, style overrides and
 * contractions. Both normalizers strip their format-specific noise and then
 * share a contraction/abbreviation pass so the two renderings compare equal.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// @const: Inline tags, parenthetical asides, leading speaker label, bracketed labels, quotes
static REFERENCE_NOISE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)</?[^>]+>|\([^)]+\)|^\s*[a-z\d\- ']{3,15}:|\[[^\]]+\]|""#).unwrap()
});

// @const: Style override groups and the decorative block glyph
static CAPTION_NOISE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\.*?\}|■").unwrap()
});

static MULTI_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" {2,}").unwrap()
});

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_]+").unwrap()
});

// Order matters: "I'm" must be handled before the generic suffix rules.
static CONTRACTION_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)I'm\b", "I am"),
        (r"(?i)([a-z])n't\b", "${1} not"),
        (r"(?i)([a-z])'ll\b", "${1} will"),
        (r"(?i)([a-z])'s\b", "${1} is"),
        (r"(?i)([a-z])'ve\b", "${1} have"),
        (r"(?i)([a-z])'re\b", "${1} are"),
        (r"(?i)([a-z])'d\b", "${1} would"),
        (r"(?i)'Cause\b", "because"),
        (r"(?i)\ba\.m\b", "am"),
        (r"(?i)\bp\.m\b", "pm"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Normalize one reference cue body.
///
/// Never fails; patterns that do not occur are no-ops.
pub fn normalize_reference(raw: &str) -> String {
    let stripped = REFERENCE_NOISE_REGEX.replace_all(raw, "");
    expand_contractions(stripped.trim())
}

/// Normalize one caption dialogue payload.
pub fn normalize_caption(raw: &str) -> String {
    let stripped = CAPTION_NOISE_REGEX.replace_all(raw, "");
    let collapsed = MULTI_SPACE_REGEX.replace_all(&stripped, " ");
    expand_contractions(collapsed.trim())
}

fn expand_contractions(text: &str) -> String {
    let mut result = text.to_string();
    for (regex, replacement) in CONTRACTION_RULES.iter() {
        result = regex.replace_all(&result, *replacement).into_owned();
    }
    result.trim().to_string()
}

/// Split a sentence into case-folded comparable words
pub fn words(sentence: &str) -> Vec<String> {
    WORD_REGEX
        .find_iter(sentence)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Number of comparable words in a sentence
pub fn word_count(sentence: &str) -> usize {
    WORD_REGEX.find_iter(sentence).count()
}

/// Whether a sentence has anything to compare at all
pub fn has_words(sentence: &str) -> bool {
    WORD_REGEX.is_match(sentence)
}

/// Whether the text contains a CJK unified ideograph
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4E00}'..='\u{9FFF}').contains(&c))
}

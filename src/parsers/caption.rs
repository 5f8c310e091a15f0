/*!
 * Bilingual caption track parser.
 *
 * Only dialogue records are read:
 *
 * ```text
 * Dialogue: 0,0:00:51.27,0:00:52.44,*Default,NTP,0000,0000,0000,,小心\N{\fs14}Watch out!
 * ```
 *
 * The payload after the margin fields carries native lines first, then
 * foreign lines, separated by `\N`.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::{parse_timestamp, CaptionCue};
use crate::text_normalizer::{contains_cjk, normalize_caption};

// @const: Dialogue record: start, end, style fields, three zero margins, payload
static DIALOGUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Dialogue:\s+\d+,(\d{1,2}:\d{2}:\d{2}\.\d{2,3}),(\d{1,2}:\d{2}:\d{2}\.\d{2,3}).+,0+,0+,0+,,(.+)").unwrap()
});

// @const: Records whose payload starts with an effect marker like {=6}
static SPECIAL_EFFECT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r".+,0+,0+,0+,,\{=\d+\}").unwrap()
});

/// Explicit line break inside a dialogue payload
const LINE_BREAK_MARKER: &str = "\\N";

/// Files with at least this many multi-line records already pair both languages
const SPLIT_LAYOUT_MIN_PAIRED: usize = 20;

/// Parse caption dialogue records into bilingual cues.
///
/// Records are dropped when they match `exclude`, carry a special effect
/// marker, or contain no CJK ideograph at all.
pub fn parse_caption(body: &str, exclude: Option<&Regex>) -> Vec<CaptionCue> {
    let mut cues = Vec::new();
    let mut excluded = 0;
    let mut decorative = 0;

    for caps in DIALOGUE_REGEX.captures_iter(body) {
        let record = &caps[0];

        if exclude.is_some_and(|regex| regex.is_match(record)) {
            excluded += 1;
            continue;
        }

        if SPECIAL_EFFECT_REGEX.is_match(record) {
            decorative += 1;
            continue;
        }

        let payload = normalize_caption(&caps[3]);
        if !contains_cjk(&payload) {
            // no native text means an effect or a sign, not dialogue
            decorative += 1;
            continue;
        }

        let (start_ms, end_ms) = match (parse_timestamp(&caps[1]), parse_timestamp(&caps[2])) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                warn!("Skipping dialogue with invalid timing: {}", record);
                continue;
            }
        };

        let (native, foreign) = split_languages(&payload);
        let sequence_id = cues.len() + 1;
        cues.push(CaptionCue::new(sequence_id, start_ms, end_ms, foreign, native));
    }

    debug!(
        "Parsed {} caption cues ({} excluded by pattern, {} decorative)",
        cues.len(), excluded, decorative
    );

    cues
}

/// Split a payload into (native, foreign) text.
///
/// The first half of the lines (rounded down) is native. If the foreign half
/// still contains CJK the whole record is native-only.
fn split_languages(payload: &str) -> (String, String) {
    let parts: Vec<&str> = payload.split(LINE_BREAK_MARKER).collect();
    let mid = parts.len() / 2;
    let native = parts[..mid].join("\n");
    let foreign = parts[mid..].join("\n");

    if contains_cjk(&foreign) {
        (parts.join("\n"), String::new())
    } else {
        (native, foreign)
    }
}

/// Re-pair captions laid out as separate native and foreign records.
///
/// Some files list every native line and every foreign line as their own
/// record. Sorted by start time, consecutive records are joined two by two
/// into one bilingual record. Files that already pair languages are returned
/// unchanged.
pub fn repair_split_layout(body: &str) -> String {
    let mut records: Vec<(i64, &str, &str, &str)> = DIALOGUE_REGEX
        .captures_iter(body)
        .filter_map(|caps| {
            let start = caps.get(1)?.as_str();
            let end = caps.get(2)?.as_str();
            let payload = caps.get(3)?.as_str();
            let start_ms = parse_timestamp(start).ok()?;
            Some((start_ms, start, end, payload))
        })
        .collect();

    let paired = records.iter().filter(|r| r.3.contains(LINE_BREAK_MARKER)).count();
    if paired >= SPLIT_LAYOUT_MIN_PAIRED {
        return body.to_string();
    }

    records.sort_by_key(|r| r.0);

    let mut repaired = String::new();
    for pair in records.chunks_exact(2) {
        let (_, start, end, first) = pair[0];
        let second = pair[1].3;
        repaired.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}{}{}\n",
            start, end, first.trim_end(), LINE_BREAK_MARKER, second.trim_end()
        ));
    }

    debug!("Repaired split caption layout: {} records paired", records.len() / 2 * 2);
    repaired
}

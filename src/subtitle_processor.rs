use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

// @module: Cue types, timestamp codec and SRT rendering

// @const: Any supported timestamp: [H]H:MM:SS(.|,)fff, H:MM:SS.cc or MM:SS.fff
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d{1,3}):)?(\d{1,2}):(\d{2})[.,](\d{2,3})$").unwrap()
});

/// Line ending used in rendered SRT files
const SRT_LINE_ENDING: &str = "\r\n";

/// Start and end of the watermark cue prepended on render
const WATERMARK_END_MS: i64 = 5_000;

// @struct: One cue of the reference track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCue {
    // @field: Start time in ms
    pub start_ms: i64,

    // @field: End time in ms
    pub end_ms: i64,

    // @field: Normalized text, never empty
    pub text: String,

    // @field: Dense 1-based index assigned at parse time
    pub sequence_id: usize,
}

impl ReferenceCue {
    pub fn new(sequence_id: usize, start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        ReferenceCue {
            start_ms,
            end_ms,
            text: text.into(),
            sequence_id,
        }
    }

    /// Absorb the following cue: join text with a line break, extend the end
    pub fn merge_next(&mut self, next: &ReferenceCue) {
        self.end_ms = self.end_ms.max(next.end_ms);
        self.text = format!("{}\n{}", self.text, next.text);
    }
}

// @struct: One bilingual cue of the caption track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionCue {
    // @field: Start time in ms
    pub start_ms: i64,

    // @field: End time in ms
    pub end_ms: i64,

    // @field: Normalized foreign-language text compared against the reference
    pub text_foreign: String,

    // @field: Native-language text rendered in the output
    pub text_native: String,

    // @field: Dense 1-based index assigned at parse time
    pub sequence_id: usize,
}

impl CaptionCue {
    pub fn new(
        sequence_id: usize,
        start_ms: i64,
        end_ms: i64,
        text_foreign: impl Into<String>,
        text_native: impl Into<String>,
    ) -> Self {
        CaptionCue {
            start_ms,
            end_ms,
            text_foreign: text_foreign.into(),
            text_native: text_native.into(),
            sequence_id,
        }
    }

    /// Absorb the following cue on both language lines
    pub fn merge_next(&mut self, next: &CaptionCue) {
        self.end_ms = self.end_ms.max(next.end_ms);
        self.text_foreign = format!("{}\n{}", self.text_foreign, next.text_foreign);
        self.text_native = format!("{}\n{}", self.text_native, next.text_native);
    }

    /// Move the cue in time, preserving its duration
    pub fn shift(&mut self, offset_ms: i64) {
        self.start_ms += offset_ms;
        self.end_ms += offset_ms;
    }
}

/// Parse a timestamp to milliseconds.
///
/// Two fractional digits are centiseconds, three are milliseconds.
pub fn parse_timestamp(timestamp: &str) -> Result<i64, SubtitleError> {
    let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());
    let caps = TIMESTAMP_REGEX.captures(timestamp.trim()).ok_or_else(invalid)?;

    let field = |idx: usize| -> Result<i64, SubtitleError> {
        caps.get(idx)
            .map_or(Ok(0), |m| m.as_str().parse::<i64>().map_err(|_| invalid()))
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let fraction = caps.get(4).map(|m| m.as_str()).unwrap_or("0");
    let millis = match fraction.len() {
        2 => field(4)? * 10,
        _ => field(4)?,
    };

    // Validate time components
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

fn format_with_separator(ms: i64, separator: char) -> String {
    let ms = ms.max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, seconds, separator, millis)
}

/// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
pub fn format_timestamp(ms: i64) -> String {
    format_with_separator(ms, ',')
}

/// Format a timestamp for diagnostics (HH:MM:SS.mmm)
pub fn format_trace_timestamp(ms: i64) -> String {
    format_with_separator(ms, '.')
}

/// Render a ratio the way reports show it: one decimal, no trailing ".0"
pub fn format_percentage(ratio: f64) -> String {
    let value = (ratio * 1000.0).round() / 10.0;
    format!("{}%", value)
}

/// A numbered caption cue as it appears in the output file
struct SrtBlock<'a> {
    index: usize,
    start_ms: i64,
    end_ms: i64,
    text: &'a str,
}

impl fmt::Display for SrtBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.index, SRT_LINE_ENDING)?;
        write!(
            f,
            "{} --> {}{}",
            format_timestamp(self.start_ms),
            format_timestamp(self.end_ms),
            SRT_LINE_ENDING
        )?;
        write!(f, "{}{}{}", self.text, SRT_LINE_ENDING, SRT_LINE_ENDING)
    }
}

/// Render retimed caption cues as SRT, native text only.
///
/// The watermark, when given, becomes a leading cue covering the first
/// five seconds; it is never part of the cue sequence itself.
pub fn render_srt(cues: &[CaptionCue], watermark: Option<&str>) -> String {
    let mut body = String::new();
    let mut index = 0;

    if let Some(text) = watermark {
        index += 1;
        body.push_str(&SrtBlock { index, start_ms: 0, end_ms: WATERMARK_END_MS, text }.to_string());
    }

    for cue in cues {
        index += 1;
        let block = SrtBlock {
            index,
            start_ms: cue.start_ms,
            end_ms: cue.end_ms,
            text: &cue.text_native,
        };
        body.push_str(&block.to_string());
    }

    body
}

/*!
 * End-to-end alignment scenarios from track text to retimed cues
 */

use subsyncer::alignment::{align, MatchType, TraceEvent};
use subsyncer::app_config::MatchConfig;
use subsyncer::parsers::{parse_caption, parse_reference};
use subsyncer::subtitle_processor::{CaptionCue, ReferenceCue};
use crate::common::dialogue;

/// Contractions on one side only still give whole-sentence matches
#[test]
fn test_align_withContractionOnCaptionSide_shouldMatchAllSame() {
    let reference = parse_reference(
        "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHello there\n\n00:00:01.000 --> 00:00:02.000\nI am fine\n",
    );
    let mut body = dialogue("0:00:00.10", "0:00:01.05", r"你好\NHello there");
    body.push_str(&dialogue("0:00:01.05", "0:00:02.20", r"我很好\NI'm fine"));
    let captions = parse_caption(&body, None);

    let result = align(reference, captions, &MatchConfig::default()).unwrap();

    assert_eq!(result.matches.len(), 2);
    assert!(result.matches.iter().all(|m| m.match_type == MatchType::AllSame));
    assert_eq!(result.matches[0].offset_ms, -100);
    assert_eq!(result.matches[1].offset_ms, -50);
    let timings: Vec<(i64, i64)> = result.captions.iter().map(|c| (c.start_ms, c.end_ms)).collect();
    assert_eq!(timings, vec![(0, 1_000), (1_000, 2_000)]);
    assert_eq!(result.report.repair.overlap_count, 0);
}

/// A short sentence far from its candidate is rejected and shifted by the prior offset
#[test]
fn test_align_withFarShortSentence_shouldRejectAndShiftByPriorOffset() {
    let reference = vec![
        ReferenceCue::new(1, 0, 2_000, "Good morning everyone"),
        ReferenceCue::new(2, 42_000, 43_000, "Hello"),
    ];
    let captions = vec![
        CaptionCue::new(1, 500, 2_500, "Good morning everyone", "大家早上好"),
        CaptionCue::new(2, 3_000, 4_000, "Hello", "你好"),
    ];

    let result = align(reference, captions, &MatchConfig::default()).unwrap();

    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].offset_ms, -500);
    assert_eq!((result.captions[1].start_ms, result.captions[1].end_ms), (2_500, 3_500));
    assert_eq!(result.report.repair.unmatched_tail, 1);
    assert!((result.match_rate() - 0.5).abs() < f64::EPSILON);
    assert_eq!(
        result.trace.count(|e| matches!(e, TraceEvent::OutlierRejected { offset_ms: 39_000, .. })),
        1
    );
}

#[test]
fn test_align_withFarShortFirstSentence_shouldLeaveItUnshifted() {
    let reference = vec![ReferenceCue::new(1, 40_000, 41_000, "Hello")];
    let captions = vec![CaptionCue::new(1, 0, 1_000, "Hello", "你好")];

    let result = align(reference, captions, &MatchConfig::default()).unwrap();

    assert!(result.matches.is_empty());
    assert_eq!((result.captions[0].start_ms, result.captions[0].end_ms), (0, 1_000));
    assert_eq!(result.match_rate(), 0.0);
    assert_eq!(result.trace.count(|e| matches!(e, TraceEvent::UnmatchedShift { .. })), 0);
}

/// Segmented delivery repeats the last cue with touching timestamps
#[test]
fn test_parseReference_withTrailingTouchingDuplicate_shouldShrinkByOne() {
    let body = "WEBVTT\n\n\
                00:00:01.000 --> 00:00:02.000\nWho is there?\n\n\
                00:00:03.000 --> 00:00:04.000\nJust me\n\n\
                00:00:04.000 --> 00:00:05.000\nJust me\n";

    let cues = parse_reference(body);

    assert_eq!(cues.len(), 2);
    assert_eq!((cues[1].start_ms, cues[1].end_ms), (3_000, 5_000));
}

#[test]
fn test_parseReference_withNearlyTouchingDuplicate_shouldKeepBoth() {
    let body = "00:00:03.000 --> 00:00:04.000\nJust me\n\n\
                00:00:04.001 --> 00:00:05.000\nJust me\n";

    assert_eq!(parse_reference(body).len(), 2);
}

/// Leading junk before a match on the first reference cue is deleted
#[test]
fn test_align_withFirstMatchOnFirstReferenceCue_shouldDeleteLeadingCaptions() {
    let reference = vec![
        ReferenceCue::new(1, 20_000, 22_000, "Where have you been"),
        ReferenceCue::new(2, 23_000, 25_000, "I was at the office"),
    ];
    let captions = vec![
        CaptionCue::new(1, 0, 3_000, "Subtitles by the team", "字幕组出品"),
        CaptionCue::new(2, 9_000, 12_000, "Enjoy the show everyone", "祝大家观影愉快"),
        CaptionCue::new(3, 20_500, 22_500, "Where have you been", "你去哪了"),
        CaptionCue::new(4, 23_500, 25_500, "I was at the office", "我在办公室"),
    ];

    let result = align(reference, captions, &MatchConfig::default()).unwrap();

    assert_eq!(result.matches[0].ref_index, 0);
    assert_eq!(result.matches[0].cap_index, 2);
    assert_eq!(result.report.repair.leading_deleted, 2);
    assert_eq!(result.captions.len(), 2);
    assert_eq!(result.captions[0].sequence_id, 3);
    assert_eq!(result.match_rate(), 1.0);
}

/// No leading trim when the first match is not on the first reference cue
#[test]
fn test_align_withFirstMatchLaterInReference_shouldKeepLeadingCaptions() {
    let reference = vec![
        ReferenceCue::new(1, 0, 2_000, "Previously on the show"),
        ReferenceCue::new(2, 20_000, 22_000, "Where have you been"),
    ];
    let captions = vec![
        CaptionCue::new(1, 1_000, 3_000, "Subtitles by the team", "字幕组出品"),
        CaptionCue::new(2, 20_500, 22_500, "Where have you been", "你去哪了"),
    ];

    let result = align(reference, captions, &MatchConfig::default()).unwrap();

    assert_eq!(result.matches[0].ref_index, 1);
    assert_eq!(result.report.repair.leading_deleted, 0);
    assert_eq!(result.captions.len(), 2);
    assert_eq!(result.report.first_ref_index, Some(1));
}

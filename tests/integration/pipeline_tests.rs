/*!
 * Tests for the single-pair pipeline: files in, SRT and report out
 */

use subsyncer::alignment::MatchType;
use subsyncer::app_config::{Config, MatchConfig};
use subsyncer::app_controller::{watermark_text, Controller};
use crate::common::{self, sample_caption, SAMPLE_REFERENCE};

/// Test the full sample scene: junk trimmed, split sentence merged, all cues retimed
#[test]
fn test_alignFiles_withSampleScene_shouldRetimeEveryDialogueCue() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let reference = common::create_test_file(dir.path(), "scene.vtt", SAMPLE_REFERENCE)?;
    let caption = common::create_test_file(dir.path(), "scene.ass", &sample_caption())?;
    let output = dir.path().join("out").join("scene.srt");

    let controller = Controller::new_for_test()?;
    let run = controller.align_files(&reference, &caption, &output, None)?;
    let result = &run.best;

    assert_eq!(result.matches.len(), 7);
    assert!(result.matches.iter().all(|m| m.offset_ms == -2_500));
    assert_eq!(result.report.count_of(MatchType::RefMultiSame), 1);
    assert_eq!(result.report.count_of(MatchType::AllSame), 6);
    assert_eq!(result.report.repair.leading_deleted, 1);
    assert_eq!(result.report.repair.trailing_deleted, 1);
    assert_eq!(result.reference.len(), 7);
    assert_eq!(result.captions.len(), 7);
    assert_eq!(result.match_rate(), 1.0);
    assert_eq!((result.captions[0].start_ms, result.captions[0].end_ms), (10_000, 12_000));
    assert_eq!((result.captions[4].start_ms, result.captions[4].end_ms), (21_000, 25_000));
    assert!(output.exists());
    Ok(())
}

#[test]
fn test_alignFiles_withWatermark_shouldRenderLeadingCueAndNativeText() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let reference = common::create_test_file(dir.path(), "scene.vtt", SAMPLE_REFERENCE)?;
    let caption = common::create_test_file(dir.path(), "scene.ass", &sample_caption())?;
    let output = dir.path().join("scene.srt");

    Controller::new_for_test()?.align_files(&reference, &caption, &output, None)?;
    let srt = std::fs::read_to_string(&output)?;

    let expected_head = format!(
        "1\r\n00:00:00,000 --> 00:00:05,000\r\n{}\r\n\r\n2\r\n00:00:10,000 --> 00:00:12,000\r\n你整晚去哪了？\r\n\r\n",
        watermark_text(1.0)
    );
    assert!(srt.starts_with(&expected_head), "unexpected output:\n{}", srt);
    assert!(srt.contains("6\r\n00:00:21,000 --> 00:00:25,000\r\n那站在走廊里的女人是谁\r\n"));
    assert!(!srt.contains("Where have you been"));
    assert!(!srt.contains("下集预告"));
    assert_eq!(srt.matches(" --> ").count(), 8);
    Ok(())
}

#[test]
fn test_alignFiles_withoutWatermark_shouldStartWithFirstCue() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let reference = common::create_test_file(dir.path(), "scene.vtt", SAMPLE_REFERENCE)?;
    let caption = common::create_test_file(dir.path(), "scene.ass", &sample_caption())?;
    let output = dir.path().join("scene.srt");
    let mut config = Config::default();
    config.output.watermark = false;

    Controller::with_config(config)?.align_files(&reference, &caption, &output, None)?;
    let srt = std::fs::read_to_string(&output)?;

    assert!(srt.starts_with("1\r\n00:00:10,000 --> 00:00:12,000\r\n你整晚去哪了？\r\n"));
    assert_eq!(srt.matches(" --> ").count(), 7);
    Ok(())
}

/// Test that the second profile wins when it allows the split sentence to merge
#[test]
fn test_alignFiles_withTwoProfiles_shouldKeepBestRate() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let reference = common::create_test_file(dir.path(), "scene.vtt", SAMPLE_REFERENCE)?;
    let caption = common::create_test_file(dir.path(), "scene.ass", &sample_caption())?;
    let output = dir.path().join("scene.srt");
    let config = Config {
        profiles: vec![MatchConfig::new(35, 0, 2, 30_000, 0.1, 10)?, MatchConfig::default()],
        ..Default::default()
    };

    let run = Controller::with_config(config)?.align_files(&reference, &caption, &output, None)?;

    assert_eq!(run.best_index, 1);
    assert_eq!(run.rates.len(), 2);
    assert!((run.rates[0] - 6.0 / 7.0).abs() < 1e-9);
    assert_eq!(run.rates[1], 1.0);
    Ok(())
}

#[test]
fn test_alignFiles_withReportPath_shouldWriteJsonReport() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let reference = common::create_test_file(dir.path(), "scene.vtt", SAMPLE_REFERENCE)?;
    let caption = common::create_test_file(dir.path(), "scene.ass", &sample_caption())?;
    let output = dir.path().join("scene.srt");
    let report_path = dir.path().join("scene.json");

    Controller::new_for_test()?.align_files(&reference, &caption, &output, Some(&report_path))?;
    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_path)?)?;

    assert_eq!(report["episode"], "scene");
    assert_eq!(report["caption_encoding"], "UTF-8");
    assert_eq!(report["best_profile"], 1);
    assert_eq!(report["report"]["match_count"], 7);
    assert_eq!(report["report"]["type_counts"]["REF_MULTI_SAME"], 1);
    assert_eq!(report["report"]["repair"]["leading_deleted"], 1);

    let events = report["trace"].as_array().expect("trace should be an array");
    assert_eq!(events[0]["event"], "run_parameters");
    assert_eq!(events.iter().filter(|e| e["event"] == "accepted").count(), 7);
    assert_eq!(events.iter().filter(|e| e["event"] == "merged").count(), 1);
    Ok(())
}

#[test]
fn test_alignFiles_withEmptyCaptionFile_shouldFailWithReason() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let reference = common::create_test_file(dir.path(), "scene.vtt", SAMPLE_REFERENCE)?;
    let caption = common::create_test_file(dir.path(), "scene.ass", "[Script Info]\n")?;
    let output = dir.path().join("scene.srt");

    let err = Controller::new_for_test()?
        .align_files(&reference, &caption, &output, None)
        .unwrap_err();

    assert!(format!("{:#}", err).contains("Caption track has no usable cues"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_alignFiles_withUnrelatedReference_shouldWriteReportButNoOutput() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let reference = common::create_test_file(
        dir.path(),
        "other.vtt",
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nCompletely unrelated words here\n",
    )?;
    let caption = common::create_test_file(dir.path(), "scene.ass", &sample_caption())?;
    let output = dir.path().join("scene.srt");
    let report_path = dir.path().join("scene.json");

    let err = Controller::new_for_test()?
        .align_files(&reference, &caption, &output, Some(&report_path))
        .unwrap_err();

    assert!(err.to_string().contains("output not written"));
    assert!(!output.exists());
    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_path)?)?;
    assert_eq!(report["report"]["match_rate"], 0.0);
    Ok(())
}

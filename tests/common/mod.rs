/*!
 * Common test utilities for the subsyncer test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;


/// Routes library logs to the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// One caption dialogue record
pub fn dialogue(start: &str, end: &str, payload: &str) -> String {
    format!("Dialogue: 0,{},{},*Default,NTP,0000,0000,0000,,{}\n", start, end, payload)
}

/// Reference track of a short scene: eight cues, one sentence split over two
pub const SAMPLE_REFERENCE: &str = "WEBVTT
X-TIMESTAMP-MAP=LOCAL:00:00:00.000,MPEGTS:900000

1
00:00:10.000 --> 00:00:12.000 line:85%
Where have you been all night?

2
00:00:13.000 --> 00:00:15.000
I was at the office.

3
00:00:16.000 --> 00:00:18.000
<i>You're lying to me again.</i>

4
00:00:19.000 --> 00:00:20.500
I swear it is the truth

5
00:00:21.000 --> 00:00:23.000
Then who was that woman

6
00:00:23.500 --> 00:00:25.000
standing in the hallway?

7
00:00:27.000 --> 00:00:29.000
Let's talk about it tomorrow.

8
00:00:30.000 --> 00:00:32.000
Good night.
";

/// Caption track of the same scene, 2.5s late, with junk around the dialogue
pub fn sample_caption() -> String {
    let mut body = String::from(
        "[Script Info]\nScriptType: v4.00+\n\n[Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
    );
    body.push_str(&dialogue("0:00:00.00", "0:00:05.00", r"{=6}{\fn黑体}片头特效"));
    body.push_str(&dialogue("0:00:01.00", "0:00:05.00", r"本字幕仅供学习交流\NFor study only"));
    body.push_str(&dialogue("0:00:02.00", "0:00:04.00", "EPISODE ONE"));
    body.push_str(&dialogue("0:00:12.50", "0:00:14.50", r"你整晚去哪了？\N{\fs14}Where have you been all night?"));
    body.push_str(&dialogue("0:00:15.50", "0:00:17.50", r"我在办公室\NI was at the office."));
    body.push_str(&dialogue("0:00:18.50", "0:00:20.50", r"你又在骗我\NYou're lying to me again."));
    body.push_str(&dialogue("0:00:21.50", "0:00:23.00", r"我发誓这是真的\NI swear it's the truth"));
    body.push_str(&dialogue(
        "0:00:23.50",
        "0:00:27.50",
        r"那站在走廊里的女人是谁\NThen who was that woman standing in the hallway?",
    ));
    body.push_str(&dialogue("0:00:29.50", "0:00:31.50", r"我们明天再谈吧\NLet's talk about it tomorrow."));
    body.push_str(&dialogue("0:00:32.50", "0:00:34.50", r"晚安\NGood night."));
    body.push_str(&dialogue("0:00:40.00", "0:00:45.00", r"下集预告\NNext time on the show"));
    body
}

/// Writes a series directory with a local manifest, reference files and captions
pub fn create_series_dir(dir: &Path, episodes: &[(&str, Option<&str>)]) -> Result<()> {
    let mut entries = Vec::new();
    for (episode, reference) in episodes {
        let descriptor = format!("reference/{}.vtt", episode);
        if let Some(body) = reference {
            create_test_file(dir, &descriptor, body)?;
        }
        create_test_file(dir, &format!("Show.{}.1080p.ass", episode), &sample_caption())?;
        entries.push(format!("\"{}\": \"{}\"", episode, descriptor));
    }

    let manifest = format!("{{\"platform\": \"local\", \"episodes\": {{{}}}}}", entries.join(", "));
    create_test_file(dir, "manifest.json", &manifest)?;
    Ok(())
}

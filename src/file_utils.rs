use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Directory below the series directory holding episode logs
pub const LOG_DIR: &str = "log";

/// Directory below the series directory holding downloaded reference tracks
pub const CACHE_DIR: &str = "cache";

/// Batch summary log file name
pub const MAIN_LOG_FILE: &str = "main.log";

const CAPTION_EXTENSION: &str = ".ass";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Read a text file in whatever encoding it was saved with.
    ///
    /// Returns the decoded text and the name of the detected encoding.
    pub fn read_decoded<P: AsRef<Path>>(path: P) -> Result<(String, &'static str)> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        let (text, encoding) = decode_bytes(&bytes);
        debug!("Decoded {:?} as {}", path.as_ref(), encoding.name());
        Ok((text, encoding.name()))
    }

    /// Locate the caption file of an episode in a series directory.
    ///
    /// Any visible `.ass` file whose name contains the episode key, case
    /// insensitive, is accepted; otherwise `<episode>.ass` if it exists.
    pub fn find_caption_file<P: AsRef<Path>>(series_dir: P, episode: &str) -> Option<PathBuf> {
        let series_dir = series_dir.as_ref();
        let key = episode.to_lowercase();

        let found = WalkDir::new(series_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .find(|entry| {
                let name = entry.file_name().to_string_lossy().to_lowercase();
                !name.starts_with('.') && name.ends_with(CAPTION_EXTENSION) && name.contains(&key)
            })
            .map(|entry| entry.into_path());

        found.or_else(|| {
            let fallback = series_dir.join(format!("{}{}", episode, CAPTION_EXTENSION));
            Self::file_exists(&fallback).then_some(fallback)
        })
    }

    /// `<output>/<first three characters of the episode>/<episode>.srt`
    pub fn srt_output_path<P: AsRef<Path>>(output_dir: P, episode: &str) -> PathBuf {
        let group: String = episode.chars().take(3).collect();
        output_dir.as_ref().join(group).join(format!("{}.srt", episode))
    }

    /// `<series>/log/<episode>.log`
    pub fn episode_log_path<P: AsRef<Path>>(series_dir: P, episode: &str) -> PathBuf {
        series_dir.as_ref().join(LOG_DIR).join(format!("{}.log", episode))
    }

    /// `<series>/log/<episode>.json`
    pub fn episode_report_path<P: AsRef<Path>>(series_dir: P, episode: &str) -> PathBuf {
        series_dir.as_ref().join(LOG_DIR).join(format!("{}.json", episode))
    }

    /// `<series>/log/main.log`
    pub fn main_log_path<P: AsRef<Path>>(series_dir: P) -> PathBuf {
        series_dir.as_ref().join(LOG_DIR).join(MAIN_LOG_FILE)
    }

    /// `<series>/cache/<episode>.vtt`
    pub fn reference_cache_path<P: AsRef<Path>>(series_dir: P, episode: &str) -> PathBuf {
        series_dir.as_ref().join(CACHE_DIR).join(format!("{}.vtt", episode))
    }
}

/// Decode raw bytes: byte order mark first, then UTF-8, then a statistical guess
pub fn decode_bytes(bytes: &[u8]) -> (String, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text.into_owned(), encoding);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);
    (text.into_owned(), encoding)
}

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::alignment::{MatchReport, Trace};
use crate::app_config::Config;
use crate::errors::AlignError;
use crate::file_utils::FileManager;
use crate::manifest::EpisodeManifest;
use crate::parsers::{parse_caption, parse_reference, repair_split_layout};
use crate::providers::{provider_for_platform, ReferenceProvider};
use crate::runner::{run_profiles, ProfileRun};
use crate::subtitle_processor::{format_percentage, render_srt, CaptionCue, ReferenceCue};

// @module: Application controller for batch and single-pair synchronisation

/// Why an episode produced no output
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    OutputExists,
    CaptionMissing,
    ReferenceUnavailable,
    /// Both tracks parsed but not a single cue matched under any profile
    NoMatches,
    /// One of the tracks had no usable cues
    Align(AlignError),
    /// Anything else that went wrong for this episode only
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OutputExists => write!(f, "output exists (use -f to overwrite)"),
            SkipReason::CaptionMissing => write!(f, "caption file not found"),
            SkipReason::ReferenceUnavailable => write!(f, "reference track unavailable"),
            SkipReason::NoMatches => write!(f, "no caption cue matched the reference (see episode log)"),
            SkipReason::Align(e) => write!(f, "{} ({})", e, e.code()),
            SkipReason::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Result of one episode
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeOutcome {
    Synced {
        best_index: usize,
        rates: Vec<f64>,
        output: PathBuf,
    },
    Skipped(SkipReason),
}

impl EpisodeOutcome {
    /// Best match rate, when the episode was synced
    pub fn best_rate(&self) -> Option<f64> {
        match self {
            EpisodeOutcome::Synced { best_index, rates, .. } => rates.get(*best_index).copied(),
            EpisodeOutcome::Skipped(_) => None,
        }
    }
}

/// Outcome of a whole batch, rendered into the summary log
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub episodes: Vec<(String, EpisodeOutcome)>,
    pub low_match_rate: f64,
    pub profile_count: usize,
}

impl BatchSummary {
    /// Synced episodes whose best rate is below the review threshold
    pub fn low_match_episodes(&self) -> Vec<&str> {
        self.episodes
            .iter()
            .filter(|(_, outcome)| outcome.best_rate().is_some_and(|rate| rate < self.low_match_rate))
            .map(|(episode, _)| episode.as_str())
            .collect()
    }

    pub fn synced_count(&self) -> usize {
        self.episodes.iter().filter(|(_, o)| o.best_rate().is_some()).count()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "########## match rate summary ##########")?;
        for (episode, outcome) in &self.episodes {
            match outcome {
                EpisodeOutcome::Synced { best_index, rates, .. } if self.profile_count > 1 => {
                    let all: Vec<String> = rates.iter().map(|r| format_percentage(*r)).collect();
                    let best = rates.get(*best_index).copied().unwrap_or_default();
                    writeln!(
                        f,
                        "{}   {}   {}   [{}]",
                        episode,
                        best_index + 1,
                        format_percentage(best),
                        all.join(", ")
                    )?;
                }
                EpisodeOutcome::Synced { .. } => {
                    let best = outcome.best_rate().unwrap_or_default();
                    writeln!(f, "{}   {}", episode, format_percentage(best))?;
                }
                EpisodeOutcome::Skipped(reason) => writeln!(f, "{}   skipped: {}", episode, reason)?,
            }
        }

        let low = self.low_match_episodes();
        if !low.is_empty() {
            writeln!(f, "------------------------------")?;
            writeln!(
                f,
                "{} episodes below {}: {}",
                low.len(),
                format_percentage(self.low_match_rate),
                low.join(", ")
            )?;
            writeln!(f, "Review their logs, delete the generated files and retry with adjusted profiles")?;
        }
        Ok(())
    }
}

/// Everything written to the optional JSON report of an episode
#[derive(Serialize)]
struct EpisodeReport<'a> {
    episode: &'a str,
    caption_encoding: &'a str,
    best_profile: usize,
    rates: &'a [f64],
    report: &'a MatchReport,
    trace: &'a Trace,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Compiled caption exclusion pattern
    exclusion: Option<Regex>,
}

impl Controller {
    /// Create a controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let exclusion = config.caption.exclusion_regex()?;

        Ok(Self { config, exclusion })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Synchronise the episodes listed in a series directory's manifest
    pub async fn run_sync(
        &self,
        series_dir: PathBuf,
        episode: Option<String>,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<BatchSummary> {
        if !FileManager::dir_exists(&series_dir) {
            return Err(anyhow::anyhow!("Series directory does not exist: {:?}", series_dir));
        }

        let manifest = EpisodeManifest::load(&series_dir)?;
        let provider = provider_for_platform(&manifest.platform, &series_dir, &self.config.reference);
        info!("Reference platform '{}' served by the {} provider", manifest.platform, provider.name());

        let output_dir = output_dir.unwrap_or_else(|| series_dir.clone());
        self.run_sync_with_provider(
            &series_dir,
            &manifest,
            provider.as_ref(),
            episode.as_deref(),
            &output_dir,
            force_overwrite,
        )
        .await
    }

    /// Batch loop over the manifest with an explicit provider
    pub async fn run_sync_with_provider(
        &self,
        series_dir: &Path,
        manifest: &EpisodeManifest,
        provider: &dyn ReferenceProvider,
        episode: Option<&str>,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();
        let selected = manifest.select(episode)?;
        let profile_count = self.config.profiles.len();

        if profile_count > 1 {
            info!("{} match profiles configured, keeping the best per episode", profile_count);
        }

        let progress = ProgressBar::new(selected.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} episodes ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("█▓▒░"));

        let mut episodes = Vec::with_capacity(selected.len());
        for (key, descriptor) in selected {
            progress.set_message(format!("Syncing: {}", key));

            let outcome = match self
                .sync_episode(series_dir, key, descriptor, provider, output_dir, force_overwrite)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[{}] {:#}", key, e);
                    EpisodeOutcome::Skipped(SkipReason::Failed(format!("{:#}", e)))
                }
            };

            if let EpisodeOutcome::Skipped(reason) = &outcome {
                warn!("[{}] skipped: {}", key, reason);
            }

            episodes.push((key.to_string(), outcome));
            progress.inc(1);
        }
        progress.finish_with_message("Synchronisation complete");

        let summary = BatchSummary {
            episodes,
            low_match_rate: self.config.output.low_match_rate,
            profile_count,
        };

        let header = format!(
            "subsyncer {} - {} ({} synced of {} in {:.1}s)\n\n",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            summary.synced_count(),
            summary.episodes.len(),
            start_time.elapsed().as_secs_f64()
        );
        let main_log = FileManager::main_log_path(series_dir);
        FileManager::write_to_file(&main_log, &format!("{}{}", header, summary))?;

        let low = summary.low_match_episodes();
        if !low.is_empty() {
            warn!("{} episodes need manual review: {}", low.len(), low.join(", "));
        }
        info!("All episodes processed, logs saved in {:?}", main_log.parent().unwrap_or(series_dir));

        Ok(summary)
    }

    async fn sync_episode(
        &self,
        series_dir: &Path,
        episode: &str,
        descriptor: &str,
        provider: &dyn ReferenceProvider,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<EpisodeOutcome> {
        let output_path = FileManager::srt_output_path(output_dir, episode);
        if FileManager::file_exists(&output_path) && !(force_overwrite || self.config.output.overwrite) {
            return Ok(EpisodeOutcome::Skipped(SkipReason::OutputExists));
        }

        let Some(caption_path) = FileManager::find_caption_file(series_dir, episode) else {
            return Ok(EpisodeOutcome::Skipped(SkipReason::CaptionMissing));
        };

        let Some(reference_body) = self.obtain_reference(series_dir, episode, descriptor, provider).await? else {
            return Ok(EpisodeOutcome::Skipped(SkipReason::ReferenceUnavailable));
        };

        let (captions, encoding) = self.load_captions(&caption_path)?;
        info!("[{}] caption file {:?} read as {}", episode, caption_path, encoding);
        let reference = parse_reference(&reference_body);

        let run = match run_profiles(&reference, &captions, &self.config.profiles) {
            Ok(run) => run,
            Err(e) => {
                error!("[{}] {} ({})", episode, e, e.code());
                return Ok(EpisodeOutcome::Skipped(SkipReason::Align(e)));
            }
        };

        FileManager::write_to_file(
            FileManager::episode_log_path(series_dir, episode),
            &self.episode_log(episode, &run),
        )?;

        if self.config.output.write_json_report {
            let report = EpisodeReport {
                episode,
                caption_encoding: encoding,
                best_profile: run.best_index + 1,
                rates: &run.rates,
                report: &run.best.report,
                trace: &run.best.trace,
            };
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize match report")?;
            FileManager::write_to_file(FileManager::episode_report_path(series_dir, episode), &json)?;
        }

        // zero matches: keep the log, write no SRT
        if run.best.matches.is_empty() {
            error!("[{}] no match under any of {} profiles", episode, run.rates.len());
            return Ok(EpisodeOutcome::Skipped(SkipReason::NoMatches));
        }

        FileManager::write_to_file(&output_path, &self.render_output(&run))?;

        info!("[{}] match rate {}", episode, format_percentage(run.best.match_rate()));

        Ok(EpisodeOutcome::Synced {
            best_index: run.best_index,
            rates: run.rates,
            output: output_path,
        })
    }

    /// Cached reference body, or a fresh one from the provider
    async fn obtain_reference(
        &self,
        series_dir: &Path,
        episode: &str,
        descriptor: &str,
        provider: &dyn ReferenceProvider,
    ) -> Result<Option<String>> {
        let cache_path = FileManager::reference_cache_path(series_dir, episode);

        if !self.config.reference.redownload && FileManager::file_exists(&cache_path) {
            debug!("[{}] using cached reference {:?}", episode, cache_path);
            return FileManager::read_to_string(&cache_path).map(Some);
        }

        info!("[{}] fetching reference track via {}", episode, provider.name());
        match provider.fetch_reference(episode, descriptor).await {
            Ok(Some(body)) => {
                FileManager::write_to_file(&cache_path, &body)?;
                Ok(Some(body))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("[{}] reference fetch failed: {}", episode, e);
                Ok(None)
            }
        }
    }

    /// Decode and parse a caption file, returning the cues and the detected encoding
    fn load_captions(&self, path: &Path) -> Result<(Vec<CaptionCue>, &'static str)> {
        let (body, encoding) = FileManager::read_decoded(path)?;
        let body = if self.config.caption.repair_split_layout {
            repair_split_layout(&body)
        } else {
            body
        };

        Ok((parse_caption(&body, self.exclusion.as_ref()), encoding))
    }

    fn load_reference(&self, path: &Path) -> Result<Vec<ReferenceCue>> {
        let (body, _) = FileManager::read_decoded(path)?;
        Ok(parse_reference(&body))
    }

    /// Align one reference file with one caption file
    pub fn align_files(
        &self,
        reference_path: &Path,
        caption_path: &Path,
        output_path: &Path,
        report_path: Option<&Path>,
    ) -> Result<ProfileRun> {
        let reference = self.load_reference(reference_path)?;
        let (captions, encoding) = self.load_captions(caption_path)?;
        debug!("Caption file {:?} read as {}", caption_path, encoding);

        let run = run_profiles(&reference, &captions, &self.config.profiles)
            .with_context(|| format!("Cannot align {:?} with {:?}", caption_path, reference_path))?;

        if let Some(report_path) = report_path {
            let name = caption_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let report = EpisodeReport {
                episode: &name,
                caption_encoding: encoding,
                best_profile: run.best_index + 1,
                rates: &run.rates,
                report: &run.best.report,
                trace: &run.best.trace,
            };
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize match report")?;
            FileManager::write_to_file(report_path, &json)?;
        }

        if run.best.matches.is_empty() {
            anyhow::bail!(
                "No caption cue of {:?} matched {:?}, output not written",
                caption_path,
                reference_path
            );
        }

        FileManager::write_to_file(output_path, &self.render_output(&run))?;

        info!("{}", run.best.report);
        Ok(run)
    }

    fn render_output(&self, run: &ProfileRun) -> String {
        let watermark = self
            .config
            .output
            .watermark
            .then(|| watermark_text(run.best.match_rate()));
        render_srt(&run.best.captions, watermark.as_deref())
    }

    fn episode_log(&self, episode: &str, run: &ProfileRun) -> String {
        let mut log = format!("########## [{}] alignment ##########\n\n", episode);
        if run.rates.len() > 1 {
            for (index, rate) in run.rates.iter().enumerate() {
                log.push_str(&format!("profile {}: match rate {}\n", index + 1, format_percentage(*rate)));
            }
            log.push_str(&format!("best profile: {}\n\n", run.best_index + 1));
        }
        log.push_str(&run.best.trace.to_string());
        log.push_str(&run.best.report.to_string());
        log.push('\n');
        log
    }
}

/// Text of the leading cue naming the tool and the achieved match rate
pub fn watermark_text(match_rate: f64) -> String {
    format!(
        "[{} {}] {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        format_percentage(match_rate)
    )
}

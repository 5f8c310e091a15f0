// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subsyncer::app_config::{self, Config};
use subsyncer::app_controller::Controller;
use subsyncer::subtitle_processor::format_percentage;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronise every episode listed in a series directory's manifest
    Sync {
        /// Series directory holding manifest.json and the caption files
        #[arg(value_name = "SERIES_DIR")]
        series_dir: PathBuf,

        /// Only process this episode
        #[arg(short, long)]
        episode: Option<String>,

        /// Output directory for the generated files (defaults to SERIES_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Retime one caption file against one reference file
    Align {
        /// Reference track file
        #[arg(short, long)]
        reference: PathBuf,

        /// Bilingual caption file
        #[arg(short, long)]
        caption: PathBuf,

        /// Output SRT file
        #[arg(short, long)]
        output: PathBuf,

        /// Also write a JSON match report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Generate shell completions for subsyncer
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subsyncer - bilingual subtitle timing synchronisation
///
/// Retimes fan-made bilingual captions against a reference track with
/// correct timing, matching their shared foreign-language sentences.
#[derive(Parser, Debug)]
#[command(name = "subsyncer")]
#[command(version)]
#[command(about = "Bilingual subtitle timing synchronisation")]
#[command(long_about = "subsyncer retimes bilingual captions against a reference track with correct timing.

EXAMPLES:
    subsyncer sync shows/MyShow                        # Sync every episode in the manifest
    subsyncer sync shows/MyShow -e S01E03 -f           # Sync one episode, overwrite output
    subsyncer align -r ep.vtt -c ep.ass -o ep.srt      # Retime a single pair of files
    subsyncer --log-level debug sync shows/MyShow      # Verbose matching output
    subsyncer completions bash > subsyncer.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in subsyncer.json by default. You can specify a
    different file with --config. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true, default_value = "subsyncer.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subsyncer", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_or_create_config(&cli.config)?;
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Sync { series_dir, episode, output, force_overwrite } => {
            let summary = controller.run_sync(series_dir, episode, output, force_overwrite).await?;
            info!(
                "Synced {} of {} episodes",
                summary.synced_count(),
                summary.episodes.len()
            );
        }
        Commands::Align { reference, caption, output, report } => {
            if !reference.is_file() {
                return Err(anyhow!("Reference file does not exist: {:?}", reference));
            }
            if !caption.is_file() {
                return Err(anyhow!("Caption file does not exist: {:?}", caption));
            }
            let run = controller.align_files(&reference, &caption, &output, report.as_deref())?;
            info!("Success: {:?} (match rate {})", output, format_percentage(run.best.match_rate()));
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the configuration, writing a default one when the file is missing
fn load_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(path);
    }

    warn!("Config file not found at {:?}, creating default config.", path);
    let config = Config::default();
    config
        .save(path)
        .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
    Ok(config)
}

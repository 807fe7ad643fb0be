use clap::{Args, Parser, Subcommand};
use console::style;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use walkdir::WalkDir;

use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::ProbeConfig;
use vid_info::{
    render_bitrate_summary, render_stream_summary, AnalyzeOptions, ReportFormat, VideoAnalyzer,
};

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "m4v", "mkv", "webm", "avi", "wmv", "flv", "ts", "m2ts", "mts", "mpg", "mpeg",
    "3gp", "ogv",
];

#[derive(Parser)]
#[command(name = "vid-info")]
#[command(version, about = "Video technical analyzer - streams, bitrate, quality tiers and reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// ffprobe executable to use instead of searching PATH
    #[arg(long, global = true, value_name = "PATH")]
    ffprobe: Option<PathBuf>,

    /// Directory for log files (system temp dir by default)
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct InputArgs {
    /// Video files or directories
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalized ffprobe streams and container, as JSON
    Info {
        #[command(flatten)]
        input: InputArgs,
    },

    /// One line per video/audio stream
    Streams {
        #[command(flatten)]
        input: InputArgs,

        /// Leave container and stream tags out
        #[arg(long)]
        no_metadata: bool,
    },

    /// Bit rates and the size they imply
    Bitrate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Full technical report
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long, value_enum, default_value = "json")]
        format: ReportFormat,
    },
}

impl Commands {
    fn input(&self) -> &InputArgs {
        match self {
            Commands::Info { input }
            | Commands::Streams { input, .. }
            | Commands::Bitrate { input }
            | Commands::Report { input, .. } => input,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::default();
    if let Some(dir) = &cli.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    if cli.verbose {
        log_config = log_config.with_level(Level::DEBUG);
    }
    if let Err(e) = init_logging("vid_info", log_config) {
        eprintln!("⚠️  Logging disabled: {:#}", e);
    }

    let mut probe_config = ProbeConfig::new();
    if let Some(program) = &cli.ffprobe {
        probe_config = probe_config.with_ffprobe(program);
    }
    let analyzer = VideoAnalyzer::new(probe_config);

    let args = cli.command.input();
    let files = collect_files(&args.inputs, args.recursive);
    if files.is_empty() {
        eprintln!("{}", style("No video files found.").yellow());
        std::process::exit(1);
    }
    info!(files = files.len(), "Starting analysis");

    let outputs: Vec<(PathBuf, anyhow::Result<String>)> = files
        .par_iter()
        .map(|path| (path.clone(), run_one(&analyzer, &cli.command, path)))
        .collect();

    let many = outputs.len() > 1;
    let mut failed = 0usize;
    for (path, output) in outputs {
        match output {
            Ok(text) => {
                if many {
                    println!("{}", "=".repeat(80));
                    println!("{}", path.display());
                    println!("{}", "=".repeat(80));
                }
                println!("{}", text.trim_end());
            }
            Err(e) => {
                failed += 1;
                eprintln!(
                    "{} {}: {:#}",
                    style("❌ Failed").red().bold(),
                    path.display(),
                    e
                );
            }
        }
    }

    if failed > 0 {
        warn!(failed, "Some files could not be analyzed");
        std::process::exit(1);
    }
    Ok(())
}

fn run_one(analyzer: &VideoAnalyzer, command: &Commands, path: &Path) -> anyhow::Result<String> {
    let text = match command {
        Commands::Info { .. } => {
            let info = analyzer.probe_info(path).map_err(user_error)?;
            serde_json::to_string_pretty(&info)?
        }
        Commands::Streams { no_metadata, .. } => {
            let options = AnalyzeOptions {
                include_metadata: !no_metadata,
            };
            let result = analyzer.analyze(path, options).map_err(user_error)?;
            render_stream_summary(&result)
        }
        Commands::Bitrate { .. } => {
            let result = analyzer
                .analyze(path, AnalyzeOptions::default())
                .map_err(user_error)?;
            render_bitrate_summary(&result)
        }
        Commands::Report { format, .. } => {
            analyzer.generate_report(path, *format).map_err(user_error)?
        }
    };
    Ok(text)
}

fn user_error(e: vid_info::AnalyzerError) -> anyhow::Error {
    anyhow::anyhow!("[{}] {}", e.kind(), e.user_message())
}

/// Expands directory inputs into the video files they contain. Explicit file
/// arguments are kept as given, so a missing one is still reported.
fn collect_files(inputs: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let walker = if recursive {
            WalkDir::new(input).follow_links(true)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        let mut found: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_video(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

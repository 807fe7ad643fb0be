//! FFprobe runner
//!
//! Locates the ffprobe executable and runs it once per file, returning the
//! raw JSON text. Shape validation happens in the caller; this module only
//! cares about whether the tool ran and what it printed.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::debug;

use crate::errors::{AnalyzerError, Result};
use crate::logging::log_external_tool;

const FFPROBE: &str = "ffprobe";

/// Arguments placed before `-- <path>`.
const PROBE_ARGS: &[&str] = &[
    "-v",
    "error",
    "-print_format",
    "json",
    "-show_format",
    "-show_streams",
];

/// Anything that can turn a media path into ffprobe-shaped JSON.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct ProbeConfig {
    /// Explicit ffprobe executable. `None` searches PATH.
    pub ffprobe: Option<PathBuf>,
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ffprobe<P: AsRef<Path>>(mut self, program: P) -> Self {
        self.ffprobe = Some(program.as_ref().to_path_buf());
        self
    }

    pub fn resolve(&self) -> Result<PathBuf> {
        if let Some(program) = &self.ffprobe {
            return Ok(program.clone());
        }
        which::which(FFPROBE).map_err(|e| {
            AnalyzerError::ToolNotFound(format!(
                "ffprobe not found on PATH ({}). Install with: apt install ffmpeg / brew install ffmpeg",
                e
            ))
        })
    }
}

/// Runs the real ffprobe binary. The executable is resolved on each call,
/// so building one never fails.
#[derive(Debug, Clone, Default)]
pub struct FfprobeCli {
    config: ProbeConfig,
}

impl FfprobeCli {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn from_program<P: AsRef<Path>>(program: P) -> Self {
        Self::new(ProbeConfig::new().with_ffprobe(program))
    }

    fn args_for(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = PROBE_ARGS.iter().map(OsString::from).collect();
        args.push(OsString::from("--"));
        args.push(path.as_os_str().to_os_string());
        args
    }
}

impl MediaProbe for FfprobeCli {
    fn probe(&self, path: &Path) -> Result<String> {
        let program = self.config.resolve()?;
        debug!(program = %program.display(), path = %path.display(), "Probing");
        let command_line = format!("{} -- {}", PROBE_ARGS.join(" "), path.display());
        let tool = program.display().to_string();
        let start = Instant::now();

        let output = Command::new(&program)
            .args(Self::args_for(path))
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => AnalyzerError::ToolNotFound(format!(
                    "{} could not be executed: {}",
                    tool, e
                )),
                _ => AnalyzerError::Probe {
                    message: format!("Failed to run ffprobe: {}", e),
                    stderr: String::new(),
                    exit_code: None,
                    path: Some(path.to_path_buf()),
                },
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        log_external_tool(
            &tool,
            &command_line,
            &stderr,
            output.status.code(),
            start.elapsed(),
        );

        if !output.status.success() {
            return Err(AnalyzerError::Probe {
                message: format!("ffprobe failed to analyze file: {}", path.display()),
                stderr,
                exit_code: output.status.code(),
                path: Some(path.to_path_buf()),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| AnalyzerError::Probe {
            message: format!("Invalid UTF-8 output: {}", e),
            stderr,
            exit_code: output.status.code(),
            path: Some(path.to_path_buf()),
        })
    }
}

/// Evaluates a rational rate expression such as `30000/1001` or a plain number.
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let rate = match s.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => s.trim().parse::<f64>().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

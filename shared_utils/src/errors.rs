use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("FFprobe failed: {message}")]
    Probe {
        message: String,
        stderr: String,
        exit_code: Option<i32>,
        path: Option<PathBuf>,
    },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Probe output validation failed ({context}): {message}")]
    Validation { context: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub fn validation(context: impl Into<String>, message: impl Into<String>) -> Self {
        AnalyzerError::Validation {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable tag, for callers wrapping errors into their own envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzerError::NotFound { .. } => "not_found",
            AnalyzerError::Probe { .. } | AnalyzerError::ToolNotFound(_) => "probe",
            AnalyzerError::Validation { .. } => "validation",
            AnalyzerError::Io(_) => "io",
        }
    }

    /// Multi-line message including the tool's diagnostic output when there is one.
    pub fn user_message(&self) -> String {
        match self {
            AnalyzerError::Probe {
                message,
                stderr,
                exit_code,
                path,
            } => {
                let code_str = exit_code
                    .map(|c| format!(" (exit code: {})", c))
                    .unwrap_or_default();
                let mut msg = format!("FFprobe failed{}: {}", code_str, message);
                if let Some(path) = path {
                    msg.push_str(&format!("\n   File: {}", path.display()));
                }
                if !stderr.is_empty() {
                    msg.push_str(&format!("\n   Error output: {}", stderr));
                }
                msg
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

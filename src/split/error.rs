use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Input video {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("{tool} is not installed or not available in PATH: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Error getting video duration: {0}")]
    ProbeFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Error rendering part {index}: {reason}")]
    RenderFailed { index: usize, reason: String },

    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SplitError {
    /// Short name of the step that failed, used in user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            SplitError::InputNotFound(_) => "input check",
            SplitError::ToolUnavailable { .. } => "tool check",
            SplitError::ProbeFailed(_) => "probe",
            SplitError::InvalidArgument(_) => "planning",
            SplitError::RenderFailed { .. } => "render",
            SplitError::OutputDirectory { .. } => "output directory",
        }
    }

    /// Stable event code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            SplitError::InputNotFound(_) => "split.error.input_not_found",
            SplitError::ToolUnavailable { .. } => "split.error.tool_unavailable",
            SplitError::ProbeFailed(_) => "split.error.probe_failed",
            SplitError::InvalidArgument(_) => "split.error.invalid_argument",
            SplitError::RenderFailed { .. } => "split.error.render_failed",
            SplitError::OutputDirectory { .. } => "split.error.output_directory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failure_message_names_part() {
        let err = SplitError::RenderFailed {
            index: 3,
            reason: "ffmpeg exited with status Some(1)".to_string(),
        };
        assert_eq!(err.stage(), "render");
        assert_eq!(
            err.to_string(),
            "Error rendering part 3: ffmpeg exited with status Some(1)"
        );
    }

    #[test]
    fn input_not_found_mentions_path() {
        let err = SplitError::InputNotFound(PathBuf::from("missing.mp4"));
        assert!(err.to_string().contains("missing.mp4"));
        assert_eq!(err.code(), "split.error.input_not_found");
    }
}

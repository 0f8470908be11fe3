use std::path::Path;
use std::process::Command;

use super::error::SplitError;
use super::tools::locate_tool;

/// Source of the total duration of a media file.
pub trait MediaProbe {
    /// Confirm the probing tool can be invoked at all.
    fn ensure_available(&self) -> Result<(), SplitError> {
        Ok(())
    }

    fn probe_duration(&self, path: &Path) -> Result<f64, SplitError>;
}

/// Reads `format=duration` with ffprobe.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: String,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProbe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MediaProbe for FfprobeProbe {
    fn ensure_available(&self) -> Result<(), SplitError> {
        locate_tool(&self.program).map(|_| ())
    }

    fn probe_duration(&self, path: &Path) -> Result<f64, SplitError> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .map_err(|err| {
                SplitError::ProbeFailed(format!(
                    "failed to run {} for {}: {err}",
                    self.program,
                    path.display()
                ))
            })?;

        if !output.status.success() {
            return Err(SplitError::ProbeFailed(format!(
                "{} failed for {}: {}",
                self.program,
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_duration_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse ffprobe's stdout for a single duration value in seconds.
pub fn parse_duration_output(stdout: &str) -> Result<f64, SplitError> {
    let value = stdout.lines().map(str::trim).find(|line| !line.is_empty());
    let Some(value) = value else {
        return Err(SplitError::ProbeFailed(
            "ffprobe returned no duration".to_string(),
        ));
    };

    let duration: f64 = value.parse().map_err(|_| {
        SplitError::ProbeFailed(format!("unable to parse duration '{value}' as seconds"))
    })?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(SplitError::ProbeFailed(format!(
            "ffprobe reported an invalid duration '{value}'"
        )));
    }

    Ok(duration)
}

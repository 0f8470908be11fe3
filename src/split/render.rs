use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};

use super::error::SplitError;
use super::plan::Segment;
use super::timestamp::{format_timestamp, parse_timestamp};
use super::tools::locate_tool;
use crate::ui::prelude::OutputFormat;

/// Renders one planned segment into its own output file.
pub trait SegmentRenderer {
    /// Confirm the rendering tool can be invoked at all.
    fn ensure_available(&self) -> Result<(), SplitError> {
        Ok(())
    }

    /// Human-readable command line for debug output.
    fn describe(&self, _input: &Path, _segment: &Segment, _output: &Path) -> Option<String> {
        None
    }

    fn render_segment(
        &self,
        input: &Path,
        segment: &Segment,
        output: &Path,
    ) -> Result<(), SplitError>;
}

pub trait FfmpegRunner {
    fn run(&self, program: &str, args: &[String], options: FfmpegRunOptions) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFfmpegRunner;

#[derive(Debug, Clone, Default)]
pub struct FfmpegRunOptions {
    pub total_duration: Option<f64>,
    pub verbose: bool,
    pub message: String,
}

/// Look of the caption burned into each part.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub font_size: u32,
    pub font_color: String,
    pub box_color: String,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size: 60,
            font_color: "white".to_string(),
            box_color: "black@0.5".to_string(),
        }
    }
}

impl OverlayStyle {
    /// Centered caption on a translucent box.
    pub fn drawtext_filter(&self, text: &str) -> String {
        format!(
            "drawtext=fontsize={size}:fontcolor={color}:x=(w-text_w)/2:y=(h-text_h)/2:text={text}:box=1:boxcolor={box_color}",
            size = self.font_size,
            color = self.font_color,
            text = escape_drawtext_text(text),
            box_color = self.box_color,
        )
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegRenderer<R: FfmpegRunner = SystemFfmpegRunner> {
    program: String,
    style: OverlayStyle,
    overwrite: bool,
    verbose: bool,
    format: OutputFormat,
    runner: R,
}

impl FfmpegRenderer<SystemFfmpegRunner> {
    pub fn new(program: impl Into<String>, style: OverlayStyle) -> Self {
        Self::with_runner(program, style, SystemFfmpegRunner)
    }
}

impl<R: FfmpegRunner> FfmpegRenderer<R> {
    pub fn with_runner(program: impl Into<String>, style: OverlayStyle, runner: R) -> Self {
        Self {
            program: program.into(),
            style,
            overwrite: true,
            verbose: false,
            format: OutputFormat::Text,
            runner,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Progress bars and echoed ffmpeg output only make sense on a text
    /// console; JSON mode keeps stderr to one event per line.
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn build_args(
        &self,
        input: &Path,
        segment: &Segment,
        output: &Path,
    ) -> Result<Vec<String>, SplitError> {
        let start = format_timestamp(segment.start)?;
        let end = format_timestamp(segment.end)?;

        Ok(vec![
            if self.overwrite { "-y" } else { "-n" }.to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-ss".to_string(),
            start,
            "-to".to_string(),
            end,
            "-vf".to_string(),
            self.style.drawtext_filter(&segment.label),
            "-c:a".to_string(),
            "copy".to_string(),
            output.to_string_lossy().into_owned(),
        ])
    }
}

impl<R: FfmpegRunner> SegmentRenderer for FfmpegRenderer<R> {
    fn ensure_available(&self) -> Result<(), SplitError> {
        locate_tool(&self.program).map(|_| ())
    }

    fn describe(&self, input: &Path, segment: &Segment, output: &Path) -> Option<String> {
        let args = self.build_args(input, segment, output).ok()?;
        let mut words = vec![self.program.as_str()];
        words.extend(args.iter().map(String::as_str));
        Some(shell_words::join(words))
    }

    fn render_segment(
        &self,
        input: &Path,
        segment: &Segment,
        output: &Path,
    ) -> Result<(), SplitError> {
        let args = self.build_args(input, segment, output)?;
        let text_console = self.format == OutputFormat::Text;
        let options = FfmpegRunOptions {
            total_duration: text_console.then(|| segment.length()),
            verbose: self.verbose && text_console,
            message: segment.label.clone(),
        };

        self.runner
            .run(&self.program, &args, options)
            .map_err(|err| SplitError::RenderFailed {
                index: segment.index,
                reason: format!("{err:#}"),
            })
    }
}

impl FfmpegRunner for SystemFfmpegRunner {
    fn run(&self, program: &str, args: &[String], options: FfmpegRunOptions) -> Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn {program}"))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("{program} stderr was not captured"))?;

        let pb = options
            .total_duration
            .filter(|_| !options.verbose)
            .map(|duration| progress_bar(duration, &options.message));

        let mut last_line = String::new();
        let mut error_lines: Vec<String> = Vec::new();
        let result = read_ffmpeg_stderr(
            stderr,
            options.verbose,
            pb.as_ref(),
            &mut last_line,
            &mut error_lines,
        );

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {program}"))?;
        result?;

        if !status.success() {
            if let Some(pb) = pb {
                pb.abandon();
            }
            let error_msg = if error_lines.is_empty() {
                last_line
            } else {
                error_lines.join("\n")
            };
            bail!(
                "{program} exited with status {:?}: {}",
                status.code(),
                error_msg.trim()
            );
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        Ok(())
    }
}

fn progress_bar(duration: f64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new((duration * 1000.0) as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ");
    pb.set_style(style);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn read_ffmpeg_stderr<S: Read>(
    mut stderr: S,
    verbose: bool,
    pb: Option<&ProgressBar>,
    last_line: &mut String,
    error_lines: &mut Vec<String>,
) -> Result<()> {
    let mut buffer = [0u8; 4096];
    let mut accumulated = String::new();

    loop {
        let bytes_read = stderr
            .read(&mut buffer)
            .context("Failed to read ffmpeg stderr")?;
        if bytes_read == 0 {
            break;
        }

        accumulated.push_str(&String::from_utf8_lossy(&buffer[..bytes_read]));

        while let Some(pos) = accumulated.find(['\r', '\n']) {
            let line = accumulated[..pos].to_string();
            accumulated.replace_range(..=pos, "");

            if line.is_empty() {
                continue;
            }

            if verbose {
                eprintln!("{line}");
            }

            if line.to_lowercase().contains("error") {
                error_lines.push(line.clone());
            }

            if let Some(pb) = pb
                && let Some(progress) = parse_ffmpeg_progress(&line)
            {
                pb.set_position((progress * 1000.0) as u64);
            }

            *last_line = line;
        }
    }

    if !accumulated.trim().is_empty() {
        *last_line = accumulated.trim().to_string();
    }

    Ok(())
}

fn parse_ffmpeg_progress(line: &str) -> Option<f64> {
    let time_start = line.find("time=")?;
    let rest = &line[time_start + 5..];
    let time_end = rest.find(' ').unwrap_or(rest.len());
    parse_timestamp(&rest[..time_end])
}

/// Escape caption text for drawtext's `text` option inside a `-vf` graph.
///
/// The value is unescaped three times before drawtext sees it: by the
/// filtergraph parser, by the filter option parser, and by drawtext's own
/// `%{...}` expansion. Each pass gets its own backslash escaping.
pub fn escape_drawtext_text(text: &str) -> String {
    let expansion = backslash_escape(text, &['\\', '%']);
    let option = backslash_escape(&expansion, &['\\', '\'', ':']);
    backslash_escape(&option, &['\\', '\'', '[', ']', ',', ';'])
}

fn backslash_escape(input: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

mod split;
mod ui;

use anyhow::Result;
use clap::{Parser, ValueHint};
use serde_json::json;
use std::path::PathBuf;

use crate::split::{
    FfmpegRenderer, FfprobeProbe, SplitConfig, SplitError, SplitRequest, SplitSummary, Splitter,
};
use crate::ui::prelude::*;

/// Split a video into captioned parts of fixed length
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Video to split
    #[arg(default_value = "videoplayback.mp4", value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Directory that receives part1.mp4, part2.mp4, ...
    #[arg(short, long, default_value = "video_parts", value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,

    /// Config file (defaults to ~/.config/splitparts/config.toml)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Probe and print the plan without rendering anything
    #[arg(long)]
    dry_run: bool,

    /// Echo ffmpeg output instead of showing a progress bar
    #[arg(short, long)]
    verbose: bool,

    /// Activate debug mode
    #[arg(short, long)]
    debug: bool,

    /// Output format for messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    let reporter = ConsoleReporter::new(cli.output, !cli.no_color, cli.debug);

    if let Err(err) = run(&cli, &reporter) {
        report_error(&reporter, &err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, reporter: &ConsoleReporter) -> Result<SplitSummary> {
    let config = SplitConfig::load(cli.config.as_deref())?;
    reporter.emit(
        Level::Debug,
        "split.config",
        &format!("Using config: {config:?}"),
        None,
    );

    let probe = FfprobeProbe::new(config.ffprobe.clone());
    let renderer = FfmpegRenderer::new(config.ffmpeg.clone(), config.overlay_style())
        .overwrite(config.overwrite)
        .verbose(cli.verbose)
        .output_format(cli.output);

    let request = SplitRequest {
        input: cli.input.clone(),
        output_dir: cli.output_dir.clone(),
        dry_run: cli.dry_run,
    };

    let summary = Splitter::new(probe, renderer, config.segment_rule(), reporter).run(&request)?;

    if cli.dry_run {
        reporter.emit(
            Level::Success,
            "split.plan.done",
            &format!(
                "Would create {} part(s) of up to {} seconds from {:.2} seconds of video",
                summary.outputs.len(),
                summary.segment_length,
                summary.duration
            ),
            Some(json!({ "outputs": summary.outputs })),
        );
    }

    Ok(summary)
}

fn report_error(reporter: &dyn Reporter, err: &anyhow::Error) {
    match err.downcast_ref::<SplitError>() {
        Some(split_err) => reporter.emit(
            Level::Error,
            split_err.code(),
            &format!("Error during {}: {split_err}", split_err.stage()),
            Some(json!({ "stage": split_err.stage() })),
        ),
        None => reporter.emit(Level::Error, "split.error", &format!("Error: {err:#}"), None),
    }
}

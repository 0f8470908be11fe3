use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use super::error::SplitError;
use super::plan::{SegmentPlan, SegmentRule, plan_segments};
use super::probe::MediaProbe;
use super::render::SegmentRenderer;
use super::timestamp::format_timestamp;
use crate::ui::prelude::{Level, Reporter};

#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Probe and plan only; nothing is created or rendered.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitSummary {
    pub duration: f64,
    pub segment_length: f64,
    /// Files written, or that would be written on a dry run.
    pub outputs: Vec<PathBuf>,
}

/// Drives probe, plan and render for one input file.
pub struct Splitter<'a, P, R> {
    probe: P,
    renderer: R,
    rule: SegmentRule,
    reporter: &'a dyn Reporter,
}

impl<'a, P: MediaProbe, R: SegmentRenderer> Splitter<'a, P, R> {
    pub fn new(probe: P, renderer: R, rule: SegmentRule, reporter: &'a dyn Reporter) -> Self {
        Self {
            probe,
            renderer,
            rule,
            reporter,
        }
    }

    pub fn run(&self, request: &SplitRequest) -> Result<SplitSummary, SplitError> {
        if !request.input.exists() {
            return Err(SplitError::InputNotFound(request.input.clone()));
        }

        if !request.dry_run {
            self.renderer.ensure_available()?;
        }
        self.probe.ensure_available()?;

        if !request.dry_run {
            self.ensure_output_dir(&request.output_dir)?;
        }

        let duration = self.probe.probe_duration(&request.input)?;
        self.reporter.emit(
            Level::Info,
            "split.probe.duration",
            &format!(
                "Video duration: {duration} seconds ({})",
                format_timestamp(duration)?
            ),
            Some(json!({ "seconds": duration })),
        );

        let plan = plan_segments(duration, &self.rule)?;
        self.report_plan(&plan);

        let mut outputs = Vec::with_capacity(plan.len());
        for segment in &plan.segments {
            let output = request.output_dir.join(segment.file_name());

            if request.dry_run {
                self.reporter.emit(
                    Level::Info,
                    "split.plan.segment",
                    &format!(
                        "{}: {} -> {} => {}",
                        segment.label,
                        format_timestamp(segment.start)?,
                        format_timestamp(segment.end)?,
                        output.display()
                    ),
                    Some(json!({ "segment": segment, "output": output })),
                );
                outputs.push(output);
                continue;
            }

            if output.exists() {
                self.reporter.emit(
                    Level::Warn,
                    "split.render.existing",
                    &format!("{} already exists", output.display()),
                    None,
                );
            }

            if self.reporter.is_debug_enabled()
                && let Some(command) = self.renderer.describe(&request.input, segment, &output)
            {
                self.reporter.emit(
                    Level::Debug,
                    "split.render.command",
                    &format!("Executing: {command}"),
                    None,
                );
            }

            self.renderer
                .render_segment(&request.input, segment, &output)?;
            self.reporter.emit(
                Level::Success,
                "split.render.done",
                &format!("Successfully created: {}", output.display()),
                Some(json!({ "index": segment.index, "output": output })),
            );
            outputs.push(output);
        }

        if !request.dry_run {
            self.reporter.emit(
                Level::Success,
                "split.done",
                &format!(
                    "Video splitting completed! Check {} for the results.",
                    request.output_dir.display()
                ),
                Some(json!({ "parts": outputs.len() })),
            );
        }

        Ok(SplitSummary {
            duration,
            segment_length: plan.segment_length,
            outputs,
        })
    }

    fn ensure_output_dir(&self, dir: &Path) -> Result<(), SplitError> {
        if dir.is_dir() {
            self.reporter.emit(
                Level::Debug,
                "split.output_dir.exists",
                &format!("Folder {} already exists", dir.display()),
                None,
            );
            return Ok(());
        }

        fs::create_dir_all(dir).map_err(|source| SplitError::OutputDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        self.reporter.emit(
            Level::Info,
            "split.output_dir.created",
            &format!("Created folder: {}", dir.display()),
            None,
        );
        Ok(())
    }

    fn report_plan(&self, plan: &SegmentPlan) {
        self.reporter.emit(
            Level::Info,
            "split.plan.rule",
            &format!(
                "Video is {:.2} minutes long, using {}-second segments",
                plan.duration / 60.0,
                plan.segment_length
            ),
            Some(json!({
                "minutes": plan.duration / 60.0,
                "segment_length": plan.segment_length,
            })),
        );
        self.reporter.emit(
            Level::Info,
            "split.plan.counts",
            &format!(
                "Creating {} full segments of {} seconds each",
                plan.full_segments, plan.segment_length
            ),
            Some(json!({ "full_segments": plan.full_segments })),
        );
        if plan.has_remainder() {
            self.reporter.emit(
                Level::Info,
                "split.plan.remainder",
                &format!("Plus a final segment of {:.2} seconds", plan.remainder),
                Some(json!({ "remainder": plan.remainder })),
            );
        }
    }
}

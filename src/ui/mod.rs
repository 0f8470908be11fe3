use colored::*;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }
}

/// Sink for user-facing progress and diagnostics.
///
/// `code` is a stable dotted identifier (`split.probe.duration`), `message`
/// is the human text, and `data` carries machine-readable details for JSON
/// consumers.
pub trait Reporter {
    fn emit(&self, level: Level, code: &str, message: &str, data: Option<serde_json::Value>);

    fn is_debug_enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    pub format: OutputFormat,
    pub color: bool,
    pub debug: bool,
}

impl ConsoleReporter {
    pub fn new(format: OutputFormat, color: bool, debug: bool) -> Self {
        Self {
            format,
            color,
            debug,
        }
    }

    fn render(&self, level: Level, code: &str, message: &str, data: Option<serde_json::Value>) -> String {
        match self.format {
            OutputFormat::Text => colorize(level, message, self.color),
            OutputFormat::Json => {
                // Ensure message contains no ANSI control sequences in JSON mode
                let clean_msg = strip_ansi(message);
                let ev = Event {
                    level: level.as_str(),
                    code,
                    message: &clean_msg,
                    data,
                };
                serde_json::to_string(&ev).unwrap_or_else(|_| clean_msg.clone())
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn emit(&self, level: Level, code: &str, message: &str, data: Option<serde_json::Value>) {
        if level == Level::Debug && !self.debug {
            return;
        }

        let line = self.render(level, code, message, data);
        let mut out: Box<dyn Write> = match level {
            Level::Error | Level::Warn => Box::new(io::stderr()),
            _ => Box::new(io::stdout()),
        };
        let _ = writeln!(out, "{}", line);
    }

    fn is_debug_enabled(&self) -> bool {
        self.debug
    }
}

#[derive(Serialize)]
struct Event<'a> {
    level: &'a str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn colorize(level: Level, s: &str, enable: bool) -> String {
    if !enable {
        return s.to_string();
    }
    match level {
        Level::Info => s.normal().to_string(),
        Level::Success => s.green().bold().to_string(),
        Level::Warn => s.yellow().bold().to_string(),
        Level::Error => s.red().bold().to_string(),
        Level::Debug => s.cyan().to_string(),
    }
}

fn strip_ansi(input: &str) -> String {
    // Remove CSI sequences such as \x1b[0m or \x1b[1;32m
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for b in chars.by_ref() {
                if ('@'..='~').contains(&b) {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

pub mod prelude {
    pub use super::{ConsoleReporter, Level, OutputFormat, Reporter};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_events_carry_code_and_data() {
        let reporter = ConsoleReporter::new(OutputFormat::Json, false, false);
        let line = reporter.render(
            Level::Info,
            "split.probe.duration",
            "Video duration: 901 seconds",
            Some(json!({ "seconds": 901.0 })),
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "info");
        assert_eq!(value["code"], "split.probe.duration");
        assert_eq!(value["data"]["seconds"], 901.0);
    }

    #[test]
    fn json_events_omit_missing_data() {
        let reporter = ConsoleReporter::new(OutputFormat::Json, false, false);
        let line = reporter.render(Level::Error, "split.error", "boom", None);
        assert!(!line.contains("\"data\""));
    }

    #[test]
    fn text_without_color_is_verbatim() {
        let reporter = ConsoleReporter::new(OutputFormat::Text, false, false);
        assert_eq!(
            reporter.render(Level::Success, "split.done", "Video splitting completed!", None),
            "Video splitting completed!"
        );
    }

    #[test]
    fn strips_ansi_sequences() {
        assert_eq!(strip_ansi("\x1b[1;31mError\x1b[0m: bad"), "Error: bad");
    }
}

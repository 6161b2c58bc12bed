//! Stack trace capture for stack fields

use std::backtrace::Backtrace;
use std::fmt;

/// How many frames [`take_stacktrace`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StacktraceDepth {
    /// Only the first frame after skipping
    First,
    /// Every remaining frame
    #[default]
    Full,
    /// At most this many frames
    Frames(usize),
}

impl StacktraceDepth {
    fn limit(self) -> usize {
        match self {
            Self::First => 1,
            Self::Full => usize::MAX,
            Self::Frames(n) => n,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Frame {
    function: String,
    location: Option<String>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}\n\t{}", self.function, location),
            None => f.write_str(&self.function),
        }
    }
}

/// Capture the current stack as text.
///
/// `skip = 0` starts at the caller of `take_stacktrace`. Each frame renders as
/// `function\n\tfile:line`; frames are joined by newlines. Returns an empty
/// string when every frame was skipped.
pub fn take_stacktrace(skip: usize, depth: StacktraceDepth) -> String {
    let trace = Backtrace::force_capture().to_string();
    let frames = parse_frames(&trace);

    let start = frames
        .iter()
        .position(|frame| frame.function.contains("take_stacktrace"))
        .map_or(0, |index| index + 1);

    frames
        .iter()
        .skip(start.saturating_add(skip))
        .take(depth.limit())
        .map(Frame::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the std backtrace text format:
///
/// ```text
///    3: crate::module::function
///              at ./src/module.rs:10:5
/// ```
fn parse_frames(trace: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for line in trace.lines() {
        let line = line.trim_start();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.location.is_none() {
                    frame.location = Some(strip_column(location).to_string());
                }
            }
            continue;
        }

        if let Some((index, function)) = line.split_once(": ") {
            if index.parse::<usize>().is_ok() {
                frames.push(Frame {
                    function: function.trim().to_string(),
                    location: None,
                });
            }
        }
    }

    frames
}

/// `file.rs:10:5` -> `file.rs:10`
fn strip_column(location: &str) -> &str {
    match location.rsplit_once(':') {
        Some((head, column))
            if column.chars().all(|c| c.is_ascii_digit()) && head.contains(':') =>
        {
            head
        }
        _ => location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: app::handler::run
             at ./src/handler.rs:42:9
   1: app::main
             at ./src/main.rs:7:5
   2: core::ops::function::FnOnce::call_once
";

    #[test]
    fn test_parse_frames() {
        let frames = parse_frames(SAMPLE);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].function, "app::handler::run");
        assert_eq!(frames[0].location.as_deref(), Some("./src/handler.rs:42"));
        assert_eq!(frames[2].location, None);
    }

    #[test]
    fn test_frame_display() {
        let frames = parse_frames(SAMPLE);
        assert_eq!(frames[1].to_string(), "app::main\n\t./src/main.rs:7");
        assert_eq!(frames[2].to_string(), "core::ops::function::FnOnce::call_once");
    }

    #[test]
    fn test_strip_column() {
        assert_eq!(strip_column("src/lib.rs:10:5"), "src/lib.rs:10");
        assert_eq!(strip_column("src/lib.rs:10"), "src/lib.rs:10");
        assert_eq!(strip_column("<unknown>"), "<unknown>");
    }

    #[test]
    fn test_take_stacktrace_first_is_single_frame() {
        let trace = take_stacktrace(0, StacktraceDepth::First);
        assert!(!trace.is_empty());
        assert_eq!(trace.lines().filter(|l| !l.starts_with('\t')).count(), 1);
    }

    #[test]
    fn test_take_stacktrace_frames_limit() {
        let trace = take_stacktrace(0, StacktraceDepth::Frames(2));
        assert!(trace.lines().filter(|l| !l.starts_with('\t')).count() <= 2);
    }

    #[test]
    fn test_take_stacktrace_skip_everything() {
        assert_eq!(take_stacktrace(10_000, StacktraceDepth::Full), "");
    }
}

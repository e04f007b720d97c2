// Output formatting and report destinations

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use tracing::info;

use crate::error::CliResult;

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
        }
    }
}

impl OutputStyle {
    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format verbose error with details
    pub fn error_verbose(&self, error: &str, details: &str) -> String {
        let details = if self.use_colors {
            details.dimmed().to_string()
        } else {
            details.to_string()
        };
        format!("{}\n\n{}", self.error(error), details)
    }
}

pub fn print_error(msg: &str) {
    let style = OutputStyle::default();
    eprintln!("{}", style.error(msg));
}

pub fn print_error_verbose(msg: &str, details: &str) {
    let style = OutputStyle::default();
    eprintln!("{}", style.error_verbose(msg, details));
}

/// Where the finished report goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSink {
    Stdout,
    File(PathBuf),
}

impl ReportSink {
    /// File sink when a path is given, stdout otherwise
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => ReportSink::File(path.to_path_buf()),
            None => ReportSink::Stdout,
        }
    }

    /// Write the report
    pub fn write(&self, report_json: &str) -> CliResult<()> {
        self.write_to(report_json, &mut io::stdout().lock())
    }

    /// Write the report, using `stdout` for the stdout sink
    pub fn write_to(&self, report_json: &str, stdout: &mut dyn Write) -> CliResult<()> {
        match self {
            ReportSink::Stdout => {
                writeln!(stdout, "{}", report_json)?;
                stdout.flush()?;
            }
            ReportSink::File(path) => {
                fs::write(path, report_json)?;
                info!("Report written to: {}", path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_error_format() {
        let style = OutputStyle { use_colors: false };
        assert_eq!(style.error("boom"), "✗ boom");
        assert_eq!(style.error_verbose("boom", "details"), "✗ boom\n\ndetails");
    }

    #[test]
    fn test_sink_from_path() {
        assert_eq!(ReportSink::from_path(None), ReportSink::Stdout);
        assert_eq!(
            ReportSink::from_path(Some(Path::new("out.json"))),
            ReportSink::File(PathBuf::from("out.json"))
        );
    }

    #[test]
    fn test_stdout_sink_writes_json_line() {
        let mut buffer = Vec::new();
        ReportSink::Stdout.write_to("{}", &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "{}\n");
    }

    #[test]
    fn test_file_sink_writes_file_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut buffer = Vec::new();

        ReportSink::File(path.clone())
            .write_to("{\"org_id\": \"o\"}", &mut buffer)
            .unwrap();

        assert!(buffer.is_empty());
        assert_eq!(fs::read_to_string(path).unwrap(), "{\"org_id\": \"o\"}");
    }
}

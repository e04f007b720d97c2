// Logging and verbosity control

use tracing_subscriber::{fmt, EnvFilter};

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Quiet mode - warnings and errors only
    Quiet,
    /// Normal mode - progress messages
    Normal,
    /// Verbose mode - every request and retry
    Verbose,
}

impl VerbosityLevel {
    /// Pick the level from CLI flags
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default filter directive for this level
    pub fn directive(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "warn",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

/// Initialize logging based on CLI flags
///
/// Logs go to stderr so stdout carries nothing but the report. `RUST_LOG`
/// overrides the level picked from the flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = VerbosityLevel::from_flags(verbose, quiet);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    // A subscriber may already be installed (e.g. in tests)
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(VerbosityLevel::from_flags(false, true), VerbosityLevel::Quiet);
        assert_eq!(VerbosityLevel::from_flags(true, false), VerbosityLevel::Verbose);
        assert_eq!(VerbosityLevel::from_flags(false, false), VerbosityLevel::Normal);
    }

    #[test]
    fn test_directives() {
        assert_eq!(VerbosityLevel::Quiet.directive(), "warn");
        assert_eq!(VerbosityLevel::Normal.directive(), "info");
        assert_eq!(VerbosityLevel::Verbose.directive(), "debug");
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(false, false);
        init_logging(true, false);
    }
}

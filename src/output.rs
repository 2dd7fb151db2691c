//! Output sink shared by a command tree
//!
//! Messages go to stderr and are gated by verbosity. Fatal errors either
//! terminate the process or, when running under a test harness, come back
//! to the caller as a [`CmdError`] so the harness can inspect them.

use crate::error::{CmdError, Result};
use colored::Colorize;
use std::cell::Cell;
use std::fmt::Display;
use std::process;

/// Test binaries are recognized by this path suffix
const TEST_BINARY_SUFFIX: &str = ".test";

/// Second argument passed by test runners that stream test output
const VERBOSE_TEST_FLAG: &str = "--nocapture";

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    #[default]
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    /// Map a numeric level onto a verbosity, clamping out-of-range values
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Verbosity::Silent,
            1 => Verbosity::Quiet,
            2 => Verbosity::Normal,
            _ => Verbosity::Verbose,
        }
    }
}

/// How the process was launched, which decides what a fatal error does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Fatal errors print and exit with a non-zero status
    #[default]
    Interactive,
    /// Fatal errors are returned so a test harness can catch them
    Test,
}

impl ExecutionMode {
    /// Detect the mode from the current process arguments
    pub fn detect() -> Self {
        Self::detect_from(std::env::args())
    }

    /// Detect the mode from an explicit argument list (program path first)
    pub fn detect_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().take(2).collect();

        let is_test_binary = args
            .first()
            .is_some_and(|program| program.as_ref().ends_with(TEST_BINARY_SUFFIX));
        let is_verbose_test = args
            .get(1)
            .is_some_and(|arg| arg.as_ref() == VERBOSE_TEST_FLAG);

        if is_test_binary || is_verbose_test {
            ExecutionMode::Test
        } else {
            ExecutionMode::Interactive
        }
    }
}

/// Output sink for command trees
#[derive(Debug, Clone, Default)]
pub struct Output {
    verbosity: Cell<Verbosity>,
    mode: ExecutionMode,
}

impl Output {
    /// Create a sink with the given verbosity and execution mode
    pub fn new(verbosity: Verbosity, mode: ExecutionMode) -> Self {
        Output {
            verbosity: Cell::new(verbosity),
            mode,
        }
    }

    /// Sink for use inside test harnesses
    pub fn for_tests() -> Self {
        Output::new(Verbosity::Normal, ExecutionMode::Test)
    }

    /// Set verbosity level
    pub fn with_verbosity(self, verbosity: Verbosity) -> Self {
        self.verbosity.set(verbosity);
        self
    }

    /// Change verbosity on a sink that is already shared
    pub fn set_verbosity(&self, verbosity: Verbosity) {
        self.verbosity.set(verbosity);
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity.get()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity() >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".green(), message);
        }
    }

    /// Print warning message
    pub fn warn(&self, message: &str) {
        if self.verbosity() >= Verbosity::Normal {
            eprintln!("{} {}", "[WARN]".yellow(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn debug(&self, message: &str) {
        if self.verbosity() >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Report a fatal error.
    ///
    /// Interactive runs print the message and exit with status 1. Test runs
    /// get the message back as [`CmdError::Fatal`].
    pub fn fatal<T>(&self, message: impl Into<String>) -> Result<T> {
        let message = message.into();
        match self.mode {
            ExecutionMode::Test => Err(CmdError::Fatal(message)),
            ExecutionMode::Interactive => self.exit_with_error(&message),
        }
    }

    /// Print an error unconditionally and terminate the process
    pub fn exit_with_error(&self, err: &dyn Display) -> ! {
        eprintln!("{} {}", "Error:".red().bold(), err);
        process::exit(1);
    }
}

/*!
 * Command Driver
 * Line-oriented scripting front end for a memory manager
 *
 * Script grammar, one command per line:
 *
 * ```text
 * alloc <length>     allocate, prints the base address
 * free <address>     release an allocation
 * defrag             coalesce free blocks, prints the merge count
 * show               describe(): free line, then allocated line
 * stats              usage and fragmentation summary
 * json               both registries as JSON
 * verify             check registry consistency
 * # comment
 * ```
 */

use crate::core::types::{Address, Size};
use crate::memory::{MemoryError, MemoryManager};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Command parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ParseCommandError {
    #[error("Unknown command: {0}")]
    #[diagnostic(
        code(driver::unknown_command),
        help("Expected one of: alloc, free, defrag, show, stats, json, verify.")
    )]
    UnknownCommand(String),

    #[error("{command} requires an argument")]
    #[diagnostic(code(driver::missing_argument))]
    MissingArgument { command: &'static str },

    #[error("{command}: invalid number {value:?}")]
    #[diagnostic(code(driver::invalid_number))]
    InvalidNumber { command: &'static str, value: String },

    #[error("{command} takes no further arguments")]
    #[diagnostic(code(driver::unexpected_argument))]
    UnexpectedArgument { command: &'static str },
}

/// Errors raised while executing a command
#[derive(Error, Debug, Diagnostic)]
pub enum DriverError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseCommandError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error("Failed to serialize snapshot: {0}")]
    #[diagnostic(code(driver::serialization))]
    Serialization(#[from] serde_json::Error),
}

/// A single driver command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Alloc(Size),
    Free(Address),
    Defrag,
    Show,
    Stats,
    Json,
    Verify,
}

fn parse_number(command: &'static str, value: Option<&str>) -> Result<usize, ParseCommandError> {
    let value = value.ok_or(ParseCommandError::MissingArgument { command })?;
    value.parse().map_err(|_| ParseCommandError::InvalidNumber {
        command,
        value: value.to_string(),
    })
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();

        let (command, keyword) = match name.to_ascii_lowercase().as_str() {
            "alloc" | "malloc" => (Command::Alloc(parse_number("alloc", words.next())?), "alloc"),
            "free" => (Command::Free(parse_number("free", words.next())?), "free"),
            "defrag" => (Command::Defrag, "defrag"),
            "show" => (Command::Show, "show"),
            "stats" => (Command::Stats, "stats"),
            "json" => (Command::Json, "json"),
            "verify" => (Command::Verify, "verify"),
            _ => return Err(ParseCommandError::UnknownCommand(name.to_string())),
        };

        if words.next().is_some() {
            return Err(ParseCommandError::UnexpectedArgument { command: keyword });
        }
        Ok(command)
    }
}

/// Drives one memory manager through a sequence of commands
#[derive(Debug)]
pub struct Session {
    manager: MemoryManager,
    reports: GraphicalReportHandler,
}

impl Session {
    pub fn new(manager: MemoryManager) -> Self {
        Self {
            manager,
            reports: GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
                .with_width(120),
        }
    }

    /// Replace the handler used to render failed commands
    pub fn with_report_handler(mut self, reports: GraphicalReportHandler) -> Self {
        self.reports = reports;
        self
    }

    pub fn manager(&self) -> &MemoryManager {
        &self.manager
    }

    /// Execute a command, returning the text to print
    pub fn execute(&mut self, command: Command) -> Result<String, DriverError> {
        let output = match command {
            Command::Alloc(length) => self.manager.allocate(length)?.to_string(),
            Command::Free(address) => {
                self.manager.release(address)?;
                "ok".to_string()
            }
            Command::Defrag => {
                let report = self.manager.defragment();
                format!(
                    "merged {} ({} -> {} free blocks)",
                    report.merged(),
                    report.blocks_before,
                    report.blocks_after
                )
            }
            Command::Show => self.manager.describe(),
            Command::Stats => {
                let stats = self.manager.stats();
                format!(
                    "used {}/{} ({:.1}%), {} allocated, {} free, largest free {}, fragmentation {:.2}, pressure {}",
                    stats.used_memory,
                    stats.total_memory,
                    stats.usage_percentage,
                    stats.allocated_blocks,
                    stats.free_blocks,
                    stats.largest_free_block,
                    stats.fragmentation,
                    stats.memory_pressure()
                )
            }
            Command::Json => serde_json::to_string_pretty(&self.manager.snapshot())?,
            Command::Verify => {
                self.manager.verify()?;
                "ok".to_string()
            }
        };
        Ok(output)
    }

    /// Parse and execute one script line; `None` for blanks and comments
    pub fn execute_line(&mut self, line: &str) -> Option<Result<String, DriverError>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        debug!(line, "Executing command");
        Some(
            line.parse::<Command>()
                .map_err(DriverError::from)
                .and_then(|command| self.execute(command)),
        )
    }

    /// Render a failure as a miette report: code, message and help
    pub fn render_error(&self, error: &DriverError) -> String {
        let mut rendered = String::new();
        if self.reports.render_report(&mut rendered, error).is_err() {
            rendered = format!("{}\n", error);
        }
        rendered
    }

    /// Run every line of `input`, writing results to `out`
    ///
    /// Failing commands are reported as `error: ...` on `out` and as a full
    /// diagnostic on `diagnostics`; the script continues.
    /// Returns the number of failed commands.
    pub fn run_script<R, W, D>(
        &mut self,
        input: R,
        mut out: W,
        mut diagnostics: D,
    ) -> io::Result<usize>
    where
        R: BufRead,
        W: Write,
        D: Write,
    {
        let mut failures = 0;
        for (number, line) in input.lines().enumerate() {
            let line = line?;
            match self.execute_line(&line) {
                None => {}
                Some(Ok(output)) => writeln!(out, "{}", output)?,
                Some(Err(e)) => {
                    failures += 1;
                    warn!(line = number + 1, error = %e, "Command failed");
                    writeln!(out, "error: {}", e)?;
                    write!(diagnostics, "line {}: {}", number + 1, self.render_error(&e))?;
                }
            }
        }
        out.flush()?;
        diagnostics.flush()?;
        Ok(failures)
    }
}

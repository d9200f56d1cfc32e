/*!
 * Memspace - Main Entry Point
 *
 * Runs a command script against a simulated memory space:
 *
 * ```text
 * memspace [SCRIPT]
 * ```
 *
 * Commands are read from SCRIPT, or from stdin when no path is given.
 */

use anyhow::Context;
use miette::GraphicalReportHandler;
use std::fs::File;
use std::io::{self, BufReader};
use tracing::info;

use memspace::{init_tracing, MemSpaceConfig, MemoryManager, Session};

fn main() -> anyhow::Result<()> {
    let config = MemSpaceConfig::from_env().context("Invalid memspace configuration")?;

    // Initialize structured tracing
    init_tracing(config.trace_json);

    info!(max_size = config.max_size, "Memspace starting...");
    let manager = MemoryManager::from_config(&config)?;
    let mut session = Session::new(manager).with_report_handler(GraphicalReportHandler::new());

    let stdout = io::stdout();
    let out = stdout.lock();
    let stderr = io::stderr();
    let diagnostics = stderr.lock();

    let failures = match std::env::args().nth(1) {
        Some(path) => {
            let file =
                File::open(&path).with_context(|| format!("Failed to open script {}", path))?;
            info!(script = %path, "Running script");
            session.run_script(BufReader::new(file), out, diagnostics)?
        }
        None => session.run_script(io::stdin().lock(), out, diagnostics)?,
    };

    let (total, used, available) = session.manager().info();
    info!(failures, total, used, available, "Script complete");
    Ok(())
}

//! # Ticket Gate Runtime
//!
//! Door-scanner process. Reads operator commands and scanned payloads from
//! stdin, prints minted codes and verdicts to stdout.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env)
//! 2. Initialize logging and metrics
//! 3. Validate the signing secret (fatal when `TG_ENV=production`)
//! 4. Start event handlers
//! 5. Open a scan session for the operator
//! 6. Read commands until `quit`, EOF or Ctrl+C

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use gate_runtime::container::OpenSession;
use gate_runtime::{load_config, parse_command, Command, CommandError, GateRuntime};
use tg_04_scan_session::DisplayUpdate;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    let _telemetry = gate_telemetry::init_telemetry(&config.telemetry)?;

    let production = std::env::var("TG_ENV").is_ok_and(|env| env == "production");
    if let Err(e) = config.validate_for_production() {
        if production {
            return Err(e).context("Refusing to start");
        }
        warn!(error = %e, "Running with a development configuration");
    }

    let runtime = GateRuntime::new(config)?;
    runtime.start();
    spawn_display(runtime.open_session());

    info!("Ticket gate is running. Type `help` for commands, Ctrl+C to stop.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Open) => {
                spawn_display(runtime.open_session());
                println!("scan session opened");
            }
            Ok(command) => match runtime.execute(command).await {
                Ok(output) if output.is_empty() => {}
                Ok(output) => println!("{output}"),
                Err(e) => println!("error: {e:#}"),
            },
            Err(CommandError::Empty) => {}
            Err(e) => println!("error: {e}"),
        }
    }

    runtime.shutdown().await;
    Ok(())
}

/// Print verdicts for one session until it closes.
fn spawn_display(session: OpenSession) {
    let OpenSession {
        display, task, ..
    } = session;
    tokio::spawn(print_updates(display));
    tokio::spawn(async move {
        match task.await {
            Ok(report) => info!(
                session_id = %report.session_id,
                processed = report.stats.processed,
                dropped = report.stats.dropped,
                exit = ?report.exit,
                "Scan session finished"
            ),
            Err(e) => warn!(error = %e, "Scan session task failed"),
        }
    });
}

async fn print_updates(mut display: UnboundedReceiver<DisplayUpdate>) {
    while let Some(update) = display.recv().await {
        match update {
            DisplayUpdate::Show(verdict) => println!("{verdict}"),
            DisplayUpdate::Clear => println!("-- ready --"),
        }
    }
}

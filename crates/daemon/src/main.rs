// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Engine daemon (jed)
//!
//! `jed serve` runs the HTTP API with its configured store, data channel
//! and queue. `jed worker` runs jobs taken from a server's bus.

use clap::{Parser, Subcommand};
use tracing::{error, info};

use je_daemon::logging::{
    setup_file_logging, setup_stderr_logging, write_startup_error, write_startup_marker,
};
use je_daemon::{env, shutdown_signal, Config, Daemon, RemoteWorker, ServeArgs, WorkerArgs};

#[derive(Parser)]
#[command(name = "jed", version, about = "Job Engine daemon")]
struct Cli {
    /// Log to stderr instead of the state directory
    #[arg(long, global = true)]
    log_stderr: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve(ServeArgs),
    /// Run jobs for a remote server
    Worker(WorkerArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(&args, cli.log_stderr).await,
        Command::Worker(args) => worker(&args, cli.log_stderr).await,
    }
}

async fn serve(args: &ServeArgs, log_stderr: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(args)?;

    // Keep the guard alive so buffered lines flush on exit
    let _log_guard = if log_stderr {
        setup_stderr_logging();
        None
    } else {
        write_startup_marker(&config.log_path)?;
        Some(setup_file_logging(&config.log_path)?)
    };

    let started = match Daemon::start(&config) {
        Ok(daemon) => Daemon::bind(config.bind).await.map(|listener| (daemon, listener)),
        Err(e) => Err(e),
    };
    let (daemon, listener) = match started {
        Ok(started) => started,
        Err(e) => {
            write_startup_error(&config.log_path, &e);
            error!(error = %e, "failed to start daemon");
            return Err(e.into());
        }
    };

    let addr = listener.local_addr()?;
    info!(%addr, "daemon ready");
    // Signal ready for whoever launched us
    println!("READY {addr}");

    daemon.run(listener, shutdown_signal()?).await?;
    Ok(())
}

async fn worker(args: &WorkerArgs, log_stderr: bool) -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = if log_stderr {
        setup_stderr_logging();
        None
    } else {
        let log_path = env::state_dir()?.join("jed-worker.log");
        write_startup_marker(&log_path)?;
        Some(setup_file_logging(&log_path)?)
    };

    let worker = RemoteWorker::start(args)?;
    println!("READY");
    worker.run_until(shutdown_signal()?).await;
    Ok(())
}

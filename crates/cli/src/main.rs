// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! je - Job Engine CLI

mod color;
mod commands;
mod env;
mod exit_error;
mod output;
mod poll;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};
use je_adapters::Client;
use je_core::JobId;

use commands::{job, run, stream};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "je", version, about = "Job Engine - run programs on remote workers")]
struct Cli {
    /// Job server URL
    #[arg(
        long,
        env = "JE_SERVER",
        default_value = "http://127.0.0.1:8000",
        global = true
    )]
    server: String,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job
    Run(run::RunArgs),
    /// List jobs
    Ps(job::PsArgs),
    /// Show one job
    Show { id: JobId },
    /// Print a job's logs (stderr)
    Logs(stream::ReadArgs),
    /// Print a job's output (stdout)
    Output(stream::ReadArgs),
    /// Stop a running job
    Kill(job::KillArgs),
    /// Send input to an interactive job
    Write(stream::WriteArgs),
    /// Close an interactive job's stdin
    Close { id: JobId },
    /// Wait for a job to finish and exit with its status
    Wait(run::WaitArgs),
    /// Print the server version
    Version,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Render the error chain, skipping causes the top-level message
/// already includes.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let client = Client::new(&cli.server)?;
    match command {
        Commands::Run(args) => run::run(args, &client, format).await?,
        Commands::Ps(args) => job::ps(args, &client, format).await?,
        Commands::Show { id } => job::show(id, &client, format).await?,
        Commands::Logs(args) => stream::logs(args, &client).await?,
        Commands::Output(args) => stream::output(args, &client).await?,
        Commands::Kill(args) => job::kill(args, &client).await?,
        Commands::Write(args) => stream::write(args, &client).await?,
        Commands::Close { id } => stream::close(id, &client).await?,
        Commands::Wait(args) => run::wait(args, &client, format).await?,
        Commands::Version => println!("{}", client.version().await?),
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

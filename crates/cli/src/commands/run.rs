// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `je run NAME [ARGS]` and `je wait ID`

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use je_adapters::{Client, CreateRequest};
use je_core::{DataKind, JobId};
use reqwest::Body;

use super::{exit_code, file_body, stdin_body, stream};
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};
use crate::poll::{Poller, Tick};

const DEFAULT_WAIT_POLL: Duration = Duration::from_millis(500);

#[derive(Args)]
pub struct RunArgs {
    /// Program to run on a worker
    pub name: String,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Keep stdin open; feed it with `je write` and `je close`
    #[arg(short, long)]
    pub interactive: bool,

    /// Wait for the job to finish, print its output and exit with its status
    #[arg(short, long)]
    pub wait: bool,

    /// Read the job's stdin from FILE instead of piped input
    #[arg(long, value_name = "FILE", conflicts_with = "interactive")]
    pub input: Option<PathBuf>,
}

impl RunArgs {
    fn request(&self) -> CreateRequest {
        CreateRequest::new(&self.name)
            .args(self.args.iter().cloned())
            .interactive(self.interactive)
            .wait(self.wait)
    }

    /// The job's initial stdin: `--input`, otherwise piped stdin. Interactive
    /// jobs and terminals start empty.
    async fn body(&self) -> Result<Body> {
        if let Some(path) = &self.input {
            return file_body(path).await;
        }
        if self.interactive || std::io::stdin().is_terminal() {
            return Ok(Body::from(Vec::new()));
        }
        Ok(stdin_body())
    }
}

pub async fn run(args: RunArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let job = client.create(&args.request(), args.body().await?).await?;

    if format == OutputFormat::Json {
        print_json(&job)?;
    } else if args.wait {
        stream::copy(client, job.id, DataKind::Output, false).await?;
    } else {
        println!("{}", job.id);
    }

    if args.wait {
        let code = exit_code(&job);
        if code != 0 {
            return Err(ExitError::new(code, String::new()).into());
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct WaitArgs {
    pub id: JobId,

    /// Give up after SECS seconds (exit code 2)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Poll until the job is terminal, print its status and exit with it.
pub async fn wait(args: WaitArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let interval = crate::env::wait_poll_ms().unwrap_or(DEFAULT_WAIT_POLL);
    let mut poller = Poller::new(interval, args.timeout.map(Duration::from_secs));

    let job = loop {
        let job = client.get(args.id).await?;
        if job.is_terminal() {
            break job;
        }
        match poller.tick().await {
            Tick::Ready => {}
            Tick::Timeout => {
                return Err(ExitError::new(2, format!("timed out waiting for job {}", args.id)).into())
            }
            Tick::Interrupted => return Err(ExitError::new(130, String::new()).into()),
        }
    };

    match format {
        OutputFormat::Json => print_json(&job)?,
        OutputFormat::Text => println!("{} {}", job.state, job.status),
    }
    let code = exit_code(&job);
    if code != 0 {
        return Err(ExitError::new(code, String::new()).into());
    }
    Ok(())
}

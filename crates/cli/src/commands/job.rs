// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `je ps`, `je show`, `je kill`

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use je_adapters::{Client, SearchFilter};
use je_core::{Job, JobId, JobState};

use crate::color;
use crate::output::{format_elapsed, format_time_ago, job_details, print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct PsArgs {
    /// Print ids only
    #[arg(short, long)]
    pub quiet: bool,

    /// Jobs in STATE (default: RUNNING)
    #[arg(long, conflicts_with = "all")]
    pub state: Option<JobState>,

    /// Jobs running program NAME
    #[arg(long)]
    pub name: Option<String>,

    /// Jobs in any state
    #[arg(short, long)]
    pub all: bool,
}

impl PsArgs {
    pub(crate) fn filter(&self) -> SearchFilter {
        let state = if self.all {
            None
        } else {
            Some(self.state.unwrap_or(JobState::Running))
        };
        match (&self.name, state) {
            (None, None) => SearchFilter::All,
            (Some(name), None) => SearchFilter::Name(name.clone()),
            (None, Some(state)) => SearchFilter::State(state),
            (Some(name), Some(state)) => {
                SearchFilter::Query(format!("+name:{name} +state:{}", state.as_str()))
            }
        }
    }
}

pub async fn ps(args: PsArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let jobs = client.search(&args.filter()).await?;

    if format == OutputFormat::Json {
        return print_json(&jobs);
    }
    if args.quiet {
        for job in &jobs {
            println!("{}", job.id);
        }
        return Ok(());
    }
    if jobs.is_empty() {
        println!("No jobs");
        return Ok(());
    }
    ps_table(&jobs, Table::new(ps_columns())).render(&mut std::io::stdout())?;
    Ok(())
}

pub(crate) fn ps_columns() -> Vec<Column> {
    vec![
        Column::right("ID"),
        Column::left("NAME").with_max(32),
        Column::muted("CREATED"),
        Column::state("STATE"),
        Column::right("STATUS"),
        Column::muted("ELAPSED"),
    ]
}

pub(crate) fn ps_table(jobs: &[Job], mut table: Table) -> Table {
    let now = Utc::now();
    for job in jobs {
        let status = if job.is_terminal() {
            job.status.to_string()
        } else {
            "-".to_string()
        };
        table.row(vec![
            job.id.to_string(),
            job.name.clone(),
            format_time_ago(job.created_at, now),
            job.state.to_string(),
            status,
            format_elapsed(job, now),
        ]);
    }
    table
}

pub async fn show(id: JobId, client: &Client, format: OutputFormat) -> Result<()> {
    let job = client.get(id).await?;
    match format {
        OutputFormat::Json => print_json(&job)?,
        OutputFormat::Text => {
            for line in job_details(&job, Utc::now(), color::should_colorize()) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct KillArgs {
    pub id: JobId,

    /// SIGKILL instead of SIGTERM
    #[arg(short, long)]
    pub force: bool,
}

pub async fn kill(args: KillArgs, client: &Client) -> Result<()> {
    client.kill(args.id, args.force).await?;
    Ok(())
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

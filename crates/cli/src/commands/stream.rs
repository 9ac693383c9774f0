// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `je logs`, `je output`, `je write`, `je close`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use je_adapters::Client;
use je_core::{DataKind, JobId};
use tokio::io::AsyncWriteExt;

use super::{file_body, stdin_body};

#[derive(Args)]
pub struct ReadArgs {
    pub id: JobId,

    /// Keep printing new lines until the job finishes
    #[arg(short, long)]
    pub follow: bool,
}

#[derive(Args)]
pub struct WriteArgs {
    pub id: JobId,

    /// Send FILE instead of stdin
    pub file: Option<PathBuf>,
}

/// Copy a data stream to stdout chunk by chunk.
pub async fn copy(client: &Client, id: JobId, kind: DataKind, follow: bool) -> Result<()> {
    let mut resp = client.open(id, kind, follow).await?;
    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = resp.chunk().await? {
        stdout.write_all(&chunk).await?;
        stdout.flush().await?;
    }
    Ok(())
}

pub async fn logs(args: ReadArgs, client: &Client) -> Result<()> {
    copy(client, args.id, DataKind::Logs, args.follow).await
}

pub async fn output(args: ReadArgs, client: &Client) -> Result<()> {
    copy(client, args.id, DataKind::Output, args.follow).await
}

pub async fn write(args: WriteArgs, client: &Client) -> Result<()> {
    let body = match &args.file {
        Some(path) => file_body(path).await?,
        None => stdin_body(),
    };
    client.write(args.id, body).await?;
    Ok(())
}

pub async fn close(id: JobId, client: &Client) -> Result<()> {
    client.close(id).await?;
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kinds of per-job byte streams.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the three streams a job owns: stdin, stdout and stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Input,
    Output,
    Logs,
}

impl DataKind {
    pub const ALL: [DataKind; 3] = [DataKind::Input, DataKind::Output, DataKind::Logs];

    /// File extension and wire name: `in`, `out`, `log`.
    pub fn extension(self) -> &'static str {
        match self {
            DataKind::Input => "in",
            DataKind::Output => "out",
            DataKind::Logs => "log",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown data kind: {0:?}")]
pub struct ParseDataKindError(pub String);

impl FromStr for DataKind {
    type Err = ParseDataKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" | "input" => Ok(DataKind::Input),
            "out" | "output" => Ok(DataKind::Output),
            "log" | "logs" => Ok(DataKind::Logs),
            other => Err(ParseDataKindError(other.to_string())),
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A live job: its record plus the process, pipes and completion signal
//! that only exist while it runs.
//!
//! Every transition goes through [`Task::transition`]: the record is
//! changed under the state lock, then persisted under the persist lock so
//! saves for one job never interleave. Terminal transitions release
//! [`Task::wait`] whether or not the save succeeds.

use chrono::{DateTime, Utc};
use je_adapters::{Data, DataError};
use je_core::{
    Clock, DataKind, Job, JobId, JobState, Metrics, NoOpMetrics, SystemClock, TransitionError,
    WorkerId,
};
use je_storage::Store;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::RwLock;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::TaskError;

const WRITE_CHUNK: usize = 8 * 1024;

/// Collaborators shared by every task.
#[derive(Clone)]
pub struct TaskDeps {
    pub store: Arc<dyn Store>,
    pub data: Arc<dyn Data>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<dyn Metrics>,
}

impl TaskDeps {
    pub fn new(store: Arc<dyn Store>, data: Arc<dyn Data>) -> Self {
        Self {
            store,
            data,
            clock: Arc::new(SystemClock),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

struct TaskState {
    job: Job,
    pid: Option<u32>,
}

/// Interactive stdin.
enum Stdin {
    /// Process not started yet.
    Pending,
    Open(ChildStdin),
    Closed,
}

pub struct Task {
    deps: TaskDeps,
    state: RwLock<TaskState>,
    persist: Mutex<()>,
    stdin: Mutex<Stdin>,
    stdin_closed: watch::Sender<bool>,
    attached: watch::Sender<bool>,
    done: watch::Sender<bool>,
}

impl Task {
    /// Create and persist a new CREATED job.
    pub async fn create(
        deps: TaskDeps,
        name: impl Into<String>,
        args: Vec<String>,
        interactive: bool,
    ) -> Result<Arc<Self>, TaskError> {
        let mut job = Job::new(name, args, interactive, deps.clock.now());
        job.id = deps.store.next_id();
        deps.store.save(&mut job).await?;
        deps.metrics.incr("job_count", &[]);
        info!(job_id = %job.id, name = %job.name, interactive, "job created");
        Ok(Self::from_record(job, deps))
    }

    /// Wrap an existing record, e.g. one received from the bus.
    pub fn from_record(job: Job, deps: TaskDeps) -> Arc<Self> {
        let (done, _) = watch::channel(job.is_terminal());
        let (attached, _) = watch::channel(false);
        let (stdin_closed, _) = watch::channel(false);
        Arc::new(Self {
            deps,
            state: RwLock::new(TaskState { job, pid: None }),
            persist: Mutex::new(()),
            stdin: Mutex::new(Stdin::Pending),
            stdin_closed,
            attached,
            done,
        })
    }

    pub fn id(&self) -> JobId {
        self.state.read().job.id
    }

    pub fn name(&self) -> String {
        self.state.read().job.name.clone()
    }

    /// Snapshot of the record.
    pub fn job(&self) -> Job {
        self.state.read().job.clone()
    }

    pub fn state(&self) -> JobState {
        self.state.read().job.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Pid of the running process.
    pub fn pid(&self) -> Option<u32> {
        self.state.read().pid
    }

    pub fn deps(&self) -> &TaskDeps {
        &self.deps
    }

    /// CREATED -> WAITING
    pub async fn enqueue(&self) -> Result<Job, TaskError> {
        self.transition(|job, now| job.enqueue(now)).await
    }

    /// WAITING -> RUNNING
    pub async fn start(&self, worker: WorkerId) -> Result<Job, TaskError> {
        self.transition(move |job, now| job.start(worker, now)).await
    }

    /// RUNNING -> STOPPED
    pub async fn stop(&self) -> Result<Job, TaskError> {
        let job = self.transition(|job, now| job.stop(now)).await?;
        info!(job_id = %job.id, status = job.status, "job stopped");
        Ok(job)
    }

    /// RUNNING (or WAITING) -> ERRORED
    pub async fn error(&self, err: &(dyn std::fmt::Display + Sync)) -> Result<Job, TaskError> {
        warn!(job_id = %self.id(), error = %err, "job errored");
        self.transition(|job, now| job.error(now)).await
    }

    /// Interrupt the process. With `force`, kill it and mark the job
    /// KILLED; otherwise send SIGINT and leave the state to the
    /// process's own exit.
    pub async fn kill(&self, force: bool) -> Result<(), TaskError> {
        if !force {
            let (id, pid) = {
                let state = self.state.read();
                (state.job.id, state.pid)
            };
            let pid = pid.ok_or_else(|| TaskError::invalid(id, "no running process"))?;
            debug!(job_id = %id, pid, "interrupting");
            return send_signal(pid, Signal::SIGINT);
        }

        let _persist = self.persist.lock().await;
        let snapshot = {
            let mut state = self.state.write();
            state.job.kill(self.deps.clock.now())?;
            if let Some(pid) = state.pid {
                if let Err(e) = send_signal(pid, Signal::SIGKILL) {
                    warn!(job_id = %state.job.id, error = %e, "kill signal failed");
                }
            }
            state.job.clone()
        };
        info!(job_id = %snapshot.id, "job killed");
        self.save(snapshot).await.map(drop)
    }

    /// Block until the job reaches a terminal state. Returns at once if
    /// it already has.
    pub async fn wait(&self) -> Job {
        let mut done = self.done.subscribe();
        flag_set(&mut done).await;
        self.job()
    }

    /// Copy `reader` into an interactive job's stdin. Waits for the
    /// process to start.
    ///
    /// The pipe is only locked while a chunk is written, so [`Task::close`]
    /// and process exit can drop it while the reader is idle. The write
    /// then fails with the bytes already delivered left in place.
    pub async fn write<R>(&self, reader: &mut R) -> Result<u64, TaskError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let id = self.require_interactive()?;
        self.wait_attached().await;
        if !matches!(*self.stdin.lock().await, Stdin::Open(_)) {
            return Err(TaskError::invalid(id, "stdin is closed"));
        }

        let mut closed = self.stdin_closed.subscribe();
        let mut buf = vec![0u8; WRITE_CHUNK];
        let mut total = 0u64;
        loop {
            let n = tokio::select! {
                n = reader.read(&mut buf) => n?,
                _ = flag_set(&mut closed) => return Err(TaskError::invalid(id, "stdin is closed")),
            };
            let mut stdin = self.stdin.lock().await;
            let Stdin::Open(pipe) = &mut *stdin else {
                return Err(TaskError::invalid(id, "stdin is closed"));
            };
            if n == 0 {
                pipe.flush().await?;
                return Ok(total);
            }
            pipe.write_all(&buf[..n]).await?;
            total += n as u64;
        }
    }

    /// Close an interactive job's stdin. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), TaskError> {
        let id = self.require_interactive()?;
        self.wait_attached().await;
        self.stdin_closed.send_replace(true);
        let previous = std::mem::replace(&mut *self.stdin.lock().await, Stdin::Closed);
        if matches!(previous, Stdin::Open(_)) {
            debug!(job_id = %id, "stdin closed");
        }
        Ok(())
    }

    /// Run the process to completion: stdout goes to the output stream,
    /// stderr to the logs stream, stdin comes from the stored input (or
    /// from [`Task::write`] when interactive). Records the exit status but
    /// leaves the state transition to the caller.
    pub async fn execute(&self) -> Result<i32, TaskError> {
        let job = self.job();
        let mut child = Command::new(&job.name)
            .args(&job.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TaskError::Spawn {
                name: job.name.clone(),
                source,
            })?;

        // A forced kill may have landed before the pid was known.
        let killed = {
            let mut state = self.state.write();
            state.pid = child.id();
            state.job.state == JobState::Killed
        };
        if killed {
            let _ = child.start_kill();
        }
        debug!(job_id = %job.id, pid = ?child.id(), "process started");

        let data = &self.deps.data;
        let copies = [
            tokio::spawn(copy_out(data.clone(), job.id, DataKind::Output, child.stdout.take())),
            tokio::spawn(copy_out(data.clone(), job.id, DataKind::Logs, child.stderr.take())),
        ];
        let feed = match child.stdin.take() {
            Some(pipe) if job.interactive => {
                *self.stdin.lock().await = Stdin::Open(pipe);
                None
            }
            Some(pipe) => Some(tokio::spawn(feed_input(data.clone(), job.id, pipe))),
            None => None,
        };
        self.attached.send_replace(true);

        let status = child.wait().await;
        self.state.write().pid = None;
        self.stdin_closed.send_replace(true);
        *self.stdin.lock().await = Stdin::Closed;

        for (copy, kind) in copies.into_iter().zip([DataKind::Output, DataKind::Logs]) {
            match copy.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(job_id = %job.id, %kind, error = %e, "stream copy failed"),
                Err(e) => warn!(job_id = %job.id, %kind, error = %e, "stream copy panicked"),
            }
        }
        if let Some(feed) = feed {
            match feed.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(job_id = %job.id, error = %e, "stdin feed failed"),
                Err(e) => warn!(job_id = %job.id, error = %e, "stdin feed panicked"),
            }
        }

        let code = status?.code().unwrap_or(-1);
        self.record_status(code).await?;
        Ok(code)
    }

    fn require_interactive(&self) -> Result<JobId, TaskError> {
        let state = self.state.read();
        if !state.job.interactive {
            return Err(TaskError::invalid(state.job.id, "job is not interactive"));
        }
        Ok(state.job.id)
    }

    async fn wait_attached(&self) {
        let mut attached = self.attached.subscribe();
        let mut done = self.done.subscribe();
        tokio::select! {
            _ = flag_set(&mut attached) => {}
            _ = flag_set(&mut done) => {}
        }
    }

    /// Store the exit code. A job that is already terminal (force-killed)
    /// is saved again so the code is persisted.
    async fn record_status(&self, code: i32) -> Result<(), TaskError> {
        let _persist = self.persist.lock().await;
        let terminal = {
            let mut state = self.state.write();
            state.job.status = code;
            state.job.is_terminal().then(|| state.job.clone())
        };
        if let Some(job) = terminal {
            self.save(job).await?;
        }
        Ok(())
    }

    async fn transition<F>(&self, apply: F) -> Result<Job, TaskError>
    where
        F: FnOnce(&mut Job, DateTime<Utc>) -> Result<(), TransitionError> + Send,
    {
        let _persist = self.persist.lock().await;
        let snapshot = {
            let mut state = self.state.write();
            apply(&mut state.job, self.deps.clock.now())?;
            state.job.clone()
        };
        self.save(snapshot).await
    }

    /// Save a snapshot. Caller holds the persist lock.
    async fn save(&self, mut snapshot: Job) -> Result<Job, TaskError> {
        let saved = self.deps.store.save(&mut snapshot).await;
        if snapshot.is_terminal() {
            self.done.send_replace(true);
        }
        saved?;
        Ok(snapshot)
    }
}

async fn flag_set(rx: &mut watch::Receiver<bool>) {
    // The sender outlives every receiver, so this only returns once set.
    let _ = rx.wait_for(|set| *set).await;
}

fn send_signal(pid: u32, sig: Signal) -> Result<(), TaskError> {
    let raw = i32::try_from(pid).map_err(|_| TaskError::Signal {
        pid,
        source: Errno::EINVAL,
    })?;
    match signal::kill(Pid::from_raw(raw), sig) {
        // Already gone
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(source) => Err(TaskError::Signal { pid, source }),
    }
}

/// Copy one process pipe into a data stream. If the stream cannot be
/// opened the pipe is still drained so the process never blocks on it.
async fn copy_out<R>(
    data: Arc<dyn Data>,
    id: JobId,
    kind: DataKind,
    reader: Option<R>,
) -> Result<u64, DataError>
where
    R: AsyncRead + Unpin + Send,
{
    let Some(mut reader) = reader else {
        return Ok(0);
    };
    let mut writer = match data.write(id, kind).await {
        Ok(writer) => writer,
        Err(e) => {
            tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
            return Err(e);
        }
    };
    let n = tokio::io::copy(&mut reader, &mut writer).await?;
    writer.shutdown().await?;
    Ok(n)
}

/// Feed the stored input blob to a non-interactive process, then close
/// its stdin. A missing blob is empty input.
async fn feed_input(data: Arc<dyn Data>, id: JobId, mut pipe: ChildStdin) -> Result<u64, DataError> {
    let mut input = match data.read(id, DataKind::Input).await {
        Ok(input) => input,
        Err(e) if e.is_not_found() => return Ok(0),
        Err(e) => return Err(e),
    };
    match tokio::io::copy(&mut input, &mut pipe).await {
        Ok(n) => Ok(n),
        // The process exited without reading all of it
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(0),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

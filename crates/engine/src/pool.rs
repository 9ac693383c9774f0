// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resizable pool of workers pulling tasks from one [`ChannelQueue`].

use crate::{ChannelQueue, PoolError, Queue, QueueError, Task};
use async_trait::async_trait;
use je_core::{JobId, JobState, Metrics, NoOpMetrics, WorkerId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKERS: usize = 32;
pub const DEFAULT_BACKLOG: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    /// Capacity of the dispatch queue.
    pub backlog: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            backlog: DEFAULT_BACKLOG,
        }
    }
}

type Receiver = Arc<tokio::sync::Mutex<mpsc::Receiver<Arc<Task>>>>;

struct Shared {
    queue: ChannelQueue,
    rx: Receiver,
    workers: Mutex<HashMap<WorkerId, Arc<Worker>>>,
    /// Submitted tasks that have not finished running.
    tasks: Mutex<HashMap<JobId, Arc<Task>>>,
    tracker: TaskTracker,
    metrics: Arc<dyn Metrics>,
}

/// Handle to a worker pool. Clones share the pool.
#[derive(Clone)]
pub struct Pool {
    shared: Arc<Shared>,
}

impl Pool {
    /// Start a pool with `config.workers` workers. Must be called inside
    /// a tokio runtime.
    pub fn new(config: PoolConfig) -> Self {
        Self::with_metrics(config, Arc::new(NoOpMetrics))
    }

    pub fn with_metrics(config: PoolConfig, metrics: Arc<dyn Metrics>) -> Self {
        let (queue, rx) = ChannelQueue::bounded(config.backlog);
        let pool = Self {
            shared: Arc::new(Shared {
                queue,
                rx: Arc::new(tokio::sync::Mutex::new(rx)),
                workers: Mutex::new(HashMap::new()),
                tasks: Mutex::new(HashMap::new()),
                tracker: TaskTracker::new(),
                metrics,
            }),
        };
        pool.resize(config.workers);
        pool
    }

    /// Grow or shrink to `n` workers. Shrinking cancels idle workers
    /// first; a busy worker finishes its current task before exiting.
    pub fn resize(&self, n: usize) {
        if self.shared.tracker.is_closed() {
            return;
        }
        let mut workers = self.shared.workers.lock();
        let mut live: Vec<Arc<Worker>> = workers
            .values()
            .filter(|w| !w.cancel.is_cancelled())
            .cloned()
            .collect();

        if live.len() < n {
            for _ in live.len()..n {
                let worker = Arc::new(Worker::new());
                workers.insert(worker.id.clone(), worker.clone());
                self.shared
                    .tracker
                    .spawn(worker.run(Arc::downgrade(&self.shared)));
            }
        } else {
            let excess = live.len() - n;
            live.sort_by_key(|w| w.is_busy());
            for worker in live.into_iter().take(excess) {
                worker.cancel.cancel();
            }
        }
        info!(size = n, "pool resized");
    }

    /// Live (not cancelled) worker count.
    pub fn size(&self) -> usize {
        self.shared
            .workers
            .lock()
            .values()
            .filter(|w| !w.cancel.is_cancelled())
            .count()
    }

    pub fn get_worker(&self, id: &WorkerId) -> Result<Arc<Worker>, PoolError> {
        self.shared
            .workers
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| PoolError::WorkerNotFound(id.clone()))
    }

    /// Registered workers, ordered by id.
    pub fn workers(&self) -> Vec<Arc<Worker>> {
        let mut workers: Vec<_> = self.shared.workers.lock().values().cloned().collect();
        workers.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        workers
    }

    /// A submitted task that has not finished yet.
    pub fn task(&self, id: JobId) -> Result<Arc<Task>, PoolError> {
        self.shared
            .tasks
            .lock()
            .get(&id)
            .cloned()
            .ok_or(PoolError::TaskNotFound(id))
    }

    /// Submit, waiting for queue capacity instead of failing.
    pub async fn submit_wait(&self, task: Arc<Task>) -> Result<(), PoolError> {
        self.track(&task);
        let result = self.shared.queue.submit_wait(task.clone()).await;
        if result.is_err() {
            self.untrack(&task);
        }
        Ok(result?)
    }

    /// Block until every worker has exited. Call after [`Queue::close`].
    pub async fn wait(&self) {
        self.shared.tracker.close();
        self.shared.tracker.wait().await;
    }

    fn track(&self, task: &Arc<Task>) {
        self.shared.tasks.lock().insert(task.id(), task.clone());
    }

    fn untrack(&self, task: &Task) {
        self.shared.tasks.lock().remove(&task.id());
    }
}

#[async_trait]
impl Queue for Pool {
    async fn submit(&self, task: Arc<Task>) -> Result<(), QueueError> {
        self.track(&task);
        let result = self.shared.queue.submit(task.clone()).await;
        if result.is_err() {
            self.untrack(&task);
        }
        result
    }

    /// Workers drain what is already queued, then exit.
    fn close(&self) {
        self.shared.queue.close();
        self.shared.tracker.close();
    }
}

/// One execution slot.
pub struct Worker {
    id: WorkerId,
    cancel: CancellationToken,
    current: Mutex<Option<Arc<Task>>>,
}

impl Worker {
    fn new() -> Self {
        Self {
            id: WorkerId::generate(),
            cancel: CancellationToken::new(),
            current: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    /// The task being executed, if any.
    pub fn task(&self) -> Option<Arc<Task>> {
        self.current.lock().clone()
    }

    pub fn current_job(&self) -> Option<JobId> {
        self.current.lock().as_ref().map(|t| t.id())
    }

    pub fn is_busy(&self) -> bool {
        self.current.lock().is_some()
    }

    pub async fn kill(&self, force: bool) -> Result<(), PoolError> {
        Ok(self.busy_task()?.kill(force).await?)
    }

    pub async fn write<R>(&self, reader: &mut R) -> Result<u64, PoolError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        Ok(self.busy_task()?.write(reader).await?)
    }

    pub async fn close(&self) -> Result<(), PoolError> {
        Ok(self.busy_task()?.close().await?)
    }

    fn busy_task(&self) -> Result<Arc<Task>, PoolError> {
        self.task()
            .ok_or_else(|| PoolError::Idle(self.id.clone()))
    }

    async fn run(self: Arc<Self>, pool: std::sync::Weak<Shared>) {
        debug!(worker = %self.id, "worker started");
        loop {
            let Some(shared) = pool.upgrade() else { break };
            let rx = shared.rx.clone();
            drop(shared);

            let task = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                task = async { rx.lock().await.recv().await } => match task {
                    Some(task) => task,
                    None => break,
                },
            };

            let Some(shared) = pool.upgrade() else { break };
            self.run_task(&shared, task).await;
        }

        if let Some(shared) = pool.upgrade() {
            shared.workers.lock().remove(&self.id);
        }
        debug!(worker = %self.id, "worker exited");
    }

    /// Start -> Execute -> Stop, or Error on any failure.
    async fn run_task(&self, shared: &Shared, task: Arc<Task>) {
        *self.current.lock() = Some(task.clone());
        let name = task.name();
        let started = Instant::now();

        match task.start(self.id.clone()).await {
            Ok(job) => {
                info!(job_id = %job.id, worker = %self.id, name = %job.name, "job started");
                match task.execute().await {
                    Ok(_) if task.state() == JobState::Killed => {}
                    Ok(_) => {
                        if let Err(e) = task.stop().await {
                            warn!(job_id = %task.id(), error = %e, "failed to stop job");
                        }
                    }
                    Err(e) => fail(&task, &e).await,
                }
            }
            Err(e) => fail(&task, &e).await,
        }

        shared.metrics.observe(
            "job_duration",
            started.elapsed().as_secs_f64(),
            &[("name", name.as_str())],
        );
        shared.tasks.lock().remove(&task.id());
        *self.current.lock() = None;
    }
}

async fn fail(task: &Task, err: &(dyn std::fmt::Display + Sync)) {
    if task.is_terminal() {
        return;
    }
    if let Err(e) = task.error(err).await {
        warn!(job_id = %task.id(), error = %e, "failed to record job error");
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;

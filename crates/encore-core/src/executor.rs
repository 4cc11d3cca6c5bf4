use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::Mutex;
use tokio::runtime::{self, Runtime};
use tokio::task::JoinSet;

use crate::config::RuntimeConfig;
use crate::error::ExecutorError;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where use cases run. Never the UI thread, except for [`Inline`].
pub trait Executor: Send + Sync {
    fn spawn(&self, job: Job);
}

/// Runs jobs synchronously on the caller.
///
/// Results still travel through the looper, so observers see `Loading`
/// before the outcome exactly as with a real pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inline;

impl Executor for Inline {
    fn spawn(&self, job: Job) {
        job();
    }
}

/// Use cases on the blocking pool of a dedicated tokio runtime.
///
/// Jobs are plain blocking closures, so they go through `spawn_blocking`;
/// `worker_threads` caps how many run at once.
pub struct ThreadPool {
    runtime: Mutex<Option<Runtime>>,
    jobs: Mutex<JoinSet<()>>,
}

impl ThreadPool {
    pub fn new(cfg: &RuntimeConfig) -> Result<Self, ExecutorError> {
        let workers = cfg.worker_threads.max(1);
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name(cfg.thread_name.clone())
            .build()
            .map_err(ExecutorError::Spawn)?;
        log::debug!("runtime started with {workers} blocking workers");
        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            jobs: Mutex::new(JoinSet::new()),
        })
    }

    /// Lets queued jobs finish, then stops the runtime.
    pub fn shutdown(&self) {
        let Some(runtime) = self.runtime.lock().take() else {
            return;
        };
        let mut jobs = std::mem::take(&mut *self.jobs.lock());
        runtime.block_on(async {
            while let Some(done) = jobs.join_next().await {
                if let Err(e) = done {
                    log::error!("job failed outside of its guard: {e}");
                }
            }
        });
        drop(runtime);
        log::debug!("runtime stopped");
    }
}

impl Executor for ThreadPool {
    fn spawn(&self, job: Job) {
        let runtime = self.runtime.lock();
        let Some(runtime) = runtime.as_ref() else {
            log::warn!("spawn after shutdown; job dropped");
            return;
        };
        let mut jobs = self.jobs.lock();
        // reap finished handles so the set only tracks live work
        while jobs.try_join_next().is_some() {}
        jobs.spawn_blocking_on(
            move || {
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    log::error!("job panicked on {:?}", std::thread::current().name());
                }
            },
            runtime.handle(),
        );
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Holds jobs until the test decides when (and in which order) they run.
#[cfg(any(test, feature = "testing"))]
#[derive(Default)]
pub struct ManualExecutor {
    jobs: Mutex<std::collections::VecDeque<Job>>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualExecutor {
    pub fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Runs the oldest queued job.
    pub fn run_next(&self) -> bool {
        let job = self.jobs.lock().pop_front();
        job.map(|j| j()).is_some()
    }

    /// Runs the newest queued job.
    pub fn run_last(&self) -> bool {
        let job = self.jobs.lock().pop_back();
        job.map(|j| j()).is_some()
    }

    pub fn run_all(&self) -> usize {
        let mut n = 0;
        while self.run_next() {
            n += 1;
        }
        n
    }
}

#[cfg(any(test, feature = "testing"))]
impl Executor for ManualExecutor {
    fn spawn(&self, job: Job) {
        self.jobs.lock().push_back(job);
    }
}

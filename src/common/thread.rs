use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::core::error::ExecutionError;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct JobQueue {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

struct PoolState {
    queue: Mutex<JobQueue>,
    notifier: Condvar,
}

/// A fixed-size thread pool pulling jobs from one shared FIFO queue
///
/// Dropping the pool sets the stop flag, wakes every worker and joins them.
/// Jobs already queued at that point are still drained before the workers exit.
pub struct ThreadPool {
    workers: Vec<Worker>,
    state: Arc<PoolState>,
}

impl ThreadPool {
    pub fn new(size: usize) -> Result<Self, ExecutionError> {
        Self::with_stack_size(size, None)
    }

    /// Create a pool whose workers use the given stack size in bytes
    ///
    /// Fails if any worker thread cannot be spawned. Workers started before
    /// the failure are shut down and joined.
    pub fn with_stack_size(size: usize, stack_size: Option<usize>) -> Result<Self, ExecutionError> {
        assert!(size > 0, "Thread pool size must be greater than zero");

        let state = Arc::new(PoolState {
            queue: Mutex::new(JobQueue {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            notifier: Condvar::new(),
        });

        let mut pool = Self {
            workers: Vec::with_capacity(size),
            state,
        };
        for id in 0..size {
            let worker = Worker::new(id, Arc::clone(&pool.state), stack_size)?;
            pool.workers.push(worker);
        }

        log::debug!("thread pool started with {} workers", size);
        Ok(pool)
    }

    pub fn execute<F>(&self, f: F) -> Result<(), ExecutionError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut queue = self.state.queue.lock();
        if queue.shutdown {
            return Err(ExecutionError::PoolShutDown);
        }
        queue.jobs.push_back(Box::new(f));
        self.state.notifier.notify_one();
        Ok(())
    }

    /// Enqueue a job and return a shareable handle to its result
    ///
    /// If the job panics, or the pool is already shut down, the handle
    /// resolves to `ExecutionError::JobCancelled`.
    pub fn submit<T, F>(&self, f: F) -> JobHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let job = move || {
            // the receiver may already be gone; nobody is waiting then
            let _ = sender.send(f());
        };

        if let Err(e) = self.execute(job) {
            log::warn!("job rejected: {}", e);
        }

        JobHandle {
            inner: receiver.shared(),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn shutdown(&self) {
        self.state.queue.lock().shutdown = true;
        self.state.notifier.notify_all();
    }

    fn wait_for_completion(&mut self) {
        for worker in &mut self.workers {
            worker.wait();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
        self.wait_for_completion();
        log::debug!("thread pool stopped");
    }
}

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, state: Arc<PoolState>, stack_size: Option<usize>) -> Result<Self, ExecutionError> {
        let mut builder = thread::Builder::new().name(format!("rpq-worker-{}", id));
        if let Some(bytes) = stack_size {
            builder = builder.stack_size(bytes);
        }

        let thread = builder
            .spawn(move || loop {
                let job = {
                    let mut queue = state.queue.lock();
                    loop {
                        if let Some(job) = queue.jobs.pop_front() {
                            break Some(job);
                        }
                        if queue.shutdown {
                            break None;
                        }
                        state.notifier.wait(&mut queue);
                    }
                };

                match job {
                    Some(job) => {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            log::error!("worker {} job panicked", id);
                        }
                    }
                    None => break,
                }
            })
            .map_err(|e| {
                log::error!("failed to spawn worker {}: {}", id, e);
                ExecutionError::WorkerSpawn {
                    id,
                    message: e.to_string(),
                }
            })?;

        Ok(Self { thread: Some(thread) })
    }

    fn wait(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Shareable handle to the result of a pool job
///
/// Cloning is cheap; every clone observes the same result.
pub struct JobHandle<T: Clone> {
    inner: Shared<oneshot::Receiver<T>>,
}

impl<T: Clone> Clone for JobHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> JobHandle<T> {
    /// A handle that is already resolved
    pub fn ready(value: T) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(value);
        Self {
            inner: receiver.shared(),
        }
    }

    /// Block the calling thread until the result is available
    pub fn wait(&self) -> Result<T, ExecutionError> {
        futures::executor::block_on(self.inner.clone()).map_err(|_| ExecutionError::JobCancelled)
    }
}

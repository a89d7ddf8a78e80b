//! Runs compression and decompression away from the calling thread.
//!
//! Architecture:
//! - Callers push jobs into a shared queue and get a 'Pending' handle back.
//! - A fixed set of worker threads pull jobs and send each result to the
//!   handle of its job.
//!
//! A job can't be interrupted once it starts. Dropping the 'Pending' handle
//! discards the result when the job finishes.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, unbounded, Receiver, Sender, TryRecvError};

use crate::api::{compress, uncompress};
use crate::error::{Error, Result};

/// Configuration for the worker pool.
#[derive(Debug, Clone, Default)]
pub struct WorkerConfig {
    /// Number of worker threads. Zero selects the number of CPUs.
    pub num_threads: usize,
}

impl WorkerConfig {
    fn effective_threads(&self) -> usize {
        match self.num_threads {
            0 => num_cpus::get().clamp(1, 32),
            n => n.clamp(1, 32),
        }
    }
}

/// The kind of work to perform on a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Compress,
    Uncompress,
}

/// A queued job and the channel that receives its result.
struct Job {
    kind: JobKind,
    input: Vec<u8>,
    reply: Sender<Result<Vec<u8>>>,
}

impl Job {
    fn run(self) {
        let res = match self.kind {
            JobKind::Compress => compress(&self.input),
            JobKind::Uncompress => uncompress(&self.input),
        };
        // The receiver is gone if the caller dropped the handle.
        let _ = self.reply.send(res);
    }
}

/// The future result of a background job.
pub struct Pending {
    result: Receiver<Result<Vec<u8>>>,
}

impl Pending {
    /// Create a job and the handle that waits for it.
    fn new(kind: JobKind, input: Vec<u8>) -> (Job, Self) {
        let (reply, result) = bounded(1);
        (Job { kind, input, reply }, Pending { result })
    }

    /// Returns true if the result is available, so that 'wait' won't block.
    pub fn is_ready(&self) -> bool {
        !self.result.is_empty()
    }

    /// Take the result if the job has finished. Returns None while the job is
    /// still queued or running.
    pub fn try_take(&self) -> Option<Result<Vec<u8>>> {
        match self.result.try_recv() {
            Ok(res) => Some(res),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::WorkerGone)),
        }
    }

    /// Block until the job finishes and return its result.
    pub fn wait(self) -> Result<Vec<u8>> {
        self.result.recv().unwrap_or(Err(Error::WorkerGone))
    }
}

/// A pool of threads that take compression jobs from a shared queue.
pub struct WorkerPool {
    /// The job queue. Closed when the pool is dropped.
    queue: Option<Sender<Job>>,
    /// The worker threads.
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(config: WorkerConfig) -> Self {
        let num_threads = config.effective_threads();
        let (queue, jobs) = unbounded::<Job>();

        let mut workers = Vec::with_capacity(num_threads);
        for i in 0..num_threads {
            let jobs = jobs.clone();
            let spawned = thread::Builder::new()
                .name(format!("snapcodec-worker-{}", i))
                .spawn(move || {
                    for job in jobs.iter() {
                        job.run();
                    }
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => log::warn!("Could not start worker {}: {}", i, err),
            }
        }
        log::debug!("Started {} workers", workers.len());

        Self {
            queue: Some(queue),
            workers,
        }
    }

    /// Returns the number of running worker threads.
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    fn submit(&self, kind: JobKind, input: Vec<u8>) -> Pending {
        let (job, pending) = Pending::new(kind, input);
        if let Some(queue) = &self.queue {
            // If no worker is alive the job is dropped, and the handle
            // reports 'WorkerGone'.
            let _ = queue.send(job);
        }
        pending
    }

    /// Queue the compression of 'input'.
    pub fn submit_compress(&self, input: Vec<u8>) -> Pending {
        self.submit(JobKind::Compress, input)
    }

    /// Queue the decompression of 'input'.
    pub fn submit_uncompress(&self, input: Vec<u8>) -> Pending {
        self.submit(JobKind::Uncompress, input)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(WorkerConfig::default())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Close the queue. The workers finish the queued jobs and exit.
        drop(self.queue.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("A worker thread panicked");
            }
        }
        log::debug!("Stopped workers");
    }
}

/// Run a single job on a new thread.
fn spawn_one(kind: JobKind, input: Vec<u8>) -> Pending {
    let (job, pending) = Pending::new(kind, input);
    let spawned = thread::Builder::new()
        .name("snapcodec-background".to_string())
        .spawn(move || job.run());
    if let Err(err) = spawned {
        log::warn!("Could not start background thread: {}", err);
    }
    pending
}

/// Compress 'input' on a new thread.
pub fn compress_in_background(input: Vec<u8>) -> Pending {
    spawn_one(JobKind::Compress, input)
}

/// Decompress 'input' on a new thread.
pub fn uncompress_in_background(input: Vec<u8>) -> Pending {
    spawn_one(JobKind::Uncompress, input)
}

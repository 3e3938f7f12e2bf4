//! Concurrent ingestion of the primary entity file.
//!
//! ```text
//! producer ──jobs (bounded, = workers)──> worker × N ──outcomes──> reducer
//!                                            │
//!                                            └──done──> awaiter (closes outcomes)
//! ```
//!
//! Workers upsert into one profile mapping guarded by a single lock. Lines are applied in no
//! particular order, each exactly once.

use crate::error::{IndexerError, Result};
use crate::index::{upsert_entity, ProfileMap};
use crate::limits::clamp_workers;
use crate::lines::{open_lines, LineStream};
use crate::parse::EntityKind;
use crate::stats::IngestStats;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::fs::File;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio::task::JoinHandle;

const PROGRESS_EVERY: usize = 10_000;

/// One line waiting to be parsed and applied.
#[derive(Debug)]
struct Job {
    line: String,
}

/// What a worker did with one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Applied,
    Rejected,
}

type SharedJobs = Arc<TokioMutex<mpsc::Receiver<Job>>>;
type SharedProfiles = Arc<Mutex<ProfileMap>>;

/// Bounded worker pool that folds a primary entity file into a profile mapping.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryPipeline {
    kind: EntityKind,
    workers: usize,
}

impl PrimaryPipeline {
    pub fn new(kind: EntityKind, workers: usize) -> Self {
        Self {
            kind,
            workers: clamp_workers(workers),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Ingest `input` into `profiles` and hand the mapping back.
    ///
    /// Fails only when the file cannot be opened or read, or a worker dies.
    pub async fn run(&self, input: &Path, profiles: ProfileMap) -> Result<(ProfileMap, IngestStats)> {
        let lines = open_lines(input).await?;
        log::info!(
            "Ingesting {} file {} with {} worker(s)",
            self.kind.as_str(),
            input.display(),
            self.workers
        );
        self.run_stream(lines, profiles).await
    }

    async fn run_stream(
        &self,
        lines: LineStream<File>,
        profiles: ProfileMap,
    ) -> Result<(ProfileMap, IngestStats)> {
        let started = Instant::now();
        let profiles: SharedProfiles = Arc::new(Mutex::new(profiles));

        let (job_tx, job_rx) = mpsc::channel::<Job>(self.workers);
        let (done_tx, done_rx) = mpsc::channel::<()>(self.workers);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome>(self.workers);
        let jobs: SharedJobs = Arc::new(TokioMutex::new(job_rx));

        let producer = tokio::spawn(produce_jobs(lines, job_tx));

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            handles.push(tokio::spawn(run_worker(
                worker_id,
                self.kind,
                jobs.clone(),
                profiles.clone(),
                outcome_tx.clone(),
                done_tx.clone(),
            )));
        }
        drop(done_tx);

        let awaiter = tokio::spawn(await_workers(self.workers, done_rx, outcome_tx));

        let mut stats = IngestStats::new(self.workers);
        while let Some(outcome) = outcome_rx.recv().await {
            match outcome {
                Outcome::Applied => stats.add_accepted(),
                Outcome::Rejected => stats.add_skipped(),
            }
            if stats.lines_read % PROGRESS_EVERY == 0 {
                log::info!("Processed {} lines ({} accepted)", stats.lines_read, stats.accepted);
            }
        }

        let produced = producer
            .await
            .map_err(|e| IndexerError::Worker(format!("producer panicked: {e}")))??;
        awaiter
            .await
            .map_err(|e| IndexerError::Worker(format!("completion awaiter panicked: {e}")))?;
        for handle in handles {
            handle
                .await
                .map_err(|e| IndexerError::Worker(format!("worker panicked: {e}")))?;
        }

        if produced != stats.lines_read {
            return Err(IndexerError::Worker(format!(
                "produced {produced} jobs but {} were processed",
                stats.lines_read
            )));
        }

        let profiles = Arc::try_unwrap(profiles)
            .map_err(|_| IndexerError::Other("profile mapping still shared after ingest".into()))?
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        stats.finish(started);
        log::info!(
            "Ingest completed: {} lines, {} accepted, {} skipped, {} profiles",
            stats.lines_read,
            stats.accepted,
            stats.skipped,
            profiles.len()
        );
        Ok((profiles, stats))
    }
}

/// Stream every line into the bounded job queue. Returns the number of jobs sent.
async fn produce_jobs(mut lines: LineStream<File>, jobs: mpsc::Sender<Job>) -> Result<usize> {
    let mut sent = 0usize;
    while let Some(line) = lines.next_line().await? {
        if jobs.send(Job { line }).await.is_err() {
            return Err(IndexerError::Worker("all workers exited early".into()));
        }
        sent += 1;
    }
    // Dropping `jobs` closes the queue and lets idle workers finish.
    Ok(sent)
}

async fn run_worker(
    worker_id: usize,
    kind: EntityKind,
    jobs: SharedJobs,
    profiles: SharedProfiles,
    outcomes: mpsc::Sender<Outcome>,
    done: mpsc::Sender<()>,
) {
    loop {
        let job = {
            let mut queue = jobs.lock().await;
            queue.recv().await
        };
        let Some(job) = job else {
            break;
        };

        let outcome = match kind.parse_line(&job.line) {
            Some(entity) => {
                let mut guard = profiles.lock().unwrap_or_else(PoisonError::into_inner);
                upsert_entity(&mut guard, entity);
                Outcome::Applied
            }
            None => Outcome::Rejected,
        };

        if outcomes.send(outcome).await.is_err() {
            log::warn!("Worker {worker_id}: outcome channel closed early");
            break;
        }
    }
    let _ = done.send(()).await;
}

/// Wait for one completion signal per worker, then release the last outcome sender.
async fn await_workers(workers: usize, mut done: mpsc::Receiver<()>, outcomes: mpsc::Sender<Outcome>) {
    for _ in 0..workers {
        if done.recv().await.is_none() {
            break;
        }
    }
    drop(outcomes);
}

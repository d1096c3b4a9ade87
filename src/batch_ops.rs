//! # Batch Orchestrator
//!
//! Runs many decode jobs with at most `concurrency` in flight. A job's failure
//! (or panic) is recorded against that job only; siblings keep running and
//! [`run_all`] returns once every job has settled.
//!
//! Workers never touch the batch counters. Each worker sends one
//! [`JobOutcome`] over a channel when its job settles, and the calling thread
//! is the single consumer that updates the counters and emits progress.

#[cfg(feature = "batch-ops")]
use rayon::prelude::*;
#[cfg(feature = "batch-ops")]
use std::panic::{catch_unwind, AssertUnwindSafe};
#[cfg(feature = "batch-ops")]
use std::sync::mpsc;
#[cfg(feature = "batch-ops")]
use tracing::{debug, info, warn};

#[cfg(feature = "batch-ops")]
use crate::decryptor::Decoder;
#[cfg(feature = "batch-ops")]
use crate::error::{BatchError, JobError};
#[cfg(feature = "batch-ops")]
use crate::job::{DecodeJob, JobDecoder};

/// Result of one settled job.
#[cfg(feature = "batch-ops")]
#[derive(Debug)]
pub struct JobOutcome {
    /// Position of the job in the submitted slice.
    pub index: usize,
    pub id: String,
    /// Plaintext bytes written, or why the job failed.
    pub result: Result<u64, JobError>,
}

/// Counters at the moment one job settled.
#[cfg(feature = "batch-ops")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent<'a> {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// The job whose settlement produced this event.
    pub job_id: &'a str,
    pub succeeded: bool,
}

#[cfg(feature = "batch-ops")]
impl ProgressEvent<'_> {
    /// Settled share of the batch, in percent.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed + self.failed) as f64 * 100.0 / self.total as f64
    }
}

/// Receives one event per settled job, always from the thread that called
/// [`run_all`].
#[cfg(feature = "batch-ops")]
pub trait ProgressSink {
    fn on_progress(&mut self, event: &ProgressEvent<'_>);
}

#[cfg(feature = "batch-ops")]
impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent<'_>),
{
    fn on_progress(&mut self, event: &ProgressEvent<'_>) {
        self(event)
    }
}

/// Discards progress.
#[cfg(feature = "batch-ops")]
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

#[cfg(feature = "batch-ops")]
impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: &ProgressEvent<'_>) {}
}

/// Logs every settlement at `info`.
#[cfg(feature = "batch-ops")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

#[cfg(feature = "batch-ops")]
impl ProgressSink for LogProgress {
    fn on_progress(&mut self, event: &ProgressEvent<'_>) {
        info!(
            completed = event.completed,
            failed = event.failed,
            total = event.total,
            job = event.job_id,
            ok = event.succeeded,
            "{:.2}%",
            event.percent()
        );
    }
}

/// Final report of a batch.
#[cfg(feature = "batch-ops")]
#[derive(Debug)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// One outcome per submitted job, in submission order.
    pub outcomes: Vec<JobOutcome>,
}

#[cfg(feature = "batch-ops")]
impl BatchSummary {
    /// Outcomes of the jobs that failed.
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Turn a batch with any failed job into [`BatchError::PartialFailure`].
    pub fn into_result(self) -> Result<BatchSummary, BatchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(BatchError::PartialFailure {
                failed: self.failed,
                total: self.total,
            })
        }
    }
}

/// Counters owned by the consuming thread.
#[cfg(feature = "batch-ops")]
struct BatchState {
    completed: usize,
    failed: usize,
    total: usize,
}

#[cfg(feature = "batch-ops")]
impl BatchState {
    fn settle<'a>(&mut self, outcome: &'a JobOutcome) -> ProgressEvent<'a> {
        let succeeded = outcome.result.is_ok();
        if succeeded {
            self.completed += 1;
        } else {
            self.failed += 1;
        }
        ProgressEvent {
            completed: self.completed,
            failed: self.failed,
            total: self.total,
            job_id: &outcome.id,
            succeeded,
        }
    }
}

/// Decode every job with the standard codec, at most `concurrency` at a time.
///
/// See [`run_all_with`].
#[cfg(feature = "batch-ops")]
pub fn run_all<S>(
    jobs: &[DecodeJob],
    concurrency: usize,
    sink: &mut S,
) -> Result<BatchSummary, BatchError>
where
    S: ProgressSink + ?Sized,
{
    run_all_with(&Decoder::default(), jobs, concurrency, sink)
}

/// Decode every job with `decoder`, at most `concurrency` at a time.
///
/// A dedicated pool of exactly `concurrency` worker threads bounds the number
/// of jobs in flight; as soon as one settles a worker picks up the next queued
/// job. No job is retried. On return `completed + failed == total`.
///
/// # Errors
///
/// Only systemic failures: [`BatchError::InvalidConcurrency`] for zero and
/// [`BatchError::ThreadPool`] if the workers cannot be started. Job failures
/// are reported inside the returned [`BatchSummary`].
#[cfg(feature = "batch-ops")]
pub fn run_all_with<D, S>(
    decoder: &D,
    jobs: &[DecodeJob],
    concurrency: usize,
    sink: &mut S,
) -> Result<BatchSummary, BatchError>
where
    D: JobDecoder + Sync + ?Sized,
    S: ProgressSink + ?Sized,
{
    if concurrency == 0 {
        return Err(BatchError::InvalidConcurrency(concurrency));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .thread_name(|i| format!("decode-worker-{i}"))
        .build()?;

    let total = jobs.len();
    debug!(total, concurrency, "starting batch");

    let mut state = BatchState {
        completed: 0,
        failed: 0,
        total,
    };
    let mut outcomes = Vec::with_capacity(total);
    let (tx, rx) = mpsc::channel::<JobOutcome>();

    std::thread::scope(|s| {
        s.spawn(move || {
            pool.install(|| {
                jobs.par_iter()
                    .enumerate()
                    .with_max_len(1)
                    .for_each_with(tx, |tx, (index, job)| {
                        let outcome = run_one(decoder, index, job);
                        // the receiver outlives every sender
                        let _ = tx.send(outcome);
                    });
            });
        });

        for outcome in rx {
            let event = state.settle(&outcome);
            if let Err(e) = &outcome.result {
                warn!(job = %outcome.id, error = %e, "job failed");
            }
            sink.on_progress(&event);
            outcomes.push(outcome);
        }
    });

    outcomes.sort_by_key(|o| o.index);
    debug_assert_eq!(state.completed + state.failed, total);

    Ok(BatchSummary {
        total,
        completed: state.completed,
        failed: state.failed,
        outcomes,
    })
}

#[cfg(feature = "batch-ops")]
fn run_one<D>(decoder: &D, index: usize, job: &DecodeJob) -> JobOutcome
where
    D: JobDecoder + ?Sized,
{
    let result = match catch_unwind(AssertUnwindSafe(|| decoder.decode_job(job))) {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(JobError::Decode(e)),
        Err(payload) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
    };
    JobOutcome {
        index,
        id: job.id.clone(),
        result,
    }
}

#[cfg(feature = "batch-ops")]
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

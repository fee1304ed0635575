//! Parallel task processing with a bounded work queue.
//!
//! The record stream is driven by a single blocking producer that feeds a
//! bounded queue. Worker tasks share the queue, each with its own executor,
//! and report one outcome per record. A failing record never stops the other
//! records; the stream itself stays sequential.

pub mod writer;

#[cfg(test)]
pub mod tests;

use self::writer::ScriptWriter;

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::execution::verification::strip_script_quotes;
use crate::execution::{
    ExecutionOutcome, ExecutorFactory, ResultValue, ScriptExecutor, run_script,
    verification_script,
};
use crate::models::{ParsedRecord, ProcessingSummary, TaskOutcome};
use crate::parser::{RecordStream, StreamStats};

use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc};
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type WorkQueue = Arc<Mutex<mpsc::Receiver<ParsedRecord>>>;

/// Main processor running task records through the executor pool
pub struct TaskProcessor<F: ExecutorFactory> {
    config: Arc<Config>,
    factory: Arc<F>,
    writer: ScriptWriter,
}

impl<F: ExecutorFactory> TaskProcessor<F> {
    /// Create a processor; the configuration is validated up front
    pub fn new(config: Config, factory: F) -> Result<Self> {
        config.validate()?;
        let writer = ScriptWriter::new(config.output_dir.clone());

        Ok(Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
            writer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every record owned by the configured owner
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<ProcessingSummary> {
        let start_time = Instant::now();

        let stream = RecordStream::open(&self.config.input_path, self.config.owner_filter.clone())?;
        let (record_tx, record_rx) = mpsc::channel(self.config.queue_capacity);
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let submitted = Arc::new(AtomicUsize::new(0));

        let producer = Self::spawn_producer(
            stream,
            record_tx,
            submitted.clone(),
            cancellation_token.clone(),
        );
        let mut workers = self.spawn_workers(record_rx, outcome_tx, cancellation_token.clone());

        let progress_bar = self.config.show_progress.then(|| {
            create_spinner(&format!(
                "Processing records for {}...",
                self.config.owner_filter
            ))
        });

        let mut summary = ProcessingSummary::default();
        while let Some(outcome) = outcome_rx.recv().await {
            if !outcome.is_success() {
                warn!("Record {} failed: {}", outcome.id, outcome.message);
            }
            summary.record(outcome);

            if let Some(pb) = &progress_bar {
                pb.set_message(format!(
                    "Submitted {}, completed {} ({} failed)",
                    submitted.load(Ordering::Relaxed),
                    summary.processed,
                    summary.failed.len()
                ));
                pb.tick();
            }
        }

        let mut worker_errors: Vec<TaskError> = Vec::new();
        while let Some(result) = workers.join_next().await {
            match result {
                Ok(Ok(count)) => debug!("Worker completed {} records", count),
                Ok(Err(e)) => {
                    error!("Worker stopped: {}", e);
                    worker_errors.push(e);
                }
                Err(e) => {
                    error!("Worker task panicked: {}", e);
                    worker_errors.push(e.into());
                }
            }
        }

        let (stream_stats, read_error) = producer.await?;
        if let Some(e) = read_error {
            error!("Task file was not read to the end: {}", e);
        }

        summary.submitted = submitted.load(Ordering::Relaxed);
        summary.malformed_records = stream_stats.records_malformed;
        summary.elapsed = start_time.elapsed();

        if let Some(pb) = &progress_bar {
            pb.finish_with_message(format!(
                "Completed: {} of {} records processed",
                summary.processed, summary.submitted
            ));
        }

        if cancellation_token.is_cancelled() {
            return Err(TaskError::Cancelled);
        }

        // No worker could start: report why instead of an empty summary
        if !worker_errors.is_empty() && worker_errors.len() == self.config.workers {
            return Err(worker_errors.swap_remove(0));
        }

        if summary.processed < summary.submitted {
            return Err(TaskError::Incomplete {
                processed: summary.processed,
                submitted: summary.submitted,
            });
        }

        info!(
            "Processed {} of {} submitted records in {:.2?} ({} failed, {} malformed)",
            summary.processed,
            summary.submitted,
            summary.elapsed,
            summary.failed.len(),
            summary.malformed_records
        );

        Ok(summary)
    }

    /// Pull records from the stream into the bounded queue
    fn spawn_producer<R>(
        mut stream: RecordStream<R>,
        record_tx: mpsc::Sender<ParsedRecord>,
        submitted: Arc<AtomicUsize>,
        cancellation_token: CancellationToken,
    ) -> task::JoinHandle<(StreamStats, Option<TaskError>)>
    where
        R: std::io::BufRead + Send + 'static,
    {
        task::spawn_blocking(move || {
            for record in stream.by_ref() {
                if cancellation_token.is_cancelled() {
                    debug!("Producer cancelled by user");
                    break;
                }

                let id = record.id.clone();
                if record_tx.blocking_send(record).is_err() {
                    debug!("Work queue closed, record {} not submitted", id);
                    break;
                }
                submitted.fetch_add(1, Ordering::Relaxed);
            }

            info!(
                "Submitted {} tasks to the worker pool",
                submitted.load(Ordering::Relaxed)
            );
            let read_error = stream.take_error();
            (stream.stats().clone(), read_error)
        })
    }

    /// Spawn worker tasks sharing the work queue
    fn spawn_workers(
        &self,
        record_rx: mpsc::Receiver<ParsedRecord>,
        outcome_tx: mpsc::UnboundedSender<TaskOutcome>,
        cancellation_token: CancellationToken,
    ) -> JoinSet<Result<usize>> {
        let queue: WorkQueue = Arc::new(Mutex::new(record_rx));
        let mut workers = JoinSet::new();

        info!("Spawning {} task workers", self.config.workers);

        for worker_id in 0..self.config.workers {
            let queue = queue.clone();
            let factory = self.factory.clone();
            let writer = self.writer.clone();
            let outcome_tx = outcome_tx.clone();
            let cancellation_token = cancellation_token.clone();

            workers.spawn(async move {
                Self::worker_task(
                    worker_id,
                    factory,
                    queue,
                    writer,
                    outcome_tx,
                    cancellation_token,
                )
                .await
            });
        }

        workers
    }

    /// Worker task that processes records from the shared queue
    async fn worker_task(
        worker_id: usize,
        factory: Arc<F>,
        queue: WorkQueue,
        writer: ScriptWriter,
        outcome_tx: mpsc::UnboundedSender<TaskOutcome>,
        cancellation_token: CancellationToken,
    ) -> Result<usize> {
        let mut executor = factory.connect(worker_id)?;
        let mut processed = 0;

        debug!("Worker {} started", worker_id);

        loop {
            let record = {
                let mut queue = queue.lock().await;
                tokio::select! {
                    biased;
                    _ = cancellation_token.cancelled() => {
                        debug!("Worker {} cancelled by user", worker_id);
                        None
                    }
                    record = queue.recv() => record,
                }
            };

            let Some(record) = record else {
                break;
            };

            let outcome = process_record(worker_id, &mut executor, &writer, &record).await;
            processed += 1;

            if outcome_tx.send(outcome).is_err() {
                debug!("Worker {} outcome channel closed, stopping", worker_id);
                break;
            }
        }

        debug!("Worker {} completed {} records", worker_id, processed);
        Ok(processed)
    }
}

/// Run one record and turn the result into an outcome
pub async fn process_record<E: ScriptExecutor>(
    worker_id: usize,
    executor: &mut E,
    writer: &ScriptWriter,
    record: &ParsedRecord,
) -> TaskOutcome {
    info!("[Worker {}] Starting record {}", worker_id, record.id);

    let outcome = match generate_verification(executor, writer, record).await {
        Ok(path) => TaskOutcome::success(
            &record.id,
            format!("Saved verification script to {}", path.display()),
        ),
        Err(e) => TaskOutcome::failure(&record.id, e.to_string()),
    };

    info!("[Worker {}] Finished record {}", worker_id, record.id);
    outcome
}

/// Execute a record's code and save the verification script for its result
async fn generate_verification<E: ScriptExecutor>(
    executor: &mut E,
    writer: &ScriptWriter,
    record: &ParsedRecord,
) -> Result<PathBuf> {
    let prepare_code = strip_script_quotes(&record.prepare_code);
    let run_code = strip_script_quotes(&record.run_code);

    match executor.execute(&run_script(prepare_code, run_code)).await? {
        ExecutionOutcome::Success(value) => {
            let result = ResultValue::from_json(value)?;
            debug!("Record {} returned a {}", record.id, result.kind_name());

            let script = verification_script(prepare_code, run_code, &result);
            writer.save(&record.id, &script).await
        }
        ExecutionOutcome::Failure(message) => Err(TaskError::execution(
            &record.id,
            format!("prepareCode and runCode could not be run: {}", message),
        )),
    }
}

/// Create a spinner for runs whose total is unknown up front
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}

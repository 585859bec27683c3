use crate::application::pipeline::AnalysisPipeline;
use crate::domain::ports::{PriceHistoryProvider, ResultPublisher};
use crate::domain::task::{AnalysisFailure, AnalysisResult, AnalysisTask};
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Incoming work: a decoded task, or the error result for a line that failed to decode.
pub type TaskEnvelope = Result<AnalysisTask, AnalysisFailure>;

/// Runs analysis pipelines on blocking worker threads, at most `workers` at a time.
///
/// Each task is owned end-to-end by one worker; tasks share no mutable state.
pub struct AnalysisWorkerPool {
    pipeline: Arc<AnalysisPipeline>,
    provider: Arc<dyn PriceHistoryProvider>,
    permits: Arc<Semaphore>,
    workers: usize,
    metrics: Option<Metrics>,
}

impl AnalysisWorkerPool {
    pub fn new(
        pipeline: Arc<AnalysisPipeline>,
        provider: Arc<dyn PriceHistoryProvider>,
        workers: usize,
    ) -> Self {
        let workers = workers.max(1);
        Self {
            pipeline,
            provider,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes one task on a worker thread and returns its result.
    pub async fn submit(&self, task: AnalysisTask) -> AnalysisResult {
        match self.permits.clone().acquire_owned().await {
            Ok(permit) => self.execute(task, permit).await,
            Err(e) => {
                error!("Worker pool closed: {}", e);
                AnalysisResult::Error(AnalysisFailure::for_task(&task, "Worker pool closed"))
            }
        }
    }

    async fn execute(&self, task: AnalysisTask, permit: OwnedSemaphorePermit) -> AnalysisResult {
        if let Some(metrics) = &self.metrics {
            metrics.tasks_in_flight.inc();
        }

        let pipeline = Arc::clone(&self.pipeline);
        let provider = Arc::clone(&self.provider);
        let worker_task = task.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            pipeline.process(&worker_task, provider.as_ref())
        })
        .await;

        if let Some(metrics) = &self.metrics {
            metrics.tasks_in_flight.dec();
        }

        joined.unwrap_or_else(|e| {
            error!("Worker for task {} failed: {}", task.task_id, e);
            AnalysisResult::Error(AnalysisFailure::for_task(
                &task,
                format!("Worker failed: {}", e),
            ))
        })
    }

    /// Drains `tasks` until the sender side closes, publishing every result.
    ///
    /// A permit is taken before each receive, so at most `workers` envelopes are in
    /// flight and a full channel pushes back on the producer.
    /// Returns the number of results published.
    pub async fn run(
        self: Arc<Self>,
        mut tasks: mpsc::Receiver<TaskEnvelope>,
        publisher: Arc<dyn ResultPublisher>,
    ) -> usize {
        info!("Worker pool started with {} workers", self.workers);
        let mut running = JoinSet::new();
        let mut published = 0;

        loop {
            let permit = match self.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Worker pool closed: {}", e);
                    break;
                }
            };
            let Some(envelope) = tasks.recv().await else {
                break;
            };

            let pool = Arc::clone(&self);
            let publisher = Arc::clone(&publisher);
            running.spawn(async move {
                let result = match envelope {
                    Ok(task) => {
                        debug!("Task {} accepted for {}", task.task_id, task.ticker);
                        pool.execute(task, permit).await
                    }
                    Err(failure) => {
                        drop(permit);
                        if let Some(metrics) = &pool.metrics {
                            metrics.inc_tasks("error");
                        }
                        AnalysisResult::Error(failure)
                    }
                };
                if let Err(e) = publisher.publish(&result).await {
                    warn!("Failed to publish result for {:?}: {:#}", result.task_id(), e);
                    return false;
                }
                true
            });

            while let Some(joined) = running.try_join_next() {
                published += tally(joined);
            }
        }

        while let Some(joined) = running.join_next().await {
            published += tally(joined);
        }
        info!("Worker pool drained, {} results published", published);
        published
    }
}

fn tally(joined: Result<bool, JoinError>) -> usize {
    match joined {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(e) => {
            error!("Result task failed: {}", e);
            0
        }
    }
}

use crate::core_modules::pixel_buffer::{FrameError, OwnedFrame};
use crate::core_modules::plant_database::PlantDatabase;
use crate::pipeline::{PipelineConfig, PipelineError, RecognitionPipeline, Report};
use futures::future::join_all;
use log::debug;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

const MAX_WORKER_POOL_SIZE: usize = 4;

/// Errors surfaced by the batch front end.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("worker pool is closed")]
    PoolClosed,
}

pub struct FrameTask {
    pub frame: OwnedFrame,
    pub result_sender: oneshot::Sender<Report>,
}

/// Fans frames out over a fixed pool of recognition workers.
///
/// Every worker owns its own `RecognitionPipeline` over a shared database,
/// so frames are analyzed concurrently without any cross-frame state. Results
/// come back through per-task oneshot channels, which keeps `analyze_all`
/// output in submission order regardless of which worker finishes first.
pub struct BatchAnalyzer {
    task_sender: mpsc::UnboundedSender<FrameTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl BatchAnalyzer {
    pub fn new(config: PipelineConfig, database: PlantDatabase) -> Result<Self, PipelineError> {
        let database = Arc::new(database);
        let pool_size = num_cpus::get().clamp(1, MAX_WORKER_POOL_SIZE);

        // Build the per-worker pipelines up front so configuration problems
        // surface here instead of inside a spawned task.
        let mut pipelines = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            pipelines.push(RecognitionPipeline::with_shared(
                config.clone(),
                Arc::clone(&database),
            )?);
        }

        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<FrameTask>();

        // Create a single dispatcher that distributes tasks to workers.
        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..pool_size)
            .map(|_| mpsc::unbounded_channel::<FrameTask>())
            .unzip();

        // Spawn dispatcher
        let dispatcher_senders = worker_senders;
        tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = dispatcher_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % dispatcher_senders.len();
            }
        });

        // Spawn workers
        let mut workers = Vec::with_capacity(pool_size);
        for (pipeline, mut worker_receiver) in pipelines.into_iter().zip(worker_receivers) {
            let worker = tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    let report = pipeline.analyze(&task.frame.view());
                    // A dropped receiver means the caller gave up on this
                    // frame; nothing to do with the report.
                    let _ = task.result_sender.send(report);
                }
            });
            workers.push(worker);
        }

        debug!("BatchAnalyzer: started {pool_size} worker(s)");
        Ok(Self {
            task_sender,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues one frame and waits for its report.
    pub async fn analyze(&self, frame: OwnedFrame) -> Result<Report, BatchError> {
        let (result_sender, result_receiver) = oneshot::channel();
        self.task_sender
            .send(FrameTask {
                frame,
                result_sender,
            })
            .map_err(|_| BatchError::PoolClosed)?;
        result_receiver.await.map_err(|_| BatchError::PoolClosed)
    }

    /// Wraps raw RGBA bytes and queues them in one call.
    pub async fn analyze_raw(
        &self,
        width: u32,
        height: u32,
        frame_buffer: Vec<u8>,
    ) -> Result<Report, BatchError> {
        let frame = OwnedFrame::new(width, height, frame_buffer)?;
        self.analyze(frame).await
    }

    /// Analyzes a batch concurrently. Reports come back in submission order,
    /// and the first error wins.
    pub async fn analyze_all(&self, frames: Vec<OwnedFrame>) -> Result<Vec<Report>, BatchError> {
        let pending: Vec<_> = frames.into_iter().map(|frame| self.analyze(frame)).collect();
        join_all(pending).await.into_iter().collect()
    }
}

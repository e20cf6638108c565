//! The orchestrator: dispatches content trees through generation and splicing.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use crate::assembler::{Assembler, MediaEncoder};
use crate::cancel::CancelToken;
use crate::content::{ContentNode, NodePath};
use crate::generator::UnitGenerator;
use crate::metrics;
use crate::processor::NodeProcessor;
use crate::splicer::{ConcatOrder, TreeSplicer};
use crate::staging::{StagingArea, StagingConfig};

use super::barrier::CompletionBarrier;
use super::clips::GeneratedClips;
use super::config::OrchestratorConfig;
use super::stage::{spawn_stage, StageGenerator};
use super::types::{DispatchReport, OrchestratorError, OrchestratorStatus};

/// A fully generated tree waiting for the splice worker.
struct SpliceJob {
    root: ContentNode,
    clips: GeneratedClips,
    cancel: CancelToken,
    started_at: DateTime<Utc>,
}

/// Dispatch counters.
#[derive(Default)]
struct DispatchStats {
    in_flight: AtomicU64,
    finalized: AtomicU64,
    failed: AtomicU64,
}

impl DispatchStats {
    fn begin(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        metrics::DISPATCHES_IN_FLIGHT.inc();
    }

    fn finish(&self, success: bool) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        metrics::DISPATCHES_IN_FLIGHT.dec();
        let (counter, label) = if success {
            (&self.finalized, "finalized")
        } else {
            (&self.failed, "failed")
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::DISPATCHES_TOTAL.with_label_values(&[label]).inc();
    }
}

/// Settings the splice worker needs besides the assembler.
#[derive(Clone)]
struct SpliceSettings {
    area: StagingArea,
    order: ConcatOrder,
    keep_staging: bool,
    finished_dir: PathBuf,
}

/// Top-level driver of the pipeline.
///
/// Owns one worker per generation role and a single splice worker. Each
/// dispatched tree is generated through the stage workers, joined on its own
/// completion barrier, then handed to the splice worker, which places the
/// finished file and emits a [`DispatchReport`].
pub struct Orchestrator {
    config: OrchestratorConfig,
    processor: NodeProcessor<StageGenerator, StageGenerator>,
    audio: StageGenerator,
    visual: StageGenerator,
    splice_tx: mpsc::Sender<SpliceJob>,
    cancel: CancelToken,
    running: Arc<AtomicBool>,
    stats: Arc<DispatchStats>,
    dispatch_slots: Arc<Semaphore>,
    shutdown_tx: broadcast::Sender<()>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Starts all workers and returns the orchestrator with the report stream.
    pub fn spawn<A, V, E>(
        config: OrchestratorConfig,
        staging: &StagingConfig,
        audio: Arc<A>,
        visual: Arc<V>,
        assembler: Assembler<E>,
        output_extension: &str,
    ) -> (Self, mpsc::Receiver<DispatchReport>)
    where
        A: UnitGenerator + 'static,
        V: UnitGenerator + 'static,
        E: MediaEncoder + 'static,
    {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (report_tx, report_rx) = mpsc::channel(config.input_queue_capacity.max(1));
        let (splice_tx, splice_rx) = mpsc::channel(config.max_concurrent_dispatches.max(1));

        let stage_capacity = config.stage_queue_capacity.max(1);
        let (audio_stage, audio_handle) =
            spawn_stage(audio, stage_capacity, shutdown_tx.subscribe());
        let (visual_stage, visual_handle) =
            spawn_stage(visual, stage_capacity, shutdown_tx.subscribe());

        let stats = Arc::new(DispatchStats::default());
        let settings = SpliceSettings {
            area: staging.area(output_extension),
            order: staging.concat_order,
            keep_staging: staging.keep_staging,
            finished_dir: staging.finished_dir.clone(),
        };
        let splice_handle = spawn_splice_worker(
            splice_rx,
            assembler,
            settings,
            report_tx,
            Arc::clone(&stats),
            shutdown_tx.subscribe(),
        );

        info!(
            max_concurrent_dispatches = config.max_concurrent_dispatches,
            "Orchestrator started"
        );

        let orchestrator = Self {
            processor: NodeProcessor::new(audio_stage.clone(), visual_stage.clone()),
            audio: audio_stage,
            visual: visual_stage,
            splice_tx,
            cancel: CancelToken::new(),
            running: Arc::new(AtomicBool::new(true)),
            stats,
            dispatch_slots: Arc::new(Semaphore::new(config.max_concurrent_dispatches.max(1))),
            shutdown_tx,
            workers: Mutex::new(vec![audio_handle, visual_handle, splice_handle]),
            config,
        };
        (orchestrator, report_rx)
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Token cancelling every in-flight generator and encoder call.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Generates the whole tree, waits for both stages to drain and queues the
    /// tree for splicing. Returns once the splice job is queued.
    pub async fn process(&self, root: ContentNode) -> Result<(), OrchestratorError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(OrchestratorError::NotRunning);
        }

        self.stats.begin();
        let result = self.dispatch(root).await;
        if result.is_err() {
            self.stats.finish(false);
        }
        result
    }

    async fn dispatch(&self, root: ContentNode) -> Result<(), OrchestratorError> {
        let started_at = Utc::now();
        let path = NodePath::root(&root.id);
        info!(root = %path, nodes = root.subtree_len(), "Dispatch started");

        let barrier = CompletionBarrier::new(2);
        let clips = GeneratedClips::generate(&self.processor, &self.cancel, &root).await;

        self.audio.drain(barrier.clone()).await?;
        self.visual.drain(barrier.clone()).await?;
        tokio::select! {
            _ = barrier.wait() => {}
            _ = self.cancel.cancelled() => return Err(OrchestratorError::Cancelled),
        }

        let job = SpliceJob {
            root,
            clips,
            cancel: self.cancel.clone(),
            started_at,
        };
        self.splice_tx
            .send(job)
            .await
            .map_err(|_| OrchestratorError::Splice("splice worker stopped".to_string()))
    }

    /// Consumes trees from `input` until it closes or the orchestrator is shut
    /// down, running at most `max_concurrent_dispatches` generations at once.
    pub async fn run(self: Arc<Self>, mut input: mpsc::Receiver<ContentNode>) {
        let mut tasks = JoinSet::new();

        loop {
            let root = tokio::select! {
                _ = self.cancel.cancelled() => break,
                root = input.recv() => match root {
                    Some(root) => root,
                    None => break,
                },
            };

            let permit = tokio::select! {
                _ = self.cancel.cancelled() => break,
                permit = Arc::clone(&self.dispatch_slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let this = Arc::clone(&self);
            tasks.spawn(async move {
                let _permit = permit;
                let root_id = root.id.clone();
                if let Err(e) = this.process(root).await {
                    warn!(root = %root_id, error = %e, "Dispatch abandoned");
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Dispatch task panicked");
            }
        }
        info!("Input queue finished");
    }

    /// Cancels in-flight work and stops every worker.
    pub async fn shutdown(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator not running");
            return;
        }

        info!("Stopping orchestrator");
        self.cancel.cancel();
        let _ = self.shutdown_tx.send(());

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            if let Err(e) = worker.await {
                error!(error = %e, "Worker panicked");
            }
        }
        info!("Orchestrator stopped");
    }

    /// Get current orchestrator status.
    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            running: self.running.load(Ordering::Relaxed),
            in_flight: self.stats.in_flight.load(Ordering::Relaxed),
            finalized: self.stats.finalized.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        }
    }
}

fn spawn_splice_worker<E: MediaEncoder + 'static>(
    mut jobs: mpsc::Receiver<SpliceJob>,
    assembler: Assembler<E>,
    settings: SpliceSettings,
    reports: mpsc::Sender<DispatchReport>,
    stats: Arc<DispatchStats>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                job = jobs.recv() => match job {
                    Some(job) => {
                        let report = splice_job(job, &assembler, &settings).await;
                        stats.finish(report.is_success());
                        if reports.send(report).await.is_err() {
                            warn!("Report receiver dropped");
                        }
                    }
                    None => break,
                },
            }
        }

        // Jobs still queued at shutdown are reported instead of spliced.
        jobs.close();
        while let Ok(job) = jobs.try_recv() {
            stats.finish(false);
            if reports.try_send(abandoned_report(job)).is_err() {
                warn!("Dropped report of abandoned dispatch");
            }
        }
        info!("Splice worker stopped");
    })
}

fn abandoned_report(job: SpliceJob) -> DispatchReport {
    let root_path = NodePath::root(&job.root.id);
    warn!(root = %root_path, "Dispatch abandoned before splicing");
    DispatchReport {
        root_id: job.root.id,
        artifact: None,
        failed: vec![(root_path, "cancelled before splicing".to_string())],
        finalized_nodes: 0,
        started_at: job.started_at,
        finished_at: Utc::now(),
    }
}

async fn splice_job<E: MediaEncoder>(
    job: SpliceJob,
    assembler: &Assembler<E>,
    settings: &SpliceSettings,
) -> DispatchReport {
    let root_path = NodePath::root(&job.root.id);
    let splicer = TreeSplicer::new(job.clips, assembler.clone(), settings.area.clone())
        .with_order(settings.order)
        .with_keep_staging(settings.keep_staging);

    let report = splicer.splice_root(&job.cancel, &job.root).await;
    let artifact = match &report.final_artifact {
        Some(staged) => place_artifact(&root_path, staged, settings).await,
        None => None,
    };

    for (path, reason) in report.failed() {
        warn!(root = %root_path, node = %path, reason = %reason, "Node omitted from output");
    }

    let finished_at = Utc::now();
    info!(
        root = %root_path,
        success = artifact.is_some(),
        failed_nodes = report.failed().len(),
        elapsed_ms = (finished_at - job.started_at).num_milliseconds(),
        "Dispatch finished"
    );

    DispatchReport {
        root_id: job.root.id.clone(),
        artifact,
        failed: report.failed(),
        finalized_nodes: report.finalized_count(),
        started_at: job.started_at,
        finished_at,
    }
}

/// Moves the root's final artifact to `{finished_dir}/{root-id}.{ext}`.
async fn place_artifact(
    root_path: &NodePath,
    staged: &std::path::Path,
    settings: &SpliceSettings,
) -> Option<PathBuf> {
    let destination = settings.finished_dir.join(format!(
        "{}.{}",
        root_path.leaf_id(),
        settings.area.extension()
    ));

    let result = settings.area.move_file(staged, &destination).await;
    let root_staging = settings.area.node(root_path);
    if let Err(e) = settings.area.discard_final(&root_staging).await {
        warn!(root = %root_path, error = %e, "Failed to remove staged final artifact");
    }

    match result {
        Ok(()) => {
            info!(root = %root_path, path = %destination.display(), "Artifact placed");
            Some(destination)
        }
        Err(e) => {
            error!(root = %root_path, error = %e, "Failed to place artifact");
            None
        }
    }
}

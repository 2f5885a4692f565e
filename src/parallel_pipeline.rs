// THEORY:
// The `parallel_pipeline` module is the asynchronous front of the analysis engine.
// Requests are independent and stateless, so throughput comes from running many
// of them at once, and latency from running the five classifiers of one request
// side by side.
//
// Key architectural principles:
// 1.  **Dispatcher & Workers**: One dispatcher task receives every job and hands
//     them round-robin to a fixed set of worker tasks. Each job carries a
//     `oneshot` sender for its reply, so callers simply await their own answer.
// 2.  **Blocking Work Off the Reactor**: Decoding and pixel math are CPU bound.
//     They always run inside `spawn_blocking`, never on the async worker itself.
// 3.  **Fan-Out / Join**: With `parallel_classifiers` enabled, each classifier of
//     a request is its own blocking task; the worker joins all of them before it
//     assembles the report. The shared `PixelBuffer` is read-only, so no locks.
// 4.  **Failures Stay Local**: A panicking classifier or a vanished worker fails
//     that one request with `AnalysisError::Worker`; the pool keeps serving.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::classifiers::{self, Classification, Classifier};
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{AnalysisError, Result};
use crate::pipeline::{PipelineConfig, SkinReport};

enum ImageSource {
    Path(PathBuf),
    Buffer(PixelBuffer),
}

struct AnalysisTask {
    source: ImageSource,
    result_sender: oneshot::Sender<Result<SkinReport>>,
}

/// A pool of async workers that analyze images concurrently.
///
/// Must be created from within a tokio runtime.
pub struct AnalysisPool {
    task_sender: mpsc::UnboundedSender<AnalysisTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl AnalysisPool {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_classifiers(config, classifiers::standard_classifiers())
    }

    pub fn with_classifiers(config: PipelineConfig, classifiers: Vec<Arc<dyn Classifier>>) -> Self {
        let worker_count = config.worker_count.max(1);
        let classifiers: Arc<[Arc<dyn Classifier>]> = classifiers.into();
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<AnalysisTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<AnalysisTask>())
            .unzip();

        // Spawn dispatcher
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                // A send error drops the task and with it the reply channel, which
                // the caller observes as a worker failure.
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        // Spawn workers
        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(worker_id, mut worker_receiver)| {
                let classifiers = Arc::clone(&classifiers);
                let parallel = config.parallel_classifiers;
                tokio::spawn(async move {
                    while let Some(task) = worker_receiver.recv().await {
                        let result = Self::process_task(task.source, &classifiers, parallel).await;
                        debug!(worker_id, ok = result.is_ok(), "task finished");
                        let _ = task.result_sender.send(result);
                    }
                })
            })
            .collect();

        info!(workers = worker_count, parallel_classifiers = config.parallel_classifiers, "analysis pool started");

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    async fn process_task(
        source: ImageSource,
        classifiers: &Arc<[Arc<dyn Classifier>]>,
        parallel: bool,
    ) -> Result<SkinReport> {
        // --- 1. Load ---
        let (buffer, path) = match source {
            ImageSource::Buffer(buffer) => (buffer, None),
            ImageSource::Path(path) => {
                let load_path = path.clone();
                let loaded = tokio::task::spawn_blocking(move || PixelBuffer::load(load_path))
                    .await
                    .map_err(|join_error| AnalysisError::Worker(join_error.to_string()))?;
                match loaded {
                    Ok(buffer) => (buffer, Some(path)),
                    Err(error) => {
                        warn!(path = %path.display(), %error, "image rejected");
                        return Err(error);
                    }
                }
            }
        };

        // --- 2. Classify ---
        let classifications = if parallel {
            Self::classify_concurrently(&buffer, classifiers).await?
        } else {
            let classifiers = Arc::clone(classifiers);
            tokio::task::spawn_blocking(move || {
                classifiers
                    .iter()
                    .map(|classifier| classifier.classify(&buffer))
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(|join_error| AnalysisError::Worker(join_error.to_string()))?
        };

        // --- 3. Assemble ---
        let report = SkinReport::from_classifications(&classifications)?;
        match path {
            Some(path) => info!(path = %path.display(), %report, "analysis complete"),
            None => info!(%report, "analysis complete"),
        }
        Ok(report)
    }

    async fn classify_concurrently(
        buffer: &PixelBuffer,
        classifiers: &Arc<[Arc<dyn Classifier>]>,
    ) -> Result<Vec<Classification>> {
        let handles = classifiers.iter().map(|classifier| {
            let classifier = Arc::clone(classifier);
            let buffer = buffer.clone();
            tokio::task::spawn_blocking(move || classifier.classify(&buffer))
        });

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|join_error| AnalysisError::Worker(join_error.to_string())))
            .collect()
    }

    async fn submit(&self, source: ImageSource) -> Result<SkinReport> {
        let (result_sender, result_receiver) = oneshot::channel();

        self.task_sender
            .send(AnalysisTask { source, result_sender })
            .map_err(|_| AnalysisError::Worker("analysis pool is closed".into()))?;

        result_receiver
            .await
            .map_err(|_| AnalysisError::Worker("worker dropped the request".into()))?
    }

    /// Loads and labels the image at `path` on a pool worker.
    pub async fn analyze(&self, path: impl Into<PathBuf>) -> Result<SkinReport> {
        self.submit(ImageSource::Path(path.into())).await
    }

    pub async fn analyze_buffer(&self, buffer: PixelBuffer) -> Result<SkinReport> {
        self.submit(ImageSource::Buffer(buffer)).await
    }

    /// Stops accepting work and waits for queued requests to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{Attribute, Label, Severity};
    use crate::pipeline::AnalysisPipeline;
    use image::{Rgb, RgbImage};

    fn config(worker_count: usize, parallel_classifiers: bool) -> PipelineConfig {
        PipelineConfig {
            worker_count,
            parallel_classifiers,
        }
    }

    fn striped(width: u32) -> PixelBuffer {
        PixelBuffer::from_rgb(RgbImage::from_fn(width, 24, |x, y| {
            if (x / 3 + y / 5) % 2 == 0 { Rgb([230, 40, 40]) } else { Rgb([30, 30, 30]) }
        }))
    }

    struct PanickingClassifier;

    impl Classifier for PanickingClassifier {
        fn attribute(&self) -> Attribute {
            Attribute::OpenPores
        }

        fn classify(&self, _buffer: &PixelBuffer) -> Classification {
            panic!("classifier blew up")
        }
    }

    struct ConstantPores;

    impl Classifier for ConstantPores {
        fn attribute(&self) -> Attribute {
            Attribute::OpenPores
        }

        fn classify(&self, _buffer: &PixelBuffer) -> Classification {
            Classification {
                label: Label::OpenPores(Severity::Severe),
                statistic: 0.0,
            }
        }
    }

    #[tokio::test]
    async fn pool_matches_sequential_pipeline() {
        let sequential = AnalysisPipeline::default();
        for parallel in [true, false] {
            let pool = AnalysisPool::new(config(3, parallel));
            for width in [8, 17, 40] {
                let buffer = striped(width);
                let expected = sequential.analyze_buffer(&buffer).unwrap();
                assert_eq!(pool.analyze_buffer(buffer).await.unwrap(), expected);
            }
            pool.shutdown().await;
        }
    }

    #[tokio::test]
    async fn missing_files_fail_individually() {
        let pool = AnalysisPool::new(config(2, true));
        let paths = ["/definitely/missing/a.jpg", "/definitely/missing/b.png"];
        let results = join_all(paths.map(|path| pool.analyze(path))).await;
        assert_eq!(results.len(), 2);
        for result in results {
            assert!(matches!(result, Err(AnalysisError::NotFound { .. })));
        }
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn classifier_panic_is_a_worker_error_and_pool_survives() {
        let mut classifiers = classifiers::standard_classifiers();
        classifiers.pop();
        classifiers.push(Arc::new(PanickingClassifier));
        let pool = AnalysisPool::with_classifiers(config(1, true), classifiers);

        let error = pool.analyze_buffer(striped(8)).await.unwrap_err();
        assert!(matches!(error, AnalysisError::Worker(_)));
        // Same worker, next request.
        let error = pool.analyze_buffer(striped(8)).await.unwrap_err();
        assert!(matches!(error, AnalysisError::Worker(_)));
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn custom_classifier_replaces_standard_one() {
        let mut classifiers = classifiers::standard_classifiers();
        classifiers.pop();
        classifiers.push(Arc::new(ConstantPores));
        let pool = AnalysisPool::with_classifiers(config(2, false), classifiers);
        let report = pool.analyze_buffer(striped(12)).await.unwrap();
        assert_eq!(report.open_pores, Severity::Severe);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn zero_workers_is_clamped_to_one() {
        let pool = AnalysisPool::new(config(0, true));
        assert!(pool.analyze_buffer(striped(8)).await.is_ok());
        pool.shutdown().await;
    }
}

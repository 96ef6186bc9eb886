//! Concurrent batch execution: decode once, fan out one task per spec,
//! settle them all.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, TransformError};
use crate::pipeline::decode::SourceDecoder;
use crate::pipeline::engine::{ImageEngine, ImageHandle};
use crate::pipeline::transform::render_spec;
use crate::types::{BatchOutcome, ImageSpec, RenderedImage, SpecFailure};

/// Runs a batch of specs against one decoded source image.
///
/// The source is decoded exactly once and shared behind an `Arc`; each
/// spec then gets its own task on the blocking pool, bounded by a
/// semaphore so a large batch cannot saturate the pool. Every task owns
/// a clone of the spec it is rendering, and results travel back paired
/// with that spec, so output stays attributed to the spec that produced
/// it regardless of completion order. A spec that fails, times out, or
/// panics never disturbs its siblings.
pub struct BatchOrchestrator<E: ImageEngine> {
    engine: Arc<E>,
    limits: LimitsConfig,
}

impl<E: ImageEngine> BatchOrchestrator<E> {
    pub fn new(engine: E, limits: LimitsConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            limits,
        }
    }

    /// Decode `source_bytes`, then render every spec against the result.
    ///
    /// Decode problems are fatal to the whole batch; anything after that
    /// is accounted per spec inside the returned [`BatchOutcome`].
    pub async fn run(
        &self,
        source_bytes: Vec<u8>,
        specs: Vec<ImageSpec>,
    ) -> Result<BatchOutcome, PipelineError> {
        let decoder = SourceDecoder::new(Arc::clone(&self.engine), self.limits.clone());
        let source = decoder.decode(source_bytes).await?;
        Ok(self.run_decoded(source, specs).await)
    }

    /// Render every spec against an already-decoded source.
    pub async fn run_decoded(&self, source: Arc<E::Handle>, specs: Vec<ImageSpec>) -> BatchOutcome {
        let source_size = source.size();
        let transform_timeout = Duration::from_millis(self.limits.transform_timeout_ms);
        let semaphore = Arc::new(Semaphore::new(self.limits.max_concurrent_transforms));
        let mut handles = Vec::with_capacity(specs.len());

        for spec in specs {
            let permit = semaphore.clone().acquire_owned().await;
            if permit.is_err() {
                tracing::warn!("Transform semaphore closed unexpectedly; stopping batch");
                break;
            }

            let source = Arc::clone(&source);
            let task_spec = spec.clone();
            let handle = tokio::spawn(async move {
                let result = run_transform(source, task_spec, transform_timeout).await;
                drop(permit);
                result
            });
            // The spec rides alongside its handle so a panicked task can
            // still be reported against the right spec.
            handles.push((spec, handle));
        }

        let mut outcome = BatchOutcome {
            source: source_size,
            succeeded: Vec::new(),
            failed: Vec::new(),
        };

        for (spec, handle) in handles {
            match handle.await {
                Ok(Ok(bytes)) => outcome.succeeded.push(RenderedImage { bytes, spec }),
                Ok(Err(err)) => {
                    tracing::warn!(title = %spec.title, error = %err, "Transform failed");
                    outcome.failed.push(SpecFailure {
                        spec,
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    tracing::error!(title = %spec.title, "Transform task panicked: {err}");
                    let reason = TransformError::Task {
                        message: err.to_string(),
                    };
                    outcome.failed.push(SpecFailure {
                        spec,
                        reason: reason.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            produced = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Batch complete"
        );

        outcome
    }
}

/// Run one spec on the blocking pool under the per-transform deadline.
///
/// The deadline abandons the blocking task rather than interrupting it;
/// the pool thread finishes (or fails) on its own and the result is
/// discarded.
async fn run_transform<H: ImageHandle>(
    source: Arc<H>,
    spec: ImageSpec,
    deadline: Duration,
) -> Result<Vec<u8>, TransformError> {
    let timeout_ms = deadline.as_millis() as u64;
    let rendered = timeout(deadline, async {
        tokio::task::spawn_blocking(move || render_spec(source.as_ref(), &spec)).await
    })
    .await;

    match rendered {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => Err(TransformError::Task {
            message: format!("transform join error: {}", err),
        }),
        Err(_) => Err(TransformError::Timeout { timeout_ms }),
    }
}

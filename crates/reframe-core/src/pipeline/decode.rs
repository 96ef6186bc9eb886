//! Source decoding with dimension limits and timeout.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::pipeline::engine::{ImageEngine, ImageHandle};

/// Decodes upload bytes under the configured limits.
///
/// Decoding runs on the blocking pool with a deadline. The handle comes
/// back in an `Arc` so concurrent transforms can share one decoded source
/// without copying pixels.
pub struct SourceDecoder<E: ImageEngine> {
    engine: Arc<E>,
    limits: LimitsConfig,
}

impl<E: ImageEngine> SourceDecoder<E> {
    /// Create a new decoder with the given engine and limits.
    pub fn new(engine: Arc<E>, limits: LimitsConfig) -> Self {
        Self { engine, limits }
    }

    /// Decode source bytes, enforcing the decode timeout and the
    /// post-decode dimension cap.
    pub async fn decode(&self, bytes: Vec<u8>) -> Result<Arc<E::Handle>, PipelineError> {
        let engine = Arc::clone(&self.engine);
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || engine.decode(&bytes)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(handle))) => {
                let size = handle.size();
                if size.width > self.limits.max_image_dimension
                    || size.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::SourceDimensionsTooLarge {
                        width: size.width,
                        height: size.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(Arc::new(handle))
            }
            Ok(Ok(Err(e))) => Err(PipelineError::Decode {
                message: e.to_string(),
            }),
            Ok(Err(e)) => Err(PipelineError::Task {
                message: format!("decode join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }
}

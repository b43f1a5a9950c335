//! Boundary to the emotion analysis service.
//!
//! Everything that crosses the network lives here: the wire types, the
//! resource descriptors, and [`HttpBackend`], which turns every round trip
//! into a [`FetchResult`].

use std::sync::Arc;

pub mod backend;
pub mod error;
pub mod http;
pub mod ids;
pub mod resource;
pub mod types;

pub use backend::{AnalysisBackend, BoxFuture};
pub use error::{FetchError, FetchErrorKind, FetchResult, UNREACHABLE_MESSAGE};
pub use http::{BackendConfig, DEFAULT_REQUEST_TIMEOUT, HttpBackend, decode_response, ensure_success};
pub use ids::{ImageId, InvalidIdError, VideoId};
pub use resource::{
    DEFAULT_BASE_URL, DeleteTarget, Endpoints, FileRef, Resource, Upload, content_type_for,
};
pub use types::{
    AggregatedEmotionStats, AggregatedEmotions, CheckedResponse, DominantEmotion, EmotionScore,
    FrameRecord, ImageAnalysis, ImageDetail, ImageHistory, ImageHistoryEntry, MediaKind,
    VideoAnalysis, VideoAnalysisRecord, VideoHistory, VideoHistoryEntry, VideoInfo,
    parse_upload_date,
};

pub fn create_backend(config: BackendConfig) -> FetchResult<Arc<dyn AnalysisBackend>> {
    tracing::info!(base_url = %config.base_url, "creating analysis backend");
    Ok(Arc::new(HttpBackend::new(config)?))
}

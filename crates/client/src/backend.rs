use std::future::Future;
use std::pin::Pin;

use crate::error::FetchResult;
use crate::ids::{ImageId, VideoId};
use crate::resource::{DeleteTarget, Endpoints, FileRef, Upload};
use crate::types::{
    FrameRecord, ImageAnalysis, ImageDetail, ImageHistoryEntry, VideoAnalysis,
    VideoAnalysisRecord, VideoHistoryEntry,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One network round trip per call, normalized into a typed outcome.
///
/// Implementations never retry and never panic past this boundary: every
/// transport failure, non-success status or undecodable body comes back as a
/// [`crate::FetchError`].
pub trait AnalysisBackend: Send + Sync {
    fn endpoints(&self) -> &Endpoints;

    fn analyze_image<'a>(&'a self, upload: &'a Upload) -> BoxFuture<'a, FetchResult<ImageAnalysis>>;

    fn analyze_video<'a>(
        &'a self,
        upload: &'a Upload,
        frame_interval: u32,
    ) -> BoxFuture<'a, FetchResult<VideoAnalysis>>;

    fn list_images(&self) -> BoxFuture<'_, FetchResult<Vec<ImageHistoryEntry>>>;

    fn list_videos(&self) -> BoxFuture<'_, FetchResult<Vec<VideoHistoryEntry>>>;

    fn image_detail(&self, id: ImageId) -> BoxFuture<'_, FetchResult<ImageDetail>>;

    fn video_detail(&self, id: VideoId) -> BoxFuture<'_, FetchResult<VideoAnalysisRecord>>;

    fn frame_analysis(
        &self,
        video: VideoId,
        frame_number: u64,
    ) -> BoxFuture<'_, FetchResult<FrameRecord>>;

    fn delete(&self, target: DeleteTarget) -> BoxFuture<'_, FetchResult<()>>;

    fn fetch_file(&self, file: FileRef) -> BoxFuture<'_, FetchResult<Vec<u8>>>;
}

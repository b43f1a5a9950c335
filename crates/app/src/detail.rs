//! Detail pages for one stored analysis.

use emoscope_client::{
    DeleteTarget, Endpoints, FetchResult, ImageDetail, ImageId, VideoAnalysisRecord, VideoId,
};

use crate::analyze::AggregatedEmotionRow;
use crate::deletion::DeletionFlow;
use crate::format::ConfidenceBar;
use crate::frames::{CursorError, FrameCursor, FrameViews};
use crate::request::{LoadState, RequestToken, RequestTokens};

pub const IMAGE_DETAIL_FALLBACK_MESSAGE: &str = "Failed to fetch image details";
pub const VIDEO_DETAIL_FALLBACK_MESSAGE: &str = "Failed to fetch video details";

/// Token bookkeeping shared by both detail views.
#[derive(Debug, Default)]
struct DetailLoader {
    in_flight: Option<RequestToken>,
    tokens: RequestTokens,
}

impl DetailLoader {
    fn begin(&mut self) -> RequestToken {
        let token = self.tokens.issue();
        self.in_flight = Some(token);
        token
    }

    fn accept(&mut self, token: RequestToken) -> bool {
        if self.in_flight != Some(token) {
            tracing::debug!(?token, "ignoring stale detail outcome");
            return false;
        }
        self.in_flight = None;
        true
    }
}

fn into_load_state<T>(outcome: FetchResult<T>, fallback: &str) -> LoadState<T> {
    match outcome {
        Ok(value) => LoadState::Ready(value),
        Err(error) => {
            tracing::warn!(%error, "detail request failed");
            LoadState::Failed(error.user_message(fallback))
        }
    }
}

pub struct ImageDetailView {
    id: ImageId,
    endpoints: Endpoints,
    state: LoadState<ImageDetail>,
    loader: DetailLoader,
    deletion: DeletionFlow,
}

impl ImageDetailView {
    pub fn new(id: ImageId, endpoints: Endpoints) -> Self {
        Self {
            id,
            endpoints,
            state: LoadState::Loading,
            loader: DetailLoader::default(),
            deletion: DeletionFlow::new(DeleteTarget::Image(id)),
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn state(&self) -> &LoadState<ImageDetail> {
        &self.state
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.state = LoadState::Loading;
        self.loader.begin()
    }

    pub fn resolve(&mut self, token: RequestToken, outcome: FetchResult<ImageDetail>) -> bool {
        if !self.loader.accept(token) {
            return false;
        }
        self.state = into_load_state(outcome, IMAGE_DETAIL_FALLBACK_MESSAGE);
        true
    }

    pub fn image_url(&self) -> String {
        self.endpoints.image_file_url(self.id)
    }

    /// Dominant emotion and confidence, preferring the record columns over the embedded analysis.
    pub fn dominant(&self) -> Option<(&str, Option<f64>)> {
        let detail = self.state.ready()?;
        let analysis = &detail.analysis_data;
        let emotion = detail
            .dominant_emotion
            .as_deref()
            .or(analysis.dominant_emotion.as_deref())?;
        Some((
            emotion,
            detail.dominant_confidence.or(analysis.dominant_confidence),
        ))
    }

    pub fn bars(&self) -> Vec<ConfidenceBar> {
        self.state
            .ready()
            .map(|detail| ConfidenceBar::from_scores(&detail.analysis_data.top_k_emotions))
            .unwrap_or_default()
    }

    pub fn deletion(&self) -> &DeletionFlow {
        &self.deletion
    }

    pub fn deletion_mut(&mut self) -> &mut DeletionFlow {
        &mut self.deletion
    }
}

/// Recording metadata shown above the frame viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSummary {
    pub filename: String,
    pub upload_date: String,
    pub duration_seconds: f64,
    pub fps: f64,
    pub frame_interval: u32,
    pub total_frames: u64,
    pub analyzed_frames: usize,
}

/// A stored video analysis with its frame cursor and the views derived from it.
///
/// The record is owned here and dropped with the view; nothing is cached across views.
pub struct VideoDetailView {
    id: VideoId,
    endpoints: Endpoints,
    state: LoadState<VideoAnalysisRecord>,
    loader: DetailLoader,
    cursor: FrameCursor,
    views: FrameViews,
    deletion: DeletionFlow,
}

impl VideoDetailView {
    pub fn new(id: VideoId, endpoints: Endpoints) -> Self {
        Self {
            id,
            endpoints,
            state: LoadState::Loading,
            loader: DetailLoader::default(),
            cursor: FrameCursor::default(),
            views: FrameViews::Empty,
            deletion: DeletionFlow::new(DeleteTarget::Video(id)),
        }
    }

    pub fn id(&self) -> VideoId {
        self.id
    }

    pub fn state(&self) -> &LoadState<VideoAnalysisRecord> {
        &self.state
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.state = LoadState::Loading;
        self.cursor.init(0);
        self.views = FrameViews::Empty;
        self.loader.begin()
    }

    pub fn resolve(
        &mut self,
        token: RequestToken,
        outcome: FetchResult<VideoAnalysisRecord>,
    ) -> bool {
        if !self.loader.accept(token) {
            return false;
        }
        self.state = into_load_state(outcome, VIDEO_DETAIL_FALLBACK_MESSAGE);
        let frame_count = self.state.ready().map_or(0, |record| record.frames.len());
        self.cursor.init(frame_count);
        self.recompute();
        true
    }

    pub fn cursor(&self) -> &FrameCursor {
        &self.cursor
    }

    pub fn views(&self) -> &FrameViews {
        &self.views
    }

    pub fn next_frame(&mut self) -> bool {
        let moved = self.cursor.next();
        if moved {
            self.recompute();
        }
        moved
    }

    pub fn prev_frame(&mut self) -> bool {
        let moved = self.cursor.prev();
        if moved {
            self.recompute();
        }
        moved
    }

    pub fn jump_to_frame(&mut self, index: usize) -> Result<(), CursorError> {
        self.cursor.jump_to(index)?;
        self.recompute();
        Ok(())
    }

    /// Moves to `index`, clamped to the last frame. Returns the selected index, or
    /// `None` when there are no frames to select.
    pub fn select_frame(&mut self, index: usize) -> Option<usize> {
        let last = self.cursor.frame_count().checked_sub(1)?;
        let target = index.min(last);
        self.jump_to_frame(target).ok()?;
        Some(target)
    }

    pub fn summary(&self) -> Option<VideoSummary> {
        self.state.ready().map(|record| VideoSummary {
            filename: record.filename.clone(),
            upload_date: record.upload_date.clone(),
            duration_seconds: record.duration_seconds,
            fps: record.fps,
            frame_interval: record.frame_interval,
            total_frames: record.total_frames,
            analyzed_frames: record.analyzed_frames,
        })
    }

    /// Overall dominant emotion and its time-weighted average.
    pub fn dominant(&self) -> Option<(&str, f64)> {
        let record = self.state.ready()?;
        match record.aggregated_data.dominant() {
            Some(dominant) => Some((dominant.emotion, dominant.average_confidence)),
            None => Some((
                record.dominant_emotion.as_deref()?,
                record.dominant_confidence?,
            )),
        }
    }

    pub fn aggregated(&self) -> Vec<AggregatedEmotionRow> {
        self.state
            .ready()
            .map(|record| AggregatedEmotionRow::ranked(&record.aggregated_data))
            .unwrap_or_default()
    }

    pub fn deletion(&self) -> &DeletionFlow {
        &self.deletion
    }

    pub fn deletion_mut(&mut self) -> &mut DeletionFlow {
        &mut self.deletion
    }

    fn recompute(&mut self) {
        self.views = match self.state.ready() {
            Some(record) => FrameViews::compute(&self.endpoints, self.id, &record.frames, &self.cursor),
            None => FrameViews::Empty,
        };
    }
}

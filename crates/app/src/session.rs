//! Connects the state machines to an [`AnalysisBackend`].
//!
//! Every method here takes a ticket or token from a state machine, performs
//! the round trip and hands the outcome back. The state machines decide
//! whether the outcome still applies.

use std::sync::Arc;

use emoscope_client::{
    AnalysisBackend, Endpoints, FetchResult, FileRef, FrameRecord, ImageHistoryEntry, MediaKind,
    VideoHistoryEntry, VideoId,
};

use crate::analyze::{AnalysisResult, AnalysisSubmission, AnalysisTicket, DEFAULT_FRAME_INTERVAL};
use crate::deletion::{DeleteTicket, DeletionFlow};
use crate::detail::{ImageDetailView, VideoDetailView};
use crate::history::HistoryBrowser;

#[derive(Clone)]
pub struct Session {
    backend: Arc<dyn AnalysisBackend>,
}

impl Session {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    pub fn endpoints(&self) -> &Endpoints {
        self.backend.endpoints()
    }

    /// Runs the request described by a submission ticket.
    pub async fn analyze(&self, ticket: &AnalysisTicket) -> FetchResult<AnalysisResult> {
        match ticket.media_kind {
            MediaKind::Video => self
                .backend
                .analyze_video(
                    &ticket.upload,
                    ticket.frame_interval.unwrap_or(DEFAULT_FRAME_INTERVAL),
                )
                .await
                .map(AnalysisResult::Video),
            MediaKind::Image => self
                .backend
                .analyze_image(&ticket.upload)
                .await
                .map(AnalysisResult::Image),
        }
    }

    /// Submits the picked file and applies the outcome. Returns `false` when nothing was sent.
    pub async fn submit(&self, submission: &mut AnalysisSubmission) -> bool {
        let Some(ticket) = submission.submit() else {
            return false;
        };
        let outcome = self.analyze(&ticket).await;
        submission.resolve(ticket.token, outcome);
        true
    }

    /// Fetches both history collections concurrently and waits for both.
    pub async fn fetch_history(
        &self,
    ) -> (
        FetchResult<Vec<ImageHistoryEntry>>,
        FetchResult<Vec<VideoHistoryEntry>>,
    ) {
        futures::join!(self.backend.list_images(), self.backend.list_videos())
    }

    pub async fn load_history(&self, browser: &mut HistoryBrowser) {
        let token = browser.load();
        let (images, videos) = self.fetch_history().await;
        browser.resolve(token, images, videos);
    }

    pub async fn load_image(&self, view: &mut ImageDetailView) {
        let token = view.begin_load();
        let outcome = self.backend.image_detail(view.id()).await;
        view.resolve(token, outcome);
    }

    pub async fn load_video(&self, view: &mut VideoDetailView) {
        let token = view.begin_load();
        let outcome = self.backend.video_detail(view.id()).await;
        view.resolve(token, outcome);
    }

    pub async fn delete(&self, ticket: DeleteTicket) -> FetchResult<()> {
        self.backend.delete(ticket.target).await
    }

    /// Confirms a pending delete and applies the outcome. Returns `false` when no request was sent.
    pub async fn confirm_delete(&self, flow: &mut DeletionFlow) -> bool {
        let Some(ticket) = flow.confirm() else {
            return false;
        };
        let outcome = self.delete(ticket).await;
        flow.resolve(ticket.token, outcome);
        true
    }

    pub async fn frame_analysis(&self, video: VideoId, frame_number: u64) -> FetchResult<FrameRecord> {
        self.backend.frame_analysis(video, frame_number).await
    }

    pub async fn fetch_file(&self, file: FileRef) -> FetchResult<Vec<u8>> {
        self.backend.fetch_file(file).await
    }
}

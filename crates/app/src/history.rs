use emoscope_client::{
    FetchErrorKind, FetchResult, ImageHistoryEntry, MediaKind, UNREACHABLE_MESSAGE,
    VideoHistoryEntry,
};

use crate::request::{LoadState, RequestToken, RequestTokens};

pub const HISTORY_FALLBACK_MESSAGE: &str = "Failed to fetch history";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryCollections {
    pub images: Vec<ImageHistoryEntry>,
    pub videos: Vec<VideoHistoryEntry>,
}

/// What the active tab shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryView<'a> {
    Loading,
    Failed(&'a str),
    Empty(&'static str),
    Images(&'a [ImageHistoryEntry]),
    Videos(&'a [VideoHistoryEntry]),
}

/// Past analyses of both media kinds, loaded and refreshed together.
///
/// A load succeeds only if both collections arrive. Any failure replaces both
/// collections with a single error so partial data is never shown.
#[derive(Debug, Default)]
pub struct HistoryBrowser {
    tab: MediaKind,
    collections: LoadState<HistoryCollections>,
    in_flight: Option<RequestToken>,
    tokens: RequestTokens,
}

impl HistoryBrowser {
    pub fn new(tab: MediaKind) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }

    pub fn tab(&self) -> MediaKind {
        self.tab
    }

    /// Switches the displayed collection without refetching.
    pub fn select_tab(&mut self, tab: MediaKind) {
        self.tab = tab;
    }

    pub fn collections(&self) -> &LoadState<HistoryCollections> {
        &self.collections
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a load. Data already on screen stays visible until the outcome arrives.
    pub fn load(&mut self) -> RequestToken {
        let token = self.tokens.issue();
        if let Some(previous) = self.in_flight.replace(token) {
            tracing::debug!(?previous, ?token, "superseding history load");
        }
        if self.collections.error().is_some() {
            self.collections = LoadState::Loading;
        }
        tracing::debug!(?token, "loading history");
        token
    }

    pub fn refresh(&mut self) -> RequestToken {
        self.load()
    }

    /// Applies both outcomes of a load. Returns whether they were applied.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        images: FetchResult<Vec<ImageHistoryEntry>>,
        videos: FetchResult<Vec<VideoHistoryEntry>>,
    ) -> bool {
        if self.in_flight != Some(token) {
            tracing::debug!(?token, "ignoring stale history outcome");
            return false;
        }
        self.in_flight = None;

        self.collections = match (images, videos) {
            (Ok(images), Ok(videos)) => LoadState::Ready(HistoryCollections { images, videos }),
            (images, videos) => {
                let errors = [images.err(), videos.err()];
                let unreachable = errors
                    .iter()
                    .flatten()
                    .inspect(|error| tracing::warn!(%error, "history request failed"))
                    .fold(false, |unreachable, error| {
                        unreachable || error.kind() == FetchErrorKind::Unreachable
                    });
                let message = if unreachable {
                    UNREACHABLE_MESSAGE
                } else {
                    HISTORY_FALLBACK_MESSAGE
                };
                LoadState::Failed(message.to_string())
            }
        };
        true
    }

    pub fn image_count(&self) -> Option<usize> {
        self.collections.ready().map(|collections| collections.images.len())
    }

    pub fn video_count(&self) -> Option<usize> {
        self.collections.ready().map(|collections| collections.videos.len())
    }

    /// Tab label with the loaded count, e.g. `Images (3)`.
    pub fn tab_label(&self, tab: MediaKind) -> String {
        let (title, count) = match tab {
            MediaKind::Image => ("Images", self.image_count()),
            MediaKind::Video => ("Videos", self.video_count()),
        };
        format!("{title} ({})", count.unwrap_or(0))
    }

    pub fn view(&self) -> HistoryView<'_> {
        match &self.collections {
            LoadState::Loading => HistoryView::Loading,
            LoadState::Failed(message) => HistoryView::Failed(message),
            LoadState::Ready(collections) => match self.tab {
                MediaKind::Image if collections.images.is_empty() => {
                    HistoryView::Empty(empty_message(MediaKind::Image))
                }
                MediaKind::Video if collections.videos.is_empty() => {
                    HistoryView::Empty(empty_message(MediaKind::Video))
                }
                MediaKind::Image => HistoryView::Images(&collections.images),
                MediaKind::Video => HistoryView::Videos(&collections.videos),
            },
        }
    }
}

pub fn empty_message(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "No images analyzed yet",
        MediaKind::Video => "No videos analyzed yet",
    }
}

#[cfg(test)]
mod tests {
    use emoscope_client::{FetchError, ImageId, VideoId};

    use super::*;

    fn image(id: i64) -> ImageHistoryEntry {
        ImageHistoryEntry {
            id: ImageId::new(id),
            filename: format!("face-{id}.png"),
            upload_date: "2025-03-01T10:20:30".to_string(),
            dominant_emotion: Some("happy".to_string()),
            dominant_confidence: Some(88.0),
        }
    }

    fn video(id: i64) -> VideoHistoryEntry {
        VideoHistoryEntry {
            id: VideoId::new(id),
            filename: format!("clip-{id}.mp4"),
            upload_date: "2025-03-01T10:20:30".to_string(),
            duration_seconds: 4.0,
            total_frames: 120,
            analyzed_frames: 4,
            fps: 30.0,
            dominant_emotion: Some("neutral".to_string()),
            dominant_confidence: Some(51.0),
        }
    }

    fn server_error() -> FetchError {
        FetchError::ServerError {
            stage: "list-videos",
            status: 500,
            detail: Some("database locked".to_string()),
        }
    }

    #[test]
    fn partial_failure_is_combined_failure() {
        let mut browser = HistoryBrowser::default();
        let token = browser.load();
        browser.resolve(token, Ok(vec![image(1)]), Err(server_error()));

        assert_eq!(browser.view(), HistoryView::Failed(HISTORY_FALLBACK_MESSAGE));
        assert_eq!(browser.image_count(), None);
        browser.select_tab(MediaKind::Image);
        assert_eq!(browser.view(), HistoryView::Failed(HISTORY_FALLBACK_MESSAGE));
    }

    #[test]
    fn unreachable_gets_connection_guidance() {
        let mut browser = HistoryBrowser::default();
        let token = browser.load();
        let unreachable = FetchError::Unreachable {
            stage: "list-images",
            url: "http://localhost:8000/images".to_string(),
            message: "connection refused".to_string(),
        };
        browser.resolve(token, Err(unreachable), Err(server_error()));
        assert_eq!(browser.view(), HistoryView::Failed(UNREACHABLE_MESSAGE));
    }

    #[test]
    fn tab_switch_reuses_loaded_collections() {
        let mut browser = HistoryBrowser::new(MediaKind::Image);
        let token = browser.load();
        browser.resolve(token, Ok(vec![image(2), image(1)]), Ok(Vec::new()));

        match browser.view() {
            HistoryView::Images(images) => {
                assert_eq!(images[0].id, ImageId::new(2));
                assert_eq!(images[1].id, ImageId::new(1));
            }
            other => panic!("unexpected view {other:?}"),
        }

        browser.select_tab(MediaKind::Video);
        assert!(!browser.is_loading());
        assert_eq!(browser.view(), HistoryView::Empty("No videos analyzed yet"));
        assert_eq!(browser.tab_label(MediaKind::Image), "Images (2)");
        assert_eq!(browser.tab_label(MediaKind::Video), "Videos (0)");
    }

    #[test]
    fn refresh_keeps_old_data_until_outcome() {
        let mut browser = HistoryBrowser::new(MediaKind::Video);
        let token = browser.load();
        browser.resolve(token, Ok(Vec::new()), Ok(vec![video(1)]));

        let refresh = browser.refresh();
        assert!(browser.is_loading());
        assert!(matches!(browser.view(), HistoryView::Videos(videos) if videos.len() == 1));

        browser.resolve(refresh, Ok(Vec::new()), Ok(vec![video(2), video(1)]));
        assert!(!browser.is_loading());
        assert_eq!(browser.video_count(), Some(2));
    }

    #[test]
    fn refresh_after_failure_shows_loading() {
        let mut browser = HistoryBrowser::default();
        let token = browser.load();
        browser.resolve(token, Err(server_error()), Ok(Vec::new()));
        browser.refresh();
        assert_eq!(browser.view(), HistoryView::Loading);
    }

    #[test]
    fn superseded_load_outcome_is_ignored() {
        let mut browser = HistoryBrowser::default();
        let first = browser.load();
        let second = browser.refresh();

        assert!(!browser.resolve(first, Ok(vec![image(1)]), Ok(Vec::new())));
        assert!(browser.is_loading());
        assert!(browser.resolve(second, Ok(Vec::new()), Ok(Vec::new())));
        assert_eq!(browser.view(), HistoryView::Empty("No images analyzed yet"));
    }
}

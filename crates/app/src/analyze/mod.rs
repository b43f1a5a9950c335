//! Upload-and-analyze workflow.

pub mod view;

use emoscope_client::{FetchResult, ImageAnalysis, MediaKind, Upload, VideoAnalysis};
use snafu::Snafu;

use crate::request::{RequestToken, RequestTokens};

pub use view::{AggregatedEmotionRow, FrameRow, ImageResultView, VideoResultView};

pub const DEFAULT_FRAME_INTERVAL: u32 = 30;
pub const MIN_FRAME_INTERVAL: u32 = 1;
pub const MAX_FRAME_INTERVAL: u32 = 120;

/// Shown when a submission fails without a usable server message.
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Server error.";

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SubmissionError {
    #[snafu(display("frame interval `{input}` is not a number on `{stage}`"))]
    InvalidFrameInterval { stage: &'static str, input: String },
    #[snafu(display("frame interval does not apply to {media_kind} analysis on `{stage}`"))]
    FrameIntervalUnavailable {
        stage: &'static str,
        media_kind: MediaKind,
    },
}

/// Clamps a parsed frame interval into the accepted range.
///
/// Fractional input is truncated. Anything that is not a finite number is rejected.
pub fn parse_frame_interval(input: &str) -> Result<u32, SubmissionError> {
    let value = input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            InvalidFrameIntervalSnafu {
                stage: "parse-frame-interval",
                input,
            }
            .build()
        })?;

    let clamped = value
        .trunc()
        .clamp(f64::from(MIN_FRAME_INTERVAL), f64::from(MAX_FRAME_INTERVAL));
    Ok(clamped as u32)
}

/// Reference shown for the picked file before it is analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    pub file_name: String,
    pub media_kind: Option<MediaKind>,
    pub size_bytes: usize,
}

impl FilePreview {
    fn of(upload: &Upload) -> Self {
        Self {
            file_name: upload.file_name().to_string(),
            media_kind: upload.media_kind(),
            size_bytes: upload.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Image(ImageAnalysis),
    Video(VideoAnalysis),
}

impl AnalysisResult {
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Video(_) => MediaKind::Video,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting(RequestToken),
    Succeeded(AnalysisResult),
    Failed(String),
}

/// Everything needed to run one analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTicket {
    pub token: RequestToken,
    pub media_kind: MediaKind,
    pub upload: Upload,
    /// Present only for video analysis.
    pub frame_interval: Option<u32>,
}

#[derive(Debug, Default)]
pub struct AnalysisSubmission {
    media_kind: MediaKind,
    file: Option<Upload>,
    preview: Option<FilePreview>,
    frame_interval: FrameInterval,
    state: SubmissionState,
    show_frame_details: bool,
    tokens: RequestTokens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameInterval(u32);

impl Default for FrameInterval {
    fn default() -> Self {
        Self(DEFAULT_FRAME_INTERVAL)
    }
}

impl AnalysisSubmission {
    pub fn new(media_kind: MediaKind) -> Self {
        Self {
            media_kind,
            ..Self::default()
        }
    }

    /// Starts with a configured default interval, clamped into range.
    pub fn with_frame_interval(mut self, frame_interval: u32) -> Self {
        self.frame_interval =
            FrameInterval(frame_interval.clamp(MIN_FRAME_INTERVAL, MAX_FRAME_INTERVAL));
        self
    }

    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    pub fn file(&self) -> Option<&Upload> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&FilePreview> {
        self.preview.as_ref()
    }

    pub fn frame_interval(&self) -> u32 {
        self.frame_interval.0
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SubmissionState::Succeeded(result) => Some(result),
            SubmissionState::Idle | SubmissionState::Submitting(_) | SubmissionState::Failed(_) => {
                None
            }
        }
    }

    /// Current error text, empty when there is none.
    pub fn error(&self) -> &str {
        match &self.state {
            SubmissionState::Failed(message) => message,
            SubmissionState::Idle
            | SubmissionState::Submitting(_)
            | SubmissionState::Succeeded(_) => "",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting(_))
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.is_submitting()
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_submitting() {
            return "Analyzing...";
        }
        match self.media_kind {
            MediaKind::Image => "Analyze Image",
            MediaKind::Video => "Analyze Video",
        }
    }

    /// In-flight indicator text, present only while submitting.
    pub fn progress_text(&self) -> Option<String> {
        self.is_submitting().then(|| {
            format!(
                "Processing {}... This may take a few moments.",
                self.media_kind
            )
        })
    }

    pub fn show_frame_details(&self) -> bool {
        self.show_frame_details
    }

    pub fn toggle_frame_details(&mut self) -> bool {
        self.show_frame_details = !self.show_frame_details;
        self.show_frame_details
    }

    /// Switches media kind and discards the file, preview, result and error.
    ///
    /// A request already sent is not aborted; its outcome is ignored on arrival.
    pub fn select_tab(&mut self, media_kind: MediaKind) {
        if let SubmissionState::Submitting(token) = self.state {
            tracing::debug!(?token, "abandoning in-flight analysis on tab switch");
        }
        self.media_kind = media_kind;
        self.clear();
    }

    /// Replaces the picked file. `None` clears everything.
    pub fn select_file(&mut self, file: Option<Upload>) {
        self.clear();
        if let Some(upload) = file {
            self.preview = Some(FilePreview::of(&upload));
            self.file = Some(upload);
        }
    }

    /// Parses and stores a frame interval, clamped to `[1, 120]`.
    ///
    /// Non-numeric input is rejected and the last valid value stays in place.
    pub fn set_frame_interval(&mut self, input: &str) -> Result<u32, SubmissionError> {
        snafu::ensure!(
            self.media_kind == MediaKind::Video,
            FrameIntervalUnavailableSnafu {
                stage: "set-frame-interval",
                media_kind: self.media_kind,
            }
        );

        let frame_interval = parse_frame_interval(input)?;
        self.frame_interval = FrameInterval(frame_interval);
        Ok(frame_interval)
    }

    /// Issues a request for the picked file.
    ///
    /// Returns `None` without changing state when no file is picked or a
    /// request is already outstanding.
    pub fn submit(&mut self) -> Option<AnalysisTicket> {
        if self.is_submitting() {
            return None;
        }
        let upload = self.file.clone()?;

        let token = self.tokens.issue();
        self.state = SubmissionState::Submitting(token);
        self.show_frame_details = false;
        tracing::debug!(?token, media_kind = %self.media_kind, file = upload.file_name(), "submitting analysis");

        Some(AnalysisTicket {
            token,
            media_kind: self.media_kind,
            frame_interval: (self.media_kind == MediaKind::Video).then_some(self.frame_interval.0),
            upload,
        })
    }

    /// Applies an outcome if it belongs to the outstanding request. Returns whether it was applied.
    pub fn resolve(&mut self, token: RequestToken, outcome: FetchResult<AnalysisResult>) -> bool {
        if self.state != SubmissionState::Submitting(token) {
            tracing::debug!(?token, "ignoring stale analysis outcome");
            return false;
        }

        self.state = match outcome {
            Ok(result) => SubmissionState::Succeeded(result),
            Err(error) => {
                tracing::warn!(%error, "analysis request failed");
                SubmissionState::Failed(error.user_message(SUBMIT_FALLBACK_MESSAGE))
            }
        };
        true
    }

    fn clear(&mut self) {
        self.file = None;
        self.preview = None;
        self.state = SubmissionState::Idle;
        self.show_frame_details = false;
    }
}

use emoscope_client::{Endpoints, FrameRecord, VideoId};

use crate::format::ConfidenceBar;
use crate::frames::FrameCursor;

/// The thumbnail strip always shows the first frames of the sequence, independent of the cursor.
pub const THUMBNAIL_LIMIT: usize = 10;

/// Full-resolution view of the selected frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameViewer {
    pub index: usize,
    pub frame_number: u64,
    pub timestamp: f64,
    pub image_url: String,
    pub label: String,
    pub can_prev: bool,
    pub can_next: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub index: usize,
    pub frame_number: u64,
    pub image_url: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThumbnailStrip {
    pub thumbnails: Vec<Thumbnail>,
    /// Frames beyond the strip, reachable only by index.
    pub remaining: usize,
}

/// Emotion readings of the selected frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionPanel {
    pub dominant_emotion: Option<String>,
    pub dominant_confidence: Option<f64>,
    pub bars: Vec<ConfidenceBar>,
}

impl EmotionPanel {
    pub fn from_frame(frame: &FrameRecord) -> Self {
        Self {
            dominant_emotion: frame.dominant_emotion.clone(),
            dominant_confidence: frame.dominant_confidence,
            bars: ConfidenceBar::from_scores(&frame.emotions_data),
        }
    }
}

/// The three views driven by a [`FrameCursor`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FrameViews {
    /// No frames were analyzed; navigation is disabled.
    #[default]
    Empty,
    Active {
        viewer: FrameViewer,
        strip: ThumbnailStrip,
        panel: EmotionPanel,
    },
}

impl FrameViews {
    pub fn compute(
        endpoints: &Endpoints,
        video: VideoId,
        frames: &[FrameRecord],
        cursor: &FrameCursor,
    ) -> Self {
        let Some(index) = cursor.index() else {
            return Self::Empty;
        };
        let Some(frame) = frames.get(index) else {
            return Self::Empty;
        };

        let viewer = FrameViewer {
            index,
            frame_number: frame.frame_number,
            timestamp: frame.timestamp,
            image_url: endpoints.frame_file_url(video, frame.frame_number),
            label: format!("Frame {} of {}", index + 1, frames.len()),
            can_prev: cursor.can_prev(),
            can_next: cursor.can_next(),
        };

        let thumbnails = frames
            .iter()
            .take(THUMBNAIL_LIMIT)
            .enumerate()
            .map(|(position, frame)| Thumbnail {
                index: position,
                frame_number: frame.frame_number,
                image_url: endpoints.frame_file_url(video, frame.frame_number),
                selected: position == index,
            })
            .collect::<Vec<_>>();
        let strip = ThumbnailStrip {
            remaining: frames.len().saturating_sub(thumbnails.len()),
            thumbnails,
        };

        Self::Active {
            viewer,
            strip,
            panel: EmotionPanel::from_frame(frame),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn viewer(&self) -> Option<&FrameViewer> {
        match self {
            Self::Active { viewer, .. } => Some(viewer),
            Self::Empty => None,
        }
    }

    pub fn strip(&self) -> Option<&ThumbnailStrip> {
        match self {
            Self::Active { strip, .. } => Some(strip),
            Self::Empty => None,
        }
    }

    pub fn panel(&self) -> Option<&EmotionPanel> {
        match self {
            Self::Active { panel, .. } => Some(panel),
            Self::Empty => None,
        }
    }
}

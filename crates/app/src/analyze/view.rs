use emoscope_client::{AggregatedEmotions, FrameRecord, ImageAnalysis, VideoAnalysis, VideoInfo};

use crate::format::ConfidenceBar;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResultView {
    pub dominant_emotion: Option<String>,
    pub dominant_confidence: Option<f64>,
    pub bars: Vec<ConfidenceBar>,
}

impl ImageResultView {
    pub fn new(analysis: &ImageAnalysis) -> Self {
        // Older records omit the dominant fields; the first top-k entry is the dominant one.
        let leader = analysis.top_k_emotions.first();
        Self {
            dominant_emotion: analysis
                .dominant_emotion
                .clone()
                .or_else(|| leader.map(|score| score.emotion.clone())),
            dominant_confidence: analysis
                .dominant_confidence
                .or_else(|| leader.map(|score| score.confidence)),
            bars: ConfidenceBar::from_scores(&analysis.top_k_emotions),
        }
    }
}

/// One aggregated emotion, all values in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedEmotionRow {
    pub emotion: String,
    pub average: f64,
    pub simple_average: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub presence_percentage: f64,
}

impl AggregatedEmotionRow {
    /// Rows ordered by time-weighted average, highest first.
    pub fn ranked(aggregated: &AggregatedEmotions) -> Vec<Self> {
        aggregated
            .ranked()
            .into_iter()
            .map(|(emotion, stats)| Self {
                emotion: emotion.to_string(),
                average: stats.average,
                simple_average: stats.simple_average,
                min: stats.min,
                max: stats.max,
                std: stats.std,
                presence_percentage: stats.presence_percentage,
            })
            .collect()
    }

    pub fn bar(&self) -> ConfidenceBar {
        ConfidenceBar::new(self.emotion.clone(), self.average)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub frame_number: u64,
    pub timestamp: f64,
    pub dominant_emotion: Option<String>,
    pub dominant_confidence: Option<f64>,
}

impl FrameRow {
    pub fn new(frame: &FrameRecord) -> Self {
        Self {
            frame_number: frame.frame_number,
            timestamp: frame.timestamp,
            dominant_emotion: frame.dominant_emotion.clone(),
            dominant_confidence: frame.dominant_confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoResultView {
    pub info: VideoInfo,
    pub dominant_emotion: Option<String>,
    pub dominant_average_confidence: Option<f64>,
    pub emotions: Vec<AggregatedEmotionRow>,
    /// Frame-by-frame rows, `None` while the list is collapsed.
    pub frames: Option<Vec<FrameRow>>,
}

impl VideoResultView {
    pub fn new(analysis: &VideoAnalysis, show_frames: bool) -> Self {
        let dominant = analysis.aggregated_emotions.dominant();
        Self {
            info: analysis.video_info.clone(),
            dominant_emotion: dominant.map(|dominant| dominant.emotion.to_string()),
            dominant_average_confidence: dominant.map(|dominant| dominant.average_confidence),
            emotions: AggregatedEmotionRow::ranked(&analysis.aggregated_emotions),
            frames: show_frames
                .then(|| analysis.frame_by_frame.iter().map(FrameRow::new).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use emoscope_client::EmotionScore;

    use super::*;

    fn video() -> VideoAnalysis {
        serde_json::from_str(
            r#"{
                "id": 5,
                "video_info": {"duration_seconds": 2.0, "fps": 30.0, "total_frames": 60, "analyzed_frames": 2},
                "aggregated_emotions": {
                    "emotions": {
                        "neutral": {"average": 30.0, "simple_average": 32.0, "min": 20.0, "max": 40.0, "std": 2.5, "presence_percentage": 30.0},
                        "happy": {"average": 62.5, "simple_average": 60.0, "min": 50.0, "max": 75.0, "std": 6.0, "presence_percentage": 70.0}
                    }
                },
                "frame_by_frame": [
                    {"frame": 0, "timestamp": 0.0, "dominant_emotion": "happy", "dominant_confidence": 50.0, "top_k_emotions": []},
                    {"frame": 30, "timestamp": 1.0, "dominant_emotion": "happy", "dominant_confidence": 75.0, "top_k_emotions": []}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn video_view_ranks_emotions_and_derives_dominant() {
        let view = VideoResultView::new(&video(), false);
        assert_eq!(view.dominant_emotion.as_deref(), Some("happy"));
        assert_eq!(view.dominant_average_confidence, Some(62.5));
        assert_eq!(view.emotions[0].emotion, "happy");
        assert_eq!(view.emotions[1].emotion, "neutral");
        assert!(view.frames.is_none());
    }

    #[test]
    fn frame_rows_appear_when_expanded() {
        let view = VideoResultView::new(&video(), true);
        let frames = view.frames.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].frame_number, 30);
    }

    #[test]
    fn image_view_falls_back_to_leading_score() {
        let analysis = ImageAnalysis {
            top_k_emotions: vec![EmotionScore::new("fear", 44.4), EmotionScore::new("sad", 30.0)],
            ..ImageAnalysis::default()
        };
        let view = ImageResultView::new(&analysis);
        assert_eq!(view.dominant_emotion.as_deref(), Some("fear"));
        assert_eq!(view.dominant_confidence, Some(44.4));
        assert_eq!(view.bars.len(), 2);
    }
}

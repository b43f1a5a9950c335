use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::{ImageId, VideoId};

/// Which analysis pipeline a file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Confidence for one emotion label, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub emotion: String,
    pub confidence: f64,
}

impl EmotionScore {
    pub fn new(emotion: impl Into<String>, confidence: f64) -> Self {
        Self {
            emotion: emotion.into(),
            confidence,
        }
    }
}

/// Result of a single-image analysis. Also embedded as `analysis_data` in stored image records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageAnalysis {
    #[serde(default)]
    pub id: Option<ImageId>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_confidence: Option<f64>,
    /// Descending by confidence; the dominant emotion comes first.
    #[serde(default)]
    pub top_k_emotions: Vec<EmotionScore>,
}

/// One sampled frame of a video.
///
/// The analyze endpoint names the fields `frame`/`top_k_emotions`, stored records use
/// `frame_number`/`emotions_data`; both decode into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(alias = "frame")]
    pub frame_number: u64,
    pub timestamp: f64,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_confidence: Option<f64>,
    #[serde(default, alias = "top_k_emotions")]
    pub emotions_data: Vec<EmotionScore>,
}

/// Per-emotion statistics across a video's sampled frames, all in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEmotionStats {
    /// Time-weighted average confidence.
    pub average: f64,
    pub simple_average: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub presence_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantEmotion<'a> {
    pub emotion: &'a str,
    pub average_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedEmotions {
    #[serde(default)]
    pub emotions: BTreeMap<String, AggregatedEmotionStats>,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_average_confidence: Option<f64>,
}

impl AggregatedEmotions {
    /// Emotions ordered by time-weighted average, highest first. Ties break on label.
    pub fn ranked(&self) -> Vec<(&str, &AggregatedEmotionStats)> {
        let mut ranked = self
            .emotions
            .iter()
            .map(|(emotion, stats)| (emotion.as_str(), stats))
            .collect::<Vec<_>>();
        ranked.sort_by(|(left_name, left), (right_name, right)| {
            right
                .average
                .partial_cmp(&left.average)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left_name.cmp(right_name))
        });
        ranked
    }

    /// The overall dominant emotion.
    ///
    /// The precomputed server value is used when present; otherwise the emotion with
    /// the highest time-weighted average is derived from the per-emotion stats.
    pub fn dominant(&self) -> Option<DominantEmotion<'_>> {
        if let Some(emotion) = self.dominant_emotion.as_deref() {
            let average_confidence = self
                .dominant_average_confidence
                .or_else(|| self.emotions.get(emotion).map(|stats| stats.average))?;
            return Some(DominantEmotion {
                emotion,
                average_confidence,
            });
        }

        self.ranked()
            .first()
            .map(|&(emotion, stats)| DominantEmotion {
                emotion,
                average_confidence: stats.average,
            })
    }

    /// Sum of presence percentages; ~100 for any completed analysis.
    pub fn presence_total(&self) -> f64 {
        self.emotions
            .values()
            .map(|stats| stats.presence_percentage)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub total_frames: u64,
    pub analyzed_frames: usize,
    pub duration_seconds: f64,
    pub fps: f64,
}

/// Response of the analyze-video endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub id: VideoId,
    #[serde(default)]
    pub upload_date: Option<String>,
    pub video_info: VideoInfo,
    #[serde(default)]
    pub frame_by_frame: Vec<FrameRecord>,
    #[serde(default)]
    pub aggregated_emotions: AggregatedEmotions,
}

/// A stored video analysis with every sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysisRecord {
    pub id: VideoId,
    pub filename: String,
    pub upload_date: String,
    pub duration_seconds: f64,
    pub total_frames: u64,
    pub analyzed_frames: usize,
    pub fps: f64,
    pub frame_interval: u32,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_confidence: Option<f64>,
    #[serde(default)]
    pub aggregated_data: AggregatedEmotions,
    #[serde(default)]
    pub frames: Vec<FrameRecord>,
}

/// A stored image analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetail {
    pub id: ImageId,
    pub filename: String,
    pub upload_date: String,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_confidence: Option<f64>,
    #[serde(default)]
    pub analysis_data: ImageAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHistoryEntry {
    pub id: ImageId,
    pub filename: String,
    pub upload_date: String,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoHistoryEntry {
    pub id: VideoId,
    pub filename: String,
    pub upload_date: String,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub total_frames: u64,
    #[serde(default)]
    pub analyzed_frames: usize,
    #[serde(default)]
    pub fps: f64,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageHistory {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub images: Vec<ImageHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoHistory {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub videos: Vec<VideoHistoryEntry>,
}

/// Shape checks applied after a success body decodes.
///
/// A violation turns the response into a `Malformed` outcome.
pub trait CheckedResponse {
    fn invariant_violation(&self) -> Option<String> {
        None
    }
}

impl CheckedResponse for ImageAnalysis {}
impl CheckedResponse for ImageDetail {}
impl CheckedResponse for ImageHistory {}
impl CheckedResponse for VideoHistory {}
impl CheckedResponse for FrameRecord {}

impl CheckedResponse for VideoAnalysis {
    fn invariant_violation(&self) -> Option<String> {
        frame_sequence_violation(self.video_info.analyzed_frames, &self.frame_by_frame)
    }
}

impl CheckedResponse for VideoAnalysisRecord {
    fn invariant_violation(&self) -> Option<String> {
        frame_sequence_violation(self.analyzed_frames, &self.frames)
    }
}

fn frame_sequence_violation(analyzed_frames: usize, frames: &[FrameRecord]) -> Option<String> {
    if analyzed_frames != frames.len() {
        return Some(format!(
            "analyzed_frames is {analyzed_frames} but {} frames were returned",
            frames.len()
        ));
    }

    frames.windows(2).find_map(|pair| {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.timestamp < previous.timestamp {
            Some(format!(
                "frame {} at {}s precedes frame {} at {}s",
                next.frame_number, next.timestamp, previous.frame_number, previous.timestamp
            ))
        } else {
            None
        }
    })
}

/// Parses the naive ISO-8601 timestamps the service emits, with or without fractional seconds.
pub fn parse_upload_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S%.f").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(average: f64, presence_percentage: f64) -> AggregatedEmotionStats {
        AggregatedEmotionStats {
            average,
            simple_average: average,
            min: average,
            max: average,
            std: 0.0,
            presence_percentage,
        }
    }

    fn frame(frame_number: u64, timestamp: f64) -> FrameRecord {
        FrameRecord {
            frame_number,
            timestamp,
            dominant_emotion: Some("happy".to_string()),
            dominant_confidence: Some(90.0),
            emotions_data: vec![EmotionScore::new("happy", 90.0)],
        }
    }

    #[test]
    fn dominant_is_highest_weighted_average() {
        let aggregated = AggregatedEmotions {
            emotions: BTreeMap::from([
                ("happy".to_string(), stats(62.5, 70.0)),
                ("neutral".to_string(), stats(30.0, 30.0)),
            ]),
            dominant_emotion: None,
            dominant_average_confidence: None,
        };

        let dominant = aggregated.dominant().unwrap();
        assert_eq!(dominant.emotion, "happy");
        assert_eq!(dominant.average_confidence, 62.5);
        assert!((aggregated.presence_total() - 100.0).abs() < 0.01);
    }

    #[test]
    fn precomputed_dominant_wins() {
        let aggregated: AggregatedEmotions = serde_json::from_str(
            r#"{
                "emotions": {
                    "happy": {"average": 62.5, "simple_average": 60.0, "min": 40.0, "max": 80.0, "std": 5.0, "presence_percentage": 70.0},
                    "neutral": {"average": 30.0, "simple_average": 31.0, "min": 10.0, "max": 50.0, "std": 4.0, "presence_percentage": 30.0}
                },
                "dominant_emotion": "happy",
                "dominant_average_confidence": 62.5
            }"#,
        )
        .unwrap();

        let ranked = aggregated.ranked();
        assert_eq!(ranked[0].0, "happy");
        assert_eq!(ranked[1].0, "neutral");
        assert_eq!(aggregated.dominant().unwrap().average_confidence, 62.5);
    }

    #[test]
    fn empty_aggregate_has_no_dominant() {
        let aggregated: AggregatedEmotions = serde_json::from_str("{}").unwrap();
        assert!(aggregated.dominant().is_none());
        assert_eq!(aggregated.presence_total(), 0.0);
    }

    #[test]
    fn analyze_and_stored_frame_shapes_decode_alike() {
        let from_analyze: FrameRecord = serde_json::from_str(
            r#"{"frame": 15, "timestamp": 0.5, "dominant_emotion": "sad", "dominant_confidence": 71.25,
                "top_k_emotions": [{"emotion": "sad", "confidence": 71.25}]}"#,
        )
        .unwrap();
        let from_record: FrameRecord = serde_json::from_str(
            r#"{"frame_number": 15, "timestamp": 0.5, "dominant_emotion": "sad", "dominant_confidence": 71.25,
                "emotions_data": [{"emotion": "sad", "confidence": 71.25}]}"#,
        )
        .unwrap();
        assert_eq!(from_analyze, from_record);
    }

    #[test]
    fn frame_count_mismatch_is_a_violation() {
        let frames = vec![frame(0, 0.0), frame(15, 0.5)];
        assert!(frame_sequence_violation(3, &frames).is_some());
        assert!(frame_sequence_violation(2, &frames).is_none());
    }

    #[test]
    fn decreasing_timestamps_are_a_violation() {
        let frames = vec![frame(0, 0.0), frame(15, 1.0), frame(30, 0.5)];
        let violation = frame_sequence_violation(3, &frames).unwrap();
        assert!(violation.contains("frame 30"));
    }

    #[test]
    fn parses_service_timestamps() {
        assert!(parse_upload_date("2025-03-01T10:20:30.123456").is_some());
        assert!(parse_upload_date("2025-03-01T10:20:30").is_some());
        assert!(parse_upload_date("yesterday").is_none());
    }
}

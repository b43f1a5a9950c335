//! Display formatting shared by every view.
//!
//! Rounding happens only here. Views keep the raw values so bar widths and
//! comparisons never see a rounded number.

use emoscope_client::{EmotionScore, parse_upload_date};

pub const NOT_AVAILABLE: &str = "N/A";

/// Confidence in percent with two decimals, e.g. `62.50%`.
pub fn confidence(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn optional_confidence(value: Option<f64>) -> String {
    value.map(confidence).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn seconds(value: f64) -> String {
    format!("{value:.1}s")
}

pub fn timestamp(value: f64) -> String {
    format!("{value:.2}s")
}

/// Upload dates as `YYYY-MM-DD HH:MM:SS`; unparseable input is shown verbatim.
pub fn upload_date(raw: &str) -> String {
    parse_upload_date(raw)
        .map(|date| date.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// One labelled confidence bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBar {
    pub label: String,
    /// Raw confidence as received, never rounded.
    pub value: f64,
}

impl ConfidenceBar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    pub fn from_scores(scores: &[EmotionScore]) -> Vec<Self> {
        scores
            .iter()
            .map(|score| Self::new(score.emotion.clone(), score.confidence))
            .collect()
    }

    pub fn display_value(&self) -> String {
        confidence(self.value)
    }

    /// Bar width in percent of the full track, from the raw value.
    pub fn width_percent(&self) -> f64 {
        if self.value.is_finite() {
            self.value.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn filled_columns(&self, track_width: usize) -> usize {
        let filled = (self.width_percent() / 100.0 * track_width as f64).round() as usize;
        filled.min(track_width)
    }

    pub fn render_track(&self, track_width: usize) -> String {
        let filled = self.filled_columns(track_width);
        format!("{}{}", "#".repeat(filled), ".".repeat(track_width - filled))
    }
}

//! Plain-text rendering of the views.

use std::path::Path;

use emoscope_client::{FrameRecord, ImageHistoryEntry, MediaKind, VideoHistoryEntry};

use crate::analyze::{
    AggregatedEmotionRow, AnalysisResult, AnalysisSubmission, FrameRow, ImageResultView,
    SubmissionState, VideoResultView,
};
use crate::deletion::{DeletionFlow, DeletionState};
use crate::detail::{ImageDetailView, VideoDetailView};
use crate::format::{self, ConfidenceBar, NOT_AVAILABLE};
use crate::frames::{EmotionPanel, FrameViews};
use crate::history::{HistoryBrowser, HistoryView};
use crate::request::LoadState;
use crate::settings::ClientSettings;

fn bar_line(bar: &ConfidenceBar, bar_width: usize) -> String {
    format!(
        "  {:<10} {} {:>8}",
        bar.label,
        bar.render_track(bar_width),
        bar.display_value()
    )
}

fn dominant_line(emotion: Option<&str>, confidence: Option<f64>) -> String {
    format!(
        "Dominant emotion: {} ({})",
        emotion.unwrap_or(NOT_AVAILABLE),
        format::optional_confidence(confidence)
    )
}

pub fn submission(submission: &AnalysisSubmission, bar_width: usize) -> String {
    match submission.state() {
        SubmissionState::Idle => submission
            .preview()
            .map(|preview| {
                format!(
                    "Selected {} ({}, {} bytes). {}",
                    preview.file_name,
                    preview.media_kind.map_or("unknown type", MediaKind::label),
                    preview.size_bytes,
                    submission.button_label()
                )
            })
            .unwrap_or_else(|| "No file selected".to_string()),
        SubmissionState::Submitting(_) => submission.progress_text().unwrap_or_default(),
        SubmissionState::Failed(message) => format!("Error: {message}"),
        SubmissionState::Succeeded(AnalysisResult::Image(analysis)) => {
            image_result(&ImageResultView::new(analysis), bar_width)
        }
        SubmissionState::Succeeded(AnalysisResult::Video(analysis)) => video_result(
            &VideoResultView::new(analysis, submission.show_frame_details()),
            bar_width,
        ),
    }
}

pub fn image_result(view: &ImageResultView, bar_width: usize) -> String {
    let mut lines = vec![dominant_line(
        view.dominant_emotion.as_deref(),
        view.dominant_confidence,
    )];
    if !view.bars.is_empty() {
        lines.push("Top emotions:".to_string());
        lines.extend(view.bars.iter().map(|bar| bar_line(bar, bar_width)));
    }
    lines.join("\n")
}

fn aggregated_lines(rows: &[AggregatedEmotionRow], bar_width: usize) -> Vec<String> {
    let mut lines = vec!["Aggregated emotions:".to_string()];
    for row in rows {
        lines.push(bar_line(&row.bar(), bar_width));
        lines.push(format!(
            "    simple avg {}  range {} - {}  std dev {}  present {}",
            format::confidence(row.simple_average),
            format::confidence(row.min),
            format::confidence(row.max),
            format::confidence(row.std),
            format::confidence(row.presence_percentage),
        ));
    }
    lines
}

fn frame_row_line(row: &FrameRow) -> String {
    format!(
        "  frame {:>6} at {:>8}  {} ({})",
        row.frame_number,
        format::timestamp(row.timestamp),
        row.dominant_emotion.as_deref().unwrap_or(NOT_AVAILABLE),
        format::optional_confidence(row.dominant_confidence)
    )
}

pub fn video_result(view: &VideoResultView, bar_width: usize) -> String {
    let info = &view.info;
    let mut lines = vec![
        format!(
            "Duration: {}  FPS: {:.1}  Total frames: {}  Analyzed frames: {}",
            format::seconds(info.duration_seconds),
            info.fps,
            info.total_frames,
            info.analyzed_frames
        ),
        format!(
            "Overall dominant emotion: {} ({})",
            view.dominant_emotion.as_deref().unwrap_or(NOT_AVAILABLE),
            format::optional_confidence(view.dominant_average_confidence)
        ),
    ];
    if !view.emotions.is_empty() {
        lines.extend(aggregated_lines(&view.emotions, bar_width));
    }
    match &view.frames {
        Some(frames) => {
            lines.push("Frame-by-frame analysis:".to_string());
            lines.extend(frames.iter().map(frame_row_line));
        }
        None => lines.push("Frame-by-frame analysis hidden (use --frames to show)".to_string()),
    }
    lines.join("\n")
}

fn image_row(entry: &ImageHistoryEntry) -> String {
    format!(
        "  #{:<5} {:<32} {:<10} {:>8}  {}",
        entry.id,
        entry.filename,
        entry.dominant_emotion.as_deref().unwrap_or(NOT_AVAILABLE),
        format::optional_confidence(entry.dominant_confidence),
        format::upload_date(&entry.upload_date)
    )
}

fn video_row(entry: &VideoHistoryEntry) -> String {
    format!(
        "  #{:<5} {:<32} {:<10} {:>8}  {:>7}  {:>4} frames  {}",
        entry.id,
        entry.filename,
        entry.dominant_emotion.as_deref().unwrap_or(NOT_AVAILABLE),
        format::optional_confidence(entry.dominant_confidence),
        format::seconds(entry.duration_seconds),
        entry.analyzed_frames,
        format::upload_date(&entry.upload_date)
    )
}

pub fn history(browser: &HistoryBrowser) -> String {
    let tabs = [MediaKind::Image, MediaKind::Video]
        .into_iter()
        .map(|tab| {
            let label = browser.tab_label(tab);
            if tab == browser.tab() {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = vec![tabs];
    match browser.view() {
        HistoryView::Loading => lines.push("Loading...".to_string()),
        HistoryView::Failed(message) => lines.push(format!("Error: {message}")),
        HistoryView::Empty(message) => lines.push(message.to_string()),
        HistoryView::Images(images) => lines.extend(images.iter().map(image_row)),
        HistoryView::Videos(videos) => lines.extend(videos.iter().map(video_row)),
    }
    lines.join("\n")
}

pub fn image_detail(view: &ImageDetailView, bar_width: usize) -> String {
    let detail = match view.state() {
        LoadState::Loading => return "Loading...".to_string(),
        LoadState::Failed(message) => return format!("Error: {message}"),
        LoadState::Ready(detail) => detail,
    };

    let (emotion, confidence) = view
        .dominant()
        .map_or((None, None), |(emotion, confidence)| (Some(emotion), confidence));
    let mut lines = vec![
        format!("Image #{} {}", detail.id, detail.filename),
        format!("Uploaded: {}", format::upload_date(&detail.upload_date)),
        format!("File: {}", view.image_url()),
        dominant_line(emotion, confidence),
    ];
    let bars = view.bars();
    if !bars.is_empty() {
        lines.push("Top emotions:".to_string());
        lines.extend(bars.iter().map(|bar| bar_line(bar, bar_width)));
    }
    lines.join("\n")
}

fn panel_lines(panel: &EmotionPanel, bar_width: usize) -> Vec<String> {
    let mut lines = vec![dominant_line(
        panel.dominant_emotion.as_deref(),
        panel.dominant_confidence,
    )];
    lines.extend(panel.bars.iter().map(|bar| bar_line(bar, bar_width)));
    lines
}

pub fn video_detail(view: &VideoDetailView, all_frames: bool, bar_width: usize) -> String {
    let record = match view.state() {
        LoadState::Loading => return "Loading...".to_string(),
        LoadState::Failed(message) => return format!("Error: {message}"),
        LoadState::Ready(record) => record,
    };

    let mut lines = Vec::new();
    if let Some(summary) = view.summary() {
        lines.push(format!("Video #{} {}", record.id, summary.filename));
        lines.push(format!("Uploaded: {}", format::upload_date(&summary.upload_date)));
        lines.push(format!(
            "Duration: {}  FPS: {:.1}  Frame interval: {}  Frames: {} analyzed of {}",
            format::seconds(summary.duration_seconds),
            summary.fps,
            summary.frame_interval,
            summary.analyzed_frames,
            summary.total_frames
        ));
    }

    let (emotion, confidence) = view
        .dominant()
        .map_or((None, None), |(emotion, confidence)| (Some(emotion), Some(confidence)));
    lines.push(format!(
        "Overall dominant emotion: {} ({})",
        emotion.unwrap_or(NOT_AVAILABLE),
        format::optional_confidence(confidence)
    ));
    let aggregated = view.aggregated();
    if !aggregated.is_empty() {
        lines.extend(aggregated_lines(&aggregated, bar_width));
    }

    match view.views() {
        FrameViews::Empty => lines.push("No frames were analyzed for this video".to_string()),
        FrameViews::Active {
            viewer,
            strip,
            panel,
        } => {
            lines.push(format!(
                "{} (frame {}, {})",
                viewer.label,
                viewer.frame_number,
                format::timestamp(viewer.timestamp)
            ));
            lines.push(format!("  {}", viewer.image_url));
            lines.extend(panel_lines(panel, bar_width));

            let thumbnails = strip
                .thumbnails
                .iter()
                .map(|thumbnail| {
                    if thumbnail.selected {
                        format!("[{}]", thumbnail.frame_number)
                    } else {
                        thumbnail.frame_number.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            let mut strip_line = format!("Thumbnails: {thumbnails}");
            if strip.remaining > 0 {
                strip_line.push_str(&format!(" (+{} more frames)", strip.remaining));
            }
            lines.push(strip_line);
        }
    }

    if all_frames {
        lines.push("All frames:".to_string());
        lines.extend(record.frames.iter().map(|frame| frame_row_line(&FrameRow::new(frame))));
    }
    lines.join("\n")
}

pub fn frame(video_label: &str, frame: &FrameRecord, bar_width: usize) -> String {
    let mut lines = vec![format!(
        "{video_label} frame {} at {}",
        frame.frame_number,
        format::timestamp(frame.timestamp)
    )];
    lines.extend(panel_lines(&EmotionPanel::from_frame(frame), bar_width));
    lines.join("\n")
}

pub fn deletion(flow: &DeletionFlow) -> String {
    let kind = flow.target().media_kind();
    match flow.state() {
        DeletionState::Idle => "Deletion cancelled".to_string(),
        DeletionState::ConfirmPending => {
            format!("Are you sure you want to delete this {kind}? This action cannot be undone.")
        }
        DeletionState::Deleting(_) => flow.confirm_label().to_string(),
        DeletionState::Done => format!("Deleted {kind}"),
        DeletionState::Failed(message) => format!("Error: {message}"),
    }
}

pub fn settings(settings: &ClientSettings, path: &Path) -> String {
    [
        format!("Settings file: {}", path.display()),
        format!("base_url = {}", settings.base_url),
        format!("request_timeout_secs = {}", settings.request_timeout_secs),
        format!("default_frame_interval = {}", settings.default_frame_interval),
        format!("display.bar_width = {}", settings.display.bar_width),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use emoscope_client::{
        DeleteTarget, EmotionScore, Endpoints, FetchError, ImageAnalysis, ImageId, Upload,
        VideoId,
    };

    use super::*;

    #[test]
    fn image_result_shows_two_decimal_confidences() {
        let view = ImageResultView::new(&ImageAnalysis {
            dominant_emotion: Some("happy".to_string()),
            dominant_confidence: Some(97.456),
            top_k_emotions: vec![
                EmotionScore::new("happy", 97.456),
                EmotionScore::new("neutral", 2.0),
            ],
            ..ImageAnalysis::default()
        });
        let text = image_result(&view, 10);
        assert!(text.contains("Dominant emotion: happy (97.46%)"));
        assert!(text.contains("##########"));
        assert!(text.contains("2.00%"));
    }

    #[test]
    fn submission_failure_is_rendered_as_error() {
        let mut submission = AnalysisSubmission::new(MediaKind::Image);
        submission.select_file(Some(Upload::new("face.png", vec![0_u8; 3])));
        assert!(self::submission(&submission, 10).contains("Analyze Image"));
        assert!(self::submission(&submission, 10).contains("face.png (image, 3 bytes)"));

        let ticket = submission.submit().unwrap();
        assert_eq!(
            self::submission(&submission, 10),
            "Processing image... This may take a few moments."
        );
        submission.resolve(
            ticket.token,
            Err(FetchError::ServerError {
                stage: "analyze-image",
                status: 400,
                detail: Some("No face detected in the image".to_string()),
            }),
        );
        assert_eq!(self::submission(&submission, 10), "Error: No face detected in the image");
    }

    #[test]
    fn empty_history_tab_shows_empty_state() {
        let mut browser = HistoryBrowser::new(MediaKind::Video);
        let token = browser.load();
        assert!(history(&browser).contains("Loading..."));
        browser.resolve(token, Ok(Vec::new()), Ok(Vec::new()));

        let text = history(&browser);
        assert!(text.starts_with("Images (0)  [Videos (0)]"));
        assert!(text.contains("No videos analyzed yet"));
    }

    #[test]
    fn loading_and_failed_details_are_distinct() {
        let mut view = VideoDetailView::new(VideoId::new(2), Endpoints::default());
        let token = view.begin_load();
        assert_eq!(video_detail(&view, false, 10), "Loading...");
        view.resolve(
            token,
            Err(FetchError::ServerError {
                stage: "video-detail",
                status: 500,
                detail: None,
            }),
        );
        assert_eq!(
            video_detail(&view, false, 10),
            "Error: Failed to fetch video details"
        );

        let image = ImageDetailView::new(ImageId::new(1), Endpoints::default());
        assert_eq!(image_detail(&image, 10), "Loading...");
    }

    #[test]
    fn deletion_prompt_names_the_media_kind() {
        let mut flow = DeletionFlow::new(DeleteTarget::Image(ImageId::new(1)));
        flow.request_delete();
        assert!(deletion(&flow).contains("delete this image"));
    }
}

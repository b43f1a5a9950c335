//! `emoscope` command-line front end.
//!
//! Each subcommand drives one state machine through a [`Session`] and prints
//! its views.

mod error;
pub mod render;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use emoscope_client::{DeleteTarget, FileRef, ImageId, MediaKind, Upload, VideoId};
use snafu::ResultExt;

use crate::analyze::AnalysisSubmission;
use crate::deletion::DeletionFlow;
use crate::detail::{ImageDetailView, VideoDetailView};
use crate::history::HistoryBrowser;
use crate::session::Session;
use crate::settings::{ClientSettings, SettingsStore};

pub use error::CliError;
use error::{
    BackendSnafu, FailedSnafu, FrameIntervalSnafu, PromptSnafu, ReadUploadSnafu,
    SettingsSnafu, WriteOutputSnafu,
};

#[derive(Debug, Parser)]
#[command(name = "emoscope", version, about = "Facial emotion analysis for images and videos")]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the per-user default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Analysis service URL for this run only.
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload an image or video for analysis.
    Analyze(AnalyzeArgs),
    /// List past analyses.
    History {
        /// Show the video tab instead of images.
        #[arg(long)]
        videos: bool,
    },
    /// Show a stored image analysis.
    Image { id: ImageId },
    /// Show a stored video analysis.
    Video {
        id: VideoId,
        /// Zero-based position in the sampled frame sequence to select.
        #[arg(long, value_name = "INDEX")]
        frame: Option<usize>,
        /// List every sampled frame.
        #[arg(long)]
        frames: bool,
    },
    /// Show the analysis of one stored video frame.
    Frame {
        video: VideoId,
        frame_number: u64,
        /// Write the frame image to this path.
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },
    /// Delete a stored analysis.
    Delete {
        kind: MediaArg,
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Show or change persisted settings.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    pub path: PathBuf,
    /// Analyze as video even if the extension says otherwise.
    #[arg(long)]
    pub video: bool,
    /// Analyze every Nth frame (video only, 1-120).
    #[arg(long, value_name = "N")]
    pub interval: Option<String>,
    /// Include the frame-by-frame list in the video result.
    #[arg(long)]
    pub frames: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Default frame interval for video analysis.
    #[arg(long, value_name = "N")]
    pub interval: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaArg {
    Image,
    Video,
}

impl From<MediaArg> for MediaKind {
    fn from(value: MediaArg) -> Self {
        match value {
            MediaArg::Image => MediaKind::Image,
            MediaArg::Video => MediaKind::Video,
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let store = match &cli.config {
        Some(path) => SettingsStore::new(path.clone()),
        None => SettingsStore::load(),
    };

    if let Command::Config(args) = &cli.command {
        return configure(&store, args);
    }

    let mut settings = (*store.settings()).clone();
    if let Some(server) = cli.server {
        settings.base_url = server;
        settings = settings.normalized();
    }

    let backend = emoscope_client::create_backend(settings.to_backend_config())
        .context(BackendSnafu {
            stage: "create-backend",
        })?;
    let session = Session::new(backend);

    match cli.command {
        Command::Analyze(args) => analyze(&session, &settings, args).await,
        Command::History { videos } => history(&session, videos).await,
        Command::Image { id } => image(&session, &settings, id).await,
        Command::Video { id, frame, frames } => {
            video(&session, &settings, id, frame, frames).await
        }
        Command::Frame {
            video,
            frame_number,
            save,
        } => frame(&session, &settings, video, frame_number, save).await,
        Command::Delete { kind, id, yes } => {
            let target = match MediaKind::from(kind) {
                MediaKind::Image => DeleteTarget::Image(ImageId::new(id)),
                MediaKind::Video => DeleteTarget::Video(VideoId::new(id)),
            };
            delete(&session, target, yes).await
        }
        Command::Config(_) => Ok(()),
    }
}

/// Reads a file into an upload named after its final path component.
pub async fn read_upload(path: &Path) -> Result<Upload, CliError> {
    let bytes = tokio::fs::read(path).await.context(ReadUploadSnafu {
        stage: "read-upload",
        path: path.to_path_buf(),
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Upload::new(file_name, bytes))
}

async fn analyze(
    session: &Session,
    settings: &ClientSettings,
    args: AnalyzeArgs,
) -> Result<(), CliError> {
    let upload = read_upload(&args.path).await?;
    let media_kind = if args.video || upload.media_kind() == Some(MediaKind::Video) {
        MediaKind::Video
    } else {
        MediaKind::Image
    };

    let mut submission =
        AnalysisSubmission::new(media_kind).with_frame_interval(settings.default_frame_interval);
    if let Some(interval) = &args.interval {
        submission
            .set_frame_interval(interval)
            .context(FrameIntervalSnafu {
                stage: "set-frame-interval",
            })?;
    }
    submission.select_file(Some(upload));

    let Some(ticket) = submission.submit() else {
        return FailedSnafu {
            stage: "submit-analysis",
            message: "No file selected",
        }
        .fail();
    };
    if let Some(progress) = submission.progress_text() {
        eprintln!("{progress}");
    }
    let outcome = session.analyze(&ticket).await;
    submission.resolve(ticket.token, outcome);
    if args.frames {
        submission.toggle_frame_details();
    }

    println!("{}", render::submission(&submission, settings.display.bar_width));
    fail_on_error("analyze", submission.error())
}

async fn history(session: &Session, videos: bool) -> Result<(), CliError> {
    let tab = if videos {
        MediaKind::Video
    } else {
        MediaKind::Image
    };
    let mut browser = HistoryBrowser::new(tab);
    session.load_history(&mut browser).await;

    println!("{}", render::history(&browser));
    fail_on_error("history", browser.collections().error().unwrap_or_default())
}

async fn image(session: &Session, settings: &ClientSettings, id: ImageId) -> Result<(), CliError> {
    let mut view = ImageDetailView::new(id, session.endpoints().clone());
    session.load_image(&mut view).await;

    println!("{}", render::image_detail(&view, settings.display.bar_width));
    fail_on_error("image-detail", view.state().error().unwrap_or_default())
}

async fn video(
    session: &Session,
    settings: &ClientSettings,
    id: VideoId,
    frame: Option<usize>,
    all_frames: bool,
) -> Result<(), CliError> {
    let mut view = VideoDetailView::new(id, session.endpoints().clone());
    session.load_video(&mut view).await;

    if let Some(index) = frame
        && let Some(note) = select_frame(&mut view, index)
    {
        eprintln!("{note}");
    }

    println!(
        "{}",
        render::video_detail(&view, all_frames, settings.display.bar_width)
    );
    fail_on_error("video-detail", view.state().error().unwrap_or_default())
}

/// Applies `--frame` to a loaded video. Returns a note when the requested
/// index could not be shown as asked.
fn select_frame(view: &mut VideoDetailView, index: usize) -> Option<String> {
    view.state().ready()?;
    match view.select_frame(index) {
        None => Some("This video has no analyzed frames.".to_string()),
        Some(selected) if selected != index => Some(format!(
            "Frame index {index} is past the last frame; showing frame {}.",
            selected + 1
        )),
        Some(_) => None,
    }
}

async fn frame(
    session: &Session,
    settings: &ClientSettings,
    video: VideoId,
    frame_number: u64,
    save: Option<PathBuf>,
) -> Result<(), CliError> {
    let record = session
        .frame_analysis(video, frame_number)
        .await
        .map_err(|error| {
            FailedSnafu {
                stage: "frame-detail",
                message: error.user_message("Failed to fetch frame details"),
            }
            .build()
        })?;
    println!(
        "{}",
        render::frame(&format!("Video #{video}"), &record, settings.display.bar_width)
    );

    if let Some(path) = save {
        let bytes = session
            .fetch_file(FileRef::Frame {
                video,
                frame_number,
            })
            .await
            .map_err(|error| {
                FailedSnafu {
                    stage: "frame-file",
                    message: error.user_message("Failed to fetch frame image"),
                }
                .build()
            })?;
        tokio::fs::write(&path, &bytes)
            .await
            .context(WriteOutputSnafu {
                stage: "save-frame",
                path: path.clone(),
            })?;
        println!("Saved {} bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}

async fn delete(session: &Session, target: DeleteTarget, assume_yes: bool) -> Result<(), CliError> {
    let mut flow = DeletionFlow::new(target);
    flow.request_delete();

    if !assume_yes {
        let question = render::deletion(&flow);
        if !prompt(&question)? {
            flow.cancel();
            println!("{}", render::deletion(&flow));
            return Ok(());
        }
    }

    loop {
        session.confirm_delete(&mut flow).await;
        println!("{}", render::deletion(&flow));
        if flow.is_done() {
            return Ok(());
        }

        let message = flow.error().map(str::to_string).unwrap_or_default();
        if assume_yes || !prompt("Retry?")? {
            flow.cancel();
            return FailedSnafu {
                stage: "delete",
                message,
            }
            .fail();
        }
    }
}

fn prompt(question: &str) -> Result<bool, CliError> {
    dialoguer::Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .context(PromptSnafu {
            stage: "confirm-delete",
        })
}

fn configure(store: &SettingsStore, args: &ConfigArgs) -> Result<(), CliError> {
    let mut settings = (*store.settings()).clone();
    let changed = args.base_url.is_some() || args.timeout.is_some() || args.interval.is_some();
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(timeout) = args.timeout {
        settings.request_timeout_secs = timeout;
    }
    if let Some(interval) = args.interval {
        settings.default_frame_interval = interval;
    }

    let settings = if changed {
        store.update(settings).context(SettingsSnafu {
            stage: "save-settings",
        })?
    } else {
        store.settings()
    };
    println!("{}", render::settings(&settings, store.config_path()));
    Ok(())
}

fn fail_on_error(stage: &'static str, message: &str) -> Result<(), CliError> {
    if message.is_empty() {
        return Ok(());
    }
    FailedSnafu { stage, message }.fail()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_video_subcommand() {
        let cli = Cli::parse_from(["emoscope", "video", "12", "--frame", "3", "--frames"]);
        match cli.command {
            Command::Video { id, frame, frames } => {
                assert_eq!(id, VideoId::new(12));
                assert_eq!(frame, Some(3));
                assert!(frames);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from(["emoscope", "image", "abc"]).is_err());
    }

    #[test]
    fn parses_analyze_with_interval() {
        let cli = Cli::parse_from([
            "emoscope", "--verbose", "analyze", "clip.mp4", "--interval", "15",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.path, PathBuf::from("clip.mp4"));
                assert_eq!(args.interval.as_deref(), Some("15"));
                assert!(!args.video);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_delete_kind() {
        let cli = Cli::parse_from(["emoscope", "delete", "video", "4", "--yes"]);
        assert!(matches!(
            cli.command,
            Command::Delete {
                kind: MediaArg::Video,
                id: 4,
                yes: true
            }
        ));
    }

    #[test]
    fn config_without_flags_does_not_write() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("settings.json");
        let store = SettingsStore::new(path.clone());
        configure(
            &store,
            &ConfigArgs {
                base_url: None,
                timeout: None,
                interval: None,
            },
        )
        .unwrap();
        assert!(!path.exists());

        configure(
            &store,
            &ConfigArgs {
                base_url: Some("http://analysis.lan".to_string()),
                timeout: Some(60),
                interval: Some(10),
            },
        )
        .unwrap();
        assert_eq!(SettingsStore::new(path).settings().request_timeout_secs, 60);
    }

    fn loaded_video(frame_count: u64) -> VideoDetailView {
        let record = emoscope_client::VideoAnalysisRecord {
            id: VideoId::new(5),
            filename: "clip.mp4".to_string(),
            upload_date: "2025-03-01T10:20:30".to_string(),
            duration_seconds: 2.0,
            total_frames: 60,
            analyzed_frames: frame_count as usize,
            fps: 30.0,
            frame_interval: 30,
            dominant_emotion: Some("sad".to_string()),
            dominant_confidence: Some(55.0),
            aggregated_data: emoscope_client::AggregatedEmotions::default(),
            frames: (0..frame_count)
                .map(|index| emoscope_client::FrameRecord {
                    frame_number: index * 30,
                    timestamp: index as f64,
                    dominant_emotion: Some("sad".to_string()),
                    dominant_confidence: Some(55.0),
                    emotions_data: vec![emoscope_client::EmotionScore::new("sad", 55.0)],
                })
                .collect(),
        };
        let mut view = VideoDetailView::new(VideoId::new(5), emoscope_client::Endpoints::default());
        let token = view.begin_load();
        view.resolve(token, Ok(record));
        view
    }

    #[test]
    fn frame_flag_on_empty_video_still_renders() {
        let mut view = loaded_video(0);
        let note = select_frame(&mut view, 0).unwrap();
        assert_eq!(note, "This video has no analyzed frames.");

        let output = render::video_detail(&view, false, 20);
        assert!(output.contains("No frames were analyzed for this video"));
        assert!(!output.contains("outside"));
    }

    #[test]
    fn frame_flag_past_end_shows_last_frame() {
        let mut view = loaded_video(2);
        assert_eq!(select_frame(&mut view, 1), None);

        let note = select_frame(&mut view, 9).unwrap();
        assert!(note.contains("showing frame 2"));
        let output = render::video_detail(&view, false, 20);
        assert!(output.contains("Frame 2 of 2"));
    }

    #[tokio::test]
    async fn upload_name_comes_from_path() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("face.PNG");
        tokio::fs::write(&path, [1_u8, 2, 3]).await.unwrap();

        let upload = read_upload(&path).await.unwrap();
        assert_eq!(upload.file_name(), "face.PNG");
        assert_eq!(upload.content_type(), "image/png");
        assert_eq!(upload.len(), 3);

        let missing = read_upload(&directory.path().join("missing.jpg")).await;
        assert!(matches!(missing, Err(CliError::ReadUpload { .. })));
    }
}

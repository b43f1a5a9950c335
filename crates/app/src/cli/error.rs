use std::path::PathBuf;

use emoscope_client::FetchError;
use snafu::Snafu;

use crate::analyze::SubmissionError;
use crate::settings::SettingsError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("failed to read {path:?} on `{stage}`: {source}"))]
    ReadUpload {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to write {path:?} on `{stage}`: {source}"))]
    WriteOutput {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to set up the analysis client on `{stage}`: {source}"))]
    Backend {
        stage: &'static str,
        source: FetchError,
    },
    #[snafu(display("{source}"))]
    FrameInterval {
        stage: &'static str,
        source: SubmissionError,
    },
    #[snafu(display("{source}"))]
    Settings {
        stage: &'static str,
        source: SettingsError,
    },
    #[snafu(display("confirmation prompt failed on `{stage}`: {source}"))]
    Prompt {
        stage: &'static str,
        source: dialoguer::Error,
    },
    /// A view ended in its failure state; the message was already rendered for the user.
    #[snafu(display("{message}"))]
    Failed {
        stage: &'static str,
        message: String,
    },
}

//! Client-side state for browsing and submitting emotion analyses.
//!
//! Every state slice here is synchronous. A slice issues a ticket carrying a
//! [`request::RequestToken`], [`session::Session`] runs the round trip, and the
//! slice accepts the outcome only if it is still waiting on that token.

pub mod analyze;
pub mod cli;
pub mod deletion;
pub mod detail;
pub mod format;
pub mod frames;
pub mod history;
pub mod request;
pub mod session;
pub mod settings;

pub use analyze::{AnalysisResult, AnalysisSubmission, AnalysisTicket, SubmissionState};
pub use deletion::{DeletionFlow, DeletionState};
pub use detail::{ImageDetailView, VideoDetailView};
pub use frames::{CursorError, FrameCursor, FrameViews};
pub use history::{HistoryBrowser, HistoryView};
pub use request::{LoadState, RequestToken};
pub use session::Session;

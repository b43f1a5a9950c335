use emoscope_client::{DeleteTarget, FetchResult, MediaKind};

use crate::request::{RequestToken, RequestTokens};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeletionState {
    #[default]
    Idle,
    ConfirmPending,
    Deleting(RequestToken),
    Done,
    /// The request failed; the user may confirm again or cancel.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTicket {
    pub token: RequestToken,
    pub target: DeleteTarget,
}

/// Two-step guard in front of an irreversible delete.
#[derive(Debug)]
pub struct DeletionFlow {
    target: DeleteTarget,
    state: DeletionState,
    tokens: RequestTokens,
}

impl DeletionFlow {
    pub fn new(target: DeleteTarget) -> Self {
        Self {
            target,
            state: DeletionState::Idle,
            tokens: RequestTokens::default(),
        }
    }

    pub fn target(&self) -> DeleteTarget {
        self.target
    }

    pub fn state(&self) -> &DeletionState {
        &self.state
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.state, DeletionState::Deleting(_))
    }

    pub fn is_done(&self) -> bool {
        self.state == DeletionState::Done
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            DeletionState::Failed(message) => Some(message),
            DeletionState::Idle
            | DeletionState::ConfirmPending
            | DeletionState::Deleting(_)
            | DeletionState::Done => None,
        }
    }

    /// Whether the confirmation affordance accepts input.
    pub fn confirm_enabled(&self) -> bool {
        matches!(
            self.state,
            DeletionState::ConfirmPending | DeletionState::Failed(_)
        )
    }

    pub fn confirm_label(&self) -> &'static str {
        if self.is_deleting() {
            "Deleting..."
        } else {
            "Yes, Delete"
        }
    }

    /// Asks for confirmation. Never touches the network.
    pub fn request_delete(&mut self) -> bool {
        match self.state {
            DeletionState::Idle | DeletionState::Failed(_) => {
                self.state = DeletionState::ConfirmPending;
                true
            }
            DeletionState::ConfirmPending | DeletionState::Deleting(_) | DeletionState::Done => {
                false
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        match self.state {
            DeletionState::ConfirmPending | DeletionState::Failed(_) => {
                self.state = DeletionState::Idle;
                true
            }
            DeletionState::Idle | DeletionState::Deleting(_) | DeletionState::Done => false,
        }
    }

    /// Starts the delete request. A no-op returning `None` unless confirmation is pending
    /// or a previous attempt failed.
    pub fn confirm(&mut self) -> Option<DeleteTicket> {
        if !self.confirm_enabled() {
            tracing::debug!(state = ?self.state, "ignoring delete confirmation");
            return None;
        }

        let token = self.tokens.issue();
        self.state = DeletionState::Deleting(token);
        tracing::debug!(?token, target = ?self.target, "deleting record");
        Some(DeleteTicket {
            token,
            target: self.target,
        })
    }

    pub fn resolve(&mut self, token: RequestToken, outcome: FetchResult<()>) -> bool {
        if self.state != DeletionState::Deleting(token) {
            tracing::debug!(?token, "ignoring stale delete outcome");
            return false;
        }

        self.state = match outcome {
            Ok(()) => DeletionState::Done,
            Err(error) => {
                tracing::warn!(%error, target = ?self.target, "delete request failed");
                DeletionState::Failed(error.user_message(self.fallback_message()))
            }
        };
        true
    }

    fn fallback_message(&self) -> &'static str {
        match self.target.media_kind() {
            MediaKind::Image => "Failed to delete image",
            MediaKind::Video => "Failed to delete video",
        }
    }
}

#[cfg(test)]
mod tests {
    use emoscope_client::{FetchError, ImageId, VideoId};

    use super::*;

    fn not_found() -> FetchError {
        FetchError::ServerError {
            stage: "delete-video",
            status: 404,
            detail: Some("not found".to_string()),
        }
    }

    #[test]
    fn request_then_cancel_returns_to_idle() {
        let mut flow = DeletionFlow::new(DeleteTarget::Video(VideoId::new(1)));
        assert!(!flow.confirm_enabled());
        assert!(flow.request_delete());
        assert!(flow.confirm_enabled());
        assert!(flow.cancel());
        assert_eq!(flow.state(), &DeletionState::Idle);
    }

    #[test]
    fn confirm_without_request_is_a_no_op() {
        let mut flow = DeletionFlow::new(DeleteTarget::Image(ImageId::new(1)));
        assert!(flow.confirm().is_none());
        assert_eq!(flow.state(), &DeletionState::Idle);
    }

    #[test]
    fn second_confirm_while_deleting_issues_nothing() {
        let mut flow = DeletionFlow::new(DeleteTarget::Video(VideoId::new(1)));
        flow.request_delete();
        assert!(flow.confirm().is_some());
        assert!(flow.confirm().is_none());
        assert!(!flow.confirm_enabled());
        assert!(!flow.cancel());
        assert_eq!(flow.confirm_label(), "Deleting...");
    }

    #[test]
    fn not_found_is_retryable() {
        let mut flow = DeletionFlow::new(DeleteTarget::Video(VideoId::new(1)));
        flow.request_delete();
        let ticket = flow.confirm().unwrap();

        assert!(flow.resolve(ticket.token, Err(not_found())));
        assert_eq!(flow.error(), Some("not found"));
        assert!(!flow.is_done());
        assert!(flow.confirm_enabled());

        let retry = flow.confirm().unwrap();
        assert_ne!(retry.token, ticket.token);
        assert!(flow.resolve(retry.token, Ok(())));
        assert!(flow.is_done());
    }

    #[test]
    fn failure_without_detail_uses_media_fallback() {
        let mut flow = DeletionFlow::new(DeleteTarget::Image(ImageId::new(3)));
        flow.request_delete();
        let ticket = flow.confirm().unwrap();
        flow.resolve(
            ticket.token,
            Err(FetchError::ServerError {
                stage: "delete-image",
                status: 500,
                detail: None,
            }),
        );
        assert_eq!(flow.error(), Some("Failed to delete image"));
        assert!(flow.cancel());
    }

    #[test]
    fn outcome_for_a_superseded_attempt_is_ignored() {
        let mut flow = DeletionFlow::new(DeleteTarget::Video(VideoId::new(1)));
        flow.request_delete();
        let first = flow.confirm().unwrap();
        flow.resolve(first.token, Err(not_found()));
        let second = flow.confirm().unwrap();

        assert!(!flow.resolve(first.token, Ok(())));
        assert!(flow.is_deleting());
        assert!(flow.resolve(second.token, Ok(())));
    }
}

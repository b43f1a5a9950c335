/// Identifier for one issued network request.
///
/// Every state machine issues a fresh token per request and accepts an
/// outcome only while it still waits on that exact token, so a late response
/// to an abandoned request is dropped instead of overwriting newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Monotonic token source owned by a single state slice.
#[derive(Debug, Default)]
pub struct RequestTokens {
    last: u64,
}

impl RequestTokens {
    pub fn issue(&mut self) -> RequestToken {
        self.last += 1;
        RequestToken::new(self.last)
    }
}

/// Three-way state of a fetch-backed view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Ready(_) => None,
        }
    }
}

/// Session state definitions for tracking a browser session's lifecycle
///
/// A session moves through
/// `Closed -> Launching -> Open -> Navigating -> (Navigated | NavigationFailed)
/// -> Capturing -> (Captured | CaptureFailed) -> Closing -> Closed`.
/// `Closing` may be entered from every state except `Closed`.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a browser session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No browser process exists
    Closed,

    /// Browser process is starting
    Launching,

    /// Browser is running with a blank page
    Open,

    /// Page is loading
    Navigating,

    // ===== Navigation outcomes =====
    /// Page loaded and its metadata was read
    Navigated,

    /// Page failed to load
    NavigationFailed,

    /// Screenshot in progress
    Capturing,

    // ===== Capture outcomes =====
    /// Screenshot taken
    Captured,

    /// Screenshot failed
    CaptureFailed,

    /// Browser process is shutting down
    Closing,
}

impl SessionState {
    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// Closing is allowed from any state except `Closed`; every other
    /// transition follows the linear lifecycle.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        if next == Closing {
            return *self != Closed;
        }

        matches!(
            (self, next),
            (Closed, Launching)
                | (Launching, Open)
                | (Open, Navigating)
                | (Navigating, Navigated)
                | (Navigating, NavigationFailed)
                | (Navigated, Capturing)
                | (Capturing, Captured)
                | (Capturing, CaptureFailed)
                | (Closing, Closed)
        )
    }

    /// Moves to `next` if the transition is allowed
    ///
    /// Returns the previous state on success, or the unchanged current state
    /// when the transition is rejected.
    pub fn advance(&mut self, next: SessionState) -> Result<SessionState, SessionState> {
        if self.can_transition_to(next) {
            Ok(std::mem::replace(self, next))
        } else {
            Err(*self)
        }
    }

    /// Returns true while a browser process may be alive
    pub fn holds_browser(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Returns true while a stage is in progress
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Launching | Self::Navigating | Self::Capturing | Self::Closing
        )
    }

    /// Returns true if a stage ended in failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::NavigationFailed | Self::CaptureFailed)
    }

    /// Returns true if the page has been loaded successfully
    pub fn has_page(&self) -> bool {
        matches!(
            self,
            Self::Navigated | Self::Capturing | Self::Captured | Self::CaptureFailed
        )
    }

    /// Returns the string representation used in logs and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Launching => "launching",
            Self::Open => "open",
            Self::Navigating => "navigating",
            Self::Navigated => "navigated",
            Self::NavigationFailed => "navigation_failed",
            Self::Capturing => "capturing",
            Self::Captured => "captured",
            Self::CaptureFailed => "capture_failed",
            Self::Closing => "closing",
        }
    }

    /// Parses a session state from its string representation
    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::all_states().into_iter().find(|state| state.as_str() == s)
    }

    /// Returns all possible session states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Closed,
            Self::Launching,
            Self::Open,
            Self::Navigating,
            Self::Navigated,
            Self::NavigationFailed,
            Self::Capturing,
            Self::Captured,
            Self::CaptureFailed,
            Self::Closing,
        ]
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

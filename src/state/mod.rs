//! State module for tracking browser session progress
//!
//! # Components
//!
//! - `SessionState`: lifecycle of one browser session (launch, navigate,
//!   capture, close) with the allowed transitions between stages

mod session_state;

// Re-export main types
pub use session_state::SessionState;

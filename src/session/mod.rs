//! Navigation session
//!
//! One session owns exactly one browser process for one crawl attempt.
//!
//! # Components
//!
//! - `SessionLauncher` / `BrowserSession`: the driver seam used by the crawler
//! - `ChromiumLauncher` / `ChromiumSession`: headless Chromium over CDP
//! - `SessionGuard`: scoped ownership that releases the browser on every exit path
//! - `parse_page`: anchor and title extraction from the rendered HTML

mod chromium;
mod guard;
mod parser;
mod traits;

pub use chromium::{ChromiumLauncher, ChromiumSession};
pub use guard::SessionGuard;
pub use parser::{parse_page, ParsedPage};
pub use traits::{BrowserSession, NavigationOutcome, SessionLauncher};

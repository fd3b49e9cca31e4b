//! Thumbnail pipeline
//!
//! Turns a raw full-page capture into a fixed-size PNG thumbnail and stores
//! both under the public image directory.
//!
//! # Components
//!
//! - `resize_contain`: aspect-preserving fit into a transparent target box
//! - `ImageStore`: unique artifact naming and file placement

mod resize;
mod store;

pub use resize::{resize_contain, resize_contain_blocking};
pub use store::{ArtifactId, ImageStore};

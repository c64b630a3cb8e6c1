//! Chat-bubble meme renderer.
//!
//! Composes quoted chat messages into image cards: a circular avatar, a
//! skewed level badge, the member's name and a rounded speech bubble,
//! rendered to JPEG for single frames or stitched vertically into one
//! PNG for batches.

pub mod assets;
pub mod badge;
pub mod bubble;
pub mod emoji;
pub mod fonts;
pub mod pixel_face;
pub mod raster;
pub mod renderer;
pub mod schema;
pub mod text;
pub mod wrap;

pub use renderer::MemeRenderer;
pub use schema::{RenderRequest, Role};

//! Resource directory layout and sprite loading.
//!
//! The renderer reads at most six files from one fixed resources
//! directory: two font weights under `fonts/` and four optional corner
//! sprites at the root. Absence of any of them is never an error here;
//! the consumers fall back per their own rules.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::debug;

pub const FONT_REGULAR_FILE: &str = "fonts/NotoSansSC-Regular.ttf";
pub const FONT_BOLD_FILE: &str = "fonts/NotoSansSC-Bold.ttf";
pub const CORNER_FILES: [&str; 4] = ["corner1.png", "corner2.png", "corner3.png", "corner4.png"];

#[derive(Debug, Clone)]
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn font_regular_path(&self) -> PathBuf {
        self.root.join(FONT_REGULAR_FILE)
    }

    pub fn font_bold_path(&self) -> PathBuf {
        self.root.join(FONT_BOLD_FILE)
    }

    /// Loads the four bubble corner sprites in order (top-left,
    /// bottom-left, top-right, bottom-right). Returns `None` when any of
    /// them is missing or undecodable; the bubble then takes its vector
    /// fallback path.
    pub fn corner_sprites(&self) -> Option<[RgbaImage; 4]> {
        let mut sprites = Vec::with_capacity(CORNER_FILES.len());
        for name in CORNER_FILES {
            let path = self.root.join(name);
            let image = match image::open(&path) {
                Ok(decoded) => decoded.to_rgba8(),
                Err(error) => {
                    debug!(path = %path.display(), %error, "corner sprite unavailable");
                    return None;
                }
            };
            sprites.push(image);
        }
        sprites.try_into().ok()
    }
}

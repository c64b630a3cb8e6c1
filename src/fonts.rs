use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fontdue::{Font, FontSettings};
use tracing::debug;

use crate::pixel_face;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Measured ink bounding box of a string plus the font-wide vertical
/// metrics, all in integer pixels. `left`/`top`/`right`/`bottom` are
/// relative to the text origin (left edge, top of ascender); a string with
/// no visible ink measures as an empty box at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub ascent: i32,
    pub descent: i32,
}

impl GlyphMetrics {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn line_height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// One rasterized glyph ready for coverage blending. Offsets are relative
/// to the draw origin (pen x, line top).
pub struct RasterGlyph {
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
    pub advance: f32,
}

enum Face {
    Parsed(Font),
    Builtin,
}

/// An opaque typeface loaded at a fixed pixel size and weight. Immutable
/// after load; safe to share across threads.
pub struct FontHandle {
    size: u32,
    face: Face,
}

impl FontHandle {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.face, Face::Builtin)
    }

    fn builtin_scale(&self) -> u32 {
        ((self.size as f32 / 8.0).round() as u32).max(1)
    }

    fn line_metrics(&self) -> (i32, i32) {
        match &self.face {
            Face::Parsed(font) => match font.horizontal_line_metrics(self.size as f32) {
                Some(lm) => (lm.ascent.round() as i32, (-lm.descent).round() as i32),
                // Backend gave no vertical metrics; approximate rather
                // than fail.
                None => {
                    let ascent = (self.size as f32 * 0.8).round() as i32;
                    (ascent, self.size as i32 - ascent)
                }
            },
            Face::Builtin => {
                let scale = self.builtin_scale() as i32;
                (pixel_face::GLYPH_HEIGHT as i32 * scale, scale)
            }
        }
    }

    pub fn ascent(&self) -> i32 {
        self.line_metrics().0
    }

    pub fn descent(&self) -> i32 {
        self.line_metrics().1
    }

    /// Horizontal advance of a single space glyph.
    pub fn space_advance(&self) -> f32 {
        match &self.face {
            Face::Parsed(font) => font.metrics(' ', self.size as f32).advance_width,
            Face::Builtin => (pixel_face::CELL_ADVANCE * self.builtin_scale()) as f32,
        }
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        match &self.face {
            Face::Parsed(font) => font.lookup_glyph_index(ch) != 0,
            Face::Builtin => ch.is_ascii() && !ch.is_ascii_control(),
        }
    }

    /// Measures the ink bounding box of `text`. Codepoints the backend has
    /// no box for (unknown glyphs, whitespace) contribute only their
    /// advance, never an error.
    pub fn measure(&self, text: &str) -> GlyphMetrics {
        let (ascent, descent) = self.line_metrics();
        let mut pen = 0.0_f32;
        let mut ink: Option<(f32, f32, f32, f32)> = None;

        for ch in text.chars() {
            match &self.face {
                Face::Parsed(font) => {
                    let m = font.metrics(ch, self.size as f32);
                    if m.width > 0 && m.height > 0 {
                        let left = pen + m.xmin as f32;
                        let top = ascent as f32 - (m.ymin + m.height as i32) as f32;
                        let right = left + m.width as f32;
                        let bottom = ascent as f32 - m.ymin as f32;
                        ink = Some(merge(ink, (left, top, right, bottom)));
                    }
                    pen += m.advance_width;
                }
                Face::Builtin => {
                    let scale = self.builtin_scale() as f32;
                    if let Some((l, t, r, b)) = pixel_face::ink_bounds(ch) {
                        let left = pen + l as f32 * scale;
                        let top = t as f32 * scale;
                        let right = pen + r as f32 * scale;
                        let bottom = b as f32 * scale;
                        ink = Some(merge(ink, (left, top, right, bottom)));
                    }
                    pen += (pixel_face::advance(ch) * self.builtin_scale()) as f32;
                }
            }
        }

        match ink {
            Some((left, top, right, bottom)) => GlyphMetrics {
                left: left.floor() as i32,
                top: top.floor() as i32,
                right: right.ceil() as i32,
                bottom: bottom.ceil() as i32,
                ascent,
                descent,
            },
            None => GlyphMetrics {
                left: 0,
                top: 0,
                right: 0,
                bottom: 0,
                ascent,
                descent,
            },
        }
    }

    /// Rasterizes one glyph to an 8-bit coverage bitmap.
    pub fn rasterize(&self, ch: char) -> RasterGlyph {
        match &self.face {
            Face::Parsed(font) => {
                let (m, coverage) = font.rasterize(ch, self.size as f32);
                let ascent = self.ascent();
                RasterGlyph {
                    x_offset: m.xmin,
                    y_offset: ascent - (m.ymin + m.height as i32),
                    width: m.width,
                    height: m.height,
                    coverage,
                    advance: m.advance_width,
                }
            }
            Face::Builtin => {
                let scale = self.builtin_scale();
                let cell_w = pixel_face::advance(ch) - 1;
                let width = (cell_w * scale) as usize;
                let height = (pixel_face::GLYPH_HEIGHT * scale) as usize;
                let mut coverage = vec![0_u8; width * height];
                for y in 0..height {
                    for x in 0..width {
                        let sx = x as u32 / scale;
                        let sy = y as u32 / scale;
                        if pixel_face::sample(ch, sx, sy) {
                            coverage[y * width + x] = 255;
                        }
                    }
                }
                RasterGlyph {
                    x_offset: 0,
                    y_offset: 0,
                    width,
                    height,
                    coverage,
                    advance: (pixel_face::advance(ch) * scale) as f32,
                }
            }
        }
    }
}

fn merge(
    acc: Option<(f32, f32, f32, f32)>,
    next: (f32, f32, f32, f32),
) -> (f32, f32, f32, f32) {
    match acc {
        None => next,
        Some((l, t, r, b)) => (
            l.min(next.0),
            t.min(next.1),
            r.max(next.2),
            b.max(next.3),
        ),
    }
}

/// Layered font resolver. Resolution order: requested-weight asset,
/// opposite-weight asset, built-in pixel face. File and parse errors are
/// swallowed; loading never fails. Handles are memoized per (size, weight)
/// for the lifetime of the library.
pub struct FontLibrary {
    regular_path: PathBuf,
    bold_path: PathBuf,
    cache: Mutex<HashMap<(u32, FontWeight), Arc<FontHandle>>>,
}

impl FontLibrary {
    pub fn new(regular_path: PathBuf, bold_path: PathBuf) -> Self {
        Self {
            regular_path,
            bold_path,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn load(&self, size: u32, weight: FontWeight) -> Arc<FontHandle> {
        // The cache is append-only, so a panic while holding the lock
        // cannot leave it inconsistent; recover the guard.
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = cache.get(&(size, weight)) {
            return Arc::clone(handle);
        }

        let (wanted, other) = match weight {
            FontWeight::Regular => (&self.regular_path, &self.bold_path),
            FontWeight::Bold => (&self.bold_path, &self.regular_path),
        };

        let face = try_parse(wanted)
            .or_else(|| {
                debug!(path = %wanted.display(), "font asset unavailable, trying opposite weight");
                try_parse(other)
            })
            .map(Face::Parsed)
            .unwrap_or_else(|| {
                debug!("no font assets available, using built-in pixel face");
                Face::Builtin
            });

        let handle = Arc::new(FontHandle { size, face });
        cache.insert((size, weight), Arc::clone(&handle));
        handle
    }
}

fn try_parse(path: &Path) -> Option<Font> {
    let bytes = fs::read(path).ok()?;
    Font::from_bytes(bytes, FontSettings::default()).ok()
}

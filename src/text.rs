//! Text drawing over RGBA canvases.
//!
//! Two drawers implement the same trait: `EmojiAwareDrawer` nudges emoji
//! glyphs down so they sit on the surrounding baseline, `PlainDrawer`
//! treats every codepoint alike. Which one a renderer uses is decided
//! once, from a capability probe of the resolved body font, not per call.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::emoji::is_emoji;
use crate::fonts::FontHandle;
use crate::raster::blend_coverage;

/// Codepoints probed to decide whether a font can place emoji at all.
const EMOJI_PROBES: [char; 3] = ['😀', '🚀', '⭐'];

pub trait TextDraw: Send + Sync {
    /// Draws one line of `text` with its origin (left edge, top of
    /// ascender) at (x, y). `emoji_offset` is the extra downward shift,
    /// in pixels, applied to emoji glyphs by drawers that care.
    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        text: &str,
        font: &FontHandle,
        color: Rgba<u8>,
        emoji_offset: i32,
    );
}

pub struct PlainDrawer;

impl TextDraw for PlainDrawer {
    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        text: &str,
        font: &FontHandle,
        color: Rgba<u8>,
        _emoji_offset: i32,
    ) {
        draw_glyph_run(canvas, x, y, text, font, color, 0);
    }
}

pub struct EmojiAwareDrawer;

impl TextDraw for EmojiAwareDrawer {
    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        text: &str,
        font: &FontHandle,
        color: Rgba<u8>,
        emoji_offset: i32,
    ) {
        draw_glyph_run(canvas, x, y, text, font, color, emoji_offset);
    }
}

fn draw_glyph_run(
    canvas: &mut RgbaImage,
    x: i32,
    y: i32,
    text: &str,
    font: &FontHandle,
    color: Rgba<u8>,
    emoji_offset: i32,
) {
    let mut pen = x as f32;
    for ch in text.chars() {
        let glyph = font.rasterize(ch);
        if glyph.width > 0 && glyph.height > 0 {
            let dy = if emoji_offset != 0 && is_emoji(ch) {
                emoji_offset
            } else {
                0
            };
            blend_coverage(
                canvas,
                pen.round() as i32 + glyph.x_offset,
                y + glyph.y_offset + dy,
                glyph.width,
                glyph.height,
                &glyph.coverage,
                color,
            );
        }
        pen += glyph.advance;
    }
}

/// Picks the drawer once for a renderer: emoji-aware when the resolved
/// font actually maps emoji codepoints, plain otherwise.
pub fn select_drawer(probe: &FontHandle) -> Box<dyn TextDraw> {
    let emoji_capable = EMOJI_PROBES.iter().any(|&ch| probe.has_glyph(ch));
    if emoji_capable {
        debug!("text drawer: emoji-aware");
        Box::new(EmojiAwareDrawer)
    } else {
        debug!("text drawer: plain");
        Box::new(PlainDrawer)
    }
}

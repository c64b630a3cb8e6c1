//! Speech bubble construction.
//!
//! The bubble is normally composed from four corner sprites plus two
//! overlapping fill rectangles, which produces a seamless rounded box
//! without redrawing the corners. When any sprite is missing the whole
//! box is drawn as one vector rounded rectangle of the same measured
//! dimensions instead.

use anyhow::Result;
use image::{Rgba, RgbaImage};

use crate::assets::Resources;
use crate::emoji::pad_emojis;
use crate::fonts::{FontHandle, FontLibrary, FontWeight};
use crate::raster::{copy_pixels, fill_rect, fill_rounded_rect};
use crate::text::TextDraw;
use crate::wrap::wrap_text;

pub const BODY_FONT_SIZE: u32 = 55;
pub const MAX_TEXT_WIDTH: i32 = 900;
const LINE_SPACING: i32 = 4;
const TEXT_INSET_X: i32 = 65;
/// box width = text width + this.
const H_PADDING: i32 = 130;
/// box height = max(text height + 103, 150).
const V_PADDING: i32 = 103;
const MIN_BOX_HEIGHT: i32 = 150;
/// Bottom corner sprites sit this far above the bottom edge.
const CORNER_BOTTOM_OFFSET: i64 = 75;
/// Right corner sprites sit this far left of the right edge.
const CORNER_RIGHT_OFFSET: i64 = 70;
const FALLBACK_RADIUS: f32 = 20.0;

const BUBBLE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

struct BodyLayout {
    lines: Vec<String>,
    text_width: i32,
    text_height: i32,
    line_height: i32,
}

fn layout_body(text: &str, font: &FontHandle) -> BodyLayout {
    let lines = wrap_text(&pad_emojis(text), font, MAX_TEXT_WIDTH);
    let line_height = font.ascent() + font.descent();

    let mut text_width = 0;
    let mut text_height = 0;
    for line in &lines {
        text_width = text_width.max(font.measure(line).width());
        text_height += line_height + LINE_SPACING;
    }
    if !lines.is_empty() {
        text_height -= LINE_SPACING;
    }

    BodyLayout {
        lines,
        text_width,
        text_height,
        line_height,
    }
}

/// Builds the rounded dialog box containing `text`, wrapped at the fixed
/// maximum width and vertically centered.
pub fn build_bubble(
    text: &str,
    fonts: &FontLibrary,
    resources: &Resources,
    drawer: &dyn TextDraw,
) -> Result<RgbaImage> {
    let font = fonts.load(BODY_FONT_SIZE, FontWeight::Regular);
    let body = layout_body(text, &font);

    let box_w = (body.text_width + H_PADDING) as u32;
    let box_h = (body.text_height + V_PADDING).max(MIN_BOX_HEIGHT) as u32;

    let mut box_img = match resources.corner_sprites() {
        Some([top_left, bottom_left, top_right, bottom_right]) => {
            let mut img = RgbaImage::new(box_w, box_h);
            let right = i64::from(box_w) - CORNER_RIGHT_OFFSET;
            let bottom = i64::from(box_h) - CORNER_BOTTOM_OFFSET;
            copy_pixels(&mut img, &top_left, 0, 0);
            copy_pixels(&mut img, &bottom_left, 0, bottom);
            copy_pixels(&mut img, &top_right, right, 0);
            copy_pixels(&mut img, &bottom_right, right, bottom);
            fill_rect(
                &mut img,
                65,
                20,
                i64::from(box_w) - 65,
                i64::from(box_h) - 20,
                BUBBLE_FILL,
            );
            fill_rect(
                &mut img,
                26,
                75,
                i64::from(box_w) - 26,
                i64::from(box_h) - 75,
                BUBBLE_FILL,
            );
            img
        }
        None => fill_rounded_rect(box_w, box_h, FALLBACK_RADIUS, BUBBLE_FILL)?,
    };

    let start_y = 17 + (box_h as i32 - 40 - body.text_height) / 2;
    let emoji_offset = ((font.descent() as f32 * 0.9) as i32).max(1);

    let mut y = start_y;
    for line in &body.lines {
        drawer.draw_line(
            &mut box_img,
            TEXT_INSET_X,
            y,
            line,
            &font,
            TEXT_FILL,
            emoji_offset,
        );
        y += body.line_height + LINE_SPACING;
    }

    Ok(box_img)
}

#[cfg(test)]
mod tests {
    use super::{build_bubble, layout_body, H_PADDING, MIN_BOX_HEIGHT};
    use crate::assets::Resources;
    use crate::fonts::{FontLibrary, FontWeight};
    use crate::text::PlainDrawer;
    use image::{Rgba, RgbaImage};

    fn builtin_fonts() -> FontLibrary {
        FontLibrary::new(
            "/nonexistent/regular.ttf".into(),
            "/nonexistent/bold.ttf".into(),
        )
    }

    #[test]
    fn short_text_gets_minimum_height() {
        let fonts = builtin_fonts();
        let resources = Resources::new("/nonexistent/resources");
        let bubble = build_bubble("hi", &fonts, &resources, &PlainDrawer).expect("bubble");
        assert_eq!(bubble.height() as i32, MIN_BOX_HEIGHT.max(
            layout_body("hi", &fonts.load(super::BODY_FONT_SIZE, FontWeight::Regular)).text_height
                + super::V_PADDING,
        ));
        assert!(bubble.height() as i32 >= MIN_BOX_HEIGHT);
    }

    #[test]
    fn box_width_is_text_width_plus_padding() {
        let fonts = builtin_fonts();
        let resources = Resources::new("/nonexistent/resources");
        let font = fonts.load(super::BODY_FONT_SIZE, FontWeight::Regular);
        let body = layout_body("measured line", &font);
        let bubble =
            build_bubble("measured line", &fonts, &resources, &PlainDrawer).expect("bubble");
        assert_eq!(bubble.width() as i32, body.text_width + H_PADDING);
    }

    #[test]
    fn sprite_and_fallback_paths_produce_equal_dimensions() {
        let fonts = builtin_fonts();
        let tmp = tempfile::tempdir().expect("tempdir");
        let sprite = RgbaImage::from_pixel(70, 75, Rgba([250, 250, 250, 255]));
        for name in crate::assets::CORNER_FILES {
            sprite.save(tmp.path().join(name)).expect("write sprite");
        }

        let with_sprites = Resources::new(tmp.path());
        let without_sprites = Resources::new("/nonexistent/resources");
        let text = "same text in both\nworlds";

        let sprite_bubble =
            build_bubble(text, &fonts, &with_sprites, &PlainDrawer).expect("sprite bubble");
        let vector_bubble =
            build_bubble(text, &fonts, &without_sprites, &PlainDrawer).expect("vector bubble");
        assert_eq!(sprite_bubble.dimensions(), vector_bubble.dimensions());
    }

    #[test]
    fn blank_source_line_adds_height() {
        let fonts = builtin_fonts();
        let resources = Resources::new("/nonexistent/resources");
        let single = build_bubble("top\nbottom", &fonts, &resources, &PlainDrawer).expect("bubble");
        let spaced =
            build_bubble("top\n\nbottom", &fonts, &resources, &PlainDrawer).expect("bubble");
        assert!(spaced.height() > single.height());
    }
}

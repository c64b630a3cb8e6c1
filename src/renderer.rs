//! Frame composition and image encoding.
//!
//! `MemeRenderer` owns the resource directory, the font cache and the
//! text drawer picked at construction. Composition is infallible-by-
//! policy at the outer API: `render_frame` and `render_stitched` absorb
//! errors into `None` after logging, so callers can degrade to plain
//! text without matching on error types.

use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tracing::warn;

use crate::assets::Resources;
use crate::badge::build_badge;
use crate::bubble::{build_bubble, BODY_FONT_SIZE};
use crate::fonts::{FontLibrary, FontWeight};
use crate::raster::{circle_alpha_mask, flatten_to_rgb, paste_over};
use crate::schema::RenderRequest;
use crate::text::{select_drawer, TextDraw};

const CANVAS_BG: Rgba<u8> = Rgba([0xea, 0xed, 0xf4, 0xff]);
const CANVAS_BG_RGB: Rgb<u8> = Rgb([0xea, 0xed, 0xf4]);
const NAME_COLOR: Rgba<u8> = Rgba([0x86, 0x88, 0x94, 0xff]);
const NAME_FONT_SIZE: u32 = 35;

const AVATAR_SIZE: u32 = 135;
const AVATAR_POS: (i64, i64) = (20, 20);
const BADGE_POS: (i64, i64) = (195, 25);
const BUBBLE_POS: (i64, i64) = (165, 82);
/// Gap between the badge's right edge and the name.
const NAME_GAP: i32 = 10;
/// Vertical band, below the 20px top margin, the name centers in.
const NAME_BAND: i32 = 35;
const RIGHT_MARGIN: i32 = 50;
const BOTTOM_EXTRA: u32 = 110;

const JPEG_QUALITY: u8 = 90;

pub struct MemeRenderer {
    resources: Resources,
    fonts: FontLibrary,
    drawer: Box<dyn TextDraw>,
}

impl MemeRenderer {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        let resources = Resources::new(resources_dir);
        let fonts = FontLibrary::new(resources.font_regular_path(), resources.font_bold_path());
        let drawer = select_drawer(&fonts.load(BODY_FONT_SIZE, FontWeight::Regular));
        Self {
            resources,
            fonts,
            drawer,
        }
    }

    fn decode_avatar(&self, bytes: &[u8]) -> RgbaImage {
        match image::load_from_memory(bytes) {
            Ok(decoded) => imageops::resize(
                &decoded.to_rgba8(),
                AVATAR_SIZE,
                AVATAR_SIZE,
                FilterType::CatmullRom,
            ),
            Err(error) => {
                warn!(%error, "avatar undecodable, using placeholder disc");
                RgbaImage::from_pixel(AVATAR_SIZE, AVATAR_SIZE, Rgba([128, 128, 128, 255]))
            }
        }
    }

    /// Composes one flattened RGB frame: circular avatar, badge, name
    /// line and speech bubble over the pale background. Canvas width
    /// follows whichever of the name line or the bubble reaches further
    /// right.
    pub fn compose_frame(&self, request: &RenderRequest) -> Result<RgbImage> {
        if request.body_text.is_empty() {
            bail!("nothing to render: empty message text");
        }

        let mut avatar = self.decode_avatar(&request.avatar);
        circle_alpha_mask(&mut avatar);

        let badge = build_badge(
            request.level,
            request.title.as_deref(),
            request.role,
            &self.fonts,
            self.drawer.as_ref(),
        )
        .context("building level badge")?;
        let bubble = build_bubble(
            &request.body_text,
            &self.fonts,
            &self.resources,
            self.drawer.as_ref(),
        )
        .context("building speech bubble")?;

        let name_font = self.fonts.load(NAME_FONT_SIZE, FontWeight::Regular);
        let name_metrics = name_font.measure(&request.display_name);
        let name_x = BADGE_POS.0 as i32 + badge.width() as i32 + NAME_GAP;
        let name_end = name_x + name_metrics.width();
        let bubble_end = BUBBLE_POS.0 as i32 + bubble.width() as i32;

        let canvas_w = (name_end.max(bubble_end) + RIGHT_MARGIN) as u32;
        let canvas_h = bubble.height() + BOTTOM_EXTRA;
        let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, CANVAS_BG);

        paste_over(&mut canvas, &avatar, AVATAR_POS.0, AVATAR_POS.1);
        paste_over(&mut canvas, &bubble, BUBBLE_POS.0, BUBBLE_POS.1);
        paste_over(&mut canvas, &badge, BADGE_POS.0, BADGE_POS.1);

        let name_y = 20 + (NAME_BAND - name_metrics.height()) / 2;
        let emoji_offset = ((name_font.descent() as f32 * 0.6) as i32).max(1);
        self.drawer.draw_line(
            &mut canvas,
            name_x,
            name_y,
            &request.display_name,
            &name_font,
            NAME_COLOR,
            emoji_offset,
        );

        Ok(flatten_to_rgb(&canvas, CANVAS_BG_RGB))
    }

    /// Renders one request to JPEG bytes.
    pub fn render_frame(&self, request: &RenderRequest) -> Option<Vec<u8>> {
        match self
            .compose_frame(request)
            .and_then(|frame| encode_jpeg(&frame))
        {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                warn!(name = %request.display_name, "frame render failed: {error:#}");
                None
            }
        }
    }

    /// Renders a batch as one vertically stitched PNG. Requests that
    /// fail to compose are dropped with a warning; `None` means nothing
    /// survived.
    pub fn render_stitched(&self, requests: &[RenderRequest]) -> Option<Vec<u8>> {
        let mut frames = Vec::new();
        for request in requests {
            match self.compose_frame(request) {
                Ok(frame) => frames.push(frame),
                Err(error) => {
                    warn!(name = %request.display_name, "dropping frame from batch: {error:#}");
                }
            }
        }
        if frames.is_empty() {
            warn!("batch produced no frames");
            return None;
        }

        let sheet_w = frames.iter().map(|frame| frame.width()).max()?;
        let sheet_h = frames.iter().map(|frame| frame.height()).sum();
        let mut sheet = RgbImage::from_pixel(sheet_w, sheet_h, CANVAS_BG_RGB);
        let mut y = 0i64;
        for frame in &frames {
            imageops::replace(&mut sheet, frame, 0, y);
            y += i64::from(frame.height());
        }
        drop(frames);

        match encode_png(&sheet) {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                warn!("stitched encode failed: {error:#}");
                None
            }
        }
    }
}

fn encode_jpeg(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY);
    frame
        .write_with_encoder(encoder)
        .context("encoding jpeg frame")?;
    Ok(bytes)
}

fn encode_png(sheet: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    sheet
        .write_with_encoder(PngEncoder::new(Cursor::new(&mut bytes)))
        .context("encoding stitched png")?;
    Ok(bytes)
}

//! Pixel primitives shared by the bubble, badge and frame stages.
//!
//! Everything operates on straight-alpha `RgbaImage` buffers. Vector
//! shapes (rounded rectangles) are filled through tiny-skia and converted
//! back to straight alpha.

use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Cubic bezier circle-arc constant: 4/3 * tan(pi/8).
const KAPPA: f32 = 0.552_284_8;

/// Source-over composite of `src` onto `dst` at (x, y), straight alpha.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    for (sx, sy, pixel) in src.enumerate_pixels() {
        let dx = x + i64::from(sx);
        let dy = y + i64::from(sy);
        if dx < 0 || dy < 0 || dx >= i64::from(dst.width()) || dy >= i64::from(dst.height()) {
            continue;
        }
        let out = dst.get_pixel_mut(dx as u32, dy as u32);
        *out = blend(*pixel, *out);
    }
}

/// Copies `src` pixels into `dst` verbatim (alpha included), clipped to
/// the destination bounds.
pub fn copy_pixels(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    for (sx, sy, pixel) in src.enumerate_pixels() {
        let dx = x + i64::from(sx);
        let dy = y + i64::from(sy);
        if dx < 0 || dy < 0 || dx >= i64::from(dst.width()) || dy >= i64::from(dst.height()) {
            continue;
        }
        dst.put_pixel(dx as u32, dy as u32, *pixel);
    }
}

fn blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return src;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0_u8; 4];
    for channel in 0..3 {
        let sc = f32::from(src[channel]);
        let dc = f32::from(dst[channel]);
        out[channel] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

/// Blends an 8-bit coverage bitmap (one glyph) in `color` onto `dst`.
pub fn blend_coverage(
    dst: &mut RgbaImage,
    x: i32,
    y: i32,
    width: usize,
    height: usize,
    coverage: &[u8],
    color: Rgba<u8>,
) {
    for row in 0..height {
        let dy = y + row as i32;
        if dy < 0 || dy >= dst.height() as i32 {
            continue;
        }
        for col in 0..width {
            let dx = x + col as i32;
            if dx < 0 || dx >= dst.width() as i32 {
                continue;
            }
            let mask = coverage[row * width + col];
            if mask == 0 {
                continue;
            }
            let alpha = ((u16::from(mask) * u16::from(color[3])) / 255) as u8;
            let src = Rgba([color[0], color[1], color[2], alpha]);
            let out = dst.get_pixel_mut(dx as u32, dy as u32);
            *out = blend(src, *out);
        }
    }
}

/// Overwrites pixels in the inclusive rectangle (x0, y0)..=(x1, y1).
pub fn fill_rect(dst: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
    let x_start = x0.max(0) as u32;
    let y_start = y0.max(0) as u32;
    let x_end = x1.min(i64::from(dst.width()) - 1);
    let y_end = y1.min(i64::from(dst.height()) - 1);
    if x_end < 0 || y_end < 0 {
        return;
    }
    for y in y_start..=y_end as u32 {
        for x in x_start..=x_end as u32 {
            dst.put_pixel(x, y, color);
        }
    }
}

/// Tight bounding box of all pixels with nonzero alpha, exclusive
/// right/bottom. `None` when the image is fully transparent.
pub fn alpha_bbox(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bbox: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bbox = Some(match bbox {
            None => (x, y, x + 1, y + 1),
            Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
        });
    }
    bbox
}

/// Crops `img` to its tight alpha bounding box; a fully transparent image
/// is returned unchanged.
pub fn crop_to_alpha(img: &RgbaImage) -> RgbaImage {
    match alpha_bbox(img) {
        Some((left, top, right, bottom)) => {
            image::imageops::crop_imm(img, left, top, right - left, bottom - top).to_image()
        }
        None => img.clone(),
    }
}

/// Horizontal shear: output pixel (x, y) samples the source at
/// (x + skew * y, y), bilinear, transparent outside the source. The
/// output is widened by `height * |skew|` so nothing is clipped.
pub fn shear_x(img: &RgbaImage, skew: f32) -> RgbaImage {
    let (width, height) = img.dimensions();
    let new_width = width + (height as f32 * skew.abs()) as u32;
    let mut out = RgbaImage::new(new_width, height);

    for y in 0..height {
        for x in 0..new_width {
            let src_x = x as f32 + skew * y as f32;
            let pixel = sample_bilinear(img, src_x, y as f32);
            out.put_pixel(x, y, pixel);
        }
    }
    out
}

fn sample_bilinear(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (width, height) = img.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let fetch = |ix: f32, iy: f32| -> [f32; 4] {
        if ix < 0.0 || iy < 0.0 || ix >= width as f32 || iy >= height as f32 {
            return [0.0; 4];
        }
        let p = img.get_pixel(ix as u32, iy as u32);
        [
            f32::from(p[0]),
            f32::from(p[1]),
            f32::from(p[2]),
            f32::from(p[3]),
        ]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0_u8; 4];
    for channel in 0..4 {
        let top = p00[channel] * (1.0 - fx) + p10[channel] * fx;
        let bottom = p01[channel] * (1.0 - fx) + p11[channel] * fx;
        out[channel] = (top * (1.0 - fy) + bottom * fy).round() as u8;
    }
    Rgba(out)
}

/// Replaces the alpha channel with a full-canvas ellipse mask so the image
/// renders as a disc. Edge coverage is softened over roughly one pixel.
pub fn circle_alpha_mask(img: &mut RgbaImage) {
    let (width, height) = img.dimensions();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let rx = width as f32 / 2.0;
    let ry = height as f32 / 2.0;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = (x as f32 + 0.5 - cx) / rx;
        let dy = (y as f32 + 0.5 - cy) / ry;
        let dist = (dx * dx + dy * dy).sqrt();
        let edge = rx.min(ry);
        let coverage = ((1.0 - dist) * edge + 0.5).clamp(0.0, 1.0);
        pixel[3] = (coverage * 255.0).round() as u8;
    }
}

fn rounded_rect_path(width: f32, height: f32, radius: f32) -> Option<tiny_skia::Path> {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let k = r * (1.0 - KAPPA);
    let mut pb = PathBuilder::new();

    pb.move_to(r, 0.0);
    pb.line_to(width - r, 0.0);
    pb.cubic_to(width - k, 0.0, width, k, width, r);
    pb.line_to(width, height - r);
    pb.cubic_to(width, height - k, width - k, height, width - r, height);
    pb.line_to(r, height);
    pb.cubic_to(k, height, 0.0, height - k, 0.0, height - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, k, k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

/// Fills a width x height rounded rectangle in `color` on a transparent
/// canvas, anti-aliased.
pub fn fill_rounded_rect(width: u32, height: u32, radius: f32, color: Rgba<u8>) -> Result<RgbaImage> {
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("invalid rounded rect dimensions {width}x{height}"))?;
    let path = rounded_rect_path(width as f32, height as f32, radius)
        .context("failed to build rounded rect path")?;

    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    let mut out = RgbaImage::new(width, height);
    for (pixel, premul) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = premul.demultiply();
        *pixel = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(out)
}

/// Drops the alpha channel by compositing over a solid background.
pub fn flatten_to_rgb(img: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let a = f32::from(pixel[3]) / 255.0;
        let mut flat = [0_u8; 3];
        for channel in 0..3 {
            let src = f32::from(pixel[channel]);
            let bg = f32::from(background[channel]);
            flat[channel] = (src * a + bg * (1.0 - a)).round() as u8;
        }
        out.put_pixel(x, y, Rgb(flat));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        alpha_bbox, circle_alpha_mask, crop_to_alpha, fill_rect, fill_rounded_rect, paste_over,
        shear_x,
    };
    use image::{Rgba, RgbaImage};

    #[test]
    fn alpha_bbox_finds_tight_bounds() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(3, 4, Rgba([255, 0, 0, 255]));
        img.put_pixel(6, 7, Rgba([255, 0, 0, 128]));
        assert_eq!(alpha_bbox(&img), Some((3, 4, 7, 8)));

        let cropped = crop_to_alpha(&img);
        assert_eq!(cropped.dimensions(), (4, 4));
    }

    #[test]
    fn alpha_bbox_of_transparent_image_is_none() {
        let img = RgbaImage::new(4, 4);
        assert_eq!(alpha_bbox(&img), None);
        assert_eq!(crop_to_alpha(&img).dimensions(), (4, 4));
    }

    #[test]
    fn shear_widens_by_height_times_skew() {
        let img = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]));
        let sheared = shear_x(&img, 0.1);
        assert_eq!(sheared.width(), 40 + 2);
        assert_eq!(sheared.height(), 20);
    }

    #[test]
    fn circle_mask_clears_corners_and_keeps_center() {
        let mut img = RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 255]));
        circle_alpha_mask(&mut img);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(31, 31)[3], 0);
        assert_eq!(img.get_pixel(16, 16)[3], 255);
    }

    #[test]
    fn rounded_rect_fills_center_and_rounds_corners() {
        let color = Rgba([200, 100, 50, 255]);
        let rect = fill_rounded_rect(60, 40, 12.0, color).expect("fill");
        assert_eq!(*rect.get_pixel(30, 20), color);
        assert_eq!(rect.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn paste_over_respects_source_alpha() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let mut src = RgbaImage::new(2, 2);
        src.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        // (1, 0) stays transparent.
        paste_over(&mut dst, &src, 1, 1);
        assert_eq!(*dst.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
        assert_eq!(*dst.get_pixel(2, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn fill_rect_is_inclusive_and_clipped() {
        let mut img = RgbaImage::new(8, 8);
        fill_rect(&mut img, 2, 2, 5, 5, Rgba([1, 2, 3, 255]));
        assert_eq!(*img.get_pixel(5, 5), Rgba([1, 2, 3, 255]));
        assert_eq!(img.get_pixel(6, 6)[3], 0);
        // Out-of-range coordinates must not panic.
        fill_rect(&mut img, -5, -5, 20, 20, Rgba([9, 9, 9, 255]));
        assert_eq!(*img.get_pixel(0, 0), Rgba([9, 9, 9, 255]));
    }
}

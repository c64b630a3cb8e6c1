//! Skewed level badge construction.
//!
//! The badge is a rounded pill carrying an italicized "LV<number>" glyph
//! group and, when one resolves, a title label. The level glyphs are
//! drawn upright on a padded scratch canvas, sheared horizontally, then
//! cropped to their ink so the slant never clips.

use anyhow::Result;
use image::{Rgba, RgbaImage};

use crate::fonts::{FontLibrary, FontWeight};
use crate::raster::{crop_to_alpha, fill_rounded_rect, paste_over, shear_x};
use crate::schema::Role;
use crate::text::{PlainDrawer, TextDraw};

pub const MEMBER_BG: Rgba<u8> = Rgba([0x9d, 0xb2, 0xe0, 0xff]);
pub const OWNER_BG: Rgba<u8> = Rgba([0xfd, 0xd9, 0x3f, 0xff]);
pub const ADMIN_BG: Rgba<u8> = Rgba([0x3f, 0xe3, 0xd8, 0xff]);
pub const CUSTOM_TITLE_BG: Rgba<u8> = Rgba([0xd3, 0x8f, 0xfe, 0xff]);

const TITLE_FONT_SIZE: u32 = 32;
const LEVEL_NUMBER_SIZE: u32 = 32;
const LEVEL_PREFIX_SIZE: u32 = 28;
const LEVEL_SKEW: f32 = 0.1;
/// Gap between the "LV" prefix and the number, upright pixels.
const PREFIX_GAP: i32 = 4;
/// Scratch margin around the level glyphs so the shear has room.
const SCRATCH_MARGIN: i32 = 40;
const PAD_X: i32 = 14;
const PAD_Y: i32 = 10;
const PILL_RADIUS: f32 = 12.0;

const GLYPH_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Resolves the badge title. An explicit non-empty title always wins;
/// otherwise owners and admins get their fixed labels and plain members
/// get a rank band from their level. Level 0 members have no title.
pub fn resolve_title(role: Role, explicit: Option<&str>, level: u32) -> Option<String> {
    if let Some(title) = explicit {
        if !title.is_empty() {
            return Some(title.to_owned());
        }
    }
    let band = match role {
        Role::Owner => "群主",
        Role::Admin => "管理员",
        Role::Member => match level {
            0 => return None,
            1..=10 => "青铜",
            11..=20 => "白银",
            21..=40 => "黄金",
            41..=60 => "铂金",
            61..=80 => "钻石",
            _ => "王者",
        },
    };
    Some(band.to_owned())
}

/// Pill background: role wins over custom titles for owners and admins,
/// a custom title recolors only plain members.
pub fn badge_background(role: Role, has_custom_title: bool) -> Rgba<u8> {
    match role {
        Role::Owner => OWNER_BG,
        Role::Admin => ADMIN_BG,
        Role::Member => {
            if has_custom_title {
                CUSTOM_TITLE_BG
            } else {
                MEMBER_BG
            }
        }
    }
}

fn build_level_glyphs(level: u32, fonts: &FontLibrary) -> RgbaImage {
    let prefix_font = fonts.load(LEVEL_PREFIX_SIZE, FontWeight::Bold);
    let number_font = fonts.load(LEVEL_NUMBER_SIZE, FontWeight::Bold);

    let number = level.to_string();
    let prefix_metrics = prefix_font.measure("LV");
    let number_metrics = number_font.measure(&number);

    let group_w = prefix_metrics.width() + number_metrics.width() + PREFIX_GAP;
    let group_h = prefix_metrics.height().max(number_metrics.height());

    let mut scratch = RgbaImage::new(
        (group_w + SCRATCH_MARGIN).max(1) as u32,
        (group_h + SCRATCH_MARGIN).max(1) as u32,
    );

    // Number is centered in the scratch band; the prefix shares its
    // baseline by aligning bottoms.
    let number_top = (group_h + SCRATCH_MARGIN - number_metrics.height()) / 2;
    let prefix_top = number_top + number_metrics.height() - prefix_metrics.height();

    PlainDrawer.draw_line(
        &mut scratch,
        SCRATCH_MARGIN / 2 - prefix_metrics.left,
        prefix_top - prefix_metrics.top,
        "LV",
        &prefix_font,
        GLYPH_FILL,
        0,
    );
    PlainDrawer.draw_line(
        &mut scratch,
        SCRATCH_MARGIN / 2 + prefix_metrics.width() + PREFIX_GAP - number_metrics.left,
        number_top - number_metrics.top,
        &number,
        &number_font,
        GLYPH_FILL,
        0,
    );

    crop_to_alpha(&shear_x(&scratch, LEVEL_SKEW))
}

fn build_title_glyphs(title: &str, fonts: &FontLibrary, drawer: &dyn TextDraw) -> RgbaImage {
    let font = fonts.load(TITLE_FONT_SIZE, FontWeight::Regular);
    let metrics = font.measure(title);
    let mut canvas = RgbaImage::new(
        (metrics.width() + 20).max(1) as u32,
        (metrics.height() + 20).max(1) as u32,
    );
    let emoji_offset = ((font.descent() as f32 * 0.6) as i32).max(1);
    drawer.draw_line(
        &mut canvas,
        10 - metrics.left,
        10 - metrics.top,
        title,
        &font,
        GLYPH_FILL,
        emoji_offset,
    );
    crop_to_alpha(&canvas)
}

/// Builds the complete badge pill for a member's level, role and optional
/// custom title.
pub fn build_badge(
    level: u32,
    title: Option<&str>,
    role: Role,
    fonts: &FontLibrary,
    drawer: &dyn TextDraw,
) -> Result<RgbaImage> {
    let level_img = build_level_glyphs(level, fonts);

    let has_custom_title = title.is_some_and(|t| !t.is_empty());
    let resolved = resolve_title(role, title, level);
    let background = badge_background(role, has_custom_title);

    let title_img = resolved
        .as_deref()
        .map(|t| build_title_glyphs(t, fonts, drawer));

    let spacing = (fonts.load(TITLE_FONT_SIZE, FontWeight::Regular).space_advance() * 1.5) as i32;
    let mut content_w = level_img.width() as i32;
    let mut content_h = level_img.height() as i32;
    if let Some(img) = &title_img {
        content_w += spacing + img.width() as i32;
        content_h = content_h.max(img.height() as i32);
    }

    let pill_w = (content_w + PAD_X * 2) as u32;
    let pill_h = (content_h + PAD_Y * 2) as u32;
    let mut badge = fill_rounded_rect(pill_w, pill_h, PILL_RADIUS, background)?;

    let mut cursor_x = (pill_w as i32 - content_w) / 2;
    let level_y = (pill_h as i32 - level_img.height() as i32) / 2;
    paste_over(&mut badge, &level_img, i64::from(cursor_x), i64::from(level_y));
    cursor_x += level_img.width() as i32;

    if let Some(img) = &title_img {
        cursor_x += spacing;
        let title_y = (pill_h as i32 - img.height() as i32) / 2;
        paste_over(&mut badge, img, i64::from(cursor_x), i64::from(title_y));
    }

    Ok(badge)
}

#[cfg(test)]
mod tests {
    use super::{
        badge_background, build_badge, build_level_glyphs, resolve_title, ADMIN_BG,
        CUSTOM_TITLE_BG, MEMBER_BG, OWNER_BG, PAD_X,
    };
    use crate::fonts::FontLibrary;
    use crate::schema::Role;
    use crate::text::PlainDrawer;

    fn builtin_fonts() -> FontLibrary {
        FontLibrary::new(
            "/nonexistent/regular.ttf".into(),
            "/nonexistent/bold.ttf".into(),
        )
    }

    #[test]
    fn member_rank_bands() {
        let cases = [
            (5, "青铜"),
            (15, "白银"),
            (30, "黄金"),
            (50, "铂金"),
            (70, "钻石"),
            (90, "王者"),
        ];
        for (level, expected) in cases {
            assert_eq!(
                resolve_title(Role::Member, None, level).as_deref(),
                Some(expected),
                "level {level}"
            );
        }
        assert_eq!(resolve_title(Role::Member, None, 0), None);
    }

    #[test]
    fn role_titles_override_rank_bands() {
        assert_eq!(resolve_title(Role::Owner, None, 50).as_deref(), Some("群主"));
        assert_eq!(
            resolve_title(Role::Admin, None, 50).as_deref(),
            Some("管理员")
        );
    }

    #[test]
    fn explicit_title_wins_for_every_role() {
        for role in [Role::Member, Role::Admin, Role::Owner] {
            assert_eq!(
                resolve_title(role, Some("老带新"), 3).as_deref(),
                Some("老带新")
            );
        }
        // Empty explicit titles are ignored.
        assert_eq!(resolve_title(Role::Owner, Some(""), 3).as_deref(), Some("群主"));
    }

    #[test]
    fn background_palette_four_way() {
        assert_eq!(badge_background(Role::Owner, true), OWNER_BG);
        assert_eq!(badge_background(Role::Admin, true), ADMIN_BG);
        assert_eq!(badge_background(Role::Member, true), CUSTOM_TITLE_BG);
        assert_eq!(badge_background(Role::Member, false), MEMBER_BG);
    }

    #[test]
    fn pill_encloses_sheared_level_glyphs() {
        let fonts = builtin_fonts();
        let level_img = build_level_glyphs(10, &fonts);
        let badge = build_badge(10, None, Role::Member, &fonts, &PlainDrawer).expect("badge");
        assert!(badge.width() >= level_img.width() + (PAD_X * 2) as u32);
        assert!(badge.height() > level_img.height());
    }

    #[test]
    fn titled_badge_is_wider_than_untitled() {
        let fonts = builtin_fonts();
        let bare = build_badge(0, None, Role::Member, &fonts, &PlainDrawer).expect("badge");
        let titled =
            build_badge(0, Some("custom"), Role::Member, &fonts, &PlainDrawer).expect("badge");
        assert!(titled.width() > bare.width());
    }
}

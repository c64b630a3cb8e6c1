use image::GenericImageView;
use quip::assets::Resources;
use quip::badge::build_badge;
use quip::bubble::build_bubble;
use quip::fonts::{FontLibrary, FontWeight};
use quip::text::PlainDrawer;
use quip::{MemeRenderer, RenderRequest, Role};

const BADGE_X: i32 = 195;
const BUBBLE_X: i32 = 165;
const NAME_GAP: i32 = 10;
const RIGHT_MARGIN: i32 = 50;
const BOTTOM_EXTRA: u32 = 110;

fn request(name: &str, text: &str) -> RenderRequest {
    RenderRequest {
        display_name: name.to_owned(),
        avatar: Vec::new(),
        body_text: text.to_owned(),
        role: Role::Member,
        title: None,
        level: 7,
    }
}

/// Recomputes the expected canvas size from the same public building
/// blocks the renderer composes with.
fn expected_dimensions(name: &str, text: &str) -> (u32, u32) {
    let resources = Resources::new("/nonexistent/resources");
    let fonts = FontLibrary::new(resources.font_regular_path(), resources.font_bold_path());

    let badge = build_badge(7, None, Role::Member, &fonts, &PlainDrawer).expect("badge");
    let bubble = build_bubble(text, &fonts, &resources, &PlainDrawer).expect("bubble");
    let name_metrics = fonts.load(35, FontWeight::Regular).measure(name);

    let name_end = BADGE_X + badge.width() as i32 + NAME_GAP + name_metrics.width();
    let bubble_end = BUBBLE_X + bubble.width() as i32;
    let width = (name_end.max(bubble_end) + RIGHT_MARGIN) as u32;
    let height = bubble.height() + BOTTOM_EXTRA;
    (width, height)
}

fn rendered_dimensions(name: &str, text: &str) -> (u32, u32) {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    let bytes = renderer
        .render_frame(&request(name, text))
        .expect("frame should render");
    image::load_from_memory(&bytes)
        .expect("output should be a decodable jpeg")
        .dimensions()
}

#[test]
fn wide_bubble_drives_the_canvas_width() {
    let name = "ab";
    let text = "a message long enough that the bubble reaches past the name";
    assert_eq!(rendered_dimensions(name, text), expected_dimensions(name, text));
}

#[test]
fn long_name_drives_the_canvas_width() {
    let name = "an exceptionally drawn out display name for one member";
    let text = "ok";
    assert_eq!(rendered_dimensions(name, text), expected_dimensions(name, text));
}

#[test]
fn taller_text_grows_the_canvas() {
    let (_, short_h) = rendered_dimensions("n", "one line");
    let (_, tall_h) = rendered_dimensions("n", "one\ntwo\nthree\nfour\nfive");
    assert!(tall_h > short_h);
}

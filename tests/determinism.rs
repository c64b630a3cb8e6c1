use image::{Rgba, RgbaImage};
use quip::{MemeRenderer, RenderRequest, Role};

#[test]
fn single_frame_render_is_stable() {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    let request = sample_request("same text, same pixels", 12);

    let first = render_hash(&renderer, &request);
    let second = render_hash(&renderer, &request);
    assert_eq!(first, second, "repeat renders should be byte-identical");
}

#[test]
fn different_text_changes_output() {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    let short = render_hash(&renderer, &sample_request("one", 12));
    let long = render_hash(&renderer, &sample_request("a rather longer message", 12));
    assert_ne!(short, long);
}

#[test]
fn stitched_batch_render_is_stable() {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    let batch = [
        sample_request("first message", 5),
        sample_request("second message", 42),
    ];

    let first = renderer.render_stitched(&batch).expect("stitched png");
    let second = renderer.render_stitched(&batch).expect("stitched png");
    assert_eq!(
        fnv1a64(&first),
        fnv1a64(&second),
        "repeat batch renders should be byte-identical"
    );
}

fn sample_request(text: &str, level: u32) -> RenderRequest {
    RenderRequest {
        display_name: "determinist".to_owned(),
        avatar: sample_avatar_png(),
        body_text: text.to_owned(),
        role: Role::Member,
        title: None,
        level,
    }
}

fn sample_avatar_png() -> Vec<u8> {
    let image = RgbaImage::from_fn(16, 16, |x, y| {
        Rgba([(x * 16) as u8, (y * 16) as u8, 96, 255])
    });
    let mut bytes = Vec::new();
    image
        .write_with_encoder(image::codecs::png::PngEncoder::new(std::io::Cursor::new(
            &mut bytes,
        )))
        .expect("encode avatar fixture");
    bytes
}

fn render_hash(renderer: &MemeRenderer, request: &RenderRequest) -> u64 {
    let bytes = renderer.render_frame(request).expect("frame should render");
    fnv1a64(&bytes)
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0001_0000_01b3);
    }
    hash
}

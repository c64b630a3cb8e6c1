use image::GenericImageView;
use quip::{MemeRenderer, RenderRequest, Role};

fn request(text: &str) -> RenderRequest {
    RenderRequest {
        display_name: "stitcher".to_owned(),
        avatar: Vec::new(),
        body_text: text.to_owned(),
        role: Role::Member,
        title: None,
        level: 3,
    }
}

#[test]
fn empty_batch_yields_none() {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    assert!(renderer.render_stitched(&[]).is_none());
}

#[test]
fn batch_of_only_failures_yields_none() {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    let batch = [request(""), request("")];
    assert!(renderer.render_stitched(&batch).is_none());
}

#[test]
fn single_frame_batch_matches_frame_dimensions() {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    let req = request("only message");

    let frame = renderer.render_frame(&req).expect("jpeg frame");
    let frame_dims = image::load_from_memory(&frame)
        .expect("jpeg should decode")
        .dimensions();

    let sheet = renderer.render_stitched(std::slice::from_ref(&req)).expect("png sheet");
    let sheet_dims = image::load_from_memory(&sheet)
        .expect("png should decode")
        .dimensions();

    assert_eq!(sheet_dims, frame_dims);
}

#[test]
fn failing_entries_are_dropped_not_fatal() {
    let renderer = MemeRenderer::new("/nonexistent/resources");

    let good = [request("alpha"), request("beta")];
    let clean = renderer.render_stitched(&good).expect("png sheet");
    let clean_h = image::load_from_memory(&clean).expect("png").dimensions().1;

    let mixed = [request("alpha"), request(""), request("beta")];
    let salvaged = renderer.render_stitched(&mixed).expect("png sheet");
    let salvaged_h = image::load_from_memory(&salvaged).expect("png").dimensions().1;

    assert_eq!(salvaged_h, clean_h, "empty entry should be skipped, not rendered");
}

#[test]
fn stitched_height_is_the_sum_of_frames() {
    let renderer = MemeRenderer::new("/nonexistent/resources");
    let batch = [request("first"), request("second\nspans\nlines")];

    let mut frame_heights = 0;
    let mut max_width = 0;
    for req in &batch {
        let bytes = renderer.render_frame(req).expect("jpeg frame");
        let (w, h) = image::load_from_memory(&bytes).expect("jpeg").dimensions();
        frame_heights += h;
        max_width = max_width.max(w);
    }

    let sheet = renderer.render_stitched(&batch).expect("png sheet");
    let (sheet_w, sheet_h) = image::load_from_memory(&sheet).expect("png").dimensions();
    assert_eq!(sheet_h, frame_heights);
    assert_eq!(sheet_w, max_width);
}

use std::f32::consts::PI;

use easel_core::{ArcMode, BlendMode, Color, ShapeMode};
use easel_paint::{HeadlessBackend, Sketch, SketchConfig, Submission, Vertex};

fn sketch(config: SketchConfig) -> Sketch<HeadlessBackend> {
    Sketch::new(HeadlessBackend::new(), config).expect("headless sketch")
}

fn area(vertices: &[Vertex]) -> f32 {
    vertices
        .chunks_exact(3)
        .map(|t| {
            let [ax, ay] = t[0].position;
            let [bx, by] = t[1].position;
            let [cx, cy] = t[2].position;
            ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)).abs() * 0.5
        })
        .sum()
}

fn positions(submission: &Submission) -> Vec<[f32; 2]> {
    submission.vertices.iter().map(|v| v.position).collect()
}

#[test]
fn push_translate_pop_matches_never_translating() {
    let mut translated = sketch(SketchConfig::default());
    translated
        .frame(|s| {
            s.push();
            s.translate(10.0, 0.0);
            s.pop();
            s.ellipse(0.0, 0.0, 30.0, 30.0)
        })
        .unwrap();

    let mut plain = sketch(SketchConfig::default());
    plain.frame(|s| s.ellipse(0.0, 0.0, 30.0, 30.0)).unwrap();

    let a = translated.backend().submissions();
    let b = plain.backend().submissions();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_eq!(positions(x), positions(y));
    }
    assert!(translated.is_balanced());
}

#[test]
fn push_style_restores_fill_exactly() {
    let mut s = sketch(SketchConfig::default());
    s.fill(Color::rgba(12, 34, 56, 78));
    s.no_stroke();
    s.frame(|s| {
        s.push_style();
        s.fill(Color::rgb(255, 0, 0));
        s.pop_style();
        s.rect(0.0, 0.0, 10.0, 10.0)
    })
    .unwrap();

    let submission = &s.backend().submissions()[0];
    assert_eq!(submission.vertices[0].color, Color::rgba(12, 34, 56, 78).to_array());
}

#[test]
fn transparent_fill_submits_no_triangles() {
    let mut s = sketch(SketchConfig::default());
    s.fill(Color::WHITE.with_alpha(0));
    s.frame(|s| {
        s.ellipse(50.0, 50.0, 20.0, 20.0)?;
        let stats = s.frame_stats();
        assert_eq!(stats.triangles, 0);
        // the stroke still draws
        assert_eq!(stats.draw_calls, 1);
        Ok(())
    })
    .unwrap();

    s.no_stroke();
    s.frame(|s| s.ellipse(50.0, 50.0, 20.0, 20.0)).unwrap();
    assert_eq!(s.frame_stats().draw_calls, 0);
}

#[test]
fn fill_and_stroke_are_one_draw_call_each() {
    let mut s = sketch(SketchConfig::default());
    s.frame(|s| {
        s.ellipse(100.0, 100.0, 40.0, 20.0)?;
        s.rounded_rect(10.0, 10.0, 60.0, 40.0, 8.0)?;
        s.arc(150.0, 150.0, 40.0, 40.0, 0.0, PI, ArcMode::Pie)
    })
    .unwrap();

    let stats = s.frame_stats();
    assert_eq!(stats.draw_calls, 6);
    assert_eq!(s.backend().draw_calls(), 6);
    assert_eq!(stats.triangles, 30 + (10 + 4 * 30) + 30);
}

#[test]
fn repeated_ellipse_hits_the_cache() {
    let mut s = sketch(SketchConfig::default());
    s.frame(|s| {
        for i in 0..10 {
            s.ellipse(i as f32 * 20.0, 50.0, 16.0, 16.0)?;
        }
        Ok(())
    })
    .unwrap();

    let stats = s.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 9);
    assert_eq!(stats.entries, 1);

    s.set_sides(12);
    assert_eq!(s.cache_stats().entries, 0);
}

#[test]
fn sides_come_from_config() {
    let mut s = sketch(SketchConfig::default().with_sides(8));
    s.no_stroke();
    s.frame(|s| s.circle(50.0, 50.0, 10.0)).unwrap();
    assert_eq!(s.frame_stats().triangles, 8);
}

#[test]
fn transform_is_applied_to_vertices() {
    let mut s = sketch(SketchConfig::default());
    s.no_stroke();
    s.blend_mode(BlendMode::Multiply);
    s.frame(|s| {
        s.translate(10.0, 20.0);
        s.scale_uniform(2.0);
        s.rect(0.0, 0.0, 5.0, 5.0)
    })
    .unwrap();

    let submission = &s.backend().submissions()[0];
    assert_eq!(submission.blend, BlendMode::Multiply);
    assert_eq!(submission.vertices[0].position, [10.0, 20.0]);
    assert_eq!(submission.vertices[2].position, [20.0, 30.0]);
}

#[test]
fn square_with_hole_covers_75() {
    let mut s = sketch(SketchConfig::default());
    s.no_stroke();
    s.frame(|s| {
        s.begin_shape()?;
        s.vertex(0.0, 0.0)?;
        s.vertex(10.0, 0.0)?;
        s.vertex(10.0, 10.0)?;
        s.vertex(0.0, 10.0)?;
        s.begin_contour()?;
        s.vertex(2.5, 2.5)?;
        s.vertex(7.5, 2.5)?;
        s.vertex(7.5, 7.5)?;
        s.vertex(2.5, 7.5)?;
        s.end_contour()?;
        s.end_shape()
    })
    .unwrap();

    let submissions = s.backend().submissions();
    assert_eq!(submissions.len(), 1);
    assert!((area(&submissions[0].vertices) - 75.0).abs() < 1e-3);
}

#[test]
fn no_loop_skips_draw_until_redraw() {
    let mut s = sketch(SketchConfig::default().with_looping(false));
    let mut runs = 0;

    assert!(s.frame(|_| {
        runs += 1;
        Ok(())
    })
    .unwrap());
    assert!(!s.frame(|_| {
        runs += 1;
        Ok(())
    })
    .unwrap());

    s.redraw();
    assert!(s.frame(|_| {
        runs += 1;
        Ok(())
    })
    .unwrap());

    assert_eq!(runs, 2);
    assert_eq!(s.frame_count(), 2);
    // the skipped frame re-presented the previous one
    let presented = s.backend().presented();
    assert_eq!(presented[0], presented[1]);
}

#[test]
fn drawing_persists_across_frames() {
    let mut s = sketch(SketchConfig::default());
    s.frame(|s| {
        s.background(Color::gray(30))?;
        s.rect(0.0, 0.0, 10.0, 10.0)
    })
    .unwrap();
    s.frame(|_| Ok(())).unwrap();

    let last = s.last_frame();
    let target = s.backend().target(last).unwrap();
    assert_eq!(target.clear_color, Color::gray(30));
    // fill and stroke of the rect from the previous frame
    assert_eq!(s.backend().visible_in(last).len(), 2);
}

#[test]
fn resize_reallocates_targets_and_discards_contents() {
    let mut s = sketch(SketchConfig::default().with_size(400, 400));
    s.frame(|s| s.rect(0.0, 0.0, 100.0, 100.0)).unwrap();

    s.size(800, 600);
    s.frame(|s| {
        let target = s.target().unwrap();
        let t = s.backend().target(target).unwrap();
        assert_eq!((t.width, t.height), (800, 600));
        assert!(t.contents.is_empty());
        Ok(())
    })
    .unwrap();
    assert_eq!((s.width(), s.height()), (800, 600));
    assert_eq!(s.backend().target_count(), 2);
}

#[test]
fn ellipse_modes_change_placement() {
    let mut s = sketch(SketchConfig::default());
    s.no_stroke();
    s.ellipse_mode(ShapeMode::Corner);
    s.frame(|s| s.ellipse(0.0, 0.0, 20.0, 20.0)).unwrap();

    // CORNER puts the center at (10, 10)
    let first = &s.backend().submissions()[0].vertices[0];
    assert_eq!(first.position, [10.0, 10.0]);
}

#[test]
fn large_batches_match_small_batch_transform() {
    let config = SketchConfig::default().with_sides(200);
    let mut simd = sketch(config.clone().with_simd_threshold(0));
    let mut scalar = sketch(config.with_simd_threshold(usize::MAX));

    for s in [&mut simd, &mut scalar] {
        s.no_stroke();
        s.frame(|s| {
            s.rotate(0.4);
            s.shear_x(0.1);
            s.ellipse(33.0, 44.0, 50.0, 20.0)
        })
        .unwrap();
    }

    assert_eq!(
        simd.backend().submissions()[0].vertices,
        scalar.backend().submissions()[0].vertices
    );
}

#[test]
fn degenerate_line_and_polygon_issue_no_draw_calls() {
    let mut s = sketch(SketchConfig::default());
    s.frame(|s| {
        s.line(50.0, 50.0, 50.0, 50.0)?;
        s.begin_shape()?;
        s.vertex(0.0, 0.0)?;
        s.vertex(10.0, 10.0)?;
        s.end_shape()
    })
    .unwrap();

    let stats = s.frame_stats();
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(stats.vertices, 0);
    assert!(s.backend().submissions().is_empty());
}

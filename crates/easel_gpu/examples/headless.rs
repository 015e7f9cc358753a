//! Render a few frames offscreen and save the last one
//!
//! Run with: cargo run -p easel_gpu --example headless [output.png]

use std::f32::consts::{PI, TAU};

use anyhow::Result;
use easel_core::{ArcMode, BlendMode, Color, ShapeMode};
use easel_gpu::{BackendConfig, WgpuBackend};
use easel_paint::{Sketch, SketchConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "easel-headless.png".to_string());

    let backend = pollster::block_on(WgpuBackend::new(BackendConfig::default()))?;
    let mut sketch = Sketch::new(backend, SketchConfig::default().with_size(400, 400))?;

    sketch.frame(|s| s.background(Color::gray(24)))?;

    for frame in 0..12 {
        let t = frame as f32 / 12.0;
        sketch.frame(|s| {
            s.push();
            s.translate(200.0, 200.0);
            s.rotate(t * TAU);
            s.fill(Color::rgba(255, 120, 40, 60));
            s.stroke(Color::WHITE.with_alpha(120));
            s.rect_mode(ShapeMode::Center);
            s.rounded_rect(120.0, 0.0, 60.0, 30.0, 6.0)?;
            s.pop();
            Ok(())
        })?;
    }

    sketch.frame(|s| {
        s.no_stroke();
        s.blend_mode(BlendMode::Add);
        s.fill(Color::rgba(40, 90, 255, 160));
        s.arc(200.0, 200.0, 160.0, 160.0, 0.0, PI * 1.5, ArcMode::Pie)?;
        s.blend_mode(BlendMode::Blend);

        s.stroke(Color::WHITE);
        s.stroke_weight(3.0);
        s.no_fill();
        s.begin_shape()?;
        for (x, y) in [(60.0, 340.0), (120.0, 300.0), (180.0, 350.0), (240.0, 310.0)] {
            s.vertex(x, y)?;
        }
        s.end_shape()
    })?;

    tracing::info!(
        frames = sketch.frame_count(),
        stats = ?sketch.frame_stats(),
        cache = ?sketch.cache_stats(),
        "rendered"
    );

    sketch.backend().save_png(sketch.last_frame(), &output)?;
    tracing::info!(path = %output, "saved");
    Ok(())
}

//! Batched vertex transforms
//!
//! Two kernels compute `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty` with the
//! same operation order, so they agree bit for bit:
//!
//! - [`transform_scalar`]: one point at a time
//! - [`transform_simd`]: SSE2 on x86_64 (two points per register), a
//!   fixed-width chunked loop elsewhere
//!
//! The batch renderer picks the SIMD kernel once a batch is large enough to
//! amortize the setup.

use easel_core::{Affine2D, Point};

/// Transform every point in place, one at a time
pub fn transform_scalar(matrix: &Affine2D, points: &mut [Point]) {
    let [a, b, c, d, tx, ty] = matrix.elements;
    for p in points.iter_mut() {
        let (x, y) = (p.x, p.y);
        p.x = a * x + c * y + tx;
        p.y = b * x + d * y + ty;
    }
}

/// Transform every point in place using wide registers
pub fn transform_simd(matrix: &Affine2D, points: &mut [Point]) {
    #[cfg(target_arch = "x86_64")]
    {
        transform_sse2(matrix, points);
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        transform_chunked(matrix, points);
    }
}

/// Transform in place, with the wide kernel when `simd` is set
pub fn transform_points(matrix: &Affine2D, points: &mut [Point], simd: bool) {
    if matrix.is_identity() {
        return;
    }
    if simd {
        transform_simd(matrix, points);
    } else {
        transform_scalar(matrix, points);
    }
}

#[cfg(target_arch = "x86_64")]
fn transform_sse2(matrix: &Affine2D, points: &mut [Point]) {
    use std::arch::x86_64::{
        _mm_add_ps, _mm_loadu_ps, _mm_mul_ps, _mm_setr_ps, _mm_shuffle_ps, _mm_storeu_ps,
    };

    let [a, b, c, d, tx, ty] = matrix.elements;
    let (pairs, rest) = split_pairs(points);

    // SAFETY: SSE2 is part of the x86_64 baseline, and every load/store
    // touches exactly the four floats of one `[f32; 4]` chunk.
    unsafe {
        let ab = _mm_setr_ps(a, b, a, b);
        let cd = _mm_setr_ps(c, d, c, d);
        let t = _mm_setr_ps(tx, ty, tx, ty);

        for chunk in pairs.iter_mut() {
            let p = _mm_loadu_ps(chunk.as_ptr());
            // [x0, x0, x1, x1] and [y0, y0, y1, y1]
            let xs = _mm_shuffle_ps::<0b10_10_00_00>(p, p);
            let ys = _mm_shuffle_ps::<0b11_11_01_01>(p, p);
            let r = _mm_add_ps(_mm_add_ps(_mm_mul_ps(xs, ab), _mm_mul_ps(ys, cd)), t);
            _mm_storeu_ps(chunk.as_mut_ptr(), r);
        }
    }

    transform_scalar(matrix, rest);
}

#[cfg_attr(target_arch = "x86_64", allow(dead_code))]
fn transform_chunked(matrix: &Affine2D, points: &mut [Point]) {
    const LANES: usize = 4;
    let [a, b, c, d, tx, ty] = matrix.elements;

    let mut chunks = points.chunks_exact_mut(LANES);
    for chunk in &mut chunks {
        let mut xs = [0.0f32; LANES];
        let mut ys = [0.0f32; LANES];
        for (i, p) in chunk.iter().enumerate() {
            xs[i] = p.x;
            ys[i] = p.y;
        }
        for (i, p) in chunk.iter_mut().enumerate() {
            p.x = a * xs[i] + c * ys[i] + tx;
            p.y = b * xs[i] + d * ys[i] + ty;
        }
    }
    transform_scalar(matrix, chunks.into_remainder());
}

/// View points as `[x0, y0, x1, y1]` pairs plus an odd trailing point
#[cfg(target_arch = "x86_64")]
fn split_pairs(points: &mut [Point]) -> (&mut [[f32; 4]], &mut [Point]) {
    let even = points.len() & !1;
    let (head, rest) = points.split_at_mut(even);
    (bytemuck::cast_slice_mut(head), rest)
}

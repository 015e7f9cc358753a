//! Blend mode to fixed-function blend state mapping
//!
//! Modes that need the destination color in the shader (difference,
//! exclusion, overlay and the light/burn family) have no fixed-function
//! equivalent and fall back to alpha blending.

use easel_core::BlendMode;
use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState};

const fn component(
    src_factor: BlendFactor,
    dst_factor: BlendFactor,
    operation: BlendOperation,
) -> BlendComponent {
    BlendComponent {
        src_factor,
        dst_factor,
        operation,
    }
}

/// Premultiplication happens in the blend unit: color is scaled by source
/// alpha, alpha accumulates "over".
const ALPHA: BlendState = BlendState {
    color: component(
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendOperation::Add,
    ),
    alpha: component(
        BlendFactor::One,
        BlendFactor::OneMinusSrcAlpha,
        BlendOperation::Add,
    ),
};

const KEEP_ALPHA: BlendComponent = ALPHA.alpha;

// min/max ignore their factors but WebGPU requires them to be One
const fn extremum(operation: BlendOperation) -> BlendState {
    BlendState {
        color: component(BlendFactor::One, BlendFactor::One, operation),
        alpha: KEEP_ALPHA,
    }
}

pub fn blend_state(mode: BlendMode) -> BlendState {
    match mode {
        BlendMode::Add => BlendState {
            color: component(BlendFactor::SrcAlpha, BlendFactor::One, BlendOperation::Add),
            alpha: KEEP_ALPHA,
        },
        BlendMode::Subtract => BlendState {
            color: component(
                BlendFactor::SrcAlpha,
                BlendFactor::One,
                BlendOperation::ReverseSubtract,
            ),
            alpha: KEEP_ALPHA,
        },
        BlendMode::Lightest => extremum(BlendOperation::Max),
        BlendMode::Darkest => extremum(BlendOperation::Min),
        BlendMode::Multiply => BlendState {
            color: component(BlendFactor::Dst, BlendFactor::Zero, BlendOperation::Add),
            alpha: KEEP_ALPHA,
        },
        BlendMode::Screen => BlendState {
            color: component(
                BlendFactor::One,
                BlendFactor::OneMinusSrc,
                BlendOperation::Add,
            ),
            alpha: KEEP_ALPHA,
        },
        BlendMode::Dodge => BlendState {
            color: component(BlendFactor::One, BlendFactor::One, BlendOperation::Add),
            alpha: KEEP_ALPHA,
        },
        BlendMode::Blend
        | BlendMode::Difference
        | BlendMode::Exclusion
        | BlendMode::Overlay
        | BlendMode::HardLight
        | BlendMode::SoftLight
        | BlendMode::Burn => ALPHA,
    }
}

/// Whether `mode` is rendered exactly rather than approximated by alpha blending
pub fn is_native(mode: BlendMode) -> bool {
    mode == BlendMode::Blend || blend_state(mode) != ALPHA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_is_source_over() {
        assert_eq!(blend_state(BlendMode::Blend), ALPHA);
    }

    #[test]
    fn test_extremum_modes_use_one_factors() {
        for mode in [BlendMode::Lightest, BlendMode::Darkest] {
            let state = blend_state(mode);
            assert_eq!(state.color.src_factor, BlendFactor::One);
            assert_eq!(state.color.dst_factor, BlendFactor::One);
        }
        assert_eq!(
            blend_state(BlendMode::Lightest).color.operation,
            BlendOperation::Max
        );
        assert_eq!(
            blend_state(BlendMode::Darkest).color.operation,
            BlendOperation::Min
        );
    }

    #[test]
    fn test_subtract_takes_source_from_destination() {
        assert_eq!(
            blend_state(BlendMode::Subtract).color.operation,
            BlendOperation::ReverseSubtract
        );
    }

    #[test]
    fn test_native_modes() {
        let native: Vec<_> = BlendMode::ALL
            .iter()
            .copied()
            .filter(|&m| is_native(m))
            .collect();
        assert_eq!(
            native,
            vec![
                BlendMode::Blend,
                BlendMode::Add,
                BlendMode::Subtract,
                BlendMode::Darkest,
                BlendMode::Lightest,
                BlendMode::Multiply,
                BlendMode::Screen,
                BlendMode::Dodge,
            ]
        );
    }
}

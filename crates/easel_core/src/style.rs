//! Paint state
//!
//! [`Style`] is an immutable value. Setters on the sketch replace the active
//! style with a modified copy, so a pushed style can never be altered
//! through a later setter.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// How the four numbers of `rect` / `ellipse` are interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeMode {
    /// `(x, y)` is the top-left corner, then width and height
    #[default]
    Corner,
    /// `(x, y)` and `(c, d)` are opposite corners
    Corners,
    /// `(x, y)` is the center, then width and height
    Center,
    /// `(x, y)` is the center, then the two radii
    Radius,
}

/// How an arc's fill and outline are closed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcMode {
    /// Outline left open, fill closed by the chord
    #[default]
    Open,
    /// Outline and fill closed by the chord
    Chord,
    /// Outline and fill closed through the center
    Pie,
}

/// Compositing mode for subsequent draws
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Blend,
    Add,
    Subtract,
    Darkest,
    Lightest,
    Difference,
    Exclusion,
    Multiply,
    Screen,
    Overlay,
    HardLight,
    SoftLight,
    Dodge,
    Burn,
}

impl BlendMode {
    pub const ALL: [BlendMode; 14] = [
        BlendMode::Blend,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Darkest,
        BlendMode::Lightest,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Dodge,
        BlendMode::Burn,
    ];
}

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Active paint state
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_weight: f32,
    pub stroke_cap: LineCap,
    pub stroke_join: LineJoin,
    pub text_size: f32,
    pub rect_mode: ShapeMode,
    pub ellipse_mode: ShapeMode,
    pub blend_mode: BlendMode,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            stroke: Color::BLACK,
            stroke_weight: 1.0,
            stroke_cap: LineCap::default(),
            stroke_join: LineJoin::default(),
            text_size: 12.0,
            rect_mode: ShapeMode::Corner,
            ellipse_mode: ShapeMode::Center,
            blend_mode: BlendMode::Blend,
        }
    }
}

impl Style {
    pub fn with_fill(self, fill: Color) -> Self {
        Self { fill, ..self }
    }

    /// Disable fill
    pub fn without_fill(self) -> Self {
        self.with_fill(Color::TRANSPARENT)
    }

    pub fn with_stroke(self, stroke: Color) -> Self {
        Self { stroke, ..self }
    }

    /// Disable stroke
    pub fn without_stroke(self) -> Self {
        self.with_stroke(Color::TRANSPARENT)
    }

    pub fn with_stroke_weight(self, stroke_weight: f32) -> Self {
        Self {
            stroke_weight,
            ..self
        }
    }

    pub fn with_stroke_cap(self, stroke_cap: LineCap) -> Self {
        Self { stroke_cap, ..self }
    }

    pub fn with_stroke_join(self, stroke_join: LineJoin) -> Self {
        Self {
            stroke_join,
            ..self
        }
    }

    pub fn with_text_size(self, text_size: f32) -> Self {
        Self { text_size, ..self }
    }

    pub fn with_rect_mode(self, rect_mode: ShapeMode) -> Self {
        Self { rect_mode, ..self }
    }

    pub fn with_ellipse_mode(self, ellipse_mode: ShapeMode) -> Self {
        Self {
            ellipse_mode,
            ..self
        }
    }

    pub fn with_blend_mode(self, blend_mode: BlendMode) -> Self {
        Self { blend_mode, ..self }
    }

    pub fn has_fill(&self) -> bool {
        !self.fill.is_transparent()
    }

    /// Stroke is drawn only with a visible color and a positive weight
    pub fn has_stroke(&self) -> bool {
        !self.stroke.is_transparent() && self.stroke_weight > 0.0
    }
}

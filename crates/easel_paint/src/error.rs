//! Paint error types

use thiserror::Error;

use crate::backend::TargetId;

/// Errors raised by the drawing API
///
/// Degenerate geometry is never an error: it simply produces no draw call.
#[derive(Error, Debug)]
pub enum EaselError {
    /// `begin_shape` while a shape is already being recorded
    #[error("begin_shape called while a shape is already open")]
    ShapeAlreadyOpen,

    /// Shape recording call outside `begin_shape` / `end_shape`
    #[error("{0} called without an open shape")]
    NoOpenShape(&'static str),

    /// `begin_contour` while a contour is already open
    #[error("begin_contour called while a contour is already open")]
    ContourAlreadyOpen,

    /// `end_contour` without a matching `begin_contour`
    #[error("end_contour called without an open contour")]
    NoOpenContour,

    /// `end_shape` while a contour is still open
    #[error("end_shape called with an unclosed contour")]
    UnclosedContour,

    /// Drawing outside of a frame
    #[error("no frame is active")]
    NoActiveFrame,

    /// Target id not known to the backend
    #[error("unknown render target {0:?}")]
    UnknownTarget(TargetId),

    /// Render backend failure
    #[error("render backend error: {0}")]
    Backend(String),

    /// Invalid configuration file
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Failed to read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for paint operations
pub type Result<T> = std::result::Result<T, EaselError>;

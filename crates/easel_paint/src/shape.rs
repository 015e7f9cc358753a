//! `begin_shape` / `vertex` / `end_shape` recording
//!
//! Contour 0 is the outer boundary; every `begin_contour` / `end_contour`
//! pair adds a hole. Misuse (nested shapes, unbalanced contours, vertices
//! outside a shape) is reported as an error and leaves the recorder in a
//! usable state.

use easel_core::Point;

use crate::error::{EaselError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    Shape,
    Contour,
}

/// Records the contours of one custom shape
#[derive(Clone, Debug, Default)]
pub struct ShapeRecorder {
    state: State,
    contours: Vec<Vec<Point>>,
}

impl ShapeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.state != State::Idle
    }

    pub fn begin_shape(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(EaselError::ShapeAlreadyOpen);
        }
        self.contours.clear();
        self.contours.push(Vec::new());
        self.state = State::Shape;
        Ok(())
    }

    pub fn vertex(&mut self, x: f32, y: f32) -> Result<()> {
        if !self.is_open() {
            return Err(EaselError::NoOpenShape("vertex"));
        }
        if let Some(contour) = self.contours.last_mut() {
            contour.push(Point::new(x, y));
        }
        Ok(())
    }

    pub fn begin_contour(&mut self) -> Result<()> {
        match self.state {
            State::Idle => Err(EaselError::NoOpenShape("begin_contour")),
            State::Contour => Err(EaselError::ContourAlreadyOpen),
            State::Shape => {
                self.contours.push(Vec::new());
                self.state = State::Contour;
                Ok(())
            }
        }
    }

    pub fn end_contour(&mut self) -> Result<()> {
        match self.state {
            State::Idle => Err(EaselError::NoOpenShape("end_contour")),
            State::Shape => Err(EaselError::NoOpenContour),
            State::Contour => {
                self.state = State::Shape;
                Ok(())
            }
        }
    }

    /// Finish the shape and return its contours, outer boundary first
    ///
    /// The outer boundary is returned in reverse recording order.
    pub fn end_shape(&mut self) -> Result<Vec<Vec<Point>>> {
        match self.state {
            State::Idle => Err(EaselError::NoOpenShape("end_shape")),
            State::Contour => Err(EaselError::UnclosedContour),
            State::Shape => {
                self.state = State::Idle;
                let mut contours = std::mem::take(&mut self.contours);
                if let Some(outer) = contours.first_mut() {
                    outer.reverse();
                }
                Ok(contours)
            }
        }
    }

    /// Drop any partially recorded shape
    pub fn discard(&mut self) {
        if self.is_open() {
            tracing::warn!(
                contours = self.contours.len(),
                "discarding unfinished shape"
            );
        }
        self.state = State::Idle;
        self.contours.clear();
    }
}

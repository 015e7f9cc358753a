//! Double-buffered frame targets and redraw control
//!
//! Two targets alternate as "last" (the most recently finished frame) and
//! "next". A drawn frame starts from a copy of the last one, so anything not
//! explicitly cleared persists. When nothing asked for a redraw and looping
//! is off, the last frame is presented again without running draw logic.

use easel_core::Color;

use crate::backend::{RenderBackend, TargetId};
use crate::error::{EaselError, Result};

/// Two-slot ring of render targets
#[derive(Debug)]
pub struct FrameBuffer {
    targets: [TargetId; 2],
    last: usize,
    width: u32,
    height: u32,
    pending_size: Option<(u32, u32)>,
    looping: bool,
    redraw: bool,
    frame_count: u64,
    active: Option<TargetId>,
}

impl FrameBuffer {
    /// Allocate both targets; the first frame always draws
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        width: u32,
        height: u32,
        looping: bool,
    ) -> Result<Self> {
        let targets = [
            backend.create_target(width, height)?,
            backend.create_target(width, height)?,
        ];
        for &target in &targets {
            backend.clear_target(target, Color::TRANSPARENT)?;
        }
        Ok(Self {
            targets,
            last: 0,
            width,
            height,
            pending_size: None,
            looping,
            redraw: true,
            frame_count: 0,
            active: None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Most recently finished frame
    pub fn last(&self) -> TargetId {
        self.targets[self.last]
    }

    /// Target the next drawn frame renders into
    pub fn next(&self) -> TargetId {
        self.targets[self.last ^ 1]
    }

    /// Target of the frame in progress
    pub fn active(&self) -> Option<TargetId> {
        self.active
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Draw the next frame even if looping is off
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn needs_draw(&self) -> bool {
        self.looping || self.redraw || self.pending_size.is_some()
    }

    /// Reallocate both targets before the next frame
    pub fn request_resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) && self.pending_size.is_none() {
            return;
        }
        self.pending_size = Some((width, height));
    }

    /// Start a frame
    ///
    /// Returns the target to draw into, or `None` when the last frame was
    /// presented again instead.
    pub fn begin<B: RenderBackend>(&mut self, backend: &mut B) -> Result<Option<TargetId>> {
        if let Some((width, height)) = self.pending_size.take() {
            for &target in &self.targets {
                backend.resize_target(target, width, height)?;
                backend.clear_target(target, Color::TRANSPARENT)?;
            }
            tracing::debug!(
                from = ?(self.width, self.height),
                to = ?(width, height),
                "frame targets reallocated"
            );
            self.width = width;
            self.height = height;
            self.redraw = true;
        }

        if !self.needs_draw() {
            backend.present(self.last())?;
            return Ok(None);
        }

        let next = self.next();
        backend.clear_target(next, Color::TRANSPARENT)?;
        backend.blit(self.last(), next)?;
        self.active = Some(next);
        Ok(Some(next))
    }

    /// Finish the frame started by [`begin`](Self::begin): swap and present
    pub fn finish<B: RenderBackend>(&mut self, backend: &mut B) -> Result<()> {
        let drawn = self.active.take().ok_or(EaselError::NoActiveFrame)?;
        self.last ^= 1;
        backend.present(drawn)?;
        self.redraw = false;
        self.frame_count += 1;
        Ok(())
    }
}

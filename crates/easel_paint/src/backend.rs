//! Render backend seam
//!
//! The drawing core never touches a GPU API directly. Everything it needs
//! from the graphics stack goes through [`RenderBackend`], which lets the
//! same tessellation and batching code drive `easel_gpu`'s wgpu renderer
//! or the in-memory [`HeadlessBackend`] used by tests.

use easel_core::{BlendMode, Color};
use rustc_hash::FxHashMap;

use crate::error::{EaselError, Result};

/// Opaque handle to a render target owned by a backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

/// A transformed, colored vertex ready for upload
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Graphics operations required by the drawing core
///
/// Every call is synchronous from the caller's point of view: once
/// `submit` returns, the vertex slice may be overwritten.
pub trait RenderBackend {
    /// Allocate a render target
    fn create_target(&mut self, width: u32, height: u32) -> Result<TargetId>;

    /// Reallocate a target at a new size, discarding its contents
    fn resize_target(&mut self, target: TargetId, width: u32, height: u32) -> Result<()>;

    /// Fill a whole target with one color
    fn clear_target(&mut self, target: TargetId, color: Color) -> Result<()>;

    /// Copy the contents of `src` into `dst`
    fn blit(&mut self, src: TargetId, dst: TargetId) -> Result<()>;

    /// Draw a triangle list into `target` (one draw call)
    fn submit(&mut self, target: TargetId, vertices: &[Vertex], blend: BlendMode) -> Result<()>;

    /// Hand a finished target to the host compositor
    fn present(&mut self, target: TargetId) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Headless backend
// ─────────────────────────────────────────────────────────────────────────────

/// One recorded draw call
#[derive(Clone, Debug)]
pub struct Submission {
    pub target: TargetId,
    pub vertices: Vec<Vertex>,
    pub blend: BlendMode,
}

impl Submission {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Bookkeeping for one headless target
#[derive(Clone, Debug, Default)]
pub struct HeadlessTarget {
    pub width: u32,
    pub height: u32,
    /// Number of times storage was (re)allocated
    pub allocations: u32,
    /// Color of the last clear
    pub clear_color: Color,
    /// Indices into the submission log of draws visible in this target
    pub contents: Vec<usize>,
}

/// In-memory backend that records every operation
///
/// Targets track which submissions are visible in them, so blits and
/// resizes can be checked without rasterizing anything.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u32,
    targets: FxHashMap<TargetId, HeadlessTarget>,
    submissions: Vec<Submission>,
    presented: Vec<TargetId>,
    blits: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self, id: TargetId) -> Option<&HeadlessTarget> {
        self.targets.get(&id)
    }

    pub fn target_size(&self, id: TargetId) -> Option<(u32, u32)> {
        self.targets.get(&id).map(|t| (t.width, t.height))
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Every draw call so far, oldest first
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Draw calls that are visible in `target`
    pub fn visible_in(&self, target: TargetId) -> Vec<&Submission> {
        self.targets
            .get(&target)
            .map(|t| t.contents.iter().map(|&i| &self.submissions[i]).collect())
            .unwrap_or_default()
    }

    pub fn draw_calls(&self) -> usize {
        self.submissions.len()
    }

    /// Presented targets, oldest first
    pub fn presented(&self) -> &[TargetId] {
        &self.presented
    }

    pub fn blit_count(&self) -> usize {
        self.blits
    }

    /// Forget recorded submissions and presents, targets are kept
    pub fn clear_log(&mut self) {
        self.submissions.clear();
        self.presented.clear();
        self.blits = 0;
        for target in self.targets.values_mut() {
            target.contents.clear();
        }
    }

    fn target_mut(&mut self, id: TargetId) -> Result<&mut HeadlessTarget> {
        self.targets
            .get_mut(&id)
            .ok_or(EaselError::UnknownTarget(id))
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_target(&mut self, width: u32, height: u32) -> Result<TargetId> {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.insert(
            id,
            HeadlessTarget {
                width,
                height,
                allocations: 1,
                ..Default::default()
            },
        );
        tracing::debug!(?id, width, height, "created headless target");
        Ok(id)
    }

    fn resize_target(&mut self, target: TargetId, width: u32, height: u32) -> Result<()> {
        let t = self.target_mut(target)?;
        t.width = width;
        t.height = height;
        t.allocations += 1;
        t.clear_color = Color::TRANSPARENT;
        t.contents.clear();
        Ok(())
    }

    fn clear_target(&mut self, target: TargetId, color: Color) -> Result<()> {
        let t = self.target_mut(target)?;
        t.clear_color = color;
        t.contents.clear();
        Ok(())
    }

    fn blit(&mut self, src: TargetId, dst: TargetId) -> Result<()> {
        let source = self.target_mut(src)?;
        let (clear_color, contents) = (source.clear_color, source.contents.clone());
        let dest = self.target_mut(dst)?;
        dest.clear_color = clear_color;
        dest.contents = contents;
        self.blits += 1;
        Ok(())
    }

    fn submit(&mut self, target: TargetId, vertices: &[Vertex], blend: BlendMode) -> Result<()> {
        let index = self.submissions.len();
        self.target_mut(target)?.contents.push(index);
        self.submissions.push(Submission {
            target,
            vertices: vertices.to_vec(),
            blend,
        });
        Ok(())
    }

    fn present(&mut self, target: TargetId) -> Result<()> {
        self.target_mut(target)?;
        self.presented.push(target);
        Ok(())
    }
}

//! Save/restore stacks for the active matrix and style
//!
//! Both stacks share [`StateStack`]: a current value plus a LIFO of saved
//! copies. Popping an empty stack is tolerated; it leaves the current value
//! alone, logs a warning and bumps an underflow counter so tests and
//! diagnostics can still catch unbalanced code.

use smallvec::SmallVec;

use crate::geometry::Affine2D;
use crate::style::Style;

/// Saved states kept inline before spilling to the heap
const INLINE_DEPTH: usize = 8;

/// A current value with a LIFO of saved copies
#[derive(Clone, Debug)]
pub struct StateStack<T: Copy> {
    name: &'static str,
    current: T,
    saved: SmallVec<[T; INLINE_DEPTH]>,
    underflows: usize,
}

impl<T: Copy> StateStack<T> {
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            current: initial,
            saved: SmallVec::new(),
            underflows: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Replace the active value
    pub fn set(&mut self, value: T) {
        self.current = value;
    }

    /// Replace the active value with a function of itself
    pub fn update(&mut self, f: impl FnOnce(T) -> T) {
        self.current = f(self.current);
    }

    /// Save a copy of the active value
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved value
    ///
    /// Returns `false` (and changes nothing) when nothing was saved.
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(value) => {
                self.current = value;
                true
            }
            None => {
                self.underflows += 1;
                tracing::warn!(
                    stack = self.name,
                    underflows = self.underflows,
                    "pop on empty stack ignored"
                );
                false
            }
        }
    }

    /// Number of saved values
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Number of pops that found the stack empty
    pub fn underflows(&self) -> usize {
        self.underflows
    }

    /// No saved values outstanding and no underflow ever happened
    pub fn is_balanced(&self) -> bool {
        self.saved.is_empty() && self.underflows == 0
    }

    /// Drop every saved value but keep the active one
    ///
    /// Returns how many saved values were dropped.
    pub fn clear_saved(&mut self) -> usize {
        let dropped = self.saved.len();
        self.saved.clear();
        dropped
    }

    /// Drop every saved value and reset the active one
    pub fn reset(&mut self, value: T) {
        self.saved.clear();
        self.current = value;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TransformStack
// ─────────────────────────────────────────────────────────────────────────────

/// Stack of 2D affine matrices
///
/// Every operation right-multiplies the active matrix, so the most recent
/// call is the first transform applied to geometry.
#[derive(Clone, Debug)]
pub struct TransformStack {
    inner: StateStack<Affine2D>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            inner: StateStack::new("matrix", Affine2D::IDENTITY),
        }
    }

    pub fn current(&self) -> &Affine2D {
        self.inner.current()
    }

    pub fn push(&mut self) {
        self.inner.push();
    }

    pub fn pop(&mut self) -> bool {
        self.inner.pop()
    }

    /// Right-multiply the active matrix by `transform`
    pub fn apply(&mut self, transform: &Affine2D) {
        self.inner.update(|m| m.then(transform));
    }

    pub fn apply_matrix(&mut self, a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) {
        self.apply(&Affine2D::new(a, b, c, d, tx, ty));
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.apply(&Affine2D::translation(x, y));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.apply(&Affine2D::rotation(angle));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.apply(&Affine2D::scale(sx, sy));
    }

    pub fn shear_x(&mut self, angle: f32) {
        self.apply(&Affine2D::shear_x(angle));
    }

    pub fn shear_y(&mut self, angle: f32) {
        self.apply(&Affine2D::shear_y(angle));
    }

    /// Replace the active matrix with identity, saved matrices are kept
    pub fn reset_matrix(&mut self) {
        self.inner.set(Affine2D::IDENTITY);
    }

    /// Identity with no saved matrices (start of a frame)
    pub fn reset(&mut self) {
        self.inner.reset(Affine2D::IDENTITY);
    }

    pub fn depth(&self) -> usize {
        self.inner.depth()
    }

    pub fn underflows(&self) -> usize {
        self.inner.underflows()
    }

    pub fn is_balanced(&self) -> bool {
        self.inner.is_balanced()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StyleStack
// ─────────────────────────────────────────────────────────────────────────────

/// Stack of paint states
#[derive(Clone, Debug)]
pub struct StyleStack {
    inner: StateStack<Style>,
}

impl Default for StyleStack {
    fn default() -> Self {
        Self::new(Style::default())
    }
}

impl StyleStack {
    pub fn new(initial: Style) -> Self {
        Self {
            inner: StateStack::new("style", initial),
        }
    }

    pub fn current(&self) -> &Style {
        self.inner.current()
    }

    pub fn set(&mut self, style: Style) {
        self.inner.set(style);
    }

    /// Replace the active style with a modified copy
    pub fn update(&mut self, f: impl FnOnce(Style) -> Style) {
        self.inner.update(f);
    }

    pub fn push(&mut self) {
        self.inner.push();
    }

    pub fn pop(&mut self) -> bool {
        self.inner.pop()
    }

    pub fn depth(&self) -> usize {
        self.inner.depth()
    }

    pub fn underflows(&self) -> usize {
        self.inner.underflows()
    }

    pub fn is_balanced(&self) -> bool {
        self.inner.is_balanced()
    }

    /// Forget saved styles left by unmatched pushes, keeping the active one
    pub fn clear_saved(&mut self) -> usize {
        self.inner.clear_saved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::Point;

    #[test]
    fn test_push_translate_pop_restores_identity() {
        let mut stack = TransformStack::new();
        stack.push();
        stack.translate(10.0, 0.0);
        assert_eq!(
            stack.current().transform_point(Point::ZERO),
            Point::new(10.0, 0.0)
        );
        assert!(stack.pop());
        assert_eq!(*stack.current(), Affine2D::IDENTITY);
        assert!(stack.is_balanced());
    }

    #[test]
    fn test_last_call_applies_first() {
        let mut stack = TransformStack::new();
        stack.translate(10.0, 0.0);
        stack.scale(2.0, 2.0);
        // scaled first, then translated
        assert_eq!(
            stack.current().transform_point(Point::new(1.0, 1.0)),
            Point::new(12.0, 2.0)
        );
    }

    #[test]
    fn test_pop_on_empty_is_counted_noop() {
        let mut stack = TransformStack::new();
        stack.translate(5.0, 5.0);
        let before = *stack.current();
        assert!(!stack.pop());
        assert_eq!(*stack.current(), before);
        assert_eq!(stack.underflows(), 1);
        assert!(!stack.is_balanced());
    }

    #[test]
    fn test_style_push_pop_restores_fill() {
        let mut styles = StyleStack::default();
        let original = *styles.current();
        styles.push();
        styles.update(|s| s.with_fill(Color::RED));
        assert_eq!(styles.current().fill, Color::RED);
        styles.pop();
        assert_eq!(*styles.current(), original);
    }

    #[test]
    fn test_clear_saved_keeps_current_style() {
        let mut styles = StyleStack::default();
        styles.push();
        styles.update(|s| s.with_fill(Color::BLUE));
        styles.push();
        assert_eq!(styles.clear_saved(), 2);
        assert_eq!(styles.current().fill, Color::BLUE);
        assert_eq!(styles.depth(), 0);
        assert!(!styles.pop());
        assert_eq!(styles.current().fill, Color::BLUE);
    }

    #[test]
    fn test_deep_nesting_spills_to_heap() {
        let mut stack = TransformStack::new();
        for i in 0..(INLINE_DEPTH * 3) {
            stack.push();
            stack.translate(i as f32, 0.0);
        }
        assert_eq!(stack.depth(), INLINE_DEPTH * 3);
        for _ in 0..(INLINE_DEPTH * 3) {
            assert!(stack.pop());
        }
        assert!(stack.current().is_identity());
    }

    #[test]
    fn test_reset_matrix_keeps_saved() {
        let mut stack = TransformStack::new();
        stack.translate(3.0, 4.0);
        stack.push();
        stack.rotate(1.0);
        stack.reset_matrix();
        assert!(stack.current().is_identity());
        assert!(stack.pop());
        assert_eq!(*stack.current(), Affine2D::translation(3.0, 4.0));
    }
}

//! Presentation boundary.

use crate::world::WorldView;

/// Draws the world once per rendered frame.
///
/// The view borrows the world and is only valid for the duration of the
/// call.
pub trait Renderer {
    fn render(&mut self, view: WorldView<'_>, frame_dt: f64);
}

/// Renders nothing. For headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _view: WorldView<'_>, _frame_dt: f64) {}
}

//! Pointer collaborators.

use std::cell::Cell;
use std::rc::Rc;

use shading::Vec2;

/// Source of the live pointer position, in surface pixels.
pub trait PointerSource {
    /// `None` when no position is available right now.
    fn pointer_position(&self) -> Option<Vec2>;
}

/// A source that never has a position.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPointer;

impl PointerSource for NoPointer {
    fn pointer_position(&self) -> Option<Vec2> {
        None
    }
}

/// Position written by the host (an input handler, a CLI flag, a test) and
/// read by the driver. Clones share the same cell.
#[derive(Clone, Debug, Default)]
pub struct SharedPointer {
    cell: Rc<Cell<Option<Vec2>>>,
}

impl SharedPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, x: f32, y: f32) {
        self.cell.set(Some(Vec2::new(x, y)));
    }

    /// Pointer left the surface.
    pub fn clear(&self) {
        self.cell.set(None);
    }
}

impl PointerSource for SharedPointer {
    fn pointer_position(&self) -> Option<Vec2> {
        self.cell.get()
    }
}

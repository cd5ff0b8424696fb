//! Test helpers shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::geometry::{Rect, Size};
use crate::peer::NativePeer;

/// Route `log` output through the test harness. Safe to call from every test.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Peer with a fixed intrinsic size that records how the engine drives it.
///
/// The recordings are shared handles, so a test can keep them after the peer
/// has moved into the tree.
pub(crate) struct RecordingPeer {
    size: Size,
    measure_calls: Rc<Cell<usize>>,
    constraints: Rc<RefCell<Vec<Size>>>,
    frames: Rc<RefCell<Vec<Rect>>>,
}

impl RecordingPeer {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            measure_calls: Rc::default(),
            constraints: Rc::default(),
            frames: Rc::default(),
        }
    }

    pub(crate) fn measure_calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.measure_calls)
    }

    /// Every constraint passed to `measure`, oldest first
    pub(crate) fn constraints(&self) -> Rc<RefCell<Vec<Size>>> {
        Rc::clone(&self.constraints)
    }

    /// Every frame committed, oldest first
    pub(crate) fn frames(&self) -> Rc<RefCell<Vec<Rect>>> {
        Rc::clone(&self.frames)
    }
}

impl NativePeer for RecordingPeer {
    fn measure(&mut self, constraints: Size) -> Size {
        self.measure_calls.set(self.measure_calls.get() + 1);
        self.constraints.borrow_mut().push(constraints);
        self.size
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frames.borrow_mut().push(frame);
    }
}

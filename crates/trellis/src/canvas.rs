use std::any::Any;

use crate::error::{require_finite, LayoutError};
use crate::geometry::{same_length, Rect, Size};
use crate::layout::{LayoutContext, LayoutPolicy};
use crate::tree::{LayoutTree, NodeId};

/// Attached offsets of a Canvas child. NaN means unset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasPosition {
    pub left: f64,
    pub top: f64,
    /// Only used when `left` is unset
    pub right: f64,
    /// Only used when `top` is unset
    pub bottom: f64,
}

impl Default for CanvasPosition {
    fn default() -> Self {
        Self {
            left: f64::NAN,
            top: f64::NAN,
            right: f64::NAN,
            bottom: f64::NAN,
        }
    }
}

/// Places each child at its attached offsets with its desired size.
#[derive(Clone, Copy, Debug, Default)]
pub struct Canvas;

impl Canvas {
    pub fn new() -> Self {
        Self
    }

    pub fn set_left(tree: &mut LayoutTree, id: NodeId, left: f64) -> Result<(), LayoutError> {
        require_finite("Canvas.Left", left)?;
        update_position(tree, id, |position| position.left = left)
    }

    pub fn set_top(tree: &mut LayoutTree, id: NodeId, top: f64) -> Result<(), LayoutError> {
        require_finite("Canvas.Top", top)?;
        update_position(tree, id, |position| position.top = top)
    }

    pub fn set_right(tree: &mut LayoutTree, id: NodeId, right: f64) -> Result<(), LayoutError> {
        require_finite("Canvas.Right", right)?;
        update_position(tree, id, |position| position.right = right)
    }

    pub fn set_bottom(tree: &mut LayoutTree, id: NodeId, bottom: f64) -> Result<(), LayoutError> {
        require_finite("Canvas.Bottom", bottom)?;
        update_position(tree, id, |position| position.bottom = bottom)
    }

    pub fn clear_left(tree: &mut LayoutTree, id: NodeId) -> Result<(), LayoutError> {
        update_position(tree, id, |position| position.left = f64::NAN)
    }

    pub fn clear_top(tree: &mut LayoutTree, id: NodeId) -> Result<(), LayoutError> {
        update_position(tree, id, |position| position.top = f64::NAN)
    }

    pub fn clear_right(tree: &mut LayoutTree, id: NodeId) -> Result<(), LayoutError> {
        update_position(tree, id, |position| position.right = f64::NAN)
    }

    pub fn clear_bottom(tree: &mut LayoutTree, id: NodeId) -> Result<(), LayoutError> {
        update_position(tree, id, |position| position.bottom = f64::NAN)
    }

    pub fn position(tree: &LayoutTree, id: NodeId) -> CanvasPosition {
        tree.canvas_positions.get(id).copied().unwrap_or_default()
    }

    /// Attached left offset (NaN when unset)
    pub fn left(tree: &LayoutTree, id: NodeId) -> f64 {
        Self::position(tree, id).left
    }

    pub fn top(tree: &LayoutTree, id: NodeId) -> f64 {
        Self::position(tree, id).top
    }
}

fn update_position(
    tree: &mut LayoutTree,
    id: NodeId,
    update: impl FnOnce(&mut CanvasPosition),
) -> Result<(), LayoutError> {
    tree.require(id)?;
    let current = Canvas::position(tree, id);
    let mut next = current;
    update(&mut next);
    let changed = !(same_length(current.left, next.left)
        && same_length(current.top, next.top)
        && same_length(current.right, next.right)
        && same_length(current.bottom, next.bottom));
    if changed {
        tree.canvas_positions.insert(id, next);
        tree.invalidate_parent(id);
    }
    Ok(())
}

/// Resolve one axis: the leading offset, else the trailing one, else 0.
fn offset(leading: f64, trailing: f64, container: f64, size: f64) -> f64 {
    if !leading.is_nan() {
        leading
    } else if !trailing.is_nan() {
        container - trailing - size
    } else {
        0.0
    }
}

/// Extent a child reaches from the canvas origin.
fn reach(leading: f64, trailing: f64, size: f64) -> f64 {
    if !leading.is_nan() {
        leading + size
    } else if !trailing.is_nan() {
        trailing + size
    } else {
        size
    }
}

impl LayoutPolicy for Canvas {
    fn kind(&self) -> &'static str {
        "Canvas"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        let mut extent = Size::ZERO;
        for child in cx.children() {
            let desired = cx.measure_child(child, Size::INFINITE);
            let position = cx.canvas_position(child);
            extent.width = extent
                .width
                .max(reach(position.left, position.right, desired.width));
            extent.height = extent
                .height
                .max(reach(position.top, position.bottom, desired.height));
        }
        extent.min(available)
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        for child in cx.children() {
            let desired = cx.desired_size(child);
            let position = cx.canvas_position(child);
            let x = offset(position.left, position.right, final_size.width, desired.width);
            let y = offset(position.top, position.bottom, final_size.height, desired.height);
            cx.arrange_child(child, Rect::new(x, y, desired.width, desired.height));
        }
        final_size
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

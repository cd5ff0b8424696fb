use std::any::Any;

use trellis_macros::WithBuilders;

use crate::error::{require_finite, LayoutError};
use crate::geometry::{Point, Rect, Size};
use crate::layout::{LayoutContext, LayoutPolicy};
use crate::tree::{LayoutTree, NodeId};

/// Viewport onto a single content node that may be larger than itself.
///
/// The content is measured unconstrained on each scrollable axis; the part
/// that does not fit is the overflow, and the content is arranged shifted by
/// the current scroll offset.
#[derive(Clone, Copy, Debug, PartialEq, WithBuilders)]
pub struct ScrollViewer {
    pub can_scroll_horizontally: bool,
    pub can_scroll_vertically: bool,
    #[with_builders(skip)]
    content: Option<NodeId>,
    #[with_builders(skip)]
    offset: Point,
    #[with_builders(skip)]
    extent: Size,
    #[with_builders(skip)]
    viewport: Size,
}

impl Default for ScrollViewer {
    fn default() -> Self {
        Self {
            can_scroll_horizontally: false,
            can_scroll_vertically: true,
            content: None,
            offset: Point::ZERO,
            extent: Size::ZERO,
            viewport: Size::ZERO,
        }
    }
}

impl ScrollViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly assigned content; falls back to the first child when unset
    /// or no longer a child.
    pub fn set_content(&mut self, content: Option<NodeId>) {
        self.content = content;
    }

    /// Current scroll offset
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Desired size of the content after the last measure
    pub fn extent(&self) -> Size {
        self.extent
    }

    /// Visible size after the last arrange
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// How far the content can be scrolled on each axis.
    pub fn overflow(&self) -> Size {
        Size::new(
            if self.can_scroll_horizontally {
                (self.extent.width - self.viewport.width).max(0.0)
            } else {
                0.0
            },
            if self.can_scroll_vertically {
                (self.extent.height - self.viewport.height).max(0.0)
            } else {
                0.0
            },
        )
    }

    fn clamp_offset(&self, offset: Point) -> Point {
        let overflow = self.overflow();
        Point::new(
            offset.x.clamp(0.0, overflow.width),
            offset.y.clamp(0.0, overflow.height),
        )
    }

    /// Scroll the viewer at `id`, clamping to the current overflow.
    ///
    /// Returns the offset actually applied. Only the arrange pass is
    /// invalidated.
    pub fn scroll_to(
        tree: &mut LayoutTree,
        id: NodeId,
        offset: Point,
    ) -> Result<Point, LayoutError> {
        require_finite("ScrollViewer.HorizontalOffset", offset.x)?;
        require_finite("ScrollViewer.VerticalOffset", offset.y)?;

        let node = tree.require_mut(id)?;
        let kind = node.kind();
        let viewer = node
            .policy_mut::<ScrollViewer>()
            .ok_or(LayoutError::PolicyMismatch {
                node: id,
                expected: std::any::type_name::<ScrollViewer>(),
                actual: kind,
            })?;

        let applied = viewer.clamp_offset(offset);
        if applied != viewer.offset {
            viewer.offset = applied;
            log::debug!("scrolled {id:?} to {applied:?}");
            tree.invalidate_arrange(id);
        }
        Ok(applied)
    }

    fn resolve_content(&self, children: &[NodeId]) -> Option<NodeId> {
        self.content
            .filter(|content| children.contains(content))
            .or_else(|| children.first().copied())
    }
}

impl LayoutPolicy for ScrollViewer {
    fn kind(&self) -> &'static str {
        "ScrollViewer"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        let Some(content) = self.resolve_content(&cx.children()) else {
            self.extent = Size::ZERO;
            return Size::ZERO;
        };
        let constraint = Size::new(
            if self.can_scroll_horizontally {
                f64::INFINITY
            } else {
                available.width
            },
            if self.can_scroll_vertically {
                f64::INFINITY
            } else {
                available.height
            },
        );
        self.extent = cx.measure_child(content, constraint);
        self.extent.min(available)
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        self.viewport = final_size;
        self.offset = self.clamp_offset(self.offset);

        if let Some(content) = self.resolve_content(&cx.children()) {
            let width = if self.can_scroll_horizontally {
                self.extent.width.max(final_size.width)
            } else {
                final_size.width
            };
            let height = if self.can_scroll_vertically {
                self.extent.height.max(final_size.height)
            } else {
                final_size.height
            };
            cx.arrange_child(
                content,
                Rect::new(-self.offset.x, -self.offset.y, width, height),
            );
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

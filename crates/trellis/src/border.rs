use std::any::Any;

use crate::error::{require_non_negative, LayoutError};
use crate::geometry::{Point, Rect, Size, Thickness};
use crate::layout::{LayoutContext, LayoutPolicy};
use crate::tree::{LayoutTree, NodeId};

/// Single-child decorator that insets its content by a border and padding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Border {
    border_thickness: Thickness,
    padding: Thickness,
    content: Option<NodeId>,
}

impl Border {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn border_thickness(&self) -> Thickness {
        self.border_thickness
    }

    pub fn padding(&self) -> Thickness {
        self.padding
    }

    pub fn set_border_thickness(&mut self, thickness: Thickness) -> Result<(), LayoutError> {
        validate_inset("BorderThickness", thickness)?;
        self.border_thickness = thickness;
        Ok(())
    }

    pub fn set_padding(&mut self, padding: Thickness) -> Result<(), LayoutError> {
        validate_inset("Padding", padding)?;
        self.padding = padding;
        Ok(())
    }

    /// Explicitly assigned content. Only honored while it is a child of the
    /// border; otherwise the first child is used.
    pub fn set_content(&mut self, content: Option<NodeId>) {
        self.content = content;
    }

    fn insets(&self) -> Thickness {
        self.border_thickness + self.padding
    }

    /// The node the border at `id` decorates, if any.
    pub fn content(tree: &LayoutTree, id: NodeId) -> Option<NodeId> {
        let explicit = tree.panel::<Border>(id).ok().and_then(|border| border.content);
        resolve_content(tree.children(id), explicit)
    }
}

/// Insets must be finite and, unlike margins, non-negative.
fn validate_inset(property: &'static str, inset: Thickness) -> Result<(), LayoutError> {
    inset.validate(property)?;
    [inset.left, inset.top, inset.right, inset.bottom]
        .into_iter()
        .try_for_each(|value| require_non_negative(property, value))
}

fn resolve_content(children: &[NodeId], explicit: Option<NodeId>) -> Option<NodeId> {
    explicit
        .filter(|content| children.contains(content))
        .or_else(|| children.first().copied())
}

impl LayoutPolicy for Border {
    fn kind(&self) -> &'static str {
        "Border"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        let insets = self.insets();
        let desired = match resolve_content(&cx.children(), self.content) {
            Some(content) => cx.measure_child(content, available.deflate(insets)),
            None => Size::ZERO,
        };
        desired.inflate(insets)
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        if let Some(content) = resolve_content(&cx.children(), self.content) {
            let slot = Rect::from_origin_size(Point::ZERO, final_size).deflate(self.insets());
            cx.arrange_child(content, slot);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPeer;

    fn bordered(tree: &mut LayoutTree) -> (NodeId, NodeId) {
        let mut border = Border::new();
        border.set_border_thickness(Thickness::uniform(2.0)).unwrap();
        border.set_padding(Thickness::uniform(3.0)).unwrap();
        let id = tree.create(border);
        let child = tree.create_leaf(RecordingPeer::new(20.0, 10.0));
        tree.add_child(id, child).unwrap();
        (id, child)
    }

    #[test]
    fn test_insets_wrap_content() {
        let mut tree = LayoutTree::new();
        let (border, child) = bordered(&mut tree);

        tree.update_layout(border, Size::new(100.0, 50.0)).unwrap();
        assert_eq!(tree.node(border).unwrap().desired_size(), Size::new(30.0, 20.0));
        assert_eq!(tree.node(child).unwrap().frame(), Rect::new(5.0, 5.0, 90.0, 40.0));
    }

    #[test]
    fn test_empty_border_is_its_insets() {
        let mut tree = LayoutTree::new();
        let mut border = Border::new();
        border.set_padding(Thickness::symmetric(4.0, 1.0)).unwrap();
        let id = tree.create(border);
        assert_eq!(tree.measure(id, Size::INFINITE).unwrap(), Size::new(8.0, 2.0));
    }

    #[test]
    fn test_explicit_content_falls_back_to_first_child() {
        let mut tree = LayoutTree::new();
        let (border, first) = bordered(&mut tree);
        let second = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        tree.add_child(border, second).unwrap();

        tree.panel_mut::<Border>(border).unwrap().set_content(Some(second));
        assert_eq!(Border::content(&tree, border), Some(second));

        tree.remove_child(border, second).unwrap();
        assert_eq!(Border::content(&tree, border), Some(first));
    }

    #[test]
    fn test_thickness_validated() {
        let mut border = Border::new();
        assert!(border
            .set_border_thickness(Thickness::new(0.0, f64::INFINITY, 0.0, 0.0))
            .is_err());
        assert!(border.set_padding(Thickness::uniform(-1.0)).is_err());
        assert_eq!(border.padding(), Thickness::ZERO);
    }
}

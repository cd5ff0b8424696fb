use std::fmt::Write;

use crate::tree::{LayoutTree, NodeId};

/// Fields printed by [`LayoutTree::dump`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DumpOptions {
    /// Committed parent-relative frame
    pub show_frames: bool,
    /// Desired size from the last measure
    pub show_desired: bool,
    /// Non-zero margins
    pub show_margins: bool,
    /// Flag nodes whose measure or arrange is pending
    pub show_invalid: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self::none().with_frames(true)
    }
}

impl DumpOptions {
    /// Kinds and ids only
    pub const fn none() -> Self {
        Self {
            show_frames: false,
            show_desired: false,
            show_margins: false,
            show_invalid: false,
        }
    }

    pub const fn all() -> Self {
        Self {
            show_frames: true,
            show_desired: true,
            show_margins: true,
            show_invalid: true,
        }
    }

    pub const fn with_frames(mut self, enabled: bool) -> Self {
        self.show_frames = enabled;
        self
    }

    pub const fn with_desired(mut self, enabled: bool) -> Self {
        self.show_desired = enabled;
        self
    }

    pub const fn with_margins(mut self, enabled: bool) -> Self {
        self.show_margins = enabled;
        self
    }

    pub const fn with_invalid(mut self, enabled: bool) -> Self {
        self.show_invalid = enabled;
        self
    }
}

impl LayoutTree {
    /// Indented outline of the subtree under `root`, one node per line.
    pub fn dump(&self, root: NodeId, options: DumpOptions) -> String {
        let mut out = String::new();
        self.dump_node(root, 0, options, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, options: DumpOptions, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };

        // Writing into a String cannot fail
        let _ = write!(out, "{:indent$}{} {id:?}", "", node.kind(), indent = depth * 2);
        if node.is_collapsed() {
            out.push_str(" collapsed");
        }
        if options.show_frames {
            let frame = node.frame();
            let _ = write!(
                out,
                " frame=({}, {}, {}x{})",
                frame.x, frame.y, frame.width, frame.height
            );
        }
        if options.show_desired {
            let desired = node.desired_size();
            let _ = write!(out, " desired={}x{}", desired.width, desired.height);
        }
        if options.show_margins && !node.margin().is_zero() {
            let m = node.margin();
            let _ = write!(out, " margin=({}, {}, {}, {})", m.left, m.top, m.right, m.bottom);
        }
        if options.show_invalid {
            if !node.is_measure_valid() {
                out.push_str(" [measure]");
            }
            if !node.is_arrange_valid() {
                out.push_str(" [arrange]");
            }
        }
        out.push('\n');

        for &child in node.children() {
            self.dump_node(child, depth + 1, options, out);
        }
    }
}

//! # trellis
//!
//! Platform agnostic measure/arrange layout engine.
//!
//! Layout nodes live in a [`LayoutTree`]. Leaves wrap a [`NativePeer`] (the
//! platform widget) and panels position their children through a
//! [`LayoutPolicy`]. A layout pass measures the tree bottom-up and then
//! arranges it top-down, committing parent-relative frames to the peers.
//!
//! ```
//! use trellis::{ColumnDefinition, FixedSizePeer, Grid, LayoutTree, Size};
//!
//! let mut tree = LayoutTree::new();
//! let mut grid = Grid::new();
//! grid.add_column(ColumnDefinition::star(1.0))?;
//! grid.add_column(ColumnDefinition::star(2.0))?;
//! let grid = tree.create(grid);
//!
//! let label = tree.create_leaf(FixedSizePeer::new(20.0, 10.0));
//! tree.add_child(grid, label)?;
//! Grid::set_column(&mut tree, label, 1)?;
//!
//! tree.update_layout(grid, Size::new(90.0, 30.0))?;
//! assert_eq!(tree.node(label).unwrap().frame().x, 30.0);
//! # Ok::<(), trellis::LayoutError>(())
//! ```
//!
//! ## Core Types
//!
//! - [`LayoutTree`] - Arena owning every node and the attached-property tables
//! - [`Node`] - Element properties and cached layout results
//! - [`LayoutPolicy`] - Override points of the measure/arrange protocol
//!
//! ## Panels
//!
//! - [`Grid`], [`DockPanel`], [`WrapPanel`], [`Canvas`], [`StackPanel`]
//! - [`Border`], [`ScrollViewer`], [`ListBox`]
//!
//! ## Diagnostics
//!
//! - [`LayoutTree::hit_test`] - Nodes under a point, root first
//! - [`LayoutTree::dump`] - Indented outline of a subtree

mod border;
mod canvas;
mod debug;
mod dock_panel;
mod error;
mod geometry;
mod grid;
mod hit_test;
mod layout;
mod node;
mod options;
mod peer;
mod scroll_viewer;
mod stack_panel;
mod tree;
mod wrap_panel;

#[cfg(test)]
mod testing;

// Core types
pub use error::*;
pub use geometry::*;
pub use layout::*;
pub use node::*;
pub use options::*;
pub use peer::*;
pub use tree::*;

// Panels
pub use border::*;
pub use canvas::*;
pub use dock_panel::*;
pub use grid::*;
pub use scroll_viewer::*;
pub use stack_panel::*;
pub use wrap_panel::*;

// Diagnostics
pub use debug::*;
pub use hit_test::*;

//! Window layout example
//!
//! Builds a typical application window (toolbar, scrolling sidebar, form in
//! a grid, status bar) out of fixed-size peers, lays it out at two window
//! sizes and prints the resulting frames.
//!
//! Run with `RUST_LOG=trellis=debug` to see the layout passes.

use trellis::{
    Border, ColumnDefinition, Dock, DockPanel, DumpOptions, FixedSizePeer, Grid, LayoutError,
    LayoutOptions, LayoutTree, ListBox, NodeId, Orientation, Point, RowDefinition, ScrollViewer,
    Size, StackPanel, Thickness, VerticalAlignment,
};

fn toolbar(tree: &mut LayoutTree) -> Result<NodeId, LayoutError> {
    let bar = tree.create(StackPanel::new(Orientation::Horizontal));
    for width in [48.0, 48.0, 64.0] {
        let button = tree.create_leaf(FixedSizePeer::new(width, 24.0));
        tree.set_margin(button, Thickness::symmetric(2.0, 4.0))?;
        tree.add_child(bar, button)?;
    }
    Ok(bar)
}

fn sidebar(tree: &mut LayoutTree) -> Result<NodeId, LayoutError> {
    let viewer = tree.create(ScrollViewer::new());
    tree.set_width(viewer, 160.0)?;

    let list = tree.create(ListBox::new());
    tree.add_child(viewer, list)?;
    for _ in 0..40 {
        let item = tree.create_leaf(FixedSizePeer::new(120.0, 18.0));
        tree.add_child(list, item)?;
    }
    Ok(viewer)
}

fn form(tree: &mut LayoutTree) -> Result<NodeId, LayoutError> {
    let mut grid = Grid::new();
    grid.add_column(ColumnDefinition::auto())?;
    grid.add_column(ColumnDefinition::star(1.0).with_min_width(120.0))?;
    for _ in 0..3 {
        grid.add_row(RowDefinition::auto())?;
    }
    grid.add_row(RowDefinition::star(1.0))?;
    let grid = tree.create(grid);

    for (row, label_width) in [70.0, 95.0, 40.0].into_iter().enumerate() {
        let label = tree.create_leaf(FixedSizePeer::new(label_width, 20.0));
        tree.set_vertical_alignment(label, VerticalAlignment::Center)?;
        tree.add_child(grid, label)?;
        Grid::set_row(tree, label, row)?;

        let field = tree.create_leaf(FixedSizePeer::new(100.0, 26.0));
        tree.set_margin(field, Thickness::uniform(4.0))?;
        tree.add_child(grid, field)?;
        Grid::set_row(tree, field, row)?;
        Grid::set_column(tree, field, 1)?;
    }

    let notes = tree.create_leaf(FixedSizePeer::new(100.0, 60.0));
    tree.add_child(grid, notes)?;
    Grid::set_row(tree, notes, 3)?;
    Grid::set_column_span(tree, notes, 2)?;

    let mut frame = Border::new();
    frame.set_border_thickness(Thickness::uniform(1.0))?;
    frame.set_padding(Thickness::uniform(8.0))?;
    let border = tree.create(frame);
    tree.add_child(border, grid)?;
    Ok(border)
}

fn build(tree: &mut LayoutTree) -> Result<NodeId, LayoutError> {
    let root = tree.create(DockPanel::new());

    let bar = toolbar(tree)?;
    tree.add_child(root, bar)?;
    DockPanel::set_dock(tree, bar, Dock::Top)?;

    let status = tree.create_leaf(FixedSizePeer::new(10.0, 22.0));
    tree.add_child(root, status)?;
    DockPanel::set_dock(tree, status, Dock::Bottom)?;

    let side = sidebar(tree)?;
    tree.add_child(root, side)?;
    DockPanel::set_dock(tree, side, Dock::Left)?;

    let content = form(tree)?;
    tree.add_child(root, content)?;
    Ok(root)
}

fn main() -> Result<(), LayoutError> {
    env_logger::init();

    let mut tree = LayoutTree::with_options(LayoutOptions::default().with_layout_rounding(true))?;
    let root = build(&mut tree)?;

    for window in [Size::new(800.0, 600.0), Size::new(480.0, 320.0)] {
        tree.update_layout(root, window)?;
        println!("== {} x {} ==", window.width, window.height);
        print!("{}", tree.dump(root, DumpOptions::none().with_frames(true)));
    }

    let point = Point::new(300.0, 60.0);
    if let Some(hit) = tree.hit_test_deepest(root, point) {
        println!(
            "hit at {point:?}: {} {:?} ({:?})",
            tree.node(hit.node).map(|node| node.kind()).unwrap_or("?"),
            hit.node,
            hit.node_rect
        );
    }

    let side = tree.child_at(root, 2)?;
    let applied = ScrollViewer::scroll_to(&mut tree, side, Point::new(0.0, 100.0))?;
    tree.update_layout(root, Size::new(480.0, 320.0))?;
    log::info!("sidebar scrolled to {applied:?}");

    Ok(())
}

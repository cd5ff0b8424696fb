//! Grid layout: absolute, auto and star tracks.
//!
//! Measure runs in phases:
//! 1. absolute sizes and track minimums are debited from the budget
//! 2. children are classified by the tracks they span
//! 3. auto singles (non-star first) grow their auto track
//! 4. auto spanners spread their residual over the spanned flexible tracks
//! 5. star tracks share what is left by weight, honoring min/max
//! 6. children touching a star track are measured again at the final sizes
//! 7. offsets and actual sizes are written back onto the definitions
//!
//! On an unconstrained axis there is nothing to distribute, so star tracks
//! size to their content like auto tracks.

use std::any::Any;
use std::ops::Range;

use trellis_macros::WithBuilders;

use crate::error::{require_non_negative, require_upper_bound, LayoutError};
use crate::geometry::{clamp_min_max, Rect, Size};
use crate::layout::{LayoutContext, LayoutPolicy};
use crate::tree::{LayoutTree, NodeId};

/// Residuals below this are treated as fully distributed.
const EPSILON: f64 = 1e-6;

/// Sizing mode of a column or row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridLength {
    /// Fixed size in layout units
    Absolute(f64),
    /// Size to content
    Auto,
    /// Weighted share of the leftover space
    Star(f64),
}

impl Default for GridLength {
    fn default() -> Self {
        Self::Star(1.0)
    }
}

impl From<f64> for GridLength {
    fn from(value: f64) -> Self {
        Self::Absolute(value)
    }
}

impl GridLength {
    pub fn is_absolute(&self) -> bool {
        matches!(self, Self::Absolute(_))
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    pub fn is_star(&self) -> bool {
        matches!(self, Self::Star(_))
    }

    fn validate(&self, property: &'static str) -> Result<(), LayoutError> {
        match *self {
            Self::Absolute(value) => require_non_negative(property, value),
            Self::Auto => Ok(()),
            Self::Star(weight) if weight.is_finite() && weight > 0.0 => Ok(()),
            Self::Star(weight) => Err(LayoutError::InvalidValue {
                property,
                value: weight,
                expected: "a finite, positive star weight",
            }),
        }
    }
}

/// A grid column.
///
/// `actual_width` and `offset` are outputs of the grid's measure pass.
#[derive(Clone, Debug, PartialEq, WithBuilders)]
pub struct ColumnDefinition {
    #[with_builders(into)]
    width: GridLength,
    min_width: f64,
    max_width: f64,
    #[with_builders(skip)]
    actual_width: f64,
    #[with_builders(skip)]
    offset: f64,
}

impl Default for ColumnDefinition {
    fn default() -> Self {
        Self::new(GridLength::default())
    }
}

impl ColumnDefinition {
    pub fn new(width: impl Into<GridLength>) -> Self {
        Self {
            width: width.into(),
            min_width: 0.0,
            max_width: f64::INFINITY,
            actual_width: 0.0,
            offset: 0.0,
        }
    }

    pub fn absolute(width: f64) -> Self {
        Self::new(GridLength::Absolute(width))
    }

    pub fn auto() -> Self {
        Self::new(GridLength::Auto)
    }

    pub fn star(weight: f64) -> Self {
        Self::new(GridLength::Star(weight))
    }

    pub fn width(&self) -> GridLength {
        self.width
    }

    pub fn min_width(&self) -> f64 {
        self.min_width
    }

    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    /// Resolved width after the last measure
    pub fn actual_width(&self) -> f64 {
        self.actual_width
    }

    /// Distance from the grid's left edge after the last measure
    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn validate(&self) -> Result<(), LayoutError> {
        self.width.validate("ColumnDefinition.Width")?;
        require_non_negative("ColumnDefinition.MinWidth", self.min_width)?;
        require_upper_bound("ColumnDefinition.MaxWidth", self.max_width)
    }

    fn track(&self) -> Track {
        Track::new(self.width, self.min_width, self.max_width)
    }
}

/// A grid row.
///
/// `actual_height` and `offset` are outputs of the grid's measure pass.
#[derive(Clone, Debug, PartialEq, WithBuilders)]
pub struct RowDefinition {
    #[with_builders(into)]
    height: GridLength,
    min_height: f64,
    max_height: f64,
    #[with_builders(skip)]
    actual_height: f64,
    #[with_builders(skip)]
    offset: f64,
}

impl Default for RowDefinition {
    fn default() -> Self {
        Self::new(GridLength::default())
    }
}

impl RowDefinition {
    pub fn new(height: impl Into<GridLength>) -> Self {
        Self {
            height: height.into(),
            min_height: 0.0,
            max_height: f64::INFINITY,
            actual_height: 0.0,
            offset: 0.0,
        }
    }

    pub fn absolute(height: f64) -> Self {
        Self::new(GridLength::Absolute(height))
    }

    pub fn auto() -> Self {
        Self::new(GridLength::Auto)
    }

    pub fn star(weight: f64) -> Self {
        Self::new(GridLength::Star(weight))
    }

    pub fn height(&self) -> GridLength {
        self.height
    }

    pub fn min_height(&self) -> f64 {
        self.min_height
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn actual_height(&self) -> f64 {
        self.actual_height
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn validate(&self) -> Result<(), LayoutError> {
        self.height.validate("RowDefinition.Height")?;
        require_non_negative("RowDefinition.MinHeight", self.min_height)?;
        require_upper_bound("RowDefinition.MaxHeight", self.max_height)
    }

    fn track(&self) -> Track {
        Track::new(self.height, self.min_height, self.max_height)
    }
}

/// Cell placement of a grid child. Missing entries read as the default
/// (column 0, row 0, span 1 on both axes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPosition {
    pub column: usize,
    pub column_span: usize,
    pub row: usize,
    pub row_span: usize,
}

impl Default for GridPosition {
    fn default() -> Self {
        Self {
            column: 0,
            column_span: 1,
            row: 0,
            row_span: 1,
        }
    }
}

/// Panel arranging children in cells of columns and rows.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    columns: Vec<ColumnDefinition>,
    rows: Vec<RowDefinition>,
    /// Resolved (offset, size) per column from the last measure
    resolved_columns: Vec<(f64, f64)>,
    resolved_rows: Vec<(f64, f64)>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, column: ColumnDefinition) -> Result<(), LayoutError> {
        column.validate()?;
        self.columns.push(column);
        Ok(())
    }

    pub fn add_row(&mut self, row: RowDefinition) -> Result<(), LayoutError> {
        row.validate()?;
        self.rows.push(row);
        Ok(())
    }

    pub fn insert_column(
        &mut self,
        index: usize,
        column: ColumnDefinition,
    ) -> Result<(), LayoutError> {
        check_insert("column", index, self.columns.len())?;
        column.validate()?;
        self.columns.insert(index, column);
        Ok(())
    }

    pub fn insert_row(&mut self, index: usize, row: RowDefinition) -> Result<(), LayoutError> {
        check_insert("row", index, self.rows.len())?;
        row.validate()?;
        self.rows.insert(index, row);
        Ok(())
    }

    pub fn remove_column(&mut self, index: usize) -> Result<ColumnDefinition, LayoutError> {
        check_index("column", index, self.columns.len())?;
        Ok(self.columns.remove(index))
    }

    pub fn remove_row(&mut self, index: usize) -> Result<RowDefinition, LayoutError> {
        check_index("row", index, self.rows.len())?;
        Ok(self.rows.remove(index))
    }

    pub fn column_definition(&self, index: usize) -> Result<&ColumnDefinition, LayoutError> {
        check_index("column", index, self.columns.len())?;
        Ok(&self.columns[index])
    }

    pub fn row_definition(&self, index: usize) -> Result<&RowDefinition, LayoutError> {
        check_index("row", index, self.rows.len())?;
        Ok(&self.rows[index])
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn rows(&self) -> &[RowDefinition] {
        &self.rows
    }

    // ------------------------------------------------------------------
    // Attached properties
    // ------------------------------------------------------------------

    pub fn set_column(tree: &mut LayoutTree, id: NodeId, column: usize) -> Result<(), LayoutError> {
        update_position(tree, id, |position| position.column = column)
    }

    pub fn set_row(tree: &mut LayoutTree, id: NodeId, row: usize) -> Result<(), LayoutError> {
        update_position(tree, id, |position| position.row = row)
    }

    /// Fails with [`LayoutError::InvalidSpan`] for a span of 0.
    pub fn set_column_span(
        tree: &mut LayoutTree,
        id: NodeId,
        span: usize,
    ) -> Result<(), LayoutError> {
        if span == 0 {
            return Err(LayoutError::InvalidSpan {
                property: "ColumnSpan",
                value: span,
            });
        }
        update_position(tree, id, |position| position.column_span = span)
    }

    /// Fails with [`LayoutError::InvalidSpan`] for a span of 0.
    pub fn set_row_span(tree: &mut LayoutTree, id: NodeId, span: usize) -> Result<(), LayoutError> {
        if span == 0 {
            return Err(LayoutError::InvalidSpan {
                property: "RowSpan",
                value: span,
            });
        }
        update_position(tree, id, |position| position.row_span = span)
    }

    pub fn position(tree: &LayoutTree, id: NodeId) -> GridPosition {
        tree.grid_positions.get(id).copied().unwrap_or_default()
    }

    pub fn column(tree: &LayoutTree, id: NodeId) -> usize {
        Self::position(tree, id).column
    }

    pub fn row(tree: &LayoutTree, id: NodeId) -> usize {
        Self::position(tree, id).row
    }

    pub fn column_span(tree: &LayoutTree, id: NodeId) -> usize {
        Self::position(tree, id).column_span
    }

    pub fn row_span(tree: &LayoutTree, id: NodeId) -> usize {
        Self::position(tree, id).row_span
    }

    fn column_tracks(&self, available: f64) -> Vec<Track> {
        if self.columns.is_empty() {
            return vec![Track::implicit()];
        }
        self.columns
            .iter()
            .map(|column| column.track().for_axis(available))
            .collect()
    }

    fn row_tracks(&self, available: f64) -> Vec<Track> {
        if self.rows.is_empty() {
            return vec![Track::implicit()];
        }
        self.rows
            .iter()
            .map(|row| row.track().for_axis(available))
            .collect()
    }
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), LayoutError> {
    if index < len {
        Ok(())
    } else {
        Err(LayoutError::OutOfRange { what, index, len })
    }
}

fn check_insert(what: &'static str, index: usize, len: usize) -> Result<(), LayoutError> {
    if index <= len {
        Ok(())
    } else {
        Err(LayoutError::OutOfRange { what, index, len })
    }
}

fn update_position(
    tree: &mut LayoutTree,
    id: NodeId,
    update: impl FnOnce(&mut GridPosition),
) -> Result<(), LayoutError> {
    tree.require(id)?;
    let current = Grid::position(tree, id);
    let mut next = current;
    update(&mut next);
    if next != current {
        tree.grid_positions.insert(id, next);
        tree.invalidate_parent(id);
    }
    Ok(())
}

/// Working copy of a column or row during measure.
#[derive(Clone, Copy, Debug)]
struct Track {
    length: GridLength,
    min: f64,
    max: f64,
    size: f64,
}

impl Track {
    fn new(length: GridLength, min: f64, max: f64) -> Self {
        let size = match length {
            GridLength::Absolute(value) => clamp_min_max(value, min, max),
            GridLength::Auto | GridLength::Star(_) => clamp_min_max(0.0, min, max),
        };
        Self {
            length,
            min,
            max,
            size,
        }
    }

    /// The track used when an axis has no definitions
    fn implicit() -> Self {
        Self::new(GridLength::Auto, 0.0, f64::INFINITY)
    }

    /// Stars on an unconstrained axis behave as auto.
    fn for_axis(mut self, available: f64) -> Self {
        if self.length.is_star() && !available.is_finite() {
            self.length = GridLength::Auto;
        }
        self
    }

    fn clamp(&self, value: f64) -> f64 {
        clamp_min_max(value, self.min, self.max)
    }
}

/// One axis of the grid: its tracks and the space not yet handed out.
struct Axis {
    tracks: Vec<Track>,
    budget: f64,
}

impl Axis {
    /// Absolute sizes and track minimums are debited up front.
    fn new(tracks: Vec<Track>, available: f64) -> Self {
        let committed: f64 = tracks.iter().map(|track| track.size).sum();
        Self {
            tracks,
            budget: (available - committed).max(0.0),
        }
    }

    /// Clamp a start index and span to the declared tracks.
    fn span(&self, start: usize, span: usize) -> Range<usize> {
        let len = self.tracks.len();
        let start = start.min(len - 1);
        start..start + span.clamp(1, len - start)
    }

    fn span_size(&self, range: Range<usize>) -> f64 {
        self.tracks[range].iter().map(|track| track.size).sum()
    }

    fn flexible(&self, range: Range<usize>) -> impl Iterator<Item = usize> + '_ {
        range.filter(|&index| !self.tracks[index].length.is_absolute())
    }

    fn touches_star(&self, range: Range<usize>) -> bool {
        self.tracks[range].iter().any(|track| track.length.is_star())
    }

    /// Space a child spanning `range` may use.
    fn constraint(&self, range: Range<usize>) -> f64 {
        self.span_size(range) + self.budget
    }

    fn debit(&mut self, amount: f64) {
        self.budget = (self.budget - amount).max(0.0);
    }

    /// Grow the single auto track of a span so the span holds `desired`.
    fn grow_single(&mut self, range: Range<usize>, desired: f64) {
        let Some(index) = self
            .flexible(range.clone())
            .find(|&index| self.tracks[index].length.is_auto())
        else {
            return;
        };
        let excess = desired - self.span_size(range);
        if excess <= 0.0 {
            return;
        }
        let track = &mut self.tracks[index];
        let grown = track.clamp(track.size + excess);
        let delta = grown - track.size;
        track.size = grown;
        self.debit(delta);
    }

    /// Spread the residual of a spanning child evenly over its flexible
    /// tracks. Tracks that stop absorbing (at their max) drop out; once none
    /// are left whatever remains is discarded.
    fn grow_spanned(&mut self, range: Range<usize>, desired: f64) {
        let mut residual = desired - self.span_size(range.clone());
        let mut growable: Vec<usize> = self.flexible(range).collect();
        let mut true_span = growable.len();

        while true_span > 0 && residual / true_span as f64 > EPSILON {
            let share = residual / true_span as f64;
            let mut absorbed_total = 0.0;
            growable.retain(|&index| {
                let track = &mut self.tracks[index];
                let grown = track.clamp(track.size + share);
                let absorbed = grown - track.size;
                track.size = grown;
                absorbed_total += absorbed;
                absorbed + EPSILON >= share
            });
            true_span = growable.len();
            residual -= absorbed_total;
            self.debit(absorbed_total);
        }

        if residual > EPSILON {
            log::trace!("grid spanner residual of {residual} dropped; spanned tracks are at max");
        }
    }

    /// Share the budget plus the current star sizes among the star tracks by
    /// weight. A track whose share violates its min/max is frozen at the
    /// bound and the rest is shared again until nothing is clamped.
    fn distribute_stars(&mut self) {
        let stars: Vec<usize> = (0..self.tracks.len())
            .filter(|&index| self.tracks[index].length.is_star())
            .collect();
        if stars.is_empty() || !self.budget.is_finite() {
            return;
        }

        let assigned: f64 = stars.iter().map(|&index| self.tracks[index].size).sum();
        let total = self.budget + assigned;
        let mut frozen = vec![false; stars.len()];
        let mut proposed = vec![0.0; stars.len()];

        for _ in 0..=stars.len() {
            let frozen_size: f64 = stars
                .iter()
                .zip(&frozen)
                .filter(|&(_, &is_frozen)| is_frozen)
                .map(|(&index, _)| self.tracks[index].size)
                .sum();
            let weight: f64 = stars
                .iter()
                .zip(&frozen)
                .filter(|&(_, &is_frozen)| !is_frozen)
                .map(|(&index, _)| star_weight(&self.tracks[index]))
                .sum();
            if weight <= 0.0 {
                break;
            }
            let free = (total - frozen_size).max(0.0);

            let mut violation = 0.0;
            for (slot, &index) in stars.iter().enumerate() {
                if frozen[slot] {
                    continue;
                }
                let track = &self.tracks[index];
                let share = free * star_weight(track) / weight;
                proposed[slot] = share;
                violation += track.clamp(share) - share;
            }

            let mut froze_any = false;
            for (slot, &index) in stars.iter().enumerate() {
                if frozen[slot] {
                    continue;
                }
                let track = &mut self.tracks[index];
                let clamped = track.clamp(proposed[slot]);
                let freeze = if violation > EPSILON {
                    clamped > proposed[slot]
                } else if violation < -EPSILON {
                    clamped < proposed[slot]
                } else {
                    true
                };
                if freeze {
                    track.size = clamped;
                    frozen[slot] = true;
                    froze_any = true;
                }
            }

            if violation.abs() <= EPSILON || !froze_any {
                break;
            }
        }

        let used: f64 = stars.iter().map(|&index| self.tracks[index].size).sum();
        self.budget = (total - used).max(0.0);
    }

    fn total(&self) -> f64 {
        self.tracks.iter().map(|track| track.size).sum()
    }

    /// Running (offset, size) pairs
    fn resolved(&self) -> Vec<(f64, f64)> {
        let mut offset = 0.0;
        self.tracks
            .iter()
            .map(|track| {
                let entry = (offset, track.size);
                offset += track.size;
                entry
            })
            .collect()
    }
}

fn star_weight(track: &Track) -> f64 {
    match track.length {
        GridLength::Star(weight) => weight,
        _ => 0.0,
    }
}

/// Measurement bucket of a grid child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChildClass {
    /// Spans only absolute tracks
    Fixed,
    /// At most one flexible track per axis
    AutoSingle { touches_star: bool },
    /// Several flexible tracks on some axis
    AutoSpanner,
}

struct Cell {
    child: NodeId,
    columns: Range<usize>,
    rows: Range<usize>,
    class: ChildClass,
}

fn classify(columns: &Axis, rows: &Axis, cols: Range<usize>, rws: Range<usize>) -> ChildClass {
    let flexible_columns = columns.flexible(cols.clone()).count();
    let flexible_rows = rows.flexible(rws.clone()).count();
    if flexible_columns == 0 && flexible_rows == 0 {
        return ChildClass::Fixed;
    }
    if flexible_columns > 1 || flexible_rows > 1 {
        return ChildClass::AutoSpanner;
    }
    ChildClass::AutoSingle {
        touches_star: columns.touches_star(cols) || rows.touches_star(rws),
    }
}

impl Grid {
    fn cell(&self, cx: &LayoutContext<'_>, child: NodeId, columns: &Axis, rows: &Axis) -> Cell {
        let position = cx.grid_position(child);
        let cols = columns.span(position.column, position.column_span);
        let rws = rows.span(position.row, position.row_span);
        if cols.len() < position.column_span || rws.len() < position.row_span {
            log::trace!(
                "grid span of {child:?} truncated to columns {cols:?} rows {rws:?} \
                 (requested {position:?})"
            );
        }
        let class = classify(columns, rows, cols.clone(), rws.clone());
        Cell {
            child,
            columns: cols,
            rows: rws,
            class,
        }
    }
}

fn measure_cell(cx: &mut LayoutContext<'_>, cell: &Cell, columns: &Axis, rows: &Axis) -> Size {
    let constraint = Size::new(
        columns.constraint(cell.columns.clone()),
        rows.constraint(cell.rows.clone()),
    );
    cx.measure_child(cell.child, constraint)
}

impl LayoutPolicy for Grid {
    fn kind(&self) -> &'static str {
        "Grid"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        let mut columns = Axis::new(self.column_tracks(available.width), available.width);
        let mut rows = Axis::new(self.row_tracks(available.height), available.height);

        let cells: Vec<Cell> = cx
            .children()
            .into_iter()
            .map(|child| self.cell(cx, child, &columns, &rows))
            .collect();

        for cell in cells.iter().filter(|cell| cell.class == ChildClass::Fixed) {
            let constraint = Size::new(
                columns.span_size(cell.columns.clone()),
                rows.span_size(cell.rows.clone()),
            );
            cx.measure_child(cell.child, constraint);
        }

        // Auto singles: children clear of star tracks establish the auto
        // sizes first; stable among ties
        let singles = cells
            .iter()
            .filter(|cell| cell.class == ChildClass::AutoSingle { touches_star: false })
            .chain(
                cells
                    .iter()
                    .filter(|cell| cell.class == ChildClass::AutoSingle { touches_star: true }),
            );
        for cell in singles {
            let desired = measure_cell(cx, cell, &columns, &rows);
            columns.grow_single(cell.columns.clone(), desired.width);
            rows.grow_single(cell.rows.clone(), desired.height);
        }

        for cell in cells.iter().filter(|cell| cell.class == ChildClass::AutoSpanner) {
            let desired = measure_cell(cx, cell, &columns, &rows);
            columns.grow_spanned(cell.columns.clone(), desired.width);
            rows.grow_spanned(cell.rows.clone(), desired.height);
        }

        columns.distribute_stars();
        rows.distribute_stars();

        for cell in &cells {
            let star_columns = columns.touches_star(cell.columns.clone());
            let star_rows = rows.touches_star(cell.rows.clone());
            if !star_columns && !star_rows {
                continue;
            }
            let constraint = Size::new(
                if star_columns {
                    columns.span_size(cell.columns.clone())
                } else {
                    columns.constraint(cell.columns.clone())
                },
                if star_rows {
                    rows.span_size(cell.rows.clone())
                } else {
                    rows.constraint(cell.rows.clone())
                },
            );
            let desired = cx.measure_child(cell.child, constraint);
            if cell.class != ChildClass::AutoSpanner {
                if !star_columns {
                    columns.grow_single(cell.columns.clone(), desired.width);
                }
                if !star_rows {
                    rows.grow_single(cell.rows.clone(), desired.height);
                }
            }
        }

        self.resolved_columns = columns.resolved();
        self.resolved_rows = rows.resolved();
        for (definition, &(offset, size)) in self.columns.iter_mut().zip(&self.resolved_columns) {
            definition.offset = offset;
            definition.actual_width = size;
        }
        for (definition, &(offset, size)) in self.rows.iter_mut().zip(&self.resolved_rows) {
            definition.offset = offset;
            definition.actual_height = size;
        }

        Size::new(
            columns.total().min(available.width),
            rows.total().min(available.height),
        )
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        // An axis without definitions is one cell covering the whole grid
        let columns = if self.columns.is_empty() {
            vec![(0.0, final_size.width)]
        } else {
            self.resolved_columns.clone()
        };
        let rows = if self.rows.is_empty() {
            vec![(0.0, final_size.height)]
        } else {
            self.resolved_rows.clone()
        };
        if columns.is_empty() || rows.is_empty() {
            return final_size;
        }

        for child in cx.children() {
            let position = cx.grid_position(child);
            let (x, width) = span_extent(&columns, position.column, position.column_span);
            let (y, height) = span_extent(&rows, position.row, position.row_span);
            cx.arrange_child(child, Rect::new(x, y, width, height));
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

/// Offset and summed size of a clamped span over resolved tracks.
fn span_extent(tracks: &[(f64, f64)], start: usize, span: usize) -> (f64, f64) {
    let start = start.min(tracks.len() - 1);
    let end = start.saturating_add(span.max(1)).min(tracks.len());
    let size = tracks[start..end].iter().map(|&(_, size)| size).sum();
    (tracks[start].0, size)
}

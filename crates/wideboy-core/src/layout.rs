//! Grid layout engine.
//!
//! Divides the surface into `columns x rows` equally sized cells and binds
//! tiles onto them. Cell size is `floor(total / count)` on each axis; the
//! remainder pixels on the right and bottom edges stay unused.

use alloc::{vec, vec::Vec};
use core::fmt;

use log::debug;

use crate::{
    scene::{Geometry, NodeId, Scene, SceneError},
    tile::Tile,
};

/// Cell coordinate, column first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct GridPosition {
    pub col: u16,
    pub row: u16,
}

impl GridPosition {
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }
}

/// Number of cells a tile covers, columns first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CellSpan {
    pub cols: u16,
    pub rows: u16,
}

impl CellSpan {
    pub const SINGLE: Self = Self::new(1, 1);

    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

impl Default for CellSpan {
    fn default() -> Self {
        Self::SINGLE
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutError {
    /// Zero columns/rows, or a surface smaller than the grid.
    InvalidLayout {
        surface_width: u32,
        surface_height: u32,
        columns: u16,
        rows: u16,
    },
    /// A requested cell is already claimed by another tile.
    Overlap { col: u16, row: u16 },
    /// The span reaches past the last column or row.
    OutOfBounds {
        position: GridPosition,
        span: CellSpan,
    },
    /// Span covers no cells.
    EmptySpan,
    Scene(SceneError),
}

impl From<SceneError> for LayoutError {
    fn from(err: SceneError) -> Self {
        Self::Scene(err)
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLayout {
                surface_width,
                surface_height,
                columns,
                rows,
            } => write!(
                f,
                "cannot split {surface_width}x{surface_height} into {columns}x{rows} cells"
            ),
            Self::Overlap { col, row } => write!(f, "cell ({col}, {row}) is already bound"),
            Self::OutOfBounds { position, span } => write!(
                f,
                "span {}x{} at ({}, {}) leaves the grid",
                span.cols, span.rows, position.col, position.row
            ),
            Self::EmptySpan => f.write_str("cell span must cover at least one cell"),
            Self::Scene(err) => write!(f, "scene: {err}"),
        }
    }
}

/// A tile bound to the grid.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Binding {
    pub tile: Tile,
    pub position: GridPosition,
    pub span: CellSpan,
}

/// Grid layout under construction. Consumed by [`GridLayout::freeze`].
#[derive(Debug)]
pub struct GridLayout {
    root: NodeId,
    columns: u16,
    rows: u16,
    cell_width: u32,
    cell_height: u32,
    claimed: Vec<bool>,
    bindings: Vec<Binding>,
}

impl GridLayout {
    /// Creates the layout container in `scene` covering the whole surface.
    pub fn configure(
        scene: &mut Scene,
        surface_width: u32,
        surface_height: u32,
        columns: u16,
        rows: u16,
    ) -> Result<Self, LayoutError> {
        if columns == 0
            || rows == 0
            || surface_width < columns as u32
            || surface_height < rows as u32
        {
            return Err(LayoutError::InvalidLayout {
                surface_width,
                surface_height,
                columns,
                rows,
            });
        }

        let root = scene.add_container(Geometry::new(0, 0, surface_width, surface_height))?;
        let cell_width = surface_width / columns as u32;
        let cell_height = surface_height / rows as u32;
        debug!(
            "layout: {}x{} grid over {}x{} px, cell {}x{} px",
            columns, rows, surface_width, surface_height, cell_width, cell_height
        );

        Ok(Self {
            root,
            columns,
            rows,
            cell_width,
            cell_height,
            claimed: vec![false; columns as usize * rows as usize],
            bindings: Vec::new(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn grid_size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Attaches `tile` at `position`, covering `span` cells.
    ///
    /// Sets the tile's offset to `(col * cell_width, row * cell_height)` and
    /// sizes both the tile and its background to the spanned cells. Nothing is
    /// claimed unless the whole bind succeeds.
    pub fn bind(
        &mut self,
        scene: &mut Scene,
        tile: &Tile,
        position: GridPosition,
        span: CellSpan,
    ) -> Result<(), LayoutError> {
        if span.cols == 0 || span.rows == 0 {
            return Err(LayoutError::EmptySpan);
        }
        let end_col = position.col as u32 + span.cols as u32;
        let end_row = position.row as u32 + span.rows as u32;
        if end_col > self.columns as u32 || end_row > self.rows as u32 {
            return Err(LayoutError::OutOfBounds { position, span });
        }

        for row in position.row..position.row + span.rows {
            for col in position.col..position.col + span.cols {
                if self.claimed[self.cell_index(col, row)] {
                    return Err(LayoutError::Overlap { col, row });
                }
            }
        }

        scene.append(self.root, tile.container())?;

        let geometry = Geometry::new(
            (position.col as u32 * self.cell_width) as i32,
            (position.row as u32 * self.cell_height) as i32,
            span.cols as u32 * self.cell_width,
            span.rows as u32 * self.cell_height,
        );
        scene.set_geometry(tile.container(), geometry)?;
        scene.set_geometry(
            tile.background(),
            Geometry::new(0, 0, geometry.width, geometry.height),
        )?;

        for row in position.row..position.row + span.rows {
            for col in position.col..position.col + span.cols {
                let index = self.cell_index(col, row);
                self.claimed[index] = true;
            }
        }
        self.bindings.push(Binding {
            tile: *tile,
            position,
            span,
        });
        Ok(())
    }

    pub fn tile_at(&self, position: GridPosition) -> Option<&Tile> {
        tile_at(&self.bindings, position)
    }

    /// Ends construction; only label text changes after this.
    pub fn freeze(self) -> FrozenGrid {
        debug!("layout: frozen with {} tiles", self.bindings.len());
        FrozenGrid {
            root: self.root,
            columns: self.columns,
            rows: self.rows,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            bindings: self.bindings,
        }
    }

    fn cell_index(&self, col: u16, row: u16) -> usize {
        row as usize * self.columns as usize + col as usize
    }
}

/// Structurally frozen layout.
#[derive(Debug, Clone)]
pub struct FrozenGrid {
    root: NodeId,
    columns: u16,
    rows: u16,
    cell_width: u32,
    cell_height: u32,
    bindings: Vec<Binding>,
}

impl FrozenGrid {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn grid_size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn tile_at(&self, position: GridPosition) -> Option<&Tile> {
        tile_at(&self.bindings, position)
    }
}

fn tile_at(bindings: &[Binding], position: GridPosition) -> Option<&Tile> {
    bindings
        .iter()
        .find(|binding| {
            let cols = binding.position.col..binding.position.col + binding.span.cols;
            let rows = binding.position.row..binding.position.row + binding.span.rows;
            cols.contains(&position.col) && rows.contains(&position.row)
        })
        .map(|binding| &binding.tile)
}

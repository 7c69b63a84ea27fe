//! Tile construction: a rounded background plus one label.

use embedded_graphics::{pixelcolor::Rgb888, prelude::Point};

use crate::scene::{Geometry, NodeId, NodeKind, RoundRect, Scene, SceneError, rgb};

/// Offset of every tile's label from the tile origin.
pub const LABEL_INSET: Point = Point::new(2, 6);
pub const DEFAULT_LABEL_COLOR: Rgb888 = rgb(0x222222);
pub const DEFAULT_RADIUS: u32 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileStyle {
    pub background: Rgb888,
    pub outline: Option<Rgb888>,
    pub radius: u32,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            background: rgb(0x000000),
            outline: None,
            radius: DEFAULT_RADIUS,
        }
    }
}

impl TileStyle {
    pub const fn with_background(background: Rgb888) -> Self {
        Self {
            background,
            outline: None,
            radius: DEFAULT_RADIUS,
        }
    }
}

/// Handles to one tile's nodes.
///
/// The container's first child is always the background, the second the label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tile {
    container: NodeId,
    background: NodeId,
    label: NodeId,
}

impl Tile {
    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn background(&self) -> NodeId {
        self.background
    }

    pub fn label(&self) -> NodeId {
        self.label
    }
}

/// Builds tiles. Geometry stays zero-sized until the tile is bound to a grid cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct TileBuilder;

impl TileBuilder {
    /// Wraps an unparented label in a new tile.
    ///
    /// The label is validated before any node is created, so a failure leaves
    /// the scene unchanged.
    pub fn build(scene: &mut Scene, label: NodeId, style: TileStyle) -> Result<Tile, SceneError> {
        let node = scene.node(label).ok_or(SceneError::UnknownNode(label))?;
        if !matches!(node.kind(), NodeKind::TextContent(_)) {
            return Err(SceneError::NotText(label));
        }
        if node.parent().is_some() {
            return Err(SceneError::AlreadyParented(label));
        }

        let container = scene.add_container(Geometry::default())?;
        let background = scene.add_background(Geometry::default(), RoundRect {
            fill: style.background,
            outline: style.outline,
            radius: style.radius,
        })?;
        scene.set_position(label, LABEL_INSET)?;
        scene.append(container, background)?;
        scene.append(container, label)?;

        Ok(Tile {
            container,
            background,
            label,
        })
    }

    /// Creates the label and the tile in one go.
    pub fn build_labeled(
        scene: &mut Scene,
        text: &str,
        label_color: Rgb888,
        style: TileStyle,
    ) -> Result<Tile, SceneError> {
        let label = scene.add_text(LABEL_INSET, text, label_color)?;
        Self::build(scene, label, style)
    }
}

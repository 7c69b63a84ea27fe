//! Production composition: splash plus the four counter tiles.

use embedded_graphics::prelude::Point;
use log::debug;

use super::{AppState, DrawError, FrameDraw, FrameScratch};
use crate::{
    layout::{CellSpan, GridLayout, GridPosition, LayoutError},
    scene::{Geometry, NodeId, Scene, SceneError, rgb},
    tile::{DEFAULT_LABEL_COLOR, TileBuilder, TileStyle},
};

pub const SPLASH_TEXT: &str = "Wideboy Jr";
pub const STATIC_TILE_TEXT: &str = "WB Jr";

/// Splash tree shown while boot is still running.
pub fn build_splash(scene: &mut Scene) -> Result<NodeId, SceneError> {
    let group = scene.add_container(Geometry::default())?;
    let label = scene.add_text(Point::new(1, 4), SPLASH_TEXT, rgb(0x220022))?;
    scene.append(group, label)?;
    Ok(group)
}

/// Label handles of the counter tiles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Dashboard {
    frame: NodeId,
    frame_mod_100: NodeId,
    frame_mod_60: NodeId,
    fixed: NodeId,
}

impl Dashboard {
    /// Builds and binds the four tiles onto a grid of at least 2x2.
    pub fn build(scene: &mut Scene, layout: &mut GridLayout) -> Result<Self, LayoutError> {
        let frame = bind_tile(scene, layout, "0", 0x000011, GridPosition::new(0, 0))?;
        let frame_mod_100 = bind_tile(scene, layout, "0", 0x001100, GridPosition::new(1, 0))?;
        let frame_mod_60 = bind_tile(scene, layout, "0", 0x110011, GridPosition::new(0, 1))?;
        let fixed = bind_tile(
            scene,
            layout,
            STATIC_TILE_TEXT,
            0x110000,
            GridPosition::new(1, 1),
        )?;

        Ok(Self {
            frame,
            frame_mod_100,
            frame_mod_60,
            fixed,
        })
    }

    /// Labels in grid order: (0,0), (1,0), (0,1), (1,1).
    pub fn labels(&self) -> [NodeId; 4] {
        [self.frame, self.frame_mod_100, self.frame_mod_60, self.fixed]
    }
}

impl FrameDraw for Dashboard {
    fn draw(
        &mut self,
        state: &AppState,
        scratch: &mut FrameScratch,
        scene: &mut Scene,
    ) -> Result<(), DrawError> {
        let frame = state.frame;
        scene.set_text(self.frame, scratch.format(format_args!("{frame}"))?)?;
        scene.set_text(
            self.frame_mod_100,
            scratch.format(format_args!("{}", frame % 100))?,
        )?;
        scene.set_text(
            self.frame_mod_60,
            scratch.format(format_args!("{}", frame % 60))?,
        )?;
        debug!("draw: frame={}", frame);
        Ok(())
    }
}

fn bind_tile(
    scene: &mut Scene,
    layout: &mut GridLayout,
    text: &str,
    background: u32,
    position: GridPosition,
) -> Result<NodeId, LayoutError> {
    let tile = TileBuilder::build_labeled(
        scene,
        text,
        DEFAULT_LABEL_COLOR,
        TileStyle::with_background(rgb(background)),
    )?;
    layout.bind(scene, &tile, position, CellSpan::SINGLE)?;
    Ok(tile.label())
}

//! Display surface: the scene, the node currently shown, and the panel it
//! is pushed to.

use core::fmt;

use log::{debug, info};
use matrix_panel::{FrameBuffer, PanelConfig, Rotation};

use crate::scene::{NodeId, Scene, SceneError};

/// Panel scan-out boundary.
///
/// The driver owns its refresh cadence: [`DisplaySurface::refresh`] only
/// renders and flushes when the driver reports a refresh is due.
pub trait PanelDriver {
    type Error: fmt::Debug;

    fn refresh_due(&mut self) -> bool {
        true
    }

    fn flush(&mut self, frame: &FrameBuffer) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SurfaceError {
    /// Rotation is not one of 0, 90, 180, 270.
    InvalidRotation { degrees: u16 },
    /// `show` before `set_rotation`.
    RotationUnset,
    /// Only parentless nodes can be shown.
    NotRoot(NodeId),
    Panel(matrix_panel::Error),
    Scene(SceneError),
}

impl From<SceneError> for SurfaceError {
    fn from(err: SceneError) -> Self {
        Self::Scene(err)
    }
}

impl From<matrix_panel::Error> for SurfaceError {
    fn from(err: matrix_panel::Error) -> Self {
        match err {
            matrix_panel::Error::InvalidRotation { degrees } => Self::InvalidRotation { degrees },
            other => Self::Panel(other),
        }
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRotation { degrees } => {
                write!(f, "rotation {degrees} is not one of 0/90/180/270")
            }
            Self::RotationUnset => f.write_str("rotation must be set before show"),
            Self::NotRoot(id) => write!(f, "node {} has a parent", id.index()),
            Self::Panel(err) => write!(f, "panel: {err}"),
            Self::Scene(err) => write!(f, "scene: {err}"),
        }
    }
}

#[derive(Debug)]
pub struct DisplaySurface<P> {
    driver: P,
    framebuffer: FrameBuffer,
    scene: Scene,
    rotation: Option<Rotation>,
    shown: Option<NodeId>,
}

impl<P> DisplaySurface<P>
where
    P: PanelDriver,
{
    pub fn new(driver: P, config: PanelConfig) -> Result<Self, SurfaceError> {
        Ok(Self {
            driver,
            framebuffer: FrameBuffer::new(config)?,
            scene: Scene::new(),
            rotation: None,
            shown: None,
        })
    }

    /// Logical width after rotation.
    pub fn width(&self) -> u32 {
        self.framebuffer.logical_size().0 as u32
    }

    /// Logical height after rotation.
    pub fn height(&self) -> u32 {
        self.framebuffer.logical_size().1 as u32
    }

    pub fn rotation(&self) -> Option<Rotation> {
        self.rotation
    }

    /// Sets the panel rotation. An invalid value leaves the previous rotation in place.
    pub fn set_rotation(&mut self, degrees: u16) -> Result<(), SurfaceError> {
        let rotation = Rotation::from_degrees(degrees)?;
        self.framebuffer.set_rotation(rotation);
        self.rotation = Some(rotation);
        info!(
            "display: rotation {} deg, logical {}x{}",
            degrees,
            self.width(),
            self.height()
        );
        Ok(())
    }

    /// Makes `root` the visible tree, replacing whatever was shown.
    ///
    /// Returns `false` when `root` was already shown. Nothing is transferred
    /// to the panel until the next [`refresh`](Self::refresh).
    pub fn show(&mut self, root: NodeId) -> Result<bool, SurfaceError> {
        if self.rotation.is_none() {
            return Err(SurfaceError::RotationUnset);
        }
        let node = self.scene.node(root).ok_or(SceneError::UnknownNode(root))?;
        if node.parent().is_some() {
            return Err(SurfaceError::NotRoot(root));
        }
        if self.shown == Some(root) {
            return Ok(false);
        }

        debug!("display: show node {}", root.index());
        self.shown = Some(root);
        Ok(true)
    }

    pub fn shown(&self) -> Option<NodeId> {
        self.shown
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn driver(&self) -> &P {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut P {
        &mut self.driver
    }

    /// Renders the shown tree and hands it to the driver, if the driver is due.
    ///
    /// Returns whether a frame was flushed.
    pub fn refresh(&mut self) -> Result<bool, P::Error> {
        if !self.driver.refresh_due() {
            return Ok(false);
        }

        self.framebuffer.clear([0, 0, 0]);
        if let Some(root) = self.shown {
            match self.scene.draw(root, &mut self.framebuffer) {
                Ok(()) => {}
                Err(never) => match never {},
            }
        }
        self.driver.flush(&self.framebuffer)?;
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scene::{Geometry, RoundRect, rgb};
    use alloc::vec::Vec;
    use embedded_graphics::prelude::Point;

    /// Panel double recording every flushed frame.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingPanel {
        pub(crate) flushed: Vec<FrameBuffer>,
        pub(crate) skip_next: bool,
    }

    impl PanelDriver for RecordingPanel {
        type Error = ();

        fn refresh_due(&mut self) -> bool {
            !core::mem::take(&mut self.skip_next)
        }

        fn flush(&mut self, frame: &FrameBuffer) -> Result<(), Self::Error> {
            self.flushed.push(frame.clone());
            Ok(())
        }
    }

    pub(crate) fn surface(width: u16, height: u16) -> DisplaySurface<RecordingPanel> {
        DisplaySurface::new(RecordingPanel::default(), PanelConfig {
            width,
            height,
            brightness: 1.0,
            ..PanelConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn invalid_rotation_keeps_previous_value() {
        let mut surface = surface(64, 32);
        surface.set_rotation(90).unwrap();

        assert_eq!(
            surface.set_rotation(45),
            Err(SurfaceError::InvalidRotation { degrees: 45 })
        );
        assert_eq!(surface.rotation(), Some(Rotation::Deg90));
        assert_eq!((surface.width(), surface.height()), (32, 64));
    }

    #[test]
    fn show_requires_rotation() {
        let mut surface = surface(8, 8);
        let root = surface
            .scene_mut()
            .add_container(Geometry::default())
            .unwrap();

        assert_eq!(surface.show(root), Err(SurfaceError::RotationUnset));
        surface.set_rotation(0).unwrap();
        assert_eq!(surface.show(root), Ok(true));
    }

    #[test]
    fn show_is_idempotent_and_replaces_previous_tree() {
        let mut surface = surface(8, 8);
        surface.set_rotation(0).unwrap();
        let splash = surface
            .scene_mut()
            .add_container(Geometry::default())
            .unwrap();
        let root = surface
            .scene_mut()
            .add_container(Geometry::default())
            .unwrap();

        assert_eq!(surface.show(splash), Ok(true));
        assert_eq!(surface.show(root), Ok(true));
        assert_eq!(surface.show(root), Ok(false));
        assert_eq!(surface.shown(), Some(root));
    }

    #[test]
    fn only_roots_can_be_shown() {
        let mut surface = surface(8, 8);
        surface.set_rotation(0).unwrap();
        let scene = surface.scene_mut();
        let root = scene.add_container(Geometry::default()).unwrap();
        let child = scene.add_container(Geometry::default()).unwrap();
        scene.append(root, child).unwrap();

        assert_eq!(surface.show(child), Err(SurfaceError::NotRoot(child)));
    }

    #[test]
    fn refresh_renders_shown_tree_with_rotation() {
        let mut surface = surface(8, 4);
        surface.set_rotation(180).unwrap();
        let fill = rgb(0x0000FF);
        let bg = surface
            .scene_mut()
            .add_background(Geometry::new(0, 0, 1, 1), RoundRect {
                fill,
                outline: None,
                radius: 0,
            })
            .unwrap();
        surface.show(bg).unwrap();

        assert_eq!(surface.refresh(), Ok(true));
        let frame = &surface.driver().flushed[0];
        assert_eq!(frame.physical_pixel(7, 3), Some([0, 0, 0xFF]));
        assert_eq!(frame.physical_pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn label_edits_appear_on_next_refresh_without_show() {
        let mut surface = surface(32, 16);
        surface.set_rotation(0).unwrap();
        let label = surface
            .scene_mut()
            .add_text(Point::new(0, 5), "1", rgb(0xFFFFFF))
            .unwrap();
        surface.show(label).unwrap();
        surface.refresh().unwrap();

        surface.scene_mut().set_text(label, "88888").unwrap();
        surface.refresh().unwrap();

        let lit = |frame: &FrameBuffer| {
            (0..32)
                .flat_map(|x| (0..16).map(move |y| (x, y)))
                .filter(|&(x, y)| frame.pixel(x, y) == Some([0xFF, 0xFF, 0xFF]))
                .count()
        };
        let flushed = &surface.driver().flushed;
        assert!(lit(&flushed[1]) > lit(&flushed[0]));
    }

    #[test]
    fn refresh_waits_for_driver() {
        let mut surface = surface(4, 4);
        surface.driver_mut().skip_next = true;

        assert_eq!(surface.refresh(), Ok(false));
        assert_eq!(surface.refresh(), Ok(true));
        assert_eq!(surface.driver().flushed.len(), 1);
    }
}

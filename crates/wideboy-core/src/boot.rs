//! Boot sequence: everything that happens once before the frame loop runs.

use core::fmt;

use log::{info, warn};
use matrix_panel::Rotation;

use crate::{
    app::{Dashboard, FrameLoop, build_splash},
    config::BoardConfig,
    display::{DisplaySurface, PanelDriver, SurfaceError},
    layout::{FrozenGrid, GridLayout, LayoutError},
    network::{HostId, NetworkLink},
    orientation::OrientationSource,
    scene::{Geometry, NodeId, SceneError},
};

/// Fatal startup failure. The frame loop is never entered after one.
#[derive(Debug)]
pub enum BootError<E> {
    Surface(SurfaceError),
    Layout(LayoutError),
    Scene(SceneError),
    /// Display bus fault while pushing the splash.
    Panel(E),
}

impl<E> From<SurfaceError> for BootError<E> {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

impl<E> From<LayoutError> for BootError<E> {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl<E> From<SceneError> for BootError<E> {
    fn from(err: SceneError) -> Self {
        Self::Scene(err)
    }
}

impl<E: fmt::Debug> fmt::Display for BootError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(err) => write!(f, "display: {err}"),
            Self::Layout(err) => write!(f, "layout: {err}"),
            Self::Scene(err) => write!(f, "scene: {err}"),
            Self::Panel(err) => write!(f, "panel: {err:?}"),
        }
    }
}

/// Everything the running system owns after boot.
#[derive(Debug)]
pub struct Booted<P> {
    pub surface: DisplaySurface<P>,
    pub frame_loop: FrameLoop<Dashboard>,
    pub grid: FrozenGrid,
    pub splash: NodeId,
    pub host_id: Option<HostId>,
}

pub fn boot<P, O, N>(
    config: &BoardConfig,
    driver: P,
    orientation: &mut O,
    network: &mut N,
) -> Result<Booted<P>, BootError<P::Error>>
where
    P: PanelDriver,
    O: OrientationSource,
    O::Error: fmt::Debug,
    N: NetworkLink,
{
    info!(
        "debug={} brightness={} ntp_interval={} mqtt_prefix={}",
        config.debug, config.brightness, config.ntp_interval_secs, config.mqtt_prefix
    );
    info!(
        "matrix_width={} matrix_height={} matrix_bit_depth={} matrix_color_order={}",
        config.matrix_width,
        config.matrix_height,
        config.matrix_bit_depth,
        config.matrix_color_order
    );

    info!("boot: configuring display");
    let mut surface = DisplaySurface::new(driver, config.panel_config())?;
    let rotation = match orientation.read_orientation() {
        Ok(rotation) => rotation,
        Err(err) => {
            warn!("boot: orientation unavailable ({:?}); using 0 deg", err);
            Rotation::Deg0
        }
    };
    surface.set_rotation(rotation.degrees())?;

    let splash = build_splash(surface.scene_mut())?;
    surface.show(splash)?;
    surface.refresh().map_err(BootError::Panel)?;

    info!("boot: configuring networking");
    let host_id = match network.connect() {
        Ok(()) => {
            let id = HostId::from_mac(&network.mac_address());
            info!("boot: host id {}", id);
            Some(id)
        }
        Err(err) => {
            warn!("boot: network unavailable: {:?}", err);
            None
        }
    };

    let (width, height) = (surface.width(), surface.height());
    let scene = surface.scene_mut();
    let root = scene.add_container(Geometry::new(0, 0, width, height))?;
    let mut layout =
        GridLayout::configure(scene, width, height, config.tile_cols, config.tile_rows)?;
    scene.append(root, layout.root())?;
    let dashboard = Dashboard::build(scene, &mut layout)?;
    let grid = layout.freeze();

    let frame_loop = FrameLoop::start(&mut surface, root, dashboard)?;

    Ok(Booted {
        surface,
        frame_loop,
        grid,
        splash,
        host_id,
    })
}

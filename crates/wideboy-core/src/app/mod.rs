//! Frame loop: owns the application state and redraws labels forever.

use core::fmt::{self, Write};

use heapless::String;
use log::{error, info, warn};

use crate::{
    display::{DisplaySurface, PanelDriver, SurfaceError},
    scene::{LABEL_TEXT_BYTES, NodeId, Scene, SceneError},
};

mod dashboard;

pub use dashboard::{Dashboard, SPLASH_TEXT, STATIC_TILE_TEXT, build_splash};

/// Mutable application state. Only the frame loop writes it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AppState {
    /// Frames fully drawn so far. Wraps to 0 after `u32::MAX`.
    pub frame: u32,
}

impl AppState {
    fn advance(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }
}

/// Text buffer for values formatted during one iteration.
///
/// Cleared at the start of every iteration, so nothing formatted in one
/// frame is visible in the next.
#[derive(Clone, Debug, Default)]
pub struct FrameScratch {
    text: String<LABEL_TEXT_BYTES>,
}

impl FrameScratch {
    pub fn format(&mut self, args: fmt::Arguments<'_>) -> Result<&str, DrawError> {
        self.text.clear();
        self.text.write_fmt(args).map_err(|_| DrawError::Format)?;
        Ok(self.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn reclaim(&mut self) {
        self.text.clear();
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawError {
    Scene(SceneError),
    /// Formatted value did not fit the scratch buffer.
    Format,
}

impl From<SceneError> for DrawError {
    fn from(err: SceneError) -> Self {
        Self::Scene(err)
    }
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scene(err) => write!(f, "scene: {err}"),
            Self::Format => f.write_str("formatted text overflowed scratch buffer"),
        }
    }
}

/// Per-frame label update.
pub trait FrameDraw {
    fn draw(
        &mut self,
        state: &AppState,
        scratch: &mut FrameScratch,
        scene: &mut Scene,
    ) -> Result<(), DrawError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IterationOutcome {
    Drawn { frame: u32 },
    Failed { frame: u32, error: DrawError },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoopStats {
    pub iterations: u64,
    pub drawn: u64,
    pub failures: u64,
    pub last_failure: Option<(u32, DrawError)>,
}

/// Running frame loop.
///
/// Only obtainable through [`FrameLoop::start`], which shows the production
/// root first; holding one means the system is running.
#[derive(Debug)]
pub struct FrameLoop<D> {
    state: AppState,
    drawer: D,
    scratch: FrameScratch,
    stats: LoopStats,
    root: NodeId,
}

impl<D> FrameLoop<D>
where
    D: FrameDraw,
{
    /// Shows `root` and enters the running state with `frame = 0`.
    pub fn start<P: PanelDriver>(
        surface: &mut DisplaySurface<P>,
        root: NodeId,
        drawer: D,
    ) -> Result<Self, SurfaceError> {
        surface.show(root)?;
        info!("app: start frame loop");
        Ok(Self {
            state: AppState::default(),
            drawer,
            scratch: FrameScratch::default(),
            stats: LoopStats::default(),
            root,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn drawer(&self) -> &D {
        &self.drawer
    }

    pub fn drawer_mut(&mut self) -> &mut D {
        &mut self.drawer
    }

    /// One iteration: reclaim scratch, draw, advance only on success.
    pub fn step(&mut self, scene: &mut Scene) -> IterationOutcome {
        self.scratch.reclaim();
        self.stats.iterations = self.stats.iterations.wrapping_add(1);

        let frame = self.state.frame;
        match self.drawer.draw(&self.state, &mut self.scratch, scene) {
            Ok(()) => {
                self.state.advance();
                self.stats.drawn = self.stats.drawn.wrapping_add(1);
                IterationOutcome::Drawn { frame }
            }
            Err(error) => {
                warn!("app: draw failed at frame {}: {}", frame, error);
                self.stats.failures = self.stats.failures.wrapping_add(1);
                self.stats.last_failure = Some((frame, error));
                IterationOutcome::Failed { frame, error }
            }
        }
    }

    /// Runs `iterations` steps, refreshing the surface after each drawn one.
    ///
    /// A failed iteration is not refreshed, so the panel keeps the last
    /// completely drawn frame.
    pub fn run_for<P: PanelDriver>(
        &mut self,
        surface: &mut DisplaySurface<P>,
        iterations: usize,
    ) -> Result<(), P::Error> {
        for _ in 0..iterations {
            if let IterationOutcome::Drawn { .. } = self.step(surface.scene_mut()) {
                surface.refresh()?;
            }
        }
        Ok(())
    }

    /// Runs until the panel reports a fault, which is returned.
    ///
    /// Draw failures never end the loop and are never pushed to the panel.
    pub fn run<P: PanelDriver>(mut self, surface: &mut DisplaySurface<P>) -> P::Error {
        loop {
            if let IterationOutcome::Failed { .. } = self.step(surface.scene_mut()) {
                continue;
            }
            if let Err(err) = surface.refresh() {
                error!(
                    "app: panel refresh failed after {} iterations: {:?}",
                    self.stats.iterations, err
                );
                return err;
            }
        }
    }
}

use std::{io, process::ExitCode, time::Duration};

use log::{LevelFilter, error, info};
use wideboy_core::boot::{Booted, boot};

use board::{LoopbackLink, orientation_from_env};
use secrets::SecretsSource;
use terminal_panel::TerminalPanel;

#[path = "main/board.rs"]
mod board;
#[path = "main/secrets.rs"]
mod secrets;
#[path = "main/terminal_panel.rs"]
mod terminal_panel;

const PANEL_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> ExitCode {
    let path = secrets::secrets_path();
    let (config, source) = match secrets::load(&path) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("config: {err}");
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(if config.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match source {
        SecretsSource::File(path) => info!("config: loaded {}", path.display()),
        SecretsSource::Defaults(path) => {
            info!("config: {} not found; using defaults", path.display());
        }
    }

    let mut orientation = match orientation_from_env() {
        Ok(orientation) => orientation,
        Err(err) => {
            error!("board: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut network = LoopbackLink::default();
    let panel = TerminalPanel::new(io::stdout(), PANEL_REFRESH_INTERVAL);

    let Booted {
        mut surface,
        frame_loop,
        ..
    } = match boot(&config, panel, &mut orientation, &mut network) {
        Ok(booted) => booted,
        Err(err) => {
            error!("boot failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let fault = frame_loop.run(&mut surface);
    error!("panel fault: {fault}");
    ExitCode::FAILURE
}

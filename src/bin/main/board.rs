//! Host stand-ins for the board's boot-time collaborators.

use std::{convert::Infallible, env, fmt};

use log::info;
use wideboy_core::{Rotation, network::NetworkLink, orientation::FixedOrientation};

pub const ROTATION_ENV: &str = "WIDEBOY_ROTATION";
const LOOPBACK_MAC: [u8; 6] = [0x02, 0x57, 0x42, 0x4A, 0x52, 0x01];

#[derive(Debug)]
pub enum BoardError {
    InvalidRotation(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRotation(raw) => {
                write!(f, "{ROTATION_ENV}={raw:?} is not one of 0/90/180/270")
            }
        }
    }
}

/// Orientation for boards without an accelerometer, read from the environment.
pub fn orientation_from_env() -> Result<FixedOrientation, BoardError> {
    let Ok(raw) = env::var(ROTATION_ENV) else {
        return Ok(FixedOrientation(Rotation::Deg0));
    };
    parse_rotation(&raw).map(FixedOrientation)
}

fn parse_rotation(raw: &str) -> Result<Rotation, BoardError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .and_then(|degrees| Rotation::from_degrees(degrees).ok())
        .ok_or_else(|| BoardError::InvalidRotation(raw.to_owned()))
}

/// Always-up link with a locally administered MAC.
#[derive(Debug, Default)]
pub struct LoopbackLink {
    connected: bool,
}

impl NetworkLink for LoopbackLink {
    type Error = Infallible;

    fn connect(&mut self) -> Result<(), Self::Error> {
        if !self.connected {
            info!("network: loopback link up");
            self.connected = true;
        }
        Ok(())
    }

    fn mac_address(&self) -> [u8; 6] {
        LOOPBACK_MAC
    }
}

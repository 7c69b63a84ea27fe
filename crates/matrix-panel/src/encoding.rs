//! Per-pixel encoding applied at scan-out.

use core::{fmt, str::FromStr};

use crate::Error;

/// Order in which the panel's shift registers expect the three channels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ColorOrder {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ColorOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Rbg => "RBG",
            Self::Grb => "GRB",
            Self::Gbr => "GBR",
            Self::Brg => "BRG",
            Self::Bgr => "BGR",
        }
    }

    /// Reorders an `[r, g, b]` triple into wire order.
    pub const fn permute(self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        match self {
            Self::Rgb => [r, g, b],
            Self::Rbg => [r, b, g],
            Self::Grb => [g, r, b],
            Self::Gbr => [g, b, r],
            Self::Brg => [b, r, g],
            Self::Bgr => [b, g, r],
        }
    }
}

impl FromStr for ColorOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [ColorOrder; 6] = [
            ColorOrder::Rgb,
            ColorOrder::Rbg,
            ColorOrder::Grb,
            ColorOrder::Gbr,
            ColorOrder::Brg,
            ColorOrder::Bgr,
        ];

        ALL.into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s))
            .ok_or(Error::UnknownColorOrder)
    }
}

impl fmt::Display for ColorOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scales one 8-bit channel by brightness and truncates it to `bit_depth` bits.
pub(crate) fn encode_channel(value: u8, brightness: f32, bit_depth: u8) -> u8 {
    let scaled = (value as f32 * brightness.clamp(0.0, 1.0)) as u8;
    scaled >> (8 - bit_depth.clamp(1, 8))
}

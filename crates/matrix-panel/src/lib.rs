#![cfg_attr(not(test), no_std)]

//! HUB75-style RGB LED matrix panel primitives.
//!
//! The crate owns the pixel side of the panel boundary: a logical RGB
//! framebuffer, the rotation that maps logical coordinates onto the physical
//! matrix, and the per-pixel encoding (brightness, bit depth, color order)
//! a scan-out driver shifts onto the wire.

extern crate alloc;

mod encoding;
mod framebuffer;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use encoding::ColorOrder;
pub use framebuffer::FrameBuffer;

use core::fmt;

/// Largest bit depth a scan-out driver can shift per channel.
pub const MAX_BIT_DEPTH: u8 = 8;

/// Cardinal rotation applied between logical and physical coordinates.
///
/// Rotation is clockwise, matching how the panel is physically turned.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parses a rotation given in degrees. Only the four cardinal values are valid.
    pub const fn from_degrees(degrees: u16) -> Result<Self, Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(Error::InvalidRotation { degrees }),
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// True when logical width/height are swapped relative to the panel.
    pub const fn is_transposed(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = Error;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

/// Panel configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelConfig {
    /// Physical width in pixels.
    pub width: u16,
    /// Physical height in pixels.
    pub height: u16,
    /// Bits per channel shifted out by the scan-out driver (1..=8).
    pub bit_depth: u8,
    /// Channel order expected by the panel's shift registers.
    pub color_order: ColorOrder,
    /// Global brightness, 0.0..=1.0.
    pub brightness: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            bit_depth: 4,
            color_order: ColorOrder::Rgb,
            brightness: 0.2,
        }
    }
}

impl PanelConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions);
        }
        if self.bit_depth == 0 || self.bit_depth > MAX_BIT_DEPTH {
            return Err(Error::InvalidBitDepth(self.bit_depth));
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(Error::InvalidBrightness);
        }
        Ok(())
    }
}

/// Panel errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error {
    /// Rotation is not one of 0, 90, 180, 270.
    InvalidRotation { degrees: u16 },
    /// Bit depth outside 1..=8.
    InvalidBitDepth(u8),
    /// Brightness outside 0.0..=1.0.
    InvalidBrightness,
    /// Color order string is not a permutation of "RGB".
    UnknownColorOrder,
    /// Width or height is zero.
    InvalidDimensions,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRotation { degrees } => {
                write!(f, "rotation {degrees} is not one of 0/90/180/270")
            }
            Self::InvalidBitDepth(depth) => write!(f, "bit depth {depth} outside 1..=8"),
            Self::InvalidBrightness => f.write_str("brightness outside 0.0..=1.0"),
            Self::UnknownColorOrder => f.write_str("unknown color order"),
            Self::InvalidDimensions => f.write_str("panel dimensions must be non-zero"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cardinal_rotations_parse() {
        assert_eq!(Rotation::from_degrees(0), Ok(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(270), Ok(Rotation::Deg270));
        assert_eq!(
            Rotation::from_degrees(45),
            Err(Error::InvalidRotation { degrees: 45 })
        );
        assert_eq!(
            Rotation::try_from(360),
            Err(Error::InvalidRotation { degrees: 360 })
        );
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        let mut config = PanelConfig::default();
        assert_eq!(config.validate(), Ok(()));

        config.bit_depth = 0;
        assert_eq!(config.validate(), Err(Error::InvalidBitDepth(0)));

        config.bit_depth = 4;
        config.brightness = 1.5;
        assert_eq!(config.validate(), Err(Error::InvalidBrightness));

        config.brightness = 0.2;
        config.height = 0;
        assert_eq!(config.validate(), Err(Error::InvalidDimensions));
    }
}

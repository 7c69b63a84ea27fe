//! In-memory RGB framebuffer for the matrix.

use alloc::{vec, vec::Vec};

use crate::{Error, PanelConfig, Rotation, encoding::encode_channel};

/// 24-bit RGB framebuffer stored in physical scan order.
///
/// Pixels are written through logical coordinates; the current [`Rotation`]
/// maps them onto the physical row-major buffer the scan-out driver reads.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    config: PanelConfig,
    rotation: Rotation,
    pixels: Vec<[u8; 3]>,
}

impl FrameBuffer {
    /// Creates a black framebuffer for the given panel.
    pub fn new(config: PanelConfig) -> Result<Self, Error> {
        config.validate()?;
        let len = config.width as usize * config.height as usize;
        Ok(Self {
            config,
            rotation: Rotation::Deg0,
            pixels: vec![[0u8; 3]; len],
        })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Logical `(width, height)` after rotation.
    pub fn logical_size(&self) -> (usize, usize) {
        let (w, h) = (self.config.width as usize, self.config.height as usize);
        if self.rotation.is_transposed() {
            (h, w)
        } else {
            (w, h)
        }
    }

    /// Clears every pixel to the given color.
    pub fn clear(&mut self, rgb: [u8; 3]) {
        self.pixels.fill(rgb);
    }

    /// Sets a pixel in logical coordinates.
    ///
    /// Returns `true` when pixel is in bounds, `false` otherwise.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) -> bool {
        let Some(index) = self.physical_index(x, y) else {
            return false;
        };
        self.pixels[index] = rgb;
        true
    }

    /// Reads a pixel in logical coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        self.physical_index(x, y).map(|index| self.pixels[index])
    }

    /// Reads a pixel in physical scan coordinates, before encoding.
    pub fn physical_pixel(&self, px: usize, py: usize) -> Option<[u8; 3]> {
        let (w, h) = (self.config.width as usize, self.config.height as usize);
        if px >= w || py >= h {
            return None;
        }
        Some(self.pixels[py * w + px])
    }

    /// Reads a physical pixel as the scan-out driver shifts it: brightness
    /// scaled, truncated to the configured bit depth, in wire channel order.
    pub fn encoded_pixel(&self, px: usize, py: usize) -> Option<[u8; 3]> {
        let [r, g, b] = self.physical_pixel(px, py)?;
        let PanelConfig {
            brightness,
            bit_depth,
            color_order,
            ..
        } = self.config;
        let encoded = [
            encode_channel(r, brightness, bit_depth),
            encode_channel(g, brightness, bit_depth),
            encode_channel(b, brightness, bit_depth),
        ];
        Some(color_order.permute(encoded))
    }

    /// One physical row, unencoded.
    pub fn row(&self, py: usize) -> Option<&[[u8; 3]]> {
        let w = self.config.width as usize;
        if py >= self.config.height as usize {
            return None;
        }
        Some(&self.pixels[py * w..(py + 1) * w])
    }

    fn physical_index(&self, x: usize, y: usize) -> Option<usize> {
        let (lw, lh) = self.logical_size();
        if x >= lw || y >= lh {
            return None;
        }

        let (pw, ph) = (self.config.width as usize, self.config.height as usize);
        let (px, py) = match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (pw - 1 - y, x),
            Rotation::Deg180 => (pw - 1 - x, ph - 1 - y),
            Rotation::Deg270 => (y, ph - 1 - x),
        };
        Some(py * pw + px)
    }
}

//! The pixel surface tasks draw into.

use crate::color::{Rgb, Rgba};
use crate::error::{SignwheelError, SignwheelResult};

/// Width of the reference sign hardware in pixels.
pub const SIGN_WIDTH: u32 = 32;
/// Height of the reference sign hardware in pixels.
pub const SIGN_HEIGHT: u32 = 32;

/// Fixed-size RGB8 surface, row-major, one frame of sign content.
///
/// Writes outside the surface are silently dropped so tasks can draw
/// partially off-screen geometry without clipping it themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// New all-black canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        Canvas {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// New canvas at the reference sign resolution (32x32).
    pub fn sign() -> Self {
        Canvas::new(SIGN_WIDTH, SIGN_HEIGHT)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read a pixel; `None` outside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        let i = self.index(x, y)?;
        Some(Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Blend a pixel onto the surface. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: impl Into<Rgba>) {
        let Some(i) = self.index(x, y) else { return };
        let src: Rgba = color.into();
        let out = src.over(Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2]));
        self.data[i] = out.r;
        self.data[i + 1] = out.g;
        self.data[i + 2] = out.b;
    }

    /// Reset every pixel to black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Raw row-major RGB8 bytes, `width * height * 3` long.
    pub fn as_rgb_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Replace the whole surface from raw RGB8 bytes of exactly the right length.
    pub fn copy_from_rgb_bytes(&mut self, bytes: &[u8]) -> SignwheelResult<()> {
        if bytes.len() != self.data.len() {
            return Err(SignwheelError::validation(format!(
                "pixel buffer is {} bytes, expected {} for {}x{}",
                bytes.len(),
                self.data.len(),
                self.width,
                self.height
            )));
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 3)
    }
}

//! Color types for the pixel matrix.
//!
//! The matrix itself is RGB only; alpha exists purely as a write-time blend
//! factor. Colors arrive from task code in three shapes: `Rgb` structs, packed
//! `0xAARRGGBB` integers, and `Rgba` for explicit blending.

/// Opaque 8-bit RGB color, the storage format of the matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 69, 58);
    pub const ORANGE: Rgb = Rgb::new(255, 159, 10);
    pub const YELLOW: Rgb = Rgb::new(255, 214, 10);
    pub const GREEN: Rgb = Rgb::new(50, 215, 75);
    pub const MINT: Rgb = Rgb::new(102, 212, 207);
    pub const TEAL: Rgb = Rgb::new(106, 196, 220);
    pub const CYAN: Rgb = Rgb::new(90, 200, 245);
    pub const BLUE: Rgb = Rgb::new(10, 132, 255);
    pub const INDIGO: Rgb = Rgb::new(94, 92, 230);
    pub const PURPLE: Rgb = Rgb::new(191, 90, 242);
    pub const PINK: Rgb = Rgb::new(255, 55, 95);
    pub const BROWN: Rgb = Rgb::new(172, 142, 104);
    pub const GRAY: Rgb = Rgb::new(152, 152, 157);
}

/// Straight-alpha RGBA color used for blended canvas writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Decode a packed `0xAARRGGBB` integer.
    ///
    /// An alpha byte of zero is treated as fully opaque so that plain
    /// `0xRRGGBB` literals work unchanged; fully transparent draws are
    /// pointless on a sign, so nothing of value is lost.
    pub const fn from_argb(packed: u32) -> Self {
        let a = (packed >> 24) as u8;
        Rgba {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
            a: if a == 0 { 255 } else { a },
        }
    }

    /// Source-over blend of `self` onto an opaque destination pixel.
    pub fn over(self, dst: Rgb) -> Rgb {
        match self.a {
            255 => Rgb::new(self.r, self.g, self.b),
            0 => dst,
            a => Rgb::new(
                lerp_channel(dst.r, self.r, a),
                lerp_channel(dst.g, self.g, a),
                lerp_channel(dst.b, self.b, a),
            ),
        }
    }
}

/// `dst + (src - dst) * a/255` with round-to-nearest.
fn lerp_channel(dst: u8, src: u8, a: u8) -> u8 {
    let src = u32::from(src) * u32::from(a);
    let dst = u32::from(dst) * (255 - u32::from(a));
    ((src + dst + 127) / 255) as u8
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        Rgba::new(c.r, c.g, c.b, 255)
    }
}

impl From<u32> for Rgba {
    fn from(packed: u32) -> Self {
        Rgba::from_argb(packed)
    }
}

impl From<(u8, u8, u8)> for Rgba {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgba::new(r, g, b, 255)
    }
}

impl From<(u8, u8, u8, u8)> for Rgba {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Rgba::new(r, g, b, a)
    }
}

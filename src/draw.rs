//! Small immediate-mode drawing helpers over [`Canvas`].
//!
//! Rectangles take two inclusive corners in any order; everything clips
//! through the canvas itself, so callers never bounds-check.

use crate::canvas::Canvas;
use crate::color::Rgba;

/// Fill the whole canvas with one color.
pub fn fill(canvas: &mut Canvas, color: impl Into<Rgba>) {
    let c: Rgba = color.into();
    for y in 0..canvas.height() as i32 {
        for x in 0..canvas.width() as i32 {
            canvas.set_pixel(x, y, c);
        }
    }
}

/// Fill the rectangle spanned by two inclusive corners.
pub fn fill_rect(canvas: &mut Canvas, x0: i32, y0: i32, x1: i32, y1: i32, color: impl Into<Rgba>) {
    let c: Rgba = color.into();
    let (xa, xb) = (x0.min(x1), x0.max(x1));
    let (ya, yb) = (y0.min(y1), y0.max(y1));
    for y in ya..=yb {
        for x in xa..=xb {
            canvas.set_pixel(x, y, c);
        }
    }
}

/// Outline the rectangle spanned by two inclusive corners.
pub fn stroke_rect(canvas: &mut Canvas, x0: i32, y0: i32, x1: i32, y1: i32, color: impl Into<Rgba>) {
    let c: Rgba = color.into();
    let (xa, xb) = (x0.min(x1), x0.max(x1));
    let (ya, yb) = (y0.min(y1), y0.max(y1));
    for x in xa..=xb {
        canvas.set_pixel(x, ya, c);
        canvas.set_pixel(x, yb, c);
    }
    for y in ya + 1..yb {
        canvas.set_pixel(xa, y, c);
        canvas.set_pixel(xb, y, c);
    }
}

/// Bresenham line between two inclusive endpoints.
pub fn line(canvas: &mut Canvas, x0: i32, y0: i32, x1: i32, y1: i32, color: impl Into<Rgba>) {
    let c: Rgba = color.into();
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        canvas.set_pixel(x, y, c);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

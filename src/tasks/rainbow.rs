//! Concentric rainbow rings radiating from the center.

use std::time::Duration;

use crate::canvas::Canvas;
use crate::task::{ScreenTask, TaskInfo};

const PALETTE: [u32; 15] = [
    0xFF0000, 0xFF6000, 0xFFBF00, 0xB5FF00, 0x80FF00, 0x20FF00, 0x00FF40, 0x00FFFF, 0x009FFF,
    0x0040FF, 0x2000FF, 0x7F00FF, 0xDF00FF, 0xFF00BF, 0xFF0060,
];

/// Rings of palette color keyed to distance from center, marching outward
/// one ring per frame.
pub struct RainbowWave {
    frame: u32,
    elapsed: Duration,
}

impl RainbowWave {
    pub fn new() -> Self {
        RainbowWave {
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for RainbowWave {
    fn default() -> Self {
        RainbowWave::new()
    }
}

fn palette_index(distance: f64, frame: u32) -> usize {
    ((distance - frame as f64) as i64).rem_euclid(PALETTE.len() as i64) as usize
}

impl ScreenTask for RainbowWave {
    fn info(&self) -> TaskInfo {
        TaskInfo::new("rainbow_wave", "Rainbow Wave", "Mac Coleman")
    }

    fn prepare(&mut self) -> bool {
        self.frame = 0;
        self.elapsed = Duration::ZERO;
        true
    }

    fn draw_frame(&mut self, canvas: &mut Canvas, delta: Duration) -> bool {
        self.elapsed += delta;
        let cx = (canvas.width() - 1) as f64 / 2.0;
        let cy = (canvas.height() - 1) as f64 / 2.0;
        for y in 0..canvas.height() as i32 {
            for x in 0..canvas.width() as i32 {
                let distance = ((cx - x as f64).powi(2) + (cy - y as f64).powi(2)).sqrt();
                canvas.set_pixel(x, y, PALETTE[palette_index(distance, self.frame)]);
            }
        }
        self.frame += 1;
        self.elapsed > self.budget().suggested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_index_stays_in_range_for_any_frame() {
        for frame in [0, 1, 14, 15, 1000, u32::MAX / 2] {
            for distance in [0.0, 7.3, 21.9] {
                assert!(palette_index(distance, frame) < PALETTE.len());
            }
        }
    }

    #[test]
    fn rings_advance_with_the_frame_counter() {
        assert_eq!(palette_index(20.5, 0), 5);
        assert_eq!(palette_index(20.5, 1), 4);
        assert_eq!(palette_index(20.5, 6), 14);
    }

    #[test]
    fn every_pixel_is_painted() {
        let mut task = RainbowWave::new();
        let mut canvas = Canvas::new(8, 8);
        task.prepare();
        task.draw_frame(&mut canvas, Duration::from_millis(40));
        for y in 0..8 {
            for x in 0..8 {
                let p = canvas.pixel(x, y).unwrap();
                assert!(p.r != 0 || p.g != 0 || p.b != 0);
            }
        }
    }
}

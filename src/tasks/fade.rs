//! Full-screen color fade.

use std::time::Duration;

use crate::canvas::Canvas;
use crate::draw;
use crate::task::{ScreenTask, TaskInfo};

/// Slow wash from blue through purple to red and around again.
pub struct ColorFade {
    frame: u16,
    elapsed: Duration,
}

impl ColorFade {
    pub fn new() -> Self {
        ColorFade {
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for ColorFade {
    fn default() -> Self {
        ColorFade::new()
    }
}

impl ScreenTask for ColorFade {
    fn info(&self) -> TaskInfo {
        TaskInfo::new("color_fade", "Color Fade", "Mac Coleman")
    }

    fn prepare(&mut self) -> bool {
        self.frame = 0;
        self.elapsed = Duration::ZERO;
        true
    }

    fn draw_frame(&mut self, canvas: &mut Canvas, delta: Duration) -> bool {
        self.elapsed += delta;
        let r = self.frame as u8;
        let b = (255 - self.frame) as u8;
        draw::fill(canvas, (r, 0, b));
        // Stepping modulo 255 (not 256) drifts the phase by one each lap.
        self.frame = (self.frame + 4) % 255;
        self.elapsed > self.budget().suggested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn starts_blue_and_warms_up() {
        let mut task = ColorFade::new();
        let mut canvas = Canvas::new(4, 4);
        assert!(task.prepare());
        task.draw_frame(&mut canvas, Duration::from_millis(40));
        assert_eq!(canvas.pixel(0, 0), Some(Rgb::new(0, 0, 255)));
        task.draw_frame(&mut canvas, Duration::from_millis(40));
        assert_eq!(canvas.pixel(0, 0), Some(Rgb::new(4, 0, 251)));
    }

    #[test]
    fn frame_counter_wraps_off_by_one() {
        let mut task = ColorFade::new();
        let mut canvas = Canvas::new(1, 1);
        task.prepare();
        for _ in 0..64 {
            task.draw_frame(&mut canvas, Duration::from_millis(40));
        }
        // 64 steps of 4 is 256, which wraps to 1 modulo 255.
        assert_eq!(task.frame, 1);
    }

    #[test]
    fn reports_done_only_past_the_suggested_time() {
        let mut task = ColorFade::new();
        let mut canvas = Canvas::new(1, 1);
        task.prepare();
        assert!(!task.draw_frame(&mut canvas, Duration::from_secs(29)));
        assert!(task.draw_frame(&mut canvas, Duration::from_secs(2)));
    }
}

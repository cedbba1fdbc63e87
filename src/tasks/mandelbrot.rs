//! Mandelbrot set flythrough.
//!
//! Opens on the full set while the iteration depth ramps up, then picks one
//! of a few hand-found points on the boundary and zooms in forever. Far too
//! slow to render live on sign hardware, which is exactly what the frame
//! cache is for.

use std::time::Duration;

use rand::Rng;

use crate::canvas::Canvas;
use crate::status::StatusText;
use crate::task::{ScreenTask, TaskInfo};

const PALETTE: [u32; 15] = [
    0xFF0000, 0xFF6000, 0xFFBF00, 0xB5FF00, 0x80FF00, 0x20FF00, 0x00FF40, 0x00FFFF, 0x009FFF,
    0x0040FF, 0x2000FF, 0x7F00FF, 0xDF00FF, 0xFF00BF, 0xFF0060,
];

const MAX_ITERATIONS: u32 = 150;
const INTRO_FRAMES: u32 = 140;

/// Boundary points worth zooming into.
const ZOOM_TARGETS: [(f64, f64); 10] = [
    (-1.7692505972726005, 0.05691909790039061),
    (-1.9426247732979907, 0.0),
    (-0.10539082118443051, -0.9248651776994978),
    (-1.0200429643903455, 0.36748341151646224),
    (-0.7464179992675776, 0.18429674421037967),
    (0.42451275246484, 0.2075301834515165),
    (-1.2840499877929685, 0.427382332938058),
    (0.3577270507812499, -0.11002349853515625),
    (-1.985455104282924, 0.0),
    (-1.2517939976283483, 0.0411834716796875),
];

pub struct Mandelbrot {
    center: (f64, f64),
    scale: f64,
    frame: u32,
    iterations: u32,
    chosen: Option<(f64, f64)>,
    elapsed: Duration,
}

impl Mandelbrot {
    pub fn new() -> Self {
        Mandelbrot {
            center: (0.0, 0.0),
            scale: 4.0,
            frame: 0,
            iterations: 1,
            chosen: None,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Mandelbrot::new()
    }
}

/// Escape count for `c = u + vi`, or `None` when the orbit survives `limit`
/// iterations. Points inside the cardioid or the period-2 bulb are `None`
/// by closed form without iterating.
fn escape_count(u: f64, v: f64, limit: u32) -> Option<u32> {
    if (u + 1.0).powi(2) + v * v <= 0.0625 {
        return None;
    }
    let q = (u - 0.25).powi(2) + v * v;
    if q * (q + (u - 0.25)) <= 0.25 * v * v {
        return None;
    }
    let (mut zr, mut zi) = (0.0f64, 0.0f64);
    let mut count = 0;
    while zr * zr + zi * zi < 4.0 && count < limit {
        let next_r = zr * zr - zi * zi + u;
        zi = 2.0 * zr * zi + v;
        zr = next_r;
        count += 1;
    }
    (count != limit).then_some(count)
}

impl ScreenTask for Mandelbrot {
    fn info(&self) -> TaskInfo {
        TaskInfo::new("mandelbrot", "Mandelbrot Set", "Mac Coleman").optimized()
    }

    fn prepare(&mut self) -> bool {
        *self = Mandelbrot::new();
        true
    }

    fn draw_frame(&mut self, canvas: &mut Canvas, delta: Duration) -> bool {
        self.elapsed += delta;
        let width = canvas.width() as i32;
        let height = canvas.height() as i32;
        let u_min = self.center.0 - self.scale / 2.0;
        let u_max = self.center.0 + self.scale / 2.0;
        let v_min = self.center.1 - self.scale / 2.0;
        let v_max = self.center.1 + self.scale / 2.0;

        for x in 0..width {
            for y in 0..height {
                let u = u_min + (u_max - u_min) * x as f64 / (width - 1) as f64;
                let v = v_min + (v_max - v_min) * y as f64 / (height - 1) as f64;
                if let Some(count) = escape_count(u, v, self.iterations) {
                    canvas.set_pixel(x, y, PALETTE[count as usize % PALETTE.len()]);
                }
            }
        }

        self.frame += 1;
        if self.iterations < MAX_ITERATIONS {
            self.iterations += 1;
        }
        if self.frame > INTRO_FRAMES {
            if self.chosen.is_none() {
                let mut rng = rand::thread_rng();
                // Flipping the imaginary axis half the time doubles the tour.
                let flip = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let (re, im) = ZOOM_TARGETS[rng.gen_range(0..ZOOM_TARGETS.len())];
                self.chosen = Some((re, im * flip));
            }
            if let Some((re, im)) = self.chosen {
                self.scale *= 0.995;
                self.center.0 += (re - self.center.0) * (self.scale / 75.0);
                self.center.1 += (im - self.center.1) * (self.scale / 75.0);
            }
        }
        false
    }

    fn status_text(&self) -> StatusText {
        let info = self.info();
        let et = self.elapsed.as_secs_f64();
        let remaining = self.budget().max().as_secs_f64() - et;
        if self.frame < INTRO_FRAMES || remaining < 5.0 {
            return StatusText::title_card(info.title, info.artist);
        }
        match self.chosen {
            Some((re, im)) if et >= 40.0 => {
                StatusText::from_lines(&format!("a = {re:12.8}"), &format!(" + {im:12.8}i"))
            }
            _ if et > 20.0 => StatusText::from_lines("in the land of", "the imaginary!"),
            _ => StatusText::from_lines("Come with me on", "a journey..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_interior() {
        assert_eq!(escape_count(0.0, 0.0, MAX_ITERATIONS), None);
    }

    #[test]
    fn period_two_bulb_short_circuits() {
        assert_eq!(escape_count(-1.0, 0.0, 1), None);
        assert_eq!(escape_count(-1.1, 0.05, MAX_ITERATIONS), None);
    }

    #[test]
    fn far_points_escape_fast() {
        let count = escape_count(2.0, 2.0, MAX_ITERATIONS).unwrap();
        assert!(count <= 2);
    }

    #[test]
    fn zoom_starts_after_the_intro() {
        let mut task = Mandelbrot::new();
        let mut canvas = Canvas::new(8, 8);
        task.prepare();
        let dt = Duration::from_millis(10);
        for _ in 0..INTRO_FRAMES {
            task.draw_frame(&mut canvas, dt);
        }
        assert_eq!(task.scale, 4.0);
        assert!(task.chosen.is_none());
        task.draw_frame(&mut canvas, dt);
        assert!(task.chosen.is_some());
        assert!(task.scale < 4.0);
    }

    #[test]
    fn status_narrates_the_journey() {
        let mut task = Mandelbrot::new();
        task.frame = INTRO_FRAMES + 1;
        task.elapsed = Duration::from_secs(10);
        assert_eq!(task.status_text().top().trim(), "Come with me on");
        task.elapsed = Duration::from_secs(30);
        assert_eq!(task.status_text().top().trim(), "in the land of");
        task.chosen = Some((-1.9426247732979907, 0.0));
        task.elapsed = Duration::from_secs(45);
        assert!(task.status_text().top().contains("a ="));
        // Near the hard cap the title card returns.
        task.elapsed = Duration::from_secs(56);
        assert_eq!(task.status_text().top().trim(), "Mandelbrot Set");
    }
}

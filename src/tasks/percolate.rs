//! Random-fill percolation watcher.

use std::time::Duration;

use rand::Rng;

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::task::{ScreenTask, TaskInfo};

const EMPTY: u8 = 0;
const FILLED: u8 = 1;
const WET: u8 = 2;

/// Drops one random block per frame until water poured on the top row can
/// reach the bottom, then sits on the finished picture until retired.
pub struct Percolate {
    grid: Vec<u8>,
    width: usize,
    height: usize,
}

impl Percolate {
    pub fn new() -> Self {
        Percolate {
            grid: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// The grid matches the canvas and is only sized on first draw.
    fn ensure_grid(&mut self, canvas: &Canvas) {
        let (w, h) = (canvas.width() as usize, canvas.height() as usize);
        if (self.width, self.height) != (w, h) {
            self.width = w;
            self.height = h;
            self.grid = vec![EMPTY; w * h];
        }
    }

    /// Wet every filled cell reachable from the top row, returning whether
    /// the bottom row got wet. Marks persist between frames.
    fn flood(&mut self) -> bool {
        let (w, h) = (self.width, self.height);
        if w == 0 || h == 0 {
            return false;
        }
        for x in 0..w {
            if self.grid[x] == FILLED {
                self.grid[x] = WET;
            }
        }
        let mut stack: Vec<usize> = (0..self.grid.len()).filter(|&i| self.grid[i] == WET).collect();
        while let Some(i) = stack.pop() {
            let (x, y) = (i % w, i / w);
            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx < w && ny < h {
                    let j = ny * w + nx;
                    if self.grid[j] == FILLED {
                        self.grid[j] = WET;
                        stack.push(j);
                    }
                }
            }
        }
        (0..w).any(|x| self.grid[(h - 1) * w + x] == WET)
    }
}

impl Default for Percolate {
    fn default() -> Self {
        Percolate::new()
    }
}

impl ScreenTask for Percolate {
    fn info(&self) -> TaskInfo {
        TaskInfo::new("percolate", "Percolate", "Luna")
    }

    fn prepare(&mut self) -> bool {
        self.grid.clear();
        self.width = 0;
        self.height = 0;
        true
    }

    fn draw_frame(&mut self, canvas: &mut Canvas, _delta: Duration) -> bool {
        self.ensure_grid(canvas);
        if !self.flood() {
            let mut rng = rand::thread_rng();
            loop {
                let x = rng.gen_range(0..self.width);
                let y = rng.gen_range(0..self.height);
                let i = y * self.width + x;
                if self.grid[i] == EMPTY {
                    self.grid[i] = FILLED;
                    break;
                }
            }
        }
        let done = self.flood();
        for y in 0..self.height {
            for x in 0..self.width {
                match self.grid[y * self.width + x] {
                    FILLED => canvas.set_pixel(x as i32, y as i32, Rgb::GRAY),
                    WET => canvas.set_pixel(x as i32, y as i32, Rgb::TEAL),
                    _ => {}
                }
            }
        }
        done
    }
}

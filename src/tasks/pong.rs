//! Self-playing pong with a rainbow ball trail.

use std::time::Duration;

use rand::Rng;

use crate::canvas::Canvas;
use crate::color::Rgba;
use crate::draw;
use crate::task::{ScreenTask, TaskInfo};

const TRAIL_COLORS: [u32; 15] = [
    0xFF0000, 0xFF6000, 0xFFBF00, 0xB5FF00, 0x80FF00, 0x20FF00, 0x00FF40, 0x00FFFF, 0x009FFF,
    0x0040FF, 0x2000FF, 0x7F00FF, 0xDF00FF, 0xFF00BF, 0xFF0060,
];

/// The board is the reference 32x32 sign; smaller canvases clip it.
const BOARD: f64 = 32.0;
const PADDLE_HEIGHT: f64 = 8.0;
const BALL_SPEED: f64 = 20.0;

/// Two computer paddles rallying forever. The paddle on the receiving side
/// tracks the ball at full speed while the other dawdles, so nobody wins
/// very often.
pub struct Pong {
    ball_x: f64,
    ball_y: f64,
    vel_x: f64,
    vel_y: f64,
    left_y: f64,
    right_y: f64,
    left_score: u32,
    right_score: u32,
    trail: Vec<(f64, f64)>,
}

impl Pong {
    pub fn new() -> Self {
        Pong {
            ball_x: BOARD / 2.0,
            ball_y: BOARD / 2.0,
            vel_x: BALL_SPEED,
            vel_y: 0.0,
            left_y: BOARD / 2.0,
            right_y: BOARD / 2.0,
            left_score: 0,
            right_score: 0,
            trail: Vec::new(),
        }
    }

    fn serve(&mut self, toward_right: bool) {
        let mut rng = rand::thread_rng();
        let angle = rng.gen_range(-std::f64::consts::FRAC_PI_4..std::f64::consts::FRAC_PI_4) * 0.3;
        let dir = if toward_right { 1.0 } else { -1.0 };
        self.ball_x = BOARD / 2.0;
        self.ball_y = BOARD / 2.0;
        self.vel_x = dir * BALL_SPEED * angle.cos();
        self.vel_y = BALL_SPEED * angle.sin();
        self.trail.clear();
    }

    /// Walk the recent ball path and tint each crossed cell with the next
    /// trail color, fading in as the walk gets older.
    fn draw_trail(&self, canvas: &mut Canvas) {
        let mut last_colored: Option<(i32, i32)> = None;
        let mut color_index = 0usize;
        for i in (1..self.trail.len()).rev() {
            if color_index > TRAIL_COLORS.len() {
                break;
            }
            let (mut fx, mut fy) = self.trail[i];
            let (lx, ly) = self.trail[i - 1];
            let span = ((lx - fx).powi(2) + (ly - fy).powi(2)).sqrt();
            if span == 0.0 {
                continue;
            }
            let step_x = 0.25 * (lx - fx) / span;
            let step_y = 0.25 * (ly - fy) / span;
            while (lx - fx).powi(2) + (ly - fy).powi(2) > 0.25 {
                fx += step_x;
                fy += step_y;
                let cell = (fx as i32, fy as i32);
                if last_colored != Some(cell) {
                    let packed = TRAIL_COLORS[color_index % TRAIL_COLORS.len()];
                    let alpha = (255 * color_index / TRAIL_COLORS.len()).min(255) as u8;
                    canvas.set_pixel(
                        cell.0,
                        cell.1,
                        Rgba::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8, alpha),
                    );
                    color_index += 1;
                    last_colored = Some(cell);
                }
            }
        }
    }
}

impl Default for Pong {
    fn default() -> Self {
        Pong::new()
    }
}

impl ScreenTask for Pong {
    fn info(&self) -> TaskInfo {
        TaskInfo::new("pong", "Pong", "Mac Coleman")
    }

    fn prepare(&mut self) -> bool {
        self.left_y = BOARD / 2.0;
        self.right_y = BOARD / 2.0;
        self.left_score = 0;
        self.right_score = 0;
        self.serve(rand::thread_rng().gen_bool(0.5));
        true
    }

    fn draw_frame(&mut self, canvas: &mut Canvas, delta: Duration) -> bool {
        let dt = delta.as_secs_f64();
        self.ball_x += self.vel_x * dt;
        self.ball_y += self.vel_y * dt;

        let left_dist = self.ball_y - self.left_y;
        let right_dist = self.ball_y - self.right_y;

        let mut left_vel = if left_dist.abs() > 3.0 { left_dist.signum() / 1.5 } else { 0.0 };
        let mut right_vel = if right_dist.abs() > 3.0 { right_dist.signum() / 1.5 } else { 0.0 };
        // The side not receiving the ball only drifts.
        if self.vel_x > 0.0 {
            left_vel /= 10.0;
        } else {
            right_vel /= 10.0;
        }
        self.left_y += left_vel;
        self.right_y += right_vel;

        self.draw_trail(canvas);
        canvas.set_pixel(self.ball_x as i32, self.ball_y as i32, 0xFFFFFF);
        draw::fill_rect(
            canvas,
            2,
            (self.left_y + PADDLE_HEIGHT / 2.0) as i32,
            2,
            (self.left_y - PADDLE_HEIGHT / 2.0) as i32,
            0xFFFFFF,
        );
        draw::fill_rect(
            canvas,
            29,
            (self.right_y + PADDLE_HEIGHT / 2.0) as i32,
            29,
            (self.right_y - PADDLE_HEIGHT / 2.0) as i32,
            0xFFFFFF,
        );

        if self.ball_x >= BOARD || self.ball_x <= 0.0 {
            self.vel_x = -self.vel_x;
        }

        let paddle_window = (PADDLE_HEIGHT / 2.0).ceil() + 1.0;
        if self.ball_x >= BOARD - 3.0 && self.vel_x > 0.0 {
            if right_dist.abs() < paddle_window {
                self.vel_x = -self.vel_x;
                self.vel_y += right_dist;
            } else {
                self.left_score += 1;
                self.serve(true);
            }
        }
        if self.ball_x < 3.0 && self.vel_x < 0.0 {
            if left_dist.abs() < paddle_window {
                self.vel_x = -self.vel_x;
                self.vel_y += left_dist;
            } else {
                self.right_score += 1;
                self.serve(false);
            }
        }

        self.vel_y = self.vel_y.clamp(-BALL_SPEED, BALL_SPEED);
        if (self.ball_y >= BOARD && self.vel_y > 0.0) || (self.ball_y <= 0.0 && self.vel_y < 0.0) {
            self.vel_y = -self.vel_y;
        }

        self.trail.push((self.ball_x, self.ball_y));
        false
    }

    fn status_text(&self) -> crate::status::StatusText {
        crate::status::StatusText::from_lines(
            "Pong",
            &format!("{} - {}", self.left_score, self.right_score),
        )
    }
}

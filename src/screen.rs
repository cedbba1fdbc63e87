//! Output devices for finished frames and status text.

use std::io::{self, Write};

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::error::{SignwheelError, SignwheelResult};
use crate::status::StatusText;

/// Where finished frames and status lines go.
///
/// The run loop pushes every frame to exactly one screen. Implementations
/// over real hardware live out of tree; in tree are the terminal simulator
/// and a discarding screen for tests and pre-warming.
pub trait Screen {
    /// Present one finished frame.
    fn update_display(&mut self, canvas: &Canvas) -> SignwheelResult<()>;

    /// Present the current status text.
    fn update_status(&mut self, text: &StatusText) -> SignwheelResult<()>;
}

/// Render a canvas as ANSI truecolor half-blocks, two pixel rows per line.
///
/// Each cell's background is the upper pixel and its foreground paints the
/// lower half block glyph, so a 32x32 frame fits in 16 terminal rows.
pub fn render_ansi(canvas: &Canvas) -> String {
    let width = canvas.width() as i32;
    let height = canvas.height() as i32;
    let mut out = String::new();
    let mut y = 0;
    while y < height {
        for x in 0..width {
            let top = canvas.pixel(x, y).unwrap_or(Rgb::BLACK);
            let bottom = canvas.pixel(x, y + 1).unwrap_or(Rgb::BLACK);
            out.push_str(&format!(
                "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m\u{2584}",
                top.r, top.g, top.b, bottom.r, bottom.g, bottom.b
            ));
        }
        out.push_str("\x1b[0m\n");
        y += 2;
    }
    out
}

/// Terminal simulator for developing tasks without sign hardware.
pub struct TerminalScreen {
    out: io::Stdout,
}

impl TerminalScreen {
    pub fn new() -> Self {
        TerminalScreen { out: io::stdout() }
    }
}

impl Default for TerminalScreen {
    fn default() -> Self {
        TerminalScreen::new()
    }
}

impl Screen for TerminalScreen {
    fn update_display(&mut self, canvas: &Canvas) -> SignwheelResult<()> {
        // Home the cursor instead of clearing so the frame repaints in place.
        let mut buf = String::from("\x1b[H");
        buf.push_str(&render_ansi(canvas));
        self.out
            .write_all(buf.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| SignwheelError::screen(format!("write frame: {e}")))
    }

    fn update_status(&mut self, text: &StatusText) -> SignwheelResult<()> {
        let lines = format!("[{}]\n[{}]\n", text.top(), text.bottom());
        self.out
            .write_all(lines.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| SignwheelError::screen(format!("write status: {e}")))
    }
}

/// Discards everything; used by tests and cache pre-warming.
#[derive(Debug, Default)]
pub struct HeadlessScreen;

impl Screen for HeadlessScreen {
    fn update_display(&mut self, _canvas: &Canvas) -> SignwheelResult<()> {
        Ok(())
    }

    fn update_status(&mut self, _text: &StatusText) -> SignwheelResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_packs_two_rows_per_line() {
        let mut c = Canvas::new(2, 4);
        c.set_pixel(0, 0, Rgb::WHITE);
        c.set_pixel(1, 3, Rgb::RED);
        let out = render_ansi(&c);
        assert_eq!(out.matches('\n').count(), 2);
        assert_eq!(out.matches('\u{2584}').count(), 4);
        assert!(out.starts_with("\x1b[48;2;255;255;255m"));
        assert!(out.contains("\x1b[38;2;255;69;58m"));
    }

    #[test]
    fn ansi_rows_reset_at_line_end() {
        let c = Canvas::new(1, 2);
        let out = render_ansi(&c);
        assert_eq!(out, "\x1b[48;2;0;0;0m\x1b[38;2;0;0;0m\u{2584}\x1b[0m\n");
    }

    #[test]
    fn odd_height_renders_black_below() {
        let mut c = Canvas::new(1, 3);
        c.set_pixel(0, 2, Rgb::WHITE);
        let out = render_ansi(&c);
        assert_eq!(out.matches('\n').count(), 2);
        assert!(out.ends_with("\x1b[48;2;255;255;255m\x1b[38;2;0;0;0m\u{2584}\x1b[0m\n"));
    }
}

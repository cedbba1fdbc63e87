//! The screen shown when task code panics.

use std::time::Duration;

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::draw;
use crate::status::StatusText;
use crate::task::{RunBudget, ScreenTask, TaskInfo};

/// Red cross over the whole sign with the panic message on the status
/// display. Never registered in the rotation; the run loop installs it as
/// an ad-hoc override when a task panics.
pub struct FaultReport {
    message: String,
}

impl FaultReport {
    pub fn new(message: impl Into<String>) -> Self {
        FaultReport {
            message: message.into(),
        }
    }
}

impl ScreenTask for FaultReport {
    fn info(&self) -> TaskInfo {
        TaskInfo::new("fault_report", "Error :(", "signwheel").ignored()
    }

    /// Short enough not to hog the sign, long enough to be noticed.
    fn budget(&self) -> RunBudget {
        RunBudget::new(Duration::from_secs(10), Duration::from_secs(60))
    }

    fn draw_frame(&mut self, canvas: &mut Canvas, _delta: Duration) -> bool {
        let w = canvas.width() as i32;
        let h = canvas.height() as i32;
        draw::stroke_rect(canvas, 0, 0, w - 1, h - 1, Rgb::RED);
        draw::line(canvas, 0, 0, w - 1, h - 1, Rgb::RED);
        draw::line(canvas, 0, h - 1, w - 1, 0, Rgb::RED);
        true
    }

    fn status_text(&self) -> StatusText {
        StatusText::from_lines("Error :(", &self.message)
    }
}

//! The frame-driven render loop.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;
use std::time::{Duration, Instant};

use tracing::error;

use crate::canvas::Canvas;
use crate::error::SignwheelResult;
use crate::scheduler::{OverrideHandle, OverrideRequest, Scheduler};
use crate::screen::Screen;
use crate::tasks::FaultReport;

/// Drives the scheduler against one screen at a fixed frame rate.
///
/// Each frame: clear the canvas, step the scheduler with the real elapsed
/// time, push the frame and status text to the screen, then sleep out the
/// remainder of the frame budget.
///
/// The scheduler itself never catches panics; they surface here. A panic
/// escaping task code is logged and the fault report task is put on screen
/// in its place, so one broken task cannot black out the sign.
pub struct RunLoop {
    scheduler: Scheduler,
    canvas: Canvas,
    frame_time: Duration,
    max_frames: Option<u64>,
}

impl RunLoop {
    pub fn new(scheduler: Scheduler, width: u32, height: u32, fps: u32) -> Self {
        RunLoop {
            scheduler,
            canvas: Canvas::new(width, height),
            frame_time: Duration::from_secs(1) / fps.max(1),
            max_frames: None,
        }
    }

    /// Stop after `frames` frames instead of running forever.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// A sender for override requests, usable from any thread.
    pub fn override_handle(&self) -> OverrideHandle {
        self.scheduler.handle()
    }

    /// Run until the frame limit (or forever without one).
    pub fn run(mut self, screen: &mut dyn Screen) -> SignwheelResult<()> {
        let mut last = Instant::now();
        let mut frames = 0u64;
        while self.max_frames.is_none_or(|limit| frames < limit) {
            let now = Instant::now();
            let delta = now.duration_since(last);
            last = now;

            self.canvas.clear();
            let step = catch_unwind(AssertUnwindSafe(|| {
                self.scheduler.step(&mut self.canvas, delta)
            }));
            if let Err(payload) = step {
                let message = panic_message(payload.as_ref());
                error!(message = %message, "task panicked; substituting fault report");
                self.scheduler
                    .override_task(OverrideRequest::Adhoc(Box::new(FaultReport::new(&message))));
            }

            screen.update_display(&self.canvas)?;
            screen.update_status(&self.scheduler.status_text())?;
            frames += 1;

            if let Some(rest) = self.frame_time.checked_sub(now.elapsed()) {
                thread::sleep(rest);
            }
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TaskRegistry;
    use crate::status::StatusText;
    use crate::task::tests::Probe;
    use crate::task::{ScreenTask, TaskInfo};
    use std::sync::{Arc, Mutex};

    struct RecordingScreen {
        frames: usize,
        tops: Vec<String>,
    }

    impl RecordingScreen {
        fn new() -> Self {
            RecordingScreen {
                frames: 0,
                tops: Vec::new(),
            }
        }
    }

    impl Screen for RecordingScreen {
        fn update_display(&mut self, _canvas: &Canvas) -> SignwheelResult<()> {
            self.frames += 1;
            Ok(())
        }

        fn update_status(&mut self, text: &StatusText) -> SignwheelResult<()> {
            self.tops.push(text.top().to_string());
            Ok(())
        }
    }

    struct Exploding;

    impl ScreenTask for Exploding {
        fn info(&self) -> TaskInfo {
            TaskInfo::new("exploding", "Exploding", "tests")
        }

        fn draw_frame(&mut self, _canvas: &mut Canvas, _delta: Duration) -> bool {
            panic!("wires crossed");
        }
    }

    #[test]
    fn frame_limit_stops_the_loop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg = TaskRegistry::new();
        reg.register(Box::new(Probe::new("steady", log))).unwrap();
        let run = RunLoop::new(Scheduler::new(reg.into_slots(None)), 32, 32, 1000)
            .with_frame_limit(5);

        let mut screen = RecordingScreen::new();
        run.run(&mut screen).unwrap();
        assert_eq!(screen.frames, 5);
        assert_eq!(screen.tops.len(), 5);
    }

    #[test]
    fn panicking_task_is_replaced_by_the_fault_report() {
        let mut reg = TaskRegistry::new();
        reg.register(Box::new(Exploding)).unwrap();
        let run = RunLoop::new(Scheduler::new(reg.into_slots(None)), 32, 32, 1000)
            .with_frame_limit(3);

        let mut screen = RecordingScreen::new();
        run.run(&mut screen).unwrap();
        // The fault report is on screen from the frame of the panic onward.
        assert!(screen.tops.iter().all(|top| top.contains("Error :(")));
    }
}

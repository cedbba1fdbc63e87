//! Rotation scheduling: activation, retirement, overrides.
//!
//! The scheduler is single-threaded and frame-driven. Everything happens
//! inside [`Scheduler::step`], which the render loop calls once per frame
//! with the canvas and the real elapsed time since the previous frame. The
//! only cross-thread surface is the override queue: any number of control
//! channels may hold an [`OverrideHandle`] and push requests, which are
//! drained at the start of the next step.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::status::StatusText;
use crate::task::{ScreenTask, TaskId, TaskInfo, TaskSlot};

/// Fixed shuffle seed. The rotation order looks arbitrary on the sign but is
/// identical on every boot for a given task set.
const ROTATION_SEED: u64 = 0x5349_474E_5748_4545;

/// An out-of-band request to put a specific task on the sign.
///
/// Delivery is unconditional: the incumbent task is force-retired and the
/// target is activated even if its `prepare` would have declined. When the
/// overriding task leaves the screen, the rotation resumes from the start.
pub enum OverrideRequest {
    /// A rotation task, by registration id.
    ById(TaskId),
    /// A rotation task, by stable machine name. Unknown names are logged
    /// and ignored.
    ByName(String),
    /// A task instance from outside the rotation, e.g. a fault report.
    Adhoc(Box<dyn ScreenTask + Send>),
}

impl std::fmt::Debug for OverrideRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverrideRequest::ById(id) => f.debug_tuple("ById").field(id).finish(),
            OverrideRequest::ByName(name) => f.debug_tuple("ByName").field(name).finish(),
            OverrideRequest::Adhoc(task) => f.debug_tuple("Adhoc").field(&task.info().name).finish(),
        }
    }
}

/// Cloneable sender half of the override queue.
///
/// Held by control surfaces (key fob receivers, consoles) on any thread.
/// Requests are applied at the start of the next scheduler step; sending
/// after the scheduler is gone is a silent no-op.
#[derive(Clone)]
pub struct OverrideHandle {
    tx: Sender<OverrideRequest>,
}

impl OverrideHandle {
    pub fn send(&self, request: OverrideRequest) {
        let _ = self.tx.send(request);
    }
}

/// Where the rotation resumes once the current task retires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    /// From the start of the rotation. Installed by overrides (and at boot).
    Restart,
    /// From this slot index.
    At(usize),
}

/// What is on the sign right now.
enum Current {
    /// A rotation slot, by index.
    Rotation(usize),
    /// An override task living outside the rotation.
    Adhoc(TaskSlot),
}

/// Owns the rotation and decides what draws each frame.
pub struct Scheduler {
    slots: Vec<TaskSlot>,
    current: Option<Current>,
    cursor: Cursor,
    override_rx: Receiver<OverrideRequest>,
    override_tx: Sender<OverrideRequest>,
}

impl Scheduler {
    /// Build a scheduler over rotation slots, shuffling them into the
    /// boot-stable display order.
    pub fn new(mut slots: Vec<TaskSlot>) -> Self {
        let mut rng = StdRng::seed_from_u64(ROTATION_SEED);
        slots.shuffle(&mut rng);
        let (override_tx, override_rx) = unbounded();
        Scheduler {
            slots,
            current: None,
            cursor: Cursor::Restart,
            override_rx,
            override_tx,
        }
    }

    /// A new sender for the override queue.
    pub fn handle(&self) -> OverrideHandle {
        OverrideHandle {
            tx: self.override_tx.clone(),
        }
    }

    /// Rotation members in display order.
    pub fn tasks(&self) -> impl Iterator<Item = (TaskId, TaskInfo)> + '_ {
        self.slots.iter().filter_map(|s| Some((s.id()?, s.info())))
    }

    /// Identity of the task on the sign, if any.
    pub fn current_info(&self) -> Option<TaskInfo> {
        match &self.current {
            Some(Current::Rotation(idx)) => Some(self.slots[*idx].info()),
            Some(Current::Adhoc(slot)) => Some(slot.info()),
            None => None,
        }
    }

    /// True when nothing is on the sign.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Status line for the task on the sign, blank when idle.
    pub fn status_text(&self) -> StatusText {
        match &self.current {
            Some(Current::Rotation(idx)) => self.slots[*idx].status_text(),
            Some(Current::Adhoc(slot)) => slot.status_text(),
            None => StatusText::blank(),
        }
    }

    /// Advance the sign by one frame.
    ///
    /// Order within a step: queued overrides are applied first, then a task
    /// is activated if none is on screen, then the active task draws and the
    /// retirement rules run. Returns `false` when nothing drew, which only
    /// happens while every rotation task is declining.
    pub fn step(&mut self, canvas: &mut Canvas, delta: Duration) -> bool {
        self.apply_pending_overrides();

        if self.current.is_none() && !self.activate_next() {
            return false;
        }
        let retired = match &mut self.current {
            Some(Current::Rotation(idx)) => self.slots[*idx].drive(canvas, delta),
            Some(Current::Adhoc(slot)) => slot.drive(canvas, delta),
            None => return false,
        };
        if retired {
            self.finish_current();
        }
        true
    }

    /// Force a task onto the sign immediately.
    ///
    /// Same-thread entry point; remote callers go through [`OverrideHandle`].
    /// The incumbent is only torn down once the target has resolved, so a
    /// request naming an unknown task leaves the screen untouched.
    pub fn override_task(&mut self, request: OverrideRequest) {
        enum Resolved {
            Rotation(usize),
            Adhoc(Box<dyn ScreenTask + Send>),
        }

        let resolved = match request {
            OverrideRequest::ById(id) => {
                match self.slots.iter().position(|s| s.id() == Some(id)) {
                    Some(idx) => Resolved::Rotation(idx),
                    None => {
                        warn!(%id, "override target id not in rotation; ignoring");
                        return;
                    }
                }
            }
            OverrideRequest::ByName(name) => {
                match self.slots.iter().position(|s| s.info().name == name) {
                    Some(idx) => Resolved::Rotation(idx),
                    None => {
                        warn!(task = %name, "override target name not in rotation; ignoring");
                        return;
                    }
                }
            }
            OverrideRequest::Adhoc(task) => Resolved::Adhoc(task),
        };

        self.retire_current_forced();
        match resolved {
            Resolved::Rotation(idx) => {
                debug!(task = self.slots[idx].info().name, "override installed");
                self.slots[idx].begin_forced();
                self.current = Some(Current::Rotation(idx));
            }
            Resolved::Adhoc(task) => {
                let mut slot = TaskSlot::adhoc(task);
                debug!(task = slot.info().name, "ad-hoc override installed");
                slot.begin_forced();
                self.current = Some(Current::Adhoc(slot));
            }
        }
        self.cursor = Cursor::Restart;
    }

    fn apply_pending_overrides(&mut self) {
        while let Ok(request) = self.override_rx.try_recv() {
            self.override_task(request);
        }
    }

    /// One bounded pass over the rotation looking for a task that accepts.
    ///
    /// Starts at the cursor and offers each slot in order, wrapping once.
    /// When every task declines, the cursor is left where the scan started
    /// and the whole pass simply repeats next frame.
    fn activate_next(&mut self) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let len = self.slots.len();
        let start = match self.cursor {
            Cursor::Restart => 0,
            Cursor::At(idx) => idx % len,
        };
        for offset in 0..len {
            let idx = (start + offset) % len;
            if self.slots[idx].begin() {
                debug!(task = self.slots[idx].info().name, "activated");
                self.current = Some(Current::Rotation(idx));
                self.cursor = Cursor::At(idx);
                return true;
            }
            debug!(task = self.slots[idx].info().name, "declined activation");
        }
        false
    }

    fn finish_current(&mut self) {
        let len = self.slots.len();
        match self.current.take() {
            Some(Current::Rotation(idx)) => {
                debug!(
                    task = self.slots[idx].info().name,
                    elapsed = ?self.slots[idx].elapsed(),
                    "retired"
                );
                // A Restart cursor here means an override was on screen; the
                // rotation resumes from the top, not after the override target.
                if let Cursor::At(_) = self.cursor {
                    self.cursor = Cursor::At((idx + 1) % len);
                }
            }
            Some(Current::Adhoc(slot)) => {
                debug!(task = slot.info().name, "ad-hoc task retired");
            }
            None => {}
        }
    }

    fn retire_current_forced(&mut self) {
        match self.current.take() {
            Some(Current::Rotation(idx)) => self.slots[idx].interrupt(),
            Some(Current::Adhoc(mut slot)) => slot.interrupt(),
            None => {}
        }
    }
}

//! The task contract and per-activation lifecycle state.

use std::time::{Duration, Instant};

use crate::canvas::Canvas;
use crate::status::StatusText;

/// Identity and rotation flags for a screen task.
///
/// `name` is the stable machine identity: it keys frame cache directories and
/// resolves by-name overrides, so it must stay unique and unchanged across
/// releases even when `title` is reworded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskInfo {
    /// Stable machine name, unique within a registry.
    pub name: &'static str,
    /// Display title for the status card.
    pub title: &'static str,
    /// Attribution shown under the title.
    pub artist: &'static str,
    /// Kept out of the rotation entirely; still runnable via override.
    pub ignore: bool,
    /// Render through the frame cache instead of live computation.
    pub optimize: bool,
}

impl TaskInfo {
    pub const fn new(name: &'static str, title: &'static str, artist: &'static str) -> Self {
        TaskInfo {
            name,
            title,
            artist,
            ignore: false,
            optimize: false,
        }
    }

    /// Mark the task as excluded from rotation.
    pub const fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Mark the task for frame cache capture and replay.
    pub const fn optimized(mut self) -> Self {
        self.optimize = true;
        self
    }
}

/// Identifier assigned at registration, stable for the process lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u32);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Soft and hard run-time budgets for one activation.
///
/// The suggested budget is the earliest point a task that reports done is
/// actually retired; the max budget is the hard cap past which it is retired
/// no matter what it reports. Construction keeps `max >= suggested`, so a
/// task can never be force-stopped before its polite stopping window opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunBudget {
    suggested: Duration,
    max: Duration,
}

impl RunBudget {
    /// Build a budget, raising `max` to `suggested` if it was below it.
    pub fn new(suggested: Duration, max: Duration) -> Self {
        RunBudget {
            suggested,
            max: max.max(suggested),
        }
    }

    pub fn suggested(&self) -> Duration {
        self.suggested
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Default for RunBudget {
    /// 30 seconds suggested, 60 seconds max.
    fn default() -> Self {
        RunBudget::new(Duration::from_secs(30), Duration::from_secs(60))
    }
}

/// A self-contained unit of sign content.
///
/// Implementations are driven entirely by the scheduler. The calls arrive in
/// a fixed order per activation:
///
/// 1. [`prepare`](ScreenTask::prepare) once; returning `false` declines the
///    activation ("nothing to show right now") and the rotation moves on.
/// 2. [`draw_frame`](ScreenTask::draw_frame) once per frame while active.
///    Returning `true` signals a natural stopping point; the task stays on
///    screen until its suggested run time has also passed.
/// 3. [`teardown`](ScreenTask::teardown) once when the task leaves the
///    screen, with `forced` set when the hard cap or an override cut it off.
///
/// Tasks own no timing: elapsed time is accounted by the scheduler, and the
/// `delta` handed to `draw_frame` is the only clock a task should consume.
pub trait ScreenTask {
    /// Identity and rotation flags; constant for the task's lifetime.
    fn info(&self) -> TaskInfo;

    /// Run-time budget for one activation.
    fn budget(&self) -> RunBudget {
        RunBudget::default()
    }

    /// Accept or decline an activation, resetting internal state on accept.
    fn prepare(&mut self) -> bool {
        true
    }

    /// Render one frame into `canvas`, advanced by `delta` since the last
    /// frame. Return `true` at a natural stopping point.
    fn draw_frame(&mut self, canvas: &mut Canvas, delta: Duration) -> bool;

    /// Release per-activation resources. Idempotent.
    fn teardown(&mut self, forced: bool) {
        let _ = forced;
    }

    /// Text for the secondary character display while this task is active.
    fn status_text(&self) -> StatusText {
        let info = self.info();
        StatusText::title_card(info.title, info.artist)
    }
}

/// One schedulable entry: a task plus its per-activation accounting.
///
/// The slot is where the two run-time thresholds are enforced, bracketing
/// every `draw_frame` call. Comparisons are strictly greater-than, so a task
/// is never retired in the exact frame its budget is reached.
pub struct TaskSlot {
    id: Option<TaskId>,
    task: Box<dyn ScreenTask>,
    budget: RunBudget,
    elapsed: Duration,
    started: Option<Instant>,
}

impl TaskSlot {
    pub(crate) fn new(id: TaskId, task: Box<dyn ScreenTask>) -> Self {
        let budget = task.budget();
        TaskSlot {
            id: Some(id),
            task,
            budget,
            elapsed: Duration::ZERO,
            started: None,
        }
    }

    /// Slot for a task outside the rotation, installed by an override.
    pub(crate) fn adhoc(task: Box<dyn ScreenTask>) -> Self {
        let budget = task.budget();
        TaskSlot {
            id: None,
            task,
            budget,
            elapsed: Duration::ZERO,
            started: None,
        }
    }

    /// Registration id; `None` for ad-hoc override tasks.
    pub fn id(&self) -> Option<TaskId> {
        self.id
    }

    pub fn info(&self) -> TaskInfo {
        self.task.info()
    }

    pub fn budget(&self) -> RunBudget {
        self.budget
    }

    /// Accumulated active time in the current activation.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Wall-clock start of the current activation, if active.
    pub fn started(&self) -> Option<Instant> {
        self.started
    }

    pub fn status_text(&self) -> StatusText {
        self.task.status_text()
    }

    /// Offer an activation. Returns `false` if the task declined.
    ///
    /// The budget is re-read after `prepare`, because a task may pick its
    /// budget based on what it decided to show.
    pub(crate) fn begin(&mut self) -> bool {
        if !self.task.prepare() {
            return false;
        }
        self.start_activation();
        true
    }

    /// Activate unconditionally; override handoffs do not honor declines.
    pub(crate) fn begin_forced(&mut self) {
        let _ = self.task.prepare();
        self.start_activation();
    }

    fn start_activation(&mut self) {
        self.budget = self.task.budget();
        self.elapsed = Duration::ZERO;
        self.started = Some(Instant::now());
    }

    /// Render one frame and apply the retirement rules.
    ///
    /// Returns `true` when the task retired this frame (its final frame is
    /// still on the canvas).
    pub(crate) fn drive(&mut self, canvas: &mut Canvas, delta: Duration) -> bool {
        self.elapsed += delta;
        let done = self.task.draw_frame(canvas, delta);
        if self.elapsed > self.budget.max() {
            self.task.teardown(true);
            self.started = None;
            return true;
        }
        if done && self.elapsed > self.budget.suggested() {
            self.task.teardown(false);
            self.started = None;
            return true;
        }
        false
    }

    /// Forced teardown for override handoffs.
    pub(crate) fn interrupt(&mut self) {
        self.task.teardown(true);
        self.started = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted task recording its lifecycle for assertions.
    pub(crate) struct Probe {
        pub info: TaskInfo,
        pub budget: RunBudget,
        pub accept: bool,
        pub done_after: u32,
        pub log: Arc<Mutex<Vec<String>>>,
        draws: u32,
    }

    impl Probe {
        pub fn new(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
            Probe {
                info: TaskInfo::new(name, name, "tests"),
                budget: RunBudget::new(Duration::from_secs(1), Duration::from_secs(2)),
                accept: true,
                done_after: 1,
                log,
                draws: 0,
            }
        }
    }

    impl ScreenTask for Probe {
        fn info(&self) -> TaskInfo {
            self.info
        }

        fn budget(&self) -> RunBudget {
            self.budget
        }

        fn prepare(&mut self) -> bool {
            self.log.lock().unwrap().push(format!("prepare {}", self.info.name));
            self.draws = 0;
            self.accept
        }

        fn draw_frame(&mut self, _canvas: &mut Canvas, _delta: Duration) -> bool {
            self.draws += 1;
            self.log.lock().unwrap().push(format!("draw {}", self.info.name));
            self.draws >= self.done_after
        }

        fn teardown(&mut self, forced: bool) {
            self.log
                .lock()
                .unwrap()
                .push(format!("teardown {} forced={forced}", self.info.name));
        }
    }

    fn slot_with(probe: Probe) -> TaskSlot {
        TaskSlot::new(TaskId(0), Box::new(probe))
    }

    #[test]
    fn budget_clamps_max_up_to_suggested() {
        let b = RunBudget::new(Duration::from_secs(60), Duration::from_secs(10));
        assert_eq!(b.suggested(), Duration::from_secs(60));
        assert_eq!(b.max(), Duration::from_secs(60));

        let b = RunBudget::new(Duration::from_secs(10), Duration::from_secs(60));
        assert_eq!(b.max(), Duration::from_secs(60));
    }

    #[test]
    fn default_budget_is_thirty_sixty() {
        let b = RunBudget::default();
        assert_eq!(b.suggested(), Duration::from_secs(30));
        assert_eq!(b.max(), Duration::from_secs(60));
    }

    #[test]
    fn early_done_waits_for_suggested_time() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let probe = Probe::new("p", log.clone());
        let mut slot = slot_with(probe);
        let mut canvas = Canvas::sign();
        let half = Duration::from_millis(500);

        assert!(slot.begin());
        // Done from frame one, but 0.5s and 1.0s are not past the 1s budget.
        assert!(!slot.drive(&mut canvas, half));
        assert!(!slot.drive(&mut canvas, half));
        // 1.5s > 1s and done, so this frame retires it politely.
        assert!(slot.drive(&mut canvas, half));
        assert_eq!(log.lock().unwrap().last().unwrap(), "teardown p forced=false");
    }

    #[test]
    fn never_done_hits_the_hard_cap() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut probe = Probe::new("p", log.clone());
        probe.done_after = u32::MAX;
        let mut slot = slot_with(probe);
        let mut canvas = Canvas::sign();
        let half = Duration::from_millis(500);

        assert!(slot.begin());
        for _ in 0..4 {
            // Up to exactly 2.0s: not strictly past the cap yet.
            assert!(!slot.drive(&mut canvas, half));
        }
        assert!(slot.drive(&mut canvas, half));
        assert_eq!(log.lock().unwrap().last().unwrap(), "teardown p forced=true");
    }

    #[test]
    fn hard_cap_wins_even_when_done() {
        // A task that is done but whose suggested window never opened would
        // sit forever; the cap still removes it.
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut probe = Probe::new("p", log.clone());
        probe.budget = RunBudget::new(Duration::from_secs(10), Duration::from_secs(10));
        probe.done_after = 1;
        let mut slot = slot_with(probe);
        let mut canvas = Canvas::sign();

        assert!(slot.begin());
        assert!(!slot.drive(&mut canvas, Duration::from_secs(9)));
        assert!(slot.drive(&mut canvas, Duration::from_secs(2)));
        assert_eq!(log.lock().unwrap().last().unwrap(), "teardown p forced=true");
    }

    #[test]
    fn decline_skips_teardown() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut probe = Probe::new("p", log.clone());
        probe.accept = false;
        let mut slot = slot_with(probe);

        assert!(!slot.begin());
        assert_eq!(*log.lock().unwrap(), vec!["prepare p".to_string()]);
    }

    #[test]
    fn elapsed_resets_between_activations() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let probe = Probe::new("p", log.clone());
        let mut slot = slot_with(probe);
        let mut canvas = Canvas::sign();

        assert!(slot.begin());
        while !slot.drive(&mut canvas, Duration::from_millis(600)) {}
        let first = slot.elapsed();
        assert!(first > Duration::from_secs(1));

        assert!(slot.begin());
        assert_eq!(slot.elapsed(), Duration::ZERO);
        slot.drive(&mut canvas, Duration::from_millis(600));
        assert_eq!(slot.elapsed(), Duration::from_millis(600));
    }
}

use std::sync::{Arc, Mutex};
use std::time::Duration;

use signwheel::{
    Canvas, OverrideRequest, RunBudget, Scheduler, ScreenTask, StatusText, TaskInfo, TaskRegistry,
};

type Log = Arc<Mutex<Vec<String>>>;

/// Minimal rotation member: done from its first frame, 1s/2s budgets.
struct Beat {
    name: &'static str,
    accept: bool,
    finishes: bool,
    log: Log,
}

impl Beat {
    fn new(name: &'static str, log: &Log) -> Self {
        Beat {
            name,
            accept: true,
            finishes: true,
            log: log.clone(),
        }
    }
}

impl ScreenTask for Beat {
    fn info(&self) -> TaskInfo {
        TaskInfo::new(self.name, self.name, "tests")
    }

    fn budget(&self) -> RunBudget {
        RunBudget::new(Duration::from_secs(1), Duration::from_secs(2))
    }

    fn prepare(&mut self) -> bool {
        self.log.lock().unwrap().push(format!("up {}", self.name));
        self.accept
    }

    fn draw_frame(&mut self, _canvas: &mut Canvas, _delta: Duration) -> bool {
        self.log.lock().unwrap().push(format!("draw {}", self.name));
        self.finishes
    }

    fn teardown(&mut self, forced: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("down {} forced={forced}", self.name));
    }
}

fn scheduler_of(beats: Vec<Beat>) -> Scheduler {
    let mut reg = TaskRegistry::new();
    for beat in beats {
        reg.register(Box::new(beat)).unwrap();
    }
    Scheduler::new(reg.into_slots(None))
}

fn display_order(sched: &Scheduler) -> Vec<&'static str> {
    sched.tasks().map(|(_, info)| info.name).collect()
}

const STEP: Duration = Duration::from_millis(500);

#[test]
fn full_rotation_cycles_every_task() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let beats = vec![Beat::new("a", &log), Beat::new("b", &log), Beat::new("c", &log)];
    let mut sched = scheduler_of(beats);
    let order = display_order(&sched);
    let mut canvas = Canvas::sign();

    // A done-from-frame-one task still holds the screen until its suggested
    // second has strictly passed: frames at 0.5s and 1.0s stay, 1.5s retires.
    let mut seen = Vec::new();
    for _ in 0..10 {
        assert!(sched.step(&mut canvas, STEP));
        seen.push(sched.current_info().map(|info| info.name));
    }
    let expected = vec![
        Some(order[0]),
        Some(order[0]),
        None,
        Some(order[1]),
        Some(order[1]),
        None,
        Some(order[2]),
        Some(order[2]),
        None,
        Some(order[0]),
    ];
    assert_eq!(seen, expected);

    let events = log.lock().unwrap();
    for name in &order {
        assert_eq!(
            events.iter().filter(|e| **e == format!("draw {name}")).count(),
            if *name == order[0] { 4 } else { 3 }
        );
        assert!(events.contains(&format!("down {name} forced=false")));
    }
}

#[test]
fn handover_tears_down_before_preparing_the_next() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut sched = scheduler_of(vec![Beat::new("a", &log), Beat::new("b", &log)]);
    let order = display_order(&sched);
    let mut canvas = Canvas::sign();

    for _ in 0..4 {
        sched.step(&mut canvas, STEP);
    }

    let events = log.lock().unwrap();
    let down = events
        .iter()
        .position(|e| *e == format!("down {} forced=false", order[0]))
        .unwrap();
    let up = events
        .iter()
        .position(|e| *e == format!("up {}", order[1]))
        .unwrap();
    assert!(down < up);
}

#[test]
fn stuck_task_is_cut_at_the_hard_cap() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut stuck = Beat::new("stuck", &log);
    stuck.finishes = false;
    let mut sched = scheduler_of(vec![stuck]);
    let mut canvas = Canvas::sign();

    // 0.5s steps against a 2s cap: frames at 0.5..2.0 stay, 2.5 is cut.
    let mut steps = 0;
    while sched.current_info().is_some() || steps == 0 {
        sched.step(&mut canvas, STEP);
        steps += 1;
    }
    assert_eq!(steps, 5);
    assert_eq!(
        log.lock().unwrap().last().unwrap(),
        "down stuck forced=true"
    );
}

#[test]
fn override_restarts_the_rotation_when_it_retires() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let beats = vec![Beat::new("a", &log), Beat::new("b", &log), Beat::new("c", &log)];
    let mut sched = scheduler_of(beats);
    let order = display_order(&sched);
    let mut canvas = Canvas::sign();

    // Run to the middle of the rotation.
    for _ in 0..4 {
        sched.step(&mut canvas, STEP);
    }
    assert_eq!(sched.current_info().unwrap().name, order[1]);

    sched.handle().send(OverrideRequest::ByName(order[2].to_string()));
    sched.step(&mut canvas, STEP);
    assert_eq!(sched.current_info().unwrap().name, order[2]);
    assert!(log
        .lock()
        .unwrap()
        .contains(&format!("down {} forced=true", order[1])));

    // Let the override target retire on its own clock, then the wheel starts
    // over from the first slot rather than resuming after the target.
    sched.step(&mut canvas, STEP);
    sched.step(&mut canvas, STEP);
    assert!(sched.is_idle());
    sched.step(&mut canvas, STEP);
    assert_eq!(sched.current_info().unwrap().name, order[0]);
}

#[test]
fn override_handle_works_across_threads() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut sched = scheduler_of(vec![Beat::new("a", &log), Beat::new("b", &log)]);
    let order = display_order(&sched);
    let mut canvas = Canvas::sign();
    sched.step(&mut canvas, STEP);

    let handle = sched.handle();
    let target = order[1].to_string();
    std::thread::spawn(move || {
        handle.send(OverrideRequest::ByName(target));
    })
    .join()
    .unwrap();

    sched.step(&mut canvas, STEP);
    assert_eq!(sched.current_info().unwrap().name, order[1]);
}

#[test]
fn ad_hoc_override_visits_and_leaves_no_trace() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut sched = scheduler_of(vec![Beat::new("a", &log), Beat::new("b", &log)]);
    let order = display_order(&sched);
    let mut canvas = Canvas::sign();
    sched.step(&mut canvas, STEP);

    let visitor = Beat::new("visitor", &log);
    sched.handle().send(OverrideRequest::Adhoc(Box::new(visitor)));
    sched.step(&mut canvas, STEP);
    assert_eq!(sched.current_info().unwrap().name, "visitor");
    assert!(sched.tasks().all(|(_, info)| info.name != "visitor"));

    sched.step(&mut canvas, STEP);
    sched.step(&mut canvas, STEP);
    assert!(sched.is_idle());
    sched.step(&mut canvas, STEP);
    assert_eq!(sched.current_info().unwrap().name, order[0]);
}

#[test]
fn all_declining_rotation_idles_with_a_blank_status() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut a = Beat::new("a", &log);
    let mut b = Beat::new("b", &log);
    a.accept = false;
    b.accept = false;
    let mut sched = scheduler_of(vec![a, b]);
    let mut canvas = Canvas::sign();

    assert!(!sched.step(&mut canvas, STEP));
    assert!(sched.is_idle());
    assert_eq!(sched.status_text(), StatusText::blank());

    // Each frame is one bounded pass over the rotation, not a busy loop.
    assert!(!sched.step(&mut canvas, STEP));
    let ups = log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.starts_with("up "))
        .count();
    assert_eq!(ups, 4);
}

//! Task registration: identity assignment, rotation filtering, cache wrapping.

use tracing::debug;

use crate::cache::{CachedTask, FrameCache};
use crate::error::{SignwheelError, SignwheelResult};
use crate::task::{ScreenTask, TaskId, TaskInfo, TaskSlot};

/// Collects task instances before the scheduler is built.
///
/// Registration order is preserved; it is the identity order for [`TaskId`]
/// assignment, so rebuilding the same task set yields the same ids.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Vec<Box<dyn ScreenTask>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        TaskRegistry::default()
    }

    /// Add a task. Names must be unique: they key frame cache directories
    /// and resolve by-name overrides.
    pub fn register(&mut self, task: Box<dyn ScreenTask>) -> SignwheelResult<()> {
        let name = task.info().name;
        if self.tasks.iter().any(|t| t.info().name == name) {
            return Err(SignwheelError::validation(format!(
                "duplicate task name '{name}'"
            )));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Identity of every registered task, in registration order.
    pub fn infos(&self) -> impl Iterator<Item = TaskInfo> + '_ {
        self.tasks.iter().map(|t| t.info())
    }

    /// Surrender the raw task instances (used by the capture tooling).
    pub fn into_tasks(self) -> Vec<Box<dyn ScreenTask>> {
        self.tasks
    }

    /// Build rotation slots: ignore-flagged tasks are dropped, ids are
    /// assigned in registration order, and optimize-flagged tasks are
    /// wrapped in the frame cache when one is configured.
    pub fn into_slots(self, cache: Option<&FrameCache>) -> Vec<TaskSlot> {
        let mut slots = Vec::new();
        for task in self.tasks {
            let info = task.info();
            if info.ignore {
                debug!(task = info.name, "excluded from rotation");
                continue;
            }
            let id = TaskId(slots.len() as u32);
            let task = match cache {
                Some(cache) if info.optimize => {
                    Box::new(CachedTask::new(task, cache.clone())) as Box<dyn ScreenTask>
                }
                _ => task,
            };
            slots.push(TaskSlot::new(id, task));
        }
        slots
    }
}

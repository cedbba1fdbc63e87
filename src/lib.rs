//! Signwheel drives an LED matrix sign through a rotating set of screen tasks.
//!
//! A [`Scheduler`] owns the rotation: each task draws frames onto a [`Canvas`]
//! until its [`RunBudget`] runs out, then the next task takes over. Overrides
//! jump the rotation to a requested task and restart it from the top when that
//! task retires. Expensive tasks can be captured once into a [`FrameCache`]
//! and replayed from numbered PNG frames. The [`RunLoop`] paces everything
//! against wall-clock time and forwards pixels to a [`Screen`].
#![forbid(unsafe_code)]

pub mod cache;
pub mod canvas;
pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod screen;
pub mod status;
pub mod task;
pub mod tasks;

pub use cache::{CachePolicy, CachedTask, CaptureSummary, FrameCache};
pub use canvas::{Canvas, SIGN_HEIGHT, SIGN_WIDTH};
pub use color::{Rgb, Rgba};
pub use config::{CacheConfig, SignConfig};
pub use error::{SignwheelError, SignwheelResult};
pub use registry::TaskRegistry;
pub use runtime::RunLoop;
pub use scheduler::{OverrideHandle, OverrideRequest, Scheduler};
pub use screen::{HeadlessScreen, Screen, TerminalScreen};
pub use status::StatusText;
pub use task::{RunBudget, ScreenTask, TaskId, TaskInfo};

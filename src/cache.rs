//! Frame capture and replay for expensive tasks.
//!
//! An optimize-flagged task never renders live in rotation. Instead its
//! first activation runs a capture pass: the task is driven with a fixed
//! synthetic delta and every frame is written as a numbered PNG under a
//! directory keyed by the task's name. Later activations replay the files in
//! order. Captures land in a `<name>.part` staging directory and are renamed
//! into place only once complete, so a crash mid-capture can never leave a
//! sequence that looks finished; the stored frame count is always exactly
//! the number of files present.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::{debug, warn};

use crate::canvas::{Canvas, SIGN_HEIGHT, SIGN_WIDTH};
use crate::error::{SignwheelError, SignwheelResult};
use crate::status::StatusText;
use crate::task::{RunBudget, ScreenTask, TaskInfo};

/// Capture rate when recording a task, frames per second.
pub const DEFAULT_CAPTURE_FPS: u32 = 24;

/// What to do when frame cache storage fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Fall back to live rendering for the affected activation.
    #[default]
    Fallback,
    /// Refuse the activation and surface the error.
    Propagate,
}

/// Result of one capture pass.
#[derive(Clone, Copy, Debug)]
pub struct CaptureSummary {
    /// Frames written and committed.
    pub frames: usize,
    /// Simulated time covered by the recording.
    pub elapsed: Duration,
}

/// On-disk store of pre-rendered frame sequences.
#[derive(Clone, Debug)]
pub struct FrameCache {
    root: PathBuf,
    policy: CachePolicy,
    frame_width: u32,
    frame_height: u32,
    capture_delta: Duration,
}

impl FrameCache {
    /// Cache rooted at `root`, recording 32x32 frames at the default rate.
    pub fn new(root: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        FrameCache {
            root: root.into(),
            policy,
            frame_width: SIGN_WIDTH,
            frame_height: SIGN_HEIGHT,
            capture_delta: delta_for_fps(DEFAULT_CAPTURE_FPS),
        }
    }

    /// Record frames at `width` x `height` instead of the sign default.
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self
    }

    /// Record with a synthetic delta of `1 / fps` seconds per frame.
    pub fn with_capture_fps(mut self, fps: u32) -> Self {
        self.capture_delta = delta_for_fps(fps);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Number of committed frames for `name`; `None` without a complete
    /// capture. Derived from the files actually present, never recorded
    /// separately.
    pub fn frame_count(&self, name: &str) -> Option<usize> {
        let entries = fs::read_dir(self.frames_dir(name)).ok()?;
        let count = entries
            .filter_map(|e| e.ok())
            .filter(|e| is_frame_file(&e.file_name()))
            .count();
        (count > 0).then_some(count)
    }

    /// True when a committed capture exists for `name`.
    pub fn is_populated(&self, name: &str) -> bool {
        self.frame_count(name).is_some()
    }

    /// Drop any capture (complete or staged) for `name`.
    pub fn invalidate(&self, name: &str) -> SignwheelResult<()> {
        remove_dir_if_present(&self.staging_dir(name))?;
        remove_dir_if_present(&self.frames_dir(name))
    }

    /// Drop every capture under the cache root.
    pub fn invalidate_all(&self) -> SignwheelResult<()> {
        remove_dir_if_present(&self.root)
    }

    /// Run a full capture pass for `task` and commit it.
    ///
    /// The task goes through its normal lifecycle against a scratch canvas:
    /// `prepare`, then `draw_frame` with the fixed capture delta until it
    /// reports done or its suggested run time is exceeded, then `teardown`.
    /// Any committed capture for the task is replaced.
    #[tracing::instrument(skip(self, task), fields(task = task.info().name))]
    pub fn capture(&self, task: &mut dyn ScreenTask) -> SignwheelResult<CaptureSummary> {
        let name = task.info().name;
        let staging = self.staging_dir(name);
        remove_dir_if_present(&staging)?;
        fs::create_dir_all(&staging)
            .map_err(|e| SignwheelError::cache(format!("create '{}': {e}", staging.display())))?;

        let summary = match self.record_frames(task, &staging) {
            Ok(summary) => summary,
            Err(err) => {
                let _ = fs::remove_dir_all(&staging);
                return Err(err);
            }
        };

        let dest = self.frames_dir(name);
        remove_dir_if_present(&dest)?;
        fs::rename(&staging, &dest)
            .map_err(|e| SignwheelError::cache(format!("commit '{}': {e}", dest.display())))?;
        debug!(frames = summary.frames, "capture committed");
        Ok(summary)
    }

    /// Load committed frame `index` for `name` into `canvas`.
    pub fn load_frame(&self, name: &str, index: usize, canvas: &mut Canvas) -> SignwheelResult<()> {
        let path = self.frames_dir(name).join(frame_file(index));
        let img = image::open(&path)
            .map_err(|e| SignwheelError::cache(format!("read '{}': {e}", path.display())))?;
        let rgb = img.into_rgb8();
        if (rgb.width(), rgb.height()) != (canvas.width(), canvas.height()) {
            return Err(SignwheelError::cache(format!(
                "frame '{}' is {}x{}, expected {}x{}",
                path.display(),
                rgb.width(),
                rgb.height(),
                canvas.width(),
                canvas.height()
            )));
        }
        canvas.copy_from_rgb_bytes(rgb.as_raw())
    }

    fn record_frames(&self, task: &mut dyn ScreenTask, staging: &Path) -> SignwheelResult<CaptureSummary> {
        if !task.prepare() {
            return Err(SignwheelError::cache(format!(
                "task '{}' declined the capture activation",
                task.info().name
            )));
        }
        let budget = task.budget();
        let mut canvas = Canvas::new(self.frame_width, self.frame_height);
        let mut elapsed = Duration::ZERO;
        let mut frames = 0usize;
        let mut done = false;
        while !done && elapsed <= budget.suggested() {
            canvas.clear();
            elapsed += self.capture_delta;
            done = task.draw_frame(&mut canvas, self.capture_delta);
            if let Err(err) = write_frame(&staging.join(frame_file(frames)), &canvas) {
                task.teardown(true);
                return Err(err);
            }
            frames += 1;
        }
        task.teardown(!done);
        Ok(CaptureSummary { frames, elapsed })
    }

    fn frames_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn staging_dir(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.part"))
    }
}

fn delta_for_fps(fps: u32) -> Duration {
    Duration::from_secs(1) / fps.max(1)
}

fn frame_file(index: usize) -> String {
    format!("frame_{index:04}.png")
}

fn is_frame_file(name: &std::ffi::OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    name.strip_prefix("frame_")
        .and_then(|rest| rest.strip_suffix(".png"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Encode fully in memory, then write and sync, so a torn write can only
/// ever produce a missing or unreadable file inside a staging directory.
fn write_frame(path: &Path, canvas: &Canvas) -> SignwheelResult<()> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            canvas.as_rgb_bytes(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| SignwheelError::cache(format!("encode '{}': {e}", path.display())))?;
    let mut file = fs::File::create(path)
        .map_err(|e| SignwheelError::cache(format!("create '{}': {e}", path.display())))?;
    file.write_all(&bytes)
        .map_err(|e| SignwheelError::cache(format!("write '{}': {e}", path.display())))?;
    file.sync_all()
        .map_err(|e| SignwheelError::cache(format!("sync '{}': {e}", path.display())))?;
    Ok(())
}

fn remove_dir_if_present(path: &Path) -> SignwheelResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SignwheelError::cache(format!(
            "remove '{}': {e}",
            path.display()
        ))),
    }
}

enum Mode {
    Live,
    Replay { cursor: usize, total: usize },
}

/// Decorator that routes an optimize-flagged task through the cache.
///
/// On activation it captures if needed, then replays. During replay the
/// reported budget collapses to a zero suggested time, so the scheduler
/// retires the task exactly when the recording runs out; the inner task's
/// hard cap still applies. The inner `draw_frame` is never called while a
/// replay is in progress.
pub struct CachedTask {
    inner: Box<dyn ScreenTask>,
    cache: FrameCache,
    mode: Mode,
}

impl CachedTask {
    pub fn new(inner: Box<dyn ScreenTask>, cache: FrameCache) -> Self {
        CachedTask {
            inner,
            cache,
            mode: Mode::Live,
        }
    }

    fn fall_back(&mut self) -> bool {
        match self.cache.policy() {
            CachePolicy::Fallback => {
                self.mode = Mode::Live;
                self.inner.prepare()
            }
            CachePolicy::Propagate => false,
        }
    }
}

impl ScreenTask for CachedTask {
    fn info(&self) -> TaskInfo {
        self.inner.info()
    }

    fn budget(&self) -> RunBudget {
        match self.mode {
            Mode::Replay { .. } => RunBudget::new(Duration::ZERO, self.inner.budget().max()),
            Mode::Live => self.inner.budget(),
        }
    }

    fn prepare(&mut self) -> bool {
        let name = self.inner.info().name;
        if !self.cache.is_populated(name) {
            if let Err(err) = self.cache.capture(self.inner.as_mut()) {
                warn!(task = name, error = %err, "frame capture failed");
                return self.fall_back();
            }
        }
        match self.cache.frame_count(name) {
            Some(total) => {
                self.mode = Mode::Replay { cursor: 0, total };
                true
            }
            None => {
                warn!(task = name, "capture committed no readable frames");
                self.fall_back()
            }
        }
    }

    fn draw_frame(&mut self, canvas: &mut Canvas, delta: Duration) -> bool {
        let (cursor, total) = match &self.mode {
            Mode::Live => return self.inner.draw_frame(canvas, delta),
            Mode::Replay { cursor, total } => (*cursor, *total),
        };
        let name = self.inner.info().name;
        match self.cache.load_frame(name, cursor, canvas) {
            Ok(()) => {
                self.mode = Mode::Replay {
                    cursor: cursor + 1,
                    total,
                };
                cursor + 1 >= total
            }
            Err(err) => {
                warn!(task = name, frame = cursor, error = %err, "replay read failed");
                match self.cache.policy() {
                    CachePolicy::Fallback => {
                        if self.inner.prepare() {
                            self.mode = Mode::Live;
                            self.inner.draw_frame(canvas, delta)
                        } else {
                            true
                        }
                    }
                    CachePolicy::Propagate => true,
                }
            }
        }
    }

    fn teardown(&mut self, forced: bool) {
        match self.mode {
            Mode::Live => self.inner.teardown(forced),
            // The inner task was never prepared for a replay activation.
            Mode::Replay { .. } => {}
        }
    }

    fn status_text(&self) -> StatusText {
        self.inner.status_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_files_are_zero_padded() {
        assert_eq!(frame_file(0), "frame_0000.png");
        assert_eq!(frame_file(123), "frame_0123.png");
        assert_eq!(frame_file(65536), "frame_65536.png");
    }

    #[test]
    fn frame_file_filter_rejects_strays() {
        use std::ffi::OsStr;
        assert!(is_frame_file(OsStr::new("frame_0000.png")));
        assert!(is_frame_file(OsStr::new("frame_65536.png")));
        assert!(!is_frame_file(OsStr::new("frame_.png")));
        assert!(!is_frame_file(OsStr::new("frame_12.jpg")));
        assert!(!is_frame_file(OsStr::new("thumbs.db")));
        assert!(!is_frame_file(OsStr::new("frame_12a.png")));
    }

    #[test]
    fn capture_delta_follows_fps() {
        let cache = FrameCache::new("unused", CachePolicy::Fallback).with_capture_fps(10);
        assert_eq!(cache.capture_delta, Duration::from_millis(100));
        // A zero rate clamps instead of dividing by zero.
        let cache = FrameCache::new("unused", CachePolicy::Fallback).with_capture_fps(0);
        assert_eq!(cache.capture_delta, Duration::from_secs(1));
    }

    #[test]
    fn replay_budget_has_no_polite_window() {
        let b = RunBudget::new(Duration::ZERO, Duration::from_secs(60));
        assert_eq!(b.suggested(), Duration::ZERO);
        assert_eq!(b.max(), Duration::from_secs(60));
    }
}

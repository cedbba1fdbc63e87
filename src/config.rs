//! Sign configuration, loaded from JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::{CachePolicy, FrameCache};
use crate::canvas::{SIGN_HEIGHT, SIGN_WIDTH};
use crate::error::{SignwheelError, SignwheelResult};

/// Top-level configuration.
///
/// Every field defaults, so an empty JSON object (or no file at all) is a
/// complete configuration describing the reference 32x32 sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    /// Pixel width of the matrix.
    pub width: u32,
    /// Pixel height of the matrix.
    pub height: u32,
    /// Target render rate, frames per second.
    pub fps: u32,
    /// Frame cache settings.
    pub cache: CacheConfig,
}

impl Default for SignConfig {
    fn default() -> Self {
        SignConfig {
            width: SIGN_WIDTH,
            height: SIGN_HEIGHT,
            fps: 24,
            cache: CacheConfig::default(),
        }
    }
}

/// Frame cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Master switch for capture/replay of optimize-flagged tasks. When off
    /// they render live like everything else.
    pub enabled: bool,
    /// Directory holding captured frame sequences.
    pub root: PathBuf,
    /// What to do when cache storage fails.
    pub policy: CachePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            root: PathBuf::from("cache/frames"),
            policy: CachePolicy::default(),
        }
    }
}

impl SignConfig {
    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> SignwheelResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            SignwheelError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        let config: SignConfig = serde_json::from_slice(&bytes).map_err(|e| {
            SignwheelError::validation(format!("parse config '{}': {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the render loop cannot run with.
    pub fn validate(&self) -> SignwheelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SignwheelError::validation(format!(
                "matrix size {}x{} must be nonzero in both dimensions",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(SignwheelError::validation("fps must be at least 1"));
        }
        Ok(())
    }

    /// Frame cache described by these settings, `None` when disabled.
    pub fn frame_cache(&self) -> Option<FrameCache> {
        self.cache.enabled.then(|| {
            FrameCache::new(&self.cache.root, self.cache.policy)
                .with_frame_size(self.width, self.height)
                .with_capture_fps(self.fps)
        })
    }
}

//! Screen-template fallback for controls without a stable scripting address.
//!
//! Toolbar buttons and a few transient dialogs can only be reached by finding
//! their picture on screen. Missing a picture is not fatal: the click is
//! skipped, logged, and the flow moves on.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Pixel position on screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The screen could not be captured.
    #[error("screen capture failed: {0}")]
    Capture(String),

    /// The template could not be loaded.
    #[error("template unreadable: {0}")]
    Template(String),

    /// Synthetic mouse input was refused.
    #[error("input failed: {0}")]
    Input(String),
}

/// Screen capture, template matching and mouse input.
pub trait ScreenMatcher {
    /// Best match of `template` at or above `confidence` (0.0–1.0).
    fn find(&self, template: &Path, confidence: f32) -> Result<Option<ScreenPoint>, MatchError>;

    fn click(&self, at: ScreenPoint) -> Result<(), MatchError>;

    fn double_click(&self, at: ScreenPoint) -> Result<(), MatchError>;
}

/// Default polling parameters for [`ImageLocator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    pub confidence: f32,
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            confidence: 0.8,
            timeout_ms: 2_000,
            poll_interval_ms: 500,
        }
    }
}

impl LocatorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub struct ImageLocator<'a, M: ScreenMatcher + ?Sized> {
    matcher: &'a M,
    settings: LocatorSettings,
}

impl<'a, M: ScreenMatcher + ?Sized> ImageLocator<'a, M> {
    pub fn new(matcher: &'a M, settings: LocatorSettings) -> Self {
        Self { matcher, settings }
    }

    /// Probe for `template` until `timeout` elapses.
    ///
    /// Probes are independent; a failed probe counts as a miss. A zero timeout
    /// returns `None` without probing.
    pub fn locate(
        &self,
        template: &Path,
        confidence: f32,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Option<ScreenPoint> {
        let started = Instant::now();
        while started.elapsed() < timeout {
            match self.matcher.find(template, confidence) {
                Ok(Some(point)) => return Some(point),
                Ok(None) => {}
                Err(e) => debug!(template = %template.display(), error = %e, "probe failed"),
            }
            thread::sleep(poll_interval);
        }
        None
    }

    /// [`ImageLocator::locate`] with the configured defaults.
    pub fn find(&self, template: &Path) -> Option<ScreenPoint> {
        self.locate(
            template,
            self.settings.confidence,
            self.settings.timeout(),
            self.settings.poll_interval(),
        )
    }

    /// Click `template` if it shows up. Returns whether a click was sent.
    pub fn click(&self, template: &Path) -> bool {
        self.act(template, "click", |point| self.matcher.click(point))
    }

    /// Double-click `template` if it shows up. Returns whether a click was sent.
    pub fn double_click(&self, template: &Path) -> bool {
        self.act(template, "double-click", |point| self.matcher.double_click(point))
    }

    fn act(
        &self,
        template: &Path,
        what: &str,
        action: impl FnOnce(ScreenPoint) -> Result<(), MatchError>,
    ) -> bool {
        let Some(point) = self.find(template) else {
            warn!(template = %template.display(), "{what} skipped: template not on screen");
            return false;
        };
        match action(point) {
            Ok(()) => {
                debug!(template = %template.display(), x = point.x, y = point.y, "{what}");
                true
            }
            Err(e) => {
                warn!(template = %template.display(), error = %e, "{what} failed");
                false
            }
        }
    }
}

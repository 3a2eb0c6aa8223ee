//! Capture/restore state machine driven by level lifecycle events
//!
//! The coordinator never caches a pose: every restore reads the store and
//! every capture writes it. The only state it keeps is the identity of the
//! level that is currently open, which the manual commands act on, and of
//! the level that just closed.

use camerapos_core::{CameraPose, LevelKey, PoseStore, ViewportAccessor, ViewportError};
use tracing::{debug, info, warn};

use crate::config::BehaviorConfig;
use crate::events::LevelEvent;

/// Why a handler did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No editor viewport to read from or write to
    NoActiveViewport,
    /// The event had no level path, or no level is open
    NoLevel,
    /// The hook is turned off in the settings
    Disabled,
}

/// Result of a lifecycle event or command
///
/// None of these is an error for the host: level open/save/close always
/// proceeds regardless of what happened here.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The saved pose was applied to the viewport
    Restored(CameraPose),
    /// The live pose was written to the store
    Captured(CameraPose),
    /// Nothing is saved for this level; the camera was left alone
    NoSavedPose,
    Skipped(SkipReason),
    /// The store could not be written
    Failed(String),
}

/// Which level is open, carried between coordinators by hosts that
/// rebuild one per call
///
/// A host may send `Saved` after `Closing` for the same level. The closed
/// key is kept until the next open so that late save does not make the
/// closed level current again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenLevel {
    current: Option<LevelKey>,
    closed: Option<LevelKey>,
}

impl OpenLevel {
    pub fn current(&self) -> Option<&LevelKey> {
        self.current.as_ref()
    }

    pub fn closed(&self) -> Option<&LevelKey> {
        self.closed.as_ref()
    }

    fn open(&mut self, key: Option<LevelKey>) {
        self.current = key;
        self.closed = None;
    }

    fn saved(&mut self, key: &LevelKey) {
        if self.closed.as_ref() != Some(key) {
            self.current = Some(key.clone());
        }
    }

    fn close(&mut self, key: &LevelKey) {
        if self.current.as_ref() == Some(key) {
            self.current = None;
        }
        self.closed = Some(key.clone());
    }
}

/// Drives the store and the viewport from level events and user commands
#[derive(Debug)]
pub struct Coordinator<S, V> {
    store: S,
    viewport: V,
    behavior: BehaviorConfig,
    level: OpenLevel,
}

impl<S: PoseStore, V: ViewportAccessor> Coordinator<S, V> {
    pub fn new(store: S, viewport: V, behavior: BehaviorConfig) -> Self {
        Self {
            store,
            viewport,
            behavior,
            level: OpenLevel::default(),
        }
    }

    /// Resume with level tracking handed back by [`Coordinator::into_parts`]
    pub fn with_open_level(mut self, level: OpenLevel) -> Self {
        self.level = level;
        self
    }

    pub fn current_level(&self) -> Option<&LevelKey> {
        self.level.current()
    }

    pub fn open_level(&self) -> &OpenLevel {
        &self.level
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    pub fn set_behavior(&mut self, behavior: BehaviorConfig) {
        self.behavior = behavior;
    }

    pub fn into_parts(self) -> (S, V, OpenLevel) {
        (self.store, self.viewport, self.level)
    }

    /// Dispatch a host notification
    ///
    /// Opening a level without a path (an untitled level) still replaces
    /// the open level, so the manual commands no longer act on the previous one.
    pub fn handle(&mut self, event: &LevelEvent) -> Outcome {
        let Some(key) = event.level_key() else {
            if let LevelEvent::Opened { .. } = event {
                self.level.open(None);
            }
            debug!(event = event.name(), "Level has no path, ignoring");
            return Outcome::Skipped(SkipReason::NoLevel);
        };

        match event {
            LevelEvent::Opened { .. } => self.on_level_opened(key),
            LevelEvent::Saved { .. } => self.on_level_saved(key),
            LevelEvent::Closing { .. } => self.on_level_closing(&key),
        }
    }

    /// A level finished loading: apply its saved pose, if any
    pub fn on_level_opened(&mut self, key: LevelKey) -> Outcome {
        self.level.open(Some(key.clone()));
        if !self.behavior.restore_on_open {
            return Outcome::Skipped(SkipReason::Disabled);
        }
        self.restore(&key)
    }

    /// A level was saved: capture the live pose for it
    ///
    /// The saved level becomes the current one, which covers "save as",
    /// unless it is the level that just closed.
    pub fn on_level_saved(&mut self, key: LevelKey) -> Outcome {
        self.level.saved(&key);
        if !self.behavior.capture_on_save {
            return Outcome::Skipped(SkipReason::Disabled);
        }
        self.capture(&key)
    }

    /// A level is about to close: capture the live pose so closing without
    /// saving does not lose it
    pub fn on_level_closing(&mut self, key: &LevelKey) -> Outcome {
        let outcome = if self.behavior.capture_on_close {
            self.capture(key)
        } else {
            Outcome::Skipped(SkipReason::Disabled)
        };

        self.level.close(key);
        outcome
    }

    /// Apply the saved pose of the current level now
    pub fn restore_now(&mut self) -> Outcome {
        match self.level.current.clone() {
            Some(key) => self.restore(&key),
            None => {
                info!("No level open, nothing to restore");
                Outcome::Skipped(SkipReason::NoLevel)
            }
        }
    }

    /// Save the live pose for the current level now
    pub fn save_now(&mut self) -> Outcome {
        match self.level.current.clone() {
            Some(key) => self.capture(&key),
            None => {
                info!("No level open, camera position not saved");
                Outcome::Skipped(SkipReason::NoLevel)
            }
        }
    }

    fn restore(&mut self, key: &LevelKey) -> Outcome {
        let Some(pose) = self.store.get(key) else {
            debug!(level = %key, "No saved camera position");
            return Outcome::NoSavedPose;
        };
        let pose = self.filter_fov(pose);

        match self.viewport.set_pose(&pose) {
            Ok(()) => {
                info!(level = %key, pose = %pose, "Restored camera position");
                Outcome::Restored(pose)
            }
            Err(ViewportError::NoActiveViewport) => {
                debug!(level = %key, "No active viewport, camera position not restored");
                Outcome::Skipped(SkipReason::NoActiveViewport)
            }
        }
    }

    fn capture(&mut self, key: &LevelKey) -> Outcome {
        let pose = match self.viewport.pose() {
            Ok(pose) => self.filter_fov(pose),
            Err(ViewportError::NoActiveViewport) => {
                debug!(level = %key, "No active viewport, camera position not captured");
                return Outcome::Skipped(SkipReason::NoActiveViewport);
            }
        };

        match self.store.put(key, pose) {
            Ok(()) => {
                info!(level = %key, pose = %pose, "Saved camera position");
                Outcome::Captured(pose)
            }
            Err(e) => {
                warn!(level = %key, error = %e, "Failed to save camera position");
                Outcome::Failed(e.to_string())
            }
        }
    }

    fn filter_fov(&self, pose: CameraPose) -> CameraPose {
        if self.behavior.include_fov {
            pose
        } else {
            pose.without_fov()
        }
    }
}

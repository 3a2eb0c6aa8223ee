//! camerapos scene - Bevy integration for the camera position extension
//!
//! Wires the editor crate into a Bevy app: the [`camera::EditorCamera`]
//! transform is the viewport, level lifecycle notifications arrive as
//! [`systems::LevelMessage`]s, and the toolbar is an egui panel.

pub mod camera;
pub mod state;
pub mod systems;
pub mod ui;

use std::path::PathBuf;

use bevy::prelude::*;
use camerapos_editor::HostMode;
use tracing::info;

/// Plugin that sets up the camera position extension
pub struct CameraPositionPlugin {
    /// Settings file; the store path is resolved against its directory.
    /// `None` keeps everything in memory.
    pub settings_path: Option<PathBuf>,
    pub mode: HostMode,
}

impl CameraPositionPlugin {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: Some(settings_path.into()),
            mode: HostMode::Editor,
        }
    }
}

impl Default for CameraPositionPlugin {
    fn default() -> Self {
        Self {
            settings_path: None,
            mode: HostMode::Editor,
        }
    }
}

impl Plugin for CameraPositionPlugin {
    fn build(&self, app: &mut App) {
        if self.mode != HostMode::Editor {
            info!(mode = ?self.mode, "Not an interactive editor, camera position extension inactive");
            return;
        }

        if !app.world().contains_resource::<CameraPositionState>() {
            let state = match &self.settings_path {
                Some(path) => CameraPositionState::from_settings_path(path),
                None => CameraPositionState::in_memory(),
            };
            app.insert_resource(state);
        }

        app.add_plugins(systems::CameraPositionSystemsPlugin)
            .add_plugins(ui::ToolbarUiPlugin);
    }
}

// Re-export commonly used types
pub use camera::{EditorCamera, QueryViewport};
pub use state::CameraPositionState;
pub use systems::{CameraCommand, CameraCommandResult, LevelMessage};

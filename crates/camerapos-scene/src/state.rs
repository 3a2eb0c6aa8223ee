//! Shared extension state held as a Bevy resource

use std::path::Path;

use bevy::prelude::*;
use camerapos_core::{Axis, JsonPoseStore, LevelKey, MemoryPoseStore, PoseStore, ViewportAccessor};
use camerapos_editor::{
    Clipboard, CommandId, CommandResponse, Config, Coordinator, LevelEvent, MemoryClipboard,
    OpenLevel, Outcome, PositionToolbar, SettingsFile,
};
use tracing::{debug, info, warn};

type BoxedStore = Box<dyn PoseStore + Send + Sync>;

/// Store, settings and toolbar state behind the camera position systems
///
/// The viewport is borrowed per call, so a [`Coordinator`] is assembled for
/// each event or command and the current level is carried across calls here.
#[derive(Resource)]
pub struct CameraPositionState {
    store: BoxedStore,
    settings: SettingsFile,
    level: OpenLevel,
    toolbar: PositionToolbar,
    clipboard: MemoryClipboard,
    last_outcome: Option<Outcome>,
}

impl CameraPositionState {
    pub fn new(store: impl PoseStore + Send + Sync + 'static, settings: SettingsFile) -> Self {
        Self {
            store: Box::new(store),
            settings,
            level: OpenLevel::default(),
            toolbar: PositionToolbar::new(),
            clipboard: MemoryClipboard::new(),
            last_outcome: None,
        }
    }

    /// Load settings from `path` and open the JSON store they point at
    ///
    /// Unreadable settings fall back to defaults that are not written back.
    pub fn from_settings_path(path: &Path) -> Self {
        let settings = SettingsFile::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load camera position settings, using defaults");
            SettingsFile::in_memory(Config::default())
        });
        let store_path = settings.config().store_path(path);
        info!(store = %store_path.display(), "Camera position store");
        Self::new(JsonPoseStore::open(store_path), settings)
    }

    /// Default settings over a store that lives only as long as the app
    pub fn in_memory() -> Self {
        Self::new(MemoryPoseStore::new(), SettingsFile::in_memory(Config::default()))
    }

    pub fn current_level(&self) -> Option<&LevelKey> {
        self.level.current()
    }

    pub fn store(&self) -> &dyn PoseStore {
        &*self.store
    }

    pub fn settings(&self) -> &SettingsFile {
        &self.settings
    }

    pub fn toolbar(&self) -> &PositionToolbar {
        &self.toolbar
    }

    pub fn show_toolbar(&self) -> bool {
        self.settings.show_toolbar()
    }

    /// Outcome of the most recent lifecycle event or camera command
    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Put text on the fallback clipboard used by [`Self::execute`]
    pub fn receive_clipboard_text(&mut self, text: &str) {
        self.clipboard.copy(text);
    }

    pub fn handle_level_event(&mut self, viewport: impl ViewportAccessor, event: &LevelEvent) -> Outcome {
        let outcome = self.with_coordinator(viewport, |c| c.handle(event));
        debug!(event = event.name(), outcome = ?outcome, "Level event handled");
        outcome
    }

    /// Run a command by id, copying and pasting through the state's own
    /// clipboard
    pub fn execute(&mut self, viewport: impl ViewportAccessor, id: CommandId) -> CommandResponse {
        let mut clipboard = std::mem::take(&mut self.clipboard);
        let response = self.execute_with_clipboard(viewport, id, &mut clipboard);
        self.clipboard = clipboard;
        response
    }

    /// Run a command by id, copying and pasting through the host clipboard
    pub fn execute_with_clipboard(
        &mut self,
        mut viewport: impl ViewportAccessor,
        id: CommandId,
        clipboard: &mut impl Clipboard,
    ) -> CommandResponse {
        debug!(command = %id, "Executing command");
        match id {
            CommandId::RestoreCameraPosition => {
                CommandResponse::Camera(self.with_coordinator(viewport, |c| c.restore_now()))
            }
            CommandId::SaveCameraPosition => {
                CommandResponse::Camera(self.with_coordinator(viewport, |c| c.save_now()))
            }
            CommandId::ToggleShowCameraPosWidget => {
                let show = !self.settings.show_toolbar();
                match self.settings.set_show_toolbar(show) {
                    Ok(()) => CommandResponse::ToolbarShown(show),
                    Err(e) => {
                        warn!(error = %e, "Failed to save toolbar visibility");
                        CommandResponse::Rejected(e.to_string())
                    }
                }
            }
            CommandId::CopyCameraLocation => {
                CommandResponse::Copied(self.toolbar.copy(clipboard))
            }
            CommandId::PasteCameraLocation => {
                match self.toolbar.paste(&mut viewport, clipboard) {
                    Ok(location) => CommandResponse::Pasted(location),
                    Err(e) => {
                        info!(error = %e, "Clipboard does not hold a camera location");
                        CommandResponse::Rejected(e.to_string())
                    }
                }
            }
        }
    }

    /// The editor is shutting down: capture the pose of the open level as if
    /// it were closing
    pub fn close_current_level(&mut self, viewport: impl ViewportAccessor) -> Option<Outcome> {
        let key = self.level.current()?.clone();
        let outcome = self.with_coordinator(viewport, |c| c.on_level_closing(&key));
        info!(level = %key, outcome = ?outcome, "Open level closed on exit");
        Some(outcome)
    }

    /// Pull the live camera location into the toolbar fields
    pub fn tick(&mut self, viewport: &impl ViewportAccessor) {
        self.toolbar.tick(viewport);
    }

    /// Edit one toolbar field; the camera follows
    pub fn set_toolbar_axis(&mut self, mut viewport: impl ViewportAccessor, axis: Axis, value: f64) {
        if let Err(e) = self.toolbar.set_axis(&mut viewport, axis, value) {
            debug!(axis = ?axis, error = %e, "Camera location not applied");
        }
    }

    fn with_coordinator<V: ViewportAccessor>(
        &mut self,
        viewport: V,
        f: impl FnOnce(&mut Coordinator<&mut BoxedStore, V>) -> Outcome,
    ) -> Outcome {
        let behavior = self.settings.config().behavior;
        let mut coordinator = Coordinator::new(&mut self.store, viewport, behavior)
            .with_open_level(std::mem::take(&mut self.level));
        let outcome = f(&mut coordinator);
        let (_, _, level) = coordinator.into_parts();
        self.level = level;
        self.last_outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camerapos_core::{CameraPose, Location, MockViewport, Rotation};
    use tempfile::TempDir;

    fn pose(x: f64) -> CameraPose {
        CameraPose::new(Location::new(x, 2.0, 3.0), Rotation::new(-10.0, 20.0, 0.0)).with_fov(90.0)
    }

    #[test]
    fn test_current_level_carries_across_calls() {
        let mut state = CameraPositionState::in_memory();
        let mut viewport = MockViewport::new(pose(1.0));

        state.handle_level_event(&mut viewport, &LevelEvent::opened("/Game/Maps/Foo"));
        assert_eq!(state.current_level().map(LevelKey::as_str), Some("/Game/Maps/Foo"));

        viewport.move_to(pose(5.0));
        assert_eq!(
            state.execute(&mut viewport, CommandId::SaveCameraPosition),
            CommandResponse::Camera(Outcome::Captured(pose(5.0)))
        );
        assert_eq!(state.last_outcome(), Some(&Outcome::Captured(pose(5.0))));

        viewport.move_to(pose(9.0));
        state.execute(&mut viewport, CommandId::RestoreCameraPosition);
        assert_eq!(viewport.camera(), Some(pose(5.0)));

        state.handle_level_event(&mut viewport, &LevelEvent::closing("/Game/Maps/Foo"));
        assert_eq!(state.current_level(), None);
    }

    #[test]
    fn test_settings_path_opens_json_store_beside_it() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("camerapos.toml");

        let mut state = CameraPositionState::from_settings_path(&settings_path);
        let mut viewport = MockViewport::new(pose(1.0));
        state.handle_level_event(&mut viewport, &LevelEvent::saved("/Game/Maps/Foo"));

        let store_path = Config::default().store_path(&settings_path);
        let key = LevelKey::from_level_path("/Game/Maps/Foo").unwrap();
        assert_eq!(JsonPoseStore::open(store_path).get(&key), Some(pose(1.0)));
    }

    #[test]
    fn test_paste_uses_received_text() {
        let mut state = CameraPositionState::in_memory();
        let mut viewport = MockViewport::new(pose(1.0));

        state.receive_clipboard_text("(X=7,Y=8,Z=9)");
        assert_eq!(
            state.execute(&mut viewport, CommandId::PasteCameraLocation),
            CommandResponse::Pasted(Location::new(7.0, 8.0, 9.0))
        );
        assert_eq!(viewport.camera().map(|p| p.location), Some(Location::new(7.0, 8.0, 9.0)));
    }

    #[test]
    fn test_host_clipboard_is_used_for_copy_and_paste() {
        let mut state = CameraPositionState::in_memory();
        let mut viewport = MockViewport::new(pose(1.0));
        let mut host = MemoryClipboard::with_text("(X=-4,Y=5,Z=6)");

        assert_eq!(
            state.execute_with_clipboard(&mut viewport, CommandId::PasteCameraLocation, &mut host),
            CommandResponse::Pasted(Location::new(-4.0, 5.0, 6.0))
        );
        assert_eq!(viewport.camera().map(|p| p.location), Some(Location::new(-4.0, 5.0, 6.0)));

        state.tick(&viewport);
        state.execute_with_clipboard(&mut viewport, CommandId::CopyCameraLocation, &mut host);
        assert_eq!(host.contents(), Some("(X=-4.000000,Y=5.000000,Z=6.000000)"));

        // The fallback clipboard was never touched
        assert!(matches!(
            state.execute(&mut viewport, CommandId::PasteCameraLocation),
            CommandResponse::Rejected(_)
        ));
    }

    #[test]
    fn test_untitled_open_after_close_sequence() {
        let mut state = CameraPositionState::in_memory();
        let mut viewport = MockViewport::new(pose(1.0));
        let key = LevelKey::from_level_path("/Game/Maps/Foo").unwrap();

        state.handle_level_event(&mut viewport, &LevelEvent::opened("/Game/Maps/Foo"));
        state.handle_level_event(&mut viewport, &LevelEvent::closing("/Game/Maps/Foo"));
        state.handle_level_event(&mut viewport, &LevelEvent::saved("/Game/Maps/Foo"));
        state.handle_level_event(&mut viewport, &LevelEvent::opened(""));
        assert_eq!(state.current_level(), None);

        viewport.move_to(pose(99.0));
        state.execute(&mut viewport, CommandId::SaveCameraPosition);
        assert_eq!(state.store().get(&key), Some(pose(1.0)));
    }

    #[test]
    fn test_close_current_level() {
        let mut state = CameraPositionState::in_memory();
        let mut viewport = MockViewport::new(pose(1.0));
        assert_eq!(state.close_current_level(&mut viewport), None);

        state.handle_level_event(&mut viewport, &LevelEvent::opened("/Game/Maps/Foo"));
        viewport.move_to(pose(2.0));
        assert_eq!(state.close_current_level(&mut viewport), Some(Outcome::Captured(pose(2.0))));
        assert_eq!(state.current_level(), None);

        let key = LevelKey::from_level_path("/Game/Maps/Foo").unwrap();
        assert_eq!(state.store().get(&key), Some(pose(2.0)));
    }

    #[test]
    fn test_toggle_toolbar() {
        let mut state = CameraPositionState::in_memory();
        assert!(!state.show_toolbar());
        assert_eq!(
            state.execute(MockViewport::inactive(), CommandId::ToggleShowCameraPosWidget),
            CommandResponse::ToolbarShown(true)
        );
        assert!(state.show_toolbar());
    }
}

//! Extension module: startup/shutdown glue and command dispatch
//!
//! [`CameraPositionModule`] owns the coordinator, the toolbar state and the
//! settings. `startup` installs its commands, menu entries and level event
//! listener into the host; `shutdown` removes every one of them again.

use std::cell::RefCell;
use std::rc::Rc;

use camerapos_core::{Axis, Location, PoseStore, ViewportAccessor};
use tracing::{debug, info, warn};

use crate::commands::{
    register_command, Chord, CommandId, CommandRegistry, MenuEntry, MenuRegistry,
    CAMERA_POSITION_SECTION, VIEWPORT_OPTIONS_MENU, VIEWPORT_TOOLBAR_MENU,
};
use crate::config::SettingsFile;
use crate::coordinator::{Coordinator, Outcome};
use crate::events::{LevelEvents, Subscription};
use crate::toolbar::{Clipboard, PositionToolbar};

/// How the host application is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Interactive editor with viewports
    Editor,
    /// Running the game itself
    Game,
    /// Headless batch process
    Commandlet,
}

/// What the extension needs from the host editor
pub trait EditorHost {
    fn mode(&self) -> HostMode;
    fn level_events(&self) -> &LevelEvents;
    fn commands(&self) -> &CommandRegistry;
    fn commands_mut(&mut self) -> &mut CommandRegistry;
    fn menus_mut(&mut self) -> &mut MenuRegistry;
}

/// Minimal host with its own registries and event bus
#[derive(Debug)]
pub struct EditorShell {
    pub mode: HostMode,
    pub events: LevelEvents,
    pub commands: CommandRegistry,
    pub menus: MenuRegistry,
}

impl EditorShell {
    pub fn new(mode: HostMode) -> Self {
        Self {
            mode,
            events: LevelEvents::new(),
            commands: CommandRegistry::new(),
            menus: MenuRegistry::new(),
        }
    }
}

impl EditorHost for EditorShell {
    fn mode(&self) -> HostMode {
        self.mode
    }

    fn level_events(&self) -> &LevelEvents {
        &self.events
    }

    fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    fn menus_mut(&mut self) -> &mut MenuRegistry {
        &mut self.menus
    }
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
    Camera(Outcome),
    /// Toolbar visibility after the toggle
    ToolbarShown(bool),
    /// Text placed on the clipboard
    Copied(String),
    /// Location the camera was moved to
    Pasted(Location),
    /// The command could not run; the message was logged
    Rejected(String),
}

fn menu_for(id: CommandId) -> &'static str {
    match id {
        CommandId::ToggleShowCameraPosWidget => VIEWPORT_OPTIONS_MENU,
        _ => VIEWPORT_TOOLBAR_MENU,
    }
}

/// The camera position editor extension
pub struct CameraPositionModule<S, V, C> {
    coordinator: Rc<RefCell<Coordinator<S, V>>>,
    toolbar: PositionToolbar,
    clipboard: C,
    settings: SettingsFile,
    subscription: Option<Subscription>,
    registered: Vec<CommandId>,
    started: bool,
}

impl<S, V, C> CameraPositionModule<S, V, C>
where
    S: PoseStore + 'static,
    V: ViewportAccessor + 'static,
    C: Clipboard,
{
    pub fn new(store: S, viewport: V, clipboard: C, settings: SettingsFile) -> Self {
        let behavior = settings.config().behavior;
        Self {
            coordinator: Rc::new(RefCell::new(Coordinator::new(store, viewport, behavior))),
            toolbar: PositionToolbar::new(),
            clipboard,
            settings,
            subscription: None,
            registered: Vec::new(),
            started: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Install commands, menu entries and the level listener.
    ///
    /// Does nothing outside an interactive editor. Bad or conflicting
    /// shortcuts are logged and the command is registered without one.
    pub fn startup(&mut self, host: &mut impl EditorHost) {
        if self.started {
            debug!("Camera position extension already started");
            return;
        }
        if host.mode() != HostMode::Editor {
            info!(mode = ?host.mode(), "Not an interactive editor, camera position extension inactive");
            return;
        }

        let coordinator = Rc::clone(&self.coordinator);
        self.subscription = Some(host.level_events().subscribe(move |event| {
            match coordinator.try_borrow_mut() {
                Ok(mut coordinator) => {
                    coordinator.handle(event);
                }
                Err(_) => warn!(event = event.name(), "Coordinator busy, level event dropped"),
            }
        }));

        for id in CommandId::ALL {
            let shortcut = self.settings.config().shortcuts.chord_for(id);
            if register_command(host.commands_mut(), id, shortcut) {
                host.menus_mut()
                    .add(MenuEntry::new(menu_for(id), CAMERA_POSITION_SECTION, id));
                self.registered.push(id);
            }
        }

        self.started = true;
        info!(commands = self.registered.len(), "Camera position extension started");
    }

    /// Remove everything `startup` installed
    pub fn shutdown(&mut self, host: &mut impl EditorHost) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        for id in self.registered.drain(..) {
            host.commands_mut().unregister(id);
            host.menus_mut().remove_command(id);
        }
        if self.started {
            info!("Camera position extension shut down");
        }
        self.started = false;
    }

    /// Run a command by id
    pub fn execute(&mut self, id: CommandId) -> CommandResponse {
        debug!(command = %id, "Executing command");
        match id {
            CommandId::RestoreCameraPosition => {
                CommandResponse::Camera(self.coordinator.borrow_mut().restore_now())
            }
            CommandId::SaveCameraPosition => {
                CommandResponse::Camera(self.coordinator.borrow_mut().save_now())
            }
            CommandId::ToggleShowCameraPosWidget => self.toggle_toolbar_visibility(),
            CommandId::CopyCameraLocation => {
                CommandResponse::Copied(self.toolbar.copy(&mut self.clipboard))
            }
            CommandId::PasteCameraLocation => {
                let mut coordinator = self.coordinator.borrow_mut();
                match self.toolbar.paste(coordinator.viewport_mut(), &mut self.clipboard) {
                    Ok(location) => CommandResponse::Pasted(location),
                    Err(e) => {
                        info!(error = %e, "Clipboard does not hold a camera location");
                        CommandResponse::Rejected(e.to_string())
                    }
                }
            }
        }
    }

    /// Run the command bound to a pressed chord, if it is one of ours
    pub fn handle_chord(&mut self, host: &impl EditorHost, chord: &Chord) -> Option<CommandResponse> {
        let id = host.commands().find_by_chord(chord)?;
        self.registered.contains(&id).then(|| self.execute(id))
    }

    /// Flip toolbar visibility and flush the settings file
    pub fn toggle_toolbar_visibility(&mut self) -> CommandResponse {
        let show = !self.settings.show_toolbar();
        match self.settings.set_show_toolbar(show) {
            Ok(()) => CommandResponse::ToolbarShown(show),
            Err(e) => {
                warn!(error = %e, "Failed to save toolbar visibility");
                CommandResponse::Rejected(e.to_string())
            }
        }
    }

    /// Per-frame update: pull the live camera location into the toolbar
    pub fn tick(&mut self) {
        if !self.started {
            return;
        }
        let coordinator = self.coordinator.borrow();
        self.toolbar.tick(coordinator.viewport());
    }

    /// Edit one toolbar field; the camera follows
    pub fn set_toolbar_axis(&mut self, axis: Axis, value: f64) {
        let mut coordinator = self.coordinator.borrow_mut();
        if let Err(e) = self.toolbar.set_axis(coordinator.viewport_mut(), axis, value) {
            debug!(axis = ?axis, error = %e, "Camera location not applied");
        }
    }

    pub fn toolbar(&self) -> &PositionToolbar {
        &self.toolbar
    }

    pub fn is_toolbar_visible(&self) -> bool {
        self.settings.show_toolbar()
    }

    pub fn settings(&self) -> &SettingsFile {
        &self.settings
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Run `f` against the coordinator, e.g. to inspect the store or move the
    /// camera in tests
    pub fn with_coordinator<R>(&self, f: impl FnOnce(&mut Coordinator<S, V>) -> R) -> R {
        f(&mut *self.coordinator.borrow_mut())
    }
}

impl<S, V, C> Drop for CameraPositionModule<S, V, C> {
    fn drop(&mut self) {
        if self.started {
            warn!("Camera position extension dropped without shutdown");
        }
    }
}

//! Messages and Update systems driving the extension from the Bevy world

use bevy::prelude::*;
use bevy_egui::EguiClipboard;
use camerapos_editor::{
    register_command, Chord, Clipboard, CommandId, CommandRegistry, CommandResponse, LevelEvent,
    Modifiers,
};
use tracing::{debug, info};

use crate::camera::{EditorCameraQuery, QueryViewport};
use crate::state::CameraPositionState;

/// Level lifecycle notification sent by the host editor
#[derive(Message, Debug, Clone)]
pub struct LevelMessage(pub LevelEvent);

/// Request to run one of the extension's commands
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraCommand(pub CommandId);

/// Command reply, for UI feedback
#[derive(Message, Debug, Clone)]
pub struct CameraCommandResult {
    pub command: CommandId,
    pub response: CommandResponse,
}

/// Keyboard shortcuts bound to the extension's commands
#[derive(Resource, Debug, Default)]
pub struct ShortcutBindings(pub CommandRegistry);

impl ShortcutBindings {
    /// Bindings built from the configured shortcut text
    pub fn from_state(state: &CameraPositionState) -> Self {
        let shortcuts = &state.settings().config().shortcuts;
        let mut registry = CommandRegistry::new();
        for id in CommandId::ALL {
            register_command(&mut registry, id, shortcuts.chord_for(id));
        }
        Self(registry)
    }
}

/// The OS clipboard as managed by bevy_egui
pub struct SystemClipboard<'a>(pub &'a mut EguiClipboard);

impl Clipboard for SystemClipboard<'_> {
    fn copy(&mut self, text: &str) {
        self.0.set_text(text);
    }

    fn paste(&mut self) -> Option<String> {
        self.0.get_text()
    }
}

/// Plugin for the lifecycle, command and shortcut systems
pub struct CameraPositionSystemsPlugin;

impl Plugin for CameraPositionSystemsPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<CameraPositionState>() {
            app.insert_resource(CameraPositionState::in_memory());
        }
        let bindings = ShortcutBindings::from_state(app.world().resource::<CameraPositionState>());
        info!(commands = bindings.0.len(), "Camera position commands registered");

        app.insert_resource(bindings)
            .add_message::<LevelMessage>()
            .add_message::<CameraCommand>()
            .add_message::<CameraCommandResult>()
            .add_systems(
                Update,
                (
                    dispatch_shortcuts,
                    apply_level_messages,
                    apply_camera_commands,
                    refresh_toolbar,
                )
                    .chain(),
            )
            .add_systems(Last, capture_on_exit);
    }
}

fn apply_level_messages(
    mut messages: MessageReader<LevelMessage>,
    mut state: ResMut<CameraPositionState>,
    mut cameras: EditorCameraQuery,
) {
    for LevelMessage(event) in messages.read() {
        state.handle_level_event(QueryViewport::new(&mut cameras), event);
    }
}

fn apply_camera_commands(
    mut messages: MessageReader<CameraCommand>,
    mut results: MessageWriter<CameraCommandResult>,
    mut state: ResMut<CameraPositionState>,
    mut cameras: EditorCameraQuery,
    mut clipboard: Option<ResMut<EguiClipboard>>,
) {
    for CameraCommand(id) in messages.read() {
        let viewport = QueryViewport::new(&mut cameras);
        let response = match clipboard.as_deref_mut() {
            Some(clipboard) => {
                state.execute_with_clipboard(viewport, *id, &mut SystemClipboard(clipboard))
            }
            None => state.execute(viewport, *id),
        };
        results.write(CameraCommandResult {
            command: *id,
            response,
        });
    }
}

/// Closing the editor closes the open level too
fn capture_on_exit(
    mut exits: MessageReader<AppExit>,
    mut state: ResMut<CameraPositionState>,
    mut cameras: EditorCameraQuery,
) {
    if exits.is_empty() {
        return;
    }
    exits.clear();
    state.close_current_level(QueryViewport::new(&mut cameras));
}

fn refresh_toolbar(mut state: ResMut<CameraPositionState>, mut cameras: EditorCameraQuery) {
    if state.show_toolbar() {
        state.tick(&QueryViewport::new(&mut cameras));
    }
}

fn dispatch_shortcuts(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    bindings: Res<ShortcutBindings>,
    mut commands: MessageWriter<CameraCommand>,
) {
    let Some(keys) = keys else { return };

    let modifiers = Modifiers {
        ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
        alt: keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
        shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        command: keys.any_pressed([KeyCode::SuperLeft, KeyCode::SuperRight]),
    };

    for key in keys.get_just_pressed() {
        let Some(name) = key_name(*key) else { continue };
        let Ok(chord) = Chord::new(modifiers, name) else { continue };
        if let Some(id) = bindings.0.find_by_chord(&chord) {
            debug!(chord = %chord, command = %id, "Shortcut pressed");
            commands.write(CameraCommand(id));
        }
    }
}

/// Chord key name for a physical key, if chords can use it
pub fn key_name(key: KeyCode) -> Option<&'static str> {
    let name = match key {
        KeyCode::KeyA => "A",
        KeyCode::KeyB => "B",
        KeyCode::KeyC => "C",
        KeyCode::KeyD => "D",
        KeyCode::KeyE => "E",
        KeyCode::KeyF => "F",
        KeyCode::KeyG => "G",
        KeyCode::KeyH => "H",
        KeyCode::KeyI => "I",
        KeyCode::KeyJ => "J",
        KeyCode::KeyK => "K",
        KeyCode::KeyL => "L",
        KeyCode::KeyM => "M",
        KeyCode::KeyN => "N",
        KeyCode::KeyO => "O",
        KeyCode::KeyP => "P",
        KeyCode::KeyQ => "Q",
        KeyCode::KeyR => "R",
        KeyCode::KeyS => "S",
        KeyCode::KeyT => "T",
        KeyCode::KeyU => "U",
        KeyCode::KeyV => "V",
        KeyCode::KeyW => "W",
        KeyCode::KeyX => "X",
        KeyCode::KeyY => "Y",
        KeyCode::KeyZ => "Z",
        KeyCode::Digit0 => "0",
        KeyCode::Digit1 => "1",
        KeyCode::Digit2 => "2",
        KeyCode::Digit3 => "3",
        KeyCode::Digit4 => "4",
        KeyCode::Digit5 => "5",
        KeyCode::Digit6 => "6",
        KeyCode::Digit7 => "7",
        KeyCode::Digit8 => "8",
        KeyCode::Digit9 => "9",
        KeyCode::F1 => "F1",
        KeyCode::F2 => "F2",
        KeyCode::F3 => "F3",
        KeyCode::F4 => "F4",
        KeyCode::F5 => "F5",
        KeyCode::F6 => "F6",
        KeyCode::F7 => "F7",
        KeyCode::F8 => "F8",
        KeyCode::F9 => "F9",
        KeyCode::F10 => "F10",
        KeyCode::F11 => "F11",
        KeyCode::F12 => "F12",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Insert => "Insert",
        KeyCode::Delete => "Delete",
        KeyCode::Backspace => "Backspace",
        KeyCode::Tab => "Tab",
        KeyCode::Enter => "Enter",
        KeyCode::Escape => "Escape",
        KeyCode::Space => "Space",
        KeyCode::ArrowUp => "Up",
        KeyCode::ArrowDown => "Down",
        KeyCode::ArrowLeft => "Left",
        KeyCode::ArrowRight => "Right",
        _ => return None,
    };
    Some(name)
}

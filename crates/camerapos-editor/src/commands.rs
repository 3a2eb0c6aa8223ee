//! User-facing commands, keyboard chords, and menu/toolbar entries

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid keyboard shortcut {0:?}")]
    InvalidChord(String),
    #[error("Command {0} is already registered")]
    DuplicateCommand(CommandId),
    #[error("Shortcut {chord} is already bound to {existing}")]
    ChordConflict { chord: Chord, existing: CommandId },
}

/// Commands contributed by the camera position extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandId {
    RestoreCameraPosition,
    SaveCameraPosition,
    ToggleShowCameraPosWidget,
    CopyCameraLocation,
    PasteCameraLocation,
}

impl CommandId {
    pub const ALL: [CommandId; 5] = [
        CommandId::RestoreCameraPosition,
        CommandId::SaveCameraPosition,
        CommandId::ToggleShowCameraPosWidget,
        CommandId::CopyCameraLocation,
        CommandId::PasteCameraLocation,
    ];

    /// Stable command name used by hosts for menus and bindings
    pub fn name(self) -> &'static str {
        match self {
            CommandId::RestoreCameraPosition => "camerapos.restore",
            CommandId::SaveCameraPosition => "camerapos.save",
            CommandId::ToggleShowCameraPosWidget => "camerapos.toggle_toolbar",
            CommandId::CopyCameraLocation => "camerapos.copy_location",
            CommandId::PasteCameraLocation => "camerapos.paste_location",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommandId::RestoreCameraPosition => "Restore Camera Position",
            CommandId::SaveCameraPosition => "Save Camera Position",
            CommandId::ToggleShowCameraPosWidget => "Show Camera Position",
            CommandId::CopyCameraLocation => "Copy Camera Location",
            CommandId::PasteCameraLocation => "Paste Camera Location",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CommandId::RestoreCameraPosition => {
                "Move the viewport camera back to the position saved for this level"
            }
            CommandId::SaveCameraPosition => {
                "Remember the current viewport camera position for this level"
            }
            CommandId::ToggleShowCameraPosWidget => {
                "Show or hide the camera position fields in the viewport toolbar"
            }
            CommandId::CopyCameraLocation => "Copy the camera location to the clipboard",
            CommandId::PasteCameraLocation => "Move the camera to a location from the clipboard",
        }
    }

    /// Rendered as a check box instead of a button
    pub fn is_checkable(self) -> bool {
        matches!(self, CommandId::ToggleShowCameraPosWidget)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Modifier keys held for a chord
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub command: bool,
}

/// Named non-character keys accepted in chords
const NAMED_KEYS: &[&str] = &[
    "Home", "End", "PageUp", "PageDown", "Insert", "Delete", "Backspace", "Tab", "Enter",
    "Escape", "Space", "Up", "Down", "Left", "Right",
];

/// A keyboard shortcut such as `Ctrl+Shift+Home`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    pub modifiers: Modifiers,
    /// Canonical key name: an upper-case letter or digit, `F1`..`F24`, or a
    /// named key such as `Home`
    pub key: String,
}

impl Chord {
    pub fn new(modifiers: Modifiers, key: &str) -> Result<Self, CommandError> {
        let key = canonical_key(key).ok_or_else(|| CommandError::InvalidChord(key.to_string()))?;
        Ok(Self { modifiers, key })
    }
}

fn canonical_key(key: &str) -> Option<String> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Some(c.to_ascii_uppercase().to_string());
        }
        return None;
    }

    if let Some(n) = key
        .strip_prefix('F')
        .or_else(|| key.strip_prefix('f'))
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=24).contains(&n).then(|| format!("F{}", n));
    }

    NAMED_KEYS
        .iter()
        .find(|k| k.eq_ignore_ascii_case(key))
        .map(|k| k.to_string())
}

impl FromStr for Chord {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CommandError::InvalidChord(s.to_string());
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let (key, modifier_names) = parts.split_last().ok_or_else(invalid)?;

        let mut modifiers = Modifiers::default();
        for name in modifier_names {
            let flag = match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => &mut modifiers.ctrl,
                "alt" | "option" => &mut modifiers.alt,
                "shift" => &mut modifiers.shift,
                "cmd" | "command" | "super" => &mut modifiers.command,
                _ => return Err(invalid()),
            };
            if *flag {
                return Err(invalid());
            }
            *flag = true;
        }

        let key = canonical_key(key).ok_or_else(invalid)?;
        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift+")?;
        }
        if self.modifiers.command {
            f.write_str("Cmd+")?;
        }
        f.write_str(&self.key)
    }
}

/// A command as presented to the user
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInfo {
    pub id: CommandId,
    pub label: String,
    pub description: String,
    pub chord: Option<Chord>,
    pub checkable: bool,
}

impl CommandInfo {
    pub fn new(id: CommandId, chord: Option<Chord>) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            description: id.description().to_string(),
            chord,
            checkable: id.is_checkable(),
        }
    }
}

/// Host-side table of registered commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandInfo>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Fails on a duplicate id or a chord already bound to
    /// another command.
    pub fn register(&mut self, info: CommandInfo) -> Result<(), CommandError> {
        if self.get(info.id).is_some() {
            return Err(CommandError::DuplicateCommand(info.id));
        }
        if let Some(chord) = &info.chord {
            if let Some(existing) = self.find_by_chord(chord) {
                return Err(CommandError::ChordConflict {
                    chord: chord.clone(),
                    existing,
                });
            }
        }
        self.commands.push(info);
        Ok(())
    }

    /// Remove a command, returning whether it was registered
    pub fn unregister(&mut self, id: CommandId) -> bool {
        let before = self.commands.len();
        self.commands.retain(|c| c.id != id);
        self.commands.len() != before
    }

    pub fn get(&self, id: CommandId) -> Option<&CommandInfo> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// Command bound to a pressed chord
    pub fn find_by_chord(&self, chord: &Chord) -> Option<CommandId> {
        self.commands
            .iter()
            .find(|c| c.chord.as_ref() == Some(chord))
            .map(|c| c.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandInfo> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Register `id` with its configured shortcut text
///
/// An unparsable or already-taken shortcut is logged and the command is
/// registered without one. Returns whether the command ended up registered.
pub fn register_command(registry: &mut CommandRegistry, id: CommandId, shortcut: Option<&str>) -> bool {
    let chord = shortcut.and_then(|text| match text.parse::<Chord>() {
        Ok(chord) => Some(chord),
        Err(e) => {
            warn!(command = %id, error = %e, "Ignoring shortcut");
            None
        }
    });

    match registry.register(CommandInfo::new(id, chord)) {
        Ok(()) => true,
        Err(CommandError::ChordConflict { chord, existing }) => {
            warn!(command = %id, chord = %chord, existing = %existing, "Shortcut already taken, registering without it");
            registry.register(CommandInfo::new(id, None)).is_ok()
        }
        Err(e) => {
            warn!(command = %id, error = %e, "Failed to register command");
            false
        }
    }
}

/// Extension point for the viewport toolbar (buttons and position fields)
pub const VIEWPORT_TOOLBAR_MENU: &str = "LevelEditor.ViewportToolBar";
/// Extension point for the viewport Options drop-down
pub const VIEWPORT_OPTIONS_MENU: &str = "LevelEditor.ViewportToolBar.Options";
/// Section the extension adds its entries to
pub const CAMERA_POSITION_SECTION: &str = "CameraPosition";

/// A command placed in a host menu or toolbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub menu: String,
    pub section: String,
    pub command: CommandId,
}

impl MenuEntry {
    pub fn new(menu: &str, section: &str, command: CommandId) -> Self {
        Self {
            menu: menu.to_string(),
            section: section.to_string(),
            command,
        }
    }
}

/// Host-side table of menu and toolbar entries
#[derive(Debug, Default)]
pub struct MenuRegistry {
    entries: Vec<MenuEntry>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; adding the same entry twice is a no-op
    pub fn add(&mut self, entry: MenuEntry) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// Remove every entry for `command`, returning how many were removed
    pub fn remove_command(&mut self, command: CommandId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.command != command);
        before - self.entries.len()
    }

    /// Entries of one menu in insertion order
    pub fn entries_in<'a>(&'a self, menu: &'a str) -> impl Iterator<Item = &'a MenuEntry> + 'a {
        self.entries.iter().filter(move |e| e.menu == menu)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chord() {
        let chord: Chord = "Ctrl+Shift+Home".parse().unwrap();
        assert!(chord.modifiers.ctrl);
        assert!(chord.modifiers.shift);
        assert!(!chord.modifiers.alt);
        assert_eq!(chord.key, "Home");
        assert_eq!(chord.to_string(), "Ctrl+Shift+Home");
    }

    #[test]
    fn test_parse_chord_normalizes() {
        let a: Chord = "shift + ctrl + r".parse().unwrap();
        let b: Chord = "Ctrl+Shift+R".parse().unwrap();
        assert_eq!(a, b);

        let f: Chord = "Alt+f5".parse().unwrap();
        assert_eq!(f.to_string(), "Alt+F5");
    }

    #[test]
    fn test_parse_chord_errors() {
        for bad in ["", "Ctrl+", "Ctrl+Ctrl+A", "Hyper+A", "Ctrl+F25", "Ctrl+Banana"] {
            assert!(bad.parse::<Chord>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_registry_rejects_duplicates_and_conflicts() {
        let mut registry = CommandRegistry::new();
        let chord: Chord = "Ctrl+Shift+Home".parse().unwrap();

        registry
            .register(CommandInfo::new(CommandId::RestoreCameraPosition, Some(chord.clone())))
            .unwrap();
        assert_eq!(
            registry.register(CommandInfo::new(CommandId::RestoreCameraPosition, None)),
            Err(CommandError::DuplicateCommand(CommandId::RestoreCameraPosition))
        );
        assert_eq!(
            registry.register(CommandInfo::new(CommandId::SaveCameraPosition, Some(chord.clone()))),
            Err(CommandError::ChordConflict {
                chord: chord.clone(),
                existing: CommandId::RestoreCameraPosition
            })
        );

        assert_eq!(registry.find_by_chord(&chord), Some(CommandId::RestoreCameraPosition));
        assert!(registry.unregister(CommandId::RestoreCameraPosition));
        assert!(!registry.unregister(CommandId::RestoreCameraPosition));
        assert!(registry.find_by_chord(&chord).is_none());
    }

    #[test]
    fn test_command_info() {
        let info = CommandInfo::new(CommandId::ToggleShowCameraPosWidget, None);
        assert_eq!(info.label, "Show Camera Position");
        assert!(info.checkable);
        assert!(!CommandInfo::new(CommandId::SaveCameraPosition, None).checkable);
    }

    #[test]
    fn test_menu_registry() {
        let mut menus = MenuRegistry::new();
        let entry = MenuEntry::new(VIEWPORT_OPTIONS_MENU, CAMERA_POSITION_SECTION, CommandId::ToggleShowCameraPosWidget);
        menus.add(entry.clone());
        menus.add(entry);
        menus.add(MenuEntry::new(VIEWPORT_TOOLBAR_MENU, CAMERA_POSITION_SECTION, CommandId::SaveCameraPosition));
        assert_eq!(menus.len(), 2);
        assert_eq!(menus.entries_in(VIEWPORT_OPTIONS_MENU).count(), 1);

        assert_eq!(menus.remove_command(CommandId::ToggleShowCameraPosWidget), 1);
        assert_eq!(menus.entries_in(VIEWPORT_OPTIONS_MENU).count(), 0);
    }
}

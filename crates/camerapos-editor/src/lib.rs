//! camerapos editor - Editor extension that remembers the viewport camera per level
//!
//! This crate wires the core store and viewport abstractions into an editor:
//! - Level lifecycle event bus with disposable subscriptions
//! - The capture/restore coordinator driven by those events
//! - Restore/save commands, keyboard chords and menu entries
//! - The camera position toolbar (live X/Y/Z, copy/paste)
//! - Settings file handling and module startup/shutdown

pub mod commands;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod module;
pub mod toolbar;

pub use commands::{register_command, Chord, CommandError, CommandId, CommandInfo, CommandRegistry, MenuEntry, MenuRegistry, Modifiers};
pub use config::{load_config, save_config, save_default_config, Config, ConfigError, SettingsFile};
pub use coordinator::{Coordinator, OpenLevel, Outcome, SkipReason};
pub use events::{LevelEvent, LevelEvents, Subscription};
pub use module::{CameraPositionModule, CommandResponse, EditorHost, EditorShell, HostMode};
pub use toolbar::{Clipboard, MemoryClipboard, PasteError, PositionToolbar};

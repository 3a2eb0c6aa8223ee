//! Camera position toolbar: live X/Y/Z readout, per-axis edit, copy/paste

use camerapos_core::{Axis, Location, ParseLocationError, ViewportAccessor, ViewportError};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PasteError {
    #[error("Clipboard is empty")]
    EmptyClipboard,
    #[error(transparent)]
    Parse(#[from] ParseLocationError),
}

/// System clipboard, supplied by the host
pub trait Clipboard {
    fn copy(&mut self, text: &str);
    fn paste(&mut self) -> Option<String>;
}

/// Process-local clipboard for tests and headless hosts
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            contents: Some(text.to_string()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) {
        self.contents = Some(text.to_string());
    }

    fn paste(&mut self) -> Option<String> {
        self.contents.clone()
    }
}

/// State behind the toolbar's three location fields
///
/// `tick` pulls the live camera location into the fields once per frame;
/// edits push a new location back into the camera, keeping its orientation.
#[derive(Debug, Clone, Default)]
pub struct PositionToolbar {
    location: Location,
}

impl PositionToolbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the displayed location from the live camera
    pub fn tick(&mut self, viewport: &impl ViewportAccessor) {
        if let Ok(pose) = viewport.pose() {
            self.location = pose.location;
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        self.location.get(axis)
    }

    /// Type a new value into one field and move the camera there
    pub fn set_axis(
        &mut self,
        viewport: &mut impl ViewportAccessor,
        axis: Axis,
        value: f64,
    ) -> Result<(), ViewportError> {
        self.location = self.location.with_axis(axis, value);
        self.refresh_viewport_location(viewport)
    }

    /// Put the displayed location on the clipboard, returning the text
    pub fn copy(&self, clipboard: &mut impl Clipboard) -> String {
        let text = self.location.to_clipboard_string();
        clipboard.copy(&text);
        text
    }

    /// Move the camera to a location read from the clipboard
    ///
    /// Text without all of `X=`, `Y=` and `Z=` leaves everything unchanged.
    pub fn paste(
        &mut self,
        viewport: &mut impl ViewportAccessor,
        clipboard: &mut impl Clipboard,
    ) -> Result<Location, PasteError> {
        let text = clipboard.paste().ok_or(PasteError::EmptyClipboard)?;
        let location = Location::parse_clipboard(&text)?;
        self.location = location;
        if let Err(e) = self.refresh_viewport_location(viewport) {
            debug!(error = %e, "Pasted location not applied");
        }
        Ok(location)
    }

    fn refresh_viewport_location(
        &self,
        viewport: &mut impl ViewportAccessor,
    ) -> Result<(), ViewportError> {
        let pose = viewport.pose()?;
        viewport.set_pose(&pose.with_location(self.location))
    }
}

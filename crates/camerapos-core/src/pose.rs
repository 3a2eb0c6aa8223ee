//! Camera pose value types and the clipboard text format for locations

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseLocationError {
    #[error("Missing component {0}= in location text")]
    MissingComponent(char),
    #[error("Invalid number for component {component}=: {text:?}")]
    InvalidNumber { component: char, text: String },
}

/// One of the three location axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Upper-case letter used in the text format
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

/// Camera location in world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy of this location with one axis replaced
    pub fn with_axis(mut self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Format as `(X=1.000000,Y=2.000000,Z=3.000000)`
    pub fn to_clipboard_string(&self) -> String {
        format!("(X={:.6},Y={:.6},Z={:.6})", self.x, self.y, self.z)
    }

    /// Parse a location from text containing `X=`, `Y=` and `Z=` values.
    ///
    /// Component names are matched case-insensitively and may appear in any
    /// order; anything around them is ignored. All three must be present.
    pub fn parse_clipboard(text: &str) -> Result<Self, ParseLocationError> {
        Ok(Self {
            x: parse_component(text, Axis::X)?,
            y: parse_component(text, Axis::Y)?,
            z: parse_component(text, Axis::Z)?,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}, {:.3}]", self.x, self.y, self.z)
    }
}

fn parse_component(text: &str, axis: Axis) -> Result<f64, ParseLocationError> {
    let letter = axis.letter();
    let needle = format!("{}=", letter.to_ascii_lowercase());
    let lowered = text.to_ascii_lowercase();
    // The axis letter must start a word, so `max=` is not read as `x=`
    let start = lowered
        .match_indices(&needle)
        .map(|(i, _)| i)
        .find(|&i| {
            lowered[..i]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric())
        })
        .ok_or(ParseLocationError::MissingComponent(letter))?
        + needle.len();

    let rest = text[start..].trim_start();
    let number: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .collect();

    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseLocationError::InvalidNumber {
            component: letter,
            text: number,
        })
}

/// Camera orientation in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub roll: f64,
}

impl Rotation {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// Position and orientation of the viewport camera at one instant
///
/// A pose is replaced wholesale on every capture; callers build a new value
/// instead of patching a stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub location: Location,
    #[serde(default)]
    pub rotation: Rotation,
    /// Horizontal field of view in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov: Option<f64>,
}

impl CameraPose {
    pub fn new(location: Location, rotation: Rotation) -> Self {
        Self {
            location,
            rotation,
            fov: None,
        }
    }

    pub fn with_fov(mut self, fov: f64) -> Self {
        self.fov = Some(fov);
        self
    }

    pub fn without_fov(mut self) -> Self {
        self.fov = None;
        self
    }

    /// Same orientation and fov, different location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// All components are finite numbers (NaN/inf poses are never stored)
    pub fn is_finite(&self) -> bool {
        self.location.is_finite()
            && self.rotation.is_finite()
            && self.fov.map_or(true, |f| f.is_finite())
    }
}

impl fmt::Display for CameraPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} P:{:.1}° Y:{:.1}° R:{:.1}°",
            self.location, self.rotation.pitch, self.rotation.yaw, self.rotation.roll
        )?;
        if let Some(fov) = self.fov {
            write!(f, " FOV:{:.1}°", fov)?;
        }
        Ok(())
    }
}

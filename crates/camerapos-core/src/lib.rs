//! camerapos core - Camera pose types, level keys, and the pose store
//!
//! This crate provides the host-independent pieces of editor camera position
//! persistence:
//! - Camera pose value types and the clipboard text format for locations
//! - Level key derivation from level paths
//! - The pose store trait with in-memory and JSON file implementations
//! - The viewport accessor trait the host implements

pub mod level;
pub mod pose;
pub mod store;
pub mod viewport;

pub use level::LevelKey;
pub use pose::{Axis, CameraPose, Location, ParseLocationError, Rotation};
pub use store::{JsonPoseStore, MemoryPoseStore, PoseStore, StoreEntry, StoreError};
pub use viewport::{MockViewport, ViewportAccessor, ViewportError};

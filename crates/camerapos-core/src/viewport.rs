//! Access to the live editor viewport camera
//!
//! The host supplies the implementation. Everything in this workspace reaches
//! the camera only through [`ViewportAccessor`], so the state machine can be
//! driven against [`MockViewport`] in tests.

use thiserror::Error;

use crate::pose::CameraPose;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewportError {
    #[error("No active editor viewport")]
    NoActiveViewport,
}

/// Read and write the camera transform of the active editor viewport
pub trait ViewportAccessor {
    /// Current camera pose of the active viewport
    fn pose(&self) -> Result<CameraPose, ViewportError>;

    /// Move the active viewport camera to `pose`. A pose without a field of
    /// view leaves the viewport's current field of view unchanged.
    fn set_pose(&mut self, pose: &CameraPose) -> Result<(), ViewportError>;
}

impl<T: ViewportAccessor + ?Sized> ViewportAccessor for &mut T {
    fn pose(&self) -> Result<CameraPose, ViewportError> {
        (**self).pose()
    }

    fn set_pose(&mut self, pose: &CameraPose) -> Result<(), ViewportError> {
        (**self).set_pose(pose)
    }
}

impl<T: ViewportAccessor + ?Sized> ViewportAccessor for Box<T> {
    fn pose(&self) -> Result<CameraPose, ViewportError> {
        (**self).pose()
    }

    fn set_pose(&mut self, pose: &CameraPose) -> Result<(), ViewportError> {
        (**self).set_pose(pose)
    }
}

/// In-memory viewport for tests and headless hosts
#[derive(Debug, Clone, Default)]
pub struct MockViewport {
    camera: Option<CameraPose>,
    applied: usize,
}

impl MockViewport {
    /// An active viewport with its camera at `pose`
    pub fn new(pose: CameraPose) -> Self {
        Self {
            camera: Some(pose),
            applied: 0,
        }
    }

    /// No active viewport (headless or secondary-viewport-only context)
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Simulate the user flying the camera somewhere
    pub fn move_to(&mut self, pose: CameraPose) {
        self.camera = Some(pose);
    }

    /// Close the viewport
    pub fn deactivate(&mut self) {
        self.camera = None;
    }

    pub fn camera(&self) -> Option<CameraPose> {
        self.camera
    }

    /// Number of successful `set_pose` calls
    pub fn applied_count(&self) -> usize {
        self.applied
    }
}

impl ViewportAccessor for MockViewport {
    fn pose(&self) -> Result<CameraPose, ViewportError> {
        self.camera.ok_or(ViewportError::NoActiveViewport)
    }

    fn set_pose(&mut self, pose: &CameraPose) -> Result<(), ViewportError> {
        match self.camera.as_mut() {
            Some(camera) => {
                let fov = pose.fov.or(camera.fov);
                *camera = CameraPose { fov, ..*pose };
                self.applied += 1;
                Ok(())
            }
            None => Err(ViewportError::NoActiveViewport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Location, Rotation};

    #[test]
    fn test_mock_viewport() {
        let start = CameraPose::new(Location::new(0.0, 0.0, 100.0), Rotation::default());
        let mut viewport = MockViewport::new(start);
        assert_eq!(viewport.pose().unwrap(), start);

        let target = CameraPose::new(Location::new(5.0, 5.0, 5.0), Rotation::new(0.0, 90.0, 0.0));
        viewport.set_pose(&target).unwrap();
        assert_eq!(viewport.pose().unwrap(), target);
        assert_eq!(viewport.applied_count(), 1);
    }

    #[test]
    fn test_pose_without_fov_keeps_fov() {
        let start = CameraPose::new(Location::default(), Rotation::default()).with_fov(75.0);
        let mut viewport = MockViewport::new(start);

        let target = CameraPose::new(Location::new(1.0, 2.0, 3.0), Rotation::default());
        viewport.set_pose(&target).unwrap();
        assert_eq!(viewport.pose().unwrap(), target.with_fov(75.0));
    }

    #[test]
    fn test_inactive_viewport() {
        let mut viewport = MockViewport::inactive();
        assert_eq!(viewport.pose(), Err(ViewportError::NoActiveViewport));
        assert_eq!(
            viewport.set_pose(&CameraPose::default()),
            Err(ViewportError::NoActiveViewport)
        );
        assert_eq!(viewport.applied_count(), 0);
    }
}

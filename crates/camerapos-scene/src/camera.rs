//! Editor camera marker and the viewport adapter over its transform

use bevy::math::EulerRot;
use bevy::prelude::*;
use camerapos_core::{CameraPose, Location, Rotation, ViewportAccessor, ViewportError};

/// Marker component for the camera the editor viewport renders through
#[derive(Component, Debug, Default)]
pub struct EditorCamera;

/// Query over the editor camera's transform and projection
pub type EditorCameraQuery<'w, 's> = Query<
    'w,
    's,
    (&'static mut Transform, Option<&'static mut Projection>),
    With<EditorCamera>,
>;

/// [`ViewportAccessor`] over the single [`EditorCamera`] entity
///
/// Zero or several editor cameras count as no active viewport.
pub struct QueryViewport<'a, 'w, 's> {
    cameras: &'a mut EditorCameraQuery<'w, 's>,
}

impl<'a, 'w, 's> QueryViewport<'a, 'w, 's> {
    pub fn new(cameras: &'a mut EditorCameraQuery<'w, 's>) -> Self {
        Self { cameras }
    }
}

impl ViewportAccessor for QueryViewport<'_, '_, '_> {
    fn pose(&self) -> Result<CameraPose, ViewportError> {
        let (transform, projection) = self
            .cameras
            .single()
            .map_err(|_| ViewportError::NoActiveViewport)?;
        Ok(pose_from_transform(transform, projection))
    }

    fn set_pose(&mut self, pose: &CameraPose) -> Result<(), ViewportError> {
        let (mut transform, projection) = self
            .cameras
            .single_mut()
            .map_err(|_| ViewportError::NoActiveViewport)?;
        apply_pose(pose, &mut transform);

        if let (Some(fov), Some(mut projection)) = (pose.fov, projection) {
            if let Projection::Perspective(perspective) = &mut *projection {
                perspective.fov = (fov as f32).to_radians();
            }
        }
        Ok(())
    }
}

/// Read a pose from a camera transform
///
/// Rotation is yaw about +Y, then pitch about the local X axis, then roll;
/// all in degrees. Only perspective cameras report a field of view.
pub fn pose_from_transform(transform: &Transform, projection: Option<&Projection>) -> CameraPose {
    let t = transform.translation;
    let (yaw, pitch, roll) = transform.rotation.to_euler(EulerRot::YXZ);
    let pose = CameraPose::new(
        Location::new(f64::from(t.x), f64::from(t.y), f64::from(t.z)),
        Rotation::new(
            f64::from(pitch.to_degrees()),
            f64::from(yaw.to_degrees()),
            f64::from(roll.to_degrees()),
        ),
    );

    match projection {
        Some(Projection::Perspective(perspective)) => {
            pose.with_fov(f64::from(perspective.fov.to_degrees()))
        }
        _ => pose,
    }
}

/// Move a camera transform to a pose's location and orientation
pub fn apply_pose(pose: &CameraPose, transform: &mut Transform) {
    let l = pose.location;
    let r = pose.rotation;
    transform.translation = Vec3::new(l.x as f32, l.y as f32, l.z as f32);
    transform.rotation = Quat::from_euler(
        EulerRot::YXZ,
        (r.yaw as f32).to_radians(),
        (r.pitch as f32).to_radians(),
        (r.roll as f32).to_radians(),
    );
}

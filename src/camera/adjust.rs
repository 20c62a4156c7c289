use glam::DVec3;

use crate::story::model::{CameraData, ProjectionMode};

/// Distance scale the viewer applies to the eye offset for a given field of view.
///
/// Requires `fov` in `(0, π)`; at `fov = 0` the factor is infinite.
pub fn fov_distance_factor(mode: ProjectionMode, fov: f64) -> f64 {
    match mode {
        ProjectionMode::Perspective => 1.0 / (2.0 * (fov / 2.0).sin()),
        ProjectionMode::Orthographic => 1.0 / (2.0 * (fov / 2.0).tan()),
    }
}

/// Camera position to store in a snapshot so that the viewer's FOV-aware
/// centering reproduces `camera.position` on load.
///
/// Precondition: `camera.fov` lies in `(0, π)` (checked by [`crate::Story::validate`]).
pub fn adjusted_camera_position(camera: &CameraData) -> [f64; 3] {
    let f = fov_distance_factor(camera.mode, camera.fov);
    let target = DVec3::from_array(camera.target);
    let delta = DVec3::from_array(camera.position) - target;
    (target + delta * (1.0 / f)).to_array()
}

/// The viewer's forward transform: scale the eye offset from `target` by the FOV factor.
pub fn fov_centered_position(
    mode: ProjectionMode,
    fov: f64,
    target: [f64; 3],
    position: [f64; 3],
) -> [f64; 3] {
    let f = fov_distance_factor(mode, fov);
    let target = DVec3::from_array(target);
    let delta = DVec3::from_array(position) - target;
    (target + delta * f).to_array()
}

#[cfg(test)]
#[path = "../../tests/unit/camera/adjust.rs"]
mod tests;

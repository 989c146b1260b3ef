//! The overlay sink contract.
//!
//! The core never owns rendering state. It hands finished meshes to a sink,
//! which is single-writer: a publish replaces the mesh first and only then
//! flips visibility, so a renderer never sees a half-updated patch.

use glam::{Quat, Vec3};
use patchcarve_core::PatchMesh;

/// Receiver for segmentation results, usually a renderable overlay object.
pub trait OverlaySink {
    /// Replaces the overlay mesh.
    fn set_mesh(&mut self, mesh: PatchMesh);

    /// Shows or hides the overlay.
    fn set_visible(&mut self, visible: bool);

    /// Places the overlay in the world.
    fn set_transform(&mut self, position: Vec3, rotation: Quat);
}

/// Publishes an attempt's result: a mesh is swapped in and shown, `None`
/// hides the overlay and leaves the previous mesh in place.
///
/// Patch vertices are already in world space, so the transform is reset to
/// identity along with the mesh.
pub fn publish<S: OverlaySink + ?Sized>(sink: &mut S, mesh: Option<PatchMesh>) {
    match mesh {
        Some(mesh) => {
            sink.set_mesh(mesh);
            sink.set_transform(Vec3::ZERO, Quat::IDENTITY);
            sink.set_visible(true);
        }
        None => sink.set_visible(false),
    }
}

/// In-memory overlay, useful for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    mesh: Option<PatchMesh>,
    visible: bool,
    position: Vec3,
    rotation: Quat,
    revision: u64,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last mesh received, if any.
    pub fn mesh(&self) -> Option<&PatchMesh> {
        self.mesh.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Number of meshes received so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl OverlaySink for OverlayState {
    fn set_mesh(&mut self, mesh: PatchMesh) {
        self.mesh = Some(mesh);
        self.revision += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_transform(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }
}

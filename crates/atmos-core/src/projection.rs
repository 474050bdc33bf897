//! Fixed two-axis camera projection from room space to screen pixels.
//!
//! Points are rotated by yaw about the vertical axis, then by pitch about
//! the resulting horizontal axis. After rotation `+x` is screen right, `+y`
//! screen up and `+z` points towards the viewer; view depth is
//! `camera_distance - z`.

use crate::camera::CameraMode;
use crate::config::ProjectionPolicy;
use crate::constants::*;
use crate::layout::RoomDimensions;
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Dimensions are floored at one pixel.
    pub fn new(width: f32, height: f32) -> Self {
        let floor = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self {
            width: floor(width),
            height: floor(height),
        }
    }

    #[inline]
    pub fn centre(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    #[inline]
    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height).max(1.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1000.0, 650.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPoint {
    pub screen: Vec2,
    pub depth: f32,
    /// False when an inside-camera point lies in front of the near plane.
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    cos_yaw: f32,
    sin_yaw: f32,
    cos_pitch: f32,
    sin_pitch: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let (sin_pitch, cos_pitch) = pitch.sin_cos();
        Self {
            cos_yaw,
            sin_yaw,
            cos_pitch,
            sin_pitch,
        }
    }

    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let x1 = p.x * self.cos_yaw - p.z * self.sin_yaw;
        let z1 = p.x * self.sin_yaw + p.z * self.cos_yaw;
        let y2 = p.y * self.cos_pitch - z1 * self.sin_pitch;
        let z2 = p.y * self.sin_pitch + z1 * self.cos_pitch;
        Vec3::new(x1, y2, z2)
    }
}

/// One frame's projection. Cheap to build; rebuilt on every paint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    mode: CameraMode,
    rotation: Rotation,
    centre: Vec2,
    scale: f32,
    camera_distance: f32,
    near_plane: f32,
}

impl Projection {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mode: CameraMode,
        yaw: f32,
        pitch: f32,
        camera_distance: f32,
        zoom: f32,
        viewport: Viewport,
        room: &RoomDimensions,
        policy: &ProjectionPolicy,
    ) -> Self {
        let rotation = Rotation::new(yaw, pitch);
        let min_dimension = viewport.min_dimension();
        let scale = match mode {
            CameraMode::Inside => min_dimension * policy.inside_fill,
            CameraMode::Outside => {
                let max_extent = room.corners().iter().fold(0.0f32, |acc, &corner| {
                    let r = rotation.apply(corner);
                    acc.max(r.x.abs()).max(r.y.abs())
                });
                let base = if max_extent < EXTENT_EPSILON {
                    min_dimension * policy.outside_fill
                } else {
                    min_dimension * policy.outside_fill / max_extent
                };
                base * zoom
            }
        };
        Self {
            mode,
            rotation,
            centre: viewport.centre(),
            scale,
            camera_distance,
            near_plane: policy.near_plane.depth(camera_distance),
        }
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn centre(&self) -> Vec2 {
        self.centre
    }

    #[inline]
    pub fn camera_distance(&self) -> f32 {
        self.camera_distance
    }

    #[inline]
    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    #[inline]
    pub fn rotate(&self, p: Vec3) -> Vec3 {
        self.rotation.apply(p)
    }

    fn project_rotated(&self, r: Vec3) -> ProjectedPoint {
        let depth = self.camera_distance - r.z;
        let (factor, visible) = match self.mode {
            CameraMode::Outside => (1.0, true),
            CameraMode::Inside => (
                self.camera_distance / depth.max(self.near_plane),
                depth >= self.near_plane,
            ),
        };
        ProjectedPoint {
            screen: Vec2::new(
                self.centre.x + r.x * self.scale * factor,
                self.centre.y - r.y * self.scale * factor,
            ),
            depth,
            visible,
        }
    }

    pub fn project(&self, point: Vec3) -> ProjectedPoint {
        self.project_rotated(self.rotation.apply(point))
    }

    /// Screen-space unit orientation of a room-space direction; straight
    /// down-screen when the direction is degenerate or points at the viewer.
    pub fn project_direction(&self, direction: Vec3) -> Vec2 {
        let r = self.rotation.apply(direction);
        let dir = Vec2::new(r.x, -r.y);
        let len = dir.length();
        if len > 1.0e-4 {
            dir / len
        } else {
            Vec2::from(DEFAULT_ORIENTATION)
        }
    }

    /// Both endpoints of a room-space segment. For the inside camera the
    /// segment is cut at the near plane; `None` when it lies fully behind.
    pub fn clip_segment(&self, a: Vec3, b: Vec3) -> Option<(ProjectedPoint, ProjectedPoint)> {
        let ra = self.rotation.apply(a);
        let rb = self.rotation.apply(b);
        if self.mode == CameraMode::Outside {
            return Some((self.project_rotated(ra), self.project_rotated(rb)));
        }
        let da = self.camera_distance - ra.z;
        let db = self.camera_distance - rb.z;
        let near = self.near_plane;
        match (da >= near, db >= near) {
            (true, true) => Some((self.project_rotated(ra), self.project_rotated(rb))),
            (false, false) => None,
            (a_in, _) => {
                let t = (near - da) / (db - da);
                let cut = ra + (rb - ra) * t;
                let mut clipped = self.project_rotated(cut);
                clipped.visible = true;
                if a_in {
                    Some((self.project_rotated(ra), clipped))
                } else {
                    Some((clipped, self.project_rotated(rb)))
                }
            }
        }
    }

    /// True when the wall with this outward normal shows its inner surface,
    /// i.e. the normal's view component points away from the viewer.
    #[inline]
    pub fn shows_inner_face(&self, outward_normal: Vec3) -> bool {
        self.rotation.apply(outward_normal).z < 0.0
    }
}

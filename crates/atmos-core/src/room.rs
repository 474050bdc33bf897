//! Room wireframe and axis gizmo.

use crate::camera::CameraMode;
use crate::color::{Rgba, AXIS_X, AXIS_Y, AXIS_Z, DARK_SLATE_GREY, WHITESMOKE};
use crate::constants::GIZMO_AXIS_LENGTH;
use crate::draw::{DrawList, Paint};
use crate::layout::RoomDimensions;
use crate::projection::Projection;
use glam::{Vec2, Vec3};

/// Corner index pairs, see [`RoomDimensions::corners`].
pub const ROOM_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 3),
    (3, 2),
    (2, 0),
    (4, 5),
    (5, 7),
    (7, 6),
    (6, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Corner quads: front, rear, floor, ceiling, right, left.
pub const ROOM_FACES: [[usize; 4]; 6] = [
    [0, 1, 3, 2],
    [4, 6, 7, 5],
    [0, 4, 5, 1],
    [2, 3, 7, 6],
    [1, 5, 7, 3],
    [0, 2, 6, 4],
];

pub const FACE_NORMALS: [Vec3; 6] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::NEG_Y,
    Vec3::Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

/// The two faces sharing each edge of [`ROOM_EDGES`].
pub const EDGE_FACES: [(usize, usize); 12] = [
    (0, 2),
    (0, 4),
    (0, 3),
    (0, 5),
    (1, 2),
    (1, 4),
    (1, 3),
    (1, 5),
    (2, 5),
    (2, 4),
    (3, 5),
    (3, 4),
];

const EDGE_WIDTH: f32 = 3.0;
const HIDDEN_DASH: [f32; 2] = [8.0, 5.5];

#[derive(Clone, Debug)]
pub struct RoomRenderer {
    corners: [Vec3; 8],
}

impl RoomRenderer {
    pub fn new(room: RoomDimensions) -> Self {
        Self {
            corners: room.corners(),
        }
    }

    /// Per-face visibility for the outside camera.
    pub fn visible_faces(&self, projection: &Projection) -> [bool; 6] {
        FACE_NORMALS.map(|n| projection.shows_inner_face(n))
    }

    /// Edges bordering at least one visible face.
    pub fn solid_edges(&self, projection: &Projection) -> [bool; 12] {
        let faces = self.visible_faces(projection);
        EDGE_FACES.map(|(a, b)| faces[a] || faces[b])
    }

    pub fn draw(&self, projection: &Projection, out: &mut DrawList) {
        match projection.mode() {
            CameraMode::Outside => self.draw_outside(projection, out),
            CameraMode::Inside => self.draw_inside(projection, out),
        }
    }

    fn draw_outside(&self, projection: &Projection, out: &mut DrawList) {
        let screen = self.corners.map(|c| projection.project(c).screen);
        let solid = self.solid_edges(projection);

        // Hidden edges first so solid ones overdraw them.
        let hidden = Paint::Stroke {
            colour: DARK_SLATE_GREY.with_alpha(0.55),
            width: EDGE_WIDTH,
            dash: Some(HIDDEN_DASH),
        };
        for (&(a, b), _) in ROOM_EDGES.iter().zip(solid).filter(|(_, s)| !*s) {
            out.line(screen[a], screen[b], hidden);
        }
        let visible = Paint::stroke(WHITESMOKE.with_alpha(0.85), EDGE_WIDTH);
        for (&(a, b), _) in ROOM_EDGES.iter().zip(solid).filter(|(_, s)| *s) {
            out.line(screen[a], screen[b], visible);
        }
    }

    fn draw_inside(&self, projection: &Projection, out: &mut DrawList) {
        let paint = Paint::stroke(WHITESMOKE.with_alpha(0.9), EDGE_WIDTH);
        for &(a, b) in &ROOM_EDGES {
            if let Some((pa, pb)) = projection.clip_segment(self.corners[a], self.corners[b]) {
                out.line(pa.screen, pb.screen, paint);
            }
        }
    }

    /// X/Y/Z axes from the room origin, labelled at their tips.
    pub fn draw_gizmo(&self, projection: &Projection, out: &mut DrawList) {
        let width = match projection.mode() {
            CameraMode::Inside => 3.0,
            CameraMode::Outside => 2.2,
        };
        let axes: [(Vec3, Rgba, &str); 3] = [
            (Vec3::X, AXIS_X, "X"),
            (Vec3::Y, AXIS_Y, "Y"),
            (Vec3::Z, AXIS_Z, "Z"),
        ];
        for (axis, colour, label) in axes {
            let Some((origin, tip)) = projection.clip_segment(Vec3::ZERO, axis * GIZMO_AXIS_LENGTH)
            else {
                continue;
            };
            out.line(origin.screen, tip.screen, Paint::stroke(colour.with_alpha(0.9), width));
            out.text(
                tip.screen - Vec2::new(20.0, 14.0),
                Vec2::new(40.0, 18.0),
                label,
                colour.with_alpha(0.85),
            );
        }
    }
}

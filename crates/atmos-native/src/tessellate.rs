//! Draw list -> coloured triangle list in screen pixels.

use atmos_core::{DrawList, Paint, Rgba, Shape};
use glam::Vec2;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

const ELLIPSE_SEGMENTS: usize = 32;

#[derive(Default)]
pub struct Tessellator {
    vertices: Vec<Vertex>,
}

impl Tessellator {
    /// Rebuilds the triangle list. Text is left to a font-aware overlay.
    pub fn build(&mut self, list: &DrawList) -> &[Vertex] {
        self.vertices.clear();
        for cmd in list.commands() {
            match (&cmd.shape, cmd.paint) {
                (Shape::Polygon(points), Paint::Fill(colour)) => self.fill_convex(points, colour),
                (Shape::Polygon(points), Paint::Stroke { colour, width, dash }) => {
                    for (i, &a) in points.iter().enumerate() {
                        let b = points[(i + 1) % points.len()];
                        self.stroke_segment(a, b, colour, width, dash);
                    }
                }
                (
                    Shape::Ellipse {
                        centre,
                        radii,
                        rotation,
                    },
                    paint,
                ) => {
                    let outline = ellipse_outline(*centre, *radii, *rotation);
                    match paint {
                        Paint::Fill(colour) => self.fill_convex(&outline, colour),
                        Paint::Stroke { colour, width, dash } => {
                            for i in 0..outline.len() {
                                let b = outline[(i + 1) % outline.len()];
                                self.stroke_segment(outline[i], b, colour, width, dash);
                            }
                        }
                    }
                }
                (Shape::Line { from, to }, Paint::Stroke { colour, width, dash }) => {
                    self.stroke_segment(*from, *to, colour, width, dash)
                }
                (Shape::Line { from, to }, Paint::Fill(colour)) => {
                    self.stroke_segment(*from, *to, colour, 1.0, None)
                }
                // No font renderer here; labels are left to hosts that have one.
                (Shape::Text { .. }, _) => {}
            }
        }
        &self.vertices
    }

    fn push(&mut self, p: Vec2, colour: Rgba) {
        self.vertices.push(Vertex {
            pos: p.to_array(),
            color: colour.to_array(),
        });
    }

    fn fill_convex(&mut self, points: &[Vec2], colour: Rgba) {
        if points.len() < 3 {
            return;
        }
        for i in 1..points.len() - 1 {
            self.push(points[0], colour);
            self.push(points[i], colour);
            self.push(points[i + 1], colour);
        }
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2, colour: Rgba, width: f32, dash: Option<[f32; 2]>) {
        let Some([on, off]) = dash.filter(|[on, off]| *on > 0.0 && *off >= 0.0) else {
            self.quad(a, b, colour, width);
            return;
        };
        let length = a.distance(b);
        if length <= f32::EPSILON {
            return;
        }
        let dir = (b - a) / length;
        let mut t = 0.0;
        while t < length {
            let end = (t + on).min(length);
            self.quad(a + dir * t, a + dir * end, colour, width);
            t = end + off;
        }
    }

    fn quad(&mut self, a: Vec2, b: Vec2, colour: Rgba, width: f32) {
        let d = b - a;
        let len = d.length();
        if len <= f32::EPSILON {
            return;
        }
        let n = Vec2::new(-d.y, d.x) / len * (width * 0.5);
        let (p0, p1, p2, p3) = (a + n, a - n, b - n, b + n);
        for p in [p0, p1, p2, p0, p2, p3] {
            self.push(p, colour);
        }
    }
}

fn ellipse_outline(centre: Vec2, radii: Vec2, rotation: f32) -> [Vec2; ELLIPSE_SEGMENTS] {
    let (sin_r, cos_r) = rotation.sin_cos();
    std::array::from_fn(|i| {
        let theta = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
        let local = Vec2::new(theta.cos() * radii.x, theta.sin() * radii.y);
        centre + Vec2::new(local.x * cos_r - local.y * sin_r, local.x * sin_r + local.y * cos_r)
    })
}

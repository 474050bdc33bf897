//! Toolkit-neutral output of a paint pass.
//!
//! Commands are in painter's order: later commands draw over earlier ones.

use crate::color::Rgba;
use glam::Vec2;
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Closed convex polygon in screen pixels.
    Polygon(SmallVec<[Vec2; 4]>),
    Ellipse {
        centre: Vec2,
        radii: Vec2,
        /// Radians, rotating the `radii.x` axis from screen right.
        rotation: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
    },
    /// Top-left anchored label box.
    Text {
        origin: Vec2,
        size: Vec2,
        text: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Fill(Rgba),
    Stroke {
        colour: Rgba,
        width: f32,
        /// `[on, off]` lengths in pixels.
        dash: Option<[f32; 2]>,
    },
}

impl Paint {
    #[inline]
    pub fn stroke(colour: Rgba, width: f32) -> Self {
        Paint::Stroke {
            colour,
            width,
            dash: None,
        }
    }

    #[inline]
    pub fn colour(&self) -> Rgba {
        match *self {
            Paint::Fill(c) => c,
            Paint::Stroke { colour, .. } => colour,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub paint: Paint,
}

#[derive(Clone, Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the allocation for the next frame.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, shape: Shape, paint: Paint) {
        self.commands.push(DrawCommand { shape, paint });
    }

    pub fn polygon(&mut self, points: &[Vec2], paint: Paint) {
        self.push(Shape::Polygon(SmallVec::from_slice(points)), paint);
    }

    pub fn ellipse(&mut self, centre: Vec2, radii: Vec2, rotation: f32, paint: Paint) {
        self.push(
            Shape::Ellipse {
                centre,
                radii,
                rotation,
            },
            paint,
        );
    }

    pub fn circle(&mut self, centre: Vec2, radius: f32, paint: Paint) {
        self.ellipse(centre, Vec2::splat(radius), 0.0, paint);
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, paint: Paint) {
        self.push(Shape::Line { from, to }, paint);
    }

    pub fn text(&mut self, origin: Vec2, size: Vec2, text: impl Into<String>, colour: Rgba) {
        self.push(
            Shape::Text {
                origin,
                size,
                text: text.into(),
            },
            Paint::Fill(colour),
        );
    }

    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

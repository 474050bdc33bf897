//! Radiated-level lattice for the heatmap mode.

use crate::color::colour_for_level;
use crate::constants::*;
use crate::draw::{DrawList, Paint};
use crate::layout::{RoomDimensions, SpeakerDefinition};
use crate::projection::Projection;
use crate::snapshot::SpeakerMetrics;
use glam::Vec3;

#[derive(Clone, Copy, Debug)]
struct Emitter {
    position: Vec3,
    /// Zero for omnidirectional sources.
    aim: Vec3,
    amplitude: f32,
}

#[derive(Clone, Debug)]
pub struct HeatmapGrid {
    density: u8,
    points: Vec<Vec3>,
    levels: Vec<f32>,
    emitters: Vec<Emitter>,
    running_max: f32,
}

/// Lattice steps `(depth, width, height)` for a density level, clamped
/// to the supported range.
pub fn lattice_resolution(density: u8) -> (usize, usize, usize) {
    let index = (density.max(1) as usize - 1).min(HEATMAP_DENSITY_TABLE.len() - 1);
    HEATMAP_DENSITY_TABLE[index]
}

fn spread(step: usize, steps: usize, lo: f32, hi: f32) -> f32 {
    if steps < 2 {
        return (lo + hi) * 0.5;
    }
    lo + (hi - lo) * step as f32 / (steps - 1) as f32
}

impl HeatmapGrid {
    pub fn new(room: &RoomDimensions, density: u8) -> Self {
        let mut grid = Self {
            density,
            points: Vec::new(),
            levels: Vec::new(),
            emitters: Vec::new(),
            running_max: 0.0,
        };
        grid.rebuild(room, density);
        grid
    }

    /// Regenerates the lattice and forgets the running maximum.
    pub fn rebuild(&mut self, room: &RoomDimensions, density: u8) {
        let density = density.clamp(1, HEATMAP_DENSITY_TABLE.len() as u8);
        let (depth_steps, width_steps, height_steps) = lattice_resolution(density);
        let half_depth = room.depth * 0.5 * HEATMAP_PLAN_SPAN;
        let half_width = room.width * 0.5 * HEATMAP_PLAN_SPAN;
        let bottom = room.floor_y() + HEATMAP_VERTICAL_INSET;
        let top = room.ceiling_y() - HEATMAP_VERTICAL_INSET;

        self.points.clear();
        self.points.reserve(depth_steps * width_steps * height_steps);
        for y in 0..height_steps {
            let fy = spread(y, height_steps, bottom, top);
            for z in 0..width_steps {
                let fz = spread(z, width_steps, -half_width, half_width);
                for x in 0..depth_steps {
                    let fx = spread(x, depth_steps, -half_depth, half_depth);
                    self.points.push(Vec3::new(fx, fy, fz));
                }
            }
        }
        self.levels.clear();
        self.levels.resize(self.points.len(), 0.0);
        self.density = density;
        self.running_max = 0.0;
        log::debug!(
            "[heatmap] density {} -> {} sample points",
            density,
            self.points.len()
        );
    }

    #[inline]
    pub fn density(&self) -> u8 {
        self.density
    }

    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Levels from the most recent `evaluate`.
    #[inline]
    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    #[inline]
    pub fn running_max(&self) -> f32 {
        self.running_max
    }

    /// Sums `amplitude * directivity / distance²` over every sounding
    /// speaker at each lattice point, then folds the frame maximum into the
    /// decayed running maximum. Returns the normaliser for this frame.
    pub fn evaluate<'a, I>(&mut self, sources: I) -> f32
    where
        I: IntoIterator<Item = (&'a SpeakerDefinition, &'a SpeakerMetrics)>,
    {
        self.emitters.clear();
        for (def, metrics) in sources {
            let amplitude = metrics.rms.clamp(0.0, 1.0);
            if amplitude <= HEATMAP_AMPLITUDE_EPSILON {
                continue;
            }
            let aim = if def.is_lfe {
                Vec3::ZERO
            } else {
                def.aim_direction.normalize_or_zero()
            };
            self.emitters.push(Emitter {
                position: def.position,
                aim,
                amplitude,
            });
        }

        let mut frame_max = 0.0f32;
        for (point, level) in self.points.iter().zip(self.levels.iter_mut()) {
            let mut sum = 0.0f32;
            for e in &self.emitters {
                let delta = *point - e.position;
                let length = delta.length();
                let distance = length.max(HEATMAP_MIN_DISTANCE);
                let directivity = if e.aim == Vec3::ZERO || length <= 1.0e-4 {
                    1.0
                } else {
                    e.aim.dot(delta / length).max(0.0)
                };
                sum += e.amplitude * directivity / (distance * distance);
            }
            *level = sum;
            frame_max = frame_max.max(sum);
        }

        self.running_max = (self.running_max * HEATMAP_MAX_DECAY).max(frame_max);
        self.running_max.max(HEATMAP_NORMALISER_FLOOR)
    }

    /// One dot per visible lattice point with a non-negligible level.
    pub fn draw(&self, projection: &Projection, normaliser: f32, scale: f32, out: &mut DrawList) {
        for (point, &level) in self.points.iter().zip(&self.levels) {
            if level <= HEATMAP_LEVEL_EPSILON {
                continue;
            }
            let projected = projection.project(*point);
            if !projected.visible {
                continue;
            }
            let (diameter, alpha) = dot_style(level, normaliser, scale);
            let colour = colour_for_level(level / normaliser);
            out.circle(projected.screen, diameter * 0.5, Paint::Fill(colour.with_alpha(alpha)));
        }
    }
}

/// Diameter and alpha of a heatmap dot.
pub fn dot_style(level: f32, normaliser: f32, scale: f32) -> (f32, f32) {
    let normalised = (level / normaliser.max(HEATMAP_NORMALISER_FLOOR)).clamp(0.0, 1.0);
    let diameter = 4.0 + (18.0 * scale - 4.0) * normalised;
    let alpha = (normalised * 0.8).clamp(0.08, 0.6);
    (diameter, alpha)
}

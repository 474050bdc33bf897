//! Per-speaker radiation visuals driven by live metrics.
//!
//! Every paint rebuilds the derived [`DisplaySpeaker`] state from the
//! current projection, sorts the speakers far-to-near and emits the active
//! mode followed by the base markers.

use crate::color::{colour_for_bands, BandWeights, Rgba, WHITE};
use crate::config::VizConfig;
use crate::constants::*;
use crate::draw::{DrawList, Paint};
use crate::heatmap::HeatmapGrid;
use crate::layout::{RoomDimensions, SpeakerDefinition, SpeakerLayout};
use crate::projection::Projection;
use crate::snapshot::SpeakerMetrics;
use glam::{Vec2, Vec3};
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VisualizationMode {
    #[default]
    DirectionalLobes,
    LayeredLobes,
    DirectivityBalloon,
    RadiationHeatmap,
    TemporalTrail,
}

impl VisualizationMode {
    pub const ALL: [Self; 5] = [
        Self::DirectionalLobes,
        Self::LayeredLobes,
        Self::DirectivityBalloon,
        Self::RadiationHeatmap,
        Self::TemporalTrail,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DirectionalLobes => "Directional Lobes",
            Self::LayeredLobes => "Layered Lobes",
            Self::DirectivityBalloon => "Directivity Balloon",
            Self::RadiationHeatmap => "Radiation Heatmap",
            Self::TemporalTrail => "Temporal Trail",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Bounded FIFO of recent screen positions.
#[derive(Clone, Debug)]
pub struct TrailHistory {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl TrailHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Skips points closer than `TRAIL_MIN_STEP` to the newest entry.
    /// Returns whether the point was stored.
    pub fn push(&mut self, point: Vec2) -> bool {
        if let Some(last) = self.points.back() {
            if last.distance(point) < TRAIL_MIN_STEP {
                return false;
            }
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        true
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &Vec2> + '_ {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[derive(Clone, Debug)]
pub struct DisplaySpeaker {
    pub definition: SpeakerDefinition,
    pub metrics: SpeakerMetrics,
    pub projected: Vec2,
    /// Unit screen-space aim.
    pub orientation: Vec2,
    pub depth: f32,
    pub visible: bool,
    pub max_reach_screen: f32,
    pub max_reach_world: f32,
    pub trail: TrailHistory,
}

impl DisplaySpeaker {
    fn new(definition: SpeakerDefinition, trail_capacity: usize) -> Self {
        Self {
            definition,
            metrics: SpeakerMetrics::default(),
            projected: Vec2::ZERO,
            orientation: Vec2::from(DEFAULT_ORIENTATION),
            depth: 0.0,
            visible: true,
            max_reach_screen: MIN_REACH_SCREEN,
            max_reach_world: 0.0,
            trail: TrailHistory::new(trail_capacity),
        }
    }

    #[inline]
    pub fn visual_level(&self) -> f32 {
        self.metrics.visual_level()
    }

    fn update(&mut self, projection: &Projection, room: &RoomDimensions) {
        let def = &self.definition;
        let p = projection.project(def.position);
        self.projected = p.screen;
        self.depth = p.depth;
        self.visible = p.visible;

        let aim_len = def.aim_direction.length();
        if aim_len <= RAY_EPSILON {
            let to_centre = -def.position;
            let dir = if to_centre.length() > RAY_EPSILON {
                to_centre.normalize()
            } else {
                Vec3::X
            };
            self.max_reach_world = room.diagonal() * 0.5;
            let end = projection.project(def.position + dir * self.max_reach_world);
            self.max_reach_screen = end.screen.distance(self.projected).max(DEGENERATE_MIN_REACH_SCREEN);
        } else {
            let aim = def.aim_direction / aim_len;
            self.max_reach_world = distance_to_room_boundary(room, def.position, aim);
            let end = projection.project(def.position + aim * self.max_reach_world);
            self.max_reach_screen = end.screen.distance(self.projected).max(MIN_REACH_SCREEN);
        }

        self.orientation = if def.is_lfe {
            Vec2::from(DEFAULT_ORIENTATION)
        } else {
            projection.project_direction(def.aim_direction)
        };
        self.trail.push(self.projected);
    }
}

/// Distance along `direction` (unit) from `position` to the first room wall.
/// Falls back to the room diagonal when no wall is ahead.
pub fn distance_to_room_boundary(room: &RoomDimensions, position: Vec3, direction: Vec3) -> f32 {
    let (min, max) = room.bounds();
    let mut closest = f32::INFINITY;
    for axis in 0..3 {
        let dir = direction[axis];
        if dir.abs() < RAY_EPSILON {
            continue;
        }
        let bound = if dir > 0.0 { max[axis] } else { min[axis] };
        let t = (bound - position[axis]) / dir;
        if t > RAY_EPSILON {
            closest = closest.min(t);
        }
    }
    if !closest.is_finite() {
        closest = room.diagonal();
    }
    closest.max(RAY_EPSILON)
}

/// Screen length of a radiation indicator: a fixed share of the full reach
/// at silence, the full reach at level 1.
pub fn reach_for_level(max_reach_screen: f32, scale: f32, level: f32, shaping: f32) -> f32 {
    let shaped = level.clamp(0.0, 1.0).powf(shaping);
    let factor = (REACH_FLOOR + (1.0 - REACH_FLOOR) * shaped).clamp(0.0, 1.0);
    max_reach_screen * scale * factor
}

/// `2^(v / 100)` for a slider value clamped to ±100.
pub fn visualization_scale_for(adjustment: f32) -> f32 {
    let v = clamp_adjustment(adjustment);
    2.0f32.powf(v / SCALE_ADJUSTMENT_RANGE)
}

fn clamp_adjustment(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-SCALE_ADJUSTMENT_RANGE, SCALE_ADJUSTMENT_RANGE)
    } else {
        0.0
    }
}

// Lower bound wins when the bounds cross.
#[inline]
fn limit(lo: f32, hi: f32, v: f32) -> f32 {
    if v < lo {
        lo
    } else if hi < v {
        hi
    } else {
        v
    }
}

#[inline]
fn perpendicular(dir: Vec2) -> Vec2 {
    Vec2::new(-dir.y, dir.x)
}

const LAYER_REACH: [f32; 3] = [0.45, 0.75, 1.0];
const LAYER_SPREAD: [f32; 3] = [0.55, 0.85, 1.2];
const LAYER_ALPHA: [f32; 3] = [0.32, 0.22, 0.14];
const SHELL_SCALE: [f32; 3] = [0.55, 0.85, 1.0];
const SHELL_ALPHA: [f32; 3] = [0.26, 0.18, 0.12];

type ModeCallback = Box<dyn FnMut(VisualizationMode)>;
type ScaleCallback = Box<dyn FnMut(f32)>;
type WeightsCallback = Box<dyn FnMut(BandWeights)>;
type DensityCallback = Box<dyn FnMut(u8)>;

pub struct RadiationVisualizer {
    layout: Arc<SpeakerLayout>,
    speakers: Vec<DisplaySpeaker>,
    order: Vec<usize>,
    mode: VisualizationMode,
    scale_adjustment: f32,
    scale: f32,
    band_weights: BandWeights,
    heatmap: HeatmapGrid,
    on_mode_changed: Option<ModeCallback>,
    on_scale_changed: Option<ScaleCallback>,
    on_band_weights_changed: Option<WeightsCallback>,
    on_density_changed: Option<DensityCallback>,
}

impl RadiationVisualizer {
    pub fn new(layout: Arc<SpeakerLayout>, config: &VizConfig) -> Self {
        let speakers: Vec<DisplaySpeaker> = layout
            .speakers()
            .iter()
            .map(|d| DisplaySpeaker::new(d.clone(), config.trail_capacity))
            .collect();
        let order = (0..speakers.len()).collect();
        let heatmap = HeatmapGrid::new(layout.room(), config.heatmap_density);
        let w = config.band_weights;
        Self {
            layout,
            speakers,
            order,
            mode: VisualizationMode::default(),
            scale_adjustment: 0.0,
            scale: 1.0,
            band_weights: BandWeights::new(w.low, w.mid, w.high),
            heatmap,
            on_mode_changed: None,
            on_scale_changed: None,
            on_band_weights_changed: None,
            on_density_changed: None,
        }
    }

    pub fn on_mode_changed(&mut self, callback: impl FnMut(VisualizationMode) + 'static) {
        self.on_mode_changed = Some(Box::new(callback));
    }

    pub fn on_scale_changed(&mut self, callback: impl FnMut(f32) + 'static) {
        self.on_scale_changed = Some(Box::new(callback));
    }

    pub fn on_band_weights_changed(&mut self, callback: impl FnMut(BandWeights) + 'static) {
        self.on_band_weights_changed = Some(Box::new(callback));
    }

    pub fn on_density_changed(&mut self, callback: impl FnMut(u8) + 'static) {
        self.on_density_changed = Some(Box::new(callback));
    }

    #[inline]
    pub fn speakers(&self) -> &[DisplaySpeaker] {
        &self.speakers
    }

    /// Slot indices, farthest first, as of the last `update_projections`.
    #[inline]
    pub fn draw_order(&self) -> &[usize] {
        &self.order
    }

    #[inline]
    pub fn heatmap(&self) -> &HeatmapGrid {
        &self.heatmap
    }

    #[inline]
    pub fn visualization_mode(&self) -> VisualizationMode {
        self.mode
    }

    pub fn set_visualization_mode(&mut self, mode: VisualizationMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        log::debug!("[viz] mode {:?}", mode);
        if let Some(cb) = self.on_mode_changed.as_mut() {
            cb(mode);
        }
    }

    #[inline]
    pub fn visualization_scale_adjustment(&self) -> f32 {
        self.scale_adjustment
    }

    /// Multiplier in `[0.5, 2]` derived from the adjustment.
    #[inline]
    pub fn visualization_scale(&self) -> f32 {
        self.scale
    }

    pub fn set_visualization_scale_adjustment(&mut self, value: f32) {
        let v = clamp_adjustment(value);
        if (v - self.scale_adjustment).abs() < SCALE_ADJUSTMENT_EPSILON {
            return;
        }
        self.scale_adjustment = v;
        self.scale = visualization_scale_for(v);
        if let Some(cb) = self.on_scale_changed.as_mut() {
            cb(v);
        }
    }

    #[inline]
    pub fn band_weights(&self) -> BandWeights {
        self.band_weights
    }

    pub fn set_band_weights(&mut self, weights: BandWeights) {
        let weights = BandWeights::new(weights.low, weights.mid, weights.high);
        if weights == self.band_weights {
            return;
        }
        self.band_weights = weights;
        log::debug!(
            "[viz] band weights {:.2}/{:.2}/{:.2}",
            weights.low,
            weights.mid,
            weights.high
        );
        if let Some(cb) = self.on_band_weights_changed.as_mut() {
            cb(weights);
        }
    }

    #[inline]
    pub fn heatmap_density(&self) -> u8 {
        self.heatmap.density()
    }

    pub fn set_heatmap_density(&mut self, density: u8) {
        let density = density.clamp(1, HEATMAP_DENSITY_TABLE.len() as u8);
        if density == self.heatmap.density() {
            return;
        }
        self.heatmap.rebuild(self.layout.room(), density);
        if let Some(cb) = self.on_density_changed.as_mut() {
            cb(density);
        }
    }

    /// Copies per-slot metrics; extra entries on either side are ignored.
    pub fn update_metrics(&mut self, metrics: &[SpeakerMetrics]) {
        for (speaker, m) in self.speakers.iter_mut().zip(metrics) {
            speaker.metrics = *m;
        }
    }

    pub fn update_projections(&mut self, projection: &Projection) {
        let room = *self.layout.room();
        for speaker in &mut self.speakers {
            speaker.update(projection, &room);
        }
        let speakers = &self.speakers;
        self.order.sort_by(|&a, &b| speakers[b].depth.total_cmp(&speakers[a].depth));
    }

    #[inline]
    fn colour(&self, speaker: &DisplaySpeaker) -> Rgba {
        colour_for_bands(&speaker.metrics.bands, &self.band_weights, speaker.definition.is_lfe)
    }

    /// Emits the active mode and the base markers.
    pub fn draw(&mut self, projection: &Projection, out: &mut DrawList) {
        match self.mode {
            VisualizationMode::DirectionalLobes => self.draw_directional_lobes(out),
            VisualizationMode::LayeredLobes => self.draw_layered_lobes(out),
            VisualizationMode::DirectivityBalloon => self.draw_balloons(out),
            VisualizationMode::RadiationHeatmap => self.draw_heatmap(projection, out),
            VisualizationMode::TemporalTrail => self.draw_trails(out),
        }
        self.draw_base_markers(out);
    }

    fn ordered(&self) -> impl Iterator<Item = &DisplaySpeaker> + '_ {
        self.order
            .iter()
            .map(move |&i| &self.speakers[i])
            .filter(|s| s.visible)
    }

    fn draw_directional_lobes(&self, out: &mut DrawList) {
        for s in self.ordered().filter(|s| !s.definition.is_lfe) {
            let level = s.visual_level();
            let reach = reach_for_level(s.max_reach_screen, self.scale, level, LOBE_SHAPING);
            if reach < 1.5 {
                continue;
            }
            let colour = self.colour(s);
            let dir = s.orientation;
            let spread = limit(12.0, reach * 0.45, reach * 0.85);
            let tail = s.projected - dir * limit(4.0, reach * 0.22, reach * 0.35);
            let perp = perpendicular(dir) * spread;
            let lobe = [
                tail - perp * 0.35,
                tail + perp * 0.35,
                s.projected + dir * reach,
            ];
            out.polygon(&lobe, Paint::Fill(colour.with_alpha(0.4)));
            out.polygon(&lobe, Paint::stroke(colour.with_alpha(0.22), (spread * 0.06).max(1.4)));
        }
    }

    fn draw_layered_lobes(&self, out: &mut DrawList) {
        for s in self.ordered().filter(|s| !s.definition.is_lfe) {
            let level = s.visual_level();
            let base_reach = reach_for_level(s.max_reach_screen, self.scale, level, LAYERED_SHAPING);
            if base_reach < 1.5 {
                continue;
            }
            let colour = self.colour(s);
            let dir = s.orientation;
            let tail = s.projected - dir * limit(3.0, base_reach * 0.18, base_reach * 0.3);
            for layer in 0..LAYER_REACH.len() {
                let reach = base_reach * LAYER_REACH[layer];
                let spread = limit(8.0, reach * LAYER_SPREAD[layer], reach * 1.1);
                let perp = perpendicular(dir) * spread;
                let lobe = [
                    tail - perp * 0.42,
                    tail + perp * 0.42,
                    s.projected + dir * reach,
                ];
                let alpha = (LAYER_ALPHA[layer] + level * 0.28).clamp(0.05, 0.7);
                out.polygon(&lobe, Paint::Fill(colour.with_alpha(alpha)));
                out.polygon(
                    &lobe,
                    Paint::stroke(colour.with_alpha(alpha * 0.55), (spread * 0.045).max(1.2)),
                );
            }
        }
    }

    fn draw_balloons(&self, out: &mut DrawList) {
        for s in self.ordered() {
            let is_lfe = s.definition.is_lfe;
            let level = s.visual_level();
            let shaping = if is_lfe { BALLOON_LFE_SHAPING } else { BALLOON_SHAPING };
            let base_reach = reach_for_level(s.max_reach_screen, self.scale, level, shaping);
            if base_reach < 2.0 {
                continue;
            }
            let colour = self.colour(s);
            let dir = if is_lfe { Vec2::from(DEFAULT_ORIENTATION) } else { s.orientation };
            let rotation = dir.y.atan2(dir.x);
            for shell in 0..SHELL_SCALE.len() {
                let reach = base_reach * SHELL_SCALE[shell];
                let major = limit(12.0, reach, reach * 1.1);
                let minor = if is_lfe { major } else { limit(8.0, major * 0.55, major) };
                let centre = if is_lfe {
                    s.projected
                } else {
                    s.projected + dir * (major * 0.18)
                };
                let radii = Vec2::new(major, minor) * 0.5;
                let alpha = (SHELL_ALPHA[shell] + level * 0.25).clamp(0.05, 0.6);
                out.ellipse(centre, radii, rotation, Paint::Fill(colour.with_alpha(alpha)));
                out.ellipse(
                    centre,
                    radii,
                    rotation,
                    Paint::stroke(colour.with_alpha(alpha * 0.7), (minor * 0.012).max(1.0)),
                );
            }
        }
    }

    fn draw_heatmap(&mut self, projection: &Projection, out: &mut DrawList) {
        let normaliser = self
            .heatmap
            .evaluate(self.speakers.iter().map(|s| (&s.definition, &s.metrics)));
        self.heatmap.draw(projection, normaliser, self.scale, out);
    }

    fn draw_trails(&self, out: &mut DrawList) {
        for s in self.ordered() {
            let colour = self.colour(s);
            let n = s.trail.len();
            if n >= 2 {
                let thickness = if s.definition.is_lfe { 2.0 } else { 2.4 };
                let segments = s.trail.points().zip(s.trail.points().skip(1));
                for (i, (from, to)) in segments.enumerate() {
                    // Oldest segment is the most transparent.
                    let t = (i + 1) as f32 / (n - 1) as f32;
                    let alpha = (t * 0.65).clamp(0.05, 0.65);
                    out.line(*from, *to, Paint::stroke(colour.with_alpha(alpha), thickness));
                }
            }
            if s.definition.is_lfe {
                continue;
            }
            let level = s.visual_level();
            let reach = reach_for_level(s.max_reach_screen, self.scale, level, TRAIL_SHAPING);
            let length = limit(20.0, reach, reach * 1.05);
            out.line(
                s.projected,
                s.projected + s.orientation * length,
                Paint::stroke(colour.with_alpha(0.55), 2.2),
            );
        }
    }

    fn draw_base_markers(&self, out: &mut DrawList) {
        let scale_factor = self.scale.powf(0.25).clamp(0.6, 1.5);
        for s in self.ordered() {
            let colour = self.colour(s);
            let size = (26.0 + s.visual_level() * 135.0).clamp(20.0, 65.0);
            let diameter = size * 0.45 * scale_factor;
            let radius = diameter * 0.5;
            out.circle(s.projected, radius, Paint::Fill(colour.with_alpha(0.95)));
            out.circle(s.projected, radius, Paint::stroke(WHITE.with_alpha(0.5), 1.4));
            out.text(
                Vec2::new(s.projected.x - 70.0, s.projected.y + diameter * 0.75),
                Vec2::new(140.0, 18.0),
                s.definition.display_name.as_str(),
                WHITE,
            );
        }
    }
}

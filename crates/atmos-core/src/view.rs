//! UI-thread aggregate that turns the latest metrics into one frame.

use crate::camera::{Camera, CameraMode, CameraPreset};
use crate::color::BandWeights;
use crate::config::VizConfig;
use crate::draw::DrawList;
use crate::error::{AtmosError, Result};
use crate::layout::SpeakerLayout;
use crate::projection::{Projection, Viewport};
use crate::room::RoomRenderer;
use crate::snapshot::{MetricsSnapshot, SpeakerMetrics};
use crate::visualizer::{RadiationVisualizer, VisualizationMode};
use glam::Vec2;
use std::sync::Arc;

pub struct SpeakerView {
    layout: Arc<SpeakerLayout>,
    snapshot: Arc<MetricsSnapshot>,
    camera: Camera,
    visualizer: RadiationVisualizer,
    room: RoomRenderer,
    viewport: Viewport,
    metrics: Vec<SpeakerMetrics>,
    draw_list: DrawList,
}

impl SpeakerView {
    pub fn new(
        layout: Arc<SpeakerLayout>,
        snapshot: Arc<MetricsSnapshot>,
        config: VizConfig,
    ) -> Result<Self> {
        config.validate()?;
        if snapshot.len() != layout.len() {
            return Err(AtmosError::InvalidConfig(format!(
                "snapshot holds {} speakers, layout has {}",
                snapshot.len(),
                layout.len()
            )));
        }
        let visualizer = RadiationVisualizer::new(layout.clone(), &config);
        let camera = Camera::new(config.camera)?;
        Ok(Self {
            room: RoomRenderer::new(*layout.room()),
            metrics: vec![SpeakerMetrics::default(); layout.len()],
            layout,
            snapshot,
            camera,
            visualizer,
            viewport: Viewport::default(),
            draw_list: DrawList::new(),
        })
    }

    #[inline]
    pub fn layout(&self) -> &SpeakerLayout {
        &self.layout
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[inline]
    pub fn visualizer(&self) -> &RadiationVisualizer {
        &self.visualizer
    }

    #[inline]
    pub fn visualizer_mut(&mut self) -> &mut RadiationVisualizer {
        &mut self.visualizer
    }

    #[inline]
    pub fn metrics(&self) -> &[SpeakerMetrics] {
        &self.metrics
    }

    /// Timer tick: pull the most recent published block.
    pub fn refresh_metrics(&mut self) {
        self.snapshot.copy_latest(&mut self.metrics);
        self.visualizer.update_metrics(&self.metrics);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> Projection {
        self.camera.projection(self.viewport, self.layout.room())
    }

    /// Builds the frame: room, gizmo, then speakers far-to-near.
    pub fn paint(&mut self) -> &DrawList {
        let projection = self.projection();
        self.draw_list.clear();
        self.room.draw(&projection, &mut self.draw_list);
        self.room.draw_gizmo(&projection, &mut self.draw_list);
        self.visualizer.update_projections(&projection);
        self.visualizer.draw(&projection, &mut self.draw_list);
        &self.draw_list
    }

    pub fn set_camera_preset(&mut self, preset: CameraPreset) {
        self.camera.set_camera_preset(preset);
    }

    pub fn camera_preset(&self) -> CameraPreset {
        self.camera.camera_preset()
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        self.camera.set_mode(mode);
    }

    pub fn set_zoom_factor(&mut self, value: f32) {
        self.camera.set_zoom_factor(value);
    }

    pub fn zoom_factor(&self) -> f32 {
        self.camera.zoom_factor()
    }

    pub fn min_zoom(&self) -> f32 {
        self.camera.min_zoom()
    }

    pub fn max_zoom(&self) -> f32 {
        self.camera.max_zoom()
    }

    pub fn set_visualization_mode(&mut self, mode: VisualizationMode) {
        self.visualizer.set_visualization_mode(mode);
    }

    pub fn visualization_mode(&self) -> VisualizationMode {
        self.visualizer.visualization_mode()
    }

    pub fn set_visualization_scale_adjustment(&mut self, value: f32) {
        self.visualizer.set_visualization_scale_adjustment(value);
    }

    pub fn visualization_scale_adjustment(&self) -> f32 {
        self.visualizer.visualization_scale_adjustment()
    }

    pub fn set_band_weights(&mut self, weights: BandWeights) {
        self.visualizer.set_band_weights(weights);
    }

    pub fn band_weights(&self) -> BandWeights {
        self.visualizer.band_weights()
    }

    pub fn set_heatmap_density(&mut self, density: u8) {
        self.visualizer.set_heatmap_density(density);
    }

    pub fn heatmap_density(&self) -> u8 {
        self.visualizer.heatmap_density()
    }

    pub fn mouse_down(&mut self, position: Vec2) {
        self.camera.mouse_down(position);
    }

    pub fn mouse_drag(&mut self, position: Vec2) -> bool {
        self.camera.mouse_drag(position)
    }

    pub fn mouse_up(&mut self) {
        self.camera.mouse_up();
    }

    pub fn mouse_wheel(&mut self, delta_y: f32) {
        self.camera.mouse_wheel(delta_y);
    }
}

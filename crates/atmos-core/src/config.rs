//! Typed configuration injected at construction.

use crate::camera::{CameraMode, CameraPreset, PresetView};
use crate::color::BandWeights;
use crate::constants::*;
use crate::error::{AtmosError, Result};

/// Where the inside camera clips geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NearPlane {
    /// Fixed view depth in metres.
    Fixed(f32),
    /// Fraction of the current camera distance.
    DistanceFraction(f32),
}

impl NearPlane {
    #[inline]
    pub fn depth(&self, camera_distance: f32) -> f32 {
        match *self {
            NearPlane::Fixed(d) => d,
            NearPlane::DistanceFraction(f) => camera_distance * f,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionPolicy {
    pub outside_fill: f32,
    pub inside_fill: f32,
    pub near_plane: NearPlane,
    pub home_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ProjectionPolicy {
    fn default() -> Self {
        Self {
            outside_fill: OUTSIDE_FILL,
            inside_fill: INSIDE_FILL,
            near_plane: NearPlane::Fixed(NEAR_PLANE),
            home_zoom: HOME_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl ProjectionPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(AtmosError::InvalidConfig(format!(
                "zoom range {}..{} is empty",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.home_zoom) {
            return Err(AtmosError::InvalidConfig(format!(
                "home zoom {} outside zoom range",
                self.home_zoom
            )));
        }
        if self.outside_fill <= 0.0 || self.inside_fill <= 0.0 {
            return Err(AtmosError::InvalidConfig("fill fractions must be positive".into()));
        }
        let near_ok = match self.near_plane {
            NearPlane::Fixed(d) => d > 0.0,
            NearPlane::DistanceFraction(f) => f > 0.0 && f < 1.0,
        };
        if !near_ok {
            return Err(AtmosError::InvalidConfig(format!(
                "bad near plane {:?}",
                self.near_plane
            )));
        }
        Ok(())
    }
}

/// Fixed pose of a named preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresetParameters {
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub base_distance: f32,
}

const fn pose(yaw_degrees: f32, pitch_degrees: f32, base_distance: f32) -> PresetParameters {
    PresetParameters {
        yaw_degrees,
        pitch_degrees,
        base_distance,
    }
}

const OUTSIDE_HOME_DISTANCE: f32 = 40.0;
const OUTSIDE_ORBIT_DISTANCE: f32 = 25.0;
const OUTSIDE_TOP_DISTANCE: f32 = 32.0;
const INSIDE_HOME_DISTANCE: f32 = 6.0;
const INSIDE_ORBIT_DISTANCE: f32 = 6.0;
const INSIDE_TOP_DISTANCE: f32 = 8.0;

pub const DEFAULT_PRESETS: [(CameraPreset, PresetParameters); 12] = [
    (CameraPreset::OUTSIDE_HOME, pose(-110.0, -18.0, OUTSIDE_HOME_DISTANCE)),
    (CameraPreset::OUTSIDE_FRONT, pose(-90.0, 0.0, OUTSIDE_ORBIT_DISTANCE)),
    (CameraPreset::OUTSIDE_BACK, pose(90.0, 0.0, OUTSIDE_ORBIT_DISTANCE)),
    (CameraPreset::OUTSIDE_LEFT, pose(0.0, 0.0, OUTSIDE_ORBIT_DISTANCE)),
    (CameraPreset::OUTSIDE_RIGHT, pose(180.0, 0.0, OUTSIDE_ORBIT_DISTANCE)),
    (CameraPreset::OUTSIDE_TOP, pose(-90.0, -90.0, OUTSIDE_TOP_DISTANCE)),
    (CameraPreset::INSIDE_HOME, pose(-90.0, -12.0, INSIDE_HOME_DISTANCE)),
    (CameraPreset::INSIDE_FRONT, pose(-90.0, 0.0, INSIDE_ORBIT_DISTANCE)),
    (CameraPreset::INSIDE_BACK, pose(90.0, 0.0, INSIDE_ORBIT_DISTANCE)),
    (CameraPreset::INSIDE_LEFT, pose(0.0, 0.0, INSIDE_ORBIT_DISTANCE)),
    (CameraPreset::INSIDE_RIGHT, pose(180.0, 0.0, INSIDE_ORBIT_DISTANCE)),
    (CameraPreset::INSIDE_TOP, pose(-90.0, -90.0, INSIDE_TOP_DISTANCE)),
];

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub policy: ProjectionPolicy,
    pub presets: Vec<(CameraPreset, PresetParameters)>,
    pub drag_sensitivity: f32,
    pub pitch_limit_degrees: f32,
    pub wheel_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            policy: ProjectionPolicy::default(),
            presets: DEFAULT_PRESETS.to_vec(),
            drag_sensitivity: DRAG_RADIANS_PER_PIXEL,
            pitch_limit_degrees: PITCH_LIMIT_DEGREES,
            wheel_step: WHEEL_ZOOM_STEP,
        }
    }
}

impl CameraConfig {
    pub fn preset(&self, preset: CameraPreset) -> Option<&PresetParameters> {
        self.presets
            .iter()
            .find(|(p, _)| *p == preset)
            .map(|(_, params)| params)
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        for mode in [CameraMode::Outside, CameraMode::Inside] {
            let home = CameraPreset::new(mode, PresetView::Home);
            if self.preset(home).is_none() {
                return Err(AtmosError::InvalidConfig(format!("missing {home:?} pose")));
            }
        }
        if self
            .presets
            .iter()
            .any(|(_, p)| !(p.base_distance > 0.0))
        {
            return Err(AtmosError::InvalidConfig(
                "preset base distance must be positive".into(),
            ));
        }
        if !(self.pitch_limit_degrees > 0.0 && self.pitch_limit_degrees <= 90.0) {
            return Err(AtmosError::InvalidConfig(format!(
                "pitch limit {} outside (0, 90]",
                self.pitch_limit_degrees
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VizConfig {
    pub camera: CameraConfig,
    pub trail_capacity: usize,
    pub heatmap_density: u8,
    pub band_weights: BandWeights,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            trail_capacity: TRAIL_CAPACITY,
            heatmap_density: HEATMAP_DEFAULT_DENSITY,
            band_weights: BandWeights::default(),
        }
    }
}

impl VizConfig {
    pub fn validate(&self) -> Result<()> {
        self.camera.validate()?;
        if self.trail_capacity < 2 {
            return Err(AtmosError::InvalidConfig("trail capacity below 2".into()));
        }
        if !(1..=HEATMAP_DENSITY_TABLE.len() as u8).contains(&self.heatmap_density) {
            return Err(AtmosError::InvalidConfig(format!(
                "heatmap density {} outside 1..={}",
                self.heatmap_density,
                HEATMAP_DENSITY_TABLE.len()
            )));
        }
        Ok(())
    }
}

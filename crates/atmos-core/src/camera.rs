//! Camera mode/preset state machine.
//!
//! Each camera mode keeps two slots. The User slot holds the last pose set
//! by hand: any manual drag or zoom writes it and promotes the active
//! preset to User. The resume slot holds whatever pose (and preset) was
//! current when the mode was last left, on every path out of the mode;
//! `set_mode` restores from it.

use crate::config::CameraConfig;
use crate::constants::*;
use crate::error::Result;
use crate::layout::RoomDimensions;
use crate::projection::{Projection, Viewport};
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraMode {
    Outside,
    Inside,
}

impl CameraMode {
    #[inline]
    fn slot(self) -> usize {
        match self {
            CameraMode::Outside => 0,
            CameraMode::Inside => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresetView {
    Home,
    User,
    Front,
    Back,
    Left,
    Right,
    Top,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CameraPreset {
    pub mode: CameraMode,
    pub view: PresetView,
}

impl CameraPreset {
    pub const OUTSIDE_HOME: Self = Self::new(CameraMode::Outside, PresetView::Home);
    pub const OUTSIDE_USER: Self = Self::new(CameraMode::Outside, PresetView::User);
    pub const OUTSIDE_FRONT: Self = Self::new(CameraMode::Outside, PresetView::Front);
    pub const OUTSIDE_BACK: Self = Self::new(CameraMode::Outside, PresetView::Back);
    pub const OUTSIDE_LEFT: Self = Self::new(CameraMode::Outside, PresetView::Left);
    pub const OUTSIDE_RIGHT: Self = Self::new(CameraMode::Outside, PresetView::Right);
    pub const OUTSIDE_TOP: Self = Self::new(CameraMode::Outside, PresetView::Top);
    pub const INSIDE_HOME: Self = Self::new(CameraMode::Inside, PresetView::Home);
    pub const INSIDE_USER: Self = Self::new(CameraMode::Inside, PresetView::User);
    pub const INSIDE_FRONT: Self = Self::new(CameraMode::Inside, PresetView::Front);
    pub const INSIDE_BACK: Self = Self::new(CameraMode::Inside, PresetView::Back);
    pub const INSIDE_LEFT: Self = Self::new(CameraMode::Inside, PresetView::Left);
    pub const INSIDE_RIGHT: Self = Self::new(CameraMode::Inside, PresetView::Right);
    pub const INSIDE_TOP: Self = Self::new(CameraMode::Inside, PresetView::Top);

    pub const ALL: [Self; 14] = [
        Self::OUTSIDE_HOME,
        Self::OUTSIDE_USER,
        Self::OUTSIDE_FRONT,
        Self::OUTSIDE_BACK,
        Self::OUTSIDE_LEFT,
        Self::OUTSIDE_RIGHT,
        Self::OUTSIDE_TOP,
        Self::INSIDE_HOME,
        Self::INSIDE_USER,
        Self::INSIDE_FRONT,
        Self::INSIDE_BACK,
        Self::INSIDE_LEFT,
        Self::INSIDE_RIGHT,
        Self::INSIDE_TOP,
    ];

    pub const fn new(mode: CameraMode, view: PresetView) -> Self {
        Self { mode, view }
    }

    #[inline]
    pub const fn user(mode: CameraMode) -> Self {
        Self::new(mode, PresetView::User)
    }

    #[inline]
    pub fn is_user(&self) -> bool {
        self.view == PresetView::User
    }

    #[inline]
    pub fn is_home(&self) -> bool {
        self.view == PresetView::Home
    }
}

/// Angles in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub yaw: f32,
    pub pitch: f32,
    pub base_distance: f32,
    pub zoom: f32,
}

#[derive(Clone, Copy, Debug)]
struct DragAnchor {
    position: Vec2,
    yaw: f32,
    pitch: f32,
}

type ZoomCallback = Box<dyn FnMut(f32)>;
type PresetCallback = Box<dyn FnMut(CameraPreset)>;

/// UI-thread camera. Not `Send`: callbacks capture widget state.
pub struct Camera {
    config: CameraConfig,
    mode: CameraMode,
    state: CameraState,
    camera_distance: f32,
    user_states: [CameraState; 2],
    resume: [(CameraState, CameraPreset); 2],
    preset: CameraPreset,
    drag: Option<DragAnchor>,
    on_zoom_changed: Option<ZoomCallback>,
    on_preset_changed: Option<PresetCallback>,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Result<Self> {
        config.validate()?;
        let home_zoom = config.policy.home_zoom;
        let home_state = |mode: CameraMode| {
            let params = config
                .preset(CameraPreset::new(mode, PresetView::Home))
                .copied()
                .unwrap_or(crate::config::DEFAULT_PRESETS[0].1);
            CameraState {
                yaw: params.yaw_degrees.to_radians(),
                pitch: params.pitch_degrees.to_radians(),
                base_distance: params.base_distance.max(MIN_BASE_DISTANCE),
                zoom: home_zoom,
            }
        };
        let user_states = [home_state(CameraMode::Outside), home_state(CameraMode::Inside)];
        let resume = [
            (user_states[0], CameraPreset::OUTSIDE_HOME),
            (user_states[1], CameraPreset::INSIDE_HOME),
        ];
        let mut camera = Self {
            mode: CameraMode::Outside,
            state: user_states[0],
            camera_distance: user_states[0].base_distance,
            user_states,
            resume,
            preset: CameraPreset::OUTSIDE_HOME,
            drag: None,
            on_zoom_changed: None,
            on_preset_changed: None,
            config,
        };
        camera.set_camera_preset(CameraPreset::OUTSIDE_HOME);
        Ok(camera)
    }

    pub fn on_zoom_changed(&mut self, callback: impl FnMut(f32) + 'static) {
        self.on_zoom_changed = Some(Box::new(callback));
    }

    pub fn on_preset_changed(&mut self, callback: impl FnMut(CameraPreset) + 'static) {
        self.on_preset_changed = Some(Box::new(callback));
    }

    #[inline]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    #[inline]
    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Last hand-set pose of `mode`, restored by its User preset.
    #[inline]
    pub fn user_state(&self, mode: CameraMode) -> CameraState {
        self.user_states[mode.slot()]
    }

    /// Pose `set_mode` restores when `mode` is next entered.
    #[inline]
    pub fn resume_state(&self, mode: CameraMode) -> CameraState {
        self.resume[mode.slot()].0
    }

    #[inline]
    pub fn camera_preset(&self) -> CameraPreset {
        self.preset
    }

    #[inline]
    pub fn zoom_factor(&self) -> f32 {
        self.state.zoom
    }

    #[inline]
    pub fn min_zoom(&self) -> f32 {
        self.config.policy.min_zoom
    }

    #[inline]
    pub fn max_zoom(&self) -> f32 {
        self.config.policy.max_zoom
    }

    /// Distance from the view origin used for depth and perspective.
    #[inline]
    pub fn camera_distance(&self) -> f32 {
        self.camera_distance
    }

    pub fn set_camera_preset(&mut self, preset: CameraPreset) {
        if preset.mode != self.mode {
            self.remember_leaving_pose();
        }
        self.preset = preset;
        self.mode = preset.mode;
        let mut zoom_notified = false;
        if preset.is_user() {
            self.restore_user_state(preset.mode);
        } else if let Some(params) = self.config.preset(preset).copied() {
            self.state.yaw = params.yaw_degrees.to_radians();
            self.state.pitch = params.pitch_degrees.to_radians();
            self.state.base_distance = params.base_distance.max(MIN_BASE_DISTANCE);
            if preset.is_home() {
                self.apply_zoom(self.config.policy.home_zoom, true);
                zoom_notified = true;
            } else {
                self.update_camera_distance();
            }
        } else {
            log::warn!("[camera] no pose configured for {preset:?}");
            self.update_camera_distance();
        }
        if !zoom_notified {
            self.notify_zoom();
        }
        log::debug!(
            "[camera] preset {:?} yaw={:.1} pitch={:.1} zoom={:.2}",
            preset,
            self.state.yaw.to_degrees(),
            self.state.pitch.to_degrees(),
            self.state.zoom
        );
        self.notify_preset();
    }

    /// Manual zoom; promotes the current pose to the User preset.
    pub fn set_zoom_factor(&mut self, value: f32) {
        self.apply_zoom(value, false);
    }

    /// Switch modes, resuming the pose the entered mode was left in.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        self.remember_leaving_pose();
        log::debug!("[camera] mode {:?} -> {:?}", self.mode, mode);
        let (state, preset) = self.resume[mode.slot()];
        self.mode = mode;
        self.state = state;
        self.preset = preset;
        self.update_camera_distance();
        self.notify_zoom();
        self.notify_preset();
    }

    pub fn mouse_down(&mut self, position: Vec2) {
        self.drag = Some(DragAnchor {
            position,
            yaw: self.state.yaw,
            pitch: self.state.pitch,
        });
    }

    /// Returns true when the pose changed.
    pub fn mouse_drag(&mut self, position: Vec2) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        let delta = position - anchor.position;
        let limit = self.config.pitch_limit_degrees.to_radians();
        let sensitivity = self.config.drag_sensitivity;
        let yaw = anchor.yaw + delta.x * sensitivity;
        let pitch = (anchor.pitch - delta.y * sensitivity).clamp(-limit, limit);
        if (yaw - self.state.yaw).abs() <= ANGLE_CHANGE_EPSILON
            && (pitch - self.state.pitch).abs() <= ANGLE_CHANGE_EPSILON
        {
            return false;
        }
        self.state.yaw = yaw;
        self.state.pitch = pitch;
        self.promote_to_user();
        true
    }

    pub fn mouse_up(&mut self) {
        self.drag = None;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn mouse_wheel(&mut self, delta_y: f32) {
        let step = self.config.wheel_step;
        self.set_zoom_factor(self.state.zoom - delta_y * step);
    }

    pub fn projection(&self, viewport: Viewport, room: &RoomDimensions) -> Projection {
        Projection::new(
            self.mode,
            self.state.yaw,
            self.state.pitch,
            self.camera_distance,
            self.state.zoom,
            viewport,
            room,
            &self.config.policy,
        )
    }

    fn apply_zoom(&mut self, value: f32, from_preset: bool) {
        let clamped = if value.is_finite() {
            value.clamp(self.min_zoom(), self.max_zoom())
        } else {
            self.state.zoom
        };
        if (clamped - self.state.zoom).abs() < ZOOM_CHANGE_EPSILON && !from_preset {
            return;
        }
        self.state.zoom = clamped;
        self.update_camera_distance();
        if !from_preset {
            self.promote_to_user();
        }
        self.notify_zoom();
    }

    fn update_camera_distance(&mut self) {
        let base = self.state.base_distance.max(MIN_BASE_DISTANCE);
        self.camera_distance = match self.mode {
            CameraMode::Outside => base,
            CameraMode::Inside => base / self.state.zoom.max(MIN_INSIDE_ZOOM_DIVISOR),
        };
    }

    fn capture_user_state(&mut self) {
        self.user_states[self.mode.slot()] = self.state;
    }

    fn remember_leaving_pose(&mut self) {
        self.resume[self.mode.slot()] = (self.state, self.preset);
    }

    fn restore_user_state(&mut self, mode: CameraMode) {
        self.state = self.user_states[mode.slot()];
        self.update_camera_distance();
    }

    fn promote_to_user(&mut self) {
        self.capture_user_state();
        let user = CameraPreset::user(self.mode);
        if self.preset != user {
            self.preset = user;
            self.notify_preset();
        }
    }

    fn notify_zoom(&mut self) {
        let zoom = self.state.zoom;
        if let Some(cb) = self.on_zoom_changed.as_mut() {
            cb(zoom);
        }
    }

    fn notify_preset(&mut self) {
        let preset = self.preset;
        if let Some(cb) = self.on_preset_changed.as_mut() {
            cb(preset);
        }
    }
}

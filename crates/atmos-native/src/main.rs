mod audio;
mod render;
mod tessellate;

use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use atmos_core::{
    CameraMode, CameraPreset, MetricsSnapshot, PresetView, RoomDimensions, SpeakerLayout,
    SpeakerView, VizConfig,
};
use glam::Vec2;
use render::GpuState;

const FRAME_INTERVAL: Duration = Duration::from_millis(33); // ~30 Hz UI tick
const SCALE_KEY_STEP: f32 = 10.0;

fn preset_for_digit(mode: CameraMode, digit: &str) -> Option<CameraPreset> {
    let view = match digit {
        "1" => PresetView::Home,
        "2" => PresetView::Front,
        "3" => PresetView::Back,
        "4" => PresetView::Left,
        "5" => PresetView::Right,
        "6" => PresetView::Top,
        "7" => PresetView::User,
        _ => return None,
    };
    Some(CameraPreset::new(mode, view))
}

fn handle_key(view: &mut SpeakerView, key: &Key) -> bool {
    let Key::Character(text) = key else {
        return false;
    };
    let mode = view.camera().mode();
    if let Some(preset) = preset_for_digit(mode, text.as_str()) {
        view.set_camera_preset(preset);
        return true;
    }
    match text.as_str() {
        "i" | "I" => {
            let next = match mode {
                CameraMode::Outside => CameraMode::Inside,
                CameraMode::Inside => CameraMode::Outside,
            };
            view.set_camera_mode(next);
        }
        "v" | "V" => {
            let next = view.visualization_mode().next();
            view.set_visualization_mode(next);
            log::info!("visualization: {}", next.label());
        }
        "=" | "+" => {
            let v = view.visualization_scale_adjustment() + SCALE_KEY_STEP;
            view.set_visualization_scale_adjustment(v);
        }
        "-" | "_" => {
            let v = view.visualization_scale_adjustment() - SCALE_KEY_STEP;
            view.set_visualization_scale_adjustment(v);
        }
        "]" => {
            let d = view.heatmap_density().saturating_add(1);
            view.set_heatmap_density(d);
        }
        "[" => {
            let d = view.heatmap_density().saturating_sub(1);
            view.set_heatmap_density(d);
        }
        _ => return false,
    }
    true
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let layout = Arc::new(SpeakerLayout::seven_one_four(RoomDimensions::default()));
    let snapshot = Arc::new(MetricsSnapshot::new(layout.len()));

    // Analysis runs on the audio (or synthetic) thread; only the snapshot is shared.
    let _audio = audio::start_audio(Arc::clone(&layout), Arc::clone(&snapshot))?;

    let mut view = SpeakerView::new(Arc::clone(&layout), snapshot, VizConfig::default())?;
    view.camera_mut()
        .on_preset_changed(|preset| log::info!("camera preset: {preset:?}"));
    view.visualizer_mut()
        .on_density_changed(|d| log::info!("heatmap density: {d}"));

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Atmos speaker visualizer (native)")
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window))?;
    let (w, h) = state.size();
    view.resize(w as f32, h as f32);

    let mut cursor = Vec2::ZERO;
    let mut next_tick = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => {
            state.resize(size);
            view.resize(size.width as f32, size.height as f32);
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => {
            cursor = Vec2::new(position.x as f32, position.y as f32);
            if view.camera().is_dragging() && view.mouse_drag(cursor) {
                state.window.request_redraw();
            }
        }
        Event::WindowEvent {
            event:
                WindowEvent::MouseInput {
                    state: button_state,
                    button: MouseButton::Left,
                    ..
                },
            ..
        } => match button_state {
            ElementState::Pressed => view.mouse_down(cursor),
            ElementState::Released => view.mouse_up(),
        },
        Event::WindowEvent {
            event: WindowEvent::MouseWheel { delta, .. },
            ..
        } => {
            let dy = match delta {
                MouseScrollDelta::LineDelta(_, y) => y,
                MouseScrollDelta::PixelDelta(p) => p.y as f32 / 100.0,
            };
            view.mouse_wheel(dy);
            state.window.request_redraw();
        }
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                },
            ..
        } => {
            if logical_key == Key::Named(NamedKey::Escape) {
                elwt.exit();
            } else if handle_key(&mut view, &logical_key) {
                state.window.request_redraw();
            }
        }
        Event::WindowEvent {
            event: WindowEvent::RedrawRequested,
            ..
        } => match state.render(view.paint()) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(err) => log::warn!("frame skipped: {err:?}"),
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if now >= next_tick {
                view.refresh_metrics();
                state.window.request_redraw();
                next_tick = now + FRAME_INTERVAL;
            }
            elwt.set_control_flow(ControlFlow::WaitUntil(next_tick));
        }
        _ => {}
    })?;
    Ok(())
}

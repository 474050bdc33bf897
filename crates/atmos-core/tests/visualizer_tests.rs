// Radiation visuals, heatmap lattice and the per-frame view.

use atmos_core::*;
use glam::{Vec2, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn layout() -> Arc<SpeakerLayout> {
    Arc::new(SpeakerLayout::seven_one_four(RoomDimensions::default()))
}

fn view_with_levels(levels: &[f32]) -> (SpeakerView, Arc<MetricsSnapshot>) {
    let layout = layout();
    let snapshot = Arc::new(MetricsSnapshot::new(layout.len()));
    let metrics: Vec<SpeakerMetrics> = levels
        .iter()
        .map(|&l| SpeakerMetrics {
            rms: l * 0.7,
            peak: l,
            bands: FrequencyBands {
                low: l * 0.3,
                mid: l * 0.5,
                high: l * 0.2,
            },
        })
        .collect();
    snapshot.publish(&metrics);
    let mut view = SpeakerView::new(layout, Arc::clone(&snapshot), VizConfig::default()).unwrap();
    view.resize(1000.0, 650.0);
    view.refresh_metrics();
    (view, snapshot)
}

fn all_finite(list: &DrawList) -> bool {
    list.commands().iter().all(|c| match &c.shape {
        Shape::Polygon(points) => points.iter().all(|p| p.is_finite()),
        Shape::Ellipse { centre, radii, rotation } => {
            centre.is_finite() && radii.is_finite() && rotation.is_finite()
        }
        Shape::Line { from, to } => from.is_finite() && to.is_finite(),
        Shape::Text { origin, size, .. } => origin.is_finite() && size.is_finite(),
    })
}

fn count_texts(list: &DrawList) -> usize {
    list.commands()
        .iter()
        .filter(|c| matches!(c.shape, Shape::Text { .. }))
        .count()
}

#[test]
fn reach_spans_floor_to_full() {
    assert!((reach_for_level(100.0, 1.0, 0.0, LOBE_SHAPING) - 20.0).abs() < 1e-4);
    assert!((reach_for_level(100.0, 1.0, 1.0, LOBE_SHAPING) - 100.0).abs() < 1e-4);
    assert!((reach_for_level(100.0, 2.0, 1.0, LOBE_SHAPING) - 200.0).abs() < 1e-4);
    // Out-of-range levels clamp.
    assert_eq!(
        reach_for_level(100.0, 1.0, 3.0, TRAIL_SHAPING),
        reach_for_level(100.0, 1.0, 1.0, TRAIL_SHAPING)
    );
    let mid = reach_for_level(100.0, 1.0, 0.5, LOBE_SHAPING);
    assert!(mid > 20.0 && mid < 100.0);
}

#[test]
fn scale_adjustment_maps_to_powers_of_two() {
    assert!((visualization_scale_for(0.0) - 1.0).abs() < 1e-6);
    assert!((visualization_scale_for(100.0) - 2.0).abs() < 1e-6);
    assert!((visualization_scale_for(-100.0) - 0.5).abs() < 1e-6);
    assert!((visualization_scale_for(400.0) - 2.0).abs() < 1e-6);
    assert!((visualization_scale_for(f32::NAN) - 1.0).abs() < 1e-6);
}

#[test]
fn boundary_distance_from_listener() {
    let room = RoomDimensions::default();
    assert!((distance_to_room_boundary(&room, Vec3::ZERO, Vec3::X) - 3.8).abs() < 1e-5);
    assert!((distance_to_room_boundary(&room, Vec3::ZERO, Vec3::NEG_Y) - 1.2).abs() < 1e-5);
    assert!((distance_to_room_boundary(&room, Vec3::ZERO, Vec3::Y) - 1.85).abs() < 1e-5);
    let diagonal = distance_to_room_boundary(&room, Vec3::ZERO, Vec3::ZERO);
    assert!((diagonal - room.diagonal()).abs() < 1e-5);
}

#[test]
fn band_weights_are_sanitised() {
    assert_eq!(BandWeights::new(0.0, 0.0, 0.0), BandWeights::default());
    let w = BandWeights::new(-1.0, 2.0, f32::NAN);
    assert_eq!((w.low, w.mid, w.high), (0.0, 2.0, 0.0));
}

#[test]
fn colour_tracks_dominant_band() {
    let weights = BandWeights::default();
    let bass = colour_for_bands(
        &FrequencyBands { low: 1.0, mid: 0.0, high: 0.0 },
        &weights,
        false,
    );
    assert!(bass.b > bass.r && bass.b > bass.g);
    let treble = colour_for_bands(
        &FrequencyBands { low: 0.0, mid: 0.0, high: 1.0 },
        &weights,
        false,
    );
    assert!(treble.r > treble.g && treble.r > treble.b);
    // Weighting a band out hides it.
    let muted = colour_for_bands(
        &FrequencyBands { low: 0.0, mid: 0.0, high: 1.0 },
        &BandWeights::new(1.0, 1.0, 0.0),
        false,
    );
    assert!(muted.r < 1e-3);
    assert_eq!(colour_for_bands(&FrequencyBands::default(), &weights, true), LFE_COLOUR);
}

#[test]
fn silence_is_dim_not_black() {
    let c = colour_for_bands(&FrequencyBands::default(), &BandWeights::default(), false);
    assert!(c.to_array()[..3].iter().all(|v| (0.0..=1.0).contains(v)));
    assert_eq!(c.a, 1.0);
}

#[test]
fn heatmap_lattice_sits_inside_the_room() {
    let room = RoomDimensions::default();
    let grid = HeatmapGrid::new(&room, 3);
    assert_eq!(grid.points().len(), 7 * 7 * 5);
    assert!(grid.points().iter().all(|&p| room.contains(p)));
    assert_eq!(lattice_resolution(0), lattice_resolution(1));
    assert_eq!(lattice_resolution(9), (11, 11, 7));
}

#[test]
fn silent_heatmap_draws_nothing() {
    let layout = layout();
    let silence = vec![SpeakerMetrics::default(); layout.len()];
    let mut grid = HeatmapGrid::new(layout.room(), 3);
    let normaliser = grid.evaluate(layout.speakers().iter().zip(&silence));
    assert_eq!(normaliser, HEATMAP_NORMALISER_FLOOR);
    assert!(grid.levels().iter().all(|&l| l == 0.0));

    let mut cam = Camera::new(CameraConfig::default()).unwrap();
    cam.set_camera_preset(CameraPreset::OUTSIDE_HOME);
    let proj = cam.projection(Viewport::default(), layout.room());
    let mut list = DrawList::new();
    grid.draw(&proj, normaliser, 1.0, &mut list);
    assert!(list.is_empty());
}

#[test]
fn sounding_speaker_lights_the_lattice() {
    let layout = layout();
    let mut metrics = vec![SpeakerMetrics::default(); layout.len()];
    metrics[2].rms = 0.6;
    metrics[2].peak = 0.8;
    let mut grid = HeatmapGrid::new(layout.room(), 3);
    let normaliser = grid.evaluate(layout.speakers().iter().zip(&metrics));
    assert!(normaliser >= HEATMAP_NORMALISER_FLOOR);
    assert!((grid.running_max() - grid.levels().iter().cloned().fold(0.0, f32::max)).abs() < 1e-6);

    let proj = Camera::new(CameraConfig::default())
        .unwrap()
        .projection(Viewport::default(), layout.room());
    let mut list = DrawList::new();
    grid.draw(&proj, normaliser, 1.0, &mut list);
    assert!(!list.is_empty());
    for cmd in list.commands() {
        let alpha = cmd.paint.colour().a;
        assert!((0.08..=0.6).contains(&alpha), "alpha {alpha}");
        if let Shape::Ellipse { radii, .. } = cmd.shape {
            assert!(radii.x >= 2.0 && radii.x <= 9.0);
        }
    }
}

#[test]
fn heatmap_running_max_decays() {
    let layout = layout();
    let mut metrics = vec![SpeakerMetrics::default(); layout.len()];
    metrics[0].rms = 1.0;
    let mut grid = HeatmapGrid::new(layout.room(), 2);
    grid.evaluate(layout.speakers().iter().zip(&metrics));
    let loud = grid.running_max();
    let silence = vec![SpeakerMetrics::default(); layout.len()];
    grid.evaluate(layout.speakers().iter().zip(&silence));
    assert!((grid.running_max() - loud * HEATMAP_MAX_DECAY).abs() < 1e-5);

    grid.rebuild(layout.room(), 2);
    assert_eq!(grid.running_max(), 0.0);
}

#[test]
fn dot_style_bounds() {
    let (d, a) = dot_style(0.0, 1.0, 1.0);
    assert_eq!((d, a), (4.0, 0.08));
    let (d, a) = dot_style(5.0, 1.0, 1.0);
    assert_eq!((d, a), (18.0, 0.6));
}

#[test]
fn trail_is_bounded_and_deduplicated() {
    let mut trail = TrailHistory::new(3);
    for i in 0..5 {
        assert!(trail.push(Vec2::new(i as f32 * 10.0, 0.0)));
    }
    assert_eq!(trail.len(), 3);
    let xs: Vec<f32> = trail.points().map(|p| p.x).collect();
    assert_eq!(xs, vec![20.0, 30.0, 40.0]);
    assert!(!trail.push(Vec2::new(40.1, 0.0)));
    assert_eq!(trail.len(), 3);
    trail.clear();
    assert!(trail.is_empty());
}

#[test]
fn speakers_are_ordered_far_to_near() {
    let (mut view, _) = view_with_levels(&[0.5; 12]);
    for preset in [CameraPreset::OUTSIDE_HOME, CameraPreset::OUTSIDE_TOP, CameraPreset::INSIDE_HOME] {
        view.set_camera_preset(preset);
        view.paint();
        let speakers = view.visualizer().speakers();
        let depths: Vec<f32> = view
            .visualizer()
            .draw_order()
            .iter()
            .map(|&i| speakers[i].depth)
            .collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]), "{preset:?}: {depths:?}");
        assert_eq!(depths.len(), 12);
    }
}

#[test]
fn lfe_points_down_screen_with_generous_reach() {
    let (mut view, _) = view_with_levels(&[0.0; 12]);
    view.paint();
    let lfe = &view.visualizer().speakers()[3];
    assert_eq!(lfe.orientation, Vec2::new(0.0, -1.0));
    assert!(lfe.max_reach_screen >= DEGENERATE_MIN_REACH_SCREEN);
    let room = RoomDimensions::default();
    assert!((lfe.max_reach_world - room.diagonal() * 0.5).abs() < 1e-5);
}

#[test]
fn centre_reaches_the_rear_wall() {
    let (mut view, _) = view_with_levels(&[0.0; 12]);
    view.paint();
    let c = &view.visualizer().speakers()[2];
    assert!((c.max_reach_world - 7.6).abs() < 1e-4);
    assert!(c.max_reach_screen >= MIN_REACH_SCREEN);
    assert!((c.orientation.length() - 1.0).abs() < 1e-5);
}

#[test]
fn every_mode_produces_finite_geometry() {
    let levels: Vec<f32> = (0..12).map(|i| i as f32 / 11.0).collect();
    let (mut view, _) = view_with_levels(&levels);
    for preset in [CameraPreset::OUTSIDE_HOME, CameraPreset::INSIDE_HOME, CameraPreset::INSIDE_TOP] {
        view.set_camera_preset(preset);
        for mode in VisualizationMode::ALL {
            view.set_visualization_mode(mode);
            for step in 0..4 {
                view.mouse_down(Vec2::ZERO);
                view.mouse_drag(Vec2::new(step as f32 * 15.0, step as f32 * 4.0));
                view.mouse_up();
                let list = view.paint();
                assert!(!list.is_empty());
                assert!(all_finite(list), "{preset:?} {mode:?}");
            }
        }
    }
}

#[test]
fn every_speaker_gets_a_label_from_outside() {
    let (mut view, _) = view_with_levels(&[0.3; 12]);
    let list = view.paint();
    // Twelve speaker names plus three gizmo axes.
    assert_eq!(count_texts(list), 15);
}

#[test]
fn silent_lobes_still_draw_floor_reach() {
    let (mut view, _) = view_with_levels(&[0.0; 12]);
    view.set_visualization_mode(VisualizationMode::DirectionalLobes);
    let list = view.paint();
    let polygons = list
        .commands()
        .iter()
        .filter(|c| matches!(c.shape, Shape::Polygon(_)))
        .count();
    // Fill and outline for every directional speaker.
    assert_eq!(polygons, 11 * 2);
}

#[test]
fn layered_lobes_draw_three_layers() {
    let (mut view, _) = view_with_levels(&[0.6; 12]);
    view.set_visualization_mode(VisualizationMode::LayeredLobes);
    let list = view.paint();
    let polygons = list
        .commands()
        .iter()
        .filter(|c| matches!(c.shape, Shape::Polygon(_)))
        .count();
    assert_eq!(polygons, 11 * 3 * 2);
}

fn ellipses(list: &DrawList) -> Vec<(Vec2, Vec2, Paint)> {
    list.commands()
        .iter()
        .filter_map(|c| match c.shape {
            Shape::Ellipse { centre, radii, .. } => Some((centre, radii, c.paint)),
            _ => None,
        })
        .collect()
}

fn visible_in_order(viz: &RadiationVisualizer) -> Vec<&DisplaySpeaker> {
    viz.draw_order()
        .iter()
        .map(|&i| &viz.speakers()[i])
        .filter(|s| s.visible)
        .collect()
}

#[test]
fn balloons_draw_three_fading_shells_per_speaker() {
    let (mut view, _) = view_with_levels(&[0.5; 12]);
    view.set_visualization_mode(VisualizationMode::DirectivityBalloon);
    let list = view.paint().clone();
    let viz = view.visualizer();
    let speakers = visible_in_order(viz);
    assert_eq!(speakers.len(), 12);

    let shapes = ellipses(&list);
    // Six shell ellipses per speaker, then a fill and stroke marker each.
    assert_eq!(shapes.len(), 12 * 6 + 12 * 2);
    for (s, shells) in speakers.iter().zip(shapes[..72].chunks(6)) {
        let mut last_alpha = f32::INFINITY;
        for pair in shells.chunks(2) {
            let (centre, radii, fill) = pair[0];
            let (stroke_centre, stroke_radii, stroke) = pair[1];
            assert!(matches!(fill, Paint::Fill(_)));
            assert!(matches!(stroke, Paint::Stroke { .. }));
            assert_eq!((centre, radii), (stroke_centre, stroke_radii));
            assert!((stroke.colour().a - fill.colour().a * 0.7).abs() < 1e-5);

            let alpha = fill.colour().a;
            assert!(alpha < last_alpha, "{} shells do not fade outward", s.definition.id);
            last_alpha = alpha;

            if s.definition.is_lfe {
                assert_eq!(radii.x, radii.y);
                assert_eq!(centre, s.projected);
            } else {
                assert!(radii.y <= radii.x);
                let major = radii.x * 2.0;
                let offset = centre - s.projected;
                assert!((offset - s.orientation * (major * 0.18)).length() < 1e-3);
            }
        }
    }
}

#[test]
fn trails_brighten_towards_the_newest_point() {
    let (mut view, _) = view_with_levels(&[0.4; 12]);
    view.set_visualization_mode(VisualizationMode::TemporalTrail);
    for step in 0..6 {
        view.mouse_down(Vec2::ZERO);
        view.mouse_drag(Vec2::new(step as f32 * 12.0, 0.0));
        view.mouse_up();
        view.paint();
    }
    let proj = view.projection();
    let mut list = DrawList::new();
    view.visualizer_mut().draw(&proj, &mut list);

    let lines: Vec<(Vec2, Vec2, Paint)> = list
        .commands()
        .iter()
        .filter_map(|c| match c.shape {
            Shape::Line { from, to } => Some((from, to, c.paint)),
            _ => None,
        })
        .collect();
    let viz = view.visualizer();
    let mut cursor = lines.iter();
    let mut lfe_seen = false;
    for s in visible_in_order(viz) {
        let n = s.trail.len();
        assert!(n >= 2, "{} trail too short", s.definition.id);
        let oldest = *s.trail.points().next().unwrap();
        let mut last_alpha = 0.0;
        for i in 0..n - 1 {
            let (from, _, paint) = cursor.next().unwrap();
            if i == 0 {
                assert_eq!(*from, oldest);
            }
            let alpha = paint.colour().a;
            assert!(alpha >= last_alpha);
            last_alpha = alpha;
        }
        assert!((last_alpha - 0.65).abs() < 1e-5);
        if s.definition.is_lfe {
            lfe_seen = true;
            continue;
        }
        let (from, to, paint) = cursor.next().unwrap();
        assert_eq!(*from, s.projected);
        assert!((paint.colour().a - 0.55).abs() < 1e-5);
        assert!(from.distance(*to) >= 20.0 - 1e-3);
    }
    assert!(lfe_seen);
    // The LFE adds no direction line.
    assert!(cursor.next().is_none());
}

#[test]
fn trails_accumulate_across_paints() {
    let (mut view, _) = view_with_levels(&[0.4; 12]);
    view.set_visualization_mode(VisualizationMode::TemporalTrail);
    for step in 0..10 {
        view.mouse_down(Vec2::ZERO);
        view.mouse_drag(Vec2::new(step as f32 * 12.0, 0.0));
        view.mouse_up();
        view.paint();
    }
    for s in view.visualizer().speakers() {
        assert!(s.trail.len() >= 2 && s.trail.len() <= TRAIL_CAPACITY);
    }
}

#[test]
fn setters_notify_only_on_change() {
    let (mut view, _) = view_with_levels(&[0.0; 12]);
    let modes = Rc::new(RefCell::new(Vec::new()));
    let scales = Rc::new(RefCell::new(Vec::new()));
    let densities = Rc::new(RefCell::new(Vec::new()));
    {
        let viz = view.visualizer_mut();
        let modes = Rc::clone(&modes);
        viz.on_mode_changed(move |m| modes.borrow_mut().push(m));
        let scales = Rc::clone(&scales);
        viz.on_scale_changed(move |s| scales.borrow_mut().push(s));
        let densities = Rc::clone(&densities);
        viz.on_density_changed(move |d| densities.borrow_mut().push(d));
    }

    view.set_visualization_mode(VisualizationMode::DirectivityBalloon);
    view.set_visualization_mode(VisualizationMode::DirectivityBalloon);
    assert_eq!(*modes.borrow(), vec![VisualizationMode::DirectivityBalloon]);

    view.set_visualization_scale_adjustment(250.0);
    view.set_visualization_scale_adjustment(100.0);
    assert_eq!(*scales.borrow(), vec![100.0]);
    assert!((view.visualizer().visualization_scale() - 2.0).abs() < 1e-6);

    view.set_heatmap_density(0);
    view.set_heatmap_density(1);
    view.set_heatmap_density(200);
    assert_eq!(*densities.borrow(), vec![1, 5]);
    assert_eq!(view.heatmap_density(), 5);
}

#[test]
fn band_weight_changes_reach_the_view() {
    let (mut view, _) = view_with_levels(&[0.5; 12]);
    view.set_band_weights(BandWeights::new(2.0, 0.0, -5.0));
    let w = view.band_weights();
    assert_eq!((w.low, w.mid, w.high), (2.0, 0.0, 0.0));
}

#[test]
fn mode_cycle_visits_every_mode() {
    let mut mode = VisualizationMode::default();
    let mut seen = Vec::new();
    for _ in 0..VisualizationMode::ALL.len() {
        seen.push(mode);
        mode = mode.next();
    }
    assert_eq!(mode, VisualizationMode::DirectionalLobes);
    assert_eq!(seen, VisualizationMode::ALL.to_vec());
}

#[test]
fn view_rejects_mismatched_snapshot() {
    let snapshot = Arc::new(MetricsSnapshot::new(4));
    let err = SpeakerView::new(layout(), snapshot, VizConfig::default()).err();
    assert!(matches!(err, Some(AtmosError::InvalidConfig(_))));
}

#[test]
fn view_rejects_invalid_config() {
    let layout = layout();
    let snapshot = Arc::new(MetricsSnapshot::new(layout.len()));
    let config = VizConfig {
        heatmap_density: 9,
        ..VizConfig::default()
    };
    assert!(SpeakerView::new(layout, snapshot, config).is_err());
}

#[test]
fn refresh_pulls_latest_snapshot() {
    let (mut view, snapshot) = view_with_levels(&[0.0; 12]);
    let mut block = vec![SpeakerMetrics::default(); 12];
    block[5].peak = 0.75;
    snapshot.publish(&block);
    assert_eq!(view.metrics()[5].peak, 0.0);
    view.refresh_metrics();
    assert_eq!(view.metrics()[5].peak, 0.75);
    assert_eq!(view.visualizer().speakers()[5].visual_level(), 0.75);
}

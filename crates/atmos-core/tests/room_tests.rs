use atmos_core::*;

fn lines(list: &DrawList) -> Vec<&DrawCommand> {
    list.commands()
        .iter()
        .filter(|c| matches!(c.shape, Shape::Line { .. }))
        .collect()
}

fn is_dashed(cmd: &DrawCommand) -> bool {
    matches!(cmd.paint, Paint::Stroke { dash: Some(_), .. })
}

fn home_projection(preset: CameraPreset) -> Projection {
    let mut cam = Camera::new(CameraConfig::default()).unwrap();
    cam.set_camera_preset(preset);
    cam.projection(Viewport::default(), &RoomDimensions::default())
}

#[test]
fn outside_home_hides_back_floor_and_left_walls() {
    let room = RoomRenderer::new(RoomDimensions::default());
    let proj = home_projection(CameraPreset::OUTSIDE_HOME);
    assert_eq!(
        room.visible_faces(&proj),
        [true, false, false, true, true, false]
    );
    let solid = room.solid_edges(&proj);
    let hidden: Vec<usize> = (0..12).filter(|&i| !solid[i]).collect();
    assert_eq!(hidden, vec![4, 7, 8]);
}

#[test]
fn outside_draws_dashed_edges_below_solid_ones() {
    let room = RoomRenderer::new(RoomDimensions::default());
    let proj = home_projection(CameraPreset::OUTSIDE_HOME);
    let mut list = DrawList::new();
    room.draw(&proj, &mut list);

    let edges = lines(&list);
    assert_eq!(edges.len(), 12);
    assert!(edges[..3].iter().all(|c| is_dashed(c)));
    assert!(edges[3..].iter().all(|c| !is_dashed(c)));
}

#[test]
fn every_edge_borders_exactly_two_faces() {
    for (edge, &(fa, fb)) in ROOM_EDGES.iter().zip(EDGE_FACES.iter()) {
        for face in [fa, fb] {
            let quad = ROOM_FACES[face];
            assert!(quad.contains(&edge.0) && quad.contains(&edge.1), "{edge:?} not on face {face}");
        }
    }
}

#[test]
fn face_normals_point_out_of_their_face() {
    let corners = RoomDimensions::default().corners();
    for (quad, normal) in ROOM_FACES.iter().zip(FACE_NORMALS) {
        let centre = quad.iter().map(|&i| corners[i]).sum::<glam::Vec3>() / 4.0;
        assert!(centre.dot(normal) > 0.0);
    }
}

#[test]
fn inside_home_draws_every_edge_solid() {
    let room = RoomRenderer::new(RoomDimensions::default());
    let proj = home_projection(CameraPreset::INSIDE_HOME);
    let mut list = DrawList::new();
    room.draw(&proj, &mut list);
    let edges = lines(&list);
    assert_eq!(edges.len(), 12);
    assert!(edges.iter().all(|c| !is_dashed(c)));
}

#[test]
fn inside_camera_near_a_wall_drops_and_clips_edges() {
    let room_dims = RoomDimensions::default();
    let room = RoomRenderer::new(room_dims);
    // Looking at the right wall from 2 m: the +z corners sit behind the viewer.
    let proj = Projection::new(
        CameraMode::Inside,
        0.0,
        0.0,
        2.0,
        1.0,
        Viewport::default(),
        &room_dims,
        &ProjectionPolicy::default(),
    );
    let mut list = DrawList::new();
    room.draw(&proj, &mut list);
    let edges = lines(&list);
    assert_eq!(edges.len(), 8);
    for cmd in edges {
        if let Shape::Line { from, to } = cmd.shape {
            assert!(from.is_finite() && to.is_finite());
        }
    }
}

#[test]
fn gizmo_emits_three_labelled_axes() {
    let room = RoomRenderer::new(RoomDimensions::default());
    for preset in [CameraPreset::OUTSIDE_HOME, CameraPreset::INSIDE_HOME] {
        let proj = home_projection(preset);
        let mut list = DrawList::new();
        room.draw_gizmo(&proj, &mut list);
        assert_eq!(lines(&list).len(), 3);
        let labels: Vec<&str> = list
            .commands()
            .iter()
            .filter_map(|c| match &c.shape {
                Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["X", "Y", "Z"]);
    }
}

#[test]
fn gizmo_width_depends_on_mode() {
    let room = RoomRenderer::new(RoomDimensions::default());
    let width_of = |preset| {
        let mut list = DrawList::new();
        room.draw_gizmo(&home_projection(preset), &mut list);
        match list.commands()[0].paint {
            Paint::Stroke { width, .. } => width,
            Paint::Fill(_) => 0.0,
        }
    };
    assert_eq!(width_of(CameraPreset::OUTSIDE_HOME), 2.2);
    assert_eq!(width_of(CameraPreset::INSIDE_HOME), 3.0);
}

#[test]
fn edges_follow_the_room_they_were_built_for() {
    let small = RoomDimensions::new(3.0, 2.4, 4.0, 1.1).unwrap();
    let room = RoomRenderer::new(small);
    let proj = home_projection(CameraPreset::OUTSIDE_HOME);
    let corners: Vec<glam::Vec2> = small.corners().iter().map(|&c| proj.project(c).screen).collect();
    let mut list = DrawList::new();
    room.draw(&proj, &mut list);
    for cmd in lines(&list) {
        if let Shape::Line { from, to } = cmd.shape {
            for end in [from, to] {
                assert!(corners.iter().any(|c| c.distance(end) < 1e-3), "{end:?} is not a corner");
            }
        }
    }
}

use atmos_core::*;
use glam::Vec3;
use rand::prelude::*;

fn default_layout() -> SpeakerLayout {
    SpeakerLayout::seven_one_four(RoomDimensions::default())
}

fn approx_vec(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}

#[test]
fn seven_one_four_has_twelve_speakers_in_bed_order() {
    let layout = default_layout();
    assert_eq!(layout.len(), 12);
    let ids: Vec<&str> = layout.speakers().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        ["L", "R", "C", "LFE", "Ls", "Rs", "Lrs", "Rrs", "Ltf", "Rtf", "Ltr", "Rtr"]
    );
    assert_eq!(layout.speakers().iter().filter(|s| s.is_lfe).count(), 1);
}

#[test]
fn centre_sits_on_the_front_wall() {
    let layout = default_layout();
    let c = layout.find_by_id("C").unwrap();
    assert!(approx_vec(c.position, Vec3::new(3.8, 0.0, 0.0), 1e-5));
    assert!(approx_vec(c.aim_direction, Vec3::NEG_X, 1e-5));
    assert!((c.radius - 3.8).abs() < 1e-5);
}

#[test]
fn surround_aims_back_at_the_listener() {
    let layout = default_layout();
    let ls = layout.find_by_id("Ls").unwrap();
    assert!((ls.aim_direction.length() - 1.0).abs() < 1e-5);
    assert!(approx_vec(ls.aim_direction, -ls.position.normalize(), 1e-5));
    // Left of the listener and slightly behind.
    assert!(ls.position.z < 0.0 && ls.position.x < 0.0);
}

#[test]
fn heights_scale_with_ceiling_clearance() {
    let room = RoomDimensions::default();
    let layout = SpeakerLayout::seven_one_four(room);
    let ltf = layout.find_by_id("Ltf").unwrap();
    let expected_y = 45.0f32.to_radians().sin() * room.ceiling_y();
    assert!((ltf.position.y - expected_y).abs() < 1e-5);
    assert!(ltf.aim_direction.y < 0.0);
}

#[test]
fn lfe_is_omnidirectional_near_the_floor() {
    let room = RoomDimensions::default();
    let layout = SpeakerLayout::seven_one_four(room);
    let lfe = &layout.speakers()[3];
    assert!(lfe.is_lfe);
    assert_eq!(lfe.aim_direction, Vec3::ZERO);
    let expected = Vec3::new(
        room.depth * LFE_DEPTH_FRACTION,
        -room.ear_height * LFE_DROP_FRACTION,
        0.0,
    );
    assert!(approx_vec(lfe.position, expected, 1e-6));
}

#[test]
fn every_speaker_lies_inside_the_room() {
    for room in [
        RoomDimensions::default(),
        RoomDimensions::new(3.0, 2.4, 4.0, 1.1).unwrap(),
        RoomDimensions::new(12.0, 6.0, 20.0, 0.0).unwrap(),
    ] {
        let layout = SpeakerLayout::seven_one_four(room);
        for s in layout.speakers() {
            assert!(room.contains(s.position), "{} at {:?}", s.id, s.position);
        }
    }
}

#[test]
fn room_dimensions_are_validated() {
    assert!(RoomDimensions::new(6.0, 3.0, 7.0, 1.2).is_ok());
    assert!(matches!(
        RoomDimensions::new(0.0, 3.0, 7.0, 1.2),
        Err(AtmosError::InvalidRoom(_))
    ));
    assert!(RoomDimensions::new(6.0, -3.0, 7.0, 1.2).is_err());
    assert!(RoomDimensions::new(6.0, 3.0, f32::NAN, 1.2).is_err());
    assert!(RoomDimensions::new(6.0, 3.0, 7.0, 3.5).is_err());
    assert!(RoomDimensions::new(6.0, 3.0, 7.0, -0.1).is_err());
}

#[test]
fn room_bounds_straddle_ear_height() {
    let room = RoomDimensions::default();
    let (min, max) = room.bounds();
    assert!(approx_vec(min, Vec3::new(-3.8, -1.2, -3.2), 1e-6));
    assert!(approx_vec(max, Vec3::new(3.8, 1.85, 3.2), 1e-6));
    assert!(room.contains(Vec3::ZERO));
    assert!(!room.contains(Vec3::new(0.0, 2.0, 0.0)));
}

#[test]
fn full_bed_routes_one_to_one() {
    let layout = default_layout();
    let routes = layout.route(&ChannelLayout::seven_one_four()).unwrap();
    let expected: Vec<Option<usize>> = (0..12).map(Some).collect();
    assert_eq!(routes, expected);
}

#[test]
fn reordered_host_channels_route_by_identity() {
    let layout = default_layout();
    let host = ChannelLayout::new(vec![ChannelType::Lfe, ChannelType::TopRearRight, ChannelType::Left]);
    let routes = layout.route(&host).unwrap();
    assert_eq!(routes, vec![Some(3), Some(11), Some(0)]);
    assert_eq!(layout.index_for_channel(ChannelType::Centre), Some(2));
}

#[test]
fn route_fails_without_a_matching_channel() {
    let seeds = [SEVEN_ONE_FOUR_SEEDS[0]];
    let layout = SpeakerLayout::from_seeds(&seeds, RoomDimensions::default());
    let host = ChannelLayout::new(vec![ChannelType::Right, ChannelType::Centre]);
    assert_eq!(layout.route(&host), Err(AtmosError::UnsupportedLayout));
}

#[test]
fn unit_vectors_follow_room_axes() {
    assert!(approx_vec(unit_vector_from_angles(0.0, 0.0), Vec3::X, 1e-6));
    assert!(approx_vec(unit_vector_from_angles(90.0, 0.0), Vec3::Z, 1e-6));
    assert!(approx_vec(unit_vector_from_angles(-90.0, 0.0), Vec3::NEG_Z, 1e-6));
    assert!(approx_vec(unit_vector_from_angles(0.0, 90.0), Vec3::Y, 1e-6));
}

#[test]
fn mapped_positions_stay_within_bounds_for_random_directions() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let room = RoomDimensions::new(
            rng.gen_range(2.0..15.0),
            rng.gen_range(2.0..6.0),
            rng.gen_range(2.0..15.0),
            0.0,
        )
        .unwrap();
        let room = RoomDimensions {
            ear_height: rng.gen_range(0.0..room.height),
            ..room
        };
        let azimuth = rng.gen_range(-180.0..180.0);
        let elevation = rng.gen_range(-90.0..90.0);
        let unit = unit_vector_from_angles(azimuth, elevation);
        assert!((unit.length() - 1.0).abs() < 1e-4);
        let p = map_unit_to_room(unit, &room, false);
        assert!(room.contains(p), "{p:?} outside {room:?}");
    }
}

//! Speaker and room geometry.
//!
//! Room space: origin at the listening position at ear height, `+x`
//! towards the front wall (depth axis), `+y` up, `+z` towards the right
//! wall (width axis). Azimuth is measured from the front, positive to the
//! right; elevation is positive upwards.

use crate::constants::*;
use crate::error::{AtmosError, Result};
use fnv::FnvHashMap;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomDimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub ear_height: f32,
}

impl Default for RoomDimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_ROOM_WIDTH,
            height: DEFAULT_ROOM_HEIGHT,
            depth: DEFAULT_ROOM_DEPTH,
            ear_height: DEFAULT_EAR_HEIGHT,
        }
    }
}

impl RoomDimensions {
    pub fn new(width: f32, height: f32, depth: f32, ear_height: f32) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height), ("depth", depth)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AtmosError::InvalidRoom(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !ear_height.is_finite() || !(0.0..=height).contains(&ear_height) {
            return Err(AtmosError::InvalidRoom(format!(
                "ear height {ear_height} outside 0..={height}"
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
            ear_height,
        })
    }

    #[inline]
    pub fn floor_y(&self) -> f32 {
        -self.ear_height
    }

    #[inline]
    pub fn ceiling_y(&self) -> f32 {
        self.height - self.ear_height
    }

    /// Axis-aligned `(min, max)` corners in room space.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half_depth = self.depth * 0.5;
        let half_width = self.width * 0.5;
        (
            Vec3::new(-half_depth, self.floor_y(), -half_width),
            Vec3::new(half_depth, self.ceiling_y(), half_width),
        )
    }

    /// The eight cuboid corners. Index bit 0 selects +z, bit 1 the
    /// ceiling, bit 2 the rear wall.
    pub fn corners(&self) -> [Vec3; 8] {
        let half_depth = self.depth * 0.5;
        let half_width = self.width * 0.5;
        let floor = self.floor_y();
        let ceiling = self.ceiling_y();
        [
            Vec3::new(half_depth, floor, -half_width),
            Vec3::new(half_depth, floor, half_width),
            Vec3::new(half_depth, ceiling, -half_width),
            Vec3::new(half_depth, ceiling, half_width),
            Vec3::new(-half_depth, floor, -half_width),
            Vec3::new(-half_depth, floor, half_width),
            Vec3::new(-half_depth, ceiling, -half_width),
            Vec3::new(-half_depth, ceiling, half_width),
        ]
    }

    pub fn diagonal(&self) -> f32 {
        (self.depth * self.depth + self.width * self.width + self.height * self.height).sqrt()
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let (min, max) = self.bounds();
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

/// Channel identities of a 7.1.4 bed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelType {
    Left,
    Right,
    Centre,
    Lfe,
    LeftSurround,
    RightSurround,
    LeftSurroundRear,
    RightSurroundRear,
    TopFrontLeft,
    TopFrontRight,
    TopRearLeft,
    TopRearRight,
}

/// Host channel index -> channel identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelLayout {
    channels: Vec<ChannelType>,
}

impl ChannelLayout {
    pub fn new(channels: Vec<ChannelType>) -> Self {
        Self { channels }
    }

    pub fn seven_one_four() -> Self {
        Self::new(SEVEN_ONE_FOUR_SEEDS.iter().map(|s| s.channel).collect())
    }

    /// The first `count` channels of the 7.1.4 order, for hosts that
    /// deliver fewer channels (e.g. a stereo input device).
    pub fn seven_one_four_prefix(count: usize) -> Self {
        let mut layout = Self::seven_one_four();
        layout.channels.truncate(count);
        layout
    }

    #[inline]
    pub fn channel(&self, index: usize) -> Option<ChannelType> {
        self.channels.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SpeakerSeed {
    pub channel: ChannelType,
    pub id: &'static str,
    pub name: &'static str,
    pub azimuth_degrees: f32,
    pub elevation_degrees: f32,
    pub is_lfe: bool,
}

const fn seed(
    channel: ChannelType,
    id: &'static str,
    name: &'static str,
    azimuth_degrees: f32,
    elevation_degrees: f32,
    is_lfe: bool,
) -> SpeakerSeed {
    SpeakerSeed {
        channel,
        id,
        name,
        azimuth_degrees,
        elevation_degrees,
        is_lfe,
    }
}

pub const SEVEN_ONE_FOUR_SEEDS: [SpeakerSeed; 12] = [
    seed(ChannelType::Left, "L", "Left", -30.0, 0.0, false),
    seed(ChannelType::Right, "R", "Right", 30.0, 0.0, false),
    seed(ChannelType::Centre, "C", "Centre", 0.0, 0.0, false),
    seed(ChannelType::Lfe, "LFE", "LFE", 0.0, -30.0, true),
    seed(ChannelType::LeftSurround, "Ls", "Surround L", -110.0, 0.0, false),
    seed(ChannelType::RightSurround, "Rs", "Surround R", 110.0, 0.0, false),
    seed(ChannelType::LeftSurroundRear, "Lrs", "Rear Surround L", -150.0, 0.0, false),
    seed(ChannelType::RightSurroundRear, "Rrs", "Rear Surround R", 150.0, 0.0, false),
    seed(ChannelType::TopFrontLeft, "Ltf", "Top Front L", -45.0, 45.0, false),
    seed(ChannelType::TopFrontRight, "Rtf", "Top Front R", 45.0, 45.0, false),
    seed(ChannelType::TopRearLeft, "Ltr", "Top Rear L", -135.0, 45.0, false),
    seed(ChannelType::TopRearRight, "Rtr", "Top Rear R", 135.0, 45.0, false),
];

#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerDefinition {
    pub id: String,
    pub display_name: String,
    pub azimuth_degrees: f32,
    pub elevation_degrees: f32,
    pub radius: f32,
    pub position: Vec3,
    /// Unit length, or zero for LFE.
    pub aim_direction: Vec3,
    pub is_lfe: bool,
    pub channel: ChannelType,
}

/// Unit vector for an azimuth/elevation pair in room axes.
pub fn unit_vector_from_angles(azimuth_degrees: f32, elevation_degrees: f32) -> Vec3 {
    let azimuth = azimuth_degrees.to_radians();
    let elevation = elevation_degrees.to_radians();
    let cos_elevation = elevation.cos();
    Vec3::new(
        cos_elevation * azimuth.cos(),
        elevation.sin(),
        cos_elevation * azimuth.sin(),
    )
}

/// Stretch a unit direction onto the room walls. Heights above ear level
/// scale with the ceiling clearance, below with the ear height.
pub fn map_unit_to_room(unit: Vec3, room: &RoomDimensions, is_lfe: bool) -> Vec3 {
    if is_lfe {
        return Vec3::new(
            room.depth * LFE_DEPTH_FRACTION,
            -room.ear_height * LFE_DROP_FRACTION,
            0.0,
        );
    }
    let half_depth = room.depth * 0.5;
    let half_width = room.width * 0.5;
    let ceiling = room.ceiling_y();
    let floor = room.ear_height;

    let x = (unit.x * half_depth).clamp(-half_depth, half_depth);
    let z = (unit.z * half_width).clamp(-half_width, half_width);
    let y = if unit.y >= 0.0 {
        (unit.y * ceiling).clamp(0.0, ceiling)
    } else {
        (unit.y * floor).clamp(-floor, 0.0)
    };
    Vec3::new(x, y, z)
}

fn default_aim(position: Vec3) -> Vec3 {
    let aim = -position;
    let len = aim.length();
    if len > 1.0e-4 {
        aim / len
    } else {
        Vec3::NEG_X
    }
}

impl SpeakerDefinition {
    pub fn from_seed(seed: &SpeakerSeed, room: &RoomDimensions) -> Self {
        let unit = unit_vector_from_angles(seed.azimuth_degrees, seed.elevation_degrees);
        let position = map_unit_to_room(unit, room, seed.is_lfe);
        let aim_direction = if seed.is_lfe {
            Vec3::ZERO
        } else {
            default_aim(position)
        };
        Self {
            id: seed.id.to_string(),
            display_name: seed.name.to_string(),
            azimuth_degrees: seed.azimuth_degrees,
            elevation_degrees: seed.elevation_degrees,
            radius: position.length(),
            position,
            aim_direction,
            is_lfe: seed.is_lfe,
            channel: seed.channel,
        }
    }
}

/// Immutable speaker set for one room, built once at startup.
#[derive(Clone, Debug)]
pub struct SpeakerLayout {
    room: RoomDimensions,
    speakers: Vec<SpeakerDefinition>,
    by_channel: FnvHashMap<ChannelType, usize>,
}

impl SpeakerLayout {
    pub fn from_seeds(seeds: &[SpeakerSeed], room: RoomDimensions) -> Self {
        let speakers: Vec<SpeakerDefinition> = seeds
            .iter()
            .map(|s| SpeakerDefinition::from_seed(s, &room))
            .collect();
        let mut by_channel = FnvHashMap::default();
        for (i, def) in speakers.iter().enumerate() {
            by_channel.entry(def.channel).or_insert(i);
        }
        log::info!(
            "[layout] {} speakers in {:.2}x{:.2}x{:.2} m room (ear {:.2} m)",
            speakers.len(),
            room.width,
            room.height,
            room.depth,
            room.ear_height
        );
        Self {
            room,
            speakers,
            by_channel,
        }
    }

    pub fn seven_one_four(room: RoomDimensions) -> Self {
        Self::from_seeds(&SEVEN_ONE_FOUR_SEEDS, room)
    }

    #[inline]
    pub fn room(&self) -> &RoomDimensions {
        &self.room
    }

    #[inline]
    pub fn speakers(&self) -> &[SpeakerDefinition] {
        &self.speakers
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    #[inline]
    pub fn index_for_channel(&self, channel: ChannelType) -> Option<usize> {
        self.by_channel.get(&channel).copied()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&SpeakerDefinition> {
        self.speakers.iter().find(|s| s.id == id)
    }

    /// Host channel index -> speaker slot for every channel of `channels`.
    /// Fails when not a single channel lands on a speaker.
    pub fn route(&self, channels: &ChannelLayout) -> Result<Vec<Option<usize>>> {
        let routes: Vec<Option<usize>> = (0..channels.len())
            .map(|i| channels.channel(i).and_then(|c| self.index_for_channel(c)))
            .collect();
        if routes.iter().all(Option::is_none) {
            return Err(AtmosError::UnsupportedLayout);
        }
        Ok(routes)
    }
}

// Shared analysis/visual tuning constants.

// Spectral analysis
pub const FFT_ORDER: usize = 9;
pub const FFT_SIZE: usize = 1 << FFT_ORDER;
pub const LOW_BAND_CUTOFF_HZ: f32 = 200.0;
pub const MID_BAND_CUTOFF_HZ: f32 = 2000.0;
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

// Room (metres)
pub const DEFAULT_ROOM_WIDTH: f32 = 6.4;
pub const DEFAULT_ROOM_HEIGHT: f32 = 3.05;
pub const DEFAULT_ROOM_DEPTH: f32 = 7.6;
pub const DEFAULT_EAR_HEIGHT: f32 = 1.2;

// LFE placement as fractions of depth / ear height
pub const LFE_DEPTH_FRACTION: f32 = 0.48;
pub const LFE_DROP_FRACTION: f32 = 0.85;

// Camera interaction
pub const DRAG_RADIANS_PER_PIXEL: f32 = 0.005;
pub const PITCH_LIMIT_DEGREES: f32 = 85.0;
pub const WHEEL_ZOOM_STEP: f32 = 0.1;
pub const ANGLE_CHANGE_EPSILON: f32 = 1.0e-4;
pub const ZOOM_CHANGE_EPSILON: f32 = 1.0e-6;

// Projection
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 2.0;
pub const HOME_ZOOM: f32 = 1.0;
pub const OUTSIDE_FILL: f32 = 0.45; // fraction of min(viewport) the rotated room spans
pub const INSIDE_FILL: f32 = 0.35;
pub const NEAR_PLANE: f32 = 0.2;
pub const MIN_INSIDE_ZOOM_DIVISOR: f32 = 0.05;
pub const MIN_BASE_DISTANCE: f32 = 0.001;
pub const EXTENT_EPSILON: f32 = 1.0e-4;

// Reach
pub const REACH_FLOOR: f32 = 0.2; // share of full reach shown at zero level
pub const MIN_REACH_SCREEN: f32 = 1.0;
pub const DEGENERATE_MIN_REACH_SCREEN: f32 = 80.0;
pub const RAY_EPSILON: f32 = 1.0e-5;

// Shaping exponents per mode
pub const LOBE_SHAPING: f32 = 0.55;
pub const LAYERED_SHAPING: f32 = 0.62;
pub const BALLOON_SHAPING: f32 = 0.68;
pub const BALLOON_LFE_SHAPING: f32 = 0.5;
pub const TRAIL_SHAPING: f32 = 0.6;

// Heatmap
pub const HEATMAP_MAX_DECAY: f32 = 0.85;
pub const HEATMAP_NORMALISER_FLOOR: f32 = 0.12;
pub const HEATMAP_MIN_DISTANCE: f32 = 0.65; // metres, keeps 1/d² bounded near a cabinet
pub const HEATMAP_LEVEL_EPSILON: f32 = 1.0e-5;
pub const HEATMAP_AMPLITUDE_EPSILON: f32 = 1.0e-4;
pub const HEATMAP_PLAN_SPAN: f32 = 0.9;
pub const HEATMAP_VERTICAL_INSET: f32 = 0.15;
pub const HEATMAP_DEFAULT_DENSITY: u8 = 3;
/// Lattice resolution (depth, width, height steps) per density level 1..=5.
pub const HEATMAP_DENSITY_TABLE: [(usize, usize, usize); 5] =
    [(5, 5, 3), (6, 6, 4), (7, 7, 5), (9, 9, 6), (11, 11, 7)];

// Trails
pub const TRAIL_CAPACITY: usize = 32;
pub const TRAIL_MIN_STEP: f32 = 0.25; // pixels

// Visualization scale slider
pub const SCALE_ADJUSTMENT_RANGE: f32 = 100.0;
pub const SCALE_ADJUSTMENT_EPSILON: f32 = 1.0e-4;

// Gizmo
pub const GIZMO_AXIS_LENGTH: f32 = 1.8;

// Orientation fallback: straight down-screen
pub const DEFAULT_ORIENTATION: [f32; 2] = [0.0, -1.0];

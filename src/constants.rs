pub const BOARD_SIZE: i8 = 28;
/// Largest even size whose far-edge arithmetic (`1.5 * size`) fits in `i8`.
pub const MAX_BOARD_SIZE: i8 = 84;

/// First front-line column that belongs to a zone.
pub const ZONE_MIN_X: i8 = 2;
pub const ZONE_WIDTH: i8 = 6;
pub const ZONE_COUNT: usize = 4;

/// Urgency floor every zone starts from before breaches are added.
pub const URGENCY_BASELINE: f64 = 10.0;
/// Breaches within this many columns of a zone boundary count for both zones.
pub const ZONE_BOUNDARY_MARGIN: i8 = 1;
/// Health multiplier applied to walls when summing zone health.
pub const WALL_HEALTH_WEIGHT: f64 = 1.5;

/// Paths shorter than this are treated as blocked.
pub const MIN_VIABLE_PATH: usize = 20;
pub const RISK_HEALTH_FLOOR: f64 = 25.0;
pub const RISK_HEALTH_CEILING: f64 = 200.0;
pub const WALL_REINFORCEMENT: f64 = 0.2;
pub const WALL_REINFORCEMENT_RADIUS: f64 = 4.0;

pub const ATTACK_THRESHOLD: f64 = 10.0;
pub const ATTACK_THRESHOLD_STEP_TURNS: u32 = 10;
pub const INTERCEPT_THRESHOLD: f64 = 14.0;
pub const CRISIS_HEALTH: f64 = 15.0;
pub const EDGE_WALL_THRESHOLD: f64 = 20.0;

/// Entries in the engine's `unitInformation` array.
pub const UNIT_ORDER_LEN: usize = 6;
